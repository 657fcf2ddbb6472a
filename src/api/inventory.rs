//! Inventory catalog endpoints (read-only)

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::inventory::{InventoryItem, InventoryQuery},
};

use super::AuthenticatedUser;

/// List inventory items
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(InventoryQuery),
    responses(
        (status = 200, description = "Inventory list", body = Vec<InventoryItem>)
    )
)]
pub async fn list_inventory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let items = state.services.inventory.list(&query).await?;
    Ok(Json(items))
}

/// Get inventory item by ID
#[utoipa::path(
    get,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Inventory item ID")),
    responses(
        (status = 200, description = "Inventory item", body = InventoryItem),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_inventory_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<InventoryItem>> {
    let item = state.services.inventory.get_by_id(id).await?;
    Ok(Json(item))
}
