//! Repair queue endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::repair::{RepairItem, RepairQuery},
};

use super::AuthenticatedUser;

/// List the repair queue (staff)
#[utoipa::path(
    get,
    path = "/repairs",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(RepairQuery),
    responses(
        (status = 200, description = "Repair queue", body = Vec<RepairItem>)
    )
)]
pub async fn list_repairs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RepairQuery>,
) -> AppResult<Json<Vec<RepairItem>>> {
    claims.require_staff()?;
    let repairs = state.services.repairs.list(&query).await?;
    Ok(Json(repairs))
}
