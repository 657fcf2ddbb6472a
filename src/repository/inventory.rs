//! Inventory catalog lookups (read-only)

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::EquipmentCategory,
        inventory::{InventoryItem, InventoryQuery},
    },
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: Pool<Postgres>,
}

impl InventoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List inventory items, optionally by category
    pub async fn list(&self, query: &InventoryQuery) -> AppResult<Vec<InventoryItem>> {
        let rows = match query.category {
            Some(category) => {
                sqlx::query_as::<_, InventoryItem>(
                    "SELECT * FROM inventory_items WHERE category = $1 ORDER BY name",
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items ORDER BY category, name")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Get inventory item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<InventoryItem> {
        sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inventory item {} not found", id)))
    }

    /// Category of an item, read inside the caller's transaction
    pub async fn category_of(conn: &mut PgConnection, item_id: i32) -> AppResult<Option<EquipmentCategory>> {
        let category = sqlx::query_scalar::<_, EquipmentCategory>(
            "SELECT category FROM inventory_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(category)
    }
}
