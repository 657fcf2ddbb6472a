//! Inventory catalog model (read-only for lending)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::EquipmentCategory;

/// Lendable inventory item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventoryItem {
    pub id: i32,
    pub name: String,
    pub category: EquipmentCategory,
    /// Units on the shelf
    pub quantity_available: i32,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Query parameters for the inventory list
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct InventoryQuery {
    pub category: Option<EquipmentCategory>,
}
