//! Repair queue model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{EquipmentCategory, RepairStatus};

/// Item flagged as damaged on return
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RepairItem {
    pub id: i32,
    pub item_id: i32,
    pub item_name: String,
    /// Copied from the inventory catalog when the item was reported
    pub category: EquipmentCategory,
    pub quantity: i32,
    pub repair_status: RepairStatus,
    pub date_reported: NaiveDate,
    pub reported_by_student_id: String,
    pub notes: Option<String>,
    pub crea_date: DateTime<Utc>,
}

/// New repair queue entry
#[derive(Debug, Clone)]
pub struct NewRepairItem {
    pub item_id: i32,
    pub item_name: String,
    pub category: EquipmentCategory,
    pub quantity: i32,
    pub date_reported: NaiveDate,
    pub reported_by_student_id: String,
    pub notes: Option<String>,
}

/// Query parameters for the repair queue
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RepairQuery {
    pub repair_status: Option<RepairStatus>,
}
