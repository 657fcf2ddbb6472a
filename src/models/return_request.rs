//! Return request model and return submission payloads

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{ReturnCondition, ReturnStatus};
use super::repair::RepairItem;

/// One returned item line, as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnRequest {
    pub id: i32,
    pub borrowing_request_id: i32,
    pub student_id: String,
    pub item_id: i32,
    pub item_name: String,
    pub quantity_returned: i32,
    /// Declared conditions, e.g. "Good condition; With damage"
    pub condition_notes: String,
    pub remarks: Option<String>,
    pub status: ReturnStatus,
    pub confirmed_by: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub crea_date: DateTime<Utc>,
}

/// Item line of a return submission
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReturnLine {
    pub borrowing_request_id: i32,
    pub item_id: i32,
    pub item_name: String,
    /// Defaults to 1
    pub quantity: Option<i32>,
}

/// Return submission covering one or more loans
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitReturn {
    #[serde(default)]
    pub items: Vec<ReturnLine>,
    /// Conditions declared for the whole batch
    #[serde(default)]
    #[schema(value_type = Vec<ReturnCondition>)]
    pub conditions: BTreeSet<ReturnCondition>,
    /// Optional free-text remarks from the student
    pub remarks: Option<String>,
}

/// Format declared conditions as stored in `condition_notes`
pub fn format_conditions(conditions: &BTreeSet<ReturnCondition>) -> String {
    conditions
        .iter()
        .map(|c| c.description())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Everything written by a successful return submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnReceipt {
    pub returns: Vec<ReturnRequest>,
    pub repairs: Vec<RepairItem>,
    /// Borrowing requests moved to pending_return
    pub borrowing_request_ids: Vec<i32>,
}
