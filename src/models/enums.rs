//! Shared lending enums (stored as Postgres enum types)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// EquipmentCategory
// ---------------------------------------------------------------------------

/// Equipment category, used both for free-text requests and inventory items
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "equipment_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    Costumes,
    Equipment,
    Instruments,
    Props,
    Others,
}

impl std::fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EquipmentCategory::Costumes => "Costumes",
            EquipmentCategory::Equipment => "Equipment",
            EquipmentCategory::Instruments => "Instruments",
            EquipmentCategory::Props => "Props",
            EquipmentCategory::Others => "Others",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// BorrowingStatus / CurrentStatus
// ---------------------------------------------------------------------------

/// Primary status axis of a borrowing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "borrowing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BorrowingStatus {
    Pending,
    Approved,
    Rejected,
}

/// Secondary status axis, only meaningful once a request is approved.
///
/// Variants are declared in lifecycle order so that `Ord` reflects forward progress.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "loan_current_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CurrentStatus {
    Active,
    PendingReturn,
    Returned,
}

impl CurrentStatus {
    /// Whether moving from `self` to `next` is a legal single forward step
    pub fn can_advance_to(self, next: CurrentStatus) -> bool {
        matches!(
            (self, next),
            (CurrentStatus::Active, CurrentStatus::PendingReturn)
                | (CurrentStatus::PendingReturn, CurrentStatus::Returned)
        )
    }
}

// ---------------------------------------------------------------------------
// ReturnStatus / ReturnCondition
// ---------------------------------------------------------------------------

/// Status of a single return line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "return_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Pending,
    Confirmed,
}

/// Condition declared by the student for a whole return submission
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCondition {
    GoodCondition,
    WithDamage,
}

impl ReturnCondition {
    pub fn description(self) -> &'static str {
        match self {
            ReturnCondition::GoodCondition => "Good condition",
            ReturnCondition::WithDamage => "With damage",
        }
    }
}

// ---------------------------------------------------------------------------
// RepairStatus
// ---------------------------------------------------------------------------

/// Repair queue status. The lending engine only ever writes `Damaged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "repair_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Damaged,
    UnderRepair,
    Repaired,
    Disposed,
}
