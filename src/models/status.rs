//! Derived loan status
//!
//! Overdue is never stored: it is recomputed from the due date and the
//! current local time every time a loan is read.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::{BorrowingStatus, CurrentStatus};

/// Last instant of the given calendar day (23:59:59.999)
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last)
}

/// A loan due on `due_date` is overdue once that whole calendar day has elapsed.
///
/// `now` must be expressed in the office's local time.
pub fn is_overdue(due_date: NaiveDate, now: NaiveDateTime) -> bool {
    now > end_of_day(due_date)
}

/// Closed set of states shown to users for a borrowing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Pending,
    Rejected,
    /// Approved row without a current status (legacy data)
    Approved,
    Active,
    Overdue,
    PendingReturn,
    Returned,
}

impl DisplayStatus {
    /// Derive the display state from both status axes and the due date
    pub fn derive(
        status: BorrowingStatus,
        current_status: Option<CurrentStatus>,
        due_date: Option<NaiveDate>,
        now: NaiveDateTime,
    ) -> Self {
        match (status, current_status) {
            (BorrowingStatus::Pending, _) => DisplayStatus::Pending,
            (BorrowingStatus::Rejected, _) => DisplayStatus::Rejected,
            (BorrowingStatus::Approved, None) => DisplayStatus::Approved,
            (BorrowingStatus::Approved, Some(CurrentStatus::Active)) => match due_date {
                Some(due) if is_overdue(due, now) => DisplayStatus::Overdue,
                _ => DisplayStatus::Active,
            },
            (BorrowingStatus::Approved, Some(CurrentStatus::PendingReturn)) => {
                DisplayStatus::PendingReturn
            }
            (BorrowingStatus::Approved, Some(CurrentStatus::Returned)) => DisplayStatus::Returned,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayStatus::Pending => "Pending",
            DisplayStatus::Rejected => "Rejected",
            DisplayStatus::Approved => "Approved",
            DisplayStatus::Active => "Active",
            DisplayStatus::Overdue => "Overdue",
            DisplayStatus::PendingReturn => "Pending Return",
            DisplayStatus::Returned => "Returned",
        }
    }

    /// Whether the student may still submit a return for this loan
    pub fn is_returnable(self) -> bool {
        matches!(self, DisplayStatus::Active | DisplayStatus::Overdue)
    }
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
