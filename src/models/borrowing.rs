//! Borrowing request model and related types

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{BorrowingStatus, CurrentStatus, EquipmentCategory};
use super::status::DisplayStatus;
use crate::error::{AppError, AppResult};

/// Free-text request contents: category -> description
pub type RequestedItems = BTreeMap<EquipmentCategory, String>;

/// Concrete inventory item granted by staff on approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApprovedItem {
    pub item_id: i32,
    pub item_name: String,
    pub quantity: i32,
}

impl ApprovedItem {
    pub fn display_name(&self) -> String {
        format!("{} (Qty: {})", self.item_name, self.quantity)
    }
}

/// Borrowing request record from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BorrowingRequest {
    pub id: i32,
    pub student_id: String,
    /// Category -> description, as entered by the student
    #[schema(value_type = Object)]
    pub requested_items: Json<RequestedItems>,
    /// Items granted by staff, in approval order
    #[schema(value_type = Option<Vec<ApprovedItem>>)]
    pub approved_items: Option<Json<Vec<ApprovedItem>>>,
    pub status: BorrowingStatus,
    pub current_status: Option<CurrentStatus>,
    pub date_of_request: NaiveDate,
    pub dates_of_use: String,
    pub purpose: String,
    pub contact_person: String,
    pub contact_number: String,
    pub organization: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub staff_remarks: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl BorrowingRequest {
    /// Approved items, or an empty slice when the request was never approved
    pub fn approved(&self) -> &[ApprovedItem] {
        self.approved_items.as_ref().map(|j| j.0.as_slice()).unwrap_or(&[])
    }

    pub fn display_status(&self, now: NaiveDateTime) -> DisplayStatus {
        DisplayStatus::derive(self.status, self.current_status, self.due_date, now)
    }

    /// One-line summary of the free-text request, in category order
    pub fn requested_summary(&self) -> String {
        self.requested_items
            .0
            .iter()
            .filter(|(_, description)| !description.trim().is_empty())
            .map(|(category, description)| format!("{}: {}", category, description.trim()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Rows shown in a student's loan list.
    ///
    /// Approved items take precedence; without them a single row carries the
    /// free-text request.
    pub fn listing_rows(&self, now: NaiveDateTime) -> Vec<LoanListing> {
        let status = self.display_status(now);
        let row = |item_id, item_name, quantity| LoanListing {
            borrowing_request_id: self.id,
            item_id,
            item_name,
            quantity,
            date_of_request: self.date_of_request,
            dates_of_use: self.dates_of_use.clone(),
            due_date: self.due_date,
            status,
            status_label: status.label().to_string(),
            returnable: status.is_returnable(),
        };

        let approved = self.approved();
        if approved.is_empty() {
            return vec![row(None, self.requested_summary(), None)];
        }

        approved
            .iter()
            .map(|item| row(Some(item.item_id), item.display_name(), Some(item.quantity)))
            .collect()
    }
}

/// One line of the student-facing loan list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanListing {
    pub borrowing_request_id: i32,
    /// Inventory item (absent for the free-text fallback row)
    pub item_id: Option<i32>,
    pub item_name: String,
    pub quantity: Option<i32>,
    pub date_of_request: NaiveDate,
    pub dates_of_use: String,
    pub due_date: Option<NaiveDate>,
    pub status: DisplayStatus,
    pub status_label: String,
    /// Whether a return can be submitted for this row
    pub returnable: bool,
}

/// Create borrowing request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBorrowingRequest {
    /// Category -> free-text description; at least one must be filled in
    #[schema(value_type = Object)]
    pub requested_items: RequestedItems,
    /// Defaults to today (office local date)
    pub date_of_request: Option<NaiveDate>,
    #[validate(length(max = 255, message = "Dates of use must be at most 255 characters"))]
    pub dates_of_use: String,
    #[validate(length(max = 2000, message = "Purpose must be at most 2000 characters"))]
    pub purpose: String,
    #[validate(length(max = 255, message = "Contact person must be at most 255 characters"))]
    pub contact_person: String,
    #[validate(length(max = 32, message = "Contact number must be at most 32 characters"))]
    pub contact_number: String,
    #[validate(length(max = 255, message = "Organization must be at most 255 characters"))]
    pub organization: Option<String>,
}

impl CreateBorrowingRequest {
    /// Check required fields, returning the populated categories only
    pub fn check(&self) -> AppResult<RequestedItems> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let populated: RequestedItems = self
            .requested_items
            .iter()
            .filter(|(_, description)| !description.trim().is_empty())
            .map(|(category, description)| (*category, description.trim().to_string()))
            .collect();

        if populated.is_empty() {
            return Err(AppError::Validation(
                "At least one equipment category must be filled in".to_string(),
            ));
        }

        let required = [
            ("dates_of_use", &self.dates_of_use),
            ("purpose", &self.purpose),
            ("contact_person", &self.contact_person),
            ("contact_number", &self.contact_number),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }

        Ok(populated)
    }
}

/// Staff approval of a pending request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApproveBorrowingRequest {
    /// Concrete items granted, in display order
    pub items: Vec<ApprovedItem>,
    /// Last day of the loan (YYYY-MM-DD)
    pub due_date: NaiveDate,
    pub remarks: Option<String>,
}

impl ApproveBorrowingRequest {
    /// Validate against the request being approved
    pub fn check(&self, date_of_request: NaiveDate) -> AppResult<()> {
        if self.items.is_empty() {
            return Err(AppError::ApprovalValidation(
                "At least one item must be approved".to_string(),
            ));
        }
        for item in &self.items {
            if item.quantity < 1 {
                return Err(AppError::ApprovalValidation(format!(
                    "Quantity for item {} must be at least 1",
                    item.item_id
                )));
            }
            if item.item_name.trim().is_empty() {
                return Err(AppError::ApprovalValidation(format!(
                    "Item {} has no name",
                    item.item_id
                )));
            }
        }
        if self.due_date < date_of_request {
            return Err(AppError::ApprovalValidation(format!(
                "Due date {} is before the request date {}",
                self.due_date, date_of_request
            )));
        }
        Ok(())
    }
}

/// Staff rejection of a pending request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RejectBorrowingRequest {
    pub reason: Option<String>,
}

/// Query parameters for the staff request list
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BorrowingRequestQuery {
    /// Filter by primary status
    pub status: Option<BorrowingStatus>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

pub const DEFAULT_PER_PAGE: i64 = 50;
pub const MAX_PER_PAGE: i64 = 200;

/// Resolved pagination of a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub offset: i64,
}

impl BorrowingRequestQuery {
    /// Resolve page and page size, rejecting pages whose offset overflows
    pub fn window(&self) -> AppResult<PageWindow> {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| AppError::Validation(format!("Page {} is out of range", page)))?;
        Ok(PageWindow { page, per_page, offset })
    }
}

/// Paginated borrowing request list
#[derive(Debug, Serialize, ToSchema)]
pub struct BorrowingRequestPage {
    pub items: Vec<BorrowingRequest>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
