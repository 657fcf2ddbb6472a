//! Borrowing request lifecycle service

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        borrowing::{
            ApproveBorrowingRequest, BorrowingRequest, BorrowingRequestPage, BorrowingRequestQuery,
            CreateBorrowingRequest, LoanListing, RejectBorrowingRequest,
        },
        enums::{BorrowingStatus, CurrentStatus},
        return_request::ReturnRequest,
        status::DisplayStatus,
    },
    repository::{borrowing::BorrowingRepository, returns::ReturnsRepository, Repository},
};

/// Number of requests per display status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoanStats {
    pub pending: i64,
    pub rejected: i64,
    pub approved: i64,
    pub active: i64,
    pub overdue: i64,
    pub pending_return: i64,
    pub returned: i64,
}

impl LoanStats {
    pub fn add(&mut self, status: DisplayStatus) {
        let counter = match status {
            DisplayStatus::Pending => &mut self.pending,
            DisplayStatus::Rejected => &mut self.rejected,
            DisplayStatus::Approved => &mut self.approved,
            DisplayStatus::Active => &mut self.active,
            DisplayStatus::Overdue => &mut self.overdue,
            DisplayStatus::PendingReturn => &mut self.pending_return,
            DisplayStatus::Returned => &mut self.returned,
        };
        *counter += 1;
    }
}

/// Result of a staff return confirmation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConfirmedReturn {
    pub request: BorrowingRequest,
    pub returns: Vec<ReturnRequest>,
}

/// Flatten a student's requests into loan list rows
pub fn build_listing(requests: &[BorrowingRequest], now: NaiveDateTime) -> Vec<LoanListing> {
    requests.iter().flat_map(|r| r.listing_rows(now)).collect()
}

#[derive(Clone)]
pub struct BorrowingService {
    repository: Repository,
    lending: LendingConfig,
}

impl BorrowingService {
    pub fn new(repository: Repository, lending: LendingConfig) -> Self {
        Self { repository, lending }
    }

    /// Submit a new request for the given student
    pub async fn create(&self, student_id: &str, data: &CreateBorrowingRequest) -> AppResult<BorrowingRequest> {
        let requested = data.check()?;
        let date_of_request = data.date_of_request.unwrap_or_else(|| self.lending.today());

        let request = self
            .repository
            .borrowing
            .create(student_id, &requested, data, date_of_request)
            .await?;

        tracing::info!(
            request_id = request.id,
            student_id,
            categories = requested.len(),
            "Borrowing request created"
        );
        Ok(request)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowingRequest> {
        self.repository.borrowing.get_by_id(id).await
    }

    /// Get a request on behalf of its owner
    pub async fn get_for_student(&self, student_id: &str, id: i32) -> AppResult<BorrowingRequest> {
        let request = self.repository.borrowing.get_by_id(id).await?;
        if request.student_id != student_id {
            return Err(AppError::Authorization(format!(
                "Borrowing request {} belongs to another student",
                id
            )));
        }
        Ok(request)
    }

    /// One page of requests for staff review
    pub async fn list(&self, query: &BorrowingRequestQuery) -> AppResult<BorrowingRequestPage> {
        let window = query.window()?;
        let (items, total) = self.repository.borrowing.list(query, window).await?;
        Ok(BorrowingRequestPage {
            items,
            total,
            page: window.page,
            per_page: window.per_page,
        })
    }

    /// Loan list of a student with statuses derived at read time
    pub async fn loan_listing(&self, student_id: &str) -> AppResult<Vec<LoanListing>> {
        let requests = self.repository.borrowing.list_for_student(student_id).await?;
        Ok(build_listing(&requests, self.lending.now_local()))
    }

    /// Approve a pending request with concrete items and a due date
    pub async fn approve(
        &self,
        id: i32,
        data: &ApproveBorrowingRequest,
        staff_id: &str,
    ) -> AppResult<BorrowingRequest> {
        let request = self.repository.borrowing.get_by_id(id).await?;
        if request.status != BorrowingStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Borrowing request {} is not pending",
                id
            )));
        }
        data.check(request.date_of_request)?;

        let remarks = data.remarks.as_deref().map(str::trim).filter(|r| !r.is_empty());
        let approved = self
            .repository
            .borrowing
            .approve(id, &data.items, data.due_date, remarks, staff_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!("Borrowing request {} is not pending", id))
            })?;

        tracing::info!(
            request_id = id,
            staff_id,
            items = data.items.len(),
            due_date = %data.due_date,
            "Borrowing request approved"
        );
        Ok(approved)
    }

    /// Reject a pending request
    pub async fn reject(
        &self,
        id: i32,
        data: &RejectBorrowingRequest,
        staff_id: &str,
    ) -> AppResult<BorrowingRequest> {
        let reason = data.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
        let rejected = match self.repository.borrowing.reject(id, reason, staff_id).await? {
            Some(request) => request,
            None => {
                // Distinguish unknown id from wrong state
                self.repository.borrowing.get_by_id(id).await?;
                return Err(AppError::InvalidState(format!(
                    "Borrowing request {} is not pending",
                    id
                )));
            }
        };

        tracing::info!(request_id = id, staff_id, "Borrowing request rejected");
        Ok(rejected)
    }

    /// Staff confirmation that returned items were received
    pub async fn confirm_return(&self, id: i32, staff_id: &str) -> AppResult<ConfirmedReturn> {
        let mut tx = self.repository.begin().await?;

        let request = BorrowingRepository::lock_many(&mut *tx, &[id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Borrowing request {} not found", id)))?;

        if request.status != BorrowingStatus::Approved
            || request.current_status != Some(CurrentStatus::PendingReturn)
        {
            return Err(AppError::InvalidState(format!(
                "Borrowing request {} has no return awaiting confirmation",
                id
            )));
        }

        let advanced = BorrowingRepository::advance(
            &mut *tx,
            id,
            CurrentStatus::PendingReturn,
            CurrentStatus::Returned,
        )
        .await?;
        if !advanced {
            return Err(AppError::InvalidState(format!(
                "Borrowing request {} has no return awaiting confirmation",
                id
            )));
        }

        let returns = ReturnsRepository::confirm_for_request(&mut *tx, id, staff_id).await?;
        tx.commit().await?;

        tracing::info!(request_id = id, staff_id, lines = returns.len(), "Return confirmed");

        let request = self.repository.borrowing.get_by_id(id).await?;
        Ok(ConfirmedReturn { request, returns })
    }

    /// Counts per display status, derived now
    pub async fn loan_stats(&self) -> AppResult<LoanStats> {
        let now = self.lending.now_local();
        let rows = self.repository.borrowing.status_rows().await?;

        let mut stats = LoanStats::default();
        for row in rows {
            stats.add(DisplayStatus::derive(row.status, row.current_status, row.due_date, now));
        }
        Ok(stats)
    }
}
