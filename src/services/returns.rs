//! Return submission service
//!
//! A submission may cover several item lines across several borrowing
//! requests. It either writes every return line, every repair entry and every
//! `active -> pending_return` transition, or nothing at all.

use std::collections::{BTreeSet, HashSet};

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        borrowing::BorrowingRequest,
        enums::{BorrowingStatus, CurrentStatus, ReturnCondition},
        repair::NewRepairItem,
        return_request::{format_conditions, ReturnReceipt, ReturnRequest, SubmitReturn},
    },
    repository::{
        borrowing::BorrowingRepository,
        inventory::InventoryRepository,
        repairs::RepairsRepository,
        returns::{NewReturnRequest, ReturnsRepository},
        Repository,
    },
};

/// Validated return line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub borrowing_request_id: i32,
    pub item_id: i32,
    pub item_name: String,
    pub quantity: i32,
}

/// Writes a submission will perform once validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPlan {
    pub lines: Vec<PlannedLine>,
    pub condition_notes: String,
    /// One repair entry per line when damage was declared
    pub damaged: bool,
    /// Distinct borrowing requests to move to pending_return, ascending
    pub request_ids: Vec<i32>,
}

/// Distinct borrowing request ids referenced by a submission, ascending
pub fn referenced_request_ids(submission: &SubmitReturn) -> Vec<i32> {
    submission
        .items
        .iter()
        .map(|line| line.borrowing_request_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Validate a submission against the (locked) borrowing requests it references.
///
/// Checks run in order: lines present, ownership and lifecycle state of every
/// referenced request, declared conditions, then the lines themselves.
pub fn plan_return(
    student_id: &str,
    submission: &SubmitReturn,
    loans: &[BorrowingRequest],
) -> AppResult<ReturnPlan> {
    if submission.items.is_empty() {
        return Err(AppError::Validation("No items to return".to_string()));
    }

    let request_ids = referenced_request_ids(submission);
    for id in &request_ids {
        // Unknown and foreign requests get the same answer
        let loan = loans
            .iter()
            .find(|l| l.id == *id && l.student_id == student_id)
            .ok_or_else(|| {
                AppError::InvalidState(format!("Borrowing request {} is not yours to return", id))
            })?;

        if loan.status != BorrowingStatus::Approved
            || loan.current_status != Some(CurrentStatus::Active)
        {
            return Err(AppError::InvalidState(format!(
                "Borrowing request {} is not an active loan",
                id
            )));
        }
    }

    if submission.conditions.is_empty() {
        return Err(AppError::Validation(
            "At least one item condition must be declared".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut lines = Vec::with_capacity(submission.items.len());
    for line in &submission.items {
        let quantity = line.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(AppError::Validation(format!(
                "Quantity for item {} must be at least 1",
                line.item_id
            )));
        }
        if line.item_name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Item {} has no name",
                line.item_id
            )));
        }
        if !seen.insert((line.borrowing_request_id, line.item_id)) {
            return Err(AppError::Validation(format!(
                "Item {} is listed twice for borrowing request {}",
                line.item_id, line.borrowing_request_id
            )));
        }
        lines.push(PlannedLine {
            borrowing_request_id: line.borrowing_request_id,
            item_id: line.item_id,
            item_name: line.item_name.trim().to_string(),
            quantity,
        });
    }

    Ok(ReturnPlan {
        lines,
        condition_notes: format_conditions(&submission.conditions),
        damaged: submission.conditions.contains(&ReturnCondition::WithDamage),
        request_ids,
    })
}

fn repair_notes(line: &PlannedLine, remarks: Option<&str>) -> String {
    let mut notes = format!(
        "Reported damaged on return of borrowing request #{}",
        line.borrowing_request_id
    );
    if let Some(remarks) = remarks.map(str::trim).filter(|r| !r.is_empty()) {
        notes.push_str("; Student remarks: ");
        notes.push_str(remarks);
    }
    notes
}

#[derive(Clone)]
pub struct ReturnsService {
    repository: Repository,
    lending: LendingConfig,
}

impl ReturnsService {
    pub fn new(repository: Repository, lending: LendingConfig) -> Self {
        Self { repository, lending }
    }

    /// Submit a return for the given student
    pub async fn submit(&self, student_id: &str, submission: &SubmitReturn) -> AppResult<ReturnReceipt> {
        // Same check as plan_return, made before a transaction is opened
        if submission.items.is_empty() {
            return Err(AppError::Validation("No items to return".to_string()));
        }

        let ids = referenced_request_ids(submission);
        let remarks = submission
            .remarks
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        let today = self.lending.today();

        // Dropping `tx` on any early return rolls everything back
        let mut tx = self.repository.begin().await?;

        let loans = BorrowingRepository::lock_many(&mut *tx, &ids).await?;
        let plan = plan_return(student_id, submission, &loans)?;

        let mut returns: Vec<ReturnRequest> = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let row = ReturnsRepository::insert(
                &mut *tx,
                &NewReturnRequest {
                    borrowing_request_id: line.borrowing_request_id,
                    student_id,
                    item_id: line.item_id,
                    item_name: &line.item_name,
                    quantity_returned: line.quantity,
                    condition_notes: &plan.condition_notes,
                    remarks,
                },
            )
            .await?;
            returns.push(row);
        }

        let mut repairs = Vec::new();
        if plan.damaged {
            for line in &plan.lines {
                let category = InventoryRepository::category_of(&mut *tx, line.item_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::DependencyResolution(format!(
                            "Inventory item {} not found; cannot queue it for repair",
                            line.item_id
                        ))
                    })?;

                let repair = RepairsRepository::insert(
                    &mut *tx,
                    &NewRepairItem {
                        item_id: line.item_id,
                        item_name: line.item_name.clone(),
                        category,
                        quantity: line.quantity,
                        date_reported: today,
                        reported_by_student_id: student_id.to_string(),
                        notes: Some(repair_notes(line, remarks)),
                    },
                )
                .await?;
                repairs.push(repair);
            }
        }

        for &id in &plan.request_ids {
            let advanced = BorrowingRepository::advance(
                &mut *tx,
                id,
                CurrentStatus::Active,
                CurrentStatus::PendingReturn,
            )
            .await?;
            if !advanced {
                return Err(AppError::InvalidState(format!(
                    "Borrowing request {} is not an active loan",
                    id
                )));
            }
        }

        tx.commit().await?;

        tracing::info!(
            student_id,
            lines = returns.len(),
            repairs = repairs.len(),
            requests = ?plan.request_ids,
            "Return submitted"
        );

        Ok(ReturnReceipt {
            returns,
            repairs,
            borrowing_request_ids: plan.request_ids,
        })
    }

    /// Return lines submitted by a student
    pub async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<ReturnRequest>> {
        self.repository.returns.list_for_student(student_id).await
    }
}
