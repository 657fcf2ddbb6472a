//! Borrowing request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::borrowing::{
        ApproveBorrowingRequest, BorrowingRequest, BorrowingRequestPage, BorrowingRequestQuery,
        CreateBorrowingRequest, LoanListing, RejectBorrowingRequest,
    },
    services::borrowing::{ConfirmedReturn, LoanStats},
};

use super::{AppJson, AuthenticatedUser};

/// Submit a borrowing request
#[utoipa::path(
    post,
    path = "/borrowing-requests",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowingRequest,
    responses(
        (status = 201, description = "Request submitted", body = BorrowingRequest),
        (status = 400, description = "Missing category or contact field", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a student")
    )
)]
pub async fn create_borrowing_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(data): AppJson<CreateBorrowingRequest>,
) -> AppResult<(StatusCode, Json<BorrowingRequest>)> {
    let student_id = claims.require_student()?;
    let request = state.services.borrowing.create(student_id, &data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List borrowing requests (staff)
#[utoipa::path(
    get,
    path = "/borrowing-requests",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(BorrowingRequestQuery),
    responses(
        (status = 200, description = "Borrowing requests", body = BorrowingRequestPage),
        (status = 400, description = "Page out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_borrowing_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowingRequestQuery>,
) -> AppResult<Json<BorrowingRequestPage>> {
    claims.require_staff()?;
    let page = state.services.borrowing.list(&query).await?;
    Ok(Json(page))
}

/// Get a borrowing request
#[utoipa::path(
    get,
    path = "/borrowing-requests/{id}",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing request ID")),
    responses(
        (status = 200, description = "Borrowing request", body = BorrowingRequest),
        (status = 403, description = "Request belongs to another student"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_borrowing_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingRequest>> {
    let request = if claims.is_staff() {
        state.services.borrowing.get_by_id(id).await?
    } else {
        let student_id = claims.require_student()?;
        state.services.borrowing.get_for_student(student_id, id).await?
    };
    Ok(Json(request))
}

/// Approve a pending request (staff)
#[utoipa::path(
    post,
    path = "/borrowing-requests/{id}/approve",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing request ID")),
    request_body = ApproveBorrowingRequest,
    responses(
        (status = 200, description = "Request approved", body = BorrowingRequest),
        (status = 400, description = "Invalid items or due date", body = crate::error::ErrorResponse),
        (status = 409, description = "Request is not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_borrowing_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(data): AppJson<ApproveBorrowingRequest>,
) -> AppResult<Json<BorrowingRequest>> {
    let staff_id = claims.require_staff()?;
    let request = state.services.borrowing.approve(id, &data, staff_id).await?;
    Ok(Json(request))
}

/// Reject a pending request (staff)
#[utoipa::path(
    post,
    path = "/borrowing-requests/{id}/reject",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing request ID")),
    request_body = RejectBorrowingRequest,
    responses(
        (status = 200, description = "Request rejected", body = BorrowingRequest),
        (status = 409, description = "Request is not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn reject_borrowing_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(data): AppJson<RejectBorrowingRequest>,
) -> AppResult<Json<BorrowingRequest>> {
    let staff_id = claims.require_staff()?;
    let request = state.services.borrowing.reject(id, &data, staff_id).await?;
    Ok(Json(request))
}

/// Confirm that returned items were received (staff)
#[utoipa::path(
    post,
    path = "/borrowing-requests/{id}/confirm-return",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing request ID")),
    responses(
        (status = 200, description = "Loan closed", body = ConfirmedReturn),
        (status = 409, description = "No return awaiting confirmation", body = crate::error::ErrorResponse)
    )
)]
pub async fn confirm_return(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ConfirmedReturn>> {
    let staff_id = claims.require_staff()?;
    let confirmed = state.services.borrowing.confirm_return(id, staff_id).await?;
    Ok(Json(confirmed))
}

/// Loan list of the calling student
#[utoipa::path(
    get,
    path = "/me/borrowing-requests",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loan list with derived statuses", body = Vec<LoanListing>)
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanListing>>> {
    let student_id = claims.require_student()?;
    let rows = state.services.borrowing.loan_listing(student_id).await?;
    Ok(Json(rows))
}

/// Loan list of a given student (staff)
#[utoipa::path(
    get,
    path = "/students/{student_id}/borrowing-requests",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("student_id" = String, Path, description = "Student number")),
    responses(
        (status = 200, description = "Loan list with derived statuses", body = Vec<LoanListing>)
    )
)]
pub async fn student_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(student_id): Path<String>,
) -> AppResult<Json<Vec<LoanListing>>> {
    claims.require_staff()?;
    let rows = state.services.borrowing.loan_listing(&student_id).await?;
    Ok(Json(rows))
}

/// Loan counts per status (staff)
#[utoipa::path(
    get,
    path = "/stats/loans",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts per display status", body = LoanStats)
    )
)]
pub async fn loan_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<LoanStats>> {
    claims.require_staff()?;
    let stats = state.services.borrowing.loan_stats().await?;
    Ok(Json(stats))
}
