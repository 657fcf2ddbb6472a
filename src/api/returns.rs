//! Return submission endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::return_request::{ReturnReceipt, ReturnRequest, SubmitReturn},
};

use super::{AppJson, AuthenticatedUser};

/// Return borrowed items
#[utoipa::path(
    post,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    request_body = SubmitReturn,
    responses(
        (status = 201, description = "Return submitted", body = ReturnReceipt),
        (status = 400, description = "Malformed body, no items or no condition declared", body = crate::error::ErrorResponse),
        (status = 409, description = "Loan not owned by caller or not active", body = crate::error::ErrorResponse),
        (status = 424, description = "Damaged item missing from inventory", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_return(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(submission): AppJson<SubmitReturn>,
) -> AppResult<(StatusCode, Json<ReturnReceipt>)> {
    let student_id = claims.require_student()?;
    let receipt = state.services.returns.submit(student_id, &submission).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Return lines of the calling student
#[utoipa::path(
    get,
    path = "/me/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Submitted returns", body = Vec<ReturnRequest>)
    )
)]
pub async fn my_returns(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ReturnRequest>>> {
    let student_id = claims.require_student()?;
    let returns = state.services.returns.list_for_student(student_id).await?;
    Ok(Json(returns))
}
