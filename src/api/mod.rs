//! API handlers for the lending REST endpoints

pub mod borrowing;
pub mod health;
pub mod inventory;
pub mod openapi;
pub mod repairs;
pub mod returns;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// JSON body extractor whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Extractor for the caller identity from the bearer token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Borrowing requests
        .route(
            "/borrowing-requests",
            get(borrowing::list_borrowing_requests).post(borrowing::create_borrowing_request),
        )
        .route("/borrowing-requests/:id", get(borrowing::get_borrowing_request))
        .route("/borrowing-requests/:id/approve", post(borrowing::approve_borrowing_request))
        .route("/borrowing-requests/:id/reject", post(borrowing::reject_borrowing_request))
        .route("/borrowing-requests/:id/confirm-return", post(borrowing::confirm_return))
        .route("/me/borrowing-requests", get(borrowing::my_loans))
        .route("/students/:student_id/borrowing-requests", get(borrowing::student_loans))
        // Returns
        .route("/returns", post(returns::submit_return))
        .route("/me/returns", get(returns::my_returns))
        // Repair queue
        .route("/repairs", get(repairs::list_repairs))
        // Inventory (read-only)
        .route("/inventory", get(inventory::list_inventory))
        .route("/inventory/:id", get(inventory::get_inventory_item))
        // Statistics
        .route("/stats/loans", get(borrowing::loan_stats))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
