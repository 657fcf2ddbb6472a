//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{borrowing, health, inventory, repairs, returns};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kultura Lending API",
        version = "0.3.0",
        description = "Culture and Arts Office equipment lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Borrowing requests
        borrowing::create_borrowing_request,
        borrowing::list_borrowing_requests,
        borrowing::get_borrowing_request,
        borrowing::approve_borrowing_request,
        borrowing::reject_borrowing_request,
        borrowing::confirm_return,
        borrowing::my_loans,
        borrowing::student_loans,
        borrowing::loan_stats,
        // Returns
        returns::submit_return,
        returns::my_returns,
        // Repairs
        repairs::list_repairs,
        // Inventory
        inventory::list_inventory,
        inventory::get_inventory_item,
    ),
    components(
        schemas(
            // Borrowing
            crate::models::borrowing::BorrowingRequest,
            crate::models::borrowing::ApprovedItem,
            crate::models::borrowing::CreateBorrowingRequest,
            crate::models::borrowing::ApproveBorrowingRequest,
            crate::models::borrowing::RejectBorrowingRequest,
            crate::models::borrowing::LoanListing,
            crate::models::status::DisplayStatus,
            crate::models::enums::BorrowingStatus,
            crate::models::enums::CurrentStatus,
            crate::models::enums::EquipmentCategory,
            crate::models::borrowing::BorrowingRequestPage,
            crate::services::borrowing::ConfirmedReturn,
            crate::services::borrowing::LoanStats,
            // Returns
            crate::models::return_request::ReturnRequest,
            crate::models::return_request::ReturnLine,
            crate::models::return_request::SubmitReturn,
            crate::models::return_request::ReturnReceipt,
            crate::models::enums::ReturnCondition,
            crate::models::enums::ReturnStatus,
            // Repairs
            crate::models::repair::RepairItem,
            crate::models::enums::RepairStatus,
            // Inventory
            crate::models::inventory::InventoryItem,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "borrowing", description = "Borrowing request lifecycle"),
        (name = "returns", description = "Return submissions"),
        (name = "repairs", description = "Repair queue"),
        (name = "inventory", description = "Inventory catalog"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
