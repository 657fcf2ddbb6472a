//! Data models for the lending server

pub mod borrowing;
pub mod enums;
pub mod inventory;
pub mod repair;
pub mod return_request;
pub mod status;
pub mod user;

// Re-export commonly used types
pub use borrowing::{ApprovedItem, BorrowingRequest, LoanListing};
pub use enums::{BorrowingStatus, CurrentStatus, EquipmentCategory, RepairStatus, ReturnCondition, ReturnStatus};
pub use inventory::InventoryItem;
pub use repair::RepairItem;
pub use return_request::{ReturnRequest, SubmitReturn};
pub use status::DisplayStatus;
pub use user::{Role, UserClaims};
