//! Business logic services

pub mod borrowing;
pub mod inventory;
pub mod repairs;
pub mod returns;

use crate::{config::LendingConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub borrowing: borrowing::BorrowingService,
    pub returns: returns::ReturnsService,
    pub repairs: repairs::RepairsService,
    pub inventory: inventory::InventoryService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, lending: LendingConfig) -> Self {
        Self {
            borrowing: borrowing::BorrowingService::new(repository.clone(), lending.clone()),
            returns: returns::ReturnsService::new(repository.clone(), lending),
            repairs: repairs::RepairsService::new(repository.clone()),
            inventory: inventory::InventoryService::new(repository.clone()),
            repository,
        }
    }

    /// Check that the database answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
