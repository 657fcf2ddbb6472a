//! Repair queue service

use crate::{
    error::AppResult,
    models::repair::{RepairItem, RepairQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct RepairsService {
    repository: Repository,
}

impl RepairsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &RepairQuery) -> AppResult<Vec<RepairItem>> {
        self.repository.repairs.list(query).await
    }
}
