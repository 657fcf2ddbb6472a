//! Inventory catalog service

use crate::{
    error::AppResult,
    models::inventory::{InventoryItem, InventoryQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &InventoryQuery) -> AppResult<Vec<InventoryItem>> {
        self.repository.inventory.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<InventoryItem> {
        self.repository.inventory.get_by_id(id).await
    }
}
