//! Repository layer for database operations

pub mod borrowing;
pub mod inventory;
pub mod repairs;
pub mod returns;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub borrowing: borrowing::BorrowingRepository,
    pub returns: returns::ReturnsRepository,
    pub repairs: repairs::RepairsRepository,
    pub inventory: inventory::InventoryRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            borrowing: borrowing::BorrowingRepository::new(pool.clone()),
            returns: returns::ReturnsRepository::new(pool.clone()),
            repairs: repairs::RepairsRepository::new(pool.clone()),
            inventory: inventory::InventoryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Start a transaction; it rolls back unless committed
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
