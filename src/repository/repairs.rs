//! Repair queue repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    models::repair::{NewRepairItem, RepairItem, RepairQuery},
};

#[derive(Clone)]
pub struct RepairsRepository {
    pool: Pool<Postgres>,
}

impl RepairsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Queue a damaged item; the status is always `damaged` on creation
    pub async fn insert(conn: &mut PgConnection, data: &NewRepairItem) -> AppResult<RepairItem> {
        let row = sqlx::query_as::<_, RepairItem>(
            r#"
            INSERT INTO repair_items (
                item_id, item_name, category, quantity, repair_status,
                date_reported, reported_by_student_id, notes
            )
            VALUES ($1, $2, $3, $4, 'damaged', $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.item_id)
        .bind(&data.item_name)
        .bind(data.category)
        .bind(data.quantity)
        .bind(data.date_reported)
        .bind(&data.reported_by_student_id)
        .bind(&data.notes)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// List the repair queue, newest first
    pub async fn list(&self, query: &RepairQuery) -> AppResult<Vec<RepairItem>> {
        let rows = match query.repair_status {
            Some(status) => {
                sqlx::query_as::<_, RepairItem>(
                    "SELECT * FROM repair_items WHERE repair_status = $1 ORDER BY date_reported DESC, id DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RepairItem>(
                    "SELECT * FROM repair_items ORDER BY date_reported DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}
