//! Return requests repository

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{error::AppResult, models::return_request::ReturnRequest};

/// Return line to insert
#[derive(Debug, Clone)]
pub struct NewReturnRequest<'a> {
    pub borrowing_request_id: i32,
    pub student_id: &'a str,
    pub item_id: i32,
    pub item_name: &'a str,
    pub quantity_returned: i32,
    pub condition_notes: &'a str,
    pub remarks: Option<&'a str>,
}

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: Pool<Postgres>,
}

impl ReturnsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a pending return line
    pub async fn insert(conn: &mut PgConnection, data: &NewReturnRequest<'_>) -> AppResult<ReturnRequest> {
        let row = sqlx::query_as::<_, ReturnRequest>(
            r#"
            INSERT INTO return_requests (
                borrowing_request_id, student_id, item_id, item_name,
                quantity_returned, condition_notes, remarks, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(data.borrowing_request_id)
        .bind(data.student_id)
        .bind(data.item_id)
        .bind(data.item_name)
        .bind(data.quantity_returned)
        .bind(data.condition_notes)
        .bind(data.remarks)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Confirm every pending return line of a borrowing request
    pub async fn confirm_for_request(
        conn: &mut PgConnection,
        borrowing_request_id: i32,
        staff_id: &str,
    ) -> AppResult<Vec<ReturnRequest>> {
        let rows = sqlx::query_as::<_, ReturnRequest>(
            r#"
            UPDATE return_requests
            SET status = 'confirmed', confirmed_by = $2, confirmed_at = $3
            WHERE borrowing_request_id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(borrowing_request_id)
        .bind(staff_id)
        .bind(Utc::now())
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Return lines submitted by a student, newest first
    pub async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<ReturnRequest>> {
        let rows = sqlx::query_as::<_, ReturnRequest>(
            "SELECT * FROM return_requests WHERE student_id = $1 ORDER BY crea_date DESC, id DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
