//! Borrowing requests repository

use chrono::{NaiveDate, Utc};
use sqlx::{types::Json, PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrowing::{
            ApprovedItem, BorrowingRequest, BorrowingRequestQuery, CreateBorrowingRequest,
            PageWindow, RequestedItems,
        },
        enums::{BorrowingStatus, CurrentStatus},
    },
};

/// Status columns only, for counting display states
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusRow {
    pub status: BorrowingStatus,
    pub current_status: Option<CurrentStatus>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct BorrowingRepository {
    pool: Pool<Postgres>,
}

impl BorrowingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrowing request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowingRequest> {
        sqlx::query_as::<_, BorrowingRequest>("SELECT * FROM borrowing_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing request {} not found", id)))
    }

    /// Insert a new pending request
    pub async fn create(
        &self,
        student_id: &str,
        requested: &RequestedItems,
        data: &CreateBorrowingRequest,
        date_of_request: NaiveDate,
    ) -> AppResult<BorrowingRequest> {
        let row = sqlx::query_as::<_, BorrowingRequest>(
            r#"
            INSERT INTO borrowing_requests (
                student_id, requested_items, status, date_of_request,
                dates_of_use, purpose, contact_person, contact_number, organization
            )
            VALUES ($1, $2, 'pending', $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(Json(requested))
        .bind(date_of_request)
        .bind(data.dates_of_use.trim())
        .bind(data.purpose.trim())
        .bind(data.contact_person.trim())
        .bind(data.contact_number.trim())
        .bind(data.organization.as_deref().map(str::trim))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// All requests of one student, newest first
    pub async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<BorrowingRequest>> {
        let rows = sqlx::query_as::<_, BorrowingRequest>(
            r#"
            SELECT * FROM borrowing_requests
            WHERE student_id = $1
            ORDER BY date_of_request DESC, id DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// List requests with optional status filter, one page at a time
    pub async fn list(
        &self,
        query: &BorrowingRequestQuery,
        window: PageWindow,
    ) -> AppResult<(Vec<BorrowingRequest>, i64)> {

        let where_clause = if query.status.is_some() {
            "WHERE status = $1"
        } else {
            ""
        };

        let count_q = format!("SELECT COUNT(*) FROM borrowing_requests {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(status) = query.status {
            count_builder = count_builder.bind(status);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM borrowing_requests {} ORDER BY crea_date DESC, id DESC LIMIT {} OFFSET {}",
            where_clause, window.per_page, window.offset
        );
        let mut builder = sqlx::query_as::<_, BorrowingRequest>(&select_q);
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }
        let rows = builder.fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    /// Status columns of every request
    pub async fn status_rows(&self) -> AppResult<Vec<StatusRow>> {
        let rows = sqlx::query_as::<_, StatusRow>(
            "SELECT status, current_status, due_date FROM borrowing_requests",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Approve a request that is still pending.
    ///
    /// Returns `None` when the request is no longer pending.
    pub async fn approve(
        &self,
        id: i32,
        items: &[ApprovedItem],
        due_date: NaiveDate,
        remarks: Option<&str>,
        staff_id: &str,
    ) -> AppResult<Option<BorrowingRequest>> {
        let row = sqlx::query_as::<_, BorrowingRequest>(
            r#"
            UPDATE borrowing_requests
            SET status = 'approved', current_status = 'active',
                approved_items = $2, due_date = $3, staff_remarks = $4,
                reviewed_by = $5, reviewed_at = $6, modif_date = $6
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(items))
        .bind(due_date)
        .bind(remarks)
        .bind(staff_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Reject a request that is still pending.
    ///
    /// Returns `None` when the request is no longer pending.
    pub async fn reject(
        &self,
        id: i32,
        reason: Option<&str>,
        staff_id: &str,
    ) -> AppResult<Option<BorrowingRequest>> {
        let row = sqlx::query_as::<_, BorrowingRequest>(
            r#"
            UPDATE borrowing_requests
            SET status = 'rejected', staff_remarks = $2,
                reviewed_by = $3, reviewed_at = $4, modif_date = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .bind(staff_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Lock the given requests for the rest of the transaction.
    ///
    /// Rows are locked in id order so concurrent submissions cannot deadlock.
    /// Unknown ids are simply absent from the result.
    pub async fn lock_many(conn: &mut PgConnection, ids: &[i32]) -> AppResult<Vec<BorrowingRequest>> {
        let rows = sqlx::query_as::<_, BorrowingRequest>(
            r#"
            SELECT * FROM borrowing_requests
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Move an approved request one step forward on the current-status axis.
    ///
    /// Returns `false` if the row was not in `from` anymore.
    pub async fn advance(
        conn: &mut PgConnection,
        id: i32,
        from: CurrentStatus,
        to: CurrentStatus,
    ) -> AppResult<bool> {
        if !from.can_advance_to(to) {
            return Err(AppError::Internal(format!(
                "Illegal status transition {:?} -> {:?}",
                from, to
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE borrowing_requests
            SET current_status = $3, modif_date = $4
            WHERE id = $1 AND status = 'approved' AND current_status = $2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
