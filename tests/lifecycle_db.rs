//! Lending lifecycle tests against a real PostgreSQL database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test lifecycle_db -- --ignored

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use kultura_server::{
    api,
    config::{AppConfig, LendingConfig},
    error::AppError,
    models::{
        borrowing::{ApproveBorrowingRequest, ApprovedItem, CreateBorrowingRequest, RequestedItems},
        enums::{BorrowingStatus, CurrentStatus, EquipmentCategory, RepairStatus, ReturnCondition, ReturnStatus},
        return_request::{ReturnLine, SubmitReturn},
        user::{Role, UserClaims},
    },
    repository::Repository,
    services::{borrowing::build_listing, Services},
    AppState,
};

const STUDENT: &str = "2021-00123";
const OTHER_STUDENT: &str = "2020-99999";
const STAFF: &str = "staff-1";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn services(pool: &PgPool) -> Services {
    Services::new(Repository::new(pool.clone()), LendingConfig::default())
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn seed_item(pool: &PgPool, name: &str, category: EquipmentCategory) -> i32 {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO inventory_items (name, category, quantity_available) VALUES ($1, $2, 10) RETURNING id",
    )
    .bind(name)
    .bind(category)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

fn new_request(category: EquipmentCategory, description: &str) -> CreateBorrowingRequest {
    let mut requested = RequestedItems::new();
    requested.insert(category, description.to_string());
    CreateBorrowingRequest {
        requested_items: requested,
        date_of_request: Some(date("2025-06-01")),
        dates_of_use: "June 5-9".to_string(),
        purpose: "Cultural night".to_string(),
        contact_person: "Maria Santos".to_string(),
        contact_number: "09171234567".to_string(),
        organization: Some("Dance Troupe".to_string()),
    }
}

/// Create and approve a loan of `quantity` units of one item
async fn active_loan(svc: &Services, student: &str, item_id: i32, item_name: &str, quantity: i32) -> i32 {
    let request = svc
        .borrowing
        .create(student, &new_request(EquipmentCategory::Costumes, item_name))
        .await
        .unwrap();
    svc.borrowing
        .approve(
            request.id,
            &ApproveBorrowingRequest {
                items: vec![ApprovedItem {
                    item_id,
                    item_name: item_name.to_string(),
                    quantity,
                }],
                due_date: date("2025-06-10"),
                remarks: None,
            },
            STAFF,
        )
        .await
        .unwrap();
    request.id
}

fn line(borrowing_request_id: i32, item_id: i32, item_name: &str) -> ReturnLine {
    ReturnLine {
        borrowing_request_id,
        item_id,
        item_name: item_name.to_string(),
        quantity: None,
    }
}

fn submission(items: Vec<ReturnLine>, conditions: &[ReturnCondition]) -> SubmitReturn {
    SubmitReturn {
        items,
        conditions: conditions.iter().copied().collect(),
        remarks: None,
    }
}

async fn current_status(svc: &Services, id: i32) -> Option<CurrentStatus> {
    svc.borrowing.get_by_id(id).await.unwrap().current_status
}

// ---------------------------------------------------------------------------
// Request and approval
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn barong_request_lists_active_then_overdue(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;

    let request = svc
        .borrowing
        .create(STUDENT, &new_request(EquipmentCategory::Costumes, "Barong x2"))
        .await
        .unwrap();
    assert_eq!(request.status, BorrowingStatus::Pending);
    assert_eq!(request.current_status, None);

    let approved = svc
        .borrowing
        .approve(
            request.id,
            &ApproveBorrowingRequest {
                items: vec![ApprovedItem {
                    item_id: barong,
                    item_name: "Barong Tagalog".to_string(),
                    quantity: 2,
                }],
                due_date: date("2025-06-10"),
                remarks: Some("Handle with care".to_string()),
            },
            STAFF,
        )
        .await
        .unwrap();
    assert_eq!(approved.status, BorrowingStatus::Approved);
    assert_eq!(approved.current_status, Some(CurrentStatus::Active));
    assert_eq!(approved.reviewed_by.as_deref(), Some(STAFF));

    let requests = svc.repository.borrowing.list_for_student(STUDENT).await.unwrap();

    let before = build_listing(&requests, date("2025-06-10").and_hms_opt(23, 59, 58).unwrap());
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].item_name, "Barong Tagalog (Qty: 2)");
    assert_eq!(before[0].status_label, "Active");

    let after = build_listing(&requests, date("2025-06-11").and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(after[0].status_label, "Overdue");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn invalid_approval_leaves_request_pending(pool: PgPool) {
    let svc = services(&pool);
    let request = svc
        .borrowing
        .create(STUDENT, &new_request(EquipmentCategory::Props, "Fans x10"))
        .await
        .unwrap();

    let early = ApproveBorrowingRequest {
        items: vec![ApprovedItem {
            item_id: 1,
            item_name: "Fan".to_string(),
            quantity: 10,
        }],
        due_date: date("2025-05-31"),
        remarks: None,
    };
    let result = svc.borrowing.approve(request.id, &early, STAFF).await;
    assert!(matches!(result, Err(AppError::ApprovalValidation(_))));

    let zero = ApproveBorrowingRequest {
        items: vec![ApprovedItem {
            item_id: 1,
            item_name: "Fan".to_string(),
            quantity: 0,
        }],
        due_date: date("2025-06-10"),
        remarks: None,
    };
    let result = svc.borrowing.approve(request.id, &zero, STAFF).await;
    assert!(matches!(result, Err(AppError::ApprovalValidation(_))));

    let unchanged = svc.borrowing.get_by_id(request.id).await.unwrap();
    assert_eq!(unchanged.status, BorrowingStatus::Pending);
    assert!(unchanged.approved_items.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn rejected_request_is_terminal(pool: PgPool) {
    let svc = services(&pool);
    let request = svc
        .borrowing
        .create(STUDENT, &new_request(EquipmentCategory::Instruments, "Kulintang"))
        .await
        .unwrap();

    let rejected = svc
        .borrowing
        .reject(request.id, &Default::default(), STAFF)
        .await
        .unwrap();
    assert_eq!(rejected.status, BorrowingStatus::Rejected);

    let again = svc.borrowing.reject(request.id, &Default::default(), STAFF).await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));

    let approve = ApproveBorrowingRequest {
        items: vec![ApprovedItem {
            item_id: 1,
            item_name: "Kulintang".to_string(),
            quantity: 1,
        }],
        due_date: date("2025-06-10"),
        remarks: None,
    };
    let result = svc.borrowing.approve(request.id, &approve, STAFF).await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));
}

// ---------------------------------------------------------------------------
// Return submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn good_return_across_two_loans(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    let drum = seed_item(&pool, "Dabakan", EquipmentCategory::Instruments).await;
    let first = active_loan(&svc, STUDENT, barong, "Barong Tagalog", 2).await;
    let second = active_loan(&svc, STUDENT, drum, "Dabakan", 1).await;

    let receipt = svc
        .returns
        .submit(
            STUDENT,
            &submission(
                vec![line(first, barong, "Barong Tagalog"), line(second, drum, "Dabakan")],
                &[ReturnCondition::GoodCondition],
            ),
        )
        .await
        .unwrap();

    assert_eq!(receipt.returns.len(), 2);
    assert!(receipt.repairs.is_empty());
    assert_eq!(receipt.borrowing_request_ids, vec![first, second]);
    assert!(receipt
        .returns
        .iter()
        .all(|r| r.status == ReturnStatus::Pending && r.condition_notes == "Good condition"));
    assert!(receipt.returns.iter().all(|r| r.quantity_returned == 1));

    assert_eq!(count(&pool, "return_requests").await, 2);
    assert_eq!(count(&pool, "repair_items").await, 0);
    assert_eq!(current_status(&svc, first).await, Some(CurrentStatus::PendingReturn));
    assert_eq!(current_status(&svc, second).await, Some(CurrentStatus::PendingReturn));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn damaged_return_queues_repair(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    let loan = active_loan(&svc, STUDENT, barong, "Barong Tagalog", 2).await;

    let mut sub = submission(
        vec![line(loan, barong, "Barong Tagalog")],
        &[ReturnCondition::WithDamage],
    );
    sub.remarks = Some("Torn sleeve".to_string());
    let receipt = svc.returns.submit(STUDENT, &sub).await.unwrap();

    assert_eq!(receipt.returns.len(), 1);
    assert_eq!(receipt.repairs.len(), 1);
    let repair = &receipt.repairs[0];
    assert_eq!(repair.repair_status, RepairStatus::Damaged);
    assert_eq!(repair.category, EquipmentCategory::Costumes);
    assert_eq!(repair.reported_by_student_id, STUDENT);
    assert!(repair.notes.as_deref().unwrap_or_default().contains("Torn sleeve"));

    assert_eq!(count(&pool, "return_requests").await, 1);
    assert_eq!(count(&pool, "repair_items").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn return_of_foreign_loan_writes_nothing(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    let theirs = active_loan(&svc, OTHER_STUDENT, barong, "Barong Tagalog", 1).await;

    let result = svc
        .returns
        .submit(
            STUDENT,
            &submission(vec![line(theirs, barong, "Barong Tagalog")], &[ReturnCondition::WithDamage]),
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));

    assert_eq!(count(&pool, "return_requests").await, 0);
    assert_eq!(count(&pool, "repair_items").await, 0);
    assert_eq!(current_status(&svc, theirs).await, Some(CurrentStatus::Active));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn return_without_condition_writes_nothing(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    let loan = active_loan(&svc, STUDENT, barong, "Barong Tagalog", 1).await;

    let result = svc
        .returns
        .submit(STUDENT, &submission(vec![line(loan, barong, "Barong Tagalog")], &[]))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    assert_eq!(count(&pool, "return_requests").await, 0);
    assert_eq!(current_status(&svc, loan).await, Some(CurrentStatus::Active));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_inventory_item_rolls_back_everything(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    let first = active_loan(&svc, STUDENT, barong, "Barong Tagalog", 1).await;
    // Approved with an item id the catalog does not know
    let second = active_loan(&svc, STUDENT, 9_999, "Ghost prop", 1).await;

    let result = svc
        .returns
        .submit(
            STUDENT,
            &submission(
                vec![line(first, barong, "Barong Tagalog"), line(second, 9_999, "Ghost prop")],
                &[ReturnCondition::GoodCondition, ReturnCondition::WithDamage],
            ),
        )
        .await;
    assert!(matches!(result, Err(AppError::DependencyResolution(_))));

    // The first line's return and repair rows were rolled back with the failure
    assert_eq!(count(&pool, "return_requests").await, 0);
    assert_eq!(count(&pool, "repair_items").await, 0);
    assert_eq!(current_status(&svc, first).await, Some(CurrentStatus::Active));
    assert_eq!(current_status(&svc, second).await, Some(CurrentStatus::Active));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_returns_for_same_loan_succeed_once(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    let loan = active_loan(&svc, STUDENT, barong, "Barong Tagalog", 1).await;

    let sub = submission(vec![line(loan, barong, "Barong Tagalog")], &[ReturnCondition::GoodCondition]);
    let (a, b) = tokio::join!(
        svc.returns.submit(STUDENT, &sub),
        svc.returns.submit(STUDENT, &sub)
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    for result in [a, b] {
        if let Err(e) = result {
            assert!(matches!(e, AppError::InvalidState(_)), "unexpected error: {:?}", e);
        }
    }
    assert_eq!(count(&pool, "return_requests").await, 1);
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn status_only_moves_forward(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    let loan = active_loan(&svc, STUDENT, barong, "Barong Tagalog", 1).await;

    // Cannot close a loan that was never returned
    let early = svc.borrowing.confirm_return(loan, STAFF).await;
    assert!(matches!(early, Err(AppError::InvalidState(_))));
    assert_eq!(current_status(&svc, loan).await, Some(CurrentStatus::Active));

    let sub = submission(vec![line(loan, barong, "Barong Tagalog")], &[ReturnCondition::GoodCondition]);
    svc.returns.submit(STUDENT, &sub).await.unwrap();

    let confirmed = svc.borrowing.confirm_return(loan, STAFF).await.unwrap();
    assert_eq!(confirmed.request.current_status, Some(CurrentStatus::Returned));
    assert_eq!(confirmed.returns.len(), 1);
    assert_eq!(confirmed.returns[0].status, ReturnStatus::Confirmed);
    assert_eq!(confirmed.returns[0].confirmed_by.as_deref(), Some(STAFF));

    // Returned is terminal for both paths
    let again = svc.returns.submit(STUDENT, &sub).await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));
    let twice = svc.borrowing.confirm_return(loan, STAFF).await;
    assert!(matches!(twice, Err(AppError::InvalidState(_))));
    assert_eq!(current_status(&svc, loan).await, Some(CurrentStatus::Returned));

    let listing = svc.borrowing.loan_listing(STUDENT).await.unwrap();
    assert_eq!(listing[0].status_label, "Returned");
    assert!(!listing[0].returnable);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn stats_derive_overdue_at_read_time(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    // Due 2025-06-10, long past by now
    active_loan(&svc, STUDENT, barong, "Barong Tagalog", 1).await;
    svc.borrowing
        .create(STUDENT, &new_request(EquipmentCategory::Props, "Fans"))
        .await
        .unwrap();

    let stats = svc.borrowing.loan_stats().await.unwrap();
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.active, 0);
    assert_eq!(stats.pending, 1);
}

// ---------------------------------------------------------------------------
// Over HTTP
// ---------------------------------------------------------------------------

fn student_token(sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    UserClaims {
        sub: sub.to_string(),
        role: Role::Student,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&AppConfig::default().auth.jwt_secret)
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn missing_conditions_field_matches_empty_conditions(pool: PgPool) {
    let svc = services(&pool);
    let barong = seed_item(&pool, "Barong Tagalog", EquipmentCategory::Costumes).await;
    let loan = active_loan(&svc, STUDENT, barong, "Barong Tagalog", 1).await;

    let app = api::create_router(AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(svc.clone()),
    });
    let items = json!([{"borrowing_request_id": loan, "item_id": barong, "item_name": "Barong Tagalog"}]);

    let mut messages = Vec::new();
    for body in [json!({"items": items}), json!({"items": items, "conditions": []})] {
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/returns")
            .header(header::AUTHORIZATION, format!("Bearer {}", student_token(STUDENT)))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "BadValue");
        messages.push(json["message"].as_str().unwrap().to_string());
    }
    assert_eq!(messages[0], messages[1]);

    assert_eq!(count(&pool, "return_requests").await, 0);
    assert_eq!(current_status(&svc, loan).await, Some(CurrentStatus::Active));
}
