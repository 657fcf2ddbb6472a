//! API integration tests against a running server

use reqwest::Client;
use serde_json::{json, Value};

use kultura_server::{
    config::AppConfig,
    models::user::{Role, UserClaims},
};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Mint a token signed with the default development secret
fn auth_token(role: Role, sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    UserClaims {
        sub: sub.to_string(),
        role,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&AppConfig::default().auth.jwt_secret)
    .expect("Failed to sign token")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/me/borrowing-requests", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_request_and_list_it() {
    let client = Client::new();
    let student = format!("it-{}", chrono::Utc::now().timestamp_millis());
    let token = auth_token(Role::Student, &student);

    let response = client
        .post(format!("{}/borrowing-requests", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "requested_items": {"costumes": "Barong x2"},
            "dates_of_use": "June 5-9",
            "purpose": "Cultural night",
            "contact_person": "Maria Santos",
            "contact_number": "09171234567"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(created["status"], "pending");
    assert!(created["current_status"].is_null());
    let id = created["id"].as_i64().expect("No id in response");

    let response = client
        .get(format!("{}/me/borrowing-requests", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let rows: Value = response.json().await.expect("Failed to parse response");
    let rows = rows.as_array().expect("Expected an array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["borrowing_request_id"].as_i64(), Some(id));
    assert_eq!(rows[0]["item_name"], "Costumes: Barong x2");
    assert_eq!(rows[0]["status_label"], "Pending");
    assert_eq!(rows[0]["returnable"], false);
}

#[tokio::test]
#[ignore]
async fn test_approve_then_return() {
    let client = Client::new();
    let student = format!("it-{}", chrono::Utc::now().timestamp_millis());
    let student_token = auth_token(Role::Student, &student);
    let staff_token = auth_token(Role::Staff, "it-staff");

    let created: Value = client
        .post(format!("{}/borrowing-requests", BASE_URL))
        .bearer_auth(&student_token)
        .json(&json!({
            "requested_items": {"instruments": "Kulintang"},
            "dates_of_use": "June 5",
            "purpose": "Recital",
            "contact_person": "Maria Santos",
            "contact_number": "09171234567"
        }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_i64().expect("No id in response");

    let response = client
        .post(format!("{}/borrowing-requests/{}/approve", BASE_URL, id))
        .bearer_auth(&staff_token)
        .json(&json!({
            "items": [{"item_id": 1, "item_name": "Kulintang", "quantity": 1}],
            "due_date": "2099-12-31"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/returns", BASE_URL))
        .bearer_auth(&student_token)
        .json(&json!({
            "items": [{"borrowing_request_id": id, "item_id": 1, "item_name": "Kulintang"}],
            "conditions": ["good_condition"]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let receipt: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(receipt["returns"].as_array().map(Vec::len), Some(1));
    assert_eq!(receipt["repairs"].as_array().map(Vec::len), Some(0));

    // A second submission for the same loan is refused
    let response = client
        .post(format!("{}/returns", BASE_URL))
        .bearer_auth(&student_token)
        .json(&json!({
            "items": [{"borrowing_request_id": id, "item_id": 1, "item_name": "Kulintang"}],
            "conditions": ["good_condition"]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_staff_routes_require_staff() {
    let client = Client::new();
    let token = auth_token(Role::Student, "it-student");

    for path in ["borrowing-requests", "repairs", "stats/loans"] {
        let response = client
            .get(format!("{}/{}", BASE_URL, path))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 403, "{}", path);
    }
}
