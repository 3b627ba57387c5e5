//! User endpoint integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::{json, Value};
use shardbank_core::Region;
use shardbank_store::Target;

// ============================================================================
// Insert
// ============================================================================

#[tokio::test]
async fn insert_user_then_list_shows_empty_totals() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/insert/user")
        .json(&json!({
            "username": "mia",
            "email": "mia@example.com",
            "full_name": "Mia Chen",
            "region": "apac"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User inserted successfully");
    assert_eq!(body["region"], "APAC");
    assert_eq!(body["shard_location"], "SHARD3");
    let user_id = body["user_id"].as_i64().unwrap();

    let response = harness.server.get("/api/users/list").await;
    response.assert_status_ok();
    let rows: Vec<Value> = response.json();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"], user_id);
    assert_eq!(rows[0]["username"], "mia");
    assert_eq!(rows[0]["account_count"], 0);
    assert_eq!(rows[0]["total_balance"].as_f64(), Some(0.0));
    assert_eq!(rows[0]["phone"], Value::Null);
}

#[tokio::test]
async fn insert_user_defaults_to_na() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/insert/user")
        .json(&json!({
            "username": "sam",
            "email": "sam@example.com",
            "full_name": "Sam Ode"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["region"], "NA");
}

#[tokio::test]
async fn insert_user_requires_fields() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/insert/user")
        .json(&json!({ "username": "sam", "full_name": "Sam Ode" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "email is required");
}

#[tokio::test]
async fn insert_user_rejects_unknown_region() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/insert/user")
        .json(&json!({
            "username": "sam",
            "email": "sam@example.com",
            "full_name": "Sam Ode",
            "region": "LATAM"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid region: LATAM. Must be NA, EU, or APAC");
}

#[tokio::test]
async fn insert_user_with_malformed_body_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/insert/user")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn insert_user_with_shard_down_is_connection_failure() {
    let harness = TestHarness::new();
    harness.backend.set_offline(Target::Shard(Region::Eu), true);

    let response = harness
        .server
        .post("/api/insert/user")
        .json(&json!({
            "username": "eve",
            "email": "eve@example.com",
            "full_name": "Eve",
            "region": "EU"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Database connection failed");
}

// ============================================================================
// Listings and lookup
// ============================================================================

#[tokio::test]
async fn directory_is_ordered_by_username() {
    let harness = TestHarness::new();
    harness.user("zoe", Region::Na);
    harness.user("adam", Region::Eu);

    let response = harness.server.get("/api/users").await;

    response.assert_status_ok();
    let rows: Vec<Value> = response.json();
    let names: Vec<_> = rows.iter().map(|r| r["username"].clone()).collect();
    assert_eq!(names, [json!("adam"), json!("zoe")]);
    assert!(rows[0]["user_id"].is_i64());
    assert_eq!(rows[0].as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn list_counts_accounts_per_user() {
    let harness = TestHarness::new();
    let ana = harness.user("ana", Region::Na);
    harness.account(ana, "NA-1", 10);
    harness.account(ana, "NA-2", 15);

    let response = harness.server.get("/api/users/list").await;

    let rows: Vec<Value> = response.json();
    assert_eq!(rows[0]["account_count"], 2);
    assert_eq!(rows[0]["total_balance"].as_f64(), Some(25.0));
}

#[tokio::test]
async fn lookup_finds_user_on_any_shard() {
    let harness = TestHarness::new();
    let kai = harness.user("kai", Region::Apac);

    let response = harness
        .server
        .get("/api/users/lookup")
        .add_query_param("username", "kai")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user_id"], kai.get());
    assert_eq!(body["region"], "APAC");
    assert_eq!(body["shard_location"], "SHARD3");
}

#[tokio::test]
async fn lookup_of_missing_user_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/api/users/lookup")
        .add_query_param("username", "ghost")
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "user ghost not found");
}

#[tokio::test]
async fn lookup_requires_username() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/users/lookup").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
