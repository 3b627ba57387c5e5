//! Account endpoint integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::{json, Value};
use shardbank_core::Region;

#[tokio::test]
async fn insert_account_lands_on_owner_shard() {
    let harness = TestHarness::new();
    let eve = harness.user("eve", Region::Eu);

    let response = harness
        .server
        .post("/api/insert/account")
        .json(&json!({
            "user_id": eve.get(),
            "account_number": "EU-100",
            "account_type": "savings",
            "balance": "250.75"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Account inserted successfully");
    assert_eq!(body["region"], "EU");
    assert_eq!(body["shard_location"], "SHARD2");

    let response = harness.server.get("/api/accounts").await;
    let rows: Vec<Value> = response.json();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["account_number"], "EU-100");
    assert_eq!(rows[0]["account_type"], "SAVINGS");
    assert_eq!(rows[0]["currency"], "USD");
    assert_eq!(rows[0]["balance"].as_f64(), Some(250.75));
    assert_eq!(rows[0]["user_id"], eve.get());
    assert_eq!(rows[0]["username"], "eve");
    assert!(rows[0]["account_id"].is_i64());
}

#[tokio::test]
async fn insert_account_for_unknown_user_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/insert/account")
        .json(&json!({
            "user_id": 404,
            "account_number": "X-1",
            "account_type": "CHECKING"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "user 404 not found");
}

#[tokio::test]
async fn insert_account_region_must_match_owner() {
    let harness = TestHarness::new();
    let eve = harness.user("eve", Region::Eu);

    let response = harness
        .server
        .post("/api/insert/account")
        .json(&json!({
            "user_id": eve.get(),
            "account_number": "EU-1",
            "account_type": "CHECKING",
            "region": "APAC"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn insert_account_rejects_negative_balance() {
    let harness = TestHarness::new();
    let eve = harness.user("eve", Region::Eu);

    let response = harness
        .server
        .post("/api/insert/account")
        .json(&json!({
            "user_id": eve.get(),
            "account_number": "EU-1",
            "account_type": "CHECKING",
            "balance": -5
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "balance must not be negative");
}

#[tokio::test]
async fn account_listing_keeps_colliding_ids_apart() {
    let harness = TestHarness::new();
    let ana = harness.user("ana", Region::Na);
    let eve = harness.user("eve", Region::Eu);
    harness.account(ana, "NA-1", 1);
    harness.account(eve, "EU-1", 2);

    let response = harness.server.get("/api/accounts").await;

    let rows: Vec<Value> = response.json();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["account_id"], rows[1]["account_id"]);
    assert_eq!(rows[0]["region"], "NA");
    assert_eq!(rows[1]["region"], "EU");
}

#[tokio::test]
async fn shard_resolution_reports_addresses() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/api/shards/resolve")
        .add_query_param("region", "eu")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["port"], 1523);
    assert_eq!(body["host"], "localhost");

    let response = harness.server.get("/api/shards/resolve").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["target"], "catalog");

    let response = harness
        .server
        .get("/api/shards/resolve")
        .add_query_param("region", "MARS")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
