//! Client tests against a mocked shardbank service.

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shardbank_client::{ClientError, CreateUser, Region, ShardbankClient, TransactionRequest};

async fn setup() -> (MockServer, ShardbankClient) {
    let server = MockServer::start().await;
    let client = ShardbankClient::new(server.uri()).unwrap();
    (server, client)
}

#[tokio::test]
async fn health_parses_response() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "service": "shardbank",
            "version": "0.1.0"
        })))
        .mount(&server)
        .await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "shardbank");
}

#[tokio::test]
async fn ready_reports_catalog_address() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/health/ready"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ready",
            "catalog": "db-catalog:1521"
        })))
        .mount(&server)
        .await;

    let ready = client.ready().await.unwrap();
    assert_eq!(ready.status, "ready");
    assert_eq!(ready.catalog, "db-catalog:1521");
}

#[tokio::test]
async fn regional_stats_returns_rows() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/regional"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"region": "NA", "user_count": 2.0, "total_balance": 150.0},
            {"region": "EU", "user_count": 1.0, "total_balance": 0.0}
        ])))
        .mount(&server)
        .await;

    let rows = client.regional_stats().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["region"], "NA");
    assert_eq!(rows[1]["user_count"], 1.0);
}

#[tokio::test]
async fn overall_stats_error_carries_details() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/overall"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Database connection failed",
            "details": "Check database is running and connection settings"
        })))
        .mount(&server)
        .await;

    let err = client.overall_stats().await.unwrap_err();
    match err {
        ClientError::Api {
            status,
            message,
            details,
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Database connection failed");
            assert_eq!(
                details.as_deref(),
                Some("Check database is running and connection settings")
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn lookup_user_sends_username() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/lookup"))
        .and(query_param("username", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": 7,
            "region": "EU",
            "shard_location": "SHARD2"
        })))
        .mount(&server)
        .await;

    let user = client.lookup_user("alice").await.unwrap().unwrap();
    assert_eq!(user.region, Region::Eu);
    assert_eq!(user.shard_location, Region::Eu.shard_location());
}

#[tokio::test]
async fn lookup_missing_user_is_none() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/lookup"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "user ghost not found"})),
        )
        .mount(&server)
        .await;

    assert!(client.lookup_user("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn resolve_shard_passes_region_code() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/shards/resolve"))
        .and(query_param("region", "APAC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "target": "APAC",
            "host": "db-shard3",
            "port": 1521,
            "service_name": "FREEPDB1"
        })))
        .mount(&server)
        .await;

    let endpoint = client.resolve_shard(Some(Region::Apac)).await.unwrap();
    assert_eq!(endpoint.target, "APAC");
    assert_eq!(endpoint.port, 1521);
}

#[tokio::test]
async fn insert_user_flattens_location() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/insert/user"))
        .and(body_partial_json(json!({"username": "bob", "region": "NA"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "User inserted successfully",
            "user_id": 12,
            "region": "NA",
            "shard_location": "SHARD1"
        })))
        .mount(&server)
        .await;

    let user = CreateUser {
        username: "bob".into(),
        email: "bob@example.com".into(),
        full_name: "Bob Builder".into(),
        region: Some(Region::Na),
        ..CreateUser::default()
    };
    let created = client.insert_user(&user).await.unwrap();
    assert!(created.success);
    assert_eq!(created.message, "User inserted successfully");
    assert_eq!(created.data.region, Region::Na);
}

#[tokio::test]
async fn transfer_reports_saga() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/insert/transaction"))
        .and(body_partial_json(json!({
            "transaction_type": "TRANSFER",
            "from_account_number": "NA-001",
            "to_account_number": "EU-001"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Transfer completed successfully",
            "transaction_type": "TRANSFER",
            "shards": ["NA", "EU"],
            "saga_id": "6f1c2b8e-8a44-4f1e-9c7a-0d1f2e3a4b5c"
        })))
        .mount(&server)
        .await;

    let request =
        TransactionRequest::transfer_between_numbers("NA-001", "EU-001", Decimal::new(25, 0))
            .with_description("rent");
    let result = client.insert_transaction(&request).await.unwrap();
    assert_eq!(result.data.shards, vec![Region::Na, Region::Eu]);
    assert!(result.data.saga_id.is_some());
}

#[tokio::test]
async fn rejected_transaction_is_bad_request() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/insert/transaction"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "cross-shard transfers are not supported"
        })))
        .mount(&server)
        .await;

    let request = TransactionRequest::transfer_between_numbers("NA-001", "EU-001", Decimal::ONE);
    let err = client.insert_transaction(&request).await.unwrap_err();
    assert!(err.is_bad_request());
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn non_json_error_falls_back_to_status() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.accounts().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}
