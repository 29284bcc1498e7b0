//! End-to-end tests with mocked external dependencies.
//!
//! These tests run the full router in-process with mock implementations
//! for the CRM and the content generator.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestConfig, TestFixture};

// =============================================================================
// Health & Metrics
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_health_does_not_touch_crm() {
    let fixture = TestFixture::new().await;
    fixture.crm.set_fail_connect(true).await;

    let response = fixture.get("/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(fixture.crm.connection_count().await, 0);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_workflow_counters() {
    let fixture = TestFixture::new().await;
    fixture.post("/generate-case").await;

    let response = fixture.get("/metrics").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("casegen_workflow_runs_total"));
    assert!(response.text.contains("casegen_http_requests_total"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/tickets").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_case_requires_post() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/generate-case").await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(fixture.crm.created_cases().await.is_empty());
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_list_accounts() {
    let fixture = TestFixture::with_config(TestConfig::default().with_accounts(2)).await;

    let response = fixture.get("/accounts").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "success");
    let accounts = response.body["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0]["Id"], "001000000000001");
    assert_eq!(accounts[0]["Name"], fixtures::accounts(2)[0].name.as_str());
}

#[tokio::test]
async fn test_list_accounts_connection_failure_is_500() {
    let fixture = TestFixture::new().await;
    fixture.crm.set_fail_connect(true).await;

    let response = fixture.get("/accounts").await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["status"], "error");
    assert_eq!(response.body["message"], "Failed to connect to Salesforce");
}

#[tokio::test]
async fn test_list_accounts_query_failure_is_empty_list() {
    let fixture = TestFixture::new().await;
    fixture.crm.set_fail_query(true).await;

    let response = fixture.get("/accounts").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["accounts"], json!([]));
}

// =============================================================================
// Single-shot generation
// =============================================================================

#[tokio::test]
async fn test_generate_case_success() {
    let fixture = TestFixture::new().await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "success");
    assert_eq!(response.body["message"], "Case generated successfully");
    assert_eq!(response.body["case_id"], "500000000000001");

    let created = fixture.crm.created_cases().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].subject, fixtures::content().subject);
    assert_eq!(created[0].account_id.as_deref(), Some("001000000000001"));
}

#[tokio::test]
async fn test_generate_case_without_account() {
    let fixture = TestFixture::with_config(TestConfig::default().untagged()).await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(fixture.crm.created_cases().await[0].account_id, None);
    assert_eq!(fixture.generator.recorded_accounts().await, vec![None]);
}

#[tokio::test]
async fn test_generate_case_empty_account_list_still_creates() {
    let fixture = TestFixture::with_config(TestConfig::default().with_accounts(0)).await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::OK);
    let created = fixture.crm.created_cases().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].account_id, None);
}

#[tokio::test]
async fn test_generate_case_connection_failure() {
    let fixture = TestFixture::new().await;
    fixture.crm.set_fail_connect(true).await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["status"], "error");
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("connect"));
    assert!(fixture.generator.recorded_accounts().await.is_empty());
}

#[tokio::test]
async fn test_generate_case_incomplete_content() {
    let fixture = TestFixture::new().await;
    fixture.generator.set_reply(json!({"subject": "X"})).await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["status"], "error");
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("description"));
    assert!(fixture.crm.created_cases().await.is_empty());
}

#[tokio::test]
async fn test_generate_case_creation_rejected() {
    let fixture = TestFixture::new().await;
    fixture.crm.set_fail_create(true).await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("REQUIRED_FIELD_MISSING"));
}

// =============================================================================
// Batch generation
// =============================================================================

#[tokio::test]
async fn test_generate_batch_all_succeed() {
    let fixture = TestFixture::with_config(TestConfig::batch()).await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "completed");
    assert_eq!(response.body["success_count"], 10);

    let results = response.body["results"].as_array().unwrap();
    assert_eq!(results.len(), 10);
    assert_eq!(results[0]["run"], 1);
    assert_eq!(results[9]["run"], 10);
    assert!(results.iter().all(|r| r["status"] == "success"));
    assert_eq!(fixture.crm.created_cases().await.len(), 10);
}

#[tokio::test]
async fn test_generate_batch_reports_failures_with_200() {
    let fixture = TestFixture::with_config(TestConfig::batch()).await;
    fixture.generator.fail_every_nth(2).await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success_count"], 5);

    let results = response.body["results"].as_array().unwrap();
    let successes = results.iter().filter(|r| r["status"] == "success").count();
    assert_eq!(successes, 5);
    assert_eq!(results[1]["status"], "error");
    assert!(results[1]["message"].is_string());
    assert!(results[1].get("case_id").is_none());
}

#[tokio::test]
async fn test_generate_batch_connection_down() {
    let fixture = TestFixture::with_config(TestConfig::batch()).await;
    fixture.crm.set_fail_connect(true).await;

    let response = fixture.post("/generate-case").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success_count"], 0);
    assert_eq!(response.body["results"].as_array().unwrap().len(), 10);
}
