//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without Salesforce
//! or a text generation API.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use casegen_core::{
    load_config_from_str,
    testing::{FixedRandom, MockCrm, MockGenerator},
    CaseWorkflow, CrmConnector, GenerateMode, RandomSource,
};
use casegen_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use casegen_core::testing::fixtures;

const BASE_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[crm]
username = "ops@example.com"
password = "secret"

[generator]
api_key = "sk-test"
"#;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - The CRM (MockCrm)
/// - Content generation (MockGenerator)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_generate() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.post("/generate-case").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock CRM - configure accounts and failures, inspect created cases
    pub crm: MockCrm,
    /// Mock generator - configure replies, inspect requested accounts
    pub generator: MockGenerator,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let mut config = load_config_from_str(BASE_CONFIG).expect("Failed to parse test config");
        config.workflow.mode = test_config.mode;
        config.workflow.batch_runs = test_config.batch_runs;

        let crm = MockCrm::new();
        crm.set_accounts(fixtures::accounts(test_config.accounts))
            .await;
        let generator = MockGenerator::new();

        let connector: Arc<dyn CrmConnector> = Arc::new(crm.clone());
        let workflow = CaseWorkflow::new(
            Arc::clone(&connector),
            Arc::new(generator.clone()),
            config.workflow.clone(),
        )
        .with_random(test_config.random);

        let state = Arc::new(AppState::new(config, connector, workflow));
        let router = create_router(state);

        Self {
            router,
            crm,
            generator,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Configuration for test fixture.
#[derive(Clone)]
pub struct TestConfig {
    pub mode: GenerateMode,
    pub batch_runs: u32,
    /// Number of accounts the mock CRM holds
    pub accounts: usize,
    pub random: Arc<dyn RandomSource>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            mode: GenerateMode::Single,
            batch_runs: 10,
            accounts: 3,
            // below the 0.7 threshold, so runs tag the first account
            random: Arc::new(FixedRandom::new(0.25, 0)),
        }
    }
}

impl TestConfig {
    /// Create config with batch mode enabled.
    pub fn batch() -> Self {
        Self {
            mode: GenerateMode::Batch,
            ..Default::default()
        }
    }

    /// Never tag a case with an account.
    pub fn untagged(mut self) -> Self {
        self.random = Arc::new(FixedRandom::new(0.99, 0));
        self
    }

    pub fn with_accounts(mut self, accounts: usize) -> Self {
        self.accounts = accounts;
        self
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
