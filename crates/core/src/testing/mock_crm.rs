//! Mock CRM for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::crm::{Account, CaseId, CrmConnector, CrmError, CrmSession, NewCase};

#[derive(Debug, Default)]
struct MockCrmState {
    accounts: Vec<Account>,
    created: Vec<NewCase>,
    connections: usize,
    queries: Vec<u32>,
    fail_connect: bool,
    fail_query: bool,
    fail_create: bool,
}

/// Mock implementation of `CrmConnector` and its sessions.
///
/// Provides controllable behavior for testing:
/// - Configurable account list
/// - Records every created case and every query limit
/// - Sticky failure switches for connect, query and create
///
/// Clones share state, so a test can keep a handle after passing a clone
/// into the workflow.
#[derive(Debug, Clone, Default)]
pub struct MockCrm {
    state: Arc<RwLock<MockCrmState>>,
}

impl MockCrm {
    /// Create a mock CRM with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the accounts returned by queries.
    pub async fn set_accounts(&self, accounts: Vec<Account>) {
        self.state.write().await.accounts = accounts;
    }

    /// Make `connect` fail until reset.
    pub async fn set_fail_connect(&self, fail: bool) {
        self.state.write().await.fail_connect = fail;
    }

    /// Make account queries fail until reset.
    pub async fn set_fail_query(&self, fail: bool) {
        self.state.write().await.fail_query = fail;
    }

    /// Make case creation fail until reset.
    pub async fn set_fail_create(&self, fail: bool) {
        self.state.write().await.fail_create = fail;
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Cases created so far, in order.
    pub async fn created_cases(&self) -> Vec<NewCase> {
        self.state.read().await.created.clone()
    }

    /// Number of sessions opened.
    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections
    }

    /// Limits passed to `query_accounts`, in order.
    pub async fn recorded_query_limits(&self) -> Vec<u32> {
        self.state.read().await.queries.clone()
    }
}

#[async_trait]
impl CrmConnector for MockCrm {
    fn name(&self) -> &str {
        "mock-crm"
    }

    async fn connect(&self) -> Result<Box<dyn CrmSession>, CrmError> {
        let mut state = self.state.write().await;
        if state.fail_connect {
            return Err(CrmError::AuthenticationFailed(
                "INVALID_LOGIN: mock credentials rejected".to_string(),
            ));
        }
        state.connections += 1;

        Ok(Box::new(MockCrmSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockCrmSession {
    state: Arc<RwLock<MockCrmState>>,
}

#[async_trait]
impl CrmSession for MockCrmSession {
    async fn query_accounts(&self, limit: u32) -> Result<Vec<Account>, CrmError> {
        let mut state = self.state.write().await;
        state.queries.push(limit);
        if state.fail_query {
            return Err(CrmError::Api {
                status: 500,
                message: "mock query failure".to_string(),
            });
        }

        Ok(state
            .accounts
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_case(&self, case: &NewCase) -> Result<CaseId, CrmError> {
        let mut state = self.state.write().await;
        if state.fail_create {
            return Err(CrmError::Rejected(vec![
                "REQUIRED_FIELD_MISSING: mock rejection".to_string(),
            ]));
        }

        state.created.push(case.clone());
        Ok(CaseId(format!("500{:012}", state.created.len())))
    }
}
