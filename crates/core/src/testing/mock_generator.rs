//! Mock content generator for testing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::crm::Account;
use crate::generator::{ContentGenerator, GeneratedContent, GeneratorError, LlmError};

use super::fixtures;

#[derive(Debug)]
struct MockGeneratorState {
    reply: Value,
    fail: bool,
    fail_every: Option<usize>,
    calls: Vec<Option<Account>>,
}

/// Mock implementation of `ContentGenerator`.
///
/// The configured reply goes through the same shape validation as real
/// model output, so `{"subject": "X"}` fails exactly like it would live.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    state: Arc<RwLock<MockGeneratorState>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        let reply = serde_json::to_value(fixtures::content()).unwrap_or(Value::Null);
        Self {
            state: Arc::new(RwLock::new(MockGeneratorState {
                reply,
                fail: false,
                fail_every: None,
                calls: Vec::new(),
            })),
        }
    }

    /// Raw reply to validate on each call.
    pub async fn set_reply(&self, reply: Value) {
        self.state.write().await.reply = reply;
    }

    /// Fail every call with an upstream error until reset.
    pub async fn set_fail(&self, fail: bool) {
        self.state.write().await.fail = fail;
    }

    /// Fail every `n`th call (1-based), succeed otherwise.
    pub async fn fail_every_nth(&self, n: usize) {
        self.state.write().await.fail_every = Some(n.max(1));
    }

    /// Account argument of every call, in order.
    pub async fn recorded_accounts(&self) -> Vec<Option<Account>> {
        self.state.read().await.calls.clone()
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    async fn generate(&self, account: Option<&Account>) -> Result<GeneratedContent, GeneratorError> {
        let mut state = self.state.write().await;
        state.calls.push(account.cloned());

        let nth_failure = state
            .fail_every
            .is_some_and(|n| state.calls.len() % n == 0);
        if state.fail || nth_failure {
            return Err(GeneratorError::Llm(LlmError::Http(
                "mock upstream unavailable".to_string(),
            )));
        }

        GeneratedContent::from_json(&state.reply)
    }
}
