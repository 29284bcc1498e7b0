//! Mock LLM client for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::generator::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

use super::fixtures;

/// Mock implementation of the `LlmClient` trait.
///
/// Replies are served from a queue; once empty, the default reply (valid
/// ticket JSON) is returned. Every request is recorded.
#[derive(Debug, Clone)]
pub struct MockLlmClient {
    replies: Arc<RwLock<VecDeque<String>>>,
    default_reply: String,
    requests: Arc<RwLock<Vec<CompletionRequest>>>,
    next_error: Arc<RwLock<Option<LlmError>>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(RwLock::new(VecDeque::new())),
            default_reply: fixtures::content_json(),
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Queue a reply for the next request.
    pub async fn push_reply(&self, text: impl Into<String>) {
        self.replies.write().await.push_back(text.into());
    }

    /// Configure the next request to fail with the given error.
    pub async fn set_next_error(&self, error: LlmError) {
        *self.next_error.write().await = Some(error);
    }

    /// All requests received so far.
    pub async fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.write().await.push(request);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let text = match self.replies.write().await.pop_front() {
            Some(text) => text,
            None => self.default_reply.clone(),
        };

        Ok(CompletionResponse {
            text,
            usage: LlmUsage::default(),
            model: "mock-model".to_string(),
        })
    }
}
