//! Support-ticket content generation.
//!
//! `ContentGenerator` is the seam the workflow depends on. `LlmContentGenerator`
//! implements it on top of any `LlmClient` and enforces the reply shape:
//! a JSON object with string `subject` and `description` fields.

mod llm;
mod prompt;

pub use llm::{
    CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage, OpenAiClient,
};
pub use prompt::{build_prompt, SYSTEM_PROMPT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::crm::Account;

/// Errors that can occur while generating ticket content.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Generated content is malformed: {0}")]
    MalformedContent(String),

    #[error("Generated content is missing the \"{0}\" field")]
    MissingField(&'static str),
}

/// Subject and body of a fabricated support request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub subject: String,
    pub description: String,
}

impl GeneratedContent {
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
        }
    }

    /// Validate a parsed reply. Both fields must be present and be strings.
    pub fn from_json(value: &Value) -> Result<Self, GeneratorError> {
        let object = value.as_object().ok_or_else(|| {
            GeneratorError::MalformedContent(format!("expected a JSON object, got {}", value))
        })?;

        let field = |name: &'static str| match object.get(name) {
            None => Err(GeneratorError::MissingField(name)),
            Some(Value::String(text)) => Ok(text.clone()),
            Some(other) => Err(GeneratorError::MalformedContent(format!(
                "\"{}\" must be a string, got {}",
                name, other
            ))),
        };

        Ok(Self {
            subject: field("subject")?,
            description: field("description")?,
        })
    }
}

/// Produces ticket content, optionally themed around an account.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Name of this generator for logging.
    fn name(&self) -> &str;

    /// Generate a subject and description.
    async fn generate(&self, account: Option<&Account>) -> Result<GeneratedContent, GeneratorError>;
}

/// `ContentGenerator` backed by a chat-completion model.
pub struct LlmContentGenerator<L> {
    llm: L,
    temperature: f32,
}

impl<L: LlmClient> LlmContentGenerator<L> {
    pub fn new(llm: L) -> Self {
        Self {
            llm,
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }
}

#[async_trait]
impl<L: LlmClient> ContentGenerator for LlmContentGenerator<L> {
    fn name(&self) -> &str {
        self.llm.provider()
    }

    async fn generate(&self, account: Option<&Account>) -> Result<GeneratedContent, GeneratorError> {
        let request = CompletionRequest::new(build_prompt(account))
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.temperature)
            .with_json_object();

        debug!(
            "Requesting ticket content from {} ({})",
            self.llm.provider(),
            self.llm.model()
        );
        let (reply, usage): (Value, LlmUsage) = self.llm.complete_json(request).await?;
        debug!(
            "Generation used {} input / {} output tokens",
            usage.input_tokens, usage.output_tokens
        );

        let content = GeneratedContent::from_json(&reply)?;
        info!("Generated subject: {}", content.subject);
        debug!("Generated description: {}", content.description);
        Ok(content)
    }
}
