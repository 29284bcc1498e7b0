//! CRM abstraction.
//!
//! A `CrmConnector` opens an authenticated `CrmSession`; the session reads
//! accounts and creates cases. Every workflow run opens its own session.

mod salesforce;
mod types;

pub use salesforce::{SalesforceConnector, SalesforceSession};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during CRM operations.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Record rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Opens sessions against a CRM backend.
#[async_trait]
pub trait CrmConnector: Send + Sync {
    /// Backend name for logging (e.g., "salesforce").
    fn name(&self) -> &str;

    /// Authenticate and return a fresh session.
    async fn connect(&self) -> Result<Box<dyn CrmSession>, CrmError>;
}

/// An authenticated CRM session.
#[async_trait]
pub trait CrmSession: Send + Sync {
    /// Fetch up to `limit` accounts.
    async fn query_accounts(&self, limit: u32) -> Result<Vec<Account>, CrmError>;

    /// Create a case and return its id.
    async fn create_case(&self, case: &NewCase) -> Result<CaseId, CrmError>;
}
