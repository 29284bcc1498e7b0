//! Workflow outcomes and errors.

use serde::Serialize;
use thiserror::Error;

use crate::crm::{Account, CaseId, CrmError};
use crate::generator::GeneratorError;

/// Why a workflow run stopped before creating a case.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to connect to CRM: {0}")]
    ConnectionFailed(#[source] CrmError),

    #[error("Failed to generate case content: {0}")]
    GenerationFailed(#[source] GeneratorError),

    #[error("Failed to create case: {0}")]
    CreationFailed(#[source] CrmError),
}

impl WorkflowError {
    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::ConnectionFailed(_) => "connection_failed",
            WorkflowError::GenerationFailed(_) => "generation_failed",
            WorkflowError::CreationFailed(_) => "creation_failed",
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub case_id: CaseId,
    /// Account the case was linked to, if one was drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
}

/// One entry of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// 1-based position in the batch
    pub run: u32,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<CaseId>,
}

impl RunResult {
    pub fn from_outcome(run: u32, outcome: &Result<RunReport, WorkflowError>) -> Self {
        match outcome {
            Ok(report) => Self {
                run,
                status: RunStatus::Success,
                message: None,
                case_id: Some(report.case_id.clone()),
            },
            Err(e) => Self {
                run,
                status: RunStatus::Error,
                message: Some(e.to_string()),
                case_id: None,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Outcome of a batch of sequential runs.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub success_count: u32,
    pub results: Vec<RunResult>,
}

impl From<Vec<RunResult>> for BatchReport {
    fn from(results: Vec<RunResult>) -> Self {
        let success_count = results.iter().filter(|r| r.is_success()).count() as u32;
        Self {
            success_count,
            results,
        }
    }
}
