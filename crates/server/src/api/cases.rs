//! Case generation handler.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use casegen_core::{BatchReport, CaseId, GenerateMode};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Response for a single successful run
#[derive(Debug, Serialize)]
pub struct CaseCreatedResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub case_id: CaseId,
}

/// Response for a batch; returned even when every run failed
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub report: BatchReport,
}

/// Run the workflow once, or `batch_runs` times in batch mode.
pub async fn generate_case(State(state): State<Arc<AppState>>) -> Response {
    match state.workflow().config().mode {
        GenerateMode::Single => generate_single(&state).await.into_response(),
        GenerateMode::Batch => Json(generate_batch(&state).await).into_response(),
    }
}

async fn generate_single(
    state: &AppState,
) -> Result<Json<CaseCreatedResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.workflow().run_once().await {
        Ok(report) => Ok(Json(CaseCreatedResponse {
            status: "success",
            message: "Case generated successfully",
            case_id: report.case_id,
        })),
        Err(e) => {
            error!("Case generation failed: {}", e);
            Err(ErrorResponse::internal(e.to_string()))
        }
    }
}

async fn generate_batch(state: &AppState) -> BatchResponse {
    let report = state.workflow().run_batch().await;
    info!(
        "Batch finished with {}/{} successful runs",
        report.success_count,
        report.results.len()
    );
    BatchResponse {
        status: "completed",
        report,
    }
}
