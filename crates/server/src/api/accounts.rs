//! Account listing handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::{info, warn};

use casegen_core::Account;

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub status: &'static str,
    pub accounts: Vec<Account>,
}

/// List CRM accounts.
///
/// Only a failed connection is an error; a failed query after connecting
/// returns an empty list.
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccountsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let connector = state.connector();
    let session = connector.connect().await.map_err(|e| {
        warn!("Failed to connect to {}: {}", connector.name(), e);
        ErrorResponse::internal("Failed to connect to Salesforce")
    })?;

    let limit = state.config().workflow.account_limit;
    let accounts = match session.query_accounts(limit).await {
        Ok(accounts) => {
            info!("Retrieved {} accounts", accounts.len());
            accounts
        }
        Err(e) => {
            warn!("Failed to retrieve accounts: {}", e);
            Vec::new()
        }
    };

    Ok(Json(AccountsResponse {
        status: "success",
        accounts,
    }))
}
