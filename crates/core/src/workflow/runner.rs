//! Workflow runner.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::WorkflowConfig;
use crate::crm::{Account, CrmConnector, NewCase};
use crate::generator::ContentGenerator;
use crate::metrics::{ACCOUNTS_TAGGED, CASES_CREATED, WORKFLOW_RUNS};

use super::random::{RandomSource, ThreadRandom};
use super::types::{BatchReport, RunReport, RunResult, WorkflowError};

/// Drives the connect → query → pick → generate → create sequence.
pub struct CaseWorkflow {
    connector: Arc<dyn CrmConnector>,
    generator: Arc<dyn ContentGenerator>,
    random: Arc<dyn RandomSource>,
    config: WorkflowConfig,
}

impl CaseWorkflow {
    pub fn new(
        connector: Arc<dyn CrmConnector>,
        generator: Arc<dyn ContentGenerator>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            connector,
            generator,
            random: Arc::new(ThreadRandom),
            config,
        }
    }

    /// Replace the random source (tests force both tagging branches with this).
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Execute one run. Nothing is retried.
    pub async fn run_once(&self) -> Result<RunReport, WorkflowError> {
        let outcome = self.execute().await;

        let label = match &outcome {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        WORKFLOW_RUNS.with_label_values(&[label]).inc();

        outcome
    }

    /// Execute `config.batch_runs` runs.
    pub async fn run_batch(&self) -> BatchReport {
        self.run_batch_of(self.config.batch_runs).await
    }

    /// Execute `runs` runs one after another, collecting every outcome.
    pub async fn run_batch_of(&self, runs: u32) -> BatchReport {
        info!("Starting batch of {} workflow runs", runs);

        let mut results = Vec::with_capacity(runs as usize);
        for run in 1..=runs {
            if run > 1 && self.config.batch_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }

            let outcome = self.run_once().await;
            if let Err(e) = &outcome {
                warn!("Batch run {}/{} failed: {}", run, runs, e);
            }
            results.push(RunResult::from_outcome(run, &outcome));
        }

        let report = BatchReport::from(results);
        info!(
            "Batch completed: {}/{} runs succeeded",
            report.success_count, runs
        );
        report
    }

    /// Decide whether to tag the case, and with which account.
    ///
    /// An empty list never yields an account, whatever the draw.
    pub fn select_account<'a>(&self, accounts: &'a [Account]) -> Option<&'a Account> {
        let wants_account = self.random.next_unit() < self.config.account_probability;

        if !wants_account {
            info!("Randomly decided not to select an account for this case");
            return None;
        }
        if accounts.is_empty() {
            info!("Wanted to pick an account, but no accounts were available");
            return None;
        }

        let selected = accounts.get(self.random.pick_index(accounts.len()))?;
        info!(
            "Randomly selected account: {} (ID: {})",
            selected.name, selected.id
        );
        Some(selected)
    }

    async fn execute(&self) -> Result<RunReport, WorkflowError> {
        info!("Starting support case creation workflow");

        let session = self.connector.connect().await.map_err(|e| {
            warn!("Could not connect to {}: {}", self.connector.name(), e);
            WorkflowError::ConnectionFailed(e)
        })?;

        let accounts = match session.query_accounts(self.config.account_limit).await {
            Ok(accounts) => {
                info!("Retrieved {} accounts", accounts.len());
                accounts
            }
            Err(e) => {
                warn!("Failed to retrieve accounts, continuing without: {}", e);
                Vec::new()
            }
        };

        let account = self.select_account(&accounts).cloned();

        let content = self
            .generator
            .generate(account.as_ref())
            .await
            .map_err(|e| {
                warn!("Content generation via {} failed: {}", self.generator.name(), e);
                WorkflowError::GenerationFailed(e)
            })?;

        let mut case = NewCase::new(content.subject, content.description);
        if let Some(account) = &account {
            case = case.with_account(account.id.clone());
        }

        let case_id = session.create_case(&case).await.map_err(|e| {
            warn!("Failed to create case: {}", e);
            WorkflowError::CreationFailed(e)
        })?;

        CASES_CREATED.inc();
        if account.is_some() {
            ACCOUNTS_TAGGED.inc();
        }
        info!("Workflow completed. Case created with ID: {}", case_id);

        Ok(RunReport { case_id, account })
    }
}
