use std::sync::Arc;

use casegen_core::{CaseWorkflow, Config, CrmConnector};

/// Shared application state
pub struct AppState {
    config: Config,
    connector: Arc<dyn CrmConnector>,
    workflow: Arc<CaseWorkflow>,
}

impl AppState {
    pub fn new(config: Config, connector: Arc<dyn CrmConnector>, workflow: CaseWorkflow) -> Self {
        Self {
            config,
            connector,
            workflow: Arc::new(workflow),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// CRM connector, used directly by `/accounts`.
    pub fn connector(&self) -> &dyn CrmConnector {
        self.connector.as_ref()
    }

    pub fn workflow(&self) -> &CaseWorkflow {
        self.workflow.as_ref()
    }
}
