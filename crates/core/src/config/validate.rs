use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - CRM credentials and the generator API key are present
/// - Upstream timeouts are non-zero
/// - Workflow knobs are in range
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.crm.username.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "crm.username is required".to_string(),
        ));
    }
    if config.crm.password.is_empty() {
        return Err(ConfigError::ValidationError(
            "crm.password is required".to_string(),
        ));
    }

    if config.crm.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "crm.timeout_secs must be at least 1".to_string(),
        ));
    }

    if config.generator.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "generator.api_key is required".to_string(),
        ));
    }

    if config.generator.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "generator.timeout_secs must be at least 1".to_string(),
        ));
    }

    let probability = config.workflow.account_probability;
    if !(0.0..=1.0).contains(&probability) {
        return Err(ConfigError::ValidationError(format!(
            "workflow.account_probability must be within [0, 1], got {}",
            probability
        )));
    }
    if config.workflow.batch_runs == 0 {
        return Err(ConfigError::ValidationError(
            "workflow.batch_runs must be at least 1".to_string(),
        ));
    }
    if config.workflow.account_limit == 0 {
        return Err(ConfigError::ValidationError(
            "workflow.account_limit must be at least 1".to_string(),
        ));
    }

    Ok(())
}
