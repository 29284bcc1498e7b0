use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub crm: CrmConfig,
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Salesforce connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrmConfig {
    pub username: String,
    pub password: String,
    /// Appended to the password on login. Empty when the org trusts the caller's IP.
    #[serde(default)]
    pub security_token: String,
    /// Pins REST calls to this instance instead of the one in the login
    /// response's `serverUrl`. Unset, the login response decides, as a plain
    /// username/password login does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_url: Option<String>,
    /// Login domain ("login", "test" or a My Domain prefix). Takes precedence over `sandbox`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Log in against test.salesforce.com
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl CrmConfig {
    /// Login domain prefix, resolving the sandbox flag.
    pub fn login_domain(&self) -> &str {
        match self.domain.as_deref() {
            Some(domain) if !domain.is_empty() => domain,
            _ if self.sandbox => "test",
            _ => "login",
        }
    }
}

fn default_api_version() -> String {
    "59.0".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Text generation API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

/// How `/generate-case` drives the workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerateMode {
    /// One run per request
    #[default]
    Single,
    /// `batch_runs` sequential runs per request
    Batch,
}

/// Workflow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub mode: GenerateMode,
    #[serde(default = "default_batch_runs")]
    pub batch_runs: u32,
    /// Pause between batch runs
    #[serde(default)]
    pub batch_delay_ms: u64,
    /// Probability of tagging the case with a random account
    #[serde(default = "default_account_probability")]
    pub account_probability: f64,
    /// Maximum number of accounts fetched per run
    #[serde(default = "default_account_limit")]
    pub account_limit: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            mode: GenerateMode::default(),
            batch_runs: default_batch_runs(),
            batch_delay_ms: 0,
            account_probability: default_account_probability(),
            account_limit: default_account_limit(),
        }
    }
}

fn default_batch_runs() -> u32 {
    10
}

fn default_account_probability() -> f64 {
    0.7
}

fn default_account_limit() -> u32 {
    200
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub crm: SanitizedCrmConfig,
    pub generator: SanitizedGeneratorConfig,
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCrmConfig {
    pub username: String,
    pub password_configured: bool,
    pub security_token_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_url: Option<String>,
    pub login_domain: String,
    pub api_version: String,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGeneratorConfig {
    pub api_key_configured: bool,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            crm: SanitizedCrmConfig {
                username: config.crm.username.clone(),
                password_configured: !config.crm.password.is_empty(),
                security_token_configured: !config.crm.security_token.is_empty(),
                instance_url: config.crm.instance_url.clone(),
                login_domain: config.crm.login_domain().to_string(),
                api_version: config.crm.api_version.clone(),
                timeout_secs: config.crm.timeout_secs,
            },
            generator: SanitizedGeneratorConfig {
                api_key_configured: !config.generator.api_key.is_empty(),
                model: config.generator.model.clone(),
                api_base: config.generator.api_base.clone(),
                temperature: config.generator.temperature,
                timeout_secs: config.generator.timeout_secs,
            },
            workflow: config.workflow.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[crm]
username = "ops@example.com"
password = "hunter2"

[generator]
api_key = "sk-test"
"#;

    #[test]
    fn test_deserialize_minimal_applies_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.crm.security_token, "");
        assert_eq!(config.crm.api_version, "59.0");
        assert_eq!(config.crm.login_domain(), "login");
        assert_eq!(config.generator.model, "gpt-3.5-turbo");
        assert_eq!(config.generator.api_base, "https://api.openai.com/v1");
        assert_eq!(config.workflow.mode, GenerateMode::Single);
        assert_eq!(config.workflow.batch_runs, 10);
        assert_eq!(config.workflow.account_limit, 200);
        assert_eq!(config.workflow.account_probability, 0.7);
    }

    #[test]
    fn test_deserialize_missing_crm_fails() {
        let toml = r#"
[generator]
api_key = "sk-test"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_batch_mode() {
        let toml = format!("{}\n[workflow]\nmode = \"batch\"\nbatch_runs = 3\n", MINIMAL);
        let config: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.workflow.mode, GenerateMode::Batch);
        assert_eq!(config.workflow.batch_runs, 3);
    }

    #[test]
    fn test_login_domain_resolution() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.crm.sandbox = true;
        assert_eq!(config.crm.login_domain(), "test");

        config.crm.domain = Some("acme".to_string());
        assert_eq!(config.crm.login_domain(), "acme");

        config.crm.domain = Some(String::new());
        assert_eq!(config.crm.login_domain(), "test");
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.crm.password_configured);
        assert!(!sanitized.crm.security_token_configured);
        assert!(sanitized.generator.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("sk-test"));
    }
}
