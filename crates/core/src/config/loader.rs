use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `CASEGEN_WORKFLOW__MODE=batch`
const ENV_PREFIX: &str = "CASEGEN_";

/// Keys whose environment values are taken verbatim. Figment's `Env` would
/// turn `12345678` or `true` into a number or bool, which breaks credentials.
const LITERAL_KEYS: [&str; 9] = [
    "crm.username",
    "crm.password",
    "crm.security_token",
    "crm.instance_url",
    "crm.domain",
    "crm.api_version",
    "generator.api_key",
    "generator.model",
    "generator.api_base",
];

/// Load configuration from an optional TOML file, then the conventional
/// Salesforce/OpenAI environment variables, then `CASEGEN_` overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = merge_env(figment)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Layer conventional variables, then `CASEGEN_` overrides. Within each
/// layer, literal keys bypass `Env` value parsing.
fn merge_env(figment: Figment) -> Figment {
    let vars: Vec<(String, String)> = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();

    let mut figment = figment.merge(
        Env::raw().filter_map(|key| {
            conventional_key(key.as_str())
                .filter(|key| !is_literal(key))
                .map(Into::into)
        }),
    );
    for (var, value) in &vars {
        if let Some(key) = conventional_key(var).filter(|key| is_literal(key)) {
            figment = figment.merge(Serialized::default(key, value.clone()));
        }
    }

    figment = figment.merge(
        Env::prefixed(ENV_PREFIX)
            .split("__")
            .filter(|key| !is_literal(key.as_str())),
    );
    for (var, value) in &vars {
        if let Some(key) = prefixed_key(var).filter(|key| is_literal(key)) {
            figment = figment.merge(Serialized::default(&key, value.clone()));
        }
    }

    figment
}

fn is_literal(key: &str) -> bool {
    LITERAL_KEYS
        .iter()
        .any(|literal| literal.eq_ignore_ascii_case(key))
}

/// `CASEGEN_CRM__PASSWORD` -> `crm.password`
fn prefixed_key(var: &str) -> Option<String> {
    let prefix = var.get(..ENV_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(ENV_PREFIX) {
        return None;
    }
    Some(var[ENV_PREFIX.len()..].replace("__", ".").to_ascii_lowercase())
}

fn conventional_key(var: &str) -> Option<&'static str> {
    let key = match var.to_ascii_uppercase().as_str() {
        "SALESFORCE_USERNAME" => "crm.username",
        "SALESFORCE_PASSWORD" => "crm.password",
        "SALESFORCE_SECURITY_TOKEN" => "crm.security_token",
        "SALESFORCE_INSTANCE_URL" => "crm.instance_url",
        "SALESFORCE_DOMAIN" => "crm.domain",
        "SALESFORCE_SANDBOX" => "crm.sandbox",
        "OPENAI_API_KEY" => "generator.api_key",
        "OPENAI_MODEL" => "generator.model",
        "PORT" => "server.port",
        _ => return None,
    };
    Some(key)
}
