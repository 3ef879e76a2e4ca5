//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Selects the execution environment (`production` enables TLS validation).
pub const ENV_ENVIRONMENT: &str = "APP_ENV";

/// Overrides `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("route `{prefix}` needs secret `{key}` but it is not set")]
    MissingSecret { prefix: String, key: String },

    #[error("invalid route `{prefix}`: {reason}")]
    Route { prefix: String, reason: String },

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration for the running process.
///
/// Starts from the file at `path` (or the built-in defaults), applies
/// environment overrides, then validates the result.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = lookup(ENV_ENVIRONMENT) {
        config.environment = Environment::from_name(&name);
    }

    if let Some(bind) = lookup(ENV_BIND_ADDRESS).filter(|b| !b.is_empty()) {
        config.listener.bind_address = bind;
    }
}
