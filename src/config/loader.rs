//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use secrecy::SecretString;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.port`.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {message}")]
    Env { name: String, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `PORT` and the API key variable named by `upstream.api_key_env`.
///
/// `lookup` abstracts the process environment.
pub fn apply_env_overrides<F>(mut config: RelayConfig, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(PORT_ENV) {
        config.listener.port = port.trim().parse().map_err(|_| ConfigError::Env {
            name: PORT_ENV.to_string(),
            message: format!("'{}' is not a valid port", port),
        })?;
    }

    if let Some(key) = lookup(&config.upstream.api_key_env) {
        let key = key.trim();
        if !key.is_empty() {
            config.upstream.api_key = Some(SecretString::new(key.to_string()));
        }
    }

    Ok(config)
}
