//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::TracerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `remote.api_key`.
pub const API_KEY_ENV: &str = "TRACE_GATE_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// A missing file is not an error when `path` is `None`; defaults plus the
/// environment are used instead.
pub fn load_config(path: Option<&Path>) -> Result<TracerConfig, ConfigError> {
    let content = match path {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };
    let api_key = std::env::var(API_KEY_ENV).ok();
    parse_config(&content, api_key)
}

/// Parse TOML text, apply the credential override, and validate.
pub fn parse_config(content: &str, api_key: Option<String>) -> Result<TracerConfig, ConfigError> {
    let mut config: TracerConfig = toml::from_str(content)?;

    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.remote.api_key = key;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
