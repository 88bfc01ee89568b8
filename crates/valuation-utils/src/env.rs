//! Typed environment variable lookup

use std::str::FromStr;
use thiserror::Error;

/// Error raised when an environment variable is present but unusable
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// The value could not be parsed into the requested type
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Read `key`, falling back to `default` when unset or empty
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

/// Read and parse `key`
///
/// Returns `Ok(None)` when the variable is unset or blank.
pub fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, EnvError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<Option<T>, EnvError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(|_| EnvError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
