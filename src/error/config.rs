//! Configuration errors.

use thiserror::Error;

/// Errors raised while building a [`ConsoleConfig`](crate::config::ConsoleConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A setting holds a value that cannot be used.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The service URL is not an absolute http(s) URL.
    #[error("invalid service URL {0:?}: expected http:// or https://")]
    InvalidUrl(String),
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "E_CONFIG_VALUE",
            ConfigError::InvalidUrl(_) => "E_CONFIG_URL",
        }
    }
}
