//! Console configuration.
//!
//! Settings come from defaults, then `AGENTVIEW_*` environment variables,
//! then command-line flags (applied by the binary through the builder).

use std::time::Duration;

use crate::error::ConfigError;

/// Default generation service, matching the service's own dev setup.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Streaming endpoint path.
pub const DEFAULT_GENERATE_PATH: &str = "/generate";
/// Default connect timeout for the initial request.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

pub const ENV_URL: &str = "AGENTVIEW_URL";
pub const ENV_CONNECT_TIMEOUT: &str = "AGENTVIEW_CONNECT_TIMEOUT_SECS";
pub const ENV_DEADLINE: &str = "AGENTVIEW_DEADLINE_SECS";
pub const ENV_LOG: &str = "AGENTVIEW_LOG";

/// Configuration for talking to the generation service.
///
/// # Example
///
/// ```ignore
/// use agentview::config::ConsoleConfig;
/// use std::time::Duration;
///
/// let config = ConsoleConfig::default()
///     .with_base_url("http://10.0.0.2:8000")
///     .with_deadline(Some(Duration::from_secs(600)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Base URL of the generation service
    pub base_url: String,
    /// Path of the streaming endpoint
    pub generate_path: String,
    /// Timeout for establishing the connection (the body itself is unbounded)
    pub connect_timeout: Duration,
    /// Optional caller deadline; when it elapses the run is cancelled
    pub deadline: Option<Duration>,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            generate_path: DEFAULT_GENERATE_PATH.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            deadline: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Create a new ConsoleConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the streaming endpoint path.
    pub fn with_generate_path(mut self, path: impl Into<String>) -> Self {
        self.generate_path = path.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set or clear the caller deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the fallback log filter.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Full URL of the streaming endpoint.
    pub fn generate_url(&self) -> String {
        if self.generate_path.starts_with('/') {
            format!("{}{}", self.base_url, self.generate_path)
        } else {
            format!("{}/{}", self.base_url, self.generate_path)
        }
    }

    /// Check values that cannot be validated by their types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.base_url.clone()));
        }
        Ok(())
    }

    /// Create config from `AGENTVIEW_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout = parse_secs(ENV_CONNECT_TIMEOUT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEADLINE) {
            config.deadline = Some(parse_secs(ENV_DEADLINE, &raw)?);
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse a positive number of seconds.
pub fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected whole seconds"))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
