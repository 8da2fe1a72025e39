//! Unified error type for the console.

use std::fmt;

use super::category::ErrorCategory;
use super::config::ConfigError;
use super::stream::StreamError;
use crate::traits::TransportError;

/// Unified error type for the console.
///
/// Frame-level parse failures are deliberately absent: they are recorded per
/// session and never escalate.
#[derive(Debug)]
pub enum ConsoleError {
    /// Stream/session errors.
    Stream(StreamError),

    /// Configuration errors.
    Config(ConfigError),

    /// Terminal or stdin I/O errors.
    Io(std::io::Error),
}

impl ConsoleError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConsoleError::Stream(err) => match err {
                StreamError::OpenFailed { source } => transport_category(source),
                StreamError::ConnectionLost { .. } => ErrorCategory::Network,
                StreamError::Cancelled
                | StreamError::Superseded { .. }
                | StreamError::EmptyTask => ErrorCategory::User,
            },
            ConsoleError::Config(_) => ErrorCategory::Configuration,
            ConsoleError::Io(_) => ErrorCategory::Client,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsoleError::Stream(err) => err.is_retryable(),
            ConsoleError::Config(_) => false,
            ConsoleError::Io(_) => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Stream(err) => err.user_message(),
            ConsoleError::Config(err) => format!("Configuration problem: {}", err),
            ConsoleError::Io(err) => format!("I/O error: {}", err),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Stream(err) => err.error_code(),
            ConsoleError::Config(err) => err.error_code(),
            ConsoleError::Io(_) => "E_IO",
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

fn transport_category(err: &TransportError) -> ErrorCategory {
    match err {
        TransportError::ServerError { status, .. } if *status >= 500 => ErrorCategory::Server,
        TransportError::ServerError { .. } | TransportError::InvalidUrl(_) => {
            ErrorCategory::Client
        }
        _ => ErrorCategory::Network,
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Stream(err) => write!(f, "{}", err),
            ConsoleError::Config(err) => write!(f, "{}", err),
            ConsoleError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsoleError::Stream(err) => Some(err),
            ConsoleError::Config(err) => Some(err),
            ConsoleError::Io(err) => Some(err),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<StreamError> for ConsoleError {
    fn from(err: StreamError) -> Self {
        ConsoleError::Stream(err)
    }
}

impl From<ConfigError> for ConsoleError {
    fn from(err: ConfigError) -> Self {
        ConsoleError::Config(err)
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Io(err)
    }
}
