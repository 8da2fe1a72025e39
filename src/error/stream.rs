//! Streaming-related error types.
//!
//! These are the only failures a session surfaces to its caller. Frame-level
//! problems (noise, malformed payloads, unknown phases) never reach this far.

use std::fmt;

use crate::traits::TransportError;

/// Session-level stream error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The request for the event stream could not be made or was refused.
    OpenFailed { source: TransportError },

    /// The body stream failed after it had started.
    ConnectionLost { source: TransportError },

    /// The caller cancelled the session.
    Cancelled,

    /// A newer submission replaced this session.
    Superseded { by_epoch: u64 },

    /// Blank task text; nothing was started.
    EmptyTask,
}

impl StreamError {
    /// Check if this error is likely transient and the submission could be
    /// tried again.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::OpenFailed { source } => source.is_retryable(),
            StreamError::ConnectionLost { .. } => true,
            StreamError::Cancelled => false,
            StreamError::Superseded { .. } => false,
            StreamError::EmptyTask => false,
        }
    }

    /// Check if this error came from the transport.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StreamError::OpenFailed { .. } | StreamError::ConnectionLost { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::OpenFailed { source } => {
                format!("Could not reach the generation service: {}", source)
            }
            StreamError::ConnectionLost { source } => {
                format!("The connection dropped while results were streaming: {}", source)
            }
            StreamError::Cancelled => "The run was cancelled.".to_string(),
            StreamError::Superseded { .. } => {
                "A newer task replaced this run.".to_string()
            }
            StreamError::EmptyTask => "Please describe a task first.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::OpenFailed { .. } => "E_STREAM_OPEN",
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::Cancelled => "E_STREAM_CANCELLED",
            StreamError::Superseded { .. } => "E_STREAM_SUPERSEDED",
            StreamError::EmptyTask => "E_STREAM_EMPTY_TASK",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::OpenFailed { source } => write!(f, "{}", source),
            StreamError::ConnectionLost { source } => {
                write!(f, "Stream connection lost: {}", source)
            }
            StreamError::Cancelled => write!(f, "Stream cancelled"),
            StreamError::Superseded { by_epoch } => {
                write!(f, "Stream superseded by epoch {}", by_epoch)
            }
            StreamError::EmptyTask => write!(f, "Task is empty"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::OpenFailed { source } | StreamError::ConnectionLost { source } => {
                Some(source)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_lost_is_retryable() {
        let err = StreamError::ConnectionLost {
            source: TransportError::Io("reset".to_string()),
        };
        assert!(err.is_retryable());
        assert!(err.is_transport());
        assert_eq!(err.error_code(), "E_STREAM_CONN");
        assert_eq!(err.to_string(), "Stream connection lost: IO error: reset");
    }

    #[test]
    fn test_open_failed_follows_transport() {
        let refused = StreamError::OpenFailed {
            source: TransportError::ConnectionFailed("refused".to_string()),
        };
        assert!(refused.is_retryable());
        assert_eq!(refused.to_string(), "Connection failed: refused");

        let bad_url = StreamError::OpenFailed {
            source: TransportError::InvalidUrl("nope".to_string()),
        };
        assert!(!bad_url.is_retryable());
        assert!(bad_url.user_message().contains("nope"));
    }

    #[test]
    fn test_non_transport_errors() {
        for err in [
            StreamError::Cancelled,
            StreamError::Superseded { by_epoch: 3 },
            StreamError::EmptyTask,
        ] {
            assert!(!err.is_retryable());
            assert!(!err.is_transport());
            assert!(!err.user_message().is_empty());
        }
        assert_eq!(
            StreamError::Superseded { by_epoch: 3 }.to_string(),
            "Stream superseded by epoch 3"
        );
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;
        let err = StreamError::OpenFailed {
            source: TransportError::Timeout("10s".to_string()),
        };
        assert!(err.source().is_some());
        assert!(StreamError::Cancelled.source().is_none());
    }
}
