//! Chunk source trait abstraction.
//!
//! A chunk source opens the pipeline's response body for a task and hands it
//! back as a stream of opaque byte chunks. Chunk boundaries are arbitrary;
//! ordering within one stream is significant.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// Stream of raw body chunks, ended by `None` or by an `Err` item.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Transport-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request or read timeout
    Timeout(String),
    /// Server answered with a non-success status
    ServerError { status: u16, message: String },
    /// Connection closed or failed while reading the body
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl TransportError {
    /// Check if this error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::ConnectionFailed(_) => true,
            TransportError::Timeout(_) => true,
            TransportError::ServerError { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            TransportError::Io(_) => true,
            TransportError::InvalidUrl(_) => false,
            TransportError::Other(_) => false,
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            TransportError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            TransportError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            TransportError::Io(msg) => write!(f, "IO error: {}", msg),
            TransportError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            TransportError::Other(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Trait for opening the pipeline's event stream.
///
/// Production code uses the reqwest adapter; tests script the chunks.
///
/// # Example
///
/// ```ignore
/// use agentview::traits::ChunkSource;
/// use futures_util::StreamExt;
///
/// async fn dump<S: ChunkSource>(source: &S) -> Result<(), TransportError> {
///     let mut chunks = source.open("write a sorting function").await?;
///     while let Some(chunk) = chunks.next().await {
///         println!("{} bytes", chunk?.len());
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Submit `task` and return the response body as a chunk stream.
    ///
    /// # Returns
    /// The body stream, or an error if the request could not be made or the
    /// server refused it
    async fn open(&self, task: &str) -> Result<ChunkStream, TransportError>;
}
