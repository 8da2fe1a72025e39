//! Reqwest-based chunk source.
//!
//! Opens `POST {base_url}/generate` with a JSON `{"task": ...}` body and hands
//! the response body back as raw byte chunks.

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::debug;

use crate::config::ConsoleConfig;
use crate::models::GenerateRequest;
use crate::traits::{ChunkSource, ChunkStream, TransportError};

/// Chunk source backed by a `reqwest::Client`.
///
/// # Example
///
/// ```ignore
/// use agentview::adapters::ReqwestChunkSource;
/// use agentview::config::ConsoleConfig;
///
/// let source = ReqwestChunkSource::from_config(&ConsoleConfig::default())?;
/// let chunks = source.open("write a sorting function").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestChunkSource {
    client: reqwest::Client,
    url: String,
}

impl ReqwestChunkSource {
    /// Create a source for `url` with a custom client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Build a client from the config's connect timeout. The body read has
    /// no overall timeout, since pipeline runs can take minutes.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(Self::convert_error)?;
        Ok(Self::with_client(client, config.generate_url()))
    }

    /// Endpoint this source posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Convert reqwest error to TransportError.
    fn convert_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl ChunkSource for ReqwestChunkSource {
    async fn open(&self, task: &str) -> Result<ChunkStream, TransportError> {
        debug!(url = %self.url, "Opening generation stream");

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&GenerateRequest::new(task))
            .send()
            .await
            .map_err(Self::convert_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::ServerError { status, message });
        }

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else {
                    TransportError::Io(e.to_string())
                }
            })
        });

        Ok(Box::pin(stream))
    }
}
