//! Scripted chunk source for testing.
//!
//! Each call to `open` consumes the next queued script, so a test can line up
//! several runs (for supersession) and decide exactly where chunk boundaries
//! fall.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::session::lock;
use crate::traits::{ChunkSource, ChunkStream, TransportError};

/// Sender half for a [`MockScript::Channel`] script.
pub type ChunkSender = mpsc::UnboundedSender<Result<Bytes, TransportError>>;

/// What one `open` call should produce.
#[derive(Debug)]
pub enum MockScript {
    /// Yield these items in order, then end the stream
    Chunks(Vec<Result<Bytes, TransportError>>),
    /// Yield whatever the test sends; the stream ends when the sender drops
    Channel(mpsc::UnboundedReceiver<Result<Bytes, TransportError>>),
    /// Fail the open itself
    OpenError(TransportError),
}

impl MockScript {
    /// Script a successful body delivered as the given chunks.
    pub fn body<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        MockScript::Chunks(chunks.into_iter().map(|c| Ok(c.into())).collect())
    }

    /// Script a body cut at the given byte offsets.
    pub fn split_at(body: &[u8], offsets: &[usize]) -> Self {
        let mut chunks = Vec::with_capacity(offsets.len() + 1);
        let mut start = 0;
        for &offset in offsets {
            let end = offset.min(body.len());
            if end > start {
                chunks.push(Ok(Bytes::copy_from_slice(&body[start..end])));
                start = end;
            }
        }
        if start < body.len() {
            chunks.push(Ok(Bytes::copy_from_slice(&body[start..])));
        }
        MockScript::Chunks(chunks)
    }

    /// Script a live body fed through the returned sender.
    pub fn channel() -> (ChunkSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, MockScript::Channel(rx))
    }
}

/// Mock chunk source with queued scripts and recorded tasks.
///
/// # Example
///
/// ```ignore
/// use agentview::adapters::mock::{MockChunkSource, MockScript};
///
/// let source = MockChunkSource::new();
/// source.push(MockScript::body(["data: {\"phase\":\"log\",", "\"content\":\"hi\"}\n\n"]));
///
/// let chunks = source.open("task").await?;
/// assert_eq!(source.tasks(), vec!["task".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockChunkSource {
    scripts: Arc<Mutex<VecDeque<MockScript>>>,
    tasks: Arc<Mutex<Vec<String>>>,
}

impl MockChunkSource {
    /// Create a mock with no scripts queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with one script queued.
    pub fn with_script(script: MockScript) -> Self {
        let source = Self::new();
        source.push(script);
        source
    }

    /// Queue a script for the next unscripted `open`.
    pub fn push(&self, script: MockScript) {
        lock(&self.scripts).push_back(script);
    }

    /// Tasks passed to `open`, in call order.
    pub fn tasks(&self) -> Vec<String> {
        lock(&self.tasks).clone()
    }

    /// Number of scripts not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.scripts).len()
    }
}

#[async_trait]
impl ChunkSource for MockChunkSource {
    async fn open(&self, task: &str) -> Result<ChunkStream, TransportError> {
        lock(&self.tasks).push(task.to_string());

        let script = lock(&self.scripts).pop_front();
        match script {
            Some(MockScript::Chunks(items)) => Ok(Box::pin(stream::iter(items))),
            Some(MockScript::Channel(rx)) => Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            }))),
            Some(MockScript::OpenError(err)) => Err(err),
            None => Err(TransportError::Other("no mock script queued".to_string())),
        }
    }
}
