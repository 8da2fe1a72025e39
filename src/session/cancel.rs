//! Session cancellation.

use std::sync::atomic::Ordering;

use tracing::info;

use super::lock;
use super::stream::StreamSession;
use super::types::{SessionHandle, SessionStatus};

impl<S> StreamSession<S> {
    /// Cancel the submission behind `handle`.
    ///
    /// Returns false if that epoch already finished or was superseded.
    pub fn cancel(&self, handle: &SessionHandle) -> bool {
        self.cancel_epoch(handle.epoch())
    }

    /// Cancel whatever is currently streaming.
    pub fn cancel_current(&self) -> bool {
        let epoch = self.current_epoch();
        self.cancel_epoch(epoch)
    }

    /// Mark `epoch` inactive.
    ///
    /// A read already pending is allowed to finish; the loop then discards
    /// what it read and closes the stream. State already applied is kept.
    pub fn cancel_epoch(&self, epoch: u64) -> bool {
        let mut shared = lock(&self.shared);

        // Guard: only the current, still-active epoch can be cancelled
        if !shared.is_current(epoch) {
            return false;
        }

        shared.active = false;
        shared.status = SessionStatus::Cancelled;
        shared.cancelled.store(true, Ordering::SeqCst);
        info!(epoch, "Session cancelled");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockChunkSource, MockScript};
    use crate::error::StreamError;
    use crate::session::SessionUpdate;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_cancel_keeps_applied_state_and_drops_later_chunks() {
        let (tx, script) = MockScript::channel();
        let session = StreamSession::new(MockChunkSource::with_script(script));
        let mut updates = session.subscribe();
        let handle = session.start("task").unwrap();

        tx.send(Ok(Bytes::from(
            "data: {\"phase\":\"log\",\"content\":\"one\"}\n\n",
        )))
        .unwrap();

        // Wait until the first log is visible.
        loop {
            match updates.recv().await {
                Some(SessionUpdate::Snapshot(state)) if state.logs.len() == 1 => break,
                Some(_) => continue,
                None => panic!("session closed early"),
            }
        }

        assert!(session.cancel(&handle));
        tx.send(Ok(Bytes::from(
            "data: {\"phase\":\"log\",\"content\":\"two\"}\n\n",
        )))
        .unwrap();

        let outcome = handle.wait().await;
        assert_eq!(outcome.status, SessionStatus::Cancelled);
        assert_eq!(outcome.error, Some(StreamError::Cancelled));
        assert_eq!(outcome.diagnostics.events_applied, 1);
        assert_eq!(outcome.diagnostics.stale_discarded, 1);
        assert_eq!(session.snapshot().logs, vec!["one"]);
        assert_eq!(session.status(), SessionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_then_start_still_reports_cancelled() {
        let (old_tx, old_script) = MockScript::channel();
        let source = MockChunkSource::with_script(old_script);
        source.push(MockScript::body(["data: {\"phase\":\"done\"}\n\n"]));
        let session = StreamSession::new(source.clone());
        let mut updates = session.subscribe();

        let first = session.start("a").unwrap();
        let first_epoch = first.epoch();
        while source.tasks().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(session.cancel(&first));
        let second = session.start("b").unwrap();

        old_tx
            .send(Ok(Bytes::from(
                "data: {\"phase\":\"log\",\"content\":\"late\"}\n\n",
            )))
            .unwrap();
        let outcome = first.wait().await;
        assert_eq!(outcome.status, SessionStatus::Cancelled);
        assert_eq!(outcome.error, Some(StreamError::Cancelled));

        let announced = loop {
            match updates.recv().await {
                Some(SessionUpdate::Finished(done)) if done.epoch == first_epoch => break done,
                Some(_) => continue,
                None => panic!("session closed early"),
            }
        };
        assert_eq!(announced, outcome);

        assert!(second.wait().await.is_success());
        assert!(session.snapshot().logs.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_finish_is_noop() {
        let session = StreamSession::new(MockChunkSource::with_script(MockScript::body([
            "data: {\"phase\":\"done\"}\n\n",
        ])));
        let handle = session.start("task").unwrap();
        let epoch = handle.epoch();
        handle.wait().await;

        assert!(!session.cancel_epoch(epoch));
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.snapshot().completed);
    }

    #[tokio::test]
    async fn test_cancel_current_when_idle() {
        let session = StreamSession::new(MockChunkSource::new());
        assert!(!session.cancel_current());
    }
}
