//! The console driver behind the binary.
//!
//! Pumps session updates into the renderer, submits tasks read from an
//! optional line input, and stops the run when the caller deadline elapses
//! or Ctrl-C arrives.

use std::future::pending;
use std::io::{self, Write};
use std::pin::Pin;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tokio::time::Sleep;
use tracing::{info, warn};

use crate::cli_output::ConsoleRenderer;
use crate::error::{ConsoleError, ConsoleResult, StreamError};
use crate::session::{SessionHandle, SessionOutcome, SessionUpdate, StreamSession};
use crate::traits::ChunkSource;

/// Drives one session for the terminal.
pub struct Console<S> {
    session: StreamSession<S>,
    renderer: ConsoleRenderer,
    json: bool,
    deadline: Option<Duration>,
    /// Deadline timer for the current run
    timer: Option<Pin<Box<Sleep>>>,
    /// The run that has not reported `Finished` yet
    run: Option<SessionHandle>,
    succeeded: bool,
}

impl<S: ChunkSource + 'static> Console<S> {
    pub fn new(session: StreamSession<S>) -> Self {
        Self {
            session,
            renderer: ConsoleRenderer::new(),
            json: false,
            deadline: None,
            timer: None,
            run: None,
            succeeded: true,
        }
    }

    /// Print one JSON document per run instead of the rendered console.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Stop each run once `deadline` has elapsed.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn session(&self) -> &StreamSession<S> {
        &self.session
    }

    /// False once any finished run failed or was stopped.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Submit a task, superseding the run in progress.
    pub fn start(&mut self, task: &str) -> ConsoleResult<()> {
        let handle = self.session.start(task)?;
        info!(epoch = handle.epoch(), session_id = %handle.id(), "Submitted task");
        self.timer = self.deadline.map(|d| Box::pin(tokio::time::sleep(d)));
        self.run = Some(handle);
        Ok(())
    }

    /// Pump updates until the work is done: the single run finishes, or with
    /// `input` the input closes and the last run finishes.
    pub async fn drive<R, W>(
        &mut self,
        mut updates: mpsc::UnboundedReceiver<SessionUpdate>,
        input: Option<R>,
        out: &mut W,
    ) -> ConsoleResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.map(AsyncBufReadExt::lines);

        loop {
            tokio::select! {
                line = next_line(&mut lines), if lines.is_some() => match line? {
                    Some(line) => match self.start(&line) {
                        Ok(()) => {}
                        Err(ConsoleError::Stream(StreamError::EmptyTask)) => {}
                        Err(err) => return Err(err),
                    },
                    None => {
                        lines = None;
                        if self.run.is_none() {
                            return Ok(());
                        }
                    }
                },
                update = updates.recv() => match update {
                    Some(SessionUpdate::Finished(outcome)) if self.is_running(outcome.epoch) => {
                        self.timer = None;
                        self.run = None;
                        self.finish(out, &outcome)?;
                        if lines.is_none() {
                            return Ok(());
                        }
                    }
                    Some(update) => {
                        if !self.json {
                            self.renderer.render(out, &update)?;
                        }
                    }
                    None => return Ok(()),
                },
                _ = wait_timer(&mut self.timer) => {
                    self.timer = None;
                    warn!("Deadline elapsed, stopping run");
                    if let Some(outcome) = self.stop().await {
                        self.finish(out, &outcome)?;
                    }
                    if lines.is_none() {
                        return Ok(());
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    match self.stop().await {
                        Some(outcome) => self.finish(out, &outcome)?,
                        None => return Ok(()),
                    }
                    if lines.is_none() {
                        return Ok(());
                    }
                },
            }
        }
    }

    fn is_running(&self, epoch: u64) -> bool {
        self.run.as_ref().map(SessionHandle::epoch) == Some(epoch)
    }

    /// Cancel the run and abort its loop, even if a read is still pending.
    async fn stop(&mut self) -> Option<SessionOutcome> {
        let handle = self.run.take()?;
        self.timer = None;
        self.session.cancel(&handle);
        handle.abort();
        Some(handle.wait().await)
    }

    fn finish<W: Write>(&mut self, out: &mut W, outcome: &SessionOutcome) -> ConsoleResult<()> {
        let state = self.session.snapshot();
        self.succeeded = outcome.is_success() && !state.has_failed();

        if self.json {
            let value = serde_json::json!({
                "epoch": outcome.epoch,
                "status": outcome.status,
                "error": outcome.error.as_ref().map(|e| e.to_string()),
                "parse_failures": outcome.diagnostics.failures.len(),
                "truncated_bytes": outcome.diagnostics.truncated_bytes,
                "state": &*state,
            });
            let text = serde_json::to_string_pretty(&value).map_err(io::Error::from)?;
            writeln!(out, "{}", text)?;
        } else {
            self.renderer.render_report(out, &state, outcome)?;
        }
        Ok(())
    }
}

async fn next_line<R>(lines: &mut Option<Lines<R>>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    match lines {
        Some(lines) => lines.next_line().await,
        None => pending().await,
    }
}

async fn wait_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockChunkSource, MockScript};
    use crate::session::SessionStatus;
    use bytes::Bytes;
    use tokio::io::BufReader;

    const LOG_ONE: &str = "data: {\"phase\":\"log\",\"content\":\"one\"}\n\n";
    const DONE: &str = "data: {\"phase\":\"done\"}\n\n";

    type NoInput = BufReader<&'static [u8]>;

    fn console(source: MockChunkSource) -> Console<MockChunkSource> {
        Console::new(StreamSession::new(source))
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_silent_stream() {
        let (tx, script) = MockScript::channel();
        let mut console =
            console(MockChunkSource::with_script(script)).with_deadline(Some(Duration::from_secs(30)));
        let updates = console.session().subscribe();
        console.start("task").unwrap();
        tx.send(Ok(Bytes::from(LOG_ONE))).unwrap();

        let mut out = Vec::new();
        console
            .drive(updates, None::<NoInput>, &mut out)
            .await
            .unwrap();

        assert!(!console.succeeded());
        assert_eq!(console.session().status(), SessionStatus::Cancelled);
        assert!(!console.session().is_streaming());
        assert_eq!(console.session().snapshot().logs, vec!["one"]);
        // The aborted loop dropped its stream.
        assert!(tx.send(Ok(Bytes::from(LOG_ONE))).is_err());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("one"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_within_deadline_succeeds() {
        let mut console = console(MockChunkSource::with_script(MockScript::body([
            LOG_ONE, DONE,
        ])))
        .with_deadline(Some(Duration::from_secs(30)));
        let updates = console.session().subscribe();
        console.start("task").unwrap();

        let mut out = Vec::new();
        console
            .drive(updates, None::<NoInput>, &mut out)
            .await
            .unwrap();

        assert!(console.succeeded());
        assert_eq!(console.session().status(), SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_input_lines_submit_tasks_until_eof() {
        let source = MockChunkSource::new();
        source.push(MockScript::body([LOG_ONE, DONE]));
        let mut console = console(source.clone()).with_json(true);
        let updates = console.session().subscribe();

        let input = BufReader::new(&b"\n  sort a list  \n"[..]);
        let mut out = Vec::new();
        console.drive(updates, Some(input), &mut out).await.unwrap();

        assert_eq!(source.tasks(), vec!["sort a list".to_string()]);
        assert!(console.succeeded());

        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["status"], "completed");
        assert_eq!(report["state"]["logs"][0], "one");
    }

    #[tokio::test]
    async fn test_eof_without_tasks_returns() {
        let mut console = console(MockChunkSource::new());
        let updates = console.session().subscribe();

        let mut out = Vec::new();
        console
            .drive(updates, Some(BufReader::new(&b""[..])), &mut out)
            .await
            .unwrap();

        assert!(out.is_empty());
        assert!(console.succeeded());
    }
}
