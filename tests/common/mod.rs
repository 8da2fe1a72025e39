//! Common test utilities for integration tests.
//!
//! Wire fixtures for the generation stream and helpers for following a
//! session's updates.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agentview::session::{SessionOutcome, SessionUpdate};
use agentview::state::Accumulator;
use tokio::sync::mpsc;

/// The three-frame stream used by the end-to-end scenario.
pub const SCENARIO: &str = concat!(
    "data: {\"phase\":\"log\",\"content\":\"start\"}\n\n",
    "data: {\"phase\":\"code_chunk\",\"content\":\"print(1)\"}\n\n",
    "data: {\"phase\":\"final_code\",\"content\":{\"code\":\"print(2)\",\"review\":{\"pass\":true,\"score\":90,\"critique\":\"ok\"}}}\n\n",
);

/// Wrap a JSON payload as one delimited data frame.
pub fn data_frame(json: &str) -> String {
    format!("data: {}\n\n", json)
}

/// A log frame.
pub fn log_frame(text: &str) -> String {
    data_frame(&serde_json::json!({"phase": "log", "content": text}).to_string())
}

/// A fuller run: logs, an iteration under `data`, code, report phases, done.
pub fn full_run() -> String {
    [
        log_frame("Analyzing task"),
        data_frame(r#"{"phase":"clear_code","content":null}"#),
        data_frame(r#"{"phase":"code_chunk","content":"```python\ndef add(a, b):\n"}"#),
        data_frame(r#"{"phase":"code_chunk","content":"    return a + b\n```"}"#),
        data_frame(
            r#"{"phase":"iteration","data":{"round":1,"review":{"pass":true,"score":88,"critique":"fine"}}}"#,
        ),
        data_frame(
            r#"{"phase":"final_code_update","content":{"review":{"pass":true,"score":88,"critique":"fine"}}}"#,
        ),
        data_frame(r#"{"phase":"diagram","content":"graph TD; add-->result"}"#),
        data_frame(
            r#"{"phase":"explanation","content":{"simple":"It adds.","academic":"Binary addition over numbers."}}"#,
        ),
        ": keep-alive\n\n".to_string(),
        data_frame(r#"{"phase":"done"}"#),
    ]
    .concat()
}

/// Collect updates until the epoch's `Finished` arrives.
pub async fn follow(
    updates: &mut mpsc::UnboundedReceiver<SessionUpdate>,
    epoch: u64,
) -> (Vec<Arc<Accumulator>>, SessionOutcome) {
    let mut snapshots = Vec::new();
    loop {
        let update = tokio::time::timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("timed out waiting for session update")
            .expect("session dropped its subscribers");
        match update {
            SessionUpdate::Snapshot(state) if state.epoch == epoch => snapshots.push(state),
            SessionUpdate::Finished(outcome) if outcome.epoch == epoch => {
                return (snapshots, outcome)
            }
            _ => {}
        }
    }
}

/// Wait for the first snapshot of `epoch` that satisfies `pred`.
pub async fn wait_for<F>(
    updates: &mut mpsc::UnboundedReceiver<SessionUpdate>,
    epoch: u64,
    pred: F,
) -> Arc<Accumulator>
where
    F: Fn(&Accumulator) -> bool,
{
    loop {
        let update = tokio::time::timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("timed out waiting for snapshot")
            .expect("session dropped its subscribers");
        if let SessionUpdate::Snapshot(state) = update {
            if state.epoch == epoch && pred(&state) {
                return state;
            }
        }
    }
}
