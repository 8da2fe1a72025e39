//! Incremental console rendering of session updates.
//!
//! The renderer only reads snapshots. It remembers how many logs and
//! iterations it has printed for the current epoch and prints the rest; a new
//! epoch starts the counts over.

use std::io::{self, Write};

use super::boxes::{icons, write_block, write_footer, write_header, write_line, write_section};
use crate::error::ConsoleError;
use crate::session::{SessionOutcome, SessionStatus, SessionUpdate};
use crate::sse::Review;
use crate::state::Accumulator;

/// Prints progress as snapshots arrive and a report when the run ends.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    epoch: u64,
    logs_printed: usize,
    iterations_printed: usize,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one update.
    pub fn render<W: Write>(&mut self, out: &mut W, update: &SessionUpdate) -> io::Result<()> {
        match update {
            SessionUpdate::Started { epoch } => {
                self.epoch = *epoch;
                self.logs_printed = 0;
                self.iterations_printed = 0;
                write_header(out, &format!("AGENTVIEW · epoch {}", epoch))
            }
            SessionUpdate::Snapshot(state) => self.render_progress(out, state),
            SessionUpdate::Finished(_) => Ok(()),
        }
    }

    fn render_progress<W: Write>(&mut self, out: &mut W, state: &Accumulator) -> io::Result<()> {
        if state.epoch != self.epoch {
            return Ok(());
        }
        for line in state.logs.iter().skip(self.logs_printed) {
            write_line(out, icons::LOG, line)?;
        }
        self.logs_printed = state.logs.len();

        for record in state.iterations.iter().skip(self.iterations_printed) {
            let message = format!("Round {} · {}", record.round, review_summary(&record.review));
            write_line(out, review_icon(&record.review), &message)?;
        }
        self.iterations_printed = state.iterations.len();
        out.flush()
    }

    /// Render the final report for a finished run.
    pub fn render_report<W: Write>(
        &self,
        out: &mut W,
        state: &Accumulator,
        outcome: &SessionOutcome,
    ) -> io::Result<()> {
        writeln!(out)?;

        if let Some(alert) = &state.pivot_alert {
            write_section(out, "FEASIBILITY ALERT")?;
            write_line(out, icons::WARNING, &alert.reason)?;
            write_block(out, &alert.recommendation)?;
        }

        if let Some(report) = &state.failure_report {
            write_section(out, "FAILURE REPORT")?;
            write_line(out, icons::FAILURE, &report.message)?;
            write_block(out, &report.issues)?;
        }

        let code = state.clean_code();
        if !code.is_empty() {
            write_section(out, "FINAL CODE")?;
            write_block(out, code)?;
        }

        if let Some(review) = &state.review {
            write_section(out, "REVIEW")?;
            write_line(out, review_icon(review), &review_summary(review))?;
            writeln!(out)?;
        }

        if let Some(diagram) = &state.diagram {
            write_section(out, "DIAGRAM")?;
            write_block(out, diagram)?;
        }

        if let Some(explanation) = &state.explanation {
            write_section(out, "EXPLANATION")?;
            write_block(out, &explanation.simple)?;
            write_section(out, "IN DEPTH")?;
            write_block(out, &explanation.academic)?;
        }

        let failures = outcome.diagnostics.failures.len();
        if failures > 0 {
            write_line(
                out,
                icons::WARNING,
                &format!("{} frame(s) could not be decoded", failures),
            )?;
        }

        let (icon, message) = status_line(state, outcome);
        write_footer(out, icon, &message)?;
        out.flush()
    }
}

/// Report an error that ended the console before or outside a run.
///
/// ```text
///   ✗ Could not reach the generation service: ... [E_STREAM_OPEN]
///   › Check that the generation service is running and reachable
/// ```
pub fn render_error<W: Write>(out: &mut W, err: &ConsoleError) -> io::Result<()> {
    write_line(
        out,
        icons::FAILURE,
        &format!("{} [{}]", err.user_message(), err.error_code()),
    )?;
    write_line(out, icons::LOG, err.recovery_hint())?;
    out.flush()
}

fn review_icon(review: &Review) -> &'static str {
    if review.pass {
        icons::SUCCESS
    } else {
        icons::FAILURE
    }
}

fn review_summary(review: &Review) -> String {
    let verdict = if review.pass { "PASS" } else { "FAIL" };
    if review.critique.is_empty() {
        format!("{} · score {}", verdict, review.score)
    } else {
        format!("{} · score {} · {}", verdict, review.score, review.critique)
    }
}

fn status_line(state: &Accumulator, outcome: &SessionOutcome) -> (&'static str, String) {
    match outcome.status {
        SessionStatus::Completed if state.has_failed() => {
            (icons::FAILURE, "PIPELINE REPORTED FAILURE".to_string())
        }
        SessionStatus::Completed => (icons::SUCCESS, "RUN COMPLETE".to_string()),
        SessionStatus::Failed => (
            icons::FAILURE,
            outcome
                .error
                .as_ref()
                .map(|e| e.user_message())
                .unwrap_or_else(|| "RUN FAILED".to_string()),
        ),
        SessionStatus::Cancelled => (icons::WARNING, "RUN CANCELLED".to_string()),
        SessionStatus::Idle | SessionStatus::Streaming => {
            (icons::WARNING, "RUN INCOMPLETE".to_string())
        }
    }
}
