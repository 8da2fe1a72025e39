//! Terminal output for the console binary.
//!
//! Progress lines are written as snapshots arrive; the final report is
//! written once the run ends.

mod boxes;
mod renderer;

pub use boxes::*;
pub use renderer::{render_error, ConsoleRenderer};
