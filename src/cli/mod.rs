//! CLI module for the agentview console.
//!
//! The binary parses its arguments first; `--version` and `--help` are
//! answered immediately, everything else becomes a [`RunArgs`].
//!
//! ```ignore
//! use agentview::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Run(run) => { /* stream */ }
//!     other => { /* print and exit */ }
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand, RunArgs, USAGE};
pub use version::{version_line, VERSION};
