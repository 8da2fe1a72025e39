//! Command-line argument parsing for the agentview console.
//!
//! ```text
//! agentview [--url URL] [--deadline SECS] [--json] [--interactive] <task...>
//! ```

use std::time::Duration;

use crate::config::{parse_secs, ConsoleConfig};
use crate::error::ConfigError;

/// Options for a streaming run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunArgs {
    /// Task text; words after the flags are joined with spaces
    pub task: Option<String>,
    /// Overrides `AGENTVIEW_URL`
    pub url: Option<String>,
    /// Overrides `AGENTVIEW_DEADLINE_SECS`
    pub deadline: Option<Duration>,
    /// Print the final state as JSON instead of the report
    pub json: bool,
    /// Read one task per stdin line
    pub interactive: bool,
}

impl RunArgs {
    /// Layer the flags over an environment-derived config.
    pub fn apply_to(&self, config: ConsoleConfig) -> Result<ConsoleConfig, ConfigError> {
        let mut config = config;
        if let Some(url) = &self.url {
            config = config.with_base_url(url.clone());
        }
        if self.deadline.is_some() {
            config = config.with_deadline(self.deadline);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Stream one task, or a series of tasks in interactive mode
    Run(RunArgs),
}

pub const USAGE: &str = "\
Usage: agentview [OPTIONS] <task...>

Streams a code-generation run and renders its progress.

Options:
  --url URL         Generation service base URL (env AGENTVIEW_URL)
  --deadline SECS   Cancel the run after SECS seconds (env AGENTVIEW_DEADLINE_SECS)
  --json            Print the final state as JSON
  --interactive     Read one task per line from stdin; each line replaces the last run
  -V, --version     Print version
  -h, --help        Print this help";

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use agentview::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["agentview".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap(), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ConfigError>
where
    I: Iterator<Item = String>,
{
    let mut run = RunArgs::default();
    let mut words: Vec<String> = Vec::new();
    // Skip the program name
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        if !words.is_empty() {
            // Everything after the first task word belongs to the task
            words.push(arg);
            continue;
        }
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--json" => run.json = true,
            "--interactive" | "-i" => run.interactive = true,
            "--url" => run.url = Some(required_value(&arg, args.next())?),
            "--deadline" => {
                let raw = required_value(&arg, args.next())?;
                run.deadline = Some(parse_secs("--deadline", &raw)?);
            }
            "--" => words.extend(args.by_ref()),
            flag if flag.starts_with("--") => {
                return Err(ConfigError::InvalidValue {
                    key: flag.to_string(),
                    value: String::new(),
                    reason: "unknown flag".to_string(),
                })
            }
            _ => words.push(arg),
        }
    }

    if !words.is_empty() {
        run.task = Some(words.join(" "));
    }
    if run.task.is_none() && !run.interactive {
        return Ok(CliCommand::Help);
    }
    Ok(CliCommand::Run(run))
}

fn required_value(flag: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::InvalidValue {
        key: flag.to_string(),
        value: String::new(),
        reason: "missing value".to_string(),
    })
}
