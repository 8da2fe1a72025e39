use std::io;

use agentview::adapters::ReqwestChunkSource;
use agentview::cli::{parse_args, version_line, CliCommand, RunArgs, USAGE};
use agentview::cli_output::render_error;
use agentview::config::ConsoleConfig;
use agentview::console::Console;
use agentview::error::{ConsoleResult, StreamError};
use agentview::session::StreamSession;

use color_eyre::Result;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays the rendered console.
fn init_logging(config: &ConsoleConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let run = match parse_args(std::env::args())? {
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Run(run) => run,
    };

    let succeeded = match run_console(run) {
        Ok(succeeded) => succeeded,
        Err(err) => {
            render_error(&mut io::stderr(), &err)?;
            false
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn run_console(run: RunArgs) -> ConsoleResult<bool> {
    let config = run.apply_to(ConsoleConfig::from_env()?)?;
    init_logging(&config);

    let runtime = tokio::runtime::Runtime::new()?;
    let succeeded = runtime.block_on(drive_console(config, run))?;
    drop(runtime);
    Ok(succeeded)
}

async fn drive_console(config: ConsoleConfig, run: RunArgs) -> ConsoleResult<bool> {
    let source = ReqwestChunkSource::from_config(&config)
        .map_err(|source| StreamError::OpenFailed { source })?;
    info!(url = source.url(), "Using generation service");

    let mut console = Console::new(StreamSession::new(source))
        .with_json(run.json)
        .with_deadline(config.deadline);
    let updates = console.session().subscribe();

    if let Some(task) = &run.task {
        console.start(task)?;
    }
    let input = run
        .interactive
        .then(|| BufReader::new(tokio::io::stdin()));
    console.drive(updates, input, &mut io::stdout()).await?;
    Ok(console.succeeded())
}
