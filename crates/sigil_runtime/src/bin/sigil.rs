//! Sigil console entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sigil_foundation::{Channel, Result};
use sigil_runtime::{Repl, RuntimeConfig, Session};
use tracing_subscriber::EnvFilter;

/// Sigil -- chat command console.
#[derive(Parser, Debug)]
#[command(name = "sigil", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Caller id to speak as, overriding the configuration
    #[arg(long)]
    caller: Option<String>,

    /// Channel lines arrive on (public, private, console)
    #[arg(long)]
    channel: Option<Channel>,

    /// Evaluate a line and exit
    #[arg(short, long = "eval")]
    eval: Vec<String>,

    /// Run the given scripts and exit instead of starting the console
    #[arg(short, long)]
    batch: bool,

    /// Scripts of command lines to run first
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

/// Returns false if any scripted line failed.
fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(id) = cli.caller {
        config.caller.id = id;
        config.caller.name.clear();
    }
    if let Some(channel) = cli.channel {
        config.channel = channel;
    }

    let session = Session::new(&config)?;
    tracing::debug!(caller = %config.caller().id, channel = %config.channel, "session ready");

    let mut repl = Repl::new(session, config.history_size)?.with_prompt(config.prompt.clone());

    let mut failures = 0;
    for file in &cli.files {
        failures += repl.eval_file(file)?;
    }
    for line in &cli.eval {
        if let Some(result) = repl.eval_line(line)? {
            if sigil_runtime::is_failure(&result) {
                failures += 1;
            }
            Repl::<sigil_runtime::RustylineEditor>::print_result(&result);
        }
    }

    if cli.batch || !cli.eval.is_empty() {
        return Ok(failures == 0);
    }

    if !cli.files.is_empty() {
        repl = repl.without_banner();
    }
    repl.run()?;
    Ok(true)
}
