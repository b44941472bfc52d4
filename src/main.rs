mod api;
mod board;
mod cli;
mod model;
mod orchestrator;
mod storage;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The TUI logs to a file; every other mode logs to stderr.
fn logs_to_file(args: &cli::Cli) -> bool {
    args.is_interactive() && cfg!(feature = "tui")
}

fn init_tracing(args: &cli::Cli) -> Result<()> {
    let default_level = if args.verbose { "jobscout=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    if logs_to_file(args) {
        let path = storage::log_dir()?.join("jobscout.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = !args.is_interactive();
    let log_failure = logs_to_file(&args);
    init_tracing(&args)?;

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success, especially for non-TUI modes
            if is_non_tui {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            // On stderr the returned error is already printed once.
            if log_failure {
                tracing::error!("{e:#}");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_interactive_mode_logs_to_a_file() {
        for argv in [
            vec!["jobscout", "--text"],
            vec!["jobscout", "--json"],
            vec!["jobscout", "jobs"],
        ] {
            let args = cli::Cli::try_parse_from(&argv).unwrap();
            assert!(!logs_to_file(&args), "{argv:?}");
        }

        let args = cli::Cli::try_parse_from(["jobscout"]).unwrap();
        assert_eq!(logs_to_file(&args), cfg!(feature = "tui"));
    }
}
