mod commands;
mod logging;

use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};

const FALLBACK_LOG_LEVEL: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "adpulse")]
#[command(about = "Scheduled poller for the Meta Marketing API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one batch of API requests and print the report
    Run,
    /// Start the recurring scheduler and run until interrupted
    Start,
    /// Print scheduler status without contacting the API
    Status,
    /// Check that the configured ad account is reachable
    Test,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let command = match Cli::try_parse() {
        Ok(Cli {
            command: Some(command),
        }) => command,
        Ok(Cli { command: None }) => {
            print_usage()?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) if err.use_stderr() => {
            // Unknown command or bad arguments: show usage instead of failing.
            print_usage()?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => {
            err.print()?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    let config = adpulse_core::load_app_config();
    match &config {
        Ok(cfg) => logging::init(&cfg.log_level, cfg.log_file.as_deref())?,
        Err(_) => logging::init(FALLBACK_LOG_LEVEL, None)?,
    }

    let outcome = match config {
        Ok(cfg) => commands::dispatch(command, &cfg).await,
        Err(e) => Err(anyhow::Error::new(e).context("invalid configuration")),
    };

    match outcome {
        Ok(code) => Ok(code),
        Err(e) => {
            tracing::error!("adpulse failed: {e:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_usage() -> std::io::Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}
