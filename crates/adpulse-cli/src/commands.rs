//! Command handlers. Each returns the process exit code.

use std::process::ExitCode;

use adpulse_core::AppConfig;
use adpulse_runner::Prover;
use serde::Serialize;

use crate::Commands;

pub(crate) async fn dispatch(command: Commands, config: &AppConfig) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Run => run(config).await,
        Commands::Start => start(config).await,
        Commands::Status => status(config).await,
        Commands::Test => test(config).await,
    }
}

/// One batch; exit status mirrors `overallSuccess`.
async fn run(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let prover = Prover::initialize(config).await?;
    let report = prover.run_api_requests().await;
    print_json(&report)?;
    Ok(exit_code(report.overall_success()))
}

async fn start(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let mut prover = Prover::initialize(config).await?;

    if !prover.start_scheduler().await? {
        eprintln!("Failed to start scheduler");
        return Ok(ExitCode::FAILURE);
    }
    print_json(&prover.status().await)?;

    let waited = shutdown_signal().await;
    prover.stop_scheduler().await;
    waited?;

    tracing::info!("scheduler shut down");
    Ok(ExitCode::SUCCESS)
}

/// Reports the configured schedule. Never contacts the API.
async fn status(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let prover = Prover::from_config(config)?;
    print_json(&prover.status().await)?;
    Ok(ExitCode::SUCCESS)
}

async fn test(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let prover = Prover::from_config(config)?;
    let probe = prover.test_connection().await;
    print_json(&probe)?;
    Ok(exit_code(probe.success))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    tracing::info!("received shutdown signal, stopping scheduler");
    Ok(())
}
