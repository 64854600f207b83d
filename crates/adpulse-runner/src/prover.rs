//! Application facade tying the client, orchestrator, and trigger together.

use std::sync::Arc;
use std::time::Duration;

use adpulse_core::{AppConfig, BatchReport};
use adpulse_graph::{AccountSource, ConnectionProbe, GraphClient};
use serde::Serialize;

use crate::batch::BatchOrchestrator;
use crate::engine::{CronEngine, RecurrenceEngine};
use crate::error::{ProverError, TriggerError};
use crate::trigger::{ScheduleSettings, ScheduleStatus, Trigger};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProverStatus {
    /// True once the ad account has been read successfully.
    pub initialized: bool,
    pub scheduler: ScheduleStatus,
}

/// A configured poller for one ad account.
///
/// Only obtainable through a constructor, so every instance owns a ready
/// orchestrator and a (possibly stopped) trigger.
pub struct Prover<S: AccountSource = GraphClient, E: RecurrenceEngine = CronEngine> {
    source: Arc<S>,
    orchestrator: Arc<BatchOrchestrator>,
    trigger: Trigger<E>,
    verified: bool,
}

impl Prover<GraphClient, CronEngine> {
    /// Builds the client and verifies it can read the ad account.
    ///
    /// # Errors
    ///
    /// Returns [`ProverError::Client`] if the client cannot be constructed
    /// and [`ProverError::Connection`] if the account cannot be read.
    pub async fn initialize(config: &AppConfig) -> Result<Self, ProverError> {
        tracing::info!(account_id = %config.ad_account_id, "initializing poller");
        let mut prover = Self::from_config(config)?;

        let check = prover.test_connection().await;
        if !check.success {
            let reason = check
                .error
                .unwrap_or_else(|| "unknown connection error".to_owned());
            return Err(ProverError::Connection(reason));
        }
        prover.verified = true;

        tracing::info!("poller initialized");
        Ok(prover)
    }

    /// Builds the poller without touching the network. Its status reports
    /// `initialized: false` until a connection check has passed.
    ///
    /// # Errors
    ///
    /// Returns [`ProverError::Client`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProverError> {
        let client = GraphClient::from_config(config)?;
        Ok(Self::build(config, client, CronEngine))
    }
}

impl<E: RecurrenceEngine> Prover<GraphClient, E> {
    pub async fn test_connection(&self) -> ConnectionProbe {
        self.source.test_connection().await
    }
}

impl<S: AccountSource, E: RecurrenceEngine> Prover<S, E> {
    /// Wires `source` into the standard batch and a trigger that runs it.
    ///
    /// Scheduled batches with any failed operation are reported to the
    /// trigger as errors so they show up in its log output.
    pub fn build(config: &AppConfig, source: S, engine: E) -> Self {
        let source = Arc::new(source);
        let orchestrator = Arc::new(
            BatchOrchestrator::for_source(Arc::clone(&source), config.insights_days)
                .with_operation_timeout(operation_timeout(config)),
        );

        let scheduled = Arc::clone(&orchestrator);
        let trigger = Trigger::with_engine(ScheduleSettings::from(config), engine, move || {
            let orchestrator = Arc::clone(&scheduled);
            async move {
                let report = orchestrator.run_batch().await;
                if report.overall_success() {
                    Ok(())
                } else {
                    Err(ProverError::BatchIncomplete {
                        failed: report.error_count(),
                        total: report.outcomes().len(),
                    })
                }
            }
        });

        Self {
            source,
            orchestrator,
            trigger,
            verified: false,
        }
    }

    /// Runs one batch immediately, independent of the schedule.
    pub async fn run_api_requests(&self) -> BatchReport {
        self.orchestrator.run_batch().await
    }

    /// # Errors
    ///
    /// See [`Trigger::start`].
    pub async fn start_scheduler(&mut self) -> Result<bool, TriggerError> {
        self.trigger.start().await
    }

    pub async fn stop_scheduler(&mut self) -> bool {
        self.trigger.stop().await
    }

    pub async fn status(&self) -> ProverStatus {
        ProverStatus {
            initialized: self.verified,
            scheduler: self.trigger.status().await,
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}

fn operation_timeout(config: &AppConfig) -> Option<Duration> {
    (config.operation_timeout_secs > 0)
        .then(|| Duration::from_secs(config.operation_timeout_secs))
}
