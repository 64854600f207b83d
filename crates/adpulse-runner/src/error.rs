use adpulse_graph::GraphError;
use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("invalid schedule expression \"{expression}\": {reason}")]
    InvalidSchedule { expression: String, reason: String },

    #[error("scheduler engine error: {0}")]
    Engine(#[from] JobSchedulerError),
}

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("failed to build Graph API client: {0}")]
    Client(#[from] GraphError),

    #[error("Graph API connection failed: {0}")]
    Connection(String),

    /// Raised by the scheduled task so the trigger logs a partial batch as a failure.
    #[error("{failed} of {total} fetch operations failed")]
    BatchIncomplete { failed: usize, total: usize },
}
