//! Batch orchestration and scheduling for the Graph API poller.

pub mod batch;
pub mod engine;
pub mod error;
pub mod prover;
pub mod trigger;

pub use batch::{standard_operations, BatchOrchestrator, FetchOperation, RecordCount};
pub use engine::{CronEngine, CronSchedule, RecurrenceEngine, Registration};
pub use error::{ProverError, TriggerError};
pub use prover::{Prover, ProverStatus};
pub use trigger::{ScheduleSettings, ScheduleState, ScheduleStatus, Trigger};
