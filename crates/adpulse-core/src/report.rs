//! Batch report data model.
//!
//! A [`BatchReport`] is assembled by the orchestrator from one
//! [`FetchOutcome`] per configured fetch operation. Both serialize to
//! camelCase JSON for the `run` command and for log output.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Recorded result of one fetch operation within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    /// Number of records returned; present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_count: Option<usize>,
    /// Display message of the error; present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl FetchOutcome {
    #[must_use]
    pub fn succeeded(
        name: impl Into<String>,
        duration_ms: u64,
        data_count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            success: true,
            duration_ms,
            data_count: Some(data_count),
            error_message: None,
            timestamp,
        }
    }

    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        duration_ms: u64,
        error_message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            success: false,
            duration_ms,
            data_count: None,
            error_message: Some(error_message.into()),
            timestamp,
        }
    }
}

/// Aggregate result of one batch.
///
/// Fields are private so the success flag and error count can only be
/// derived from the outcomes they summarize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    timestamp: DateTime<Utc>,
    outcomes: Vec<FetchOutcome>,
    overall_success: bool,
    error_count: usize,
}

impl BatchReport {
    /// Builds a report from the outcomes of a finished batch, in run order.
    #[must_use]
    pub fn from_outcomes(timestamp: DateTime<Utc>, outcomes: Vec<FetchOutcome>) -> Self {
        let error_count = outcomes.iter().filter(|o| !o.success).count();
        Self {
            timestamp,
            outcomes,
            overall_success: error_count == 0,
            error_count,
        }
    }

    /// Instant the batch started.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn outcomes(&self) -> &[FetchOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn overall_success(&self) -> bool {
        self.overall_success
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.outcomes.len() - self.error_count
    }
}
