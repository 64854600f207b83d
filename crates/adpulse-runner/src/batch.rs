//! Sequential batch execution over a fixed list of fetch operations.
//!
//! Every operation is attempted exactly once per batch, in declared order.
//! A failed operation becomes a failed [`FetchOutcome`]; it never aborts the
//! batch.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use adpulse_core::{BatchReport, FetchOutcome};
use adpulse_graph::{AccountSource, AdAccount, InsightsWindow};
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};

/// Number of records a successful fetch produced.
pub trait RecordCount {
    fn record_count(&self) -> usize;
}

impl<T> RecordCount for Vec<T> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl RecordCount for AdAccount {
    fn record_count(&self) -> usize {
        1
    }
}

type Invoke = Box<dyn Fn() -> BoxFuture<'static, Result<usize, String>> + Send + Sync>;

/// A named, repeatable remote fetch.
pub struct FetchOperation {
    name: String,
    invoke: Invoke,
}

impl FetchOperation {
    /// Wraps `invoke` so its data is reduced to a record count and its error
    /// to the error's display message.
    pub fn new<F, Fut, T, E>(name: impl Into<String>, invoke: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: RecordCount + Send + 'static,
        E: Display + Send + 'static,
    {
        let invoke: Invoke = Box::new(move || {
            let fut = invoke();
            async move {
                fut.await
                    .map(|data| data.record_count())
                    .map_err(|e| e.to_string())
            }
            .boxed()
        });
        Self {
            name: name.into(),
            invoke,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FetchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOperation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Runs a fixed, ordered list of fetch operations and reports on each.
#[derive(Debug)]
pub struct BatchOrchestrator {
    operations: Vec<FetchOperation>,
    operation_timeout: Option<Duration>,
}

impl BatchOrchestrator {
    #[must_use]
    pub fn new(operations: Vec<FetchOperation>) -> Self {
        Self {
            operations,
            operation_timeout: None,
        }
    }

    /// Orchestrator over the standard account reads of `source`.
    #[must_use]
    pub fn for_source<S: AccountSource>(source: Arc<S>, insights_days: u32) -> Self {
        Self::new(standard_operations(&source, insights_days))
    }

    /// Caps how long a single operation may run. `None` disables the cap.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.iter().map(FetchOperation::name).collect()
    }

    /// Executes every operation once, strictly one after another.
    pub async fn run_batch(&self) -> BatchReport {
        let started_at = Utc::now();
        tracing::info!(
            total_requests = self.operations.len(),
            "starting batch API requests"
        );

        let mut outcomes = Vec::with_capacity(self.operations.len());
        for operation in &self.operations {
            outcomes.push(self.run_operation(operation).await);
        }

        let report = BatchReport::from_outcomes(started_at, outcomes);
        tracing::info!(
            successful = report.success_count(),
            failed = report.error_count(),
            overall_success = report.overall_success(),
            "batch API requests completed"
        );
        report
    }

    async fn run_operation(&self, operation: &FetchOperation) -> FetchOutcome {
        tracing::info!(operation = operation.name(), "executing API request");
        let started = Instant::now();

        let result = match self.operation_timeout {
            Some(limit) => tokio::time::timeout(limit, (operation.invoke)())
                .await
                .unwrap_or_else(|_| Err(format!("timed out after {limit:?}"))),
            None => (operation.invoke)().await,
        };

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let finished_at = Utc::now();

        match result {
            Ok(count) => {
                tracing::info!(
                    operation = operation.name(),
                    duration_ms,
                    data_count = count,
                    "API request succeeded"
                );
                FetchOutcome::succeeded(operation.name(), duration_ms, count, finished_at)
            }
            Err(message) => {
                tracing::error!(
                    operation = operation.name(),
                    duration_ms,
                    error = %message,
                    "API request failed"
                );
                FetchOutcome::failed(operation.name(), duration_ms, message, finished_at)
            }
        }
    }
}

/// The account reads run by every batch, in report order.
///
/// The insights window is computed when the operation runs, so a long-lived
/// scheduler always asks for the trailing `insights_days` ending today.
pub fn standard_operations<S: AccountSource>(
    source: &Arc<S>,
    insights_days: u32,
) -> Vec<FetchOperation> {
    vec![
        bind("account", source, |s| async move { s.account().await }),
        bind("campaigns", source, |s| async move { s.campaigns().await }),
        bind("adSets", source, |s| async move { s.ad_sets().await }),
        bind("ads", source, |s| async move { s.ads().await }),
        bind("customAudiences", source, |s| async move {
            s.custom_audiences().await
        }),
        bind("adImages", source, |s| async move { s.ad_images().await }),
        bind("insights", source, move |s| async move {
            let window = InsightsWindow::trailing(insights_days, Utc::now());
            s.insights(window).await
        }),
    ]
}

fn bind<S, F, Fut, T, E>(name: &str, source: &Arc<S>, call: F) -> FetchOperation
where
    S: AccountSource,
    F: Fn(Arc<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: RecordCount + Send + 'static,
    E: Display + Send + 'static,
{
    let source = Arc::clone(source);
    FetchOperation::new(name, move || call(Arc::clone(&source)))
}
