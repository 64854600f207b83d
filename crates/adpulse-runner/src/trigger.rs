//! Cron-driven recurring trigger.
//!
//! A [`Trigger`] owns one schedule and one task. While running, every firing
//! invokes the task; failures and panics are logged and swallowed so one bad
//! run never ends the schedule. A firing that arrives while the previous run
//! is still in flight is skipped.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use adpulse_core::AppConfig;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::engine::{CronEngine, CronSchedule, RecurrenceEngine, Registration, Tick};
use crate::error::TriggerError;

type Task = Arc<dyn Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// Cron expression plus the switch that allows it to run at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub expression: String,
    pub enabled: bool,
}

impl From<&AppConfig> for ScheduleSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            expression: config.schedule_cron.clone(),
            enabled: config.scheduling_enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleState {
    pub expression: String,
    pub enabled: bool,
    pub running: bool,
}

/// Read model reported by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    pub is_running: bool,
    pub cron_expression: String,
    pub enabled: bool,
    pub next_run_estimate: Option<DateTime<Utc>>,
}

struct Active<R> {
    registration: R,
    /// Cleared on stop so a tick already dispatched by the engine becomes a no-op.
    live: Arc<AtomicBool>,
}

pub struct Trigger<E: RecurrenceEngine = CronEngine> {
    settings: ScheduleSettings,
    engine: E,
    task: Task,
    in_flight: Arc<AtomicBool>,
    active: Option<Active<E::Registration>>,
}

impl Trigger<CronEngine> {
    pub fn new<F, Fut, TaskErr>(settings: ScheduleSettings, task: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskErr>> + Send + 'static,
        TaskErr: Display + Send + 'static,
    {
        Self::with_engine(settings, CronEngine, task)
    }
}

impl<E: RecurrenceEngine> Trigger<E> {
    pub fn with_engine<F, Fut, TaskErr>(settings: ScheduleSettings, engine: E, task: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskErr>> + Send + 'static,
        TaskErr: Display + Send + 'static,
    {
        let task: Task = Arc::new(move || {
            let fut = task();
            async move { fut.await.map_err(|e| e.to_string()) }.boxed()
        });
        Self {
            settings,
            engine,
            task,
            in_flight: Arc::new(AtomicBool::new(false)),
            active: None,
        }
    }

    /// Registers the schedule with the engine.
    ///
    /// Returns `Ok(false)` without side effects when scheduling is disabled
    /// or the trigger is already running.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::InvalidSchedule`] for a malformed expression
    /// and [`TriggerError::Engine`] if the engine refuses the registration.
    /// The trigger stays stopped in both cases.
    pub async fn start(&mut self) -> Result<bool, TriggerError> {
        if !self.settings.enabled {
            tracing::info!("scheduling is disabled");
            return Ok(false);
        }
        if self.active.is_some() {
            tracing::warn!("scheduler is already running");
            return Ok(false);
        }

        let schedule = CronSchedule::parse(&self.settings.expression)?;
        let live = Arc::new(AtomicBool::new(true));
        let tick = self.tick(Arc::clone(&live));
        let registration = self.engine.register(&schedule, tick).await?;
        self.active = Some(Active { registration, live });

        tracing::info!(cron = %self.settings.expression, "scheduler started");
        Ok(true)
    }

    /// Cancels the registration. Returns `false` if the trigger was not
    /// running. A batch already in flight runs to completion.
    pub async fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.live.store(false, Ordering::Release);
        if let Err(e) = active.registration.cancel().await {
            tracing::warn!(error = %e, "failed to cancel schedule registration cleanly");
        }
        tracing::info!("scheduler stopped");
        true
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn state(&self) -> ScheduleState {
        ScheduleState {
            expression: self.settings.expression.clone(),
            enabled: self.settings.enabled,
            running: self.is_running(),
        }
    }

    pub async fn status(&self) -> ScheduleStatus {
        let next_run_estimate = match &self.active {
            Some(active) => active.registration.next_fire().await,
            None => None,
        };
        ScheduleStatus {
            is_running: self.is_running(),
            cron_expression: self.settings.expression.clone(),
            enabled: self.settings.enabled,
            next_run_estimate,
        }
    }

    fn tick(&self, live: Arc<AtomicBool>) -> Tick {
        let task = Arc::clone(&self.task);
        let in_flight = Arc::clone(&self.in_flight);
        Arc::new(move || {
            fire(Arc::clone(&task), Arc::clone(&in_flight), Arc::clone(&live)).boxed()
        })
    }
}

/// Resets the in-flight flag when the firing ends, panics included.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn fire(task: Task, in_flight: Arc<AtomicBool>, live: Arc<AtomicBool>) {
    if !live.load(Ordering::Acquire) {
        return;
    }
    if in_flight.swap(true, Ordering::AcqRel) {
        tracing::warn!("previous scheduled run still in progress; skipping this firing");
        return;
    }
    let _guard = InFlight(in_flight);

    tracing::info!("scheduled task triggered");
    match AssertUnwindSafe(async move { task().await })
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => tracing::info!("scheduled task completed"),
        Ok(Err(error)) => tracing::error!(%error, "scheduled task failed"),
        Err(panic) => {
            tracing::error!(panic = panic_message(&*panic), "scheduled task panicked");
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
