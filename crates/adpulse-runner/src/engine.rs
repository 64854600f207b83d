//! Recurrence engine abstraction.
//!
//! The trigger only needs "call this callback on every tick of a cron
//! schedule, and give me a handle to cancel it". [`CronEngine`] provides that
//! on top of `tokio-cron-scheduler`; tests substitute an engine they fire by
//! hand.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use crate::error::TriggerError;

/// Callback invoked on every firing of a registered schedule.
pub type Tick = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// A validated cron expression.
///
/// Accepts the classic 5-field form (`min hour dom month dow`) and the
/// 6-field form with a leading seconds field. 5-field input is normalized by
/// prefixing `0` seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    normalized: String,
}

impl CronSchedule {
    /// Parses and validates `expression`.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::InvalidSchedule`] if the expression has the
    /// wrong number of fields or the cron parser rejects it.
    pub fn parse(expression: &str) -> Result<Self, TriggerError> {
        let invalid = |reason: String| TriggerError::InvalidSchedule {
            expression: expression.to_owned(),
            reason,
        };

        let fields: Vec<&str> = expression.split_whitespace().collect();
        let normalized = match fields.len() {
            5 => format!("0 {}", fields.join(" ")),
            6 => fields.join(" "),
            n => return Err(invalid(format!("expected 5 or 6 fields, found {n}"))),
        };

        // Building a throwaway job runs the scheduler's own parser.
        Job::new(normalized.as_str(), |_uuid, _lock| {}).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            expression: expression.to_owned(),
            normalized,
        })
    }

    /// The expression as configured.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The 6-field form handed to the engine.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Something that can fire a [`Tick`] on a cron schedule.
pub trait RecurrenceEngine: Send + Sync + 'static {
    type Registration: Registration;

    fn register(
        &self,
        schedule: &CronSchedule,
        tick: Tick,
    ) -> impl Future<Output = Result<Self::Registration, TriggerError>> + Send;
}

/// Handle to a live schedule registration.
pub trait Registration: Send + Sync + 'static {
    /// Best-effort next fire time; `None` when the engine cannot tell.
    fn next_fire(&self) -> impl Future<Output = Option<DateTime<Utc>>> + Send;

    /// Stops future firings. Firings already in progress are not interrupted.
    fn cancel(self) -> impl Future<Output = Result<(), TriggerError>> + Send;
}

/// Production engine: one `JobScheduler` per registration, evaluated in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct CronEngine;

impl RecurrenceEngine for CronEngine {
    type Registration = CronRegistration;

    fn register(
        &self,
        schedule: &CronSchedule,
        tick: Tick,
    ) -> impl Future<Output = Result<CronRegistration, TriggerError>> + Send {
        let expression = schedule.normalized().to_owned();
        async move {
            let scheduler = JobScheduler::new().await?;
            let job = Job::new_async(expression.as_str(), move |_uuid, _lock| tick())?;
            let job_id = scheduler.add(job).await?;
            scheduler.start().await?;
            tracing::debug!(%job_id, cron = %expression, "cron job registered");
            Ok(CronRegistration {
                scheduler: Some(scheduler),
                job_id,
            })
        }
    }
}

/// A job registered with its own [`JobScheduler`].
///
/// Dropping a registration without cancelling it shuts the scheduler down in
/// the background, so no job outlives its trigger.
pub struct CronRegistration {
    scheduler: Option<JobScheduler>,
    job_id: Uuid,
}

impl Registration for CronRegistration {
    fn next_fire(&self) -> impl Future<Output = Option<DateTime<Utc>>> + Send {
        let scheduler = self.scheduler.clone();
        let job_id = self.job_id;
        async move {
            let mut scheduler = scheduler?;
            match scheduler.next_tick_for_job(job_id).await {
                Ok(next) => next,
                Err(e) => {
                    tracing::debug!(error = %e, %job_id, "could not compute next tick");
                    None
                }
            }
        }
    }

    fn cancel(mut self) -> impl Future<Output = Result<(), TriggerError>> + Send {
        let scheduler = self.scheduler.take();
        let job_id = self.job_id;
        async move {
            if let Some(mut scheduler) = scheduler {
                scheduler.remove(&job_id).await?;
                scheduler.shutdown().await?;
                tracing::debug!(%job_id, "cron job removed");
            }
            Ok(())
        }
    }
}

impl Drop for CronRegistration {
    fn drop(&mut self) {
        let Some(mut scheduler) = self.scheduler.take() else {
            return;
        };
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = scheduler.shutdown().await {
                    tracing::warn!(error = %e, "failed to shut down dropped scheduler");
                }
            });
        }
    }
}
