use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{JobStatus, JobTracker};
use crate::api::ApiError;

/// Where the poller asks for job statuses. Implemented by the API client;
/// swapped for a mock in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatus>;
}

/// Periodically reconciles tracked job statuses with the backend.
///
/// One tick polls every non-terminal job concurrently and applies the
/// results through the tracker. Ticks are serialized: the loop awaits the
/// whole tick before sleeping again, so a slow backend can never interleave
/// stale and fresh statuses for the same job. A fetch failure is tolerated
/// up to `max_attempts` consecutive times before the job is marked failed.
pub struct Poller {
    tracker: JobTracker,
    source: Arc<dyn StatusSource>,
    interval: Duration,
    max_attempts: u32,
    failures: HashMap<String, u32>,
}

impl Poller {
    pub fn new(
        tracker: JobTracker,
        source: Arc<dyn StatusSource>,
        interval: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            tracker,
            source,
            interval,
            max_attempts: max_attempts.max(1),
            failures: HashMap::new(),
        }
    }

    /// Run one polling tick. Returns the number of jobs polled; an empty
    /// eligible set issues no requests at all.
    ///
    /// A 401 from any fetch is not a job failure: the credential is dead,
    /// so the tick aborts with the error and no job state is touched for
    /// it. The caller tears the session down.
    pub async fn tick(&mut self) -> Result<usize> {
        let ids = self.tracker.active_ids();
        if ids.is_empty() {
            return Ok(0);
        }
        tracing::debug!(count = ids.len(), "polling job statuses");

        let fetches = ids.iter().map(|id| {
            let source = Arc::clone(&self.source);
            async move {
                let result = source.fetch_status(id).await;
                (id.clone(), result)
            }
        });
        let results = futures_util::future::join_all(fetches).await;

        for (job_id, result) in results {
            match result {
                Ok(status) => {
                    self.failures.remove(&job_id);
                    self.tracker.apply_status(&job_id, status);
                }
                Err(err) => {
                    if matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)) {
                        return Err(err);
                    }
                    let attempts = self.failures.entry(job_id.clone()).or_insert(0);
                    *attempts += 1;
                    if *attempts >= self.max_attempts {
                        tracing::warn!(
                            job_id = %job_id,
                            attempts = *attempts,
                            error = %err,
                            "status fetch kept failing, marking job failed"
                        );
                        self.failures.remove(&job_id);
                        self.tracker.apply_status(&job_id, JobStatus::Failed);
                    } else {
                        tracing::debug!(
                            job_id = %job_id,
                            attempts = *attempts,
                            error = %err,
                            "status fetch failed, will retry"
                        );
                    }
                }
            }
        }
        Ok(ids.len())
    }

    /// Poll on the configured interval until every tracked job is terminal.
    /// `on_tick` runs after each tick so the caller can persist or render
    /// the queue. Stops early with the error when a tick hits a dead
    /// credential.
    pub async fn run_until_idle<F>(&mut self, mut on_tick: F) -> Result<()>
    where
        F: FnMut(&JobTracker),
    {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            timer.tick().await;
            if self.tracker.is_idle() {
                break;
            }
            self.tick().await?;
            on_tick(&self.tracker);
            if self.tracker.is_idle() {
                break;
            }
        }
        Ok(())
    }
}
