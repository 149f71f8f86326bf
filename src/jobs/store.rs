use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{Job, JobTracker};

/// Restart-survival cache for the tracked queue.
///
/// The backend's ongoing-jobs listing is the source of truth; this file only
/// lets the queue reappear instantly after a restart while that listing is
/// unreachable. It is written after tracker mutations and deleted on logout,
/// never updated independently.
#[derive(Debug, Clone)]
pub struct JobCache {
    path: PathBuf,
}

impl JobCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Vec<Job>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs_err::read_to_string(&self.path)
            .context("Failed to read queue cache")?;
        let jobs: Vec<Job> =
            serde_json::from_str(&content).context("Failed to parse queue cache")?;
        Ok(jobs)
    }

    pub fn save(&self, jobs: &[Job]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(jobs)
            .context("Failed to serialize queue cache")?;
        fs_err::write(&self.path, content).context("Failed to write queue cache")?;
        Ok(())
    }

    /// Remove the cache file. Missing file is fine.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs_err::remove_file(&self.path).context("Failed to remove queue cache")?;
        }
        Ok(())
    }
}

/// Seed the tracker at startup.
///
/// `listing` is the backend's ongoing-jobs response when it was reachable.
/// When present it replaces whatever the cache held; the cache is only
/// consulted as a fallback.
pub fn bootstrap(tracker: &JobTracker, listing: Option<Vec<Job>>, cache: &JobCache) -> Result<()> {
    match listing {
        Some(jobs) => {
            tracker.clear();
            for job in jobs {
                tracker.restore(job);
            }
            cache.save(&tracker.snapshot())?;
        }
        None => {
            let cached = cache.load().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "discarding unreadable queue cache");
                Vec::new()
            });
            for job in cached {
                tracker.restore(job);
            }
        }
    }
    Ok(())
}
