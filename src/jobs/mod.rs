use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub mod poller;
pub mod store;

/// Lifecycle state of a backend job.
///
/// `Completed` and `Failed` are terminal: once reached, no later status
/// fetch may move the job anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// What kind of work the backend is doing for a job. Informational only;
/// the tracker treats both kinds identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    Transcription,
    ContentGeneration,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Transcription => "transcription",
            JobKind::ContentGeneration => "content-generation",
        }
    }
}

/// A tracked unit of asynchronous backend work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(rename = "type")]
    pub kind: JobKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Registration input for a freshly submitted job. The tracker assigns
/// `created_at` itself and starts the job at `Pending`.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub job_id: String,
    pub kind: JobKind,
    pub title: String,
}

/// Shared container for the set of in-flight jobs.
///
/// The tracker exclusively owns the tracked set; consumers read it through
/// [`JobTracker::snapshot`] and mutate it only through `register`,
/// `apply_status`, `restore` and `clear`. Clones share the same underlying
/// set, so the polling loop and the rendering code can hold one instance.
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    inner: Arc<Mutex<HashMap<String, Job>>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly submitted job as `pending`.
    ///
    /// Registration is idempotent: if the id is already tracked the call is
    /// a no-op and the existing entry is untouched.
    pub fn register(&self, new: NewJob) {
        let mut jobs = self.inner.lock().unwrap();
        if jobs.contains_key(&new.job_id) {
            tracing::debug!(job_id = %new.job_id, "job already tracked, skipping registration");
            return;
        }
        tracing::info!(job_id = %new.job_id, kind = new.kind.as_str(), "tracking job");
        jobs.insert(
            new.job_id.clone(),
            Job {
                job_id: new.job_id,
                status: JobStatus::Pending,
                kind: new.kind,
                title: new.title,
                created_at: Utc::now(),
                completed_at: None,
            },
        );
    }

    /// Re-insert a previously known job, keeping its recorded status and
    /// timestamps. Used when seeding from the backend listing or the local
    /// cache at startup. Idempotent like `register`.
    pub fn restore(&self, job: Job) {
        let mut jobs = self.inner.lock().unwrap();
        jobs.entry(job.job_id.clone()).or_insert(job);
    }

    /// Apply a status observed from the backend.
    ///
    /// Unknown ids are ignored rather than inserted. The first transition
    /// into `completed` stamps `completed_at`; repeat applications never
    /// overwrite it, and a terminal job is never moved again.
    pub fn apply_status(&self, job_id: &str, status: JobStatus) {
        let mut jobs = self.inner.lock().unwrap();
        let Some(job) = jobs.get_mut(job_id) else {
            tracing::debug!(job_id, "status update for untracked job ignored");
            return;
        };
        if job.status == status || job.status.is_terminal() {
            return;
        }
        tracing::info!(
            job_id,
            from = job.status.as_str(),
            to = status.as_str(),
            "job status changed"
        );
        job.status = status;
        if status == JobStatus::Completed && job.completed_at.is_none() {
            job.completed_at = Some(Utc::now());
        }
    }

    /// Owned view of the tracked set, newest-first.
    pub fn snapshot(&self) -> Vec<Job> {
        let jobs = self.inner.lock().unwrap();
        let mut out: Vec<Job> = jobs.values().cloned().collect();
        out.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        out
    }

    /// Ids of jobs that still need polling.
    pub fn active_ids(&self) -> Vec<String> {
        let jobs = self.inner.lock().unwrap();
        jobs.values()
            .filter(|job| !job.status.is_terminal())
            .map(|job| job.job_id.clone())
            .collect()
    }

    pub fn is_idle(&self) -> bool {
        let jobs = self.inner.lock().unwrap();
        jobs.values().all(|job| job.status.is_terminal())
    }

    pub fn get(&self, job_id: &str) -> Option<Job> {
        self.inner.lock().unwrap().get(job_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Drop every tracked job. Called when the session ends.
    pub fn clear(&self) {
        let mut jobs = self.inner.lock().unwrap();
        if !jobs.is_empty() {
            tracing::info!(count = jobs.len(), "clearing tracked jobs");
        }
        jobs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_job(id: &str, title: &str) -> NewJob {
        NewJob {
            job_id: id.to_string(),
            kind: JobKind::Transcription,
            title: title.to_string(),
        }
    }

    #[test]
    fn test_registration_is_idempotent() {
        let tracker = JobTracker::new();
        tracker.register(new_job("a1", "first"));
        tracker.register(new_job("a1", "second"));

        let jobs = tracker.snapshot();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "first");
        assert_eq!(jobs[0].status, JobStatus::Pending);
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let tracker = JobTracker::new();
        tracker.apply_status("unknown", JobStatus::Completed);
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn test_full_lifecycle_stamps_completed_at_once() {
        let tracker = JobTracker::new();
        tracker.register(new_job("a1", "T1"));
        tracker.apply_status("a1", JobStatus::Processing);
        tracker.apply_status("a1", JobStatus::Completed);

        let job = tracker.get("a1").unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        let completed_at = job.completed_at.expect("completed_at must be set");
        assert!(job.created_at <= completed_at);

        // Re-applying completed must not move the timestamp.
        tracker.apply_status("a1", JobStatus::Completed);
        assert_eq!(tracker.get("a1").unwrap().completed_at, Some(completed_at));
    }

    #[test]
    fn test_failed_job_has_no_completed_at() {
        let tracker = JobTracker::new();
        tracker.register(new_job("a1", "T1"));
        tracker.apply_status("a1", JobStatus::Failed);

        let job = tracker.get("a1").unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_terminal_job_never_regresses() {
        let tracker = JobTracker::new();
        tracker.register(new_job("a1", "T1"));
        tracker.apply_status("a1", JobStatus::Completed);
        tracker.apply_status("a1", JobStatus::Processing);

        let job = tracker.get("a1").unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_independent_updates_within_one_tick() {
        let tracker = JobTracker::new();
        tracker.register(new_job("j1", "one"));
        tracker.register(new_job("j2", "two"));

        tracker.apply_status("j1", JobStatus::Failed);
        tracker.apply_status("j2", JobStatus::Completed);

        assert_eq!(tracker.get("j1").unwrap().status, JobStatus::Failed);
        assert_eq!(tracker.get("j2").unwrap().status, JobStatus::Completed);
        assert!(tracker.get("j1").unwrap().completed_at.is_none());
        assert!(tracker.get("j2").unwrap().completed_at.is_some());
    }

    #[test]
    fn test_snapshot_is_newest_first() {
        let tracker = JobTracker::new();
        tracker.restore(Job {
            job_id: "old".into(),
            status: JobStatus::Pending,
            kind: JobKind::Transcription,
            title: "old".into(),
            created_at: Utc::now() - chrono::Duration::minutes(5),
            completed_at: None,
        });
        tracker.register(new_job("new", "new"));

        let jobs = tracker.snapshot();
        assert_eq!(jobs[0].job_id, "new");
        assert_eq!(jobs[1].job_id, "old");
    }

    #[test]
    fn test_active_ids_excludes_terminal_jobs() {
        let tracker = JobTracker::new();
        tracker.register(new_job("a", "a"));
        tracker.register(new_job("b", "b"));
        tracker.apply_status("a", JobStatus::Completed);

        assert_eq!(tracker.active_ids(), vec!["b".to_string()]);
        assert!(!tracker.is_idle());
        tracker.apply_status("b", JobStatus::Failed);
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_clear_empties_the_set() {
        let tracker = JobTracker::new();
        tracker.register(new_job("a", "a"));
        tracker.clear();
        assert!(tracker.is_empty());
    }
}
