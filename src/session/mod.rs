use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::jobs::store::JobCache;
use crate::jobs::JobTracker;

/// File-backed credential store plus the session-bound teardown.
///
/// Logout is an explicit event, not a presence poll: `end()` deletes the
/// token, clears the tracker and removes the queue cache in one step, so no
/// stale job state can outlive the session it belonged to.
#[derive(Debug, Clone)]
pub struct Session {
    token_path: PathBuf,
}

impl Session {
    pub fn new(token_path: PathBuf) -> Self {
        Self { token_path }
    }

    /// The stored bearer token, if the user is logged in.
    pub fn token(&self) -> Option<String> {
        match fs_err::read_to_string(&self.token_path) {
            Ok(token) => {
                let token = token.trim().to_string();
                (!token.is_empty()).then_some(token)
            }
            Err(_) => None,
        }
    }

    pub fn store_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(&self.token_path, token).context("Failed to store access token")?;
        Ok(())
    }

    /// Drop the credential without touching job state. Used when the
    /// backend answers 401 and the token is known to be dead.
    pub fn drop_token(&self) -> Result<()> {
        if self.token_path.exists() {
            fs_err::remove_file(&self.token_path).context("Failed to remove access token")?;
        }
        Ok(())
    }

    /// Full teardown: credential, tracked set and persisted cache all go.
    pub fn end(&self, tracker: &JobTracker, cache: &JobCache) -> Result<()> {
        self.drop_token()?;
        tracker.clear();
        cache.remove()?;
        tracing::info!("session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JobKind, NewJob};

    fn temp_session() -> (tempfile::TempDir, Session, JobCache) {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path().join("token"));
        let cache = JobCache::new(dir.path().join("queue.json"));
        (dir, session, cache)
    }

    #[test]
    fn test_token_round_trip() {
        let (_dir, session, _cache) = temp_session();
        assert!(session.token().is_none());

        session.store_token("abc123").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc123"));

        session.drop_token().unwrap();
        assert!(session.token().is_none());
    }

    #[test]
    fn test_blank_token_file_counts_as_logged_out() {
        let (_dir, session, _cache) = temp_session();
        session.store_token("  \n").unwrap();
        assert!(session.token().is_none());
    }

    #[test]
    fn test_end_clears_everything() {
        let (_dir, session, cache) = temp_session();
        session.store_token("abc123").unwrap();

        let tracker = JobTracker::new();
        tracker.register(NewJob {
            job_id: "a".into(),
            kind: JobKind::Transcription,
            title: "a".into(),
        });
        cache.save(&tracker.snapshot()).unwrap();

        session.end(&tracker, &cache).unwrap();

        assert!(session.token().is_none());
        assert!(tracker.is_empty());
        assert!(cache.load().unwrap().is_empty());
    }
}
