use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::api::{ApiClient, ApiError, GenerateRequest};
use crate::config::Config;
use crate::history;
use crate::jobs::poller::Poller;
use crate::jobs::store::{self, JobCache};
use crate::jobs::{JobKind, JobStatus, JobTracker, NewJob};
use crate::output;
use crate::session::Session;
use crate::utils;

/// Per-invocation overrides for article generation.
#[derive(Debug, Default)]
pub struct GenerateOptions {
    pub transcription_id: Option<i64>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub style: Option<String>,
    pub notes: Option<String>,
}

/// Wires one CLI invocation together: config, session, tracker and cache.
pub struct App {
    config: Config,
    session: Session,
    tracker: JobTracker,
    cache: JobCache,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let session = Session::new(Config::token_path()?);
        let cache = JobCache::new(Config::queue_cache_path()?);
        Ok(Self {
            config,
            session,
            tracker: JobTracker::new(),
            cache,
        })
    }

    /// API client for authenticated calls. Fails fast when not logged in.
    fn api(&self) -> Result<ApiClient> {
        let token = self
            .session
            .token()
            .context("Not logged in; run `scribeflow login` first")?;
        ApiClient::new(&self.config, Some(token))
    }

    /// Map an API failure, dropping the credential when the backend says
    /// it is dead so the next invocation asks for a fresh login.
    fn on_api_error(&self, err: ApiError) -> anyhow::Error {
        if matches!(err, ApiError::Unauthorized) {
            if let Err(drop_err) = self.session.drop_token() {
                tracing::warn!(error = %drop_err, "could not remove stale token");
            }
            anyhow::anyhow!("Session expired; run `scribeflow login` again")
        } else {
            err.into()
        }
    }

    /// Like `on_api_error`, for errors that may carry an [`ApiError`]
    /// somewhere in their chain (the poller, history fetches).
    fn escalate(&self, err: anyhow::Error) -> anyhow::Error {
        match err.downcast::<ApiError>() {
            Ok(api_err) => self.on_api_error(api_err),
            Err(err) => err,
        }
    }

    /// Seed the tracker: backend listing when reachable, cache otherwise.
    async fn bootstrap(&self, api: &ApiClient) -> Result<()> {
        let listing = match api.ongoing_jobs().await {
            Ok(jobs) => Some(jobs.into_iter().map(|j| j.into_job()).collect()),
            Err(ApiError::Unauthorized) => {
                return Err(self.on_api_error(ApiError::Unauthorized))
            }
            Err(err) => {
                tracing::warn!(error = %err, "ongoing-jobs listing unavailable, using cache");
                None
            }
        };
        store::bootstrap(&self.tracker, listing, &self.cache)
    }

    fn persist_queue(&self) {
        if let Err(err) = self.cache.save(&self.tracker.snapshot()) {
            tracing::warn!(error = %err, "could not persist queue cache");
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let api = ApiClient::new(&self.config, None)?;
        let response = api.login(email, password).await.map_err(|err| match err {
            ApiError::Unauthorized => anyhow::anyhow!("Invalid credentials"),
            other => anyhow::Error::from(other).context("Login failed"),
        })?;
        self.session.store_token(&response.access_token)?;

        let api = self.api()?;
        let user = api.me().await.map_err(|err| self.on_api_error(err))?;
        println!("Logged in as {}", user.email);
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.session.end(&self.tracker, &self.cache)?;
        println!("Logged out.");
        Ok(())
    }

    pub async fn whoami(&self) -> Result<()> {
        let api = self.api()?;
        let user = api.me().await.map_err(|err| self.on_api_error(err))?;
        println!("{} (id {})", user.email, user.id);
        Ok(())
    }

    /// Submit a YouTube URL or upload a local file, register the returned
    /// job and optionally poll until it finishes.
    pub async fn transcribe(&self, input: &str, wait: bool) -> Result<()> {
        let api = self.api()?;
        self.bootstrap(&api).await?;

        let progress = submit_spinner();
        let (job_id, title) = if utils::is_local_file(input) {
            let path = Path::new(input);
            utils::check_upload_file(path)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.to_string());
            let bytes = fs_err::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            progress.set_message(format!("Uploading {}...", path.display()));
            let submission = api
                .upload_audio(&file_name, bytes)
                .await
                .map_err(|err| self.on_api_error(err))?;
            (submission.job_id, file_name)
        } else {
            let url = utils::validate_and_normalize_url(input)?;
            progress.set_message("Submitting YouTube URL...");
            let submission = api
                .process_youtube(&url)
                .await
                .map_err(|err| self.on_api_error(err))?;
            (submission.job_id, submission.youtube_title)
        };
        progress.finish_with_message(format!("Job registered: {}", title));

        self.tracker.register(NewJob {
            job_id: job_id.clone(),
            kind: JobKind::Transcription,
            title,
        });
        self.persist_queue();

        if wait {
            self.wait_for_job(&api, &job_id).await?;
        } else {
            println!("Run `scribeflow queue` to watch progress.");
        }
        Ok(())
    }

    /// Poll the queue until the given job reaches a terminal status, then
    /// print its transcript if it completed.
    async fn wait_for_job(&self, api: &ApiClient, job_id: &str) -> Result<()> {
        let progress = submit_spinner();
        progress.set_message("Transcribing...");

        let mut poller = Poller::new(
            self.tracker.clone(),
            Arc::new(api.clone()),
            Duration::from_secs(self.config.poll.interval_secs),
            self.config.poll.max_attempts,
        );
        let mut timer = tokio::time::interval(Duration::from_secs(self.config.poll.interval_secs));
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let job = loop {
            timer.tick().await;
            poller.tick().await.map_err(|err| {
                progress.finish_and_clear();
                self.escalate(err)
            })?;
            self.persist_queue();
            let job = self
                .tracker
                .get(job_id)
                .context("Job vanished from the tracker")?;
            if job.status.is_terminal() {
                break job;
            }
            progress.set_message(format!("Transcribing... ({})", job.status.as_str()));
        };

        match job.status {
            JobStatus::Completed => {
                progress.finish_with_message("Transcription completed!");
                let status = api
                    .job_status(job_id)
                    .await
                    .map_err(|err| self.on_api_error(err))?;
                if let Some(transcript) = status.transcript {
                    println!("{}", transcript);
                }
            }
            _ => {
                progress.finish_with_message("Transcription failed");
                anyhow::bail!("Job {} failed", job_id);
            }
        }
        Ok(())
    }

    /// Generate an article from a past transcription. The job id is
    /// client-assigned; the call itself is synchronous, so the job goes
    /// pending -> processing -> completed/failed within this invocation.
    pub async fn generate(&self, options: GenerateOptions) -> Result<()> {
        let api = self.api()?;
        self.bootstrap(&api).await?;

        let past = history::fetch_history(&api).await?;
        let record = history::select_transcription(&past, options.transcription_id)?;
        let title = history::transcription_title(record);

        let job_id = Uuid::new_v4().to_string();
        self.tracker.register(NewJob {
            job_id: job_id.clone(),
            kind: JobKind::ContentGeneration,
            title: format!("Content: {}", title),
        });
        self.persist_queue();

        let request = self.build_generate_request(&job_id, record.id, &record.transcript, &options);

        let progress = submit_spinner();
        progress.set_message(format!("Generating article from \"{}\"...", title));
        self.tracker.apply_status(&job_id, JobStatus::Processing);
        self.persist_queue();

        match api.generate(&request).await {
            Ok(generated) => {
                self.tracker.apply_status(&job_id, JobStatus::Completed);
                self.persist_queue();
                progress.finish_with_message(format!(
                    "Article generated (content id {})",
                    generated.content_id
                ));
                output::write_article(&generated.article, options.output.as_deref())?;
                Ok(())
            }
            Err(err) => {
                self.tracker.apply_status(&job_id, JobStatus::Failed);
                self.persist_queue();
                progress.finish_with_message("Generation failed");
                Err(self.on_api_error(err)).context("Article generation failed")
            }
        }
    }

    fn build_generate_request(
        &self,
        job_id: &str,
        transcription_id: i64,
        transcript: &str,
        options: &GenerateOptions,
    ) -> GenerateRequest {
        let gen = &self.config.generation;
        let language_style = options.style.clone().unwrap_or_else(|| gen.language_style.clone());
        let output_format = options.format.clone().unwrap_or_else(|| gen.output_format.clone());
        let extra_notes = options.notes.clone().unwrap_or_else(|| gen.extra_notes.clone());

        // The backend persists this map verbatim alongside the record; keys
        // follow its historical vocabulary.
        let mut config = HashMap::new();
        config.insert("Gaya Bahasa".to_string(), language_style.clone());
        config.insert("Kepadatan Informasi".to_string(), gen.information_density.clone());
        config.insert("Sentimen Terhadap Objek Berita".to_string(), gen.sentiment.clone());
        config.insert("Gaya Penyampaian".to_string(), gen.delivery_style.clone());
        config.insert("Format Output".to_string(), output_format.clone());
        config.insert("Gaya Kutipan".to_string(), gen.quotation_style.clone());
        config.insert("Pilihan Bahasa & Dialek".to_string(), gen.language_variant.clone());
        config.insert("Penyuntingan Otomatis".to_string(), gen.editing_mode.clone());
        config.insert("Catatan Tambahan".to_string(), extra_notes.clone());

        GenerateRequest {
            job_id: job_id.to_string(),
            transcription_id,
            transcription: transcript.to_string(),
            gaya_bahasa: language_style,
            kepadatan_informasi: gen.information_density.clone(),
            sentimen: gen.sentiment.clone(),
            gaya_penyampaian: gen.delivery_style.clone(),
            format_output: output_format,
            gaya_kutipan: gen.quotation_style.clone(),
            bahasa: gen.language_variant.clone(),
            penyuntingan: gen.editing_mode.clone(),
            catatan_tambahan: extra_notes,
            config,
        }
    }

    /// Show the queue and poll it. Without `--watch` the command returns
    /// once every tracked job is terminal; with it, the loop keeps running
    /// and picks up newly submitted jobs from the backend listing.
    pub async fn queue(&self, watch: bool) -> Result<()> {
        let api = self.api()?;
        self.bootstrap(&api).await?;

        if self.tracker.is_empty() && !watch {
            println!("No ongoing jobs.");
            return Ok(());
        }
        output::print_queue(&self.tracker.snapshot());

        let mut poller = Poller::new(
            self.tracker.clone(),
            Arc::new(api.clone()),
            Duration::from_secs(self.config.poll.interval_secs),
            self.config.poll.max_attempts,
        );

        if watch {
            let progress = submit_spinner();
            let mut timer =
                tokio::time::interval(Duration::from_secs(self.config.poll.interval_secs));
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = timer.tick() => {}
                    _ = tokio::signal::ctrl_c() => break,
                }
                // Pick up jobs submitted elsewhere since the last tick.
                if let Ok(listing) = api.ongoing_jobs().await {
                    for entry in listing {
                        self.tracker.restore(entry.into_job());
                    }
                }
                poller.tick().await.map_err(|err| {
                    progress.finish_and_clear();
                    self.escalate(err)
                })?;
                self.persist_queue();
                let active = self.tracker.active_ids().len();
                progress.set_message(format!(
                    "Watching queue ({} active, {} tracked)",
                    active,
                    self.tracker.len()
                ));
            }
            progress.finish_and_clear();
        } else if !self.tracker.is_idle() {
            let progress = submit_spinner();
            let cache = &self.cache;
            let tracked = self.tracker.len();
            let result = poller
                .run_until_idle(|tracker| {
                    if let Err(err) = cache.save(&tracker.snapshot()) {
                        tracing::warn!(error = %err, "could not persist queue cache");
                    }
                    let active = tracker.active_ids().len();
                    progress.set_message(format!(
                        "Polling queue ({} active of {})",
                        active, tracked
                    ));
                })
                .await;
            progress.finish_and_clear();
            result.map_err(|err| self.escalate(err))?;
        }

        let jobs = self.tracker.snapshot();
        output::print_queue(&jobs);
        output::print_queue_summary(&jobs);
        Ok(())
    }

    pub async fn history(&self) -> Result<()> {
        let api = self.api()?;
        let past = history::fetch_history(&api)
            .await
            .map_err(|err| self.escalate(err))?;
        output::print_history(&past);
        Ok(())
    }
}

fn submit_spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}
