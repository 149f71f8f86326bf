use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::jobs::poller::StatusSource;
use crate::jobs::{JobKind, JobStatus};

/// Errors at the HTTP seam. Everything above this layer works with
/// `anyhow::Result` and only downcasts to check for `Unauthorized`.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Not authenticated (backend returned 401)")]
    Unauthorized,

    #[error("Backend returned HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Client-side failure to build the request URL; the backend was
    /// never contacted.
    #[error("Invalid endpoint path: {0}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[allow(dead_code)]
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeSubmission {
    pub job_id: String,
    pub youtube_title: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadSubmission {
    pub job_id: String,
}

/// Stylistic configuration for article generation, mirrored from the
/// backend's request schema.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub job_id: String,
    pub transcription_id: i64,
    pub transcription: String,
    pub gaya_bahasa: String,
    pub kepadatan_informasi: String,
    pub sentimen: String,
    pub gaya_penyampaian: String,
    pub format_output: String,
    pub gaya_kutipan: String,
    pub bahasa: String,
    pub penyuntingan: String,
    pub catatan_tambahan: String,
    pub config: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedArticle {
    pub article: String,
    pub content_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub transcript: Option<String>,
}

/// One entry from `GET /jobs/ongoing/`.
#[derive(Debug, Deserialize)]
pub struct OngoingJob {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<JobKind>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionRecord {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub source: String,
    #[serde(default)]
    pub video_url: Option<String>,
    pub transcript: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentRecord {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub transcription_history_id: i64,
    #[serde(default)]
    pub transcription_title: Option<String>,
    pub generated_content: String,
    pub created_at: DateTime<Utc>,
}

/// HTTP client for the transcription backend.
///
/// The bearer token is applied uniformly to every authenticated call; 401
/// responses surface as [`ApiError::Unauthorized`] so the command layer can
/// drop the stored credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(&config.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.api.base_url))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|_| ApiError::InvalidEndpoint(path.to_string()))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, message });
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("/auth/login")?;
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(self.http.post(url).json(&body)).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let url = self.endpoint("/auth/me")?;
        self.send(self.request(Method::GET, url)).await
    }

    pub async fn process_youtube(&self, youtube_url: &str) -> Result<YoutubeSubmission, ApiError> {
        let url = self.endpoint("/youtube/process-youtube/")?;
        let body = serde_json::json!({ "youtube_url": youtube_url });
        self.send(self.request(Method::POST, url).json(&body)).await
    }

    /// Upload media bytes for transcription. The caller reads the file; this
    /// layer only speaks HTTP.
    pub async fn upload_audio(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadSubmission, ApiError> {
        let url = self.endpoint("/upload/upload-audio/")?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        self.send(self.request(Method::POST, url).multipart(form))
            .await
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedArticle, ApiError> {
        let url = self.endpoint("/generate/")?;
        self.send(self.request(Method::POST, url).json(request))
            .await
    }

    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        let url = self.endpoint(&format!("/jobs/{}/status", job_id))?;
        self.send(self.request(Method::GET, url)).await
    }

    pub async fn ongoing_jobs(&self) -> Result<Vec<OngoingJob>, ApiError> {
        let url = self.endpoint("/jobs/ongoing/")?;
        self.send(self.request(Method::GET, url)).await
    }

    pub async fn history(&self) -> Result<Vec<TranscriptionRecord>, ApiError> {
        let url = self.endpoint("/history/")?;
        self.send(self.request(Method::GET, url)).await
    }

    pub async fn content_history(&self) -> Result<Vec<ContentRecord>, ApiError> {
        let url = self.endpoint("/content-history/")?;
        self.send(self.request(Method::GET, url)).await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatus> {
        let response = self.job_status(job_id).await?;
        Ok(response.status)
    }
}

impl OngoingJob {
    /// Convert a backend listing entry into a tracked job. Missing fields
    /// get display fallbacks; the listing never includes completed jobs so
    /// `completed_at` starts unset.
    pub fn into_job(self) -> crate::jobs::Job {
        crate::jobs::Job {
            title: self
                .title
                .unwrap_or_else(|| format!("Job {}", &self.job_id)),
            status: self.status,
            kind: self.kind.unwrap_or(JobKind::Transcription),
            created_at: self.created_at.unwrap_or_else(Utc::now),
            completed_at: None,
            job_id: self.job_id,
        }
    }
}
