//! Scribeflow - A Rust CLI client for a transcription and content-generation backend
//!
//! This library provides the pieces behind the `scribeflow` binary: an HTTP
//! client for the backend's REST API, a tracker for in-flight transcription
//! and content-generation jobs, the polling scheduler that reconciles job
//! statuses, and the session/cache plumbing that keeps tracked state tied to
//! the authenticated session.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod history;
pub mod jobs;
pub mod output;
pub mod session;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use jobs::{Job, JobKind, JobStatus, JobTracker};
pub use session::Session;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
