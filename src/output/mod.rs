use anyhow::Result;
use chrono::Utc;
use console::style;
use std::path::Path;

use crate::api::{ContentRecord, TranscriptionRecord};
use crate::history::{transcription_title, History};
use crate::jobs::{Job, JobStatus};
use crate::utils::format_duration;

/// Render the tracked queue, newest-first, one line per job.
pub fn print_queue(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("No ongoing jobs.");
        return;
    }

    println!("{}", style("Ongoing Jobs").bold());
    for job in jobs {
        let status = match job.status {
            JobStatus::Pending => style("pending").yellow(),
            JobStatus::Processing => style("processing").cyan(),
            JobStatus::Completed => style("completed").green(),
            JobStatus::Failed => style("failed").red(),
        };
        let elapsed = match job.completed_at {
            Some(done) => format_duration((done - job.created_at).num_seconds().max(0) as f64),
            None => format_duration((Utc::now() - job.created_at).num_seconds().max(0) as f64),
        };
        println!(
            "  [{}] {} ({}, {})",
            status,
            job.title,
            job.kind.as_str(),
            elapsed
        );
    }
}

/// One-line summary printed when the queue drains.
pub fn print_queue_summary(jobs: &[Job]) {
    let completed = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Completed)
        .count();
    let failed = jobs.iter().filter(|j| j.status == JobStatus::Failed).count();
    println!(
        "{} {} completed, {} failed",
        style("Done:").bold(),
        completed,
        failed
    );
}

pub fn print_history(history: &History) {
    print_transcriptions(&history.transcriptions);
    println!();
    print_contents(&history.contents);
}

fn print_transcriptions(records: &[TranscriptionRecord]) {
    println!("{}", style("Transcriptions").bold());
    if records.is_empty() {
        println!("  (none)");
        return;
    }
    for record in records {
        println!(
            "  #{:<4} {} [{}] {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.source,
            transcription_title(record)
        );
    }
}

fn print_contents(records: &[ContentRecord]) {
    println!("{}", style("Generated Content").bold());
    if records.is_empty() {
        println!("  (none)");
        return;
    }
    for record in records {
        let title = record
            .title
            .clone()
            .or_else(|| record.transcription_title.clone())
            .unwrap_or_else(|| "Untitled".to_string());
        println!(
            "  #{:<4} {} {} (from transcription #{})",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            title,
            record.transcription_history_id
        );
    }
}

/// Write a generated article to a file, or print the raw HTML.
pub fn write_article(article: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs_err::write(path, article)?;
            println!("Article saved to: {}", path.display());
        }
        None => println!("{}", article),
    }
    Ok(())
}
