use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scribeflow",
    about = "Scribeflow - Transcribe media and generate articles through a transcription backend",
    version,
    long_about = "A CLI client for an audio/video transcription and content-generation service. \
Submit YouTube links or local media files for transcription, generate AI articles from past \
transcripts, and watch the processing queue until jobs finish."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the access token
    Login {
        /// Account email
        #[arg(value_name = "EMAIL")]
        email: String,

        /// Account password (or set SCRIBEFLOW_PASSWORD)
        #[arg(short, long, env = "SCRIBEFLOW_PASSWORD")]
        password: String,
    },

    /// Log out, clearing the token and the tracked queue
    Logout,

    /// Show the currently authenticated user
    Whoami,

    /// Submit a YouTube URL or local media file for transcription
    Transcribe {
        /// YouTube URL or path to a local audio/video file
        #[arg(value_name = "URL_OR_FILE")]
        input: String,

        /// Poll until this job finishes and print the transcript
        #[arg(short, long)]
        wait: bool,
    },

    /// Generate an article from a past transcription
    Generate {
        /// Transcription id from `history` (defaults to the most recent)
        #[arg(short, long, value_name = "ID")]
        transcription: Option<i64>,

        /// Write the generated HTML to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Override the configured output format (e.g. Artikel, Blog)
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,

        /// Override the configured language style
        #[arg(long, value_name = "STYLE")]
        style: Option<String>,

        /// Extra instructions passed to the generator
        #[arg(long, value_name = "NOTES")]
        notes: Option<String>,
    },

    /// Show the processing queue and poll it until every job finishes
    Queue {
        /// Keep polling even after the queue drains
        #[arg(short, long)]
        watch: bool,
    },

    /// List past transcriptions and generated content
    History,

    /// Show or reset client configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
