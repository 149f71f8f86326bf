use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod commands;
mod config;
mod history;
mod jobs;
mod output;
mod session;
mod utils;

use cli::{Cli, Commands};
use commands::{App, GenerateOptions};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "scribeflow=debug"
    } else {
        "scribeflow=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Login { email, password } => {
            let app = App::new(config)?;
            app.login(&email, &password).await?;
        }
        Commands::Logout => {
            let app = App::new(config)?;
            app.logout()?;
        }
        Commands::Whoami => {
            let app = App::new(config)?;
            app.whoami().await?;
        }
        Commands::Transcribe { input, wait } => {
            let app = App::new(config)?;
            app.transcribe(&input, wait).await?;
        }
        Commands::Generate {
            transcription,
            output,
            format,
            style,
            notes,
        } => {
            let app = App::new(config)?;
            app.generate(GenerateOptions {
                transcription_id: transcription,
                output,
                format,
                style,
                notes,
            })
            .await?;
        }
        Commands::Queue { watch } => {
            let app = App::new(config)?;
            app.queue(watch).await?;
        }
        Commands::History => {
            let app = App::new(config)?;
            app.history().await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Config file: {}", Config::config_path()?.display());
                println!("Edit it to change settings, or run `scribeflow config --show` to view current values.");
            }
        }
    }

    Ok(())
}
