use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    pub api: ApiConfig,

    /// Job polling settings
    pub poll: PollConfig,

    /// Defaults for article generation
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the transcription backend
    pub base_url: String,

    /// Timeout applied to every request, in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between polling ticks
    pub interval_secs: u64,

    /// Consecutive status-fetch failures tolerated before a job is marked failed
    pub max_attempts: u32,
}

/// Stylistic defaults sent with `generate` requests. Field values follow the
/// backend's expected vocabulary; any of them can be overridden per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub language_style: String,
    pub information_density: String,
    pub sentiment: String,
    pub delivery_style: String,
    pub output_format: String,
    pub quotation_style: String,
    pub language_variant: String,
    pub editing_mode: String,
    pub extra_notes: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://127.0.0.1:3000".to_string(),
                request_timeout_secs: 10,
            },
            poll: PollConfig {
                interval_secs: 5,
                max_attempts: 2,
            },
            generation: GenerationConfig {
                language_style: "Formal".to_string(),
                information_density: "Ringkas".to_string(),
                sentiment: "Netral".to_string(),
                delivery_style: "Langsung".to_string(),
                output_format: "Artikel".to_string(),
                quotation_style: "Langsung".to_string(),
                language_variant: "Baku".to_string(),
                editing_mode: "Tanpa Sensor".to_string(),
                extra_notes: String::new(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("scribeflow").join("config.yaml"))
    }

    /// Directory for mutable client state (token, queue cache)
    fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .context("Could not determine data directory")?;
        Ok(data_dir.join("scribeflow"))
    }

    pub fn token_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("token"))
    }

    pub fn queue_cache_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("queue.json"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("API base URL must be configured");
        }
        if self.poll.interval_secs == 0 {
            anyhow::bail!("Poll interval must be at least one second");
        }
        if self.poll.max_attempts == 0 {
            anyhow::bail!("Poll max attempts must be at least one");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Backend URL: {}", self.api.base_url);
        println!("  Request Timeout: {}s", self.api.request_timeout_secs);
        println!("  Poll Interval: {}s", self.poll.interval_secs);
        println!("  Poll Max Attempts: {}", self.poll.max_attempts);
        println!("  Output Format: {}", self.generation.output_format);
        println!("  Language Style: {}", self.generation.language_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll.interval_secs, 5);
        assert_eq!(config.poll.max_attempts, 2);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = Config::default();
        config.poll.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.api.base_url, config.api.base_url);
        assert_eq!(parsed.generation.output_format, "Artikel");
    }
}
