use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Bot credentials for session-end notifications.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: Option<TelegramConfig>,
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub project: Option<String>,
    pub progress_dir: PathBuf,
    pub workers: Option<usize>,
    pub log_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        let workers = get("HARVEST_WORKERS")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("HARVEST_WORKERS must be a positive number")?;

        Ok(Self {
            telegram,
            input: get("HARVEST_INPUT").map(PathBuf::from),
            output_dir: get("HARVEST_OUTPUT_DIR").map(PathBuf::from),
            project: get("PROJECT_NAME"),
            progress_dir: get("HARVEST_PROGRESS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            workers,
            log_file: get("HARVEST_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("harvest.log")),
        })
    }
}
