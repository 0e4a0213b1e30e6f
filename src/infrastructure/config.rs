//! Configuration infrastructure
//!
//! JSON configuration file with first-run defaults, stored in the user
//! config directory. Settings are grouped by the process that consumes
//! them: the crawler (id range, pacing, session), the bot (polling) and the
//! shared store/logging plumbing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub crawling: CrawlingConfig,
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, shared by both processes
    pub path: String,
}

/// Crawler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlingConfig {
    pub base_url: String,

    /// First card id of the crawl pass
    pub start_id: i64,

    /// Last card id of the crawl pass, inclusive
    pub end_id: i64,

    /// Fixed delay after every card, success or failure
    pub request_delay_ms: u64,

    pub request_timeout_seconds: u64,

    pub max_retries: u32,

    pub user_agent: String,

    /// Characters of the page title occupied by the site-wide prefix
    pub title_prefix_chars: usize,

    /// Browser-exported cookie cache written by the login tooling
    pub cookies_file: String,

    /// Session cookies the crawl cannot run without
    pub required_cookies: Vec<String>,
}

/// Query bot settings. The bot token is read from the environment, not the
/// config file, so the file can be checked into dotfiles safely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Environment variable holding the bot token
    pub token_env: String,

    /// Long-poll timeout for getUpdates
    pub poll_timeout_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the logs directory
    pub file_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "cards.db".to_string(),
        }
    }
}

impl Default for CrawlingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mangabuff.ru".to_string(),
            start_id: 1,
            end_id: 280_921,
            request_delay_ms: 1000,
            request_timeout_seconds: 30,
            max_retries: 3,
            user_agent: "cardbuff/0.2 (card catalog research)".to_string(),
            title_prefix_chars: 22,
            cookies_file: "cookies.json".to_string(),
            required_cookies: vec![
                "mangabuff_session".to_string(),
                "XSRF-TOKEN".to_string(),
            ],
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_env: "TG_TOKEN".to_string(),
            poll_timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: true,
            file_name: "cardbuff.log".to_string(),
        }
    }
}

impl AppConfig {
    /// sqlx connection string for the configured database file
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database.path)
    }
}

/// Loads and persists the configuration file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("cardbuff");

        Ok(config_dir)
    }

    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join("cardbuff_config.json");
        Ok(Self { config_path })
    }

    /// Manager bound to an explicit file path (tests, ad-hoc runs)
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Load the configuration, writing defaults on the first run
    pub async fn initialize_on_first_run(&self) -> Result<AppConfig> {
        let config_dir = self
            .config_path
            .parent()
            .context("Failed to get config directory")?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)
                .await
                .context("Failed to create config directory")?;
        }

        if self.config_path.exists() {
            self.load_config().await
        } else {
            info!(
                "First run detected - writing default configuration to {}",
                self.config_path.display()
            );
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            Ok(default_config)
        }
    }

    pub async fn load_config(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read config {}", self.config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", self.config_path.display()))?;
        Ok(config)
    }

    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        let raw = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, raw)
            .await
            .with_context(|| format!("Failed to write config {}", self.config_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_first_run_writes_defaults_and_reloads() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("cfg/cardbuff_config.json"));

        let first = manager.initialize_on_first_run().await.unwrap();
        assert_eq!(first.crawling.base_url, "https://mangabuff.ru");
        assert_eq!(first.crawling.request_delay_ms, 1000);

        let reloaded = manager.initialize_on_first_run().await.unwrap();
        assert_eq!(reloaded.crawling.end_id, first.crawling.end_id);
        assert_eq!(reloaded.telegram.token_env, "TG_TOKEN");
    }

    #[tokio::test]
    async fn test_saved_changes_survive_reload() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("cardbuff_config.json"));

        let mut config = manager.initialize_on_first_run().await.unwrap();
        config.crawling.start_id = 877;
        config.crawling.end_id = 1000;
        manager.save_config(&config).await.unwrap();

        let reloaded = manager.load_config().await.unwrap();
        assert_eq!(reloaded.crawling.start_id, 877);
        assert_eq!(reloaded.crawling.end_id, 1000);
    }

    #[test]
    fn test_database_url() {
        let config = AppConfig::default();
        assert_eq!(config.database_url(), "sqlite:cards.db");
    }
}
