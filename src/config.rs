//! Configuration and settings management
//!
//! Loads settings from config files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory scanned for documents when `FILES_DIR` is not set
pub const DEFAULT_FILES_DIR: &str = "files";
/// Extension accepted by the catalog when `FILE_EXTENSION` is not set
pub const DEFAULT_FILE_EXTENSION: &str = "pdf";

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    #[serde(alias = "telegram_token")]
    pub telegram_bot_token: String,

    /// Directory holding the documents offered to users
    #[serde(default = "default_files_dir")]
    pub files_dir: PathBuf,

    /// Accepted document extension, with or without the leading dot
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

fn default_files_dir() -> PathBuf {
    PathBuf::from(DEFAULT_FILES_DIR)
}

fn default_file_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use resource_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the bot token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            // Eg.. `APP__FILES_DIR=/srv/pdf ./target/resource-bot`
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Plain UPPER_SNAKE_CASE variables; empty values count as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let settings: Self = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_bot_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "TELEGRAM_BOT_TOKEN not found in environment variables".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the accepted extension normalized to a lowercase `.ext` suffix
    #[must_use]
    pub fn extension_suffix(&self) -> String {
        format!(
            ".{}",
            self.file_extension.trim().trim_start_matches('.').to_lowercase()
        )
    }
}
