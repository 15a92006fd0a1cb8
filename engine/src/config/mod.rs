//! Configuration management
//!
//! This module handles loading, validation, and management of the LectureBot
//! configuration. Configuration is stored in TOML format at
//! ~/.lecturebot/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Data directory, log level
//! - **storage**: Blob directory
//! - **bot**: Transport token, greeting, command prefix, accepted media kind
//!
//! # Path Expansion
//!
//! The configuration system expands ~ to the user's home directory and
//! creates the data and blob directories if they don't exist.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use sdk::errors::BotError;

/// Main configuration structure
///
/// Loaded from ~/.lecturebot/config.toml. Every field has a default, so an
/// empty file is a valid configuration apart from the bot token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Blob storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Bot behavior and transport settings
    #[serde(default)]
    pub bot: BotConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Data directory (supports ~ expansion); holds the SQLite database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory raw document bytes are written under (supports ~ expansion)
    #[serde(default = "default_blob_dir")]
    pub blob_dir: PathBuf,
}

/// Bot behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Transport bot token (Telegram); empty disables the bot loop
    #[serde(default)]
    pub token: String,

    /// Greeting token that triggers the welcome reply
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Command prefix that marks a search query
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// The only media kind accepted for ingestion
    #[serde(default = "default_accepted_mime")]
    pub accepted_mime: String,

    /// Long-poll timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.lecturebot")
}

fn default_blob_dir() -> PathBuf {
    PathBuf::from("~/.lecturebot/blobs")
}

fn default_greeting() -> String {
    "hello".to_string()
}

fn default_command_prefix() -> String {
    "send ".to_string()
}

fn default_accepted_mime() -> String {
    "application/pdf".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_dir: default_blob_dir(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            greeting: default_greeting(),
            command_prefix: default_command_prefix(),
            accepted_mime: default_accepted_mime(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            storage: StorageConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.lecturebot/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default one.
    /// Validates the configuration after loading and returns descriptive
    /// errors if validation fails.
    pub fn load_or_create() -> Result<Self, BotError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, BotError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| BotError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| BotError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, BotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BotError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| BotError::Config(format!("Failed to serialize config: {}", e)))?;

        let contents = format!(
            "# LectureBot configuration\n\
             # Set bot.token to your transport bot token to enable the bot loop.\n\n{}",
            toml_string
        );

        fs::write(path, contents)
            .map_err(|e| BotError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.lecturebot/config.toml)
    fn default_config_path() -> Result<PathBuf, BotError> {
        let home = dirs::home_dir()
            .ok_or_else(|| BotError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".lecturebot").join("config.toml"))
    }

    /// Path of the SQLite metadata database
    pub fn db_path(&self) -> PathBuf {
        self.core.data_dir.join("lecturebot.db")
    }

    /// Validate fields and expand paths
    fn validate_and_process(&mut self) -> Result<(), BotError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(BotError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.bot.command_prefix.trim().is_empty() {
            return Err(BotError::Config(
                "command_prefix must not be blank".to_string(),
            ));
        }

        if self.bot.greeting.trim().is_empty() {
            return Err(BotError::Config("greeting must not be blank".to_string()));
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;
        self.storage.blob_dir = expand_path(&self.storage.blob_dir)?;

        Ok(())
    }
}

/// Expand a leading ~ to the user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, BotError> {
    let path_str = path.to_str().ok_or_else(|| {
        BotError::Config(format!("Path is not valid UTF-8: {:?}", path))
    })?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| BotError::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(rest))
    } else {
        Ok(path.to_path_buf())
    }
}
