use anyhow::{anyhow, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles loading, validating and saving the settings of the
/// batch jobs: where the store lives, where source files are read from,
/// batch sizing and the translation service contract.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Store connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Word list import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Local gloss extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Remote translation settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Optional file receiving a copy of every log line
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Store backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    // @backend: MySQL-compatible server
    #[default]
    MySql,
    // @backend: Local SQLite file
    Sqlite,
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => write!(f, "mysql"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for DatabaseBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(anyhow!("Invalid database backend: {}", s)),
        }
    }
}

/// Store connection settings
#[derive(Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Database (schema) name
    #[serde(default = "default_db_name")]
    pub database: String,

    #[serde(default = "default_db_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_db_charset")]
    pub charset: String,

    /// Seconds to wait for the server before giving up
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// SQLite file; the user data directory is used when unset
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            host: default_db_host(),
            port: default_db_port(),
            database: default_db_name(),
            username: default_db_username(),
            password: String::new(),
            charset: default_db_charset(),
            connect_timeout_secs: default_connect_timeout_secs(),
            sqlite_path: None,
        }
    }
}

// Keeps the password out of debug logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("charset", &self.charset)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("sqlite_path", &self.sqlite_path)
            .finish()
    }
}

/// Word list import settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImportConfig {
    /// Directory holding the `<language>-<category>.json` files
    #[serde(default = "default_words_dir")]
    pub words_dir: PathBuf,

    /// Category used when a filename has no category part
    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            words_dir: default_words_dir(),
            default_category: default_category(),
        }
    }
}

/// Local gloss extraction settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractConfig {
    /// Words fetched per round trip
    #[serde(default = "default_extract_batch_size")]
    pub batch_size: usize,

    /// Log progress every N processed words
    #[serde(default = "default_extract_progress_interval")]
    pub progress_interval: usize,

    /// Use part-of-speech segmentation when the build supports it
    #[serde(default = "default_true")]
    pub segmentation: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            batch_size: default_extract_batch_size(),
            progress_interval: default_extract_progress_interval(),
            segmentation: true,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// GET endpoint of the translation service
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,

    /// Language every word is translated into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause after every call, in milliseconds
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,

    /// Pause between batches, in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Words fetched per round trip
    #[serde(default = "default_translation_batch_size")]
    pub batch_size: usize,

    /// Log progress every N processed words
    #[serde(default = "default_translation_progress_interval")]
    pub progress_interval: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translation_endpoint(),
            target_language: default_target_language(),
            timeout_secs: default_timeout_secs(),
            call_delay_ms: default_call_delay_ms(),
            batch_delay_ms: default_batch_delay_ms(),
            batch_size: default_translation_batch_size(),
            progress_interval: default_translation_progress_interval(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_db_name() -> String {
    "typing".to_string()
}

fn default_db_username() -> String {
    "root".to_string()
}

fn default_db_charset() -> String {
    "utf8mb4".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_words_dir() -> PathBuf {
    PathBuf::from("words")
}

fn default_category() -> String {
    crate::file_utils::DEFAULT_CATEGORY.to_string()
}

fn default_extract_batch_size() -> usize {
    200
}

fn default_extract_progress_interval() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_translation_endpoint() -> String {
    "https://api.mymemory.translated.net/get".to_string()
}

fn default_target_language() -> String {
    "zh-CN".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_call_delay_ms() -> u64 {
    100
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_translation_batch_size() -> usize {
    50
}

fn default_translation_progress_interval() -> usize {
    10
}

impl Config {
    /// Load the configuration file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        info!("Created default configuration at {:?}", path);

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.database.backend == DatabaseBackend::MySql {
            if self.database.host.trim().is_empty() {
                return Err(anyhow!("Database host must not be empty"));
            }
            if self.database.port == 0 {
                return Err(anyhow!("Database port must not be 0"));
            }
            if self.database.database.trim().is_empty() {
                return Err(anyhow!("Database name must not be empty"));
            }
        }

        if self.import.default_category.trim().is_empty() {
            return Err(anyhow!("Default category must not be empty"));
        }

        if self.extract.batch_size == 0 || self.translation.batch_size == 0 {
            return Err(anyhow!("Batch sizes must be greater than 0"));
        }

        if self.extract.progress_interval == 0 || self.translation.progress_interval == 0 {
            return Err(anyhow!("Progress intervals must be greater than 0"));
        }

        url::Url::parse(&self.translation.endpoint).with_context(|| {
            format!("Invalid translation endpoint: {}", self.translation.endpoint)
        })?;

        if self.translation.target_language.trim().is_empty() {
            return Err(anyhow!("Translation target language must not be empty"));
        }

        Ok(())
    }
}
