use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use chrono_tz::Tz;
use thiserror::Error;
use url::Url;

use crate::classifier::{LexiconTable, TemplateSet};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub transport: TransportConfig,
    pub triage: TriageConfig,
    pub classifier: ClassifierConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub timezone: Tz,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub endpoint: Url,
    pub token: Option<String>,
    pub timeout: Duration,
    pub messages_per_chat: usize,
}

#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub room_query: String,
    pub chat_limit: usize,
    pub unread_only: bool,
    pub seen_capacity: usize,
}

/// Everything the scoring pipeline needs, built once and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    pub lexicon: LexiconTable,
    pub templates: TemplateSet,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub state_path: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Line format shared by the console and the daily log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?} (expected text or json)")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("invalid JSON in {key}: {source}")]
    InvalidJson {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid reply pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl DirectoryConfig {
    pub fn state_file(&self) -> PathBuf {
        PathBuf::from(&self.state_path)
    }
}
