use std::{env, str::FromStr, time::Duration};

use chrono_tz::Tz;
use url::Url;

use crate::classifier::{LexiconTable, TemplateSet};

use super::env::{
    AppConfig, ClassifierConfig, ConfigError, DirectoryConfig, LogFormat, LoggingConfig,
    TransportConfig, TriageConfig,
};

const DEFAULT_ENDPOINT: &str = "http://localhost:23373/v0/mcp";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint_raw =
            env::var("BEEPER_MCP_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(&endpoint_raw).map_err(|err| ConfigError::InvalidValue {
            key: "BEEPER_MCP_URL",
            message: err.to_string(),
        })?;

        let transport = TransportConfig {
            endpoint,
            token: env::var("BEEPER_TOKEN").ok().filter(|v| !v.is_empty()),
            timeout: Duration::from_secs(parse_or("TRANSPORT_TIMEOUT_SECS", 30)?),
            messages_per_chat: parse_or("MESSAGES_PER_CHAT", 5)?,
        };

        let triage = TriageConfig {
            room_query: env::var("LINKEDIN_ROOM_PATTERN").unwrap_or_else(|_| "linkedin".to_string()),
            chat_limit: parse_or("CHAT_SEARCH_LIMIT", 20)?,
            unread_only: parse_or("UNREAD_ONLY", true)?,
            seen_capacity: parse_or("SEEN_CAPACITY", 1000)?,
        };
        if triage.seen_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SEEN_CAPACITY",
                message: "must be greater than zero".to_string(),
            });
        }

        let classifier = ClassifierConfig {
            lexicon: match env::var("LEXICON_OVERRIDES") {
                Ok(raw) if !raw.trim().is_empty() => parse_lexicon(&raw)?,
                _ => LexiconTable::default(),
            },
            templates: match env::var("RESPONSE_TEMPLATES") {
                Ok(raw) if !raw.trim().is_empty() => parse_templates(&raw)?,
                _ => TemplateSet::default(),
            },
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            state_path: env::var("LINKEDIN_STATE")
                .unwrap_or_else(|_| "data/linkedin-state.json".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: parse_or("LOG_FORMAT", LogFormat::Text)?,
        };

        let timezone = parse_timezone(
            &env::var("DISPLAY_TIMEZONE").unwrap_or_else(|_| "Europe/Paris".to_string()),
        )?;

        Ok(Self {
            transport,
            triage,
            classifier,
            directories,
            logging,
            timezone,
        })
    }
}

/// Partial override: classes present in the JSON replace the built-in lists.
pub fn parse_lexicon(raw: &str) -> Result<LexiconTable, ConfigError> {
    serde_json::from_str(raw).map_err(|source| ConfigError::InvalidJson {
        key: "LEXICON_OVERRIDES",
        source,
    })
}

/// Wholesale override: the JSON object becomes the entire template map.
pub fn parse_templates(raw: &str) -> Result<TemplateSet, ConfigError> {
    serde_json::from_str(raw).map_err(|source| ConfigError::InvalidJson {
        key: "RESPONSE_TEMPLATES",
        source,
    })
}

fn parse_timezone(raw: &str) -> Result<Tz, ConfigError> {
    raw.parse::<Tz>().map_err(|err| ConfigError::InvalidValue {
        key: "DISPLAY_TIMEZONE",
        message: err.to_string(),
    })
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|err| ConfigError::InvalidValue {
                    key,
                    message: err.to_string(),
                })
        }
        _ => Ok(default),
    }
}
