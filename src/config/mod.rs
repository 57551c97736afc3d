//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults.
//! `Config::from_env` validates numeric values so a bad deployment fails at
//! startup instead of on the first request.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::fetcher::types::{MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};

/// Environment variable names. Public so tests and tooling can refer to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_USER_AGENT: &str = "DEFAULT_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "DEFAULT_TIMEOUT_SECS";
pub const ENV_RESULT_TTL_SECS: &str = "RESULT_TTL_SECS";
pub const ENV_HISTORY_LIMIT: &str = "HISTORY_LIMIT";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Default development values used when environment variables are absent.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Harvest/0.1)";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RESULT_TTL_SECS: i64 = 900;
const MAX_RESULT_TTL_SECS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    user_agent: String,
    timeout_secs: u64,
    result_ttl_secs: i64,
    history_limit: usize,
    log_format: LogFormat,
}

impl Config {
    /// Create a new config explicitly with default tuning values.
    pub fn new(bind_addr: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            user_agent: user_agent.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            result_ttl_secs: DEFAULT_RESULT_TTL_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            log_format: LogFormat::Pretty,
        }
    }

    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let user_agent =
            env::var(ENV_USER_AGENT).unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        let timeout_secs = parse_var(ENV_TIMEOUT_SECS, "timeout_secs", DEFAULT_TIMEOUT_SECS)?;
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: format!(
                    "{} is outside {}..={}",
                    timeout_secs, MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS
                ),
            });
        }

        let result_ttl_secs =
            parse_var(ENV_RESULT_TTL_SECS, "result_ttl_secs", DEFAULT_RESULT_TTL_SECS)?;
        if !(1..=MAX_RESULT_TTL_SECS).contains(&result_ttl_secs) {
            return Err(ConfigError::InvalidValue {
                field: "result_ttl_secs",
                reason: format!(
                    "{} is outside 1..={}",
                    result_ttl_secs, MAX_RESULT_TTL_SECS
                ),
            });
        }

        let history_limit = parse_var(ENV_HISTORY_LIMIT, "history_limit", DEFAULT_HISTORY_LIMIT)?;
        if history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history_limit",
                reason: "must be positive".to_string(),
            });
        }

        let log_format = parse_var(ENV_LOG_FORMAT, "log_format", LogFormat::Pretty)?;

        Ok(Self {
            bind_addr,
            user_agent,
            timeout_secs,
            result_ttl_secs,
            history_limit,
            log_format,
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// User agent sent when a run does not supply its own.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
    /// Request timeout used when a run does not supply one.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
    /// How long a finished run stays available for download.
    pub fn result_ttl_secs(&self) -> i64 {
        self.result_ttl_secs
    }
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BIND_ADDR, DEFAULT_USER_AGENT)
    }
}

fn parse_var<T>(key: &str, field: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    field,
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
