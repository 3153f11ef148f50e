//! Application configuration loaded from environment variables.
//!
//! The device storage secret is read once at startup and only used to derive
//! the at-rest encryption key for the credential store.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CHALLENGE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;
const MAX_CLOCK_SKEW_SECS: i64 = 86_400;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote authority (challenge and account endpoints)
    pub api_url: String,
    /// Directory holding the encrypted credential files
    pub storage_dir: PathBuf,
    /// Device secret the store key is derived from (raw bytes)
    pub storage_key: Vec<u8>,
    /// Upper bound on one challenge exchange
    pub challenge_timeout: Duration,
    /// Cached credentials expiring within this window are not resumed
    pub clock_skew_secs: i64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            storage_dir: PathBuf::from(".app-session"),
            storage_key: b"test_storage_key_32_bytes_min!!!".to_vec(),
            challenge_timeout: Duration::from_secs(DEFAULT_CHALLENGE_TIMEOUT_SECS),
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let storage_key = env::var("APP_STORAGE_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("APP_STORAGE_KEY"))?;
        if storage_key.len() < 16 {
            return Err(ConfigError::Invalid(
                "APP_STORAGE_KEY",
                "must be at least 16 bytes".to_string(),
            ));
        }

        Ok(Self {
            api_url: env::var("APP_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("APP_API_URL"))?,
            storage_dir: env::var("APP_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".app-session")),
            storage_key: storage_key.into_bytes(),
            challenge_timeout: Duration::from_secs(
                env::var("APP_CHALLENGE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CHALLENGE_TIMEOUT_SECS),
            ),
            clock_skew_secs: parse_clock_skew(env::var("APP_CLOCK_SKEW_SECS").ok())?,
        })
    }
}

/// Skew must be a non-negative number of seconds no larger than a day.
fn parse_clock_skew(raw: Option<String>) -> Result<i64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_CLOCK_SKEW_SECS);
    };

    let secs: i64 = raw
        .trim()
        .parse()
        .map_err(|e| ConfigError::Invalid("APP_CLOCK_SKEW_SECS", format!("{e}")))?;
    if !(0..=MAX_CLOCK_SKEW_SECS).contains(&secs) {
        return Err(ConfigError::Invalid(
            "APP_CLOCK_SKEW_SECS",
            format!("must be between 0 and {MAX_CLOCK_SKEW_SECS} seconds"),
        ));
    }
    Ok(secs)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
