use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crewrisk_core::error::CoreError;
use crewrisk_core::generation::DEFAULT_SCORING_CONCURRENCY;
use crewrisk_core::scoring::{
    validate_scorer_kind, PlaceholderScorer, Scorer, DEFAULT_PLACEHOLDER_MAX,
    DEFAULT_PLACEHOLDER_MIN, SCORER_PLACEHOLDER,
};
use crewrisk_db::PoolSettings;

/// Configuration loading failure. Reported once at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Which scorer to run and how to parameterise it.
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Scorer kind (default: `placeholder`).
    pub kind: String,
    pub placeholder_min: u8,
    pub placeholder_max: u8,
    /// Scorer calls in flight per generation (default: `16`).
    pub concurrency: usize,
}

impl ScorerConfig {
    /// Construct the configured scorer.
    pub fn build(&self) -> Result<Arc<dyn Scorer>, CoreError> {
        validate_scorer_kind(&self.kind)?;
        match self.kind.as_str() {
            SCORER_PLACEHOLDER => {
                tracing::warn!(
                    min = self.placeholder_min,
                    max = self.placeholder_max,
                    "Using placeholder scorer: risk scores are random, not model output"
                );
                Ok(Arc::new(PlaceholderScorer::new(
                    self.placeholder_min,
                    self.placeholder_max,
                )?))
            }
            other => Err(CoreError::Internal(format!(
                "scorer kind '{other}' passed validation but has no constructor"
            ))),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except `DATABASE_URL` have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    pub pool: PoolSettings,
    pub scorer: ScorerConfig,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `5000`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                     |
    /// | `DATABASE_URL`            | required                 |
    /// | `DB_MAX_CONNECTIONS`      | `20`                     |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                      |
    /// | `DB_STATEMENT_TIMEOUT_MS` | unset (server default)   |
    /// | `SCORER`                  | `placeholder`            |
    /// | `PLACEHOLDER_SCORE_MIN`   | `20`                     |
    /// | `PLACEHOLDER_SCORE_MAX`   | `95`                     |
    /// | `SCORING_CONCURRENCY`     | `16`                     |
    /// | `LOG_FORMAT`              | `pretty`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 5000)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let defaults = PoolSettings::default();
        let pool = PoolSettings {
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
            statement_timeout_ms: parse_opt(&lookup, "DB_STATEMENT_TIMEOUT_MS")?,
        };

        let scorer = ScorerConfig {
            kind: lookup("SCORER").unwrap_or_else(|| SCORER_PLACEHOLDER.into()),
            placeholder_min: parse_or(&lookup, "PLACEHOLDER_SCORE_MIN", DEFAULT_PLACEHOLDER_MIN)?,
            placeholder_max: parse_or(&lookup, "PLACEHOLDER_SCORE_MAX", DEFAULT_PLACEHOLDER_MAX)?,
            concurrency: parse_or(&lookup, "SCORING_CONCURRENCY", DEFAULT_SCORING_CONCURRENCY)?,
        };
        validate_scorer_kind(&scorer.kind)?;

        let log_format: LogFormat = parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            pool,
            scorer,
            log_format,
        })
    }
}

fn parse_opt<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}
