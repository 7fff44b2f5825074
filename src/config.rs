//! Runtime configuration from environment variables and CLI flags

use crate::stats_core::trend::{DEFAULT_TREND_DAYS, MAX_TREND_DAYS};
use crate::stats_core::window::TimeRange;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendType {
    Memory,
    Jsonl,
    Sqlite,
}

impl BackendType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Some(BackendType::Memory),
            "jsonl" => Some(BackendType::Jsonl),
            "sqlite" => Some(BackendType::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the statistics runtime
#[derive(Debug, Clone)]
pub struct StatsConfig {
    pub backend: BackendType,

    /// SQLite database file (sqlite backend)
    pub db_path: String,

    /// Event file, one JSON record per line (jsonl backend)
    pub jsonl_path: String,

    pub range: TimeRange,

    /// Length of the daily trend series
    pub trend_days: usize,

    /// Recompute the report on this interval; one-shot when `None`
    pub refresh_interval_secs: Option<u64>,

    /// JSONL file whose events are appended before reporting
    pub import_path: Option<String>,
}

impl StatsConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `EVENT_STORE_BACKEND` (default: sqlite)
    /// - `EVENTS_DB_PATH` (default: data/events.db)
    /// - `EVENTS_JSONL_PATH` (default: data/events.jsonl)
    /// - `STATS_TIME_RANGE` (default: month)
    /// - `TREND_DAYS` (default: 10, at most `MAX_TREND_DAYS`)
    /// - `REFRESH_INTERVAL_SECS` (default: unset, one-shot)
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_str = env::var("EVENT_STORE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());
        let backend = BackendType::from_str(&backend_str).ok_or_else(|| {
            ConfigError::InvalidValue(format!(
                "EVENT_STORE_BACKEND must be memory, jsonl or sqlite, got '{}'",
                backend_str
            ))
        })?;

        let range = TimeRange::from_token(
            &env::var("STATS_TIME_RANGE").unwrap_or_else(|_| "month".to_string()),
        );

        let trend_days = match env::var("TREND_DAYS") {
            Ok(raw) => parse_trend_days(&raw)?,
            Err(_) => DEFAULT_TREND_DAYS,
        };

        let refresh_interval_secs = env::var("REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0);

        Ok(Self {
            backend,
            db_path: env::var("EVENTS_DB_PATH").unwrap_or_else(|_| "data/events.db".to_string()),
            jsonl_path: env::var("EVENTS_JSONL_PATH")
                .unwrap_or_else(|_| "data/events.jsonl".to_string()),
            range,
            trend_days,
            refresh_interval_secs,
            import_path: None,
        })
    }

    /// Apply `--backend`, `--range` and `--import` flags on top of the environment
    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        if let Some(value) = flag_value(args, "--backend") {
            self.backend = BackendType::from_str(value).ok_or_else(|| {
                ConfigError::InvalidValue(format!("unknown backend '{}'", value))
            })?;
        }

        if let Some(value) = flag_value(args, "--range") {
            self.range = TimeRange::from_token(value);
        }

        if let Some(value) = flag_value(args, "--import") {
            self.import_path = Some(value.to_string());
        }

        Ok(())
    }
}

fn parse_trend_days(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(days) if days <= MAX_TREND_DAYS => Ok(days),
        _ => Err(ConfigError::InvalidValue(format!(
            "TREND_DAYS must be a whole number between 0 and {}, got '{}'",
            MAX_TREND_DAYS, raw
        ))),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|x| x == flag)?;
    args.get(idx + 1).map(|s| s.as_str())
}
