// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. Every tunable has a
//! default, but a value that is set and fails to parse is an error.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Directory holding `data/*.json` and GeoJSON files
    pub data_dir: PathBuf,
    /// Base URL of the entity API (for map clients)
    pub api_base_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Serve only bundled files, without Firestore
    pub offline: bool,
    /// Generic page title
    pub app_name: String,
    pub default_language: String,

    // --- Data loading ---
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    /// Timeout for large GeoJSON payloads
    pub geometry_timeout: Duration,
    /// Total attempts per load
    pub max_retries: u32,
    /// First retry delay, doubled per attempt
    pub retry_backoff: Duration,

    // --- Map ---
    pub highlight_budget: Duration,
    pub highlight_retry_delay: Duration,
    pub highlight_max_attempts: u32,
    /// Settle time between an itinerary scheme switch and its highlight
    pub scheme_switch_delay: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("."),
            api_base_url: "http://localhost:8080".to_string(),
            gcp_project_id: "test-project".to_string(),
            offline: true,
            app_name: "Overland Map".to_string(),
            default_language: "en".to_string(),
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_millis(10_000),
            geometry_timeout: Duration::from_millis(30_000),
            max_retries: 3,
            retry_backoff: Duration::from_millis(1_000),
            highlight_budget: Duration::from_millis(100),
            highlight_retry_delay: Duration::from_millis(50),
            highlight_max_attempts: 40,
            scheme_switch_delay: Duration::from_millis(100),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let millis = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            parse_or(get(key), key, default.as_millis() as u64).map(Duration::from_millis)
        };

        Ok(Self {
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            api_base_url: get("API_BASE_URL").unwrap_or(defaults.api_base_url),
            gcp_project_id: get("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            offline: parse_or(get("OFFLINE_MODE"), "OFFLINE_MODE", false)?,
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            default_language: get("DEFAULT_LANGUAGE")
                .map(|l| l.to_ascii_lowercase())
                .unwrap_or(defaults.default_language),
            cache_ttl: Duration::from_secs(parse_or(
                get("CACHE_TTL_SECS"),
                "CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            request_timeout: millis("REQUEST_TIMEOUT_MS", defaults.request_timeout)?,
            geometry_timeout: millis("GEOMETRY_TIMEOUT_MS", defaults.geometry_timeout)?,
            max_retries: parse_or(get("MAX_RETRIES"), "MAX_RETRIES", defaults.max_retries)?,
            retry_backoff: millis("RETRY_BACKOFF_MS", defaults.retry_backoff)?,
            highlight_budget: millis("HIGHLIGHT_BUDGET_MS", defaults.highlight_budget)?,
            highlight_retry_delay: millis(
                "HIGHLIGHT_RETRY_DELAY_MS",
                defaults.highlight_retry_delay,
            )?,
            highlight_max_attempts: parse_or(
                get("HIGHLIGHT_MAX_ATTEMPTS"),
                "HIGHLIGHT_MAX_ATTEMPTS",
                defaults.highlight_max_attempts,
            )?,
            scheme_switch_delay: millis("SCHEME_SWITCH_DELAY_MS", defaults.scheme_switch_delay)?,
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
