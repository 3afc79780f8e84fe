//! Client configuration

use std::time::Duration;

/// Base URL used when nothing is configured (Android emulator loopback).
pub const DEFAULT_BASE_URL: &str = "http://10.0.2.2:8000/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variables consulted by [`ApiConfig::from_env`], first match wins.
const BASE_URL_VARS: &[&str] = &["EL_TETU_API_URL", "EXPO_PUBLIC_API_URL"];
const TIMEOUT_VAR: &str = "EL_TETU_API_TIMEOUT_SECS";
const MAX_RETRIES_VAR: &str = "EL_TETU_API_MAX_RETRIES";

/// API client configuration.
///
/// # Default
///
/// [`DEFAULT_BASE_URL`], a 10 second timeout and no retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Root of the REST API, e.g. `https://tetu.example/api`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries for transient failures (0 disables retrying).
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Build from the process environment.
    ///
    /// - `EL_TETU_API_URL` (or `EXPO_PUBLIC_API_URL`): base URL
    /// - `EL_TETU_API_TIMEOUT_SECS`: timeout in seconds
    /// - `EL_TETU_API_MAX_RETRIES`: retry count
    ///
    /// Unparseable values are logged and replaced by the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = BASE_URL_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        {
            config.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => log::warn!("[api] Ignoring invalid {TIMEOUT_VAR}={raw}"),
            }
        }

        if let Some(raw) = lookup(MAX_RETRIES_VAR) {
            match raw.trim().parse::<u32>() {
                Ok(retries) => config.max_retries = retries,
                Err(_) => log::warn!("[api] Ignoring invalid {MAX_RETRIES_VAR}={raw}"),
            }
        }

        config
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Join `path` onto the base URL with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
