use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backend base URL when `API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Default `numResults` the test client sends when `MAX_SEARCH_RESULT` is not set.
pub const DEFAULT_MAX_SEARCH_RESULTS: u32 = 3;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn opt_from<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn or_from<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    opt_from(lookup, key).unwrap_or_else(|| default.to_string())
}

fn parsed_from<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = opt_from(lookup, key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key = %key, value = %raw, "Ignoring unparseable env value");
            None
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub harness: HarnessConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Build config from an arbitrary key lookup. `from_env` is this over `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            backend: BackendConfig::from_lookup(&lookup),
            harness: HarnessConfig::from_lookup(&lookup),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  backend:  api_url={}", self.backend.api_url);
        match self.backend.timeout_secs {
            Some(secs) => tracing::info!("  backend:  timeout={}s", secs),
            None => tracing::info!("  backend:  timeout=(none)"),
        }
        tracing::info!("  harness:  max_search_results={}", self.harness.max_search_results);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// ── Backend ───────────────────────────────────────────────────

/// Where and how the search backend is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL; the crawl endpoint is `{api_url}/crawl`.
    pub api_url: String,
    /// Per-request HTTP timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_url: or_from(lookup, "API_URL", DEFAULT_API_URL),
            timeout_secs: parsed_from(lookup, "API_TIMEOUT_SECS"),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ── Test client ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// `numResults` attached to every query the test client sends.
    pub max_search_results: u32,
}

impl HarnessConfig {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            max_search_results: parsed_from(lookup, "MAX_SEARCH_RESULT")
                .unwrap_or(DEFAULT_MAX_SEARCH_RESULTS),
        }
    }
}
