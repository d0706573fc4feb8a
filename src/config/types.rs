use crate::config::user_agents::default_user_agents;
use serde::Deserialize;
use std::time::Duration;

/// Settings for a single parameter scan
///
/// Every key is optional in the TOML file; command-line flags are applied on top
/// of whatever the file provides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Target URL the crawl starts from
    pub target: String,

    /// File receiving one `<url>?<parameter>=FUZZ` line per finding
    #[serde(rename = "output-file")]
    pub output_file: Option<String>,

    /// Maximum crawl depth (the target itself is depth 1)
    pub depth: u32,

    /// Concurrency hint: bounds in-flight fetches and sizes the rate limiter burst
    pub threads: u32,

    /// Maximum requests per second (0 means unlimited)
    #[serde(rename = "rate-limit")]
    pub rate_limit: f64,

    /// Per-request timeout in seconds
    pub timeout: u64,

    /// Proxy URL (http://, https:// or socks5://)
    pub proxy: Option<String>,

    /// Retries after the first failed attempt
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Whether the HTTP client follows redirects
    #[serde(rename = "follow-redirects")]
    pub follow_redirects: bool,

    /// Pool of User-Agent strings, one picked at random per attempt
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,

    /// Linear backoff unit between retry attempts (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Optional markdown report path
    #[serde(rename = "summary-file")]
    pub summary_file: Option<String>,

    /// Optional SQLite database path
    pub database: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            output_file: None,
            depth: 2,
            threads: 10,
            rate_limit: 0.0,
            timeout: 10,
            proxy: None,
            max_retries: 2,
            follow_redirects: true,
            user_agents: default_user_agents(),
            retry_backoff_ms: 1000,
            summary_file: None,
            database: None,
        }
    }
}

impl ScanConfig {
    /// Creates a configuration with default settings for the given target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Per-request timeout as a `Duration`
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Backoff unit between retry attempts
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Returns true if a requests-per-second cap is configured
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limit > 0.0
    }
}
