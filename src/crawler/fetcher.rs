//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from the scan settings (timeout, proxy, redirects)
//! - GET requests with a randomly chosen User-Agent per attempt
//! - Retry logic with linear backoff for transport failures
//! - Error classification into page outcomes

use crate::config::{random_user_agent, ScanConfig};
use crate::state::PageState;
use crate::ParaxmError;
use reqwest::{header, redirect::Policy, Client, Proxy};
use std::time::Duration;

/// Maximum number of redirect hops followed when redirects are enabled
pub const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// A response was received and its body read, whatever the status code
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Every attempt failed
    NetworkError {
        /// Description of the last error
        error: String,
        /// The page state this error maps to
        state: PageState,
    },
}

/// How many times to try a URL and how long to wait between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Backoff unit; the wait after failed attempt `i` is `(i + 1) * unit`
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_unit: config.backoff_unit(),
        }
    }

    /// Total number of attempts
    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay after the failed attempt with zero-based index `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_unit * (attempt + 1)
    }
}

/// Builds an HTTP client with the scan's transport settings
///
/// The User-Agent is set per request, not on the client.
///
/// # Errors
///
/// Returns `ParaxmError::Client` if the proxy URL is rejected or the TLS
/// backend cannot be initialized.
pub fn build_http_client(config: &ScanConfig) -> Result<Client, ParaxmError> {
    let redirect = if config.follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    let mut builder = Client::builder()
        .timeout(config.timeout_duration())
        .redirect(redirect)
        .gzip(true)
        .brotli(true);

    if let Some(proxy_url) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
        let proxy = Proxy::all(proxy_url).map_err(ParaxmError::Client)?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(ParaxmError::Client)
}

/// Fetches a URL with retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Any HTTP status | Success (extraction runs on error pages too) |
/// | Transport error (connect, DNS, timeout) | Sleep `(i + 1) * unit`, retry → Unreachable |
/// | Body read error | Retry immediately → Failed |
///
/// A fresh User-Agent is drawn from `user_agents` for every attempt.
pub async fn fetch_url(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
    user_agents: &[String],
) -> FetchResult {
    let mut last_error = String::new();
    let mut last_state = PageState::Unreachable;

    for attempt in 0..policy.attempts() {
        let is_last = attempt + 1 == policy.attempts();
        let user_agent = random_user_agent(user_agents);

        let response = match client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                last_error = classify_error(&e);
                last_state = PageState::Unreachable;
                tracing::debug!(
                    "Attempt {}/{} for {} failed: {}",
                    attempt + 1,
                    policy.attempts(),
                    url,
                    last_error
                );

                if !is_last {
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
                continue;
            }
        };

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        match response.text().await {
            Ok(body) => {
                return FetchResult::Success {
                    final_url,
                    status_code,
                    content_type,
                    body,
                }
            }
            Err(e) => {
                last_error = format!("Failed to read body: {}", e);
                last_state = PageState::Failed;
                tracing::debug!(
                    "Attempt {}/{} for {}: {}",
                    attempt + 1,
                    policy.attempts(),
                    url,
                    last_error
                );
            }
        }
    }

    FetchResult::NetworkError {
        error: last_error,
        state: last_state,
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection failed".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    }
}
