//! Crawler coordinator - main scan orchestration logic
//!
//! This module contains the crawl driver that coordinates all aspects of
//! a scan, including:
//! - Claiming URLs exactly once through the shared [`ScanContext`]
//! - Gating fetches through the [`Scheduler`]
//! - Running the extraction strategies over every fetched page
//! - Following same-host links of HTML pages up to the depth limit
//! - Collecting findings and page outcomes into a [`ScanReport`]
//!
//! Each page is one task in a `JoinSet`. A task returns the links it
//! discovered and the driver spawns them one level deeper, so the scan is
//! complete exactly when the set drains.

use crate::config::{compute_config_hash, validate, ScanConfig};
use crate::crawler::fetcher::RetryPolicy;
use crate::crawler::parser::discover_links;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::extract::{Extractor, Finding, Page};
use crate::state::{PageState, ScanContext};
use crate::url::{crawl_key, parse_target};
use crate::ParaxmError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use url::Url;

/// Method used for every crawl request
const CRAWL_METHOD: &str = "GET";

/// Everything a finished scan produced
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Target URL the scan started from
    pub target: String,

    /// When the scan started
    pub started_at: DateTime<Utc>,

    /// When the last page task finished
    pub finished_at: DateTime<Utc>,

    /// Fingerprint of the effective scan settings
    pub config_hash: String,

    /// Distinct findings in emission order
    pub findings: Vec<Finding>,

    /// How many fetched pages ended in each state
    pub page_counts: BTreeMap<PageState, usize>,

    /// Number of URLs claimed for fetching
    pub pages_visited: usize,
}

impl ScanReport {
    /// Wall-clock duration of the scan
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Main scan coordinator structure
pub struct Coordinator {
    config: ScanConfig,
    client: Client,
    scheduler: Scheduler,
    extractor: Arc<Extractor>,
}

/// What a page task needs, shared by all tasks of a scan
struct PageWorker {
    client: Client,
    scheduler: Scheduler,
    extractor: Arc<Extractor>,
    ctx: Arc<ScanContext>,
    policy: RetryPolicy,
    user_agents: Vec<String>,
    max_depth: u32,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Errors
    ///
    /// * `ParaxmError::Config` - The settings failed validation
    /// * `ParaxmError::Client` - The HTTP client could not be built
    pub fn new(config: ScanConfig) -> Result<Self, ParaxmError> {
        validate(&config)?;

        let client = build_http_client(&config)?;
        let scheduler = Scheduler::new(&config);

        Ok(Self {
            config,
            client,
            scheduler,
            extractor: Arc::new(Extractor::default()),
        })
    }

    /// Runs the scan to completion
    ///
    /// Per-page failures never abort the scan; they are recorded as page
    /// outcomes in the report.
    pub async fn run(&self) -> Result<ScanReport, ParaxmError> {
        let target = parse_target(&self.config.target)?;
        let started_at = Utc::now();
        let config_hash = compute_config_hash(&self.config);

        tracing::info!(
            "Starting scan of {} (depth {}, {} workers, rate {})",
            target,
            self.config.depth,
            self.scheduler.workers(),
            if self.scheduler.is_rate_limited() {
                format!("{} req/s", self.config.rate_limit)
            } else {
                "unlimited".to_string()
            }
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<Finding>();
        let ctx = Arc::new(ScanContext::new(tx));

        let collector = tokio::spawn(async move {
            let mut findings = Vec::new();
            while let Some(finding) = rx.recv().await {
                findings.push(finding);
            }
            findings
        });

        let worker = Arc::new(PageWorker {
            client: self.client.clone(),
            scheduler: self.scheduler.clone(),
            extractor: Arc::clone(&self.extractor),
            ctx: Arc::clone(&ctx),
            policy: RetryPolicy::from_config(&self.config),
            user_agents: self.config.user_agents.clone(),
            max_depth: self.config.depth,
        });

        let mut tasks: JoinSet<(u32, Vec<Url>)> = JoinSet::new();
        spawn_page(&mut tasks, &worker, target, 1);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((depth, children)) => {
                    for child in children {
                        if !ctx.is_url_visited(&crawl_key(&child)) {
                            spawn_page(&mut tasks, &worker, child, depth + 1);
                        }
                    }
                }
                Err(e) => tracing::warn!("Page task aborted: {}", e),
            }
        }

        let page_counts = ctx.page_counts();
        let pages_visited = ctx.visited_url_count();
        let emitted = ctx.finding_count();

        // Closing the last senders ends the collector.
        drop(worker);
        drop(ctx);

        let findings = match collector.await {
            Ok(findings) => findings,
            Err(e) => {
                tracing::error!("Results collector failed: {}", e);
                Vec::new()
            }
        };

        if findings.len() != emitted {
            tracing::warn!(
                "{} of {} parameters were lost before collection",
                emitted.saturating_sub(findings.len()),
                emitted
            );
        }

        let finished_at = Utc::now();
        tracing::info!(
            "Scan complete: {} pages visited, {} parameters found in {:.2}s",
            pages_visited,
            findings.len(),
            (finished_at - started_at).num_milliseconds() as f64 / 1000.0
        );

        Ok(ScanReport {
            target: self.config.target.clone(),
            started_at,
            finished_at,
            config_hash,
            findings,
            page_counts,
            pages_visited,
        })
    }
}

fn spawn_page(
    tasks: &mut JoinSet<(u32, Vec<Url>)>,
    worker: &Arc<PageWorker>,
    url: Url,
    depth: u32,
) {
    let worker = Arc::clone(worker);
    tasks.spawn(async move {
        let children = worker.crawl_page(url, depth).await;
        (depth, children)
    });
}

impl PageWorker {
    /// Fetches one page, extracts its parameters and returns the links to follow
    async fn crawl_page(&self, url: Url, depth: u32) -> Vec<Url> {
        if depth > self.max_depth {
            return Vec::new();
        }

        if !self.ctx.mark_url_visited(&crawl_key(&url)) {
            return Vec::new();
        }

        let Some(slot) = self.scheduler.acquire().await else {
            tracing::warn!("Scheduler closed; skipping {}", url);
            return Vec::new();
        };

        tracing::debug!(
            "Fetching {} (depth {}, {} slots free)",
            url,
            depth,
            self.scheduler.available_slots()
        );
        let result = fetch_url(&self.client, url.as_str(), &self.policy, &self.user_agents).await;
        drop(slot);

        let (final_url, status_code, content_type, body) = match result {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => (final_url, status_code, content_type, body),
            FetchResult::NetworkError { error, state } => {
                tracing::warn!("Giving up on {}: {}", url, error);
                self.ctx.record_outcome(state);
                return Vec::new();
            }
        };

        if final_url != url.as_str() {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let page = Page {
            url: &url,
            body: &body,
            content_type: &content_type,
            method: CRAWL_METHOD,
            status_code,
        };

        let mut new_findings = 0;
        for finding in self.extractor.extract(&page) {
            if self.ctx.record_finding(finding) {
                new_findings += 1;
            }
        }

        if !page.is_html() {
            tracing::debug!(
                "{} [{}] {} new parameters; not HTML ({}), links not followed",
                url,
                status_code,
                new_findings,
                content_type
            );
            self.ctx.record_outcome(PageState::ContentMismatch);
            return Vec::new();
        }

        self.ctx.record_outcome(PageState::Processed);

        if depth >= self.max_depth {
            tracing::debug!("{} [{}] {} new parameters", url, status_code, new_findings);
            return Vec::new();
        }

        let links = discover_links(&url, &body);
        tracing::debug!(
            "{} [{}] {} new parameters, {} links",
            url,
            status_code,
            new_findings,
            links.len()
        );
        links
    }
}

/// Runs a complete scan with the default extraction strategies
///
/// This is the main entry point for starting a scan. It will:
/// 1. Validate the settings
/// 2. Build the HTTP client and scheduler
/// 3. Crawl from the target, extracting parameters on every page
/// 4. Return the collected findings and page outcomes
pub async fn run_scan(config: ScanConfig) -> Result<ScanReport, ParaxmError> {
    Coordinator::new(config)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScanConfig::new("ftp://example.com");
        config.threads = 0;

        match Coordinator::new(config) {
            Err(ParaxmError::Config(_)) => {}
            Err(other) => panic!("expected config error, got {}", other),
            Ok(_) => panic!("expected config error"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_target_yields_empty_report() {
        let mut config = ScanConfig::new("http://127.0.0.1:1/");
        config.max_retries = 0;
        config.timeout = 1;

        let report = run_scan(config).await.unwrap();
        assert!(report.findings.is_empty());
        assert_eq!(report.pages_visited, 1);
        assert_eq!(report.page_counts.get(&PageState::Unreachable), Some(&1));
        assert!(report.finished_at >= report.started_at);
        assert!(report.duration() >= chrono::Duration::zero());
    }

    #[tokio::test]
    async fn test_depth_zero_fetches_nothing() {
        let mut config = ScanConfig::new("http://127.0.0.1:1/");
        config.depth = 0;

        let report = tokio::time::timeout(Duration::from_secs(5), run_scan(config))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.pages_visited, 0);
        assert!(report.page_counts.is_empty());
    }
}
