//! Statistics derived from a finished scan
//!
//! This module provides functionality for summarizing a [`ScanReport`] and
//! logging the summary.

use crate::crawler::ScanReport;
use crate::extract::Source;
use crate::state::PageState;
use std::collections::{BTreeMap, BTreeSet};

/// Scan statistics summary
#[derive(Debug, Clone, Default)]
pub struct ScanStatistics {
    /// Number of distinct findings
    pub total_findings: usize,

    /// Number of distinct endpoint URLs carrying at least one parameter
    pub distinct_urls: usize,

    /// Number of distinct parameter names across all endpoints
    pub distinct_parameters: usize,

    /// Count of findings by source tag
    pub findings_by_source: BTreeMap<Source, usize>,

    /// Count of findings by HTTP method
    pub findings_by_method: BTreeMap<String, usize>,

    /// Count of fetched pages by outcome
    pub pages_by_state: BTreeMap<PageState, usize>,

    /// Number of URLs claimed for fetching
    pub pages_visited: usize,

    /// Scan duration in seconds
    pub duration_seconds: f64,
}

impl ScanStatistics {
    /// Computes statistics from a finished scan
    pub fn from_report(report: &ScanReport) -> Self {
        let mut findings_by_source = BTreeMap::new();
        let mut findings_by_method = BTreeMap::new();
        let mut urls = BTreeSet::new();
        let mut parameters = BTreeSet::new();

        for finding in &report.findings {
            *findings_by_source.entry(finding.source).or_insert(0) += 1;
            *findings_by_method.entry(finding.method.clone()).or_insert(0) += 1;
            urls.insert(finding.url.as_str());
            parameters.insert(finding.parameter.as_str());
        }

        Self {
            total_findings: report.findings.len(),
            distinct_urls: urls.len(),
            distinct_parameters: parameters.len(),
            findings_by_source,
            findings_by_method,
            pages_by_state: report.page_counts.clone(),
            pages_visited: report.pages_visited,
            duration_seconds: report.duration().num_milliseconds() as f64 / 1000.0,
        }
    }

    /// Number of pages whose fetch ended in an error state
    pub fn total_errors(&self) -> usize {
        self.pages_by_state
            .iter()
            .filter(|(state, _)| state.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Percentage of fetched pages whose body was obtained
    pub fn success_rate(&self) -> f64 {
        let fetched: usize = self.pages_by_state.values().sum();
        if fetched == 0 {
            return 0.0;
        }

        let succeeded: usize = self
            .pages_by_state
            .iter()
            .filter(|(state, _)| state.is_success())
            .map(|(_, count)| count)
            .sum();

        (succeeded as f64 / fetched as f64) * 100.0
    }
}

/// Logs statistics at info level
pub fn log_statistics(stats: &ScanStatistics) {
    tracing::info!(
        "Scan statistics: {} findings on {} endpoints, {} pages visited in {:.2}s ({:.1}% fetched)",
        stats.total_findings,
        stats.distinct_urls,
        stats.pages_visited,
        stats.duration_seconds,
        stats.success_rate()
    );

    for (source, count) in &stats.findings_by_source {
        tracing::debug!("  {}: {}", source, count);
    }

    for (state, count) in &stats.pages_by_state {
        tracing::debug!("  pages {}: {}", state, count);
    }
}
