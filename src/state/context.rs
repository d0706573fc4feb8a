use crate::extract::Finding;
use crate::state::PageState;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError, RwLock};
use tokio::sync::mpsc::UnboundedSender;

/// Shared state of one scan
///
/// Every page task holds an `Arc<ScanContext>`. The two visited sets make
/// their check-then-insert atomic, so a URL is fetched at most once and a
/// `(url, parameter)` pair is emitted at most once no matter how many tasks
/// race on it.
pub struct ScanContext {
    /// Crawl keys of URLs that were claimed for fetching
    visited_urls: RwLock<HashSet<String>>,

    /// `url|parameter` keys of emitted findings
    visited_params: RwLock<HashSet<String>>,

    /// Results sink drained by the collector task
    results: UnboundedSender<Finding>,

    /// How many fetched pages ended in each state
    outcomes: Mutex<BTreeMap<PageState, usize>>,
}

impl ScanContext {
    pub fn new(results: UnboundedSender<Finding>) -> Self {
        Self {
            visited_urls: RwLock::new(HashSet::new()),
            visited_params: RwLock::new(HashSet::new()),
            results,
            outcomes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Claims a URL for fetching
    ///
    /// Returns true if this call inserted the key; false if some task
    /// already claimed it.
    pub fn mark_url_visited(&self, key: &str) -> bool {
        if self.is_url_visited(key) {
            return false;
        }

        let mut visited = self
            .visited_urls
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        visited.insert(key.to_string())
    }

    /// Returns true if the URL was already claimed
    pub fn is_url_visited(&self, key: &str) -> bool {
        self.visited_urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Emits a finding unless its `url|parameter` pair was already emitted
    ///
    /// The first finding for a pair wins; later ones are dropped along with
    /// their source tag. Returns true if the finding was sent to the sink.
    pub fn record_finding(&self, finding: Finding) -> bool {
        let key = finding.dedup_key();

        {
            let seen = self
                .visited_params
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if seen.contains(&key) {
                return false;
            }
        }

        let inserted = self
            .visited_params
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);

        if !inserted {
            return false;
        }

        tracing::trace!(
            "New parameter {} on {} ({})",
            finding.parameter,
            finding.url,
            finding.source
        );

        if self.results.send(finding).is_err() {
            tracing::warn!("Results collector is gone; finding dropped");
            return false;
        }

        true
    }

    /// Records how the fetch of one page ended
    pub fn record_outcome(&self, state: PageState) {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        *outcomes.entry(state).or_insert(0) += 1;
    }

    /// Snapshot of the page outcome counters
    pub fn page_counts(&self) -> BTreeMap<PageState, usize> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of URLs claimed so far
    pub fn visited_url_count(&self) -> usize {
        self.visited_urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of distinct findings emitted so far
    pub fn finding_count(&self) -> usize {
        self.visited_params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
