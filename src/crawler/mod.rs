//! Crawler module for page fetching and scan orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link discovery
//! - Concurrency bounding and rate limiting
//! - Overall scan coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_scan, Coordinator, ScanReport};
pub use fetcher::{build_http_client, fetch_url, FetchResult, RetryPolicy, MAX_REDIRECTS};
pub use parser::discover_links;
pub use scheduler::{FetchSlot, Scheduler};
