//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and the
//! errors they report.

use crate::crawler::ScanReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for output handler implementations
///
/// Each handler renders a finished scan to one destination. Handlers run
/// after the crawl completes, in the order they were configured; a failing
/// handler does not prevent the others from running.
pub trait OutputHandler {
    /// Short name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Writes the report to the handler's destination
    ///
    /// # Arguments
    ///
    /// * `report` - The finished scan
    fn write_report(&self, report: &ScanReport) -> OutputResult<()>;
}
