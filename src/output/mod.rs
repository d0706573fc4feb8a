//! Output module for writing scan results
//!
//! This module handles:
//! - The fuzzing template list (`<url>?<parameter>=FUZZ` per line)
//! - Markdown reports of scan results
//! - Persisting scans and findings to SQLite
//! - Scan statistics

mod markdown;
mod sqlite_output;
pub mod stats;
mod text;
mod traits;

pub use markdown::{format_markdown_report, MarkdownOutputHandler};
pub use sqlite_output::SqliteOutputHandler;
pub use stats::{log_statistics, ScanStatistics};
pub use text::{format_fuzz_list, TextOutputHandler};
pub use traits::{OutputError, OutputHandler, OutputResult};

use crate::config::ScanConfig;
use std::path::Path;

/// Builds the output handlers requested by the scan settings
///
/// Handlers are returned in a fixed order: text list, markdown report,
/// database.
pub fn build_handlers(config: &ScanConfig) -> OutputResult<Vec<Box<dyn OutputHandler>>> {
    let mut handlers: Vec<Box<dyn OutputHandler>> = Vec::new();

    if let Some(path) = &config.output_file {
        handlers.push(Box::new(TextOutputHandler::new(path)));
    }

    if let Some(path) = &config.summary_file {
        handlers.push(Box::new(MarkdownOutputHandler::new(path)));
    }

    if let Some(path) = &config.database {
        handlers.push(Box::new(SqliteOutputHandler::open(Path::new(path))?));
    }

    Ok(handlers)
}
