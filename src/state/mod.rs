//! State module for tracking scan progress
//!
//! # Components
//!
//! - `ScanContext`: visited URLs, emitted findings and the results sink shared by all page tasks
//! - `PageState`: how the fetch of an individual page ended

mod context;
mod page_state;

// Re-export main types
pub use context::ScanContext;
pub use page_state::PageState;
