//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::extract::{Finding, Source};
use crate::storage::{ScanRecord, ScanStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Scan not found: {0}")]
    ScanNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed to persist scans.
pub trait Storage {
    // ===== Scan Management =====

    /// Creates a new scan in the `Running` state
    ///
    /// # Arguments
    ///
    /// * `target` - The scan's target URL
    /// * `config_hash` - Fingerprint of the effective settings
    /// * `started_at` - When the scan started
    ///
    /// # Returns
    ///
    /// The ID of the newly created scan
    fn create_scan(
        &mut self,
        target: &str,
        config_hash: &str,
        started_at: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Gets a scan by ID
    fn get_scan(&self, scan_id: i64) -> StorageResult<ScanRecord>;

    /// Gets the most recent scan
    fn get_latest_scan(&self) -> StorageResult<Option<ScanRecord>>;

    /// Updates the status of a scan
    fn update_scan_status(&mut self, scan_id: i64, status: ScanStatus) -> StorageResult<()>;

    /// Marks a scan as completed with a finish timestamp
    fn complete_scan(&mut self, scan_id: i64, finished_at: DateTime<Utc>) -> StorageResult<()>;

    // ===== Findings =====

    /// Inserts findings for a scan
    ///
    /// Pairs already stored for the scan are skipped, so the first finding
    /// for a `(url, parameter)` pair is kept.
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted
    fn insert_findings(&mut self, scan_id: i64, findings: &[Finding]) -> StorageResult<usize>;

    /// Gets all findings of a scan in insertion order
    fn get_findings(&self, scan_id: i64) -> StorageResult<Vec<Finding>>;

    // ===== Statistics =====

    /// Counts the findings of a scan
    fn count_findings(&self, scan_id: i64) -> StorageResult<u64>;

    /// Counts the findings of a scan per source tag
    fn count_findings_by_source(&self, scan_id: i64) -> StorageResult<HashMap<Source, u64>>;

    /// Gets total scan count
    fn count_scans(&self) -> StorageResult<u64>;
}
