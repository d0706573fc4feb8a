//! SQLite-based output handler implementation
//!
//! This module provides an output handler that records a finished scan
//! and its findings in the SQLite storage backend.

use crate::crawler::ScanReport;
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use crate::storage::{open_storage, ScanStatus, Storage};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite-based output handler
///
/// Every report written through this handler becomes one row in `scans`
/// plus its findings.
pub struct SqliteOutputHandler {
    storage: Arc<Mutex<dyn Storage + Send>>,
}

impl SqliteOutputHandler {
    /// Creates a new SQLite output handler
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    pub fn new(storage: Arc<Mutex<dyn Storage + Send>>) -> Self {
        Self { storage }
    }

    /// Opens (or creates) the database file and wraps it in a handler
    pub fn open(path: &Path) -> OutputResult<Self> {
        let storage = open_storage(path).map_err(|e| OutputError::Storage(e.to_string()))?;
        Ok(Self::new(Arc::new(Mutex::new(storage))))
    }

    /// Records the report and returns the new scan ID
    pub fn record_scan(&self, report: &ScanReport) -> OutputResult<i64> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|e| OutputError::Storage(format!("Failed to lock storage: {}", e)))?;

        let scan_id = storage
            .create_scan(&report.target, &report.config_hash, report.started_at)
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        let inserted = match storage.insert_findings(scan_id, &report.findings) {
            Ok(inserted) => inserted,
            Err(e) => {
                if let Err(status_err) = storage.update_scan_status(scan_id, ScanStatus::Failed) {
                    tracing::warn!("Could not mark scan {} as failed: {}", scan_id, status_err);
                }
                return Err(OutputError::Storage(e.to_string()));
            }
        };

        storage
            .complete_scan(scan_id, report.finished_at)
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        let stored = storage
            .get_scan(scan_id)
            .map_err(|e| OutputError::Storage(e.to_string()))?;
        tracing::debug!(
            "Stored scan {} ({}) with {} findings",
            scan_id,
            stored.status.to_db_string(),
            inserted
        );
        Ok(scan_id)
    }
}

impl OutputHandler for SqliteOutputHandler {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write_report(&self, report: &ScanReport) -> OutputResult<()> {
        self.record_scan(report).map(|_| ())
    }
}
