//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::extract::{Finding, Source};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ScanRecord, ScanStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// A findings row before its text columns are parsed back into typed fields
struct RawFinding {
    url: String,
    parameter: String,
    source: String,
    method: String,
    content_type: String,
    status_code: u16,
    discovered_at: String,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = init_database(path)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn scan_from_row(row: &Row<'_>) -> rusqlite::Result<ScanRecord> {
        Ok(ScanRecord {
            id: row.get(0)?,
            target: row.get(1)?,
            started_at: row.get(2)?,
            finished_at: row.get(3)?,
            config_hash: row.get(4)?,
            status: ScanStatus::from_db_string(&row.get::<_, String>(5)?)
                .unwrap_or(ScanStatus::Running),
        })
    }
}

impl RawFinding {
    fn into_finding(self) -> StorageResult<Finding> {
        let source = Source::from_tag(&self.source).ok_or_else(|| {
            StorageError::Serialization(format!("Unknown source tag: {}", self.source))
        })?;

        let timestamp = DateTime::parse_from_rfc3339(&self.discovered_at)
            .map_err(|e| {
                StorageError::Serialization(format!(
                    "Invalid timestamp {}: {}",
                    self.discovered_at, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(Finding {
            url: self.url,
            parameter: self.parameter,
            source,
            method: self.method,
            content_type: self.content_type,
            status_code: self.status_code,
            timestamp,
        })
    }
}

impl Storage for SqliteStorage {
    // ===== Scan Management =====

    fn create_scan(
        &mut self,
        target: &str,
        config_hash: &str,
        started_at: DateTime<Utc>,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO scans (target, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                target,
                started_at.to_rfc3339(),
                config_hash,
                ScanStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_scan(&self, scan_id: i64) -> StorageResult<ScanRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, target, started_at, finished_at, config_hash, status
             FROM scans WHERE id = ?1",
        )?;

        stmt.query_row(params![scan_id], Self::scan_from_row)
            .optional()?
            .ok_or(StorageError::ScanNotFound(scan_id))
    }

    fn get_latest_scan(&self) -> StorageResult<Option<ScanRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, target, started_at, finished_at, config_hash, status
             FROM scans ORDER BY id DESC LIMIT 1",
        )?;

        let scan = stmt.query_row([], Self::scan_from_row).optional()?;
        Ok(scan)
    }

    fn update_scan_status(&mut self, scan_id: i64, status: ScanStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE scans SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), scan_id],
        )?;

        if updated == 0 {
            return Err(StorageError::ScanNotFound(scan_id));
        }
        Ok(())
    }

    fn complete_scan(&mut self, scan_id: i64, finished_at: DateTime<Utc>) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE scans SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![
                ScanStatus::Completed.to_db_string(),
                finished_at.to_rfc3339(),
                scan_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::ScanNotFound(scan_id));
        }
        Ok(())
    }

    // ===== Findings =====

    fn insert_findings(&mut self, scan_id: i64, findings: &[Finding]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO findings
                 (scan_id, url, parameter, source, method, content_type, status_code, discovered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for finding in findings {
                inserted += stmt.execute(params![
                    scan_id,
                    finding.url,
                    finding.parameter,
                    finding.source.as_str(),
                    finding.method,
                    finding.content_type,
                    finding.status_code,
                    finding.timestamp.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn get_findings(&self, scan_id: i64) -> StorageResult<Vec<Finding>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, parameter, source, method, content_type, status_code, discovered_at
             FROM findings WHERE scan_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![scan_id], |row| {
            Ok(RawFinding {
                url: row.get(0)?,
                parameter: row.get(1)?,
                source: row.get(2)?,
                method: row.get(3)?,
                content_type: row.get(4)?,
                status_code: row.get(5)?,
                discovered_at: row.get(6)?,
            })
        })?;

        let mut findings = Vec::new();
        for row in rows {
            findings.push(row?.into_finding()?);
        }

        Ok(findings)
    }

    // ===== Statistics =====

    fn count_findings(&self, scan_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM findings WHERE scan_id = ?1",
            params![scan_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_findings_by_source(&self, scan_id: i64) -> StorageResult<HashMap<Source, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT source, COUNT(*) FROM findings WHERE scan_id = ?1 GROUP BY source",
        )?;

        let mut summary = HashMap::new();
        let rows = stmt.query_map(params![scan_id], |row| {
            let source: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((source, count))
        })?;

        for row in rows {
            let (tag, count) = row?;
            if let Some(source) = Source::from_tag(&tag) {
                summary.insert(source, count as u64);
            }
        }

        Ok(summary)
    }

    fn count_scans(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scans", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Initializes or opens a database at the given path
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
