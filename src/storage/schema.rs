//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the ParaXm database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track scans
CREATE TABLE IF NOT EXISTS scans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    target TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Discovered parameters, one row per (url, parameter) pair of a scan
CREATE TABLE IF NOT EXISTS findings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scan_id INTEGER NOT NULL REFERENCES scans(id),
    url TEXT NOT NULL,
    parameter TEXT NOT NULL,
    source TEXT NOT NULL,
    method TEXT NOT NULL,
    content_type TEXT NOT NULL,
    status_code INTEGER NOT NULL,
    discovered_at TEXT NOT NULL,
    UNIQUE(scan_id, url, parameter)
);

CREATE INDEX IF NOT EXISTS idx_findings_scan ON findings(scan_id);
CREATE INDEX IF NOT EXISTS idx_findings_url ON findings(url);
CREATE INDEX IF NOT EXISTS idx_findings_parameter ON findings(parameter);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
