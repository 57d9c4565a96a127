//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordSink trait.

use crate::extract::JobRecord;
use crate::output::RunSummary;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite record sink
///
/// Opening the sink registers a new row in `runs`; every persisted record is
/// tagged with that run and the summary is written back on finalize.
pub struct SqliteSink {
    conn: Mutex<Connection>,
    run_id: i64,
}

impl SqliteSink {
    /// Opens (or creates) the dataset database and starts a run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration the run was started with
    pub fn new(path: &Path, config_hash: &str) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::with_connection(conn, config_hash)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(config_hash: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, config_hash)
    }

    fn with_connection(conn: Connection, config_hash: &str) -> StorageResult<Self> {
        initialize_schema(&conn)?;

        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, 'running')",
            params![Utc::now().to_rfc3339(), config_hash],
        )?;
        let run_id = conn.last_insert_rowid();

        Ok(Self {
            conn: Mutex::new(conn),
            run_id,
        })
    }

    /// Id of the run this sink writes to
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Counts the records persisted by this run
    pub fn count_jobs(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl RecordSink for SqliteSink {
    fn persist_batch(&self, records: &[JobRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO jobs (run_id, id, title, company, location, salary, employment_type,
                    description, description_html, benefits, date_posted, url, apply_url, source, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )?;

            for record in records {
                stmt.execute(params![
                    self.run_id,
                    record.id,
                    record.title,
                    record.company,
                    record.location,
                    record.salary,
                    record.employment_type,
                    record.description,
                    record.description_html,
                    record.benefits,
                    record.date_posted,
                    record.url,
                    record.apply_url,
                    record.source.as_str(),
                    record.fetched_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn finalize(&self, summary: &RunSummary) -> StorageResult<()> {
        let status = if summary.success { "completed" } else { "failed" };

        let conn = self.lock()?;
        conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, results_wanted = ?3, jobs_saved = ?4,
                pages_processed = ?5, details_fetched = ?6, skipped_for_location = ?7,
                skipped_duplicates = ?8, parse_failures = ?9, errors = ?10, runtime_seconds = ?11
             WHERE id = ?12",
            params![
                Utc::now().to_rfc3339(),
                status,
                summary.results_wanted,
                summary.jobs_saved,
                summary.pages_processed,
                summary.details_fetched,
                summary.skipped_for_location,
                summary.skipped_duplicates,
                summary.parse_failures,
                summary.errors,
                summary.runtime_seconds,
                self.run_id,
            ],
        )?;

        Ok(())
    }
}
