//! Database schema definitions
//!
//! This module contains the SQL schema of the job dataset database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    results_wanted INTEGER,
    jobs_saved INTEGER,
    pages_processed INTEGER,
    details_fetched INTEGER,
    skipped_for_location INTEGER,
    skipped_duplicates INTEGER,
    parse_failures INTEGER,
    errors INTEGER,
    runtime_seconds REAL
);

-- Append-only job dataset; the same id may appear in several runs
CREATE TABLE IF NOT EXISTS jobs (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    id TEXT NOT NULL,
    title TEXT NOT NULL,
    company TEXT,
    location TEXT,
    salary TEXT,
    employment_type TEXT,
    description TEXT,
    description_html TEXT,
    benefits TEXT,
    date_posted TEXT,
    url TEXT NOT NULL,
    apply_url TEXT NOT NULL,
    source TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_run ON jobs(run_id);
CREATE INDEX IF NOT EXISTS idx_jobs_id ON jobs(id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
