//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and the
//! associated error types.

use crate::extract::JobRecord;
use crate::output::RunSummary;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage lock poisoned: {0}")]
    Lock(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination of finalized job records
///
/// Records arrive already deduplicated and bounded by the quota; a sink only
/// appends them. Implementations must be shareable between crawl workers.
pub trait RecordSink: Send + Sync {
    /// Appends one batch of records
    ///
    /// Called once per listing page (listing-only mode) or once per detail
    /// page. An empty batch is a no-op.
    fn persist_batch(&self, records: &[JobRecord]) -> StorageResult<()>;

    /// Called once after all in-flight work has drained
    fn finalize(&self, _summary: &RunSummary) -> StorageResult<()> {
        Ok(())
    }
}
