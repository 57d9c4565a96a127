//! Storage module for persisting harvested records
//!
//! This module handles the destinations of finalized job records:
//! - SQLite dataset with per-run bookkeeping
//! - Append-only JSON-lines dataset
//! - In-memory sink for tests and embedding

mod jsonl;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use jsonl::JsonLinesSink;
pub use memory::MemorySink;
pub use sqlite::SqliteSink;
pub use traits::{RecordSink, StorageError, StorageResult};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;
use std::sync::Arc;

/// Opens the sink selected by the output configuration
///
/// # Arguments
///
/// * `output` - Output section of the configuration
/// * `config_hash` - Hash recorded with the run (SQLite only)
///
/// # Returns
///
/// * `Ok(Arc<dyn RecordSink>)` - The opened sink
/// * `Err(StorageError)` - The dataset could not be opened
pub fn open_sink(output: &OutputConfig, config_hash: &str) -> StorageResult<Arc<dyn RecordSink>> {
    let path = Path::new(&output.dataset_path);

    let sink: Arc<dyn RecordSink> = match output.format {
        OutputFormat::Sqlite => Arc::new(SqliteSink::new(path, config_hash)?),
        OutputFormat::Jsonl => Arc::new(JsonLinesSink::new(path)?),
    };

    tracing::info!("Writing {:?} dataset to {}", output.format, path.display());
    Ok(sink)
}
