use crate::extract::JobRecord;
use crate::output::RunSummary;
use crate::storage::traits::{RecordSink, StorageResult};
use std::sync::Mutex;

/// Keeps records in memory, for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<JobRecord>>,
    batches: Mutex<Vec<usize>>,
    summary: Mutex<Option<RunSummary>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record persisted so far, in arrival order
    pub fn records(&self) -> Vec<JobRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Size of each persisted batch, in arrival order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The summary passed to `finalize`, if it was called
    pub fn summary(&self) -> Option<RunSummary> {
        self.summary
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl RecordSink for MemorySink {
    fn persist_batch(&self, records: &[JobRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(records);
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(records.len());
        Ok(())
    }

    fn finalize(&self, summary: &RunSummary) -> StorageResult<()> {
        *self.summary.lock().unwrap_or_else(|e| e.into_inner()) = Some(summary.clone());
        Ok(())
    }
}
