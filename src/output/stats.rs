//! Run summary generation
//!
//! This module builds the end-of-run summary from the crawl state, prints it
//! and exports it as JSON.

use crate::state::CrawlState;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Summary of one harvest run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Records handed to the store
    pub jobs_saved: u32,

    /// Requested quota
    pub results_wanted: u32,

    /// Listing pages visited
    pub pages_processed: u32,

    /// Detail pages merged into records
    pub details_fetched: u32,

    pub skipped_for_location: u32,
    pub skipped_duplicates: u32,
    pub parse_failures: u32,

    /// Fetch failures, extraction misses and store errors
    pub errors: u32,

    pub runtime_seconds: f64,

    /// At least one record was saved
    pub success: bool,
}

impl RunSummary {
    /// Snapshots the counters of a finished run
    pub fn from_state(state: &CrawlState) -> Self {
        Self {
            jobs_saved: state.saved_count,
            results_wanted: state.results_wanted(),
            pages_processed: state.pages_processed,
            details_fetched: state.details_fetched,
            skipped_for_location: state.skipped_for_location,
            skipped_duplicates: state.skipped_duplicates,
            parse_failures: state.parse_failures,
            errors: state.error_count,
            runtime_seconds: state.elapsed().as_secs_f64(),
            success: state.saved_count > 0,
        }
    }

    /// Saved records per second of runtime
    pub fn jobs_per_second(&self) -> f64 {
        if self.runtime_seconds > 0.0 {
            self.jobs_saved as f64 / self.runtime_seconds
        } else {
            0.0
        }
    }
}

/// Prints a run summary to stdout
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Results:");
    println!(
        "  Jobs saved: {} / {} wanted",
        summary.jobs_saved, summary.results_wanted
    );
    println!("  Listing pages processed: {}", summary.pages_processed);
    println!("  Detail pages fetched: {}", summary.details_fetched);
    println!();

    println!("Dropped:");
    println!("  Location mismatch: {}", summary.skipped_for_location);
    println!("  Duplicates: {}", summary.skipped_duplicates);
    println!("  Unparseable: {}", summary.parse_failures);
    println!();

    println!("Errors: {}", summary.errors);
    println!(
        "Runtime: {:.2}s ({:.2} jobs/s)",
        summary.runtime_seconds,
        summary.jobs_per_second()
    );
}

/// Writes a run summary as pretty-printed JSON
///
/// # Arguments
///
/// * `summary` - The summary to export
/// * `output_path` - Destination file, replaced if it exists
pub fn write_summary(summary: &RunSummary, output_path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
