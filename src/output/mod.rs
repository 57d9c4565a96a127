//! Output module for run summaries
//!
//! This module handles:
//! - Snapshotting crawl counters into a [`RunSummary`]
//! - Printing the summary at run end
//! - Exporting the summary as JSON

pub mod stats;

pub use stats::{print_summary, write_summary, RunSummary};
