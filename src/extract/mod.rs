//! Extraction module for job payloads and records
//!
//! This module turns rendered pages into canonical job records:
//! - Locating the inline `__NEXT_DATA__` payload and the ld+json blocks of a page
//! - Reading job fields defensively from listing, detail and structured payloads
//! - Parsing listing entries into skeletons used for dedup and filtering
//! - Merging up to three sources into one [`JobRecord`] with per-field priorities

mod fields;
mod html;
mod listing;
mod page;
mod payload;
mod record;

pub use fields::{Field, JobView, PostingView};
pub use html::{collapse_whitespace, html_to_text};
pub use listing::{parse_listing_job, ListingJob};
pub use page::RenderedPage;
pub use payload::{find_detail_payload, find_job_posting, listing_jobs, ListingPayload};
pub use record::{build_record, format_salary_range, JobRecord, RecordSource, RecordSources};

/// Company name the site shows when the employer hides its identity
pub const CONFIDENTIAL_COMPANY: &str = "Confidencial";
