use crate::extract::{parse_listing_job, ListingJob};
use crate::location::matches_location;
use serde_json::Value;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Why a run stops taking new listing work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Saved plus reserved jobs reached the quota
    QuotaMet,

    /// The wall-clock safety budget ran out
    TimeBudget,
}

/// Result of admitting one listing page's jobs
#[derive(Debug, Clone, Default)]
pub struct PageAdmission {
    /// Jobs that passed every check, in page order, each holding a quota slot
    pub accepted: Vec<ListingJob>,

    /// The quota filled up before the page was exhausted
    pub quota_reached: bool,
}

/// Run-scoped crawl state
///
/// Created at run start and dropped at run end. The orchestrator shares it
/// between workers behind a mutex; every method here runs without awaiting.
///
/// Quota accounting has two parts: `saved_count` for records already handed to
/// the store and `reserved_count` for admitted jobs still waiting on their
/// detail page. A job holds its slot from admission until it is saved or
/// released, so concurrent pages can never overshoot the quota.
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Ids admitted this run
    pub seen_ids: HashSet<String>,

    /// Records handed to the store
    pub saved_count: u32,

    /// Admitted jobs not yet saved
    pub reserved_count: u32,

    /// Listing pages fetched (skipped and failed fetches excluded)
    pub pages_processed: u32,

    /// Detail pages merged into records
    pub details_fetched: u32,

    pub skipped_for_location: u32,
    pub skipped_duplicates: u32,
    pub parse_failures: u32,

    /// Fetch failures, extraction misses and store errors
    pub error_count: u32,

    /// Cleared once a listing page comes back empty
    pub has_more_pages: bool,

    pub started_at: Instant,

    results_wanted: u32,
    max_runtime: Duration,
}

impl CrawlState {
    /// Creates fresh state for a run
    ///
    /// # Arguments
    ///
    /// * `results_wanted` - Quota of records to save (clamped to at least 1)
    /// * `max_runtime` - Wall-clock safety budget
    pub fn new(results_wanted: u32, max_runtime: Duration) -> Self {
        Self {
            seen_ids: HashSet::new(),
            saved_count: 0,
            reserved_count: 0,
            pages_processed: 0,
            details_fetched: 0,
            skipped_for_location: 0,
            skipped_duplicates: 0,
            parse_failures: 0,
            error_count: 0,
            has_more_pages: true,
            started_at: Instant::now(),
            results_wanted: results_wanted.max(1),
            max_runtime,
        }
    }

    pub fn results_wanted(&self) -> u32 {
        self.results_wanted
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Quota slots not yet saved or reserved
    pub fn remaining_quota(&self) -> u32 {
        self.results_wanted
            .saturating_sub(self.saved_count + self.reserved_count)
    }

    pub fn quota_met(&self) -> bool {
        self.remaining_quota() == 0
    }

    /// Returns the reason new listing work must not start, if any
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.elapsed() > self.max_runtime {
            Some(StopReason::TimeBudget)
        } else if self.quota_met() {
            Some(StopReason::QuotaMet)
        } else {
            None
        }
    }

    /// Counts a listing page that was fetched successfully
    pub fn begin_listing_page(&mut self) {
        self.pages_processed += 1;
    }

    /// Admits the raw jobs of one listing page
    ///
    /// Jobs are checked in page order. A job is dropped, and counted under its
    /// reason, when it fails to parse, when its id was already admitted, or when
    /// `location_filter` is set and the job's location does not match. Each
    /// surviving job is marked as seen and reserves one quota slot; once the
    /// quota is full the rest of the page is left untouched.
    pub fn admit_page(&mut self, raw_jobs: &[Value], location_filter: &str) -> PageAdmission {
        let mut admission = PageAdmission::default();

        for raw in raw_jobs {
            if self.quota_met() {
                admission.quota_reached = true;
                break;
            }

            let job = match parse_listing_job(raw) {
                Some(job) => job,
                None => {
                    self.parse_failures += 1;
                    tracing::debug!("Dropping job without id or title");
                    continue;
                }
            };

            if self.seen_ids.contains(&job.id) {
                self.skipped_duplicates += 1;
                tracing::debug!("Dropping duplicate job {}", job.id);
                continue;
            }

            if !matches_location(job.location.as_deref(), location_filter) {
                self.skipped_for_location += 1;
                tracing::debug!(
                    "Dropping job {} at {:?} (filter {:?})",
                    job.id,
                    job.location,
                    location_filter
                );
                continue;
            }

            self.seen_ids.insert(job.id.clone());
            self.reserved_count += 1;
            admission.accepted.push(job);
        }

        if self.quota_met() {
            admission.quota_reached = true;
        }

        admission
    }

    /// Converts `count` reserved slots into saved records
    pub fn commit_saved(&mut self, count: u32) {
        let count = count.min(self.reserved_count);
        self.reserved_count -= count;
        self.saved_count += count;
    }

    /// Returns `count` reserved slots to the quota without saving
    pub fn release(&mut self, count: u32) {
        self.reserved_count = self.reserved_count.saturating_sub(count);
    }

    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    pub fn record_detail_fetched(&mut self) {
        self.details_fetched += 1;
    }

    /// Marks the end of results; no further listing page will be scheduled
    pub fn mark_no_more_pages(&mut self) {
        self.has_more_pages = false;
    }
}
