//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Feeding the frontier into a bounded pool of request handlers
//! - Fetching and admitting listing pages
//! - Enriching admitted jobs from their detail pages
//! - Persisting finalized records and producing the run summary

use crate::config::Config;
use crate::crawler::fetcher::{describe_failure, FetchResult, HttpFetcher, PageFetcher};
use crate::crawler::pagination::{should_enqueue_next, PaginationInput};
use crate::crawler::plan::RunPlan;
use crate::crawler::scheduler::{CrawlRequest, RequestKind, ScheduledRequest, Scheduler};
use crate::extract::{
    build_record, find_detail_payload, find_job_posting, listing_jobs, JobRecord, ListingJob,
    ListingPayload, RecordSources, RenderedPage,
};
use crate::output::{print_summary, write_summary, RunSummary};
use crate::state::{CrawlState, RequestState, StopReason};
use crate::storage::{open_sink, RecordSink};
use crate::{HarvestError, Result};
use rand::Rng;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinSet;

/// Everything a request handler needs, cheap to clone into a task
#[derive(Clone)]
struct Worker {
    plan: Arc<RunPlan>,
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn RecordSink>,
    state: Arc<Mutex<CrawlState>>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    worker: Worker,
}

impl Coordinator {
    /// Creates a coordinator for one run
    ///
    /// # Arguments
    ///
    /// * `plan` - The resolved run plan
    /// * `fetcher` - Loads listing and detail pages
    /// * `sink` - Receives finalized records
    pub fn new(plan: RunPlan, fetcher: Arc<dyn PageFetcher>, sink: Arc<dyn RecordSink>) -> Self {
        let state = CrawlState::new(plan.results_wanted, plan.max_runtime);
        Self {
            worker: Worker {
                plan: Arc::new(plan),
                fetcher,
                sink,
                state: Arc::new(Mutex::new(state)),
            },
        }
    }

    /// Snapshot of the run counters
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_state(&self.worker.lock_state())
    }

    /// Runs the crawl until the frontier drains
    ///
    /// Handlers run concurrently up to the plan's concurrency ceiling and hand
    /// back their follow-up requests. Once the quota or the runtime budget is
    /// reached no new listing work starts, but everything already in flight
    /// finishes before the summary is taken.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - At least one record was saved
    /// * `Err(HarvestError::NoResults)` - The run ended without saving anything
    pub async fn run(&self) -> Result<RunSummary> {
        let plan = &self.worker.plan;
        tracing::info!(
            "Starting harvest: up to {} jobs, page ceiling {}, {} concurrent request(s)",
            plan.results_wanted,
            plan.page_ceiling,
            plan.max_concurrency
        );

        let mut scheduler = Scheduler::new(plan.max_concurrency, vec![plan.first_request()]);
        let mut tasks: JoinSet<Vec<CrawlRequest>> = JoinSet::new();
        let mut handled: u32 = 0;

        loop {
            while let Some(ScheduledRequest { request, permit }) = scheduler.try_next() {
                let worker = self.worker.clone();
                tasks.spawn(async move {
                    let follow_ups = worker.handle(request).await;
                    drop(permit);
                    follow_ups
                });
            }

            match tasks.join_next().await {
                Some(Ok(follow_ups)) => {
                    handled += 1;
                    for request in follow_ups {
                        scheduler.push(request);
                    }
                }
                Some(Err(e)) => {
                    handled += 1;
                    tracing::error!("Request handler aborted: {}", e);
                    self.worker.lock_state().record_error();
                }
                None => {
                    tracing::info!("Frontier is empty, harvest complete");
                    break;
                }
            }

            if handled % 10 == 0 {
                let summary = self.summary();
                tracing::info!(
                    "Progress: {} saved, {} listing page(s), {} queued",
                    summary.jobs_saved,
                    summary.pages_processed,
                    scheduler.frontier_size()
                );
            }
        }

        let summary = self.summary();
        if let Err(e) = self.worker.sink.finalize(&summary) {
            tracing::error!("Failed to finalize dataset: {}", e);
        }

        if summary.jobs_saved == 0 {
            tracing::error!(
                "No results scraped after {} page(s)",
                summary.pages_processed
            );
            return Err(HarvestError::NoResults {
                pages: summary.pages_processed,
            });
        }

        tracing::info!(
            "Saved {} job(s) in {:.2}s",
            summary.jobs_saved,
            summary.runtime_seconds
        );
        Ok(summary)
    }
}

impl Worker {
    fn lock_state(&self) -> MutexGuard<'_, CrawlState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn handle(&self, request: CrawlRequest) -> Vec<CrawlRequest> {
        match request.kind.clone() {
            RequestKind::Listing { page } => self.handle_listing(request, page).await,
            RequestKind::Detail { job } => {
                self.handle_detail(request, job).await;
                Vec::new()
            }
        }
    }

    async fn handle_listing(&self, mut request: CrawlRequest, page: u32) -> Vec<CrawlRequest> {
        transition(&mut request, RequestState::ProcessingListing);

        let stop = self.lock_state().stop_reason();
        if let Some(reason) = stop {
            tracing::info!("Not visiting page {}: {:?}", page, reason);
            transition(&mut request, RequestState::Done);
            return Vec::new();
        }

        tracing::info!("Fetching listing page {}: {}", page, request.url);

        let (final_url, body) = match self.fetcher.fetch(&request.url).await {
            FetchResult::Success {
                final_url, body, ..
            } => {
                self.lock_state().begin_listing_page();
                (final_url, body)
            }
            failure => {
                tracing::warn!(
                    "Listing page {} failed: {}",
                    page,
                    describe_failure(&failure)
                );
                self.lock_state().record_error();
                transition(&mut request, RequestState::Failed);
                return Vec::new();
            }
        };

        self.pace().await;

        let page_data = RenderedPage::new(final_url, body);
        let raw_jobs = match listing_jobs(page_data.next_data().as_ref()) {
            ListingPayload::Jobs(jobs) => jobs,
            ListingPayload::Missing => {
                tracing::warn!("No job payload on listing page {}", page);
                self.lock_state().record_error();
                transition(&mut request, RequestState::Done);
                return Vec::new();
            }
        };

        if raw_jobs.is_empty() {
            tracing::info!("Listing page {} is empty, end of results", page);
            self.lock_state().mark_no_more_pages();
            transition(&mut request, RequestState::Done);
            return Vec::new();
        }

        let admission = self
            .lock_state()
            .admit_page(&raw_jobs, &self.plan.location_filter);
        tracing::info!(
            "Listing page {}: {} job(s), {} admitted{}",
            page,
            raw_jobs.len(),
            admission.accepted.len(),
            if admission.quota_reached {
                " (quota reached)"
            } else {
                ""
            }
        );

        let mut follow_ups = Vec::new();
        if self.plan.collect_details {
            if !admission.accepted.is_empty() {
                follow_ups.extend(admission.accepted.into_iter().map(|job| {
                    let url = self.plan.site.job_url(&job.id, &job.title);
                    CrawlRequest::detail(url, job)
                }));
                transition(&mut request, RequestState::EnqueueDetails);
            }
        } else {
            self.save_listing_page(&admission.accepted);
        }

        if self.next_page_allowed(page, raw_jobs.len()) {
            let next = page + 1;
            follow_ups.push(CrawlRequest::listing(self.plan.listing_url(next), next));
            transition(&mut request, RequestState::EnqueueNextListing);
        }

        transition(&mut request, RequestState::Done);
        follow_ups
    }

    async fn handle_detail(&self, mut request: CrawlRequest, job: ListingJob) {
        transition(&mut request, RequestState::ProcessingDetail);

        let stop = self.lock_state().stop_reason();
        let (record, enriched) = if stop == Some(StopReason::TimeBudget) {
            tracing::debug!("Runtime budget spent, saving {} without details", job.id);
            (self.listing_record(&job), false)
        } else {
            self.fetch_detail_record(&request.url, &job).await
        };

        let record = match record {
            Some(record) => record,
            None => {
                tracing::warn!("Could not build a record for job {}", job.id);
                let mut state = self.lock_state();
                state.parse_failures += 1;
                state.release(1);
                drop(state);
                transition(&mut request, RequestState::Failed);
                return;
            }
        };

        match self.sink.persist_batch(std::slice::from_ref(&record)) {
            Ok(()) => {
                let mut state = self.lock_state();
                state.commit_saved(1);
                if enriched {
                    state.record_detail_fetched();
                }
                drop(state);
                transition(&mut request, RequestState::DoneItem);
            }
            Err(e) => {
                tracing::error!("Failed to persist job {}: {}", record.id, e);
                let mut state = self.lock_state();
                state.record_error();
                state.release(1);
                drop(state);
                transition(&mut request, RequestState::Failed);
            }
        }
    }

    /// Fetches a detail page and merges it into the listing skeleton
    ///
    /// A failed fetch, or a page with neither payload, counts an error and
    /// falls back to the listing-only record. The flag is true when the detail
    /// page contributed.
    async fn fetch_detail_record(&self, url: &str, job: &ListingJob) -> (Option<JobRecord>, bool) {
        let (final_url, body) = match self.fetcher.fetch(url).await {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            failure => {
                tracing::warn!(
                    "Detail page for job {} failed: {}",
                    job.id,
                    describe_failure(&failure)
                );
                self.lock_state().record_error();
                return (self.listing_record(job), false);
            }
        };

        self.pace().await;

        let page = RenderedPage::new(final_url, body);
        let detail: Option<Value> = page.next_data().as_ref().and_then(find_detail_payload);
        let structured = find_job_posting(&page.structured_blocks());

        if detail.is_none() && structured.is_none() {
            tracing::warn!("No job payload on detail page for job {}", job.id);
            self.lock_state().record_error();
            return (self.listing_record(job), false);
        }

        let sources = RecordSources::detail_page(&job.payload, detail.as_ref(), structured.as_ref());
        (build_record(&sources, &self.plan.site), true)
    }

    fn listing_record(&self, job: &ListingJob) -> Option<JobRecord> {
        build_record(&RecordSources::listing_only(&job.payload), &self.plan.site)
    }

    /// Finalizes and persists one page's admitted jobs as a single batch
    fn save_listing_page(&self, accepted: &[ListingJob]) {
        if accepted.is_empty() {
            return;
        }

        let records: Vec<JobRecord> = accepted
            .iter()
            .filter_map(|job| self.listing_record(job))
            .collect();
        let unbuilt = (accepted.len() - records.len()) as u32;

        let result = self.sink.persist_batch(&records);

        let mut state = self.lock_state();
        state.parse_failures += unbuilt;
        state.release(unbuilt);
        match result {
            Ok(()) => state.commit_saved(records.len() as u32),
            Err(e) => {
                tracing::error!("Failed to persist {} record(s): {}", records.len(), e);
                state.record_error();
                state.release(records.len() as u32);
            }
        }
    }

    fn next_page_allowed(&self, page: u32, page_yield: usize) -> bool {
        let state = self.lock_state();
        if state.stop_reason() == Some(StopReason::TimeBudget) {
            return false;
        }

        should_enqueue_next(&PaginationInput {
            committed: state.saved_count + state.reserved_count,
            results_wanted: state.results_wanted(),
            page,
            page_ceiling: self.plan.page_ceiling,
            page_yield,
            min_jobs_per_page: self.plan.min_jobs_per_page,
            has_more_pages: state.has_more_pages,
        })
    }

    /// Waits a random delay between the pacing bounds
    async fn pace(&self) {
        let min = self.plan.pacing_min.as_millis() as u64;
        let max = self.plan.pacing_max.as_millis() as u64;
        if max == 0 {
            return;
        }

        let delay = rand::thread_rng().gen_range(min..=max.max(min));
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

fn transition(request: &mut CrawlRequest, next: RequestState) {
    match request.state.advance(next) {
        Ok(state) => request.state = state,
        Err(e) => tracing::error!("{} on {}", e, request.url),
    }
}

/// Runs a complete harvest for a configuration
///
/// Opens the configured dataset, crawls over HTTP, prints the run summary and
/// writes it to `output.summary-path` when set.
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `config_hash` - Hash of the configuration file, recorded with the run
pub async fn run_crawl(config: &Config, config_hash: &str) -> Result<RunSummary> {
    let plan = RunPlan::resolve(config)?;
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.fetch)?);
    let sink = open_sink(&config.output, config_hash)?;

    let coordinator = Coordinator::new(plan, fetcher, sink);
    let outcome = coordinator.run().await;

    let summary = coordinator.summary();
    print_summary(&summary);
    if let Some(path) = config.output.summary_path.as_deref() {
        write_summary(&summary, Path::new(path))?;
        tracing::info!("Summary written to {}", path);
    }

    outcome
}
