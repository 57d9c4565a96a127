//! Scheduler for managing the crawl frontier and concurrency
//!
//! This module handles:
//! - Priority queue management for pending listing and detail requests
//! - Global concurrency limiting via a semaphore

use crate::extract::ListingJob;
use crate::state::RequestState;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// What a request fetches
#[derive(Debug, Clone)]
pub enum RequestKind {
    /// A page of search results
    Listing { page: u32 },

    /// A job's own page, carrying the listing skeleton to merge into
    Detail { job: ListingJob },
}

/// A page request flowing through the frontier
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub url: String,
    pub kind: RequestKind,
    pub state: RequestState,
}

impl CrawlRequest {
    /// Creates a pending listing request
    pub fn listing(url: impl Into<String>, page: u32) -> Self {
        Self {
            url: url.into(),
            kind: RequestKind::Listing { page },
            state: RequestState::PendingListing,
        }
    }

    /// Creates a pending detail request
    pub fn detail(url: impl Into<String>, job: ListingJob) -> Self {
        Self {
            url: url.into(),
            kind: RequestKind::Detail { job },
            state: RequestState::PendingDetail,
        }
    }

    /// Lower values are fetched first
    ///
    /// Detail requests outrank listings so reserved jobs are finalized before
    /// the crawl fans out further.
    pub fn priority(&self) -> u32 {
        match self.kind {
            RequestKind::Detail { .. } => 0,
            RequestKind::Listing { .. } => 10,
        }
    }
}

/// A request in the frontier, ordered by priority then arrival
#[derive(Debug)]
struct QueuedRequest {
    priority: u32,
    sequence: u64,
    request: CrawlRequest,
}

// BinaryHeap is a max-heap: reverse both keys so the lowest priority value,
// then the oldest sequence number, pops first
impl Ord for QueuedRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedRequest {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedRequest {}

/// A request cleared to run, with the permit that bounds concurrency
///
/// The permit must live as long as the work it authorizes.
pub struct ScheduledRequest {
    pub request: CrawlRequest,
    pub permit: OwnedSemaphorePermit,
}

/// Scheduler manages the frontier queue and the concurrency ceiling
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    frontier: BinaryHeap<QueuedRequest>,

    next_sequence: u64,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrency` - Maximum number of requests in flight (at least 1)
    /// * `initial` - Requests to seed the frontier with
    pub fn new(max_concurrency: usize, initial: Vec<CrawlRequest>) -> Self {
        let mut scheduler = Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            frontier: BinaryHeap::new(),
            next_sequence: 0,
        };

        for request in initial {
            scheduler.push(request);
        }
        scheduler
    }

    /// Adds a request to the frontier
    pub fn push(&mut self, request: CrawlRequest) {
        let queued = QueuedRequest {
            priority: request.priority(),
            sequence: self.next_sequence,
            request,
        };
        self.next_sequence += 1;
        self.frontier.push(queued);
    }

    /// Takes the next request if a concurrency slot is free
    ///
    /// # Returns
    ///
    /// * `Some(ScheduledRequest)` - The highest-priority request and its permit
    /// * `None` - The frontier is empty or every slot is taken
    pub fn try_next(&mut self) -> Option<ScheduledRequest> {
        if self.frontier.is_empty() {
            return None;
        }

        let permit = Arc::clone(&self.semaphore).try_acquire_owned().ok()?;
        let queued = self.frontier.pop()?;

        tracing::trace!(
            "Scheduling {} ({} left in frontier)",
            queued.request.url,
            self.frontier.len()
        );

        Some(ScheduledRequest {
            request: queued.request,
            permit,
        })
    }

    /// Returns the number of requests in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(id: &str) -> ListingJob {
        ListingJob {
            id: id.to_string(),
            title: "Vaga".to_string(),
            location: None,
            payload: json!({"id": id, "titulo": "Vaga"}),
        }
    }

    #[test]
    fn test_new_scheduler() {
        let scheduler = Scheduler::new(3, vec![]);

        assert_eq!(scheduler.frontier_size(), 0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_zero_concurrency_still_runs() {
        let mut scheduler = Scheduler::new(0, vec![CrawlRequest::listing("a", 1)]);
        assert!(scheduler.try_next().is_some());
    }

    #[test]
    fn test_details_outrank_listings() {
        let mut scheduler = Scheduler::new(
            10,
            vec![
                CrawlRequest::listing("page-2", 2),
                CrawlRequest::detail("detail-1", job("1")),
                CrawlRequest::detail("detail-2", job("2")),
            ],
        );

        let order: Vec<String> = std::iter::from_fn(|| scheduler.try_next())
            .map(|s| s.request.url)
            .collect();
        assert_eq!(order, vec!["detail-1", "detail-2", "page-2"]);
    }

    #[test]
    fn test_permits_bound_concurrency() {
        let mut scheduler = Scheduler::new(
            2,
            vec![
                CrawlRequest::listing("a", 1),
                CrawlRequest::listing("b", 2),
                CrawlRequest::listing("c", 3),
            ],
        );

        let first = scheduler.try_next().unwrap();
        let _second = scheduler.try_next().unwrap();
        assert!(scheduler.try_next().is_none());
        assert_eq!(scheduler.frontier_size(), 1);

        drop(first);
        let third = scheduler.try_next().unwrap();
        assert_eq!(third.request.url, "c");
    }

    #[test]
    fn test_request_states() {
        assert_eq!(
            CrawlRequest::listing("a", 1).state,
            RequestState::PendingListing
        );
        assert_eq!(
            CrawlRequest::detail("b", job("1")).state,
            RequestState::PendingDetail
        );
    }
}
