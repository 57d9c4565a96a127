//! Crawler module for listing and detail page harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Run plan resolution from configuration
//! - Request scheduling and concurrency limiting
//! - Pagination decisions
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod pagination;
mod plan;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, describe_failure, FetchResult, HttpFetcher, PageFetcher};
pub use pagination::{page_ceiling, should_enqueue_next, PaginationInput};
pub use plan::RunPlan;
pub use scheduler::{CrawlRequest, RequestKind, ScheduledRequest, Scheduler};
