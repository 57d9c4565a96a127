//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: Run-scoped counters, seen ids, quota reservations and budgets
//! - `RequestState`: The state machine every listing and detail request walks

mod crawl_state;
mod request_state;

pub use crawl_state::{CrawlState, PageAdmission, StopReason};
pub use request_state::RequestState;
