//! Pagination decisions
//!
//! Whether another listing page is worth fetching depends only on a handful of
//! counters, so the decision is a pure function of them.

/// Derives the page ceiling from the quota
///
/// `ceil(results_wanted / jobs_per_page) + buffer`; the buffer absorbs pages
/// lost to duplicates and location filtering.
///
/// # Examples
///
/// ```
/// use vagas_ripple::crawler::page_ceiling;
///
/// assert_eq!(page_ceiling(50, 15, 2), 6);
/// assert_eq!(page_ceiling(15, 15, 2), 3);
/// ```
pub fn page_ceiling(results_wanted: u32, jobs_per_page: u32, buffer: u32) -> u32 {
    let per_page = jobs_per_page.max(1);
    results_wanted.div_ceil(per_page) + buffer
}

/// Counters the next-page decision looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationInput {
    /// Saved plus reserved records
    pub committed: u32,
    pub results_wanted: u32,

    /// Index of the page just processed
    pub page: u32,
    pub page_ceiling: u32,

    /// Raw number of jobs the page carried, before any filtering
    pub page_yield: usize,
    pub min_jobs_per_page: u32,
    pub has_more_pages: bool,
}

/// Decides whether to schedule the listing page after `input.page`
///
/// All of these must hold:
///
/// 1. The quota is not met yet
/// 2. The page index is below the ceiling
/// 3. The page carried at least `min_jobs_per_page` jobs
/// 4. No page has signalled the end of results
pub fn should_enqueue_next(input: &PaginationInput) -> bool {
    input.committed < input.results_wanted
        && input.page < input.page_ceiling
        && input.page_yield >= input.min_jobs_per_page as usize
        && input.has_more_pages
}
