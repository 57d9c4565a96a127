//! Run plan resolution
//!
//! Turns a validated [`Config`] into the fixed inputs of one crawl: where to
//! start, what to filter on, and how far to go.

use crate::config::Config;
use crate::crawler::pagination::page_ceiling;
use crate::crawler::scheduler::CrawlRequest;
use crate::url::{infer_location_filter, SearchParameters, SearchSite};
use crate::Result;
use std::fmt;
use std::time::Duration;

/// Everything a crawl needs that stays fixed for its whole duration
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub site: SearchSite,

    /// Search parameters of the first page
    pub params: SearchParameters,

    /// Free-text location every kept job must match (empty keeps all)
    pub location_filter: String,

    pub results_wanted: u32,

    /// Highest absolute page index that may be fetched
    pub page_ceiling: u32,

    pub min_jobs_per_page: u32,
    pub collect_details: bool,
    pub max_runtime: Duration,
    pub pacing_min: Duration,
    pub pacing_max: Duration,
    pub max_concurrency: usize,
}

impl RunPlan {
    /// Resolves the plan for a configuration
    ///
    /// A `start-url` on the site's listing tree is reused verbatim for
    /// pagination: its `q` replaces the keyword, its `page` becomes the first
    /// page, and its path is searched for a location filter. Any other
    /// `start-url` is ignored with a warning.
    pub fn resolve(config: &Config) -> Result<Self> {
        let site = SearchSite::new(&config.site.base_url, config.search.url_style)?;

        let keyword = config.search.keyword.trim();
        let location = config.search.location.trim();
        let mut params = SearchParameters::new(keyword, location);
        let mut location_filter = location.to_string();

        if let Some(start_url) = config
            .search
            .start_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
        {
            let parsed = site.parse(start_url);
            if parsed.params.direct_url.is_some() {
                if !parsed.params.keyword.is_empty() {
                    params.keyword = parsed.params.keyword.clone();
                }
                params.page = parsed.params.page;
                params.direct_url = parsed.params.direct_url.clone();

                if let Some(inferred) = infer_location_filter(&parsed.path_segments) {
                    location_filter = inferred;
                }
            } else {
                tracing::warn!(
                    "Ignoring start URL {} (not a search URL under {})",
                    start_url,
                    site.base_url()
                );
            }
        }

        let crawler = &config.crawler;
        let results_wanted = crawler.results_wanted.max(1);
        let ceiling = crawler.max_pages.unwrap_or_else(|| {
            page_ceiling(results_wanted, crawler.jobs_per_page, crawler.page_buffer)
        });

        Ok(Self {
            site,
            params,
            location_filter,
            results_wanted,
            page_ceiling: ceiling,
            min_jobs_per_page: crawler.min_jobs_per_page,
            collect_details: crawler.collect_details,
            max_runtime: Duration::from_secs(crawler.max_runtime_secs),
            pacing_min: Duration::from_millis(crawler.pacing_min_ms),
            pacing_max: Duration::from_millis(crawler.pacing_max_ms.max(crawler.pacing_min_ms)),
            max_concurrency: crawler.max_concurrency.max(1) as usize,
        })
    }

    /// Search URL of the given page
    pub fn listing_url(&self, page: u32) -> String {
        self.site.search_url(&self.params.with_page(page))
    }

    /// The request that seeds the frontier
    pub fn first_request(&self) -> CrawlRequest {
        CrawlRequest::listing(self.listing_url(self.params.page), self.params.page)
    }
}

impl fmt::Display for RunPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Keyword:          {:?}", self.params.keyword)?;
        writeln!(f, "Location filter:  {:?}", self.location_filter)?;
        writeln!(f, "Results wanted:   {}", self.results_wanted)?;
        writeln!(f, "Start page:       {}", self.params.page)?;
        writeln!(f, "Page ceiling:     {}", self.page_ceiling)?;
        writeln!(f, "Collect details:  {}", self.collect_details)?;
        writeln!(f, "Concurrency:      {}", self.max_concurrency)?;
        write!(f, "Runtime budget:   {}s", self.max_runtime.as_secs())
    }
}
