//! URL handling module for Vagas-Ripple
//!
//! This module builds search and pagination URLs from keyword/location/page
//! parameters, parses user-supplied search URLs back into those parameters, and
//! infers a location filter from the path of a direct search URL.

mod infer;
mod search;

pub use infer::infer_location_filter;
pub use search::{build_search_url, parse_search_url, ParsedSearchUrl, SearchSite};

use serde::Deserialize;

/// Default listing root of the job board
pub const DEFAULT_BASE_URL: &str = "https://www.catho.com.br/vagas/";

/// Parameters of one search request
///
/// Everything except `page` stays fixed for the whole run; `page` only grows as
/// pagination proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    /// Free-text keyword (not slugified)
    pub keyword: String,

    /// Free-text location (not slugified)
    pub location: String,

    /// 1-based page index
    pub page: u32,

    /// User-supplied search URL, reused verbatim for pagination
    pub direct_url: Option<String>,
}

impl SearchParameters {
    /// Creates parameters for a keyword/location search starting at page 1
    pub fn new(keyword: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            location: location.into(),
            page: 1,
            direct_url: None,
        }
    }

    /// Returns a copy of these parameters pointing at another page
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// How keyword and location are encoded in generated search URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchUrlStyle {
    /// `/vagas/<keyword>/<location>/?page=N`
    #[default]
    Path,
    /// `/vagas/?q=<keyword>&l=<location>&page=N`
    Query,
}
