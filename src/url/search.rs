use crate::text::to_slug;
use crate::url::{SearchParameters, SearchUrlStyle, DEFAULT_BASE_URL};
use url::{form_urlencoded, Url};

/// Host and listing path of the job board, plus the URL style to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSite {
    /// Listing root, always ending with `/`
    base_url: String,

    /// Host without a leading `www.`
    host: String,

    /// Path of the listing root, always ending with `/`
    base_path: String,

    style: SearchUrlStyle,
}

/// Result of parsing a user-supplied search URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSearchUrl {
    /// Parameters recovered from the query string
    pub params: SearchParameters,

    /// Path segments below the listing root, kept as-is for location inference
    pub path_segments: Vec<String>,
}

impl Default for SearchSite {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            host: "catho.com.br".to_string(),
            base_path: "/vagas/".to_string(),
            style: SearchUrlStyle::Path,
        }
    }
}

impl SearchSite {
    /// Creates a site description from its listing root URL
    ///
    /// Query and fragment of `base_url` are discarded and a trailing slash is
    /// added to the path when missing.
    pub fn new(base_url: &str, style: SearchUrlStyle) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(base_url.trim())?;
        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let host = url
            .host_str()
            .ok_or(url::ParseError::EmptyHost)?
            .to_lowercase();

        Ok(Self {
            base_url: url.to_string(),
            host: strip_www(&host).to_string(),
            base_path: url.path().to_string(),
            style,
        })
    }

    /// Listing root URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the search URL for the given parameters
    ///
    /// A direct URL, when present, wins: its query string and trailing slashes
    /// are removed and only a `page` parameter is appended (for pages above 1).
    /// Otherwise the URL is composed from the slugified keyword and location:
    ///
    /// | keyword | location | path |
    /// |---------|----------|------|
    /// | yes | yes | `<base>/<keyword>/<location>/` |
    /// | yes | no | `<base>/<keyword>/` |
    /// | no | yes | `<base>/<location>/` |
    /// | no | no | `<base>/` |
    ///
    /// With [`SearchUrlStyle::Query`] the raw keyword and location travel as the
    /// `q` and `l` query parameters instead.
    pub fn search_url(&self, params: &SearchParameters) -> String {
        if let Some(direct) = params
            .direct_url
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            let without_query = direct
                .split(['?', '#'])
                .next()
                .unwrap_or(direct)
                .trim_end_matches('/');
            return with_page(format!("{}/", without_query), params.page);
        }

        match self.style {
            SearchUrlStyle::Path => {
                let keyword = to_slug(&params.keyword);
                let location = to_slug(&params.location);

                let mut url = self.base_url.clone();
                for slug in [keyword, location] {
                    if !slug.is_empty() {
                        url.push_str(&slug);
                        url.push('/');
                    }
                }
                with_page(url, params.page)
            }
            SearchUrlStyle::Query => {
                let mut query = form_urlencoded::Serializer::new(String::new());
                let keyword = params.keyword.trim();
                let location = params.location.trim();
                if !keyword.is_empty() {
                    query.append_pair("q", keyword);
                }
                if !location.is_empty() {
                    query.append_pair("l", location);
                }
                if params.page > 1 {
                    query.append_pair("page", &params.page.to_string());
                }

                let query = query.finish();
                if query.is_empty() {
                    self.base_url.clone()
                } else {
                    format!("{}?{}", self.base_url, query)
                }
            }
        }
    }

    /// Builds the canonical URL of a job from its id and title
    ///
    /// Upstream URLs are never trusted; this is the only source of job URLs.
    pub fn job_url(&self, id: &str, title: &str) -> String {
        let slug = to_slug(title);
        let slug = if slug.is_empty() { "vaga".to_string() } else { slug };
        format!("{}{}/{}/", self.base_url, slug, id.trim())
    }

    /// Returns true if `url` points at this site's listing tree
    pub fn is_search_url(&self, url: &Url) -> bool {
        let host_matches = url
            .host_str()
            .map(|h| strip_www(&h.to_lowercase()) == self.host)
            .unwrap_or(false);

        host_matches && self.relative_path(url.path()).is_some()
    }

    /// Parses a search URL back into parameters
    ///
    /// The page comes from the `page` query parameter (default 1), the keyword
    /// from `q` and the location from `l`. Keyword and location are never
    /// inferred from the path; path segments are returned untouched for
    /// [`crate::url::infer_location_filter`]. A URL on this site becomes the
    /// direct URL of the returned parameters.
    ///
    /// Malformed URLs yield the default parameter set instead of an error.
    pub fn parse(&self, url_str: &str) -> ParsedSearchUrl {
        let url = match Url::parse(url_str.trim()) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Ignoring malformed search URL {:?}: {}", url_str, e);
                return ParsedSearchUrl::default();
            }
        };

        let mut params = SearchParameters::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "q" => params.keyword = value.trim().to_string(),
                "l" => params.location = value.trim().to_string(),
                "page" => {
                    params.page = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|p| *p >= 1)
                        .unwrap_or(1)
                }
                _ => {}
            }
        }

        if !self.is_search_url(&url) {
            return ParsedSearchUrl {
                params,
                path_segments: Vec::new(),
            };
        }

        params.direct_url = Some(url_str.trim().to_string());
        let path_segments = self
            .relative_path(url.path())
            .map(|rest| {
                rest.split('/')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        ParsedSearchUrl {
            params,
            path_segments,
        }
    }

    /// Returns the part of `path` below the listing root, if it is below it
    fn relative_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        let root = self.base_path.trim_end_matches('/');
        let rest = path.strip_prefix(root)?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

/// Builds a search URL with the default site settings
///
/// # Examples
///
/// ```
/// use vagas_ripple::url::{build_search_url, SearchParameters};
///
/// let params = SearchParameters::new("Analista de Dados", "São Paulo SP").with_page(2);
/// assert_eq!(
///     build_search_url(&params),
///     "https://www.catho.com.br/vagas/analista-de-dados/sao-paulo-sp/?page=2"
/// );
/// ```
pub fn build_search_url(params: &SearchParameters) -> String {
    SearchSite::default().search_url(params)
}

/// Parses a search URL with the default site settings
pub fn parse_search_url(url: &str) -> ParsedSearchUrl {
    SearchSite::default().parse(url)
}

fn with_page(url: String, page: u32) -> String {
    if page > 1 {
        format!("{}?page={}", url, page)
    } else {
        url
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
