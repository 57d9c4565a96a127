//! Canonical job records and the multi-source merge that builds them
//!
//! Each field is resolved from an ordered list of `(source, field)` readers; the
//! first one yielding a non-empty value wins. Priorities are data, so adding a
//! source or reordering one never touches the resolution logic.

use crate::extract::fields::{Field, JobView, PostingView};
use crate::extract::html::{collapse_whitespace, html_to_text};
use crate::extract::CONFIDENTIAL_COMPANY;
use crate::url::SearchSite;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which kind of page a record was finalized from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Listing,
    Detail,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::Listing => "listing",
            RecordSource::Detail => "detail",
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One finalized job, the unit handed to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company: Option<String>,

    /// `"City, State"`
    pub location: Option<String>,
    pub salary: Option<String>,
    pub employment_type: Option<String>,

    /// Plain-text description
    pub description: Option<String>,

    /// Description as published, when a source carried HTML
    pub description_html: Option<String>,
    pub benefits: Option<String>,
    pub date_posted: Option<String>,

    /// Canonical URL rebuilt from `id` and `title`
    pub url: String,
    pub apply_url: String,
    pub source: RecordSource,
    pub fetched_at: DateTime<Utc>,
}

/// Raw payloads available for one job
#[derive(Debug, Clone, Copy)]
pub struct RecordSources<'a> {
    /// Entry from the listing page (always present)
    pub listing: &'a Value,

    /// Job object from the detail page
    pub detail: Option<&'a Value>,

    /// `JobPosting` structured-data object
    pub structured: Option<&'a Value>,

    /// Kind of page the record is finalized from
    pub finalized_from: RecordSource,
}

impl<'a> RecordSources<'a> {
    pub fn listing_only(listing: &'a Value) -> Self {
        Self {
            listing,
            detail: None,
            structured: None,
            finalized_from: RecordSource::Listing,
        }
    }

    /// Sources read from a job's own page
    ///
    /// Either payload may be missing; the record still counts as finalized
    /// from the detail page.
    pub fn detail_page(
        listing: &'a Value,
        detail: Option<&'a Value>,
        structured: Option<&'a Value>,
    ) -> Self {
        Self {
            listing,
            detail,
            structured,
            finalized_from: RecordSource::Detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Listing,
    Detail,
    Structured,
}

type Priority = &'static [(Source, Field)];

const ID: Priority = &[(Source::Listing, Field::Id), (Source::Detail, Field::Id)];

const TITLE: Priority = &[
    (Source::Detail, Field::Title),
    (Source::Structured, Field::Title),
    (Source::Listing, Field::Title),
];

const COMPANY: Priority = &[
    (Source::Detail, Field::Employer),
    (Source::Detail, Field::Advertiser),
    (Source::Structured, Field::Employer),
    (Source::Listing, Field::Employer),
    (Source::Listing, Field::Advertiser),
];

const LOCATION: Priority = &[
    (Source::Detail, Field::Location),
    (Source::Structured, Field::Location),
    (Source::Listing, Field::Location),
];

const SALARY: Priority = &[
    (Source::Structured, Field::Salary),
    (Source::Detail, Field::Salary),
    (Source::Listing, Field::Salary),
];

const EMPLOYMENT_TYPE: Priority = &[
    (Source::Detail, Field::EmploymentType),
    (Source::Structured, Field::EmploymentType),
    (Source::Listing, Field::EmploymentType),
];

const DESCRIPTION_HTML: Priority = &[
    (Source::Detail, Field::Description),
    (Source::Structured, Field::Description),
];

const BENEFITS: Priority = &[(Source::Detail, Field::Benefits)];

const DATE_POSTED: Priority = &[
    (Source::Detail, Field::DatePosted),
    (Source::Structured, Field::DatePosted),
    (Source::Listing, Field::DatePosted),
];

struct Resolver<'a> {
    listing: JobView<'a>,
    detail: Option<JobView<'a>>,
    structured: Option<PostingView<'a>>,
}

impl<'a> Resolver<'a> {
    fn new(sources: &RecordSources<'a>) -> Self {
        Self {
            listing: JobView::new(sources.listing),
            detail: sources.detail.map(JobView::new),
            structured: sources.structured.map(PostingView::new),
        }
    }

    fn read(&self, source: Source, field: Field) -> Option<String> {
        match source {
            Source::Listing => self.listing.get(field),
            Source::Detail => self.detail.as_ref()?.get(field),
            Source::Structured => self.structured.as_ref()?.get(field),
        }
    }

    fn candidates(&self, priority: Priority) -> impl Iterator<Item = String> + '_ {
        priority
            .iter()
            .filter_map(move |(source, field)| self.read(*source, *field))
    }

    fn resolve(&self, priority: Priority) -> Option<String> {
        self.candidates(priority).next()
    }

    /// Like [`Resolver::resolve`], but the confidential sentinel only wins when
    /// no source names a real company
    fn resolve_company(&self) -> Option<String> {
        self.candidates(COMPANY)
            .find(|name| !is_confidential(name))
            .or_else(|| self.resolve(COMPANY))
    }
}

fn is_confidential(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(CONFIDENTIAL_COMPANY)
}

/// Merges the available payloads of one job into a canonical record
///
/// # Arguments
///
/// * `sources` - Listing payload plus the optional detail and structured payloads
/// * `site` - Site used to rebuild the canonical job URL
///
/// # Returns
///
/// * `Some(JobRecord)` - The merged record
/// * `None` - Id or title could not be resolved from any source
pub fn build_record(sources: &RecordSources<'_>, site: &SearchSite) -> Option<JobRecord> {
    let resolver = Resolver::new(sources);

    let id = resolver.resolve(ID)?;
    let title = resolver.resolve(TITLE)?;

    let description_html = resolver.resolve(DESCRIPTION_HTML);
    let description = description_html
        .as_deref()
        .map(html_to_text)
        .filter(|text| !text.is_empty())
        .or_else(|| {
            resolver
                .read(Source::Listing, Field::Description)
                .map(|text| html_to_text(&text))
                .filter(|text| !text.is_empty())
        });

    let url = site.job_url(&id, &title);

    Some(JobRecord {
        company: resolver.resolve_company(),
        location: resolver.resolve(LOCATION).map(|l| collapse_whitespace(&l)),
        salary: resolver.resolve(SALARY),
        employment_type: resolver.resolve(EMPLOYMENT_TYPE),
        description,
        description_html,
        benefits: resolver.resolve(BENEFITS),
        date_posted: resolver.resolve(DATE_POSTED),
        apply_url: url.clone(),
        url,
        id,
        title,
        source: sources.finalized_from,
        fetched_at: Utc::now(),
    })
}

/// Renders a salary range the way the site displays it
///
/// Amounts use `.` as thousands separator and show cents (`,50`) only when
/// they are non-zero. `BRL` (or no currency) is written `R$`; any other
/// currency is prefixed with its code.
///
/// # Examples
///
/// ```
/// use vagas_ripple::extract::format_salary_range;
///
/// assert_eq!(
///     format_salary_range(Some(1000.0), Some(2000.0), Some("BRL")).as_deref(),
///     Some("R$ 1.000 - R$ 2.000")
/// );
/// assert_eq!(format_salary_range(None, Some(1500.5), None).as_deref(), Some("R$ 1.500,50"));
/// assert_eq!(format_salary_range(None, None, None), None);
/// ```
pub fn format_salary_range(min: Option<f64>, max: Option<f64>, currency: Option<&str>) -> Option<String> {
    let valid = |v: f64| v.is_finite() && v >= 0.0;
    let min = min.filter(|v| valid(*v));
    let max = max.filter(|v| valid(*v));

    let symbol = match currency.map(str::trim).filter(|c| !c.is_empty()) {
        None => "R$".to_string(),
        Some(code) if code.eq_ignore_ascii_case("BRL") => "R$".to_string(),
        Some(code) => code.to_uppercase(),
    };
    let amount = |v: f64| format!("{} {}", symbol, format_amount(v));

    match (min, max) {
        (Some(lo), Some(hi)) if (lo - hi).abs() >= 0.005 => {
            Some(format!("{} - {}", amount(lo), amount(hi)))
        }
        (Some(single), _) | (None, Some(single)) => Some(amount(single)),
        (None, None) => None,
    }
}

fn format_amount(value: f64) -> String {
    let cents_total = (value * 100.0).round() as u64;
    let whole = cents_total / 100;
    let cents = cents_total % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if cents > 0 {
        format!("{},{:02}", grouped, cents)
    } else {
        grouped
    }
}
