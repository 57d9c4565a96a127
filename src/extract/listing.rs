use crate::extract::fields::{Field, JobView};
use serde_json::Value;

/// Listing-level skeleton of one job
///
/// Carries just enough to deduplicate and filter the job, plus the raw payload
/// needed to build the final record later.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingJob {
    /// Site identifier, stringified
    pub id: String,

    pub title: String,

    /// Resolved `"City, State"` location, if the payload has one
    pub location: Option<String>,

    /// The raw listing payload
    pub payload: Value,
}

/// Parses one raw listing entry
///
/// Returns `None` when the entry lacks an id or a title; such entries are
/// parse failures and never become records.
pub fn parse_listing_job(raw: &Value) -> Option<ListingJob> {
    let view = JobView::new(raw);
    let id = view.get(Field::Id)?;
    let title = view.get(Field::Title)?;

    Some(ListingJob {
        id,
        title,
        location: view.get(Field::Location),
        payload: raw.clone(),
    })
}
