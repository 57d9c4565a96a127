use serde_json::Value;

/// Keys under `props.pageProps` that may hold a job detail payload, in order
const DETAIL_PAYLOAD_KEYS: &[&str] = &["jobAdData", "job", "vaga"];

/// Outcome of looking for the job array of a listing page
#[derive(Debug, Clone, PartialEq)]
pub enum ListingPayload {
    /// The page carries no inline payload at all
    Missing,

    /// The raw job entries, in page order (possibly empty)
    Jobs(Vec<Value>),
}

/// Extracts the job array from a listing page payload
///
/// The jobs live at `props.pageProps.jobSearch.jobSearchResult.data`, which is
/// either the array itself or an object with a `jobs` array. Any other shape
/// is treated as an empty page.
pub fn listing_jobs(next_data: Option<&Value>) -> ListingPayload {
    let next_data = match next_data {
        Some(data) => data,
        None => return ListingPayload::Missing,
    };

    let data = next_data.pointer("/props/pageProps/jobSearch/jobSearchResult/data");
    let jobs = match data {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => other
            .get("jobs")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        None => Vec::new(),
    };

    ListingPayload::Jobs(jobs)
}

/// Extracts the job object from a detail page payload
pub fn find_detail_payload(next_data: &Value) -> Option<Value> {
    let page_props = next_data.pointer("/props/pageProps")?;

    DETAIL_PAYLOAD_KEYS
        .iter()
        .filter_map(|key| page_props.get(*key))
        .find(|candidate| candidate.is_object())
        .cloned()
}

/// Finds the first `JobPosting` object among structured-data blocks
///
/// Objects nested in a `@graph` array are searched too.
pub fn find_job_posting(blocks: &[Value]) -> Option<Value> {
    blocks.iter().find_map(|block| {
        if is_job_posting(block) {
            return Some(block.clone());
        }

        block
            .get("@graph")
            .and_then(Value::as_array)
            .and_then(|graph| graph.iter().find(|item| is_job_posting(item)))
            .cloned()
    })
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "JobPosting",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("JobPosting")),
        _ => false,
    }
}
