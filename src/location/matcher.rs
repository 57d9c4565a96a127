use crate::location::states::is_state_abbreviation;
use crate::text::normalize_for_compare;

/// Checks if a job's location satisfies the requested location filter
///
/// # Rules
///
/// 1. An empty filter accepts everything
/// 2. A job without a location never matches a non-empty filter
/// 3. Both sides are normalized (lowercase, no accents, no punctuation). Hyphens
///    and slashes in the filter are treated as word separators first, so slugs
///    such as `sao-paulo-sp` and paths such as `sp/sao-paulo` are understood
/// 4. A state abbreviation at the start or end of the filter is dropped, leaving
///    the requested city. A filter made only of a state leaves no city to
///    compare and accepts every located job
/// 5. The job's city is the text before its first comma
/// 6. The cities match if they are equal, if either contains the other, or if
///    their hyphen-joined forms are equal
///
/// Rule 6 is a deliberately permissive heuristic: a short filter such as
/// `"andre"` also matches `"Santo André"`.
///
/// # Examples
///
/// ```
/// use vagas_ripple::location::matches_location;
///
/// assert!(matches_location(Some("São Paulo, SP"), "sao-paulo-sp"));
/// assert!(!matches_location(Some("Rio de Janeiro, RJ"), "sao-paulo"));
/// assert!(!matches_location(None, "sao-paulo"));
/// assert!(matches_location(Some("Campinas, SP"), ""));
/// ```
pub fn matches_location(job_location: Option<&str>, requested: &str) -> bool {
    if requested.trim().is_empty() {
        return true;
    }

    let job_location = match job_location {
        Some(location) if !location.trim().is_empty() => location,
        _ => return false,
    };

    let requested = RequestedPlace::parse(requested);
    let job_norm = normalize_for_compare(job_location);
    let job_city = job_norm
        .split_once(',')
        .map_or(job_norm.as_str(), |(city, _)| city)
        .trim();

    match requested {
        RequestedPlace::Nothing | RequestedPlace::StateOnly => true,
        RequestedPlace::City(city) => cities_match(job_city, &city),
    }
}

/// What a filter asks for after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
enum RequestedPlace {
    /// Filter normalized down to nothing (only punctuation)
    Nothing,
    /// Filter is a bare state abbreviation, no city left to compare
    StateOnly,
    /// Filter names a city, state affixes removed
    City(String),
}

impl RequestedPlace {
    fn parse(requested: &str) -> Self {
        let normalized = normalize_for_compare(&requested.replace(['-', '/'], " "));
        let mut words: Vec<&str> = normalized
            .split(|c: char| c == ' ' || c == ',')
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Self::Nothing;
        }

        if words.len() == 1 && is_state_abbreviation(words[0]) {
            return Self::StateOnly;
        }

        if words.len() > 1 && is_state_abbreviation(words[words.len() - 1]) {
            words.pop();
        }
        if words.len() > 1 && is_state_abbreviation(words[0]) {
            words.remove(0);
        }

        Self::City(words.join(" "))
    }
}

fn cities_match(job_city: &str, requested_city: &str) -> bool {
    if job_city.is_empty() || requested_city.is_empty() {
        return false;
    }

    if job_city == requested_city {
        return true;
    }

    if job_city.contains(requested_city) || requested_city.contains(job_city) {
        return true;
    }

    hyphen_joined(job_city) == hyphen_joined(requested_city)
}

fn hyphen_joined(city: &str) -> String {
    city.split_whitespace().collect::<Vec<_>>().join("-")
}
