use unicode_normalization::UnicodeNormalization;

/// Combining diacritical marks block removed after canonical decomposition
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Removes diacritics from a string
///
/// The text is decomposed (NFD) and the combining marks left behind are dropped,
/// so `"São José"` becomes `"Sao Jose"`. Characters without a decomposition are
/// kept as-is.
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !COMBINING_MARKS.contains(c)).collect()
}

/// Converts text into a URL-safe slug
///
/// # Steps
///
/// 1. Lowercase and strip accents
/// 2. Drop every character outside `[a-z0-9]`, whitespace and `-`
/// 3. Collapse runs of whitespace and hyphens into a single `-`
/// 4. Trim leading and trailing hyphens
///
/// The result only contains `[a-z0-9-]`, never starts or ends with a hyphen and
/// never contains `--`, which makes the function idempotent.
///
/// # Examples
///
/// ```
/// use vagas_ripple::text::to_slug;
///
/// assert_eq!(to_slug("São Paulo"), "sao-paulo");
/// assert_eq!(to_slug("  Analista -- de Dados! "), "analista-de-dados");
/// assert_eq!(to_slug(""), "");
/// ```
pub fn to_slug(text: &str) -> String {
    let cleaned: String = strip_accents(&text.to_lowercase())
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalizes text for equality and containment checks
///
/// Lowercases, strips accents and keeps only ASCII letters, digits, spaces and
/// commas, then trims. The output is meant for comparisons only and is never
/// displayed.
///
/// # Examples
///
/// ```
/// use vagas_ripple::text::normalize_for_compare;
///
/// assert_eq!(normalize_for_compare(" São Paulo, SP "), "sao paulo, sp");
/// ```
pub fn normalize_for_compare(text: &str) -> String {
    strip_accents(&text.to_lowercase())
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == ',')
        .collect::<String>()
        .trim()
        .to_string()
}
