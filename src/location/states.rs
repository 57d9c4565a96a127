/// Two-letter abbreviations of the 27 Brazilian federative units
pub const STATE_ABBREVIATIONS: &[&str] = &[
    "sp", "rj", "mg", "ba", "pr", "rs", "sc", "go", "df", "ce", "pe", "pa", "ma", "mt", "ms", "es",
    "pb", "rn", "al", "se", "pi", "am", "ro", "ac", "ap", "rr", "to",
];

/// Returns true if `token` is a state abbreviation (case-insensitive)
pub fn is_state_abbreviation(token: &str) -> bool {
    token.len() == 2
        && STATE_ABBREVIATIONS
            .iter()
            .any(|uf| uf.eq_ignore_ascii_case(token))
}

/// Returns true if a slug ends in `-<uf>`, e.g. `"campinas-sp"`
pub fn ends_with_state_suffix(segment: &str) -> bool {
    match segment.rsplit_once('-') {
        Some((head, tail)) => !head.is_empty() && is_state_abbreviation(tail),
        None => false,
    }
}
