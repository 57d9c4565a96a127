use crate::location::{ends_with_state_suffix, is_state_abbreviation};

/// Infers a location filter from the path segments of a direct search URL
///
/// This is a best-effort heuristic; the site does not mark which segment is the
/// location, so the common layouts are recognized by shape:
///
/// | Path | Filter |
/// |------|--------|
/// | `/vagas/sp/sao-jose-dos-campos/` | `sao-jose-dos-campos` |
/// | `/vagas/administrativo/campinas-sp/` | `campinas-sp` (last segment) |
/// | `/vagas/campinas-sp/` | `campinas-sp` (single segment with a state suffix) |
/// | `/vagas/administrativo/` | none |
///
/// A two-segment keyword path such as `/vagas/vendas/externas/` is misread as
/// a location; callers should treat the result as a hint.
///
/// # Examples
///
/// ```
/// use vagas_ripple::url::infer_location_filter;
///
/// let segments = vec!["sp".to_string(), "santos".to_string()];
/// assert_eq!(infer_location_filter(&segments), Some("santos".to_string()));
/// ```
pub fn infer_location_filter(segments: &[String]) -> Option<String> {
    match segments {
        [] => None,
        [only] => ends_with_state_suffix(only).then(|| only.clone()),
        [first, second, ..] if is_state_abbreviation(first) => Some(second.clone()),
        [.., last] => Some(last.clone()),
    }
}
