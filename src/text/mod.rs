//! Text normalization module
//!
//! Pure text transforms shared by the URL builder, the location matcher and the
//! record extractor. Nothing here allocates state or performs I/O.

mod normalize;

pub use normalize::{normalize_for_compare, strip_accents, to_slug};
