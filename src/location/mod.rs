//! Location filtering module
//!
//! Decides whether the free-text location of a job satisfies a requested
//! location filter. Matching is fuzzy on purpose: the site writes locations as
//! `"City, UF"` while filters arrive as slugs (`sao-paulo-sp`), state-prefixed
//! paths (`sp/sao-paulo`) or plain user input (`São Paulo`).

mod matcher;
mod states;

pub use matcher::matches_location;
pub use states::{ends_with_state_suffix, is_state_abbreviation, STATE_ABBREVIATIONS};
