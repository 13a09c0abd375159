//! RIC parsing.
//!
//! A RIC looks like `<base><moneyness>N<suffix>`, e.g. `1BO50Nc1=R`. The base
//! is two characters, or three when the third one is alphabetic.

use ivol_core::{Error, Result};

/// Marks the end of the moneyness segment.
pub const MONEYNESS_TERMINATOR: char = 'N';

/// Base and moneyness segments of a RIC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicParts {
    /// Instrument base, the join key into the instrument table.
    pub base: String,
    /// Strike offset, kept as text.
    pub moneyness: String,
}

/// Split a RIC into base and moneyness.
///
/// Everything from the first `N` on is ignored. Fails when fewer than three
/// characters remain.
pub fn parse(ric: &str) -> Result<RicParts> {
    let head = match ric.find(MONEYNESS_TERMINATOR) {
        Some(end) => &ric[..end],
        None => ric,
    };

    let (offset, third) = head.char_indices().nth(2).ok_or_else(|| {
        Error::ric_parse(format!("'{ric}' is too short to contain a base segment"))
    })?;

    let split_at = if third.is_alphabetic() {
        offset + third.len_utf8()
    } else {
        offset
    };
    let (base, moneyness) = head.split_at(split_at);

    Ok(RicParts {
        base: base.to_string(),
        moneyness: moneyness.to_string(),
    })
}
