//! Instrument enrichment (left join on base).

use ivol_core::Instrument;
use std::collections::HashMap;
use tracing::warn;

/// Lookup of reference instruments by base.
///
/// When the reference table repeats a base, the first row wins so that every
/// raw row still joins to at most one instrument.
#[derive(Debug)]
pub struct InstrumentIndex<'a> {
    by_base: HashMap<&'a str, &'a Instrument>,
    duplicate_keys: usize,
}

impl<'a> InstrumentIndex<'a> {
    /// Index a reference table.
    pub fn new(instruments: &'a [Instrument]) -> Self {
        let mut by_base = HashMap::with_capacity(instruments.len());
        let mut duplicate_keys = 0;

        for instrument in instruments {
            if by_base.contains_key(instrument.base.as_str()) {
                duplicate_keys += 1;
            } else {
                by_base.insert(instrument.base.as_str(), instrument);
            }
        }

        if duplicate_keys > 0 {
            warn!(
                rows = duplicate_keys,
                "duplicate bases in instrument table; keeping the first row for each"
            );
        }

        Self {
            by_base,
            duplicate_keys,
        }
    }

    /// Instrument for `base`, if any.
    #[inline]
    pub fn get(&self, base: &str) -> Option<&'a Instrument> {
        self.by_base.get(base).copied()
    }

    /// Reference rows ignored because their base was already indexed.
    pub fn duplicate_keys(&self) -> usize {
        self.duplicate_keys
    }

    /// Number of distinct bases.
    pub fn len(&self) -> usize {
        self.by_base.len()
    }

    /// Whether the reference table was empty.
    pub fn is_empty(&self) -> bool {
        self.by_base.is_empty()
    }

    /// Join each base to its instrument; unmatched bases map to `None`.
    pub fn join<'b, I>(&self, bases: I) -> Vec<Option<&'a Instrument>>
    where
        I: IntoIterator<Item = &'b str>,
    {
        bases.into_iter().map(|base| self.get(base)).collect()
    }
}
