//! Row validation.
//!
//! Rows that fail a check are dropped, never repaired. Survivors are kept as
//! a selection vector of indices into the caller's slice, so the input is
//! neither copied nor mutated and a dropped row cannot come back.

use chrono::NaiveDate;
use ivol_core::RawRecord;
use serde::Serialize;
use tracing::warn;

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Both `Term` and `Period` are null.
    MissingContract,
    /// `Trade Date` is null.
    MissingTradeDate,
    /// `Expiration Date` is before `Trade Date`.
    Expired,
    /// `Instrument Name` is null.
    MissingInstrumentName,
}

impl DropReason {
    /// Checks in the order they run.
    pub const ALL: [DropReason; 4] = [
        DropReason::MissingContract,
        DropReason::MissingTradeDate,
        DropReason::Expired,
        DropReason::MissingInstrumentName,
    ];

    /// Warning text for this condition.
    pub fn description(self) -> &'static str {
        match self {
            DropReason::MissingContract => "rows with neither 'Term' nor 'Period' found",
            DropReason::MissingTradeDate => "null values found in 'Trade Date'",
            DropReason::Expired => "expired instruments found",
            DropReason::MissingInstrumentName => "null values found in 'Instrument Name'",
        }
    }

    /// Whether `record` fails this check.
    pub fn fails(self, record: &RawRecord) -> bool {
        match self {
            DropReason::MissingContract => contract_label(record).is_none(),
            DropReason::MissingTradeDate => record.trade_date.is_none(),
            DropReason::Expired => is_expired(record),
            DropReason::MissingInstrumentName => record.instrument_name.is_none(),
        }
    }
}

/// Number of rows dropped per condition.
///
/// Each check only sees rows that survived the checks before it, so the
/// counts are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DropReport {
    pub missing_contract: usize,
    pub missing_trade_date: usize,
    pub expired: usize,
    pub missing_instrument_name: usize,
}

impl DropReport {
    /// Rows dropped for `reason`.
    pub fn count(&self, reason: DropReason) -> usize {
        match reason {
            DropReason::MissingContract => self.missing_contract,
            DropReason::MissingTradeDate => self.missing_trade_date,
            DropReason::Expired => self.expired,
            DropReason::MissingInstrumentName => self.missing_instrument_name,
        }
    }

    fn record(&mut self, reason: DropReason, rows: usize) {
        match reason {
            DropReason::MissingContract => self.missing_contract += rows,
            DropReason::MissingTradeDate => self.missing_trade_date += rows,
            DropReason::Expired => self.expired += rows,
            DropReason::MissingInstrumentName => self.missing_instrument_name += rows,
        }
    }

    /// Total rows dropped.
    pub fn total(&self) -> usize {
        DropReason::ALL.iter().map(|&r| self.count(r)).sum()
    }

    /// One message per condition that dropped at least one row.
    pub fn warnings(&self) -> Vec<String> {
        DropReason::ALL
            .iter()
            .filter(|&&r| self.count(r) > 0)
            .map(|&r| format!("{} ({} rows dropped)", r.description(), self.count(r)))
            .collect()
    }
}

/// `Term` if present, otherwise `Period`.
pub fn contract_label(record: &RawRecord) -> Option<&str> {
    record.term.as_deref().or(record.period.as_deref())
}

/// Expired if it expires before the trade date. Rows missing either date are
/// not expired.
pub fn is_expired(record: &RawRecord) -> bool {
    matches!(
        (record.expiration_date, record.trade_date),
        (Some(expiration), Some(trade)) if expiration < trade
    )
}

/// Rows that passed validation, with their trade dates.
#[derive(Debug, Clone)]
pub struct CleanedRows {
    index: Vec<usize>,
    trade_date: Vec<NaiveDate>,
    report: DropReport,
}

impl CleanedRows {
    /// Indices of surviving rows in the input slice, ascending.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Trade date per surviving row.
    pub fn trade_date(&self) -> &[NaiveDate] {
        &self.trade_date
    }

    /// Drop accounting.
    pub fn report(&self) -> &DropReport {
        &self.report
    }

    /// Number of surviving rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether nothing survived.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Keep only the rows whose position in `keep` is true.
    pub fn retain(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.len());
        retain_by(&mut self.index, keep);
        retain_by(&mut self.trade_date, keep);
    }
}

pub(crate) fn retain_by<T>(column: &mut Vec<T>, keep: &[bool]) {
    let mut mask = keep.iter();
    column.retain(|_| mask.next().copied().unwrap_or(false));
}

/// Validate raw rows.
///
/// Checks run in [`DropReason::ALL`] order; each one that drops rows emits a
/// single warning. The survivor set does not depend on the order.
pub fn clean(records: &[RawRecord]) -> CleanedRows {
    let mut alive = vec![true; records.len()];
    let mut report = DropReport::default();

    for reason in DropReason::ALL {
        let mut dropped = 0;
        for (keep, record) in alive.iter_mut().zip(records) {
            if *keep && reason.fails(record) {
                *keep = false;
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(rows = dropped, "{}; dropping rows", reason.description());
        }
        report.record(reason, dropped);
    }

    let survivors = records.len() - report.total();
    let mut index = Vec::with_capacity(survivors);
    let mut trade_date = Vec::with_capacity(survivors);

    for (i, record) in records.iter().enumerate().filter(|(i, _)| alive[*i]) {
        if let Some(date) = record.trade_date {
            index.push(i);
            trade_date.push(date);
        }
    }

    CleanedRows {
        index,
        trade_date,
        report,
    }
}
