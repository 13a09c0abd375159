//! Row-aligned comparison of a normalized table against an expected one.

use approx::relative_eq;
use ivol_core::NormalizedRecord;

/// Mismatches kept for display; the rest are only counted.
const MAX_REPORTED: usize = 20;

/// One differing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMismatch {
    /// Zero-based row position.
    pub row: usize,
    pub column: &'static str,
    pub actual: String,
    pub expected: String,
}

/// Result of comparing two tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDiff {
    pub actual_rows: usize,
    pub expected_rows: usize,
    /// Total differing cells over the common rows.
    pub mismatch_count: usize,
    /// The first few differing cells.
    pub mismatches: Vec<CellMismatch>,
}

impl TableDiff {
    /// Whether the tables are equal.
    pub fn is_match(&self) -> bool {
        self.actual_rows == self.expected_rows && self.mismatch_count == 0
    }

    fn push(&mut self, row: usize, column: &'static str, actual: String, expected: String) {
        self.mismatch_count += 1;
        if self.mismatches.len() < MAX_REPORTED {
            self.mismatches.push(CellMismatch {
                row,
                column,
                actual,
                expected,
            });
        }
    }
}

fn values_match(actual: Option<f64>, expected: Option<f64>, tolerance: f64) -> bool {
    match (actual, expected) {
        (None, None) => true,
        (Some(a), Some(e)) if a.is_nan() && e.is_nan() => true,
        (Some(a), Some(e)) => relative_eq!(a, e, epsilon = tolerance, max_relative = tolerance),
        _ => false,
    }
}

fn show<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Compare two tables row by row. Values match within `tolerance`
/// (absolute or relative).
pub fn diff(actual: &[NormalizedRecord], expected: &[NormalizedRecord], tolerance: f64) -> TableDiff {
    let mut out = TableDiff {
        actual_rows: actual.len(),
        expected_rows: expected.len(),
        ..TableDiff::default()
    };

    for (row, (a, e)) in actual.iter().zip(expected).enumerate() {
        if a.date != e.date {
            out.push(row, "date", a.date.to_string(), e.date.to_string());
        }
        if a.symbol != e.symbol {
            out.push(row, "symbol", a.symbol.clone(), e.symbol.clone());
        }
        if a.source != e.source {
            out.push(row, "source", show(a.source.as_deref()), show(e.source.as_deref()));
        }
        if a.field != e.field {
            out.push(row, "field", a.field.to_string(), e.field.to_string());
        }
        if !values_match(a.value, e.value, tolerance) {
            out.push(row, "value", show(a.value), show(e.value));
        }
    }
    out
}
