//! Normalization pipeline.
//!
//! Chains the stages: validation, RIC parsing and contract derivation,
//! instrument join, symbol synthesis, reshape. Every stage reads the caller's
//! slices through the selection vector built by validation; nothing is
//! mutated and no row is copied before the reshape.

use ivol_core::{
    Error, Instrument, MalformedRowPolicy, NormalizedRecord, PipelineConfig, RawRecord, Result,
    UnmatchedPolicy,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cleaning::{self, CleanedRows, DropReport};
use crate::contract::{self, ContractLabel};
use crate::enrich::InstrumentIndex;
use crate::reshape::{self, WideRow};
use crate::ric::{self, RicParts};
use crate::symbol::{self, SymbolParts};

/// Accounting for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    /// Rows in the raw table.
    pub input_rows: usize,
    /// Rows dropped by validation.
    pub drops: DropReport,
    /// Rows skipped for a malformed RIC or Period (skip policy only).
    pub malformed_rows: usize,
    /// Rows whose base has no instrument.
    pub unmatched_rows: usize,
    /// Unmatched rows removed (drop policy only).
    pub dropped_unmatched: usize,
    /// Instrument rows ignored because their base repeats.
    pub duplicate_instruments: usize,
    /// Rows that reached the reshape.
    pub surviving_rows: usize,
    /// Rows in the long output.
    pub output_rows: usize,
    /// One message per data-quality condition encountered.
    pub warnings: Vec<String>,
}

/// Pipeline output.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<NormalizedRecord>,
    pub report: TransformReport,
}

/// Per-row values parsed out of `RIC` and `Period`.
#[derive(Debug, Clone)]
struct ParsedRow<'r> {
    ric: RicParts,
    contract: ContractLabel<'r>,
}

fn parse_row(record: &RawRecord) -> Result<ParsedRow<'_>> {
    let ric = record
        .ric
        .as_deref()
        .ok_or_else(|| Error::ric_parse("'RIC' is null"))?;
    Ok(ParsedRow {
        ric: ric::parse(ric)?,
        contract: contract::derive(record.period.as_deref(), record.expiration_date)?,
    })
}

/// Prefix a row-level error with the offending row.
fn at_row(err: Error, row: usize) -> Error {
    match err {
        Error::RicParse(msg) => Error::RicParse(format!("row {row}: {msg}")),
        Error::Period(msg) => Error::Period(format!("row {row}: {msg}")),
        other => other,
    }
}

/// Raw feed to long-format time series.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: PipelineConfig,
}

impl Normalizer {
    /// Create a normalizer.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline over a raw table and the instrument reference table.
    ///
    /// Data-quality problems drop rows and are reported; a malformed RIC or
    /// Period fails the whole call unless the skip policy is configured.
    pub fn normalize(&self, raw: &[RawRecord], instruments: &[Instrument]) -> Result<Normalized> {
        let mut report = TransformReport {
            input_rows: raw.len(),
            ..TransformReport::default()
        };

        let mut cleaned = cleaning::clean(raw);
        report.drops = cleaned.report().clone();
        report.warnings.extend(report.drops.warnings());
        debug!(rows = cleaned.len(), "validation done");

        let mut parsed = self.parse_rows(raw, &mut cleaned, &mut report)?;

        let index = InstrumentIndex::new(instruments);
        debug!(bases = index.len(), "instrument index built");
        if index.is_empty() && !parsed.is_empty() {
            warn!("instrument table is empty; no row can be enriched");
            report.warnings.push("instrument table is empty".to_string());
        }
        report.duplicate_instruments = index.duplicate_keys();
        if index.duplicate_keys() > 0 {
            report.warnings.push(format!(
                "duplicate bases in instrument table ({} rows ignored)",
                index.duplicate_keys()
            ));
        }

        let mut joined = index.join(parsed.iter().map(|p| p.ric.base.as_str()));
        report.unmatched_rows = joined.iter().filter(|i| i.is_none()).count();
        if report.unmatched_rows > 0 {
            warn!(rows = report.unmatched_rows, "bases without a matching instrument");
            report.warnings.push(format!(
                "bases without a matching instrument ({} rows)",
                report.unmatched_rows
            ));
            if self.config.unmatched_instruments == UnmatchedPolicy::Drop {
                let keep: Vec<bool> = joined.iter().map(Option::is_some).collect();
                cleaned.retain(&keep);
                cleaning::retain_by(&mut parsed, &keep);
                joined.retain(Option::is_some);
                report.dropped_unmatched = report.unmatched_rows;
            }
        }
        debug!(rows = cleaned.len(), "instrument join done");

        let wide: Vec<WideRow<'_>> = cleaned
            .index()
            .iter()
            .zip(cleaned.trade_date())
            .zip(parsed.iter().zip(joined.iter().copied()))
            .map(|((&row, &date), (p, instrument))| {
                let record = &raw[row];
                let parts = SymbolParts {
                    exchange: instrument.and_then(|i| i.exchange.as_deref()),
                    ticker: instrument.and_then(|i| i.bloomberg_ticker.as_deref()),
                    month_code: p.contract.month_code,
                    year: p.contract.year,
                    moneyness: &p.ric.moneyness,
                };
                WideRow {
                    date,
                    symbol: symbol::synthesize(&self.config.symbol_prefix, &parts),
                    source: record.contributor_short_name.as_deref(),
                    values: &record.values,
                }
            })
            .collect();

        let records = reshape::melt(&wide);
        report.surviving_rows = wide.len();
        report.output_rows = records.len();

        info!(
            input_rows = report.input_rows,
            surviving_rows = report.surviving_rows,
            output_rows = report.output_rows,
            warnings = report.warnings.len(),
            "transform complete"
        );

        Ok(Normalized { records, report })
    }

    /// Parse RIC and Period for every surviving row, applying the
    /// malformed-row policy.
    fn parse_rows<'r>(
        &self,
        raw: &'r [RawRecord],
        cleaned: &mut CleanedRows,
        report: &mut TransformReport,
    ) -> Result<Vec<ParsedRow<'r>>> {
        let skip = self.config.on_malformed_row == MalformedRowPolicy::Skip;
        let mut parsed = Vec::with_capacity(cleaned.len());
        let mut keep = Vec::with_capacity(cleaned.len());

        for &row in cleaned.index() {
            match parse_row(&raw[row]) {
                Ok(p) => {
                    parsed.push(p);
                    keep.push(true);
                }
                Err(err) if skip && err.is_row_level() => {
                    debug!(row, error = %err, "skipping malformed row");
                    keep.push(false);
                }
                Err(err) => return Err(at_row(err, row)),
            }
        }

        report.malformed_rows = keep.iter().filter(|&&k| !k).count();
        if report.malformed_rows > 0 {
            warn!(rows = report.malformed_rows, "malformed RIC or Period; skipping rows");
            report.warnings.push(format!(
                "malformed RIC or Period ({} rows skipped)",
                report.malformed_rows
            ));
            cleaned.retain(&keep);
        }

        Ok(parsed)
    }
}

/// Normalize with the default configuration.
pub fn transform(raw: &[RawRecord], instruments: &[Instrument]) -> Result<Vec<NormalizedRecord>> {
    Normalizer::default()
        .normalize(raw, instruments)
        .map(|normalized| normalized.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ivol_core::{FieldValues, FloatField};

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn make_record(ric: &str) -> RawRecord {
        let mut values = FieldValues::empty();
        for (i, field) in FloatField::ALL.into_iter().enumerate() {
            values.set(field, Some(i as f64 + 0.5));
        }
        RawRecord {
            instrument_name: Some("Soybean Oil".to_string()),
            ric: Some(ric.to_string()),
            trade_date: date(2020, 12, 1),
            expiration_date: date(2020, 12, 19),
            period: Some("JAN1".to_string()),
            contributor_short_name: Some("XYZ".to_string()),
            values,
            ..RawRecord::default()
        }
    }

    fn instruments() -> Vec<Instrument> {
        vec![Instrument::new("1BO", "CME", "BO")]
    }

    #[test]
    fn test_single_row() {
        let raw = vec![make_record("1BO50Nc1=R")];
        let records = transform(&raw, &instruments()).unwrap();

        assert_eq!(records.len(), FloatField::COUNT);
        assert!(records.iter().all(|r| r.symbol == "FUTURE_VOL_CME_BOF2021_50"));
        assert!(records.iter().all(|r| r.source.as_deref() == Some("XYZ")));
    }

    #[test]
    fn test_short_ric_aborts() {
        let raw = vec![make_record("1BO50Nc1=R"), make_record("1B")];
        let err = transform(&raw, &instruments()).unwrap_err();
        assert!(matches!(err, Error::RicParse(ref msg) if msg.starts_with("row 1:")));
    }

    #[test]
    fn test_null_ric_aborts() {
        let mut record = make_record("1BO50Nc1=R");
        record.ric = None;
        let err = transform(&[record], &instruments()).unwrap_err();
        assert!(matches!(err, Error::RicParse(_)));
    }

    #[test]
    fn test_bad_ric_on_dropped_row_is_ignored() {
        let mut bad = make_record("1B");
        bad.trade_date = None;
        let raw = vec![make_record("1BO50Nc1=R"), bad];
        let records = transform(&raw, &instruments()).unwrap();
        assert_eq!(records.len(), FloatField::COUNT);
    }

    #[test]
    fn test_skip_policy() {
        let config = PipelineConfig {
            on_malformed_row: MalformedRowPolicy::Skip,
            ..PipelineConfig::default()
        };
        let mut bad_period = make_record("1BO60Nc1=R");
        bad_period.period = Some("JAN".to_string());
        let raw = vec![make_record("1B"), make_record("1BO50Nc1=R"), bad_period];

        let out = Normalizer::new(config).normalize(&raw, &instruments()).unwrap();
        assert_eq!(out.report.malformed_rows, 2);
        assert_eq!(out.report.surviving_rows, 1);
        assert_eq!(out.records.len(), FloatField::COUNT);
        assert_eq!(out.records[0].symbol, "FUTURE_VOL_CME_BOF2021_50");
    }

    #[test]
    fn test_unmatched_kept_by_default() {
        let raw = vec![make_record("2XX75Nc1=R")];
        let out = Normalizer::default().normalize(&raw, &instruments()).unwrap();

        assert_eq!(out.report.unmatched_rows, 1);
        assert_eq!(out.report.dropped_unmatched, 0);
        assert_eq!(out.records.len(), FloatField::COUNT);
        assert_eq!(out.records[0].symbol, "FUTURE_VOL__F2021_75");
    }

    #[test]
    fn test_unmatched_drop_policy() {
        let config = PipelineConfig {
            unmatched_instruments: UnmatchedPolicy::Drop,
            ..PipelineConfig::default()
        };
        let raw = vec![make_record("2XX75Nc1=R"), make_record("1BO50Nc1=R")];
        let out = Normalizer::new(config).normalize(&raw, &instruments()).unwrap();

        assert_eq!(out.report.dropped_unmatched, 1);
        assert_eq!(out.report.surviving_rows, 1);
        assert!(out.records.iter().all(|r| r.symbol == "FUTURE_VOL_CME_BOF2021_50"));
    }

    #[test]
    fn test_report_warnings() {
        let mut expired = make_record("1BO50Nc1=R");
        expired.expiration_date = date(2020, 11, 1);
        let mut unnamed = make_record("1BO50Nc1=R");
        unnamed.instrument_name = None;
        let raw = vec![expired, unnamed, make_record("1BO50Nc1=R")];

        let out = Normalizer::default().normalize(&raw, &instruments()).unwrap();
        assert_eq!(out.report.drops.expired, 1);
        assert_eq!(out.report.drops.missing_instrument_name, 1);
        assert_eq!(out.report.warnings.len(), 2);
        assert_eq!(out.report.surviving_rows, 1);
    }

    #[test]
    fn test_duplicate_instruments_reported() {
        let mut reference = instruments();
        reference.push(Instrument::new("1BO", "CBT", "ZL"));
        let raw = vec![make_record("1BO50Nc1=R")];

        let out = Normalizer::default().normalize(&raw, &reference).unwrap();
        assert_eq!(out.report.duplicate_instruments, 1);
        assert_eq!(out.records.len(), FloatField::COUNT);
        assert_eq!(out.records[0].symbol, "FUTURE_VOL_CME_BOF2021_50");
    }

    #[test]
    fn test_empty_instrument_table_warns() {
        let raw = vec![make_record("1BO50Nc1=R")];
        let out = Normalizer::default().normalize(&raw, &[]).unwrap();

        assert_eq!(out.report.unmatched_rows, 1);
        assert!(out
            .report
            .warnings
            .iter()
            .any(|w| w == "instrument table is empty"));
        assert_eq!(out.records[0].symbol, "FUTURE_VOL__F2021_50");
    }

    #[test]
    fn test_custom_prefix() {
        let config = PipelineConfig {
            symbol_prefix: "OPT_VOL_".to_string(),
            ..PipelineConfig::default()
        };
        let raw = vec![make_record("1BO50Nc1=R")];
        let out = Normalizer::new(config).normalize(&raw, &instruments()).unwrap();
        assert_eq!(out.records[0].symbol, "OPT_VOL_CME_BOF2021_50");
    }

    #[test]
    fn test_empty_input() {
        let out = Normalizer::default().normalize(&[], &instruments()).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.report, TransformReport::default());
    }
}
