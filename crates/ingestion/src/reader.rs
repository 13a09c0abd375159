//! CSV readers for the raw feed, the instrument table and normalized output.
//!
//! Columns are located by header name; extra columns are ignored and a
//! missing required column is a schema error. Empty cells and `NaN` read as
//! null. A cell that is present but cannot be coerced is a data error naming
//! the line and the column.

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use ivol_core::config::InputConfig;
use ivol_core::{
    columns, Error, FieldValues, FloatField, Instrument, NormalizedRecord, RawRecord, Result,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Column positions by header name.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    positions: HashMap<String, usize>,
}

impl HeaderMap {
    /// Index a header row. Blank headers (a pandas index column) are skipped.
    pub fn new(headers: &StringRecord) -> Result<Self> {
        let mut positions = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if positions.insert(name.to_string(), i).is_some() {
                return Err(Error::schema(format!("duplicate column '{name}'")));
            }
        }
        Ok(Self { positions })
    }

    /// Position of an optional column.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Position of a required column.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.get(name)
            .ok_or_else(|| Error::schema(format!("missing column '{name}'")))
    }

    /// Position of a required raw column, also accepting its output name
    /// for feeds that were already renamed.
    pub fn require_raw(&self, name: &str) -> Result<usize> {
        self.get(name)
            .or_else(|| columns::renamed(name).and_then(|out| self.get(out)))
            .ok_or_else(|| Error::schema(format!("missing column '{name}'")))
    }
}

/// Parses date cells using the configured formats.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<String>,
}

impl DateParser {
    const DATETIME_FORMATS: [&'static str; 3] =
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn new(formats: &[String]) -> Self {
        Self {
            formats: formats.to_vec(),
        }
    }

    /// Calendar date of a cell; any time of day is dropped.
    pub fn parse(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if let Some(date) = self.parse_date(value) {
            return Some(date);
        }
        if let Some(date) = Self::DATETIME_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
            .map(|dt| dt.date())
        {
            return Some(date);
        }
        let (head, _) = value.split_once(|c: char| c == ' ' || c == 'T')?;
        self.parse_date(head)
    }

    fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        self.formats
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(&InputConfig::default().date_formats)
    }
}

/// One data row with its line number, for error messages.
struct Row<'r> {
    record: &'r StringRecord,
    line: u64,
}

impl<'r> Row<'r> {
    /// Cell text; empty cells and null tokens read as `None`.
    fn text(&self, pos: usize) -> Option<&'r str> {
        match self.record.get(pos).map(str::trim) {
            Some("") | None => None,
            Some(value) if is_nan_token(value) => None,
            Some(value) => Some(value),
        }
    }

    fn string(&self, pos: usize) -> Option<String> {
        self.text(pos).map(str::to_string)
    }

    fn float(&self, pos: usize, column: &str) -> Result<Option<f64>> {
        match self.text(pos) {
            None => Ok(None),
            Some(value) => value.parse::<f64>().map(Some).map_err(|_| {
                Error::data(format!(
                    "line {}, column '{column}': cannot parse '{value}' as a number",
                    self.line
                ))
            }),
        }
    }

    fn date(&self, pos: usize, column: &str, dates: &DateParser) -> Result<Option<NaiveDate>> {
        match self.text(pos) {
            None => Ok(None),
            Some(value) => dates.parse(value).map(Some).ok_or_else(|| {
                Error::data(format!(
                    "line {}, column '{column}': cannot parse '{value}' as a date",
                    self.line
                ))
            }),
        }
    }
}

fn is_nan_token(value: &str) -> bool {
    matches!(value, "NaN" | "nan" | "NAN" | "NaT" | "NA" | "N/A" | "null")
}

fn csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Resolve column positions from the header row, then read every data row.
fn read_rows<R, L, T>(
    reader: R,
    delimiter: u8,
    resolve: impl FnOnce(&HeaderMap) -> Result<L>,
    read: impl Fn(&L, &Row<'_>) -> Result<T>,
) -> Result<Vec<T>>
where
    R: Read,
{
    let mut rdr = csv_reader(reader, delimiter);
    let headers = rdr
        .headers()
        .map_err(|e| Error::csv(format!("failed to read header row: {e}")))?
        .clone();
    let layout = resolve(&HeaderMap::new(&headers)?)?;

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        match rdr.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(Error::csv(e.to_string())),
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push(read(&layout, &Row { record: &record, line })?);
    }
    Ok(rows)
}

/// Positions of the raw feed columns.
#[derive(Debug, Clone, Copy)]
struct RawLayout {
    instrument_name: usize,
    ric: usize,
    trade_date: usize,
    expiration_date: usize,
    term: usize,
    period: usize,
    contributor_short_name: usize,
    values: [usize; FloatField::COUNT],
}

impl RawLayout {
    fn resolve(headers: &HeaderMap) -> Result<Self> {
        let mut values = [0; FloatField::COUNT];
        for field in FloatField::ALL {
            values[field.index()] = headers.require_raw(field.source_column())?;
        }
        Ok(Self {
            instrument_name: headers.require(columns::INSTRUMENT_NAME)?,
            ric: headers.require(columns::RIC)?,
            trade_date: headers.require_raw(columns::TRADE_DATE)?,
            expiration_date: headers.require(columns::EXPIRATION_DATE)?,
            term: headers.require(columns::TERM)?,
            period: headers.require(columns::PERIOD)?,
            contributor_short_name: headers.require(columns::CONTRIBUTOR_SHORT_NAME)?,
            values,
        })
    }

    fn read(&self, row: &Row<'_>, dates: &DateParser) -> Result<RawRecord> {
        let mut values = FieldValues::empty();
        for field in FloatField::ALL {
            values.set(
                field,
                row.float(self.values[field.index()], field.source_column())?,
            );
        }
        Ok(RawRecord {
            instrument_name: row.string(self.instrument_name),
            ric: row.string(self.ric),
            trade_date: row.date(self.trade_date, columns::TRADE_DATE, dates)?,
            expiration_date: row.date(self.expiration_date, columns::EXPIRATION_DATE, dates)?,
            term: row.string(self.term),
            period: row.string(self.period),
            contributor_short_name: row.string(self.contributor_short_name),
            values,
        })
    }
}

/// Read the raw feed.
pub fn read_raw_records<R: Read>(reader: R, config: &InputConfig) -> Result<Vec<RawRecord>> {
    let dates = DateParser::new(&config.date_formats);
    let records = read_rows(reader, config.delimiter, RawLayout::resolve, |layout, row| {
        layout.read(row, &dates)
    })?;
    debug!(rows = records.len(), "read raw records");
    Ok(records)
}

/// Read the raw feed from a file.
pub fn load_raw_records(path: impl AsRef<Path>, config: &InputConfig) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::csv(format!("failed to open '{}': {e}", path.display()))
    })?;
    read_raw_records(file, config)
}

/// Read the instrument reference table.
pub fn read_instruments<R: Read>(reader: R, config: &InputConfig) -> Result<Vec<Instrument>> {
    let resolve = |headers: &HeaderMap| -> Result<(usize, usize, usize)> {
        Ok((
            headers.require(columns::BASE)?,
            headers.require(columns::EXCHANGE)?,
            headers.require(columns::BLOOMBERG_TICKER)?,
        ))
    };
    let instruments = read_rows(
        reader,
        config.delimiter,
        resolve,
        |&(base, exchange, ticker), row| {
            let base = row.string(base).ok_or_else(|| {
                Error::data(format!("line {}, column 'Base': value is empty", row.line))
            })?;
            Ok(Instrument {
                base,
                exchange: row.string(exchange),
                bloomberg_ticker: row.string(ticker),
            })
        },
    )?;
    debug!(rows = instruments.len(), "read instruments");
    Ok(instruments)
}

/// Read the instrument reference table from a file.
pub fn load_instruments(path: impl AsRef<Path>, config: &InputConfig) -> Result<Vec<Instrument>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::csv(format!("failed to open '{}': {e}", path.display()))
    })?;
    read_instruments(file, config)
}

/// Read a normalized table, e.g. a stored expected output.
pub fn read_normalized<R: Read>(reader: R, config: &InputConfig) -> Result<Vec<NormalizedRecord>> {
    let dates = DateParser::new(&config.date_formats);
    let resolve = |headers: &HeaderMap| -> Result<[usize; 5]> {
        let mut positions = [0; 5];
        for (pos, name) in positions.iter_mut().zip(columns::OUTPUT) {
            *pos = headers.require(name)?;
        }
        Ok(positions)
    };
    read_rows(
        reader,
        config.delimiter,
        resolve,
        |&[date, symbol, source, field, value], row| {
            let date = row.date(date, "date", &dates)?.ok_or_else(|| {
                Error::data(format!("line {}, column 'date': value is empty", row.line))
            })?;
            let field = row
                .text(field)
                .ok_or_else(|| {
                    Error::data(format!("line {}, column 'field': value is empty", row.line))
                })?
                .parse::<FloatField>()
                .map_err(|e| Error::data(format!("line {}: {e}", row.line)))?;
            Ok(NormalizedRecord {
                date,
                symbol: row.string(symbol).unwrap_or_default(),
                source: row.string(source),
                field,
                value: row.float(value, "value")?,
            })
        },
    )
}

/// Read a normalized table from a file.
pub fn load_normalized(
    path: impl AsRef<Path>,
    config: &InputConfig,
) -> Result<Vec<NormalizedRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::csv(format!("failed to open '{}': {e}", path.display()))
    })?;
    read_normalized(file, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_HEADER: &str = "User Defined Identifier,Instrument Name,RIC,Trade Date,Trade Time,\
Expiration Date,Period,Term,Risk Free Interest Rate,Open Implied Volatility,\
Last Implied Volatility,High Implied Volatility,Close Implied Volatility,Strike Price,\
Option Premium,General Value6,General Value7,Previous Close Price,Contributor Short Name";

    fn raw_csv(rows: &[&str]) -> String {
        let mut csv = String::from(RAW_HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv
    }

    #[test]
    fn test_read_raw_row() {
        let csv = raw_csv(&[
            "id1,Soybean Oil,1BO50Nc1=R,2020-12-01,16:00:00,2020-12-19,JAN1,,0.0009,0.21,0.22,0.23,0.24,50,1.75,36.4,36.5,1.05,XYZ",
        ]);
        let records = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.ric.as_deref(), Some("1BO50Nc1=R"));
        assert_eq!(r.trade_date, NaiveDate::from_ymd_opt(2020, 12, 1));
        assert_eq!(r.expiration_date, NaiveDate::from_ymd_opt(2020, 12, 19));
        assert_eq!(r.term, None);
        assert_eq!(r.period.as_deref(), Some("JAN1"));
        assert_eq!(r.contributor_short_name.as_deref(), Some("XYZ"));
        assert_eq!(r.values.get(FloatField::Strike), Some(50.0));
        assert_eq!(r.values.get(FloatField::Rate), Some(0.0009));
        assert_eq!(r.values.get(FloatField::PriceClosePrev), Some(1.05));
        assert_eq!(r.values.get(FloatField::UndlPriceLast), Some(36.5));
    }

    #[test]
    fn test_empty_and_nan_cells_are_null() {
        let csv = raw_csv(&[",,1BO50Nc1=R,,,2020-12-19,JAN1,,NaN,,,,,,,,,,"]);
        let records = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap();

        let r = &records[0];
        assert_eq!(r.instrument_name, None);
        assert_eq!(r.trade_date, None);
        assert_eq!(r.contributor_short_name, None);
        assert!(r.values.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_null_tokens_in_text_cells() {
        let csv = raw_csv(&["id1,NaN,1BO50Nc1=R,2020-12-01,,2020-12-19,null,NA,NaN,,,,,,,,,,N/A"]);
        let records = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap();

        let r = &records[0];
        assert_eq!(r.instrument_name, None);
        assert_eq!(r.period, None);
        assert_eq!(r.term, None);
        assert_eq!(r.contributor_short_name, None);
        assert_eq!(r.values.get(FloatField::Rate), None);
        assert_eq!(r.ric.as_deref(), Some("1BO50Nc1=R"));
    }

    #[test]
    fn test_datetime_cells_keep_date() {
        let csv = raw_csv(&[
            "id1,Soybean Oil,1BO50Nc1=R,2020-12-01 00:00:00,,12/19/2020,JAN1,,,,,,,,,,,,XYZ",
        ]);
        let records = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap();
        assert_eq!(records[0].trade_date, NaiveDate::from_ymd_opt(2020, 12, 1));
        assert_eq!(records[0].expiration_date, NaiveDate::from_ymd_opt(2020, 12, 19));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = "Instrument Name,RIC\nSoybean Oil,1BO50Nc1=R";
        let err = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_bad_number_names_line_and_column() {
        let csv = raw_csv(&[
            "id1,Soybean Oil,1BO50Nc1=R,2020-12-01,,2020-12-19,JAN1,,,,,,,abc,,,,,XYZ",
        ]);
        let err = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap_err();
        match err {
            Error::Data(msg) => {
                assert!(msg.contains("line 2"), "{msg}");
                assert!(msg.contains("'Strike Price'"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_date_is_data_error() {
        let csv = raw_csv(&[
            "id1,Soybean Oil,1BO50Nc1=R,yesterday,,2020-12-19,JAN1,,,,,,,,,,,,XYZ",
        ]);
        let err = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Data(ref msg) if msg.contains("'Trade Date'")));
    }

    #[test]
    fn test_renamed_headers_accepted() {
        let csv = RAW_HEADER
            .replace("Trade Date", "date")
            .replace("Strike Price", "STRIKE")
            + "\nid1,Soybean Oil,1BO50Nc1=R,2020-12-01,,2020-12-19,JAN1,,,,,,,50,,,,,XYZ";
        let records = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap();
        assert_eq!(records[0].trade_date, NaiveDate::from_ymd_opt(2020, 12, 1));
        assert_eq!(records[0].values.get(FloatField::Strike), Some(50.0));
    }

    #[test]
    fn test_duplicate_header() {
        let csv = "RIC,RIC\na,b";
        let err = read_raw_records(csv.as_bytes(), &InputConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_read_instruments() {
        let csv = "Base,Exchange,Bloomberg Ticker,Description\n1BO,CME,BO,Soybean Oil\n2XX,,,Unknown";
        let instruments = read_instruments(csv.as_bytes(), &InputConfig::default()).unwrap();

        assert_eq!(instruments.len(), 2);
        assert_eq!(instruments[0], Instrument::new("1BO", "CME", "BO"));
        assert_eq!(instruments[1].exchange, None);
        assert_eq!(instruments[1].bloomberg_ticker, None);
    }

    #[test]
    fn test_read_normalized_with_index_column() {
        let csv = ",date,symbol,source,field,value\n\
0,2020-12-01,FUTURE_VOL_CME_BOF2021_50,XYZ,PRICE_OPEN,0.21\n\
1,2020-12-01,FUTURE_VOL_CME_BOF2021_50,XYZ,PREMIUM,";
        let records = read_normalized(csv.as_bytes(), &InputConfig::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field, FloatField::PriceOpen);
        assert_eq!(records[0].value, Some(0.21));
        assert_eq!(records[1].field, FloatField::Premium);
        assert_eq!(records[1].value, None);
    }

    #[test]
    fn test_date_parser_formats() {
        let parser = DateParser::default();
        let expected = NaiveDate::from_ymd_opt(2020, 10, 19);
        assert_eq!(parser.parse("2020-10-19"), expected);
        assert_eq!(parser.parse("10/19/2020"), expected);
        assert_eq!(parser.parse("19-OCT-2020"), expected);
        assert_eq!(parser.parse("20201019"), expected);
        assert_eq!(parser.parse("2020-10-19T08:30:00"), expected);
        assert_eq!(parser.parse("not a date"), None);
    }
}
