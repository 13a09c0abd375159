//! CSV writer for the normalized table.

use ivol_core::config::OutputConfig;
use ivol_core::{columns, Error, NormalizedRecord, Result};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Write normalized records as `date,symbol,source,field,value`.
///
/// Null sources and values are written as empty cells.
pub fn write_normalized<W: Write>(
    writer: W,
    records: &[NormalizedRecord],
    config: &OutputConfig,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let to_csv = |e: csv::Error| Error::csv(e.to_string());
    let mut date = String::new();

    wtr.write_record(columns::OUTPUT).map_err(to_csv)?;
    for record in records {
        date.clear();
        write!(date, "{}", record.date.format(&config.date_format)).map_err(|_| {
            Error::config(format!(
                "output.date_format '{}' is not a valid date format",
                config.date_format
            ))
        })?;
        let value = record.value.map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record([
            date.as_str(),
            record.symbol.as_str(),
            record.source.as_deref().unwrap_or_default(),
            record.field.name(),
            value.as_str(),
        ])
        .map_err(to_csv)?;
    }
    wtr.flush()?;
    debug!(rows = records.len(), "wrote normalized records");
    Ok(())
}

/// Write normalized records to a file.
pub fn save_normalized(
    path: impl AsRef<Path>,
    records: &[NormalizedRecord],
    config: &OutputConfig,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        Error::csv(format!("failed to create '{}': {e}", path.display()))
    })?;
    write_normalized(file, records, config)
}
