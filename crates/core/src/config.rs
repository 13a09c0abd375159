//! Configuration structures for the normalizer.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Normalization pipeline configuration.
    pub pipeline: PipelineConfig,
    /// CSV input configuration.
    pub input: InputConfig,
    /// CSV output configuration.
    pub output: OutputConfig,
    /// Time-series store configuration.
    pub store: StoreConfig,
}

impl Config {
    /// Parse a configuration from a JSON document.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check values that serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.input.date_formats.is_empty() {
            return Err(Error::config("input.date_formats must not be empty"));
        }
        for format in &self.input.date_formats {
            if !is_date_format(format) {
                return Err(Error::config(format!(
                    "input.date_formats: '{format}' is not a valid date format"
                )));
            }
        }
        if !is_date_format(&self.output.date_format) {
            return Err(Error::config(format!(
                "output.date_format '{}' is not a valid date format",
                self.output.date_format
            )));
        }
        if !is_sql_identifier(&self.store.table) {
            return Err(Error::config(format!(
                "store.table '{}' is not a plain SQL identifier",
                self.store.table
            )));
        }
        Ok(())
    }
}

/// What to do with a surviving row whose RIC or Period cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Fail the whole transform.
    #[default]
    Abort,
    /// Drop the row with a warning and continue.
    Skip,
}

/// What to do with rows whose base has no entry in the instrument table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Keep the row; exchange and ticker stay null.
    #[default]
    Keep,
    /// Drop the row with a warning.
    Drop,
}

/// Normalization pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Literal prefix of every synthesized symbol.
    pub symbol_prefix: String,
    /// Policy for rows with a malformed RIC or Period.
    pub on_malformed_row: MalformedRowPolicy,
    /// Policy for rows without a matching instrument.
    pub unmatched_instruments: UnmatchedPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbol_prefix: "FUTURE_VOL_".to_string(),
            on_malformed_row: MalformedRowPolicy::Abort,
            unmatched_instruments: UnmatchedPolicy::Keep,
        }
    }
}

/// CSV input configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Accepted date formats (chrono syntax), tried in order.
    pub date_formats: Vec<String>,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%m/%d/%Y".to_string(),
                "%d-%b-%Y".to_string(),
                "%Y%m%d".to_string(),
            ],
            delimiter: b',',
        }
    }
}

/// CSV output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Date format for the `date` column.
    pub date_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Time-series store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Destination table name.
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: "future_vol".to_string(),
        }
    }
}

/// True for names made of ASCII letters, digits and underscores that do not
/// start with a digit.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True when every specifier in `format` is one chrono understands.
pub fn is_date_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}
