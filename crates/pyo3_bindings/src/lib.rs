//! PyO3 bindings for the implied-volatility normalizer.
//!
//! Exposes the Rust pipeline to Python:
//! - RIC parsing and month codes
//! - CSV-to-records normalization
//! - CSV-to-CSV normalization

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use ivol_core::config::{InputConfig, OutputConfig};
use ivol_core::{
    Error as RustError, MalformedRowPolicy, NormalizedRecord as RustNormalizedRecord,
    PipelineConfig, UnmatchedPolicy,
};
use ivol_ingestion::{load_instruments, load_raw_records, save_normalized};
use ivol_transform::{Normalized, Normalizer};

fn to_py_err(e: RustError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// One long-format observation.
#[pyclass]
#[derive(Clone)]
pub struct NormalizedRecord {
    /// ISO `YYYY-MM-DD`.
    #[pyo3(get)]
    pub date: String,
    #[pyo3(get)]
    pub symbol: String,
    #[pyo3(get)]
    pub source: Option<String>,
    #[pyo3(get)]
    pub field: String,
    #[pyo3(get)]
    pub value: Option<f64>,
}

#[pymethods]
impl NormalizedRecord {
    fn __repr__(&self) -> String {
        format!(
            "NormalizedRecord(date={}, symbol={}, source={}, field={}, value={})",
            self.date,
            self.symbol,
            self.source.as_deref().unwrap_or("None"),
            self.field,
            self.value.map_or_else(|| "None".to_string(), |v| v.to_string()),
        )
    }
}

impl From<RustNormalizedRecord> for NormalizedRecord {
    fn from(r: RustNormalizedRecord) -> Self {
        NormalizedRecord {
            date: r.date.format("%Y-%m-%d").to_string(),
            symbol: r.symbol,
            source: r.source,
            field: r.field.name().to_string(),
            value: r.value,
        }
    }
}

// ============================================================================
// Python-exposed Engine Classes
// ============================================================================

/// Normalization pipeline over CSV files.
#[pyclass]
pub struct PyNormalizer {
    inner: Normalizer,
    input: InputConfig,
}

impl PyNormalizer {
    fn run(&self, raw_path: &str, instruments_path: &str) -> Result<Normalized, RustError> {
        let raw = load_raw_records(raw_path, &self.input)?;
        let instruments = load_instruments(instruments_path, &self.input)?;
        self.inner.normalize(&raw, &instruments)
    }
}

#[pymethods]
impl PyNormalizer {
    #[new]
    #[pyo3(signature = (symbol_prefix=None, skip_malformed=false, drop_unmatched=false))]
    fn new(symbol_prefix: Option<String>, skip_malformed: bool, drop_unmatched: bool) -> Self {
        let mut config = PipelineConfig::default();
        if let Some(prefix) = symbol_prefix {
            config.symbol_prefix = prefix;
        }
        if skip_malformed {
            config.on_malformed_row = MalformedRowPolicy::Skip;
        }
        if drop_unmatched {
            config.unmatched_instruments = UnmatchedPolicy::Drop;
        }
        PyNormalizer {
            inner: Normalizer::new(config),
            input: InputConfig::default(),
        }
    }

    /// Symbol prefix in use.
    #[getter]
    fn symbol_prefix(&self) -> String {
        self.inner.config().symbol_prefix.clone()
    }

    /// Normalize a raw feed CSV against an instrument CSV.
    fn transform_files(
        &self,
        raw_path: &str,
        instruments_path: &str,
    ) -> PyResult<Vec<NormalizedRecord>> {
        let out = self.run(raw_path, instruments_path).map_err(to_py_err)?;
        Ok(out.records.into_iter().map(|r| r.into()).collect())
    }

    /// Normalize and write the long table to `output_path`. Returns the row count.
    fn transform_files_to_csv(
        &self,
        raw_path: &str,
        instruments_path: &str,
        output_path: &str,
    ) -> PyResult<usize> {
        let out = self.run(raw_path, instruments_path).map_err(to_py_err)?;
        save_normalized(output_path, &out.records, &OutputConfig::default()).map_err(to_py_err)?;
        Ok(out.records.len())
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Split a RIC into `(base, moneyness)`.
#[pyfunction]
fn parse_ric(ric: &str) -> PyResult<(String, String)> {
    let parts = ivol_transform::parse_ric(ric).map_err(to_py_err)?;
    Ok((parts.base, parts.moneyness))
}

/// Futures month code for a three-letter month, if known.
#[pyfunction]
fn month_code(month: &str) -> Option<String> {
    ivol_transform::month_code(month).map(String::from)
}

// ============================================================================
// Module Definition
// ============================================================================

/// Implied-volatility normalizer - Rust pipeline for Python.
#[pymodule]
fn ivol_normalizer(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<NormalizedRecord>()?;
    m.add_class::<PyNormalizer>()?;

    m.add_function(wrap_pyfunction!(parse_ric, m)?)?;
    m.add_function(wrap_pyfunction!(month_code, m)?)?;

    Ok(())
}
