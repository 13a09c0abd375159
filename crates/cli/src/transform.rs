use anyhow::{bail, Context, Result};
use ivol_core::Config;
use ivol_ingestion::{diff, load_instruments, load_normalized, load_raw_records, save_normalized};
use ivol_store::TimeSeriesStore;
use ivol_transform::Normalizer;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Transforms slower than this are reported.
const SLOW_TRANSFORM: Duration = Duration::from_secs(1);

pub struct TransformArgs {
    pub raw: PathBuf,
    pub instruments: PathBuf,
    pub output: Option<PathBuf>,
    pub expected: Option<PathBuf>,
    pub tolerance: f64,
    pub duckdb: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub report: bool,
}

pub fn run(args: &TransformArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    config.validate()?;

    let raw = load_raw_records(&args.raw, &config.input)
        .with_context(|| format!("reading {}", args.raw.display()))?;
    let instruments = load_instruments(&args.instruments, &config.input)
        .with_context(|| format!("reading {}", args.instruments.display()))?;
    info!(
        raw_rows = raw.len(),
        instruments = instruments.len(),
        "inputs loaded"
    );

    let normalizer = Normalizer::new(config.pipeline.clone());
    let start = Instant::now();
    let out = normalizer.normalize(&raw, &instruments)?;
    let elapsed = start.elapsed();

    println!(
        "transformed {} rows into {} records in {:.3} ms",
        out.report.input_rows,
        out.records.len(),
        elapsed.as_secs_f64() * 1000.0
    );
    if elapsed > SLOW_TRANSFORM {
        warn!(elapsed_ms = elapsed.as_millis() as u64, "transform exceeded 1s");
    }
    if args.report {
        println!("{}", serde_json::to_string_pretty(&out.report)?);
    }

    if let Some(path) = &args.output {
        save_normalized(path, &out.records, &config.output)?;
        info!(path = %path.display(), "wrote normalized table");
    }

    if let Some(path) = &args.duckdb {
        let mut store = TimeSeriesStore::open(path, &config.store)?;
        let n = store.insert(&out.records)?;
        info!(rows = n, table = store.table(), "loaded into duckdb");
    }

    if let Some(path) = &args.expected {
        let expected = load_normalized(path, &config.input)
            .with_context(|| format!("reading {}", path.display()))?;
        let result = diff(&out.records, &expected, args.tolerance);
        if !result.is_match() {
            for m in &result.mismatches {
                println!(
                    "  row {} {}: got '{}', expected '{}'",
                    m.row, m.column, m.actual, m.expected
                );
            }
            bail!(
                "output differs from {}: {} vs {} rows, {} differing cells",
                path.display(),
                result.actual_rows,
                result.expected_rows,
                result.mismatch_count
            );
        }
        println!("output matches {}", path.display());
    }

    Ok(())
}
