use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Implied-volatility normalizer: reshape exchange option-vol feeds into
/// long-format time series.
#[derive(Parser)]
#[command(name = "ivol", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize a raw feed against the instrument reference table
    Transform {
        /// Raw exchange feed CSV
        #[arg(long)]
        raw: PathBuf,

        /// Instrument reference CSV (Base, Exchange, Bloomberg Ticker)
        #[arg(long)]
        instruments: PathBuf,

        /// Write the normalized table here
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Compare the result against this normalized table
        #[arg(long)]
        expected: Option<PathBuf>,

        /// Absolute/relative tolerance for value comparison
        #[arg(long, default_value = "1e-9")]
        tolerance: f64,

        /// Load the result into this DuckDB database
        #[arg(long)]
        duckdb: Option<PathBuf>,

        /// JSON config file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the run report as JSON
        #[arg(long)]
        report: bool,
    },

    /// Split a RIC into base and moneyness
    ParseRic {
        /// RIC code, e.g. 1BO50Nc1=R
        ric: String,
    },
}
