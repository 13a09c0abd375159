//! CSV ingestion for the implied-volatility normalizer.
//!
//! This crate handles:
//! - Reading the raw exchange feed and the instrument reference table
//! - Writing the normalized long-format table
//! - Comparing a normalized table against an expected one

pub mod compare;
pub mod reader;
pub mod writer;

pub use compare::{diff, CellMismatch, TableDiff};
pub use reader::{
    load_instruments, load_normalized, load_raw_records, read_instruments, read_normalized,
    read_raw_records, DateParser, HeaderMap,
};
pub use writer::{save_normalized, write_normalized};
