//! Normalization of exchange implied-volatility feeds.
//!
//! This crate handles:
//! - Row validation (contract label, trade date, expiry, instrument name)
//! - RIC parsing into base and moneyness
//! - Instrument enrichment (left join on base)
//! - Contract month code and year derivation
//! - Symbol synthesis
//! - Wide-to-long reshape

pub mod cleaning;
pub mod contract;
pub mod enrich;
pub mod pipeline;
pub mod reshape;
pub mod ric;
pub mod symbol;

pub use cleaning::{clean, CleanedRows, DropReason, DropReport};
pub use contract::{month_code, ContractLabel};
pub use enrich::InstrumentIndex;
pub use pipeline::{transform, Normalized, Normalizer, TransformReport};
pub use ric::{parse as parse_ric, RicParts};
pub use symbol::{synthesize, SymbolParts};
