//! Core types and configuration for the implied-volatility normalizer.
//!
//! This crate provides shared types used across all other crates:
//! - Raw feed, instrument and normalized record types
//! - The float-field set and column-name constants
//! - Configuration structures
//! - Common error types

pub mod columns;
pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, MalformedRowPolicy, PipelineConfig, UnmatchedPolicy};
pub use error::{Error, Result};
pub use types::*;
