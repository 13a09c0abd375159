//! Core data types for the normalizer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::columns;
use crate::error::Error;

/// One of the ten float fields carried by every observation.
///
/// Variant order is the declaration order of the output: every surviving
/// row emits its fields in exactly this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum FloatField {
    #[serde(rename = "PRICE_OPEN")]
    PriceOpen = 0,
    #[serde(rename = "PRICE_LAST")]
    PriceLast = 1,
    #[serde(rename = "PRICE_HIGH")]
    PriceHigh = 2,
    #[serde(rename = "PRICE_CLOSE_PREV")]
    PriceClosePrev = 3,
    #[serde(rename = "IMPLIEDVOL_BLACK")]
    ImpliedVolBlack = 4,
    #[serde(rename = "PREMIUM")]
    Premium = 5,
    #[serde(rename = "RATE")]
    Rate = 6,
    #[serde(rename = "STRIKE")]
    Strike = 7,
    #[serde(rename = "UNDL_PRICE_SETTLE")]
    UndlPriceSettle = 8,
    #[serde(rename = "UNDL_PRICE_LAST")]
    UndlPriceLast = 9,
}

impl FloatField {
    /// Number of float fields.
    pub const COUNT: usize = 10;

    /// All fields in declaration order.
    pub const ALL: [FloatField; FloatField::COUNT] = [
        FloatField::PriceOpen,
        FloatField::PriceLast,
        FloatField::PriceHigh,
        FloatField::PriceClosePrev,
        FloatField::ImpliedVolBlack,
        FloatField::Premium,
        FloatField::Rate,
        FloatField::Strike,
        FloatField::UndlPriceSettle,
        FloatField::UndlPriceLast,
    ];

    /// Position in declaration order.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical output name.
    pub fn name(self) -> &'static str {
        match self {
            FloatField::PriceOpen => "PRICE_OPEN",
            FloatField::PriceLast => "PRICE_LAST",
            FloatField::PriceHigh => "PRICE_HIGH",
            FloatField::PriceClosePrev => "PRICE_CLOSE_PREV",
            FloatField::ImpliedVolBlack => "IMPLIEDVOL_BLACK",
            FloatField::Premium => "PREMIUM",
            FloatField::Rate => "RATE",
            FloatField::Strike => "STRIKE",
            FloatField::UndlPriceSettle => "UNDL_PRICE_SETTLE",
            FloatField::UndlPriceLast => "UNDL_PRICE_LAST",
        }
    }

    /// Header of the raw feed column this field is read from.
    pub fn source_column(self) -> &'static str {
        match self {
            FloatField::PriceOpen => columns::OPEN_IMPLIED_VOLATILITY,
            FloatField::PriceLast => columns::LAST_IMPLIED_VOLATILITY,
            FloatField::PriceHigh => columns::HIGH_IMPLIED_VOLATILITY,
            FloatField::PriceClosePrev => columns::PREVIOUS_CLOSE_PRICE,
            FloatField::ImpliedVolBlack => columns::CLOSE_IMPLIED_VOLATILITY,
            FloatField::Premium => columns::OPTION_PREMIUM,
            FloatField::Rate => columns::RISK_FREE_INTEREST_RATE,
            FloatField::Strike => columns::STRIKE_PRICE,
            FloatField::UndlPriceSettle => columns::GENERAL_VALUE6,
            FloatField::UndlPriceLast => columns::GENERAL_VALUE7,
        }
    }

    /// Look up a field by its canonical output name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for FloatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FloatField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::data(format!("unknown float field '{s}'")))
    }
}

/// The ten nullable float values of one observation, indexed by [`FloatField`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValues([Option<f64>; FloatField::COUNT]);

impl FieldValues {
    /// All fields null.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from values given in declaration order.
    pub fn from_array(values: [Option<f64>; FloatField::COUNT]) -> Self {
        Self(values)
    }

    /// Get a field value.
    #[inline]
    pub fn get(&self, field: FloatField) -> Option<f64> {
        self.0[field.index()]
    }

    /// Set a field value.
    #[inline]
    pub fn set(&mut self, field: FloatField, value: Option<f64>) {
        self.0[field.index()] = value;
    }

    /// Iterate `(field, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FloatField, Option<f64>)> + '_ {
        FloatField::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

impl Index<FloatField> for FieldValues {
    type Output = Option<f64>;

    fn index(&self, field: FloatField) -> &Self::Output {
        &self.0[field.index()]
    }
}

impl IndexMut<FloatField> for FieldValues {
    fn index_mut(&mut self, field: FloatField) -> &mut Self::Output {
        &mut self.0[field.index()]
    }
}

/// One row of the raw exchange feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub instrument_name: Option<String>,
    /// Exchange instrument code, `<base><moneyness>[N...]`.
    pub ric: Option<String>,
    pub trade_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub term: Option<String>,
    /// Month abbreviation plus decade digit, e.g. `JAN1`.
    pub period: Option<String>,
    pub contributor_short_name: Option<String>,
    pub values: FieldValues,
}

/// One row of the traded-instruments reference table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Join key (RIC base, e.g. `1BO`).
    pub base: String,
    pub exchange: Option<String>,
    pub bloomberg_ticker: Option<String>,
}

impl Instrument {
    /// Create an instrument with exchange and ticker set.
    pub fn new(base: impl Into<String>, exchange: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            exchange: Some(exchange.into()),
            bloomberg_ticker: Some(ticker.into()),
        }
    }
}

/// One row of the long-format output.
///
/// Field order matches the output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub symbol: String,
    /// Contributor short name.
    pub source: Option<String>,
    pub field: FloatField,
    pub value: Option<f64>,
}
