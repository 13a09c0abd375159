//! Column headers of the exchange feed and the instrument reference table.

pub const INSTRUMENT_NAME: &str = "Instrument Name";
pub const RIC: &str = "RIC";
pub const TRADE_DATE: &str = "Trade Date";
pub const EXPIRATION_DATE: &str = "Expiration Date";
pub const PERIOD: &str = "Period";
pub const TERM: &str = "Term";
pub const CONTRIBUTOR_SHORT_NAME: &str = "Contributor Short Name";
pub const EXCHANGE: &str = "Exchange";
pub const BLOOMBERG_TICKER: &str = "Bloomberg Ticker";
pub const BASE: &str = "Base";

pub const RISK_FREE_INTEREST_RATE: &str = "Risk Free Interest Rate";
pub const OPEN_IMPLIED_VOLATILITY: &str = "Open Implied Volatility";
pub const LAST_IMPLIED_VOLATILITY: &str = "Last Implied Volatility";
pub const HIGH_IMPLIED_VOLATILITY: &str = "High Implied Volatility";
pub const PREVIOUS_CLOSE_PRICE: &str = "Previous Close Price";
pub const CLOSE_IMPLIED_VOLATILITY: &str = "Close Implied Volatility";
pub const STRIKE_PRICE: &str = "Strike Price";
pub const OPTION_PREMIUM: &str = "Option Premium";
pub const GENERAL_VALUE6: &str = "General Value6";
pub const GENERAL_VALUE7: &str = "General Value7";

/// Output column names, in order.
pub const OUTPUT: [&str; 5] = ["date", "symbol", "source", "field", "value"];

/// Raw header to output name.
pub const RENAMES: [(&str, &str); 11] = [
    (TRADE_DATE, "date"),
    (RISK_FREE_INTEREST_RATE, "RATE"),
    (OPEN_IMPLIED_VOLATILITY, "PRICE_OPEN"),
    (LAST_IMPLIED_VOLATILITY, "PRICE_LAST"),
    (HIGH_IMPLIED_VOLATILITY, "PRICE_HIGH"),
    (PREVIOUS_CLOSE_PRICE, "PRICE_CLOSE_PREV"),
    (CLOSE_IMPLIED_VOLATILITY, "IMPLIEDVOL_BLACK"),
    (STRIKE_PRICE, "STRIKE"),
    (OPTION_PREMIUM, "PREMIUM"),
    (GENERAL_VALUE6, "UNDL_PRICE_SETTLE"),
    (GENERAL_VALUE7, "UNDL_PRICE_LAST"),
];

/// Output name for a raw header, if it is renamed.
pub fn renamed(header: &str) -> Option<&'static str> {
    RENAMES
        .iter()
        .find(|(from, _)| *from == header)
        .map(|(_, to)| *to)
}
