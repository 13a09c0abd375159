//! Symbol synthesis.
//!
//! `<prefix><exchange>_<ticker><month_code><year>_<moneyness>`, with every
//! null component rendered as an empty string.

/// Components of a symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolParts<'a> {
    pub exchange: Option<&'a str>,
    pub ticker: Option<&'a str>,
    pub month_code: Option<char>,
    pub year: Option<i32>,
    pub moneyness: &'a str,
}

/// Build a symbol, e.g. `FUTURE_VOL_CME_BOF2021_50`.
pub fn synthesize(prefix: &str, parts: &SymbolParts<'_>) -> String {
    let exchange = parts.exchange.unwrap_or_default();
    let ticker = parts.ticker.unwrap_or_default();

    let mut symbol = String::with_capacity(
        prefix.len() + exchange.len() + ticker.len() + parts.moneyness.len() + 8,
    );
    symbol.push_str(prefix);
    symbol.push_str(exchange);
    symbol.push('_');
    symbol.push_str(ticker);
    if let Some(code) = parts.month_code {
        symbol.push(code);
    }
    if let Some(year) = parts.year {
        symbol.push_str(&year.to_string());
    }
    symbol.push('_');
    symbol.push_str(parts.moneyness);
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "FUTURE_VOL_";

    #[test]
    fn test_full_symbol() {
        let parts = SymbolParts {
            exchange: Some("CME"),
            ticker: Some("BO"),
            month_code: Some('F'),
            year: Some(2021),
            moneyness: "50",
        };
        assert_eq!(synthesize(PREFIX, &parts), "FUTURE_VOL_CME_BOF2021_50");
    }

    #[test]
    fn test_single_char_ticker() {
        let parts = SymbolParts {
            exchange: Some("CBT"),
            ticker: Some("C"),
            month_code: Some('H'),
            year: Some(2022),
            moneyness: "425",
        };
        assert_eq!(synthesize(PREFIX, &parts), "FUTURE_VOL_CBT_CH2022_425");
    }

    #[test]
    fn test_nulls_render_empty() {
        let parts = SymbolParts {
            moneyness: "50",
            ..SymbolParts::default()
        };
        assert_eq!(synthesize(PREFIX, &parts), "FUTURE_VOL___50");

        let parts = SymbolParts {
            exchange: Some("CME"),
            ticker: Some("BO"),
            month_code: None,
            year: Some(2021),
            moneyness: "",
        };
        assert_eq!(synthesize(PREFIX, &parts), "FUTURE_VOL_CME_BO2021_");
    }

    #[test]
    fn test_custom_prefix() {
        let parts = SymbolParts {
            exchange: Some("ICE"),
            ticker: Some("KC"),
            month_code: Some('Z'),
            year: Some(2023),
            moneyness: "110",
        };
        assert_eq!(synthesize("VOL:", &parts), "VOL:ICE_KCZ2023_110");
    }
}
