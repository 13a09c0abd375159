//! Contract month and year derivation.
//!
//! `Period` carries a month abbreviation and the last digit of the contract
//! year (`JAN1`). The year comes from the expiration date, bumped by one when
//! its last digit disagrees with the period's: a January 2021 contract can
//! expire on 2020-12-19.

use chrono::{Datelike, NaiveDate};
use ivol_core::{Error, Result};

/// Month abbreviations, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Futures month codes, aligned with [`MONTH_NAMES`].
pub const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Futures month code for a month abbreviation.
pub fn month_code(month: &str) -> Option<char> {
    MONTH_NAMES
        .iter()
        .position(|&name| name == month)
        .map(|i| MONTH_CODES[i])
}

/// Add one to `year` when its last digit differs from `check_digit`.
pub fn reconcile_year(year: i32, check_digit: u32) -> i32 {
    if year.rem_euclid(10) as u32 != check_digit {
        year + 1
    } else {
        year
    }
}

/// Month and year attached to a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractLabel<'a> {
    /// First three characters of the period.
    pub month: &'a str,
    /// `None` when `month` is not a known abbreviation.
    pub month_code: Option<char>,
    /// `None` when the expiration date is null.
    pub year: Option<i32>,
}

/// Derive the contract label from a period and an expiration date.
pub fn derive(period: Option<&str>, expiration: Option<NaiveDate>) -> Result<ContractLabel<'_>> {
    let period = period.ok_or_else(|| Error::period("'Period' is null"))?;

    let check_digit = period
        .chars()
        .next_back()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| {
            Error::period(format!("'{period}' does not end with a decade digit"))
        })?;

    let month = match period.char_indices().nth(3) {
        Some((end, _)) => &period[..end],
        None => period,
    };

    Ok(ContractLabel {
        month,
        month_code: month_code(month),
        year: expiration.map(|date| reconcile_year(date.year(), check_digit)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_month_codes() {
        let expected = [
            ("JAN", 'F'),
            ("FEB", 'G'),
            ("MAR", 'H'),
            ("APR", 'J'),
            ("MAY", 'K'),
            ("JUN", 'M'),
            ("JUL", 'N'),
            ("AUG", 'Q'),
            ("SEP", 'U'),
            ("OCT", 'V'),
            ("NOV", 'X'),
            ("DEC", 'Z'),
        ];
        for (month, code) in expected {
            assert_eq!(month_code(month), Some(code));
        }
        assert_eq!(month_code("jan"), None);
        assert_eq!(month_code("XYZ"), None);
    }

    #[test]
    fn test_year_rolls_forward() {
        let label = derive(Some("JAN1"), date(2020, 12, 19)).unwrap();
        assert_eq!(label.month, "JAN");
        assert_eq!(label.month_code, Some('F'));
        assert_eq!(label.year, Some(2021));
    }

    #[test]
    fn test_year_kept_when_digits_agree() {
        let label = derive(Some("MAR1"), date(2021, 2, 19)).unwrap();
        assert_eq!(label.month_code, Some('H'));
        assert_eq!(label.year, Some(2021));
    }

    #[test]
    fn test_decade_boundary() {
        assert_eq!(reconcile_year(2019, 0), 2020);
        assert_eq!(reconcile_year(2029, 0), 2030);
        assert_eq!(reconcile_year(2020, 0), 2020);
    }

    #[test]
    fn test_unknown_month_is_not_fatal() {
        let label = derive(Some("XYZ2"), date(2022, 5, 1)).unwrap();
        assert_eq!(label.month, "XYZ");
        assert_eq!(label.month_code, None);
        assert_eq!(label.year, Some(2022));
    }

    #[test]
    fn test_short_period() {
        let label = derive(Some("J1"), date(2021, 1, 1)).unwrap();
        assert_eq!(label.month, "J1");
        assert_eq!(label.month_code, None);
    }

    #[test]
    fn test_null_expiration_gives_null_year() {
        let label = derive(Some("JAN1"), None).unwrap();
        assert_eq!(label.month_code, Some('F'));
        assert_eq!(label.year, None);
    }

    #[test]
    fn test_malformed_period() {
        assert!(matches!(derive(None, date(2020, 1, 1)), Err(Error::Period(_))));
        assert!(matches!(derive(Some(""), date(2020, 1, 1)), Err(Error::Period(_))));
        assert!(matches!(derive(Some("JANX"), date(2020, 1, 1)), Err(Error::Period(_))));
    }
}
