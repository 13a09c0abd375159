//! Wide-to-long reshape.

use chrono::NaiveDate;
use ivol_core::{FieldValues, FloatField, NormalizedRecord};

/// One enriched row before unpivoting.
#[derive(Debug, Clone)]
pub struct WideRow<'a> {
    pub date: NaiveDate,
    pub symbol: String,
    pub source: Option<&'a str>,
    pub values: &'a FieldValues,
}

/// Unpivot wide rows into one record per float field.
///
/// Output is grouped by input row, then by field in [`FloatField::ALL`]
/// order. Null values stay null.
pub fn melt(rows: &[WideRow<'_>]) -> Vec<NormalizedRecord> {
    let mut records = Vec::with_capacity(rows.len() * FloatField::COUNT);
    for row in rows {
        let source = row.source.map(str::to_string);
        for (field, value) in row.values.iter() {
            records.push(NormalizedRecord {
                date: row.date,
                symbol: row.symbol.clone(),
                source: source.clone(),
                field,
                value,
            });
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn values(seed: f64) -> FieldValues {
        let mut values = FieldValues::empty();
        for (i, field) in FloatField::ALL.into_iter().enumerate() {
            values.set(field, Some(seed + i as f64));
        }
        values
    }

    #[test]
    fn test_cardinality_and_order() {
        let a = values(1.0);
        let b = values(100.0);
        let date = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
        let rows = vec![
            WideRow { date, symbol: "A".to_string(), source: Some("XYZ"), values: &a },
            WideRow { date, symbol: "B".to_string(), source: Some("XYZ"), values: &b },
        ];

        let records = melt(&rows);
        assert_eq!(records.len(), 2 * FloatField::COUNT);

        for (i, record) in records.iter().enumerate() {
            let expected_symbol = if i < FloatField::COUNT { "A" } else { "B" };
            assert_eq!(record.symbol, expected_symbol);
            assert_eq!(record.field, FloatField::ALL[i % FloatField::COUNT]);
            assert_eq!(record.source.as_deref(), Some("XYZ"));
            assert_eq!(record.date, date);
        }

        assert_relative_eq!(records[0].value.unwrap(), 1.0);
        assert_relative_eq!(records[9].value.unwrap(), 10.0);
        assert_relative_eq!(records[10].value.unwrap(), 100.0);
    }

    #[test]
    fn test_nulls_preserved() {
        let mut v = values(1.0);
        v.set(FloatField::Premium, None);
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        let rows = vec![WideRow { date, symbol: "S".to_string(), source: None, values: &v }];

        let records = melt(&rows);
        let premium = records
            .iter()
            .find(|r| r.field == FloatField::Premium)
            .unwrap();
        assert_eq!(premium.value, None);
        assert!(records.iter().all(|r| r.source.is_none()));
    }

    #[test]
    fn test_empty() {
        assert!(melt(&[]).is_empty());
    }
}
