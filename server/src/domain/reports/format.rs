//! Cell formatting shared by every report output
//!
//! The on-screen table and all export encoders consume the same [`ReportTable`],
//! so a cell reads the same in JSON, CSV, Word and PDF.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use super::catalog::Field;
use super::projection::ColumnSelection;

/// Currency prefix. PDF base fonts cannot draw the peso sign.
pub const CURRENCY_PREFIX: &str = "PHP";
pub const ABSENT_REFERENCE: &str = "N/A";

/// Raw value of one field on one record
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Decimal(Option<f64>),
    Date(Option<NaiveDate>),
    /// Unix seconds
    DateTime(Option<i64>),
    Boolean(bool),
    /// Display name of the referenced row
    Reference(Option<String>),
}

/// Anything that can yield catalog field values
pub trait FieldSource {
    fn value(&self, field: Field) -> CellValue;
}

/// `1234.5` -> `PHP 1,234.50`
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{} {}{}.{}", CURRENCY_PREFIX, sign, grouped, cents)
}

pub fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Text(v) => v.clone().unwrap_or_default(),
        CellValue::Integer(v) => v.map(|i| i.to_string()).unwrap_or_default(),
        CellValue::Decimal(v) => v.map(format_currency).unwrap_or_default(),
        CellValue::Date(v) => v
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        CellValue::DateTime(v) => v
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        CellValue::Boolean(b) => if *b { "Yes" } else { "No" }.to_string(),
        CellValue::Reference(v) => v
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ABSENT_REFERENCE.to_string()),
    }
}

/// Projected, formatted rows ready for any encoder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn build<R: FieldSource>(selection: &ColumnSelection, records: &[R]) -> Self {
        let headers = selection.labels().into_iter().map(str::to_string).collect();
        let rows = records
            .iter()
            .map(|record| {
                selection
                    .columns()
                    .iter()
                    .map(|column| match column.field {
                        Some(field) => format_cell(&record.value(field)),
                        None => String::new(),
                    })
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;

    impl FieldSource for Stub {
        fn value(&self, field: Field) -> CellValue {
            match field {
                Field::ItemName => CellValue::Text(Some("Laptop".into())),
                Field::ItemAmount => CellValue::Decimal(Some(45999.9)),
                Field::Category => CellValue::Reference(None),
                Field::IsReturned => CellValue::Boolean(true),
                Field::CreatedAt => CellValue::DateTime(Some(1_718_409_600)),
                _ => CellValue::Text(None),
            }
        }
    }

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(0.0), "PHP 0.00");
        assert_eq!(format_currency(12.5), "PHP 12.50");
        assert_eq!(format_currency(999.999), "PHP 1,000.00");
        assert_eq!(format_currency(1234567.891), "PHP 1,234,567.89");
        assert_eq!(format_currency(-1500.0), "PHP -1,500.00");
    }

    #[test]
    fn test_cells() {
        assert_eq!(format_cell(&CellValue::Decimal(None)), "");
        assert_eq!(format_cell(&CellValue::Reference(None)), "N/A");
        assert_eq!(
            format_cell(&CellValue::Reference(Some("Laptop".into()))),
            "Laptop"
        );
        assert_eq!(format_cell(&CellValue::Boolean(false)), "No");
        assert_eq!(format_cell(&CellValue::Integer(Some(3))), "3");
        assert_eq!(
            format_cell(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 9))),
            "2024-02-09"
        );
        assert_eq!(
            format_cell(&CellValue::DateTime(Some(1_718_409_600))),
            "2024-06-15"
        );
    }

    #[test]
    fn test_build_table() {
        let selection = ColumnSelection::resolve(&[
            "item_name",
            "item_amount",
            "category",
            "is_returned",
            "created_at",
            "bogus",
        ]);
        let table = ReportTable::build(&selection, &[Stub, Stub]);
        assert_eq!(
            table.headers,
            vec!["Item Name", "Amount", "Category", "Is Returned", "Created At", "bogus"]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[0],
            vec!["Laptop", "PHP 45,999.90", "N/A", "Yes", "2024-06-15", ""]
        );
    }
}
