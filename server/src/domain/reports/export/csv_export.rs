//! CSV encoder

use super::{CSV_CONTENT_TYPE, CSV_FILENAME, ExportError, ExportFormat, RenderedExport};
use crate::domain::reports::format::ReportTable;

/// Header row of labels, then one row per record
pub fn render_csv(table: &ReportTable) -> Result<RenderedExport, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::new(e.error().kind(), e.to_string())))?;

    Ok(RenderedExport {
        format: ExportFormat::Csv,
        content_type: CSV_CONTENT_TYPE,
        filename: CSV_FILENAME.to_string(),
        body,
        warning: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quotes_and_order() {
        let table = ReportTable {
            headers: vec!["Item Name".into(), "Amount".into()],
            rows: vec![
                vec!["Desk, wooden".into(), "PHP 1,200.00".into()],
                vec!["Say \"hi\"".into(), String::new()],
            ],
        };
        let rendered = render_csv(&table).unwrap();
        let text = String::from_utf8(rendered.body).unwrap();
        assert_eq!(
            text,
            "Item Name,Amount\n\"Desk, wooden\",\"PHP 1,200.00\"\n\"Say \"\"hi\"\"\",\n"
        );
        assert_eq!(rendered.filename, "equipment_report.csv");
    }

    #[test]
    fn test_csv_reads_back_identical_cells() {
        let table = ReportTable {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec!["x\ny".into(), "N/A".into()]],
        };
        let rendered = render_csv(&table).unwrap();
        let mut reader = csv::Reader::from_reader(rendered.body.as_slice());
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(rows, table.rows);
    }
}
