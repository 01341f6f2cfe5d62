//! Report export encoders
//!
//! Every encoder renders the same [`ReportTable`]. Word and PDF are optional
//! (cargo features `word` and `pdf`) and any failure there degrades to CSV via
//! [`render_with_fallback`].

mod csv_export;
#[cfg(any(feature = "word", feature = "pdf"))]
pub mod docx;
#[cfg(feature = "pdf")]
pub mod pdf;
#[cfg(feature = "word")]
pub mod word;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::format::{ReportTable, format_currency};

pub use csv_export::render_csv;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const CSV_FILENAME: &str = "equipment_report.csv";

pub const DEFAULT_FONT_SIZE: u8 = 10;
pub const MIN_FONT_SIZE: u8 = 6;
pub const MAX_FONT_SIZE: u8 = 24;

pub const REPORT_TITLE: &str = "Equipment Inventory Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// On-screen JSON table
    Table,
    Csv,
    Word,
    Pdf,
}

impl ExportFormat {
    /// Unknown or absent values mean the on-screen table
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("csv") => Self::Csv,
            Some("word") => Self::Word,
            Some("pdf") => Self::Pdf,
            _ => Self::Table,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Word => "word",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("landscape") => Self::Landscape,
            _ => Self::Portrait,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }
}

/// RGB color with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const GREY: Rgb = Rgb(0.5, 0.5, 0.5);
    pub const LIGHT_GREY: Rgb = Rgb(0.827, 0.827, 0.827);
    pub const WHITE_SMOKE: Rgb = Rgb(0.96, 0.96, 0.96);
    pub const BEIGE: Rgb = Rgb(0.96, 0.96, 0.86);
    pub const BLUE: Rgb = Rgb(0.0, 0.0, 1.0);
    pub const LIGHT_BLUE: Rgb = Rgb(0.678, 0.847, 0.902);
    pub const DARK_BLUE: Rgb = Rgb(0.0, 0.0, 0.545);

    /// `RRGGBB` as used by WordprocessingML
    pub fn hex(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("{:02X}{:02X}{:02X}", c(self.0), c(self.1), c(self.2))
    }
}

/// A ruled line: color and width in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub color: Rgb,
    pub width: f32,
}

/// Visual parameters of a table style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TablePalette {
    pub header_fill: Option<Rgb>,
    pub header_text: Rgb,
    pub body_fill: Option<Rgb>,
    /// Full cell grid
    pub grid: Option<Rule>,
    /// Line under the header row
    pub header_rule: Option<Rule>,
    /// Line under the last row
    pub closing_rule: Option<Rule>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub enum TableStyle {
    #[default]
    #[serde(rename = "table_grid")]
    Grid,
    #[serde(rename = "table_professional")]
    Professional,
    #[serde(rename = "table_colorful")]
    Colorful,
    #[serde(rename = "table_minimal")]
    Minimal,
}

impl TableStyle {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("table_professional") => Self::Professional,
            Some("table_colorful") => Self::Colorful,
            Some("table_minimal") => Self::Minimal,
            _ => Self::Grid,
        }
    }

    pub fn palette(self) -> TablePalette {
        let grid = |color| Some(Rule { color, width: 1.0 });
        match self {
            Self::Grid => TablePalette {
                header_fill: Some(Rgb::LIGHT_GREY),
                header_text: Rgb::BLACK,
                body_fill: None,
                grid: grid(Rgb::BLACK),
                header_rule: None,
                closing_rule: None,
            },
            Self::Professional => TablePalette {
                header_fill: Some(Rgb::GREY),
                header_text: Rgb::WHITE_SMOKE,
                body_fill: Some(Rgb::BEIGE),
                grid: grid(Rgb::BLACK),
                header_rule: None,
                closing_rule: None,
            },
            Self::Colorful => TablePalette {
                header_fill: Some(Rgb::BLUE),
                header_text: Rgb::WHITE,
                body_fill: Some(Rgb::LIGHT_BLUE),
                grid: grid(Rgb::DARK_BLUE),
                header_rule: None,
                closing_rule: None,
            },
            Self::Minimal => TablePalette {
                header_fill: None,
                header_text: Rgb::BLACK,
                body_fill: None,
                grid: None,
                header_rule: Some(Rule {
                    color: Rgb::BLACK,
                    width: 2.0,
                }),
                closing_rule: Some(Rule {
                    color: Rgb::GREY,
                    width: 1.0,
                }),
            },
        }
    }
}

/// Layout options for Word and PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub orientation: Orientation,
    pub table_style: TableStyle,
    pub font_size: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            table_style: TableStyle::Grid,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl ExportOptions {
    /// Lenient parse of the raw request values
    pub fn from_params(
        orientation: Option<&str>,
        table_style: Option<&str>,
        font_size: Option<&str>,
    ) -> Self {
        let font_size = font_size
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(|n| n.clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u8)
            .unwrap_or(DEFAULT_FONT_SIZE);
        Self {
            orientation: Orientation::parse(orientation),
            table_style: TableStyle::parse(table_style),
            font_size,
        }
    }
}

/// Document-level facts shown around the table
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub title: String,
    pub organization: String,
    pub generated_at: NaiveDateTime,
    pub total_records: usize,
    pub total_amount: f64,
}

impl ReportContext {
    pub fn new(organization: impl Into<String>, generated_at: NaiveDateTime) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            organization: organization.into(),
            generated_at,
            total_records: 0,
            total_amount: 0.0,
        }
    }

    pub fn with_totals(mut self, total_records: usize, total_amount: f64) -> Self {
        self.total_records = total_records;
        self.total_amount = total_amount;
        self
    }

    pub fn generated_by(&self) -> String {
        format!("{} System", self.organization)
    }

    /// Template placeholder tokens and their values
    pub fn placeholders(&self, orientation: Orientation) -> Vec<(&'static str, String)> {
        let at = self.generated_at;
        vec![
            ("{{DATE}}", at.format("%B %d, %Y - %I:%M %p").to_string()),
            ("{{CURRENT_DATE}}", at.format("%B %d, %Y").to_string()),
            ("{{CURRENT_TIME}}", at.format("%I:%M %p").to_string()),
            ("{{TOTAL_RECORDS}}", self.total_records.to_string()),
            ("{{RECORD_COUNT}}", self.total_records.to_string()),
            ("{{REPORT_TITLE}}", self.title.clone()),
            ("{{GENERATED_BY}}", self.generated_by()),
            ("{{ORIENTATION}}", orientation.title().to_string()),
            ("{{TOTAL_AMOUNT}}", format_currency(self.total_amount)),
        ]
    }

    /// Attachment name for Word and PDF downloads
    pub fn document_filename(&self, orientation: Orientation, extension: &str) -> String {
        let org: String = self
            .organization
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!(
            "{}_Equipment_Report_{}.{}",
            org,
            orientation.as_str(),
            extension
        )
    }
}

/// Everything an encoder needs
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub table: &'a ReportTable,
    pub context: &'a ReportContext,
    pub options: ExportOptions,
    pub template_path: &'a Path,
}

/// Encoded document ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedExport {
    pub format: ExportFormat,
    pub content_type: &'static str,
    pub filename: String,
    pub body: Vec<u8>,
    /// Set when the requested format could not be produced
    pub warning: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0} export is not available in this build")]
    Unavailable(&'static str),

    #[error("report template not found at {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("invalid report template: {0}")]
    TemplateInvalid(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("pdf encoding error: {0}")]
    Pdf(String),

    #[error("csv encoding error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not a document format")]
    NotADocument(&'static str),
}

/// Render one format without fallback
pub fn render(format: ExportFormat, request: &ExportRequest<'_>) -> Result<RenderedExport, ExportError> {
    match format {
        ExportFormat::Csv => render_csv(request.table),
        ExportFormat::Word => render_word(request),
        ExportFormat::Pdf => render_pdf(request),
        ExportFormat::Table => Err(ExportError::NotADocument("table")),
    }
}

/// Render a format; Word and PDF failures degrade to CSV with a warning
pub fn render_with_fallback(
    format: ExportFormat,
    request: &ExportRequest<'_>,
) -> Result<RenderedExport, ExportError> {
    match render(format, request) {
        Ok(rendered) => Ok(rendered),
        Err(e) if matches!(format, ExportFormat::Word | ExportFormat::Pdf) => {
            let label = if format == ExportFormat::Word {
                "Word document"
            } else {
                "PDF document"
            };
            let warning = format!("{} generation failed: {}. Downloading CSV instead.", label, e);
            tracing::warn!(format = format.as_str(), error = %e, "Export failed, falling back to CSV");

            let mut csv = render_csv(request.table)?;
            csv.warning = Some(warning);
            Ok(csv)
        }
        Err(e) => Err(e),
    }
}

#[cfg(feature = "word")]
fn render_word(request: &ExportRequest<'_>) -> Result<RenderedExport, ExportError> {
    word::render_word(request)
}

#[cfg(not(feature = "word"))]
fn render_word(_request: &ExportRequest<'_>) -> Result<RenderedExport, ExportError> {
    Err(ExportError::Unavailable("Word"))
}

#[cfg(feature = "pdf")]
fn render_pdf(request: &ExportRequest<'_>) -> Result<RenderedExport, ExportError> {
    pdf::render_pdf(request)
}

#[cfg(not(feature = "pdf"))]
fn render_pdf(_request: &ExportRequest<'_>) -> Result<RenderedExport, ExportError> {
    Err(ExportError::Unavailable("PDF"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn context() -> ReportContext {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap();
        ReportContext::new("WESMAARRDEC", at).with_totals(2, 3000.5)
    }

    fn table() -> ReportTable {
        ReportTable {
            headers: vec!["Item Name".into(), "Amount".into()],
            rows: vec![
                vec!["Laptop".into(), "PHP 1,500.25".into()],
                vec!["Printer, color".into(), "PHP 1,500.25".into()],
            ],
        }
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(ExportFormat::parse(Some("pdf")), ExportFormat::Pdf);
        assert_eq!(ExportFormat::parse(Some("xlsx")), ExportFormat::Table);
        assert_eq!(ExportFormat::parse(None), ExportFormat::Table);
        assert_eq!(Orientation::parse(Some("sideways")), Orientation::Portrait);
        assert_eq!(
            TableStyle::parse(Some("table_colorful")),
            TableStyle::Colorful
        );
        assert_eq!(TableStyle::parse(Some("fancy")), TableStyle::Grid);
    }

    #[test]
    fn test_font_size_clamped() {
        let opts = ExportOptions::from_params(None, None, Some("40"));
        assert_eq!(opts.font_size, MAX_FONT_SIZE);
        let opts = ExportOptions::from_params(None, None, Some("2"));
        assert_eq!(opts.font_size, MIN_FONT_SIZE);
        let opts = ExportOptions::from_params(None, None, Some("big"));
        assert_eq!(opts.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_placeholders() {
        let ctx = context();
        let values = ctx.placeholders(Orientation::Landscape);
        let get = |k: &str| {
            values
                .iter()
                .find(|(key, _)| *key == k)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("{{DATE}}"), "March 05, 2024 - 02:30 PM");
        assert_eq!(get("{{TOTAL_RECORDS}}"), "2");
        assert_eq!(get("{{ORIENTATION}}"), "Landscape");
        assert_eq!(get("{{TOTAL_AMOUNT}}"), "PHP 3,000.50");
        assert_eq!(get("{{GENERATED_BY}}"), "WESMAARRDEC System");
    }

    #[test]
    fn test_document_filename() {
        assert_eq!(
            context().document_filename(Orientation::Landscape, "pdf"),
            "WESMAARRDEC_Equipment_Report_landscape.pdf"
        );
    }

    #[test]
    fn test_palette_hex() {
        assert_eq!(Rgb::LIGHT_GREY.hex(), "D3D3D3");
        assert_eq!(Rgb::DARK_BLUE.hex(), "00008B");
        assert!(TableStyle::Minimal.palette().grid.is_none());
    }

    #[test]
    fn test_missing_template_falls_back_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.docx");
        let table = table();
        let ctx = context();
        let request = ExportRequest {
            table: &table,
            context: &ctx,
            options: ExportOptions::default(),
            template_path: &missing,
        };

        let rendered = render_with_fallback(ExportFormat::Word, &request).unwrap();
        assert_eq!(rendered.format, ExportFormat::Csv);
        assert_eq!(rendered.content_type, CSV_CONTENT_TYPE);
        assert_eq!(rendered.filename, CSV_FILENAME);
        assert!(rendered.warning.unwrap().contains("Word document generation failed"));
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn test_pdf_unavailable_yields_csv() {
        let dir = tempfile::tempdir().unwrap();
        let table = table();
        let ctx = context();
        let request = ExportRequest {
            table: &table,
            context: &ctx,
            options: ExportOptions::default(),
            template_path: dir.path(),
        };
        let rendered = render_with_fallback(ExportFormat::Pdf, &request).unwrap();
        assert_eq!(rendered.format, ExportFormat::Csv);
        assert!(rendered.warning.is_some());
    }

    #[test]
    fn test_csv_is_never_wrapped_in_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let table = table();
        let ctx = context();
        let request = ExportRequest {
            table: &table,
            context: &ctx,
            options: ExportOptions::default(),
            template_path: dir.path(),
        };
        let rendered = render_with_fallback(ExportFormat::Csv, &request).unwrap();
        assert!(rendered.warning.is_none());
        assert!(render(ExportFormat::Table, &request).is_err());
    }

    #[cfg(all(feature = "word", feature = "pdf"))]
    #[test]
    fn test_encoders_agree_on_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report_template.docx");
        docx::write_scaffold(&path, "WESMAARRDEC").unwrap();

        let mut table = table();
        table
            .rows
            .push(vec!["PN  001\tB".into(), " PHP 0.00 ".into()]);
        let ctx = context();
        let request = ExportRequest {
            table: &table,
            context: &ctx,
            options: ExportOptions::default(),
            template_path: &path,
        };

        let csv = render(ExportFormat::Csv, &request).unwrap();
        let mut reader = ::csv::Reader::from_reader(csv.body.as_slice());
        let csv_rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();

        let word = render(ExportFormat::Word, &request).unwrap();
        let parts = docx::read_xml_parts(&word.body, |n| n == docx::DOCUMENT_PART).unwrap();
        let word_rows = word::table_cells(&parts[0].1);

        let branding = docx::TemplateBranding::default_for(&ctx.organization);
        let pdf_rows = pdf::layout_cells(&pdf::layout(&request, &branding));

        assert_eq!(csv_rows, table.rows);
        assert_eq!(word_rows[0], table.headers);
        assert_eq!(&word_rows[1..], table.rows.as_slice());
        assert_eq!(pdf_rows, table.rows);
    }
}
