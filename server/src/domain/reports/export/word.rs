//! Word (`.docx`) encoder
//!
//! Fills the branded template: placeholders are substituted in every header,
//! footer and the body, then the body is replaced by the report while the final
//! section properties (page size, header and footer references) are kept.

use std::sync::LazyLock;

use regex::Regex;

use super::docx::{
    DOCUMENT_PART, escape_xml, is_footer, is_header, read_template, read_xml_parts,
    replace_tokens, rewrite_parts,
};
use super::{
    DOCX_CONTENT_TYPE, ExportError, ExportFormat, ExportRequest, Orientation, RenderedExport,
    Rgb, Rule, TablePalette,
};
use crate::domain::reports::format::ReportTable;

/// A4 in twentieths of a point
const A4_SHORT_TWIPS: u32 = 11906;
const A4_LONG_TWIPS: u32 = 16838;
const SIDE_MARGINS_TWIPS: u32 = 2160;

static BODY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:body\b[^>]*>").expect("Invalid regex"));
static SECT_PR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:sectPr\b.*?</w:sectPr>").expect("Invalid regex"));
static PG_SZ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:pgSz\b[^>]*/>").expect("Invalid regex"));
static WIDTH_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"w:w="(\d+)""#).expect("Invalid regex"));
static HEIGHT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"w:h="(\d+)""#).expect("Invalid regex"));

pub fn render_word(request: &ExportRequest<'_>) -> Result<RenderedExport, ExportError> {
    let template = read_template(request.template_path)?;
    let orientation = request.options.orientation;
    let placeholders = request.context.placeholders(orientation);

    let document = read_xml_parts(&template, |name| name == DOCUMENT_PART)?
        .into_iter()
        .next()
        .map(|(_, xml)| xml)
        .ok_or_else(|| ExportError::TemplateInvalid(format!("missing {}", DOCUMENT_PART)))?;

    let document = replace_tokens(&document, &placeholders, true);
    let document = replace_body(&document, &body_xml(request), orientation)?;

    let body = rewrite_parts(&template, |name, xml| {
        if name == DOCUMENT_PART {
            Some(document.clone())
        } else if is_header(name) || is_footer(name) {
            Some(replace_tokens(xml, &placeholders, true))
        } else {
            None
        }
    })?;

    Ok(RenderedExport {
        format: ExportFormat::Word,
        content_type: DOCX_CONTENT_TYPE,
        filename: request.context.document_filename(orientation, "docx"),
        body,
        warning: None,
    })
}

/// Swap the body content, keeping the last section properties
fn replace_body(xml: &str, content: &str, orientation: Orientation) -> Result<String, ExportError> {
    let open = BODY_OPEN_RE
        .find(xml)
        .ok_or_else(|| ExportError::TemplateInvalid("document has no body".into()))?;
    let close = xml
        .rfind("</w:body>")
        .filter(|idx| *idx >= open.end())
        .ok_or_else(|| ExportError::TemplateInvalid("document body is not closed".into()))?;

    let inner = &xml[open.end()..close];
    let sect_pr = SECT_PR_RE
        .find_iter(inner)
        .last()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "<w:sectPr></w:sectPr>".to_string());

    Ok(format!(
        "{}{}{}{}",
        &xml[..open.end()],
        content,
        orient_section(&sect_pr, orientation),
        &xml[close..]
    ))
}

fn attr(re: &Regex, tag: &str, default: u32) -> u32 {
    re.captures(tag)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default)
}

/// Rewrite the section page size for the requested orientation
fn orient_section(sect_pr: &str, orientation: Orientation) -> String {
    let (width, height) = PG_SZ_RE
        .find(sect_pr)
        .map(|m| {
            (
                attr(&WIDTH_ATTR_RE, m.as_str(), A4_SHORT_TWIPS),
                attr(&HEIGHT_ATTR_RE, m.as_str(), A4_LONG_TWIPS),
            )
        })
        .unwrap_or((A4_SHORT_TWIPS, A4_LONG_TWIPS));
    let (short, long) = (width.min(height), width.max(height));

    let pg_sz = match orientation {
        Orientation::Portrait => format!(r#"<w:pgSz w:w="{}" w:h="{}"/>"#, short, long),
        Orientation::Landscape => format!(
            r#"<w:pgSz w:w="{}" w:h="{}" w:orient="landscape"/>"#,
            long, short
        ),
    };

    if PG_SZ_RE.is_match(sect_pr) {
        return PG_SZ_RE.replace(sect_pr, pg_sz.as_str()).into_owned();
    }
    match sect_pr.find('>') {
        Some(idx) => format!("{}{}{}", &sect_pr[..=idx], pg_sz, &sect_pr[idx + 1..]),
        None => sect_pr.to_string(),
    }
}

fn run(text: &str, bold: bool, half_points: u32, color: Option<Rgb>) -> String {
    format!(
        r#"<w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial"/>{}{}<w:sz w:val="{}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        if bold { "<w:b/>" } else { "" },
        color
            .map(|c| format!(r#"<w:color w:val="{}"/>"#, c.hex()))
            .unwrap_or_default(),
        half_points,
        escape_xml(text)
    )
}

fn centered(text: &str, bold: bool, half_points: u32) -> String {
    format!(
        r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>{}</w:p>"#,
        run(text, bold, half_points, None)
    )
}

fn body_xml(request: &ExportRequest<'_>) -> String {
    let ctx = request.context;
    let generated = ctx
        .generated_at
        .format("Generated on: %B %d, %Y at %I:%M %p")
        .to_string();

    let mut xml = String::new();
    xml.push_str(&centered(&ctx.title, true, 36));
    xml.push_str(&centered(&generated, false, 24));
    xml.push_str("<w:p/>");
    xml.push_str(&centered(
        &format!("Total Records: {}", request.table.row_count()),
        true,
        u32::from(request.options.font_size) * 2 + 4,
    ));
    xml.push_str("<w:p/>");
    xml.push_str(&table_xml(
        request.table,
        &request.options.table_style.palette(),
        request.options.font_size,
        request.options.orientation,
    ));
    xml.push_str("<w:p/>");
    xml
}

/// Border width in eighths of a point
fn border(side: &str, rule: Rule) -> String {
    format!(
        r#"<w:{} w:val="single" w:sz="{}" w:space="0" w:color="{}"/>"#,
        side,
        (rule.width * 8.0).round() as u32,
        rule.color.hex()
    )
}

struct CellStyle {
    bold: bool,
    color: Option<Rgb>,
    fill: Option<Rgb>,
    bottom: Option<Rule>,
}

fn cell_xml(text: &str, style: &CellStyle, width: u32, half_points: u32) -> String {
    let mut tc_pr = format!(r#"<w:tcW w:w="{}" w:type="dxa"/>"#, width);
    if let Some(rule) = style.bottom {
        tc_pr.push_str(&format!("<w:tcBorders>{}</w:tcBorders>", border("bottom", rule)));
    }
    if let Some(fill) = style.fill {
        tc_pr.push_str(&format!(
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            fill.hex()
        ));
    }
    format!(
        "<w:tc><w:tcPr>{}</w:tcPr><w:p>{}</w:p></w:tc>",
        tc_pr,
        run(text, style.bold, half_points, style.color)
    )
}

fn table_xml(
    table: &ReportTable,
    palette: &TablePalette,
    font_size: u8,
    orientation: Orientation,
) -> String {
    let columns = table.column_count().max(1) as u32;
    let page_width = match orientation {
        Orientation::Portrait => A4_SHORT_TWIPS,
        Orientation::Landscape => A4_LONG_TWIPS,
    };
    let col_width = (page_width - SIDE_MARGINS_TWIPS) / columns;
    let half_points = u32::from(font_size) * 2;

    let mut xml = String::from(
        r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:jc w:val="center"/>"#,
    );
    if let Some(grid) = palette.grid {
        xml.push_str("<w:tblBorders>");
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            xml.push_str(&border(side, grid));
        }
        xml.push_str("</w:tblBorders>");
    }
    xml.push_str(r#"<w:tblLayout w:type="autofit"/></w:tblPr><w:tblGrid>"#);
    for _ in 0..columns {
        xml.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, col_width));
    }
    xml.push_str("</w:tblGrid>");

    let header_style = CellStyle {
        bold: true,
        color: Some(palette.header_text),
        fill: palette.header_fill,
        bottom: palette.header_rule,
    };
    xml.push_str("<w:tr><w:trPr><w:tblHeader/></w:trPr>");
    for label in &table.headers {
        xml.push_str(&cell_xml(label, &header_style, col_width, half_points + 2));
    }
    xml.push_str("</w:tr>");

    let last = table.rows.len().saturating_sub(1);
    for (i, row) in table.rows.iter().enumerate() {
        let style = CellStyle {
            bold: false,
            color: None,
            fill: palette.body_fill,
            bottom: if i == last { palette.closing_rule } else { None },
        };
        xml.push_str("<w:tr>");
        for value in row {
            xml.push_str(&cell_xml(value, &style, col_width, half_points));
        }
        xml.push_str("</w:tr>");
    }

    xml.push_str("</w:tbl>");
    xml
}

/// Cell texts of the first table in a document part, row by row
#[cfg(test)]
pub(crate) fn table_cells(document_xml: &str) -> Vec<Vec<String>> {
    use super::docx::unescape_xml;

    let row_re = Regex::new(r"(?s)<w:tr>.*?</w:tr>").unwrap();
    let cell_re = Regex::new(r"(?s)<w:tc>.*?</w:tc>").unwrap();
    let text_re = Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").unwrap();

    row_re
        .find_iter(document_xml)
        .map(|row| {
            cell_re
                .find_iter(row.as_str())
                .map(|cell| {
                    text_re
                        .captures_iter(cell.as_str())
                        .map(|c| unescape_xml(&c[1]))
                        .collect::<String>()
                })
                .collect()
        })
        .collect()
}
