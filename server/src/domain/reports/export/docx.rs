//! Branded `.docx` report template
//!
//! The template is an ordinary Word document whose header and footer parts carry the
//! organization branding and `{{PLACEHOLDER}}` tokens. The Word encoder rewrites its
//! parts; the PDF encoder only reads the header and footer text.

use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::ExportError;
use crate::utils::file::write_with_parents;

pub const DOCUMENT_PART: &str = "word/document.xml";

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p[ >].*?</w:p>").expect("Invalid regex"));
static TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").expect("Invalid regex"));

/// Header and footer text of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBranding {
    pub header_text: String,
    pub footer_text: String,
}

impl TemplateBranding {
    pub fn default_for(organization: &str) -> Self {
        Self {
            header_text: format!("{}\nEquipment Inventory Management System", organization),
            footer_text: format!("{} Equipment Report", organization),
        }
    }

    /// Extract branding from template bytes. Empty header or footer parts fall back
    /// to the default text.
    pub fn from_template(bytes: &[u8], organization: &str) -> Result<Self, ExportError> {
        let defaults = Self::default_for(organization);
        let parts = read_xml_parts(bytes, |name| is_header(name) || is_footer(name))?;

        let collect = |pred: fn(&str) -> bool| -> String {
            parts
                .iter()
                .filter(|(name, _)| pred(name))
                .flat_map(|(_, xml)| paragraph_texts(xml))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let header_text = collect(is_header);
        let footer_text = collect(is_footer);

        Ok(Self {
            header_text: if header_text.is_empty() {
                defaults.header_text
            } else {
                header_text
            },
            footer_text: if footer_text.is_empty() {
                defaults.footer_text
            } else {
                footer_text
            },
        })
    }

    /// Branding from the template at `path`, or the defaults when it cannot be read
    pub fn load_or_default(path: &Path, organization: &str) -> Self {
        match read_template(path).and_then(|bytes| Self::from_template(&bytes, organization)) {
            Ok(branding) => branding,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Using default report branding");
                Self::default_for(organization)
            }
        }
    }

    pub fn substitute(&self, placeholders: &[(&str, String)]) -> Self {
        Self {
            header_text: replace_tokens(&self.header_text, placeholders, false),
            footer_text: replace_tokens(&self.footer_text, placeholders, false),
        }
    }
}

pub fn is_header(name: &str) -> bool {
    name.starts_with("word/header") && name.ends_with(".xml")
}

pub fn is_footer(name: &str) -> bool {
    name.starts_with("word/footer") && name.ends_with(".xml")
}

/// Read the template file; a missing file is [`ExportError::TemplateMissing`]
pub fn read_template(path: &Path) -> Result<Vec<u8>, ExportError> {
    if !path.is_file() {
        return Err(ExportError::TemplateMissing(path.to_path_buf()));
    }
    Ok(std::fs::read(path)?)
}

fn archive_err(e: zip::result::ZipError) -> ExportError {
    ExportError::Archive(e.to_string())
}

/// Read matching XML parts, sorted by part name
pub fn read_xml_parts(
    bytes: &[u8],
    wanted: impl Fn(&str) -> bool,
) -> Result<Vec<(String, String)>, ExportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_err)?;
    let mut parts = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(archive_err)?;
        let name = file.name().to_string();
        if !wanted(&name) {
            continue;
        }
        let mut xml = String::new();
        file.read_to_string(&mut xml)?;
        parts.push((name, xml));
    }
    parts.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(parts)
}

/// Copy the archive, replacing the parts for which `edit` returns new content
pub fn rewrite_parts(
    bytes: &[u8],
    mut edit: impl FnMut(&str, &str) -> Option<String>,
) -> Result<Vec<u8>, ExportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_err)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let name = archive.by_index_raw(i).map_err(archive_err)?.name().to_string();

        let replacement = if name.ends_with(".xml") {
            let mut xml = String::new();
            archive
                .by_index(i)
                .map_err(archive_err)?
                .read_to_string(&mut xml)?;
            edit(&name, &xml)
        } else {
            None
        };

        match replacement {
            Some(xml) => {
                writer.start_file(name, options).map_err(archive_err)?;
                writer.write_all(xml.as_bytes())?;
            }
            None => {
                let file = archive.by_index_raw(i).map_err(archive_err)?;
                writer.raw_copy_file(file).map_err(archive_err)?;
            }
        }
    }

    Ok(writer.finish().map_err(archive_err)?.into_inner())
}

/// Text of each non-blank paragraph in a WordprocessingML part
pub fn paragraph_texts(xml: &str) -> Vec<String> {
    PARAGRAPH_RE
        .find_iter(xml)
        .map(|p| {
            TEXT_RE
                .captures_iter(p.as_str())
                .filter_map(|c| c.get(1))
                .map(|m| unescape_xml(m.as_str()))
                .collect::<String>()
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Replace placeholder tokens; `escape` when writing into XML
pub fn replace_tokens(text: &str, placeholders: &[(&str, String)], escape: bool) -> String {
    placeholders
        .iter()
        .fold(text.to_string(), |acc, (token, value)| {
            if !acc.contains(token) {
                return acc;
            }
            if escape {
                acc.replace(token, &escape_xml(value))
            } else {
                acc.replace(token, value)
            }
        })
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

pub fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/><Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/></Relationships>"#;

pub const WORD_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

fn branded_paragraph(text: &str, bold: bool, half_points: u32) -> String {
    format!(
        r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial"/>{}<w:sz w:val="{}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        if bold { "<w:b/>" } else { "" },
        half_points,
        escape_xml(text)
    )
}

/// A minimal branded template: organization header, placeholder footer, A4 portrait
pub fn scaffold_template(organization: &str) -> Result<Vec<u8>, ExportError> {
    let header = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr {}>{}{}</w:hdr>"#,
        WORD_NS,
        branded_paragraph(organization, true, 28),
        branded_paragraph("Equipment Inventory Management System", false, 22),
    );
    let footer = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:ftr {}>{}</w:ftr>"#,
        WORD_NS,
        branded_paragraph(
            &format!("{} Equipment Report | {{{{DATE}}}} | {{{{TOTAL_RECORDS}}}} records", organization),
            false,
            16
        ),
    );
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document {}><w:body>{}<w:sectPr><w:headerReference w:type="default" r:id="rId1"/><w:footerReference w:type="default" r:id="rId2"/><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1080" w:bottom="1440" w:left="1080" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        WORD_NS,
        branded_paragraph("{{REPORT_TITLE}}", true, 36),
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let parts: [(&str, &str); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        (DOCUMENT_PART, &document),
        ("word/header1.xml", &header),
        ("word/footer1.xml", &footer),
    ];
    for (name, content) in parts {
        writer.start_file(name, options).map_err(archive_err)?;
        writer.write_all(content.as_bytes())?;
    }
    Ok(writer.finish().map_err(archive_err)?.into_inner())
}

/// Write the scaffold template to `path`, creating parent directories
pub fn write_scaffold(path: &Path, organization: &str) -> Result<(), ExportError> {
    write_with_parents(path, &scaffold_template(organization)?)?;
    Ok(())
}
