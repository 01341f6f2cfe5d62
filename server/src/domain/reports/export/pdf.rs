//! PDF encoder
//!
//! Layout and encoding are separate steps: [`layout`] places every string, line and
//! fill on A4 pages, [`encode`] turns that into PDF objects with `lopdf`. Only the
//! standard Helvetica faces are used, so nothing is embedded.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use super::docx::TemplateBranding;
use super::{
    ExportError, ExportFormat, ExportRequest, Orientation, PDF_CONTENT_TYPE, RenderedExport, Rgb,
    Rule, TablePalette,
};

const A4_SHORT: f32 = 595.0;
const A4_LONG: f32 = 842.0;
const INCH: f32 = 72.0;
const SIDE_MARGIN: f32 = 0.75 * INCH;
const TOP_MARGIN: f32 = 1.4 * INCH;
const BOTTOM_MARGIN: f32 = 1.2 * INCH;
const CELL_PADDING: f32 = 3.0;
const LINE_SPACING: f32 = 1.2;

const HEADER_RULE: Rule = Rule {
    color: Rgb::DARK_BLUE,
    width: 2.0,
};
const FOOTER_RULE: Rule = Rule {
    color: Rgb::LIGHT_GREY,
    width: 1.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    /// Average glyph advance as a fraction of the font size
    fn advance(self) -> f32 {
        match self {
            Font::Regular => 0.5,
            Font::Bold => 0.55,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: String,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        rule: Rule,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// One table cell as placed; `row` is `None` for the header row
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    pub page: usize,
    pub row: Option<usize>,
    pub col: usize,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<PageLayout>,
    pub cells: Vec<PlacedCell>,
}

pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    text.chars().count() as f32 * size * font.advance()
}

/// Greedy wrap that keeps every character. Concatenating the lines gives back the
/// input: whitespace stays at the end of the line it follows, and a paragraph break
/// stays as a trailing `\n`. Words longer than a line are split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut paragraphs = text.split('\n').peekable();

    while let Some(paragraph) = paragraphs.next() {
        let mut current = String::new();
        let mut used = 0;

        for token in tokens(paragraph) {
            let len = token.chars().count();
            if token.starts_with(char::is_whitespace) {
                current.push_str(token);
                used += len;
                if used >= max_chars {
                    lines.push(std::mem::take(&mut current));
                    used = 0;
                }
                continue;
            }
            if used > 0 && used + len > max_chars {
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            let mut rest = token;
            while rest.chars().count() > max_chars {
                let split = rest
                    .char_indices()
                    .nth(max_chars)
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                lines.push(rest[..split].to_string());
                rest = &rest[split..];
            }
            used += rest.chars().count();
            current.push_str(rest);
        }

        if paragraphs.peek().is_some() {
            current.push('\n');
            lines.push(current);
        } else if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Alternating runs of whitespace and non-whitespace
fn tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|s| s != space) {
            out.push(&text[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

struct Cursor<'a> {
    layout: DocumentLayout,
    palette: &'a TablePalette,
    y: f32,
    /// Record fragments drawn on the current page
    rows_on_page: usize,
}

impl Cursor<'_> {
    fn page(&mut self) -> &mut PageLayout {
        if self.layout.pages.is_empty() {
            self.layout.pages.push(PageLayout::default());
        }
        let last = self.layout.pages.len() - 1;
        &mut self.layout.pages[last]
    }

    fn new_page(&mut self) {
        self.layout.pages.push(PageLayout::default());
        self.y = self.layout.height - TOP_MARGIN;
        self.rows_on_page = 0;
    }

    fn centered(&mut self, text: &str, font: Font, size: f32, color: Rgb, space_after: f32) {
        let x = (self.layout.width - text_width(text, font, size)) / 2.0;
        let y = self.y - size;
        self.page().ops.push(DrawOp::Text {
            x: x.max(SIDE_MARGIN),
            y,
            font,
            size,
            color,
            text: text.to_string(),
        });
        self.y -= size * LINE_SPACING + space_after;
    }

    /// Whole text lines of `size` that still fit above the bottom margin
    fn lines_available(&self, size: f32) -> usize {
        let room = self.y - BOTTOM_MARGIN - 2.0 * CELL_PADDING;
        if room <= 0.0 {
            0
        } else {
            (room / (size * LINE_SPACING)).floor() as usize
        }
    }
}

struct RowSpec<'a> {
    cells: &'a [String],
    index: Option<usize>,
    font: Font,
    size: f32,
    color: Rgb,
    fill: Option<Rgb>,
    bottom_rule: Option<Rule>,
}

fn row_lines(spec: &RowSpec<'_>, col_width: f32) -> Vec<Vec<String>> {
    let avail = (col_width - 2.0 * CELL_PADDING).max(spec.size);
    let max_chars = (avail / (spec.size * spec.font.advance())).floor() as usize;
    spec.cells.iter().map(|c| wrap(c, max_chars)).collect()
}

fn line_count(lines: &[Vec<String>]) -> usize {
    lines.iter().map(Vec::len).max().unwrap_or(1).max(1)
}

/// Draw text lines `start..end` of every cell as one band of the table
fn draw_fragment(
    cursor: &mut Cursor<'_>,
    spec: &RowSpec<'_>,
    lines: &[Vec<String>],
    start: usize,
    end: usize,
    col_width: f32,
) {
    let height = (end - start) as f32 * spec.size * LINE_SPACING + 2.0 * CELL_PADDING;
    let left = SIDE_MARGIN;
    let width = col_width * spec.cells.len() as f32;
    let top = cursor.y;
    let bottom = top - height;
    let page_index = cursor.layout.pages.len().saturating_sub(1);
    let grid = cursor.palette.grid;
    let closing = end >= line_count(lines);

    let page = cursor.page();
    if let Some(fill) = spec.fill {
        page.ops.push(DrawOp::Rect {
            x: left,
            y: bottom,
            width,
            height,
            fill,
        });
    }
    if let Some(rule) = grid {
        page.ops.push(DrawOp::Line {
            from: (left, top),
            to: (left + width, top),
            rule,
        });
        page.ops.push(DrawOp::Line {
            from: (left, bottom),
            to: (left + width, bottom),
            rule,
        });
        for i in 0..=spec.cells.len() {
            let x = left + col_width * i as f32;
            page.ops.push(DrawOp::Line {
                from: (x, top),
                to: (x, bottom),
                rule,
            });
        }
    }
    if let (Some(rule), true) = (spec.bottom_rule, closing) {
        page.ops.push(DrawOp::Line {
            from: (left, bottom),
            to: (left + width, bottom),
            rule,
        });
    }

    let mut placed = Vec::with_capacity(lines.len());
    for (col, cell_lines) in lines.iter().enumerate() {
        let part = cell_lines
            .get(start..end.min(cell_lines.len()))
            .unwrap_or(&[]);
        let x = left + col_width * col as f32 + CELL_PADDING;
        for (i, line) in part.iter().enumerate() {
            let text = line.trim_end_matches('\n');
            if text.trim().is_empty() {
                continue;
            }
            page.ops.push(DrawOp::Text {
                x,
                y: top - CELL_PADDING - spec.size - i as f32 * spec.size * LINE_SPACING,
                font: spec.font,
                size: spec.size,
                color: spec.color,
                text: text.to_string(),
            });
        }
        placed.push(PlacedCell {
            page: page_index,
            row: spec.index,
            col,
            lines: part.to_vec(),
        });
    }

    cursor.layout.cells.extend(placed);
    if spec.index.is_some() {
        cursor.rows_on_page += 1;
    }
    cursor.y = bottom;
}

fn draw_header(cursor: &mut Cursor<'_>, header: &RowSpec<'_>, col_width: f32) {
    let lines = row_lines(header, col_width);
    let end = line_count(&lines);
    draw_fragment(cursor, header, &lines, 0, end, col_width);
}

/// Draw a record, moving to a new page when it does not fit. A record taller than
/// what is left of a page holding no other record is split, and the rest continues
/// under the repeated header.
fn draw_record(
    cursor: &mut Cursor<'_>,
    spec: &RowSpec<'_>,
    header: &RowSpec<'_>,
    col_width: f32,
) {
    let lines = row_lines(spec, col_width);
    let total = line_count(&lines);
    let mut start = 0;

    while start < total {
        let remaining = total - start;
        let available = cursor.lines_available(spec.size);
        if remaining <= available {
            draw_fragment(cursor, spec, &lines, start, total, col_width);
            return;
        }
        if cursor.rows_on_page > 0 {
            cursor.new_page();
            draw_header(cursor, header, col_width);
            continue;
        }

        let end = start + available.max(1);
        draw_fragment(cursor, spec, &lines, start, end, col_width);
        start = end;
        if start < total {
            cursor.new_page();
            draw_header(cursor, header, col_width);
        }
    }
}

/// Place the report on pages
pub fn layout(request: &ExportRequest<'_>, branding: &TemplateBranding) -> DocumentLayout {
    let (width, height) = match request.options.orientation {
        Orientation::Portrait => (A4_SHORT, A4_LONG),
        Orientation::Landscape => (A4_LONG, A4_SHORT),
    };
    let fs = f32::from(request.options.font_size);
    let palette = request.options.table_style.palette();
    let table = request.table;
    let ctx = request.context;

    let mut cursor = Cursor {
        layout: DocumentLayout {
            width,
            height,
            pages: vec![PageLayout::default()],
            cells: Vec::new(),
        },
        palette: &palette,
        y: height - TOP_MARGIN,
        rows_on_page: 0,
    };

    cursor.centered(&ctx.title, Font::Bold, fs + 6.0, Rgb::DARK_BLUE, 20.0);
    let generated = ctx
        .generated_at
        .format("Generated on: %B %d, %Y at %I:%M %p")
        .to_string();
    cursor.centered(&generated, Font::Regular, fs, Rgb::GREY, 12.0 + 20.0);

    let count = format!("Equipment Report - {} records", table.row_count());
    let count_size = fs + 2.0;
    let count_y = cursor.y - count_size;
    cursor.page().ops.push(DrawOp::Text {
        x: SIDE_MARGIN,
        y: count_y,
        font: Font::Bold,
        size: count_size,
        color: Rgb::BLACK,
        text: count,
    });
    cursor.y -= count_size * LINE_SPACING + 10.0;

    if table.column_count() > 0 {
        let col_width = (width - 2.0 * SIDE_MARGIN) / table.column_count() as f32;
        let header = RowSpec {
            cells: &table.headers,
            index: None,
            font: Font::Bold,
            size: fs + 1.0,
            color: palette.header_text,
            fill: palette.header_fill,
            bottom_rule: palette.header_rule,
        };
        draw_header(&mut cursor, &header, col_width);

        let last = table.rows.len().saturating_sub(1);
        for (i, row) in table.rows.iter().enumerate() {
            let spec = RowSpec {
                cells: row,
                index: Some(i),
                font: Font::Regular,
                size: fs,
                color: Rgb::BLACK,
                fill: palette.body_fill,
                bottom_rule: if i == last { palette.closing_rule } else { None },
            };
            draw_record(&mut cursor, &spec, &header, col_width);
        }
    }

    let mut layout = cursor.layout;
    decorate_pages(&mut layout, branding, request, fs);
    layout
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Branded header and footer, page number and timestamp on every page
fn decorate_pages(
    layout: &mut DocumentLayout,
    branding: &TemplateBranding,
    request: &ExportRequest<'_>,
    fs: f32,
) {
    let (width, height) = (layout.width, layout.height);
    let header = one_line(&branding.header_text);
    let footer = one_line(&branding.footer_text);
    let stamp = request
        .context
        .generated_at
        .format("Generated: %Y-%m-%d %H:%M")
        .to_string();

    let header_size = fs + 4.0;
    let footer_size = (fs - 1.0).max(1.0);
    let small = (fs - 2.0).max(1.0);

    for (index, page) in layout.pages.iter_mut().enumerate() {
        if !header.is_empty() {
            page.ops.push(DrawOp::Text {
                x: ((width - text_width(&header, Font::Bold, header_size)) / 2.0).max(SIDE_MARGIN),
                y: height - 0.6 * INCH,
                font: Font::Bold,
                size: header_size,
                color: Rgb::BLACK,
                text: header.clone(),
            });
            page.ops.push(DrawOp::Line {
                from: (SIDE_MARGIN, height - 0.8 * INCH),
                to: (width - SIDE_MARGIN, height - 0.8 * INCH),
                rule: HEADER_RULE,
            });
        }
        if !footer.is_empty() {
            page.ops.push(DrawOp::Text {
                x: ((width - text_width(&footer, Font::Regular, footer_size)) / 2.0)
                    .max(SIDE_MARGIN),
                y: 0.6 * INCH,
                font: Font::Regular,
                size: footer_size,
                color: Rgb::GREY,
                text: footer.clone(),
            });
            page.ops.push(DrawOp::Line {
                from: (SIDE_MARGIN, 0.8 * INCH),
                to: (width - SIDE_MARGIN, 0.8 * INCH),
                rule: FOOTER_RULE,
            });
        }

        let page_label = format!("Page {}", index + 1);
        page.ops.push(DrawOp::Text {
            x: width - SIDE_MARGIN - text_width(&page_label, Font::Regular, small),
            y: 0.3 * INCH,
            font: Font::Regular,
            size: small,
            color: Rgb::GREY,
            text: page_label,
        });
        page.ops.push(DrawOp::Text {
            x: SIDE_MARGIN,
            y: 0.3 * INCH,
            font: Font::Regular,
            size: small,
            color: Rgb::GREY,
            text: stamp.clone(),
        });
    }
}

/// WinAnsiEncoding bytes; unmappable characters become `?`
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '\t' => b' ',
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn color_operands(c: Rgb) -> Vec<Object> {
    vec![Object::Real(c.0), Object::Real(c.1), Object::Real(c.2)]
}

fn page_operations(page: &PageLayout) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("rg", color_operands(*fill)));
                ops.push(Operation::new(
                    "re",
                    vec![
                        Object::Real(*x),
                        Object::Real(*y),
                        Object::Real(*width),
                        Object::Real(*height),
                    ],
                ));
                ops.push(Operation::new("f", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Line { from, to, rule } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("RG", color_operands(rule.color)));
                ops.push(Operation::new("w", vec![Object::Real(rule.width)]));
                ops.push(Operation::new(
                    "m",
                    vec![Object::Real(from.0), Object::Real(from.1)],
                ));
                ops.push(Operation::new("l", vec![Object::Real(to.0), Object::Real(to.1)]));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![font.resource().into(), Object::Real(*size)],
                ));
                ops.push(Operation::new("rg", color_operands(*color)));
                ops.push(Operation::new("Td", vec![Object::Real(*x), Object::Real(*y)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(win_ansi(text))],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }
    ops
}

fn pdf_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(e.to_string())
}

/// Encode a layout as an uncompressed PDF
pub fn encode(layout: &DocumentLayout) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(page),
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(pdf_err)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(layout.width),
            Object::Real(layout.height),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut body = Vec::new();
    doc.save_to(&mut body).map_err(pdf_err)?;
    Ok(body)
}

pub fn render_pdf(request: &ExportRequest<'_>) -> Result<RenderedExport, ExportError> {
    let orientation = request.options.orientation;
    let branding =
        TemplateBranding::load_or_default(request.template_path, &request.context.organization)
            .substitute(&request.context.placeholders(orientation));

    let layout = layout(request, &branding);
    let body = encode(&layout)?;

    Ok(RenderedExport {
        format: ExportFormat::Pdf,
        content_type: PDF_CONTENT_TYPE,
        filename: request.context.document_filename(orientation, "pdf"),
        body,
        warning: None,
    })
}

/// Body cells per record row, wrapped lines and page fragments re-joined
#[cfg(test)]
pub(crate) fn layout_cells(layout: &DocumentLayout) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for cell in &layout.cells {
        let Some(row) = cell.row else { continue };
        if rows.len() <= row {
            rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut rows[row];
        if cells.len() <= cell.col {
            cells.resize(cell.col + 1, String::new());
        }
        cells[cell.col].push_str(&cell.lines.concat());
    }
    rows
}
