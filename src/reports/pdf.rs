//! Paginated PDF rendering.
//!
//! Layout is planned first as a list of positioned drawing operations, then
//! drawn with `printpdf`. Planning keeps a vertical cursor: every table starts
//! where the previous one ended, and rows that do not fit continue on a new
//! page under a repeated header row.

use printpdf::path::PaintMode;
use printpdf::*;

use super::{ReportDocument, ReportTable, TableTone};
use crate::errors::ServiceError;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const TITLE_SIZE: f32 = 18.0;
const SUBTITLE_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 9.0;

const TITLE_LINE_MM: f32 = 10.0;
const TEXT_LINE_MM: f32 = 6.0;
const HEADING_LINE_MM: f32 = 8.0;
const ROW_HEIGHT_MM: f32 = 7.0;
const CELL_PADDING_MM: f32 = 1.5;
const SECTION_GAP_MM: f32 = 8.0;

/// Approximate Helvetica advance per character at 1pt, in mm.
const CHAR_WIDTH_MM_PER_PT: f32 = 0.19;

/// RGB fill colour, components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill(pub f32, pub f32, pub f32);

pub const POSITIVE_HEADER_FILL: Fill = Fill(0.16, 0.50, 0.73);
pub const REJECTION_HEADER_FILL: Fill = Fill(0.75, 0.22, 0.17);

/// Characters the builtin fonts can show. They use WinAnsi encoding, so
/// anything outside it is replaced with `?` and control characters with a
/// space.
pub fn winansi_text(text: &str) -> String {
    const WINANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";
    text.chars()
        .map(|c| match c {
            c if c.is_control() => ' ',
            ' '..='~' | '\u{a0}'..='\u{ff}' => c,
            c if WINANSI_EXTRAS.contains(c) => c,
            _ => '?',
        })
        .collect()
}

pub fn header_fill(tone: TableTone) -> Fill {
    match tone {
        TableTone::Positive => POSITIVE_HEADER_FILL,
        TableTone::Rejection => REJECTION_HEADER_FILL,
    }
}

/// One positioned drawing operation. `top` is measured from the top edge of
/// the page in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        x: f32,
        top: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Cell {
        page: usize,
        x: f32,
        top: f32,
        width: f32,
        height: f32,
        fill: Option<Fill>,
        bold: bool,
        text: String,
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            DrawOp::Text { page, .. } | DrawOp::Cell { page, .. } => *page,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DrawOp::Text { text, .. } | DrawOp::Cell { text, .. } => text,
        }
    }
}

/// Where a table was placed: first header row to bottom of its last row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpan {
    pub heading: String,
    pub start_page: usize,
    pub start_top: f32,
    pub end_page: usize,
    pub end_top: f32,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutPlan {
    pub page_count: usize,
    pub ops: Vec<DrawOp>,
    pub tables: Vec<TableSpan>,
}

struct Cursor {
    page: usize,
    top: f32,
}

impl Cursor {
    fn fits(&self, height: f32) -> bool {
        self.top + height <= PAGE_HEIGHT_MM - MARGIN_MM
    }

    fn next_page(&mut self, plan: &mut LayoutPlan) {
        self.page += 1;
        self.top = MARGIN_MM;
        plan.page_count = self.page + 1;
    }
}

/// Column widths proportional to the longest value in each column.
fn column_widths(table: &ReportTable) -> Vec<f32> {
    let weights: Vec<f32> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(1);
            longest.clamp(4, 40) as f32
        })
        .collect();
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }
    weights
        .iter()
        .map(|w| CONTENT_WIDTH_MM * w / total)
        .collect()
}

/// Cuts `text` to what fits in `width` at `size`, marking the cut with "...".
fn fit_text(text: &str, width: f32, size: f32) -> String {
    let available = (width - 2.0 * CELL_PADDING_MM).max(0.0);
    let max_chars = (available / (CHAR_WIDTH_MM_PER_PT * size)).floor() as usize;
    let single_line: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    if max_chars <= 3 {
        return single_line.chars().take(max_chars).collect();
    }
    let mut cut: String = single_line.chars().take(max_chars - 3).collect();
    cut.push_str("...");
    cut
}

fn push_row(
    plan: &mut LayoutPlan,
    cursor: &Cursor,
    widths: &[f32],
    cells: &[String],
    fill: Option<Fill>,
    bold: bool,
) {
    let mut x = MARGIN_MM;
    for (width, cell) in widths.iter().zip(cells.iter()) {
        plan.ops.push(DrawOp::Cell {
            page: cursor.page,
            x,
            top: cursor.top,
            width: *width,
            height: ROW_HEIGHT_MM,
            fill,
            bold,
            text: fit_text(cell, *width, BODY_SIZE),
        });
        x += width;
    }
}

fn push_text(
    plan: &mut LayoutPlan,
    cursor: &mut Cursor,
    line_height: f32,
    size: f32,
    bold: bool,
    text: String,
) {
    plan.ops.push(DrawOp::Text {
        page: cursor.page,
        x: MARGIN_MM,
        top: cursor.top,
        size,
        bold,
        text,
    });
    cursor.top += line_height;
}

/// Plans the placement of every element of `document`.
pub fn plan(document: &ReportDocument) -> LayoutPlan {
    let mut plan = LayoutPlan {
        page_count: 1,
        ..Default::default()
    };
    let mut cursor = Cursor {
        page: 0,
        top: MARGIN_MM,
    };

    push_text(
        &mut plan,
        &mut cursor,
        TITLE_LINE_MM,
        TITLE_SIZE,
        true,
        document.title.clone(),
    );
    push_text(
        &mut plan,
        &mut cursor,
        TEXT_LINE_MM,
        SUBTITLE_SIZE,
        false,
        document.generated_line(),
    );
    cursor.top += TEXT_LINE_MM / 2.0;

    for line in &document.summary {
        if !cursor.fits(TEXT_LINE_MM) {
            cursor.next_page(&mut plan);
        }
        push_text(
            &mut plan,
            &mut cursor,
            TEXT_LINE_MM,
            SUBTITLE_SIZE,
            false,
            format!("{}: {}", line.label, line.value),
        );
    }

    for table in &document.tables {
        cursor.top += SECTION_GAP_MM;
        // Heading, header row and at least one body row stay together
        if !cursor.fits(HEADING_LINE_MM + 2.0 * ROW_HEIGHT_MM) {
            cursor.next_page(&mut plan);
        }
        push_text(
            &mut plan,
            &mut cursor,
            HEADING_LINE_MM,
            HEADING_SIZE,
            true,
            table.heading.clone(),
        );

        let widths = column_widths(table);
        let fill = Some(header_fill(table.tone));
        let start_page = cursor.page;
        let start_top = cursor.top;

        push_row(&mut plan, &cursor, &widths, &table.columns, fill, true);
        cursor.top += ROW_HEIGHT_MM;

        if table.rows.is_empty() {
            plan.ops.push(DrawOp::Cell {
                page: cursor.page,
                x: MARGIN_MM,
                top: cursor.top,
                width: CONTENT_WIDTH_MM,
                height: ROW_HEIGHT_MM,
                fill: None,
                bold: false,
                text: "No records".to_string(),
            });
            cursor.top += ROW_HEIGHT_MM;
        }

        for row in &table.rows {
            if !cursor.fits(ROW_HEIGHT_MM) {
                cursor.next_page(&mut plan);
                push_row(&mut plan, &cursor, &widths, &table.columns, fill, true);
                cursor.top += ROW_HEIGHT_MM;
            }
            push_row(&mut plan, &cursor, &widths, row, None, false);
            cursor.top += ROW_HEIGHT_MM;
        }

        plan.tables.push(TableSpan {
            heading: table.heading.clone(),
            start_page,
            start_top,
            end_page: cursor.page,
            end_top: cursor.top,
        });
    }

    plan
}

fn rgb(fill: Fill) -> Color {
    Color::Rgb(Rgb::new(fill.0, fill.1, fill.2, None))
}

fn pdf_error(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::ExportError(format!("pdf: {}", e))
}

/// Renders `document` to PDF bytes.
pub fn render(document: &ReportDocument) -> Result<Vec<u8>, ServiceError> {
    let layout = plan(document);

    let (doc, first_page, first_layer) = PdfDocument::new(
        document.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
    for _ in 1..layout.page_count {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        layers.push(doc.get_page(page).get_layer(layer));
    }

    let black = Fill(0.0, 0.0, 0.0);
    let white = Fill(1.0, 1.0, 1.0);

    for layer in &layers {
        layer.set_outline_color(rgb(Fill(0.55, 0.55, 0.55)));
        layer.set_outline_thickness(0.3);
    }

    for op in &layout.ops {
        let layer = layers
            .get(op.page())
            .ok_or_else(|| pdf_error(format!("page {} was not allocated", op.page())))?;
        match op {
            DrawOp::Text {
                x,
                top,
                size,
                bold: is_bold,
                text,
                ..
            } => {
                layer.set_fill_color(rgb(black));
                let font = if *is_bold { &bold } else { &regular };
                let baseline = PAGE_HEIGHT_MM - top - size * 0.3528;
                layer.use_text(winansi_text(text), *size, Mm(*x), Mm(baseline), font);
            }
            DrawOp::Cell {
                x,
                top,
                width,
                height,
                fill,
                bold: is_bold,
                text,
                ..
            } => {
                let bottom = PAGE_HEIGHT_MM - top - height;
                let rect = Rect::new(
                    Mm(*x),
                    Mm(bottom),
                    Mm(x + width),
                    Mm(PAGE_HEIGHT_MM - top),
                );
                match fill {
                    Some(color) => {
                        layer.set_fill_color(rgb(*color));
                        layer.add_rect(rect.with_mode(PaintMode::FillStroke));
                        layer.set_fill_color(rgb(white));
                    }
                    None => {
                        layer.add_rect(rect.with_mode(PaintMode::Stroke));
                        layer.set_fill_color(rgb(black));
                    }
                }
                let font = if *is_bold { &bold } else { &regular };
                layer.use_text(
                    winansi_text(text),
                    BODY_SIZE,
                    Mm(x + CELL_PADDING_MM),
                    Mm(bottom + 2.2),
                    font,
                );
            }
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::SummaryLine;
    use chrono::Utc;

    #[test]
    fn text_outside_winansi_is_replaced() {
        assert_eq!(winansi_text("Kedelai Ä 5 €"), "Kedelai Ä 5 €");
        assert_eq!(winansi_text("大豆 tempe"), "?? tempe");
        assert_eq!(winansi_text("basah\nmenggumpal"), "basah menggumpal");
    }

    fn table(heading: &str, tone: TableTone, rows: usize) -> ReportTable {
        ReportTable {
            heading: heading.to_string(),
            tone,
            columns: vec!["Material".into(), "Quantity".into()],
            rows: (0..rows)
                .map(|i| vec![format!("Bahan {}", i), i.to_string()])
                .collect(),
        }
    }

    fn document(tables: Vec<ReportTable>) -> ReportDocument {
        ReportDocument {
            title: "Material Analytics Report".into(),
            generated_at: Utc::now(),
            summary: vec![SummaryLine {
                label: "Total Stock".into(),
                value: "10".into(),
            }],
            tables,
        }
    }

    #[test]
    fn empty_document_renders_title_and_headers() {
        let doc = document(vec![
            table("Products", TableTone::Positive, 0),
            table("Rejected Items", TableTone::Rejection, 0),
        ]);
        let layout = plan(&doc);
        assert_eq!(layout.page_count, 1);
        assert_eq!(layout.ops[0].text(), "Material Analytics Report");
        assert!(layout.ops[1].text().starts_with("Generated: "));
        assert!(layout.ops.iter().any(|op| op.text() == "Total Stock: 10"));
        assert_eq!(
            layout.ops.iter().filter(|op| op.text() == "Material").count(),
            2
        );

        let bytes = render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn tables_stack_from_where_the_previous_one_ended() {
        let doc = document(vec![
            table("Products", TableTone::Positive, 5),
            table("Rejected Items", TableTone::Rejection, 2),
        ]);
        let layout = plan(&doc);
        let first = &layout.tables[0];
        let second = &layout.tables[1];

        assert_eq!(first.end_top - first.start_top, 6.0 * ROW_HEIGHT_MM);
        assert_eq!(
            second.start_top,
            first.end_top + SECTION_GAP_MM + HEADING_LINE_MM
        );

        let longer = plan(&document(vec![
            table("Products", TableTone::Positive, 9),
            table("Rejected Items", TableTone::Rejection, 2),
        ]));
        assert_eq!(
            longer.tables[1].start_top - second.start_top,
            4.0 * ROW_HEIGHT_MM
        );
    }

    #[test]
    fn header_fills_differ_by_tone() {
        let layout = plan(&document(vec![
            table("Products", TableTone::Positive, 1),
            table("Rejected Items", TableTone::Rejection, 1),
        ]));
        let fills: Vec<Fill> = layout
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Cell {
                    fill: Some(fill), ..
                } => Some(*fill),
                _ => None,
            })
            .collect();
        assert!(fills.contains(&POSITIVE_HEADER_FILL));
        assert!(fills.contains(&REJECTION_HEADER_FILL));
        assert_ne!(POSITIVE_HEADER_FILL, REJECTION_HEADER_FILL);
    }

    #[test]
    fn long_tables_continue_on_new_pages_with_repeated_header() {
        let doc = document(vec![table("Products", TableTone::Positive, 80)]);
        let layout = plan(&doc);

        assert!(layout.page_count >= 3);
        let span = &layout.tables[0];
        assert_eq!(span.start_page, 0);
        assert_eq!(span.end_page, layout.page_count - 1);

        for page in 0..layout.page_count {
            let header_cells = layout
                .ops
                .iter()
                .filter(|op| op.page() == page && op.text() == "Material")
                .count();
            assert_eq!(header_cells, 1, "page {} should repeat the header", page);
        }

        for op in &layout.ops {
            if let DrawOp::Cell { top, height, .. } = op {
                assert!(top + height <= PAGE_HEIGHT_MM - MARGIN_MM + 0.001);
            }
        }

        let bytes = render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn overlong_cells_are_cut() {
        let cut = fit_text(&"x".repeat(500), 30.0, BODY_SIZE);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() < 500);
        assert_eq!(fit_text("Beras", 30.0, BODY_SIZE), "Beras");
        assert_eq!(fit_text("a\nb", 30.0, BODY_SIZE), "a b");
    }
}
