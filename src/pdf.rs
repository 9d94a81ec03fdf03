use std::io::BufWriter;

use printpdf::*;

use crate::error::{DugsiError, Result};
use crate::reports::ReportTable;
use crate::settings::Settings;

// A4 landscape (mm)
const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 15.0;
const ROW_H: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;

const RANK_W: f32 = 14.0;
const NAME_W: f32 = 60.0;
const TOTAL_W: f32 = 26.0;
const GRADE_W: f32 = 16.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.len() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DugsiError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DugsiError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc
            .get_page(self.current_page)
            .get_layer(self.current_layer)
    }

    /// Starts a new page and repeats the column header on it.
    fn ensure_space(&mut self, needed: f32, cols: &[Col], headers: &[&str]) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
            self.current_page = page;
            self.current_layer = layer;
            self.y = MARGIN_TOP;
            self.table_header(cols, headers);
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer().use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn hline(&self) {
        let layer = self.layer();
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(self.pdf_y())), false),
                (Point::new(Mm(PAGE_W - MARGIN_RIGHT), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        });
    }

    fn header(&mut self, title: &str, settings: &Settings, subtitle: &str) {
        self.text(&settings.school_name, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        if !settings.address.is_empty() {
            self.text(&settings.address, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        self.text(title, MARGIN_LEFT, SUBTITLE_SIZE, true);
        self.y += 5.0;
        self.text(subtitle, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 5.0;
        let ts = chrono::Local::now().format("Generated %Y-%m-%d %H:%M").to_string();
        self.text(&ts, MARGIN_LEFT, 8.0, false);
        self.y += 5.0;
        self.hline();
        self.y += 5.0;
    }

    fn cells(&self, cols: &[Col], values: &[&str], bold: bool) {
        let mut x = MARGIN_LEFT;
        for (col, value) in cols.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + col.width - tw, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.cells(cols, headers, true);
        self.y += ROW_H;
        self.hline();
        self.y += 2.0;
    }

    fn table_row(&mut self, cols: &[Col], headers: &[&str], values: &[&str]) {
        self.ensure_space(ROW_H, cols, headers);
        self.cells(cols, values, false);
        self.y += ROW_H;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| DugsiError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| DugsiError::Pdf(e.to_string()))
    }
}

/// Rank and name on the left, subject averages sharing whatever width is
/// left, then overall average and grade.
fn report_columns(subject_count: usize) -> Vec<Col> {
    let usable = PAGE_W - MARGIN_LEFT - MARGIN_RIGHT;
    let fixed = RANK_W + NAME_W + TOTAL_W + GRADE_W;
    let subject_w = (usable - fixed) / subject_count.max(1) as f32;

    let mut cols = vec![
        Col { width: RANK_W, align: Align::Left },
        Col { width: NAME_W, align: Align::Left },
    ];
    cols.extend((0..subject_count).map(|_| Col { width: subject_w, align: Align::Right }));
    cols.push(Col { width: TOTAL_W, align: Align::Right });
    cols.push(Col { width: GRADE_W, align: Align::Right });
    cols
}

pub fn render_report(table: &ReportTable, settings: &Settings, term: &str, class_label: &str) -> Result<Vec<u8>> {
    let title = format!("Academic Report - {term}");
    let mut pdf = PdfWriter::new(&title)?;
    pdf.header(&title, settings, &format!("Class: {class_label}"));

    let cols = report_columns(table.headers.len().saturating_sub(4));
    let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    pdf.table_header(&cols, &headers);

    if table.rows.is_empty() {
        pdf.text("No exams recorded for this term.", MARGIN_LEFT, FONT_SIZE, false);
    }
    for row in &table.rows {
        let values: Vec<&str> = row.iter().map(String::as_str).collect();
        pdf.table_row(&cols, &headers, &values);
    }

    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> ReportTable {
        ReportTable {
            headers: ["Rank", "Student Name", "MATH", "ENG", "Total Avg", "Grade"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: (1..=rows)
                .map(|i| {
                    vec![
                        i.to_string(),
                        format!("Student {i}"),
                        "80".to_string(),
                        "-".to_string(),
                        "80.0%".to_string(),
                        "B".to_string(),
                    ]
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_report_produces_pdf() {
        let bytes = render_report(&table(3), &Settings::default(), "Term 1", "All Classes").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_report() {
        let bytes = render_report(&table(0), &Settings::default(), "Term 9", "Form 4").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_report_spans_pages() {
        let bytes = render_report(&table(80), &Settings::default(), "Term 1", "All Classes").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_columns_fill_page_width() {
        let cols = report_columns(5);
        let total: f32 = cols.iter().map(|c| c.width).sum();
        assert!((total - (PAGE_W - MARGIN_LEFT - MARGIN_RIGHT)).abs() < 0.01);
        assert_eq!(cols.len(), 9);
    }
}
