//! Minimal single-page PDF writer.
//!
//! Supports what the report layout needs: the three standard Helvetica
//! faces, text cells with optional border and grey fill, and a top-left
//! cursor measured in millimetres. Output is uncompressed PDF 1.4.

use std::io::Write as _;

use chrono::{DateTime, Utc};

use super::RenderError;

/// A4 portrait, in millimetres
pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// Page margin on every side
const MARGIN_MM: f64 = 10.0;

/// Horizontal padding between a cell edge and its text
const CELL_PADDING_MM: f64 = 1.0;

/// Points per millimetre
const K: f64 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

impl FontStyle {
    fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Italic => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
        }
    }

    /// Glyph width in 1/1000 em. Oblique shares the regular metrics.
    fn glyph_width(self, byte: u8) -> u16 {
        let table = match self {
            FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
            FontStyle::Regular | FontStyle::Italic => &HELVETICA_WIDTHS,
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            _ => 556,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Where the cursor goes after a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Right,
    NextLine,
}

/// One cell of text, the building block of the layout
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub width: f64,
    pub height: f64,
    pub text: &'a str,
    pub border: bool,
    pub fill: bool,
    pub align: Align,
    pub advance: Advance,
}

impl<'a> Cell<'a> {
    pub fn new(width: f64, height: f64, text: &'a str) -> Self {
        Self {
            width,
            height,
            text,
            border: false,
            fill: false,
            align: Align::Left,
            advance: Advance::NextLine,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn boxed(mut self, fill: bool) -> Self {
        self.border = true;
        self.fill = fill;
        self
    }

    pub fn then_right(mut self) -> Self {
        self.advance = Advance::Right;
        self
    }
}

pub struct PdfDocument {
    /// Raw content stream; text is WinAnsi bytes, not UTF-8
    content: Vec<u8>,
    x: f64,
    y: f64,
    font: FontStyle,
    font_size: f64,
    fill_gray: f64,
    title: String,
    created_at: DateTime<Utc>,
}

impl PdfDocument {
    pub fn new(title: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            content: Vec::new(),
            x: MARGIN_MM,
            y: MARGIN_MM,
            font: FontStyle::Regular,
            font_size: 12.0,
            fill_gray: 1.0,
            title: title.to_string(),
            created_at,
        }
    }

    pub fn set_font(&mut self, style: FontStyle, size_pt: f64) {
        self.font = style;
        self.font_size = size_pt;
    }

    /// Fill colour for boxed cells, as 0-255 grey
    pub fn set_fill_gray(&mut self, level: u8) {
        self.fill_gray = f64::from(level) / 255.0;
    }

    /// Move to the left margin and down by `height` millimetres
    pub fn ln(&mut self, height: f64) {
        self.x = MARGIN_MM;
        self.y += height;
    }

    /// Current vertical position, from the top edge
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Width of `text` in millimetres using the current font
    pub fn text_width(&self, text: &str) -> f64 {
        let units: u32 = encode_win_ansi(text)
            .iter()
            .map(|&b| u32::from(self.font.glyph_width(b)))
            .sum();
        f64::from(units) * self.font_size / 1000.0 / K
    }

    pub fn cell(&mut self, cell: Cell<'_>) {
        let left = self.x * K;
        let top = (PAGE_HEIGHT_MM - self.y) * K;
        let width = cell.width * K;
        let height = cell.height * K;

        if cell.fill || cell.border {
            let op = match (cell.fill, cell.border) {
                (true, true) => "B",
                (true, false) => "f",
                _ => "S",
            };
            let _ = writeln!(
                self.content,
                "{:.3} g {:.2} {:.2} {:.2} {:.2} re {}",
                self.fill_gray,
                left,
                top - height,
                width,
                height,
                op
            );
        }

        if !cell.text.is_empty() {
            let offset = match cell.align {
                Align::Left => CELL_PADDING_MM,
                Align::Center => (cell.width - self.text_width(cell.text)) / 2.0,
            };
            // Vertically centred baseline
            let baseline = self.y + cell.height / 2.0 + 0.3 * self.font_size / K;
            let _ = write!(
                self.content,
                "BT 0 g /{} {:.2} Tf {:.2} {:.2} Td (",
                self.font.resource_name(),
                self.font_size,
                (self.x + offset) * K,
                (PAGE_HEIGHT_MM - baseline) * K,
            );
            self.content.extend_from_slice(&escape_text(cell.text));
            self.content.extend_from_slice(b") Tj ET\n");
        }

        match cell.advance {
            Advance::Right => self.x += cell.width,
            Advance::NextLine => {
                self.x = MARGIN_MM;
                self.y += cell.height;
            }
        }
    }

    /// Serialize the page into a complete PDF file
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        if self.y > PAGE_HEIGHT_MM - MARGIN_MM {
            return Err(RenderError::Overflow {
                height_mm: self.y,
                limit_mm: PAGE_HEIGHT_MM - MARGIN_MM,
            });
        }

        let fonts = [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic];
        let font_refs: String = fonts
            .iter()
            .enumerate()
            .map(|(i, f)| format!("/{} {} 0 R", f.resource_name(), 5 + i))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects: Vec<Vec<u8>> = vec![
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << {} >> >> /Contents 4 0 R >>",
                PAGE_WIDTH_MM * K,
                PAGE_HEIGHT_MM * K,
                font_refs
            )
            .into_bytes(),
        ];

        let stream = &self.content;
        let mut content_obj = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        content_obj.extend_from_slice(stream);
        content_obj.extend_from_slice(b"endstream");
        objects.push(content_obj);

        for font in fonts {
            objects.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                )
                .into_bytes(),
            );
        }

        let mut info = b"<< /Title (".to_vec();
        info.extend_from_slice(&escape_text(&self.title));
        info.extend_from_slice(
            format!(
                ") /Producer (student-report) /CreationDate (D:{}Z) >>",
                self.created_at.format("%Y%m%d%H%M%S")
            )
            .as_bytes(),
        );
        objects.push(info);

        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(out, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            objects.len(),
            xref_offset
        );

        Ok(out)
    }
}

/// Map text to WinAnsi bytes. Characters outside Latin-1 become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Encode and escape text for a PDF literal string
fn escape_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for byte in encode_win_ansi(text) {
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

// Adobe Helvetica metrics for ASCII 32..=126
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a(b)c\\"), b"a\\(b\\)c\\\\".to_vec());
        assert_eq!(escape_text("naïve"), b"na\xEFve".to_vec());
        assert_eq!(escape_text("日本"), b"??".to_vec());
    }

    #[test]
    fn test_text_width() {
        let mut doc = PdfDocument::new("t", fixed_time());
        doc.set_font(FontStyle::Regular, 10.0);
        // "ii" = 2 * 222 units at 10pt
        let expected = 444.0 * 10.0 / 1000.0 / K;
        assert!((doc.text_width("ii") - expected).abs() < 1e-9);

        doc.set_font(FontStyle::Bold, 10.0);
        assert!(doc.text_width("ii") > expected);
    }

    #[test]
    fn test_cell_advances_cursor() {
        let mut doc = PdfDocument::new("t", fixed_time());
        doc.cell(Cell::new(60.0, 6.0, "Label").then_right());
        assert_eq!(doc.y(), MARGIN_MM);
        doc.cell(Cell::new(130.0, 6.0, "Value"));
        assert_eq!(doc.y(), MARGIN_MM + 6.0);
        doc.ln(4.0);
        assert_eq!(doc.y(), MARGIN_MM + 10.0);
    }

    #[test]
    fn test_finish_produces_valid_structure() {
        let mut doc = PdfDocument::new("Report", fixed_time());
        doc.set_font(FontStyle::Bold, 14.0);
        doc.set_fill_gray(240);
        doc.cell(Cell::new(190.0, 8.0, "HEADER").boxed(true));
        let bytes = doc.finish().unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("(HEADER) Tj"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/CreationDate (D:20240301120000Z)"));

        // startxref must point at the xref table
        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|s| s.lines().next())
            .and_then(|s| s.parse().ok())
            .unwrap();
        assert!(bytes[startxref..].starts_with(b"xref"));
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_latin1_text_is_written_as_winansi_bytes() {
        let mut doc = PdfDocument::new("José", fixed_time());
        doc.cell(Cell::new(190.0, 8.0, "José Müller"));
        let bytes = doc.finish().unwrap();

        assert!(contains(&bytes, b"(Jos\xE9 M\xFCller) Tj"));
        assert!(contains(&bytes, b"/Title (Jos\xE9)"));
        // No UTF-8 sequence for "é" anywhere in the file
        assert!(!contains(&bytes, "é".as_bytes()));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut doc = PdfDocument::new("t", fixed_time());
        doc.ln(PAGE_HEIGHT_MM);
        assert!(matches!(doc.finish(), Err(RenderError::Overflow { .. })));
    }
}
