//! Report rendering.
//!
//! `ReportRenderer` turns a `Student` into a binary document;
//! `PdfReportRenderer` is the fixed A4 layout served by the report endpoints.

pub mod pdf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::models::Student;
use crate::utils::{format_date, int_or_na, value_or_na};
use pdf::{Cell, FontStyle, PdfDocument};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("report content overflows the page ({height_mm:.1}mm of {limit_mm:.1}mm)")]
    Overflow { height_mm: f64, limit_mm: f64 },
}

pub trait ReportRenderer: Send + Sync {
    /// MIME type of the rendered document
    fn content_type(&self) -> &'static str;

    fn render(&self, student: &Student) -> Result<Vec<u8>, RenderError>;
}

/// Printable width between the margins
const CONTENT_WIDTH_MM: f64 = 190.0;
const LABEL_WIDTH_MM: f64 = 60.0;
const VALUE_WIDTH_MM: f64 = 130.0;
const ROW_HEIGHT_MM: f64 = 6.0;
const SECTION_GAP_MM: f64 = 5.0;

/// Grey used behind section headers
const HEADER_FILL: u8 = 240;

#[derive(Debug, Clone, Default)]
pub struct PdfReportRenderer;

impl PdfReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render with an explicit generation timestamp
    pub fn render_at(
        &self,
        student: &Student,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>, RenderError> {
        let mut doc = PdfDocument::new(&format!("Student Report - {}", student.name), generated_at);

        doc.set_font(FontStyle::Bold, 20.0);
        doc.cell(Cell::new(CONTENT_WIDTH_MM, 10.0, "STUDENT REPORT").centered());
        doc.ln(5.0);

        doc.set_font(FontStyle::Regular, 12.0);
        doc.cell(Cell::new(CONTENT_WIDTH_MM, 8.0, "School Management System").centered());
        let generated = format!("Generated on: {}", generated_at.format("%B %-d, %Y"));
        doc.cell(Cell::new(CONTENT_WIDTH_MM, 8.0, &generated).centered());
        doc.ln(10.0);

        section(&mut doc, "PERSONAL INFORMATION");
        row(&mut doc, "Student ID:", &student.id.to_string());
        row(&mut doc, "Full Name:", &student.name);
        row(&mut doc, "Email:", &student.email);
        row(&mut doc, "Phone:", &value_or_na(student.phone.as_deref()));
        row(&mut doc, "Gender:", &value_or_na(student.gender.as_deref()));
        row(&mut doc, "Date of Birth:", &format_date(student.dob.as_deref()));
        doc.ln(SECTION_GAP_MM);

        section(&mut doc, "ACADEMIC INFORMATION");
        row(&mut doc, "Class:", &value_or_na(student.class.as_deref()));
        row(&mut doc, "Section:", &value_or_na(student.section.as_deref()));
        row(&mut doc, "Roll Number:", &int_or_na(student.roll));
        row(&mut doc, "Admission Date:", &format_date(student.admission_date.as_deref()));
        row(&mut doc, "System Access:", &student.system_access.to_string());
        doc.ln(SECTION_GAP_MM);

        section(&mut doc, "FAMILY INFORMATION");
        row(&mut doc, "Father's Name:", &value_or_na(student.father_name.as_deref()));
        row(&mut doc, "Father's Phone:", &value_or_na(student.father_phone.as_deref()));
        row(&mut doc, "Mother's Name:", &value_or_na(student.mother_name.as_deref()));
        row(&mut doc, "Mother's Phone:", &value_or_na(student.mother_phone.as_deref()));
        row(&mut doc, "Guardian's Name:", &value_or_na(student.guardian_name.as_deref()));
        row(&mut doc, "Guardian's Phone:", &value_or_na(student.guardian_phone.as_deref()));
        row(
            &mut doc,
            "Relation to Guardian:",
            &value_or_na(student.relation_of_guardian.as_deref()),
        );
        doc.ln(SECTION_GAP_MM);

        section(&mut doc, "ADDRESS INFORMATION");
        row(&mut doc, "Current Address:", &value_or_na(student.current_address.as_deref()));
        row(&mut doc, "Permanent Address:", &value_or_na(student.permanent_address.as_deref()));
        doc.ln(SECTION_GAP_MM);

        section(&mut doc, "ADDITIONAL INFORMATION");
        row(&mut doc, "Reporter/Class Teacher:", &value_or_na(student.reporter_name.as_deref()));

        doc.ln(20.0);
        doc.set_font(FontStyle::Italic, 10.0);
        doc.cell(
            Cell::new(
                CONTENT_WIDTH_MM,
                8.0,
                "This report was generated automatically by the School Management System",
            )
            .centered(),
        );
        doc.cell(
            Cell::new(
                CONTENT_WIDTH_MM,
                8.0,
                "For any queries, please contact the school administration",
            )
            .centered(),
        );

        let bytes = doc.finish()?;
        debug!(id = student.id, bytes = bytes.len(), "Rendered student report");
        Ok(bytes)
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, student: &Student) -> Result<Vec<u8>, RenderError> {
        self.render_at(student, Utc::now())
    }
}

fn section(doc: &mut PdfDocument, title: &str) {
    doc.set_font(FontStyle::Bold, 14.0);
    doc.set_fill_gray(HEADER_FILL);
    doc.cell(Cell::new(CONTENT_WIDTH_MM, 8.0, title).boxed(true));
    doc.ln(2.0);
}

fn row(doc: &mut PdfDocument, label: &str, value: &str) {
    doc.set_font(FontStyle::Bold, 11.0);
    doc.cell(Cell::new(LABEL_WIDTH_MM, ROW_HEIGHT_MM, label).then_right());
    doc.set_font(FontStyle::Regular, 11.0);
    doc.cell(Cell::new(VALUE_WIDTH_MM, ROW_HEIGHT_MM, value));
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::mock_student;

    fn render_text(student: &Student) -> String {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let bytes = PdfReportRenderer::new().render_at(student, at).unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_render_mock_student() {
        let bytes = PdfReportRenderer::new().render(&mock_student()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000, "PDF should have substantial content");
    }

    #[test]
    fn test_report_contents() {
        let text = render_text(&mock_student());
        for expected in [
            "(STUDENT REPORT) Tj",
            "(Generated on: March 1, 2024) Tj",
            "(PERSONAL INFORMATION) Tj",
            "(John Doe) Tj",
            "(May 15, 1995) Tj",
            "(Grade 10) Tj",
            "(15) Tj",
            "(September 1, 2020) Tj",
            "(true) Tj",
            "(Father's Name:) Tj",
            "(Reporter/Class Teacher:) Tj",
            "(Ms. Sarah Johnson) Tj",
        ] {
            assert!(text.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn test_missing_fields_render_placeholder() {
        let student = Student {
            phone: None,
            gender: Some(String::new()),
            roll: None,
            dob: None,
            ..mock_student()
        };
        let text = render_text(&student);
        assert!(text.matches("(N/A) Tj").count() >= 4);
    }

    #[test]
    fn test_non_ascii_name_renders_winansi() {
        let student = Student {
            name: "José".to_string(),
            ..mock_student()
        };
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let bytes = PdfReportRenderer::new().render_at(&student, at).unwrap();

        let expected: &[u8] = b"(Jos\xE9) Tj";
        assert!(bytes.windows(expected.len()).any(|w| w == expected));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(PdfReportRenderer::new().content_type(), "application/pdf");
    }
}
