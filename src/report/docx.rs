//! Word table report using docx-rs
//!
//! Writes `Word Report/report.docx`: a heading per data type, its comment,
//! set and element headings, and one Word table per table.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use docx_rs::*;

use super::error::{ReportError, ReportResult};
use super::modules::TableReportModule;

pub const WORD_FOLDER: &str = "Word Report";
const FILE_NAME: &str = "report.docx";

/// DOCX table report
pub struct DocxTableReport {
    case_name: String,
    output_path: PathBuf,
    docx: Option<Docx>,
    table: Option<Vec<TableRow>>,
}

impl DocxTableReport {
    pub fn new(case_name: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            output_path: PathBuf::new(),
            docx: None,
            table: None,
        }
    }

    /// Apply `f` to the open document
    fn edit(&mut self, f: impl FnOnce(Docx) -> Docx) -> ReportResult<()> {
        let docx = self
            .docx
            .take()
            .ok_or_else(|| ReportError::InvalidState("Word report was not started".to_string()))?;
        self.docx = Some(f(docx));
        Ok(())
    }

    fn rows(&mut self) -> ReportResult<&mut Vec<TableRow>> {
        self.table
            .as_mut()
            .ok_or_else(|| ReportError::InvalidState("no table is open".to_string()))
    }

    fn heading(text: &str, size: usize) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text).bold().size(size))
    }

    fn header_cell(text: &str) -> TableCell {
        TableCell::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(text).bold().size(18).color("FFFFFF"))
            )
            .shading(Shading::new().fill("1a365d")) // Dark blue background
    }

    fn data_cell(text: &str) -> TableCell {
        TableCell::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text).size(18)))
    }
}

impl TableReportModule for DocxTableReport {
    fn name(&self) -> &str {
        "Word"
    }

    fn relative_file_path(&self) -> &str {
        "Word Report/report.docx"
    }

    fn start_report(&mut self, report_dir: &Path) -> ReportResult<()> {
        let folder = report_dir.join(WORD_FOLDER);
        fs::create_dir_all(&folder)?;
        self.output_path = folder.join(FILE_NAME);

        let generated = format!("Generated {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        let docx = Docx::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(&self.case_name).bold().size(36)) // 18pt
                    .align(AlignmentType::Center),
            )
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(&generated).size(16))
                    .align(AlignmentType::Center),
            )
            .add_paragraph(Paragraph::new());
        self.docx = Some(docx);
        Ok(())
    }

    fn end_report(&mut self) -> ReportResult<()> {
        let docx = self
            .docx
            .take()
            .ok_or_else(|| ReportError::InvalidState("Word report was not started".to_string()))?;

        // pack() needs Write + Seek; File has both
        let file = File::create(&self.output_path)?;
        docx.build()
            .pack(file)
            .map_err(|e| ReportError::Docx(e.to_string()))?;
        Ok(())
    }

    fn start_data_type(&mut self, name: &str, comment: &str) -> ReportResult<()> {
        self.edit(|docx| {
            let docx = docx.add_paragraph(Self::heading(name, 28)); // 14pt
            if comment.is_empty() {
                docx
            } else {
                docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text(comment).italic().size(20)),
                )
            }
        })
    }

    fn end_data_type(&mut self) -> ReportResult<()> {
        self.edit(|docx| docx.add_paragraph(Paragraph::new()))
    }

    fn start_set(&mut self, set_name: &str) -> ReportResult<()> {
        self.edit(|docx| docx.add_paragraph(Self::heading(set_name, 24)))
    }

    fn end_set(&mut self) -> ReportResult<()> {
        Ok(())
    }

    fn add_set_index(&mut self, sets: &[String]) -> ReportResult<()> {
        if sets.is_empty() {
            return Ok(());
        }
        let listing = format!("Sets: {}", sets.join(", "));
        self.edit(|docx| {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(&listing).size(20)))
        })
    }

    fn add_set_element(&mut self, element_name: &str) -> ReportResult<()> {
        self.edit(|docx| docx.add_paragraph(Self::heading(element_name, 20)))
    }

    fn start_table(&mut self, headers: &[String]) -> ReportResult<()> {
        let header_row = TableRow::new(headers.iter().map(|h| Self::header_cell(h)).collect());
        self.table = Some(vec![header_row]);
        Ok(())
    }

    fn end_table(&mut self) -> ReportResult<()> {
        let rows = self
            .table
            .take()
            .ok_or_else(|| ReportError::InvalidState("no table is open".to_string()))?;
        self.edit(|docx| {
            docx.add_table(Table::new(rows))
                .add_paragraph(Paragraph::new()) // Spacer
        })
    }

    fn add_row(&mut self, cells: &[String]) -> ReportResult<()> {
        let row = TableRow::new(cells.iter().map(|c| Self::data_cell(c)).collect());
        self.rows()?.push(row);
        Ok(())
    }
}
