//! Tab-separated file list: `file-list.txt`

use std::fs::File;
use std::path::Path;

use csv::{QuoteStyle, Writer, WriterBuilder};

use super::error::{ReportError, ReportResult};
use super::modules::{FileReportDataType, FileReportModule};
use crate::case::FileRecord;

pub const FILE_LIST_NAME: &str = "file-list.txt";

#[derive(Default)]
pub struct TsvFileListReport {
    writer: Option<Writer<File>>,
}

impl TsvFileListReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn writer(&mut self) -> ReportResult<&mut Writer<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| ReportError::InvalidState("file list was not started".to_string()))
    }
}

impl FileReportModule for TsvFileListReport {
    fn name(&self) -> &str {
        "Files - Text"
    }

    fn relative_file_path(&self) -> &str {
        FILE_LIST_NAME
    }

    fn start_report(&mut self, report_dir: &Path) -> ReportResult<()> {
        let writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Necessary)
            .from_path(report_dir.join(FILE_LIST_NAME))?;
        self.writer = Some(writer);
        Ok(())
    }

    fn end_report(&mut self) -> ReportResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn start_table(&mut self, columns: &[FileReportDataType]) -> ReportResult<()> {
        self.writer()?.write_record(columns.iter().map(|c| c.name()))?;
        Ok(())
    }

    fn add_row(&mut self, file: &FileRecord, columns: &[FileReportDataType]) -> ReportResult<()> {
        self.writer()?.write_record(columns.iter().map(|c| c.value(file)))?;
        Ok(())
    }

    fn end_table(&mut self) -> ReportResult<()> {
        self.writer()?.flush()?;
        Ok(())
    }
}
