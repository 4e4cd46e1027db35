//! CSV table report: one `Tables/<data type>.csv` per data type
//!
//! Set and element markers are written as two-field records ahead of their
//! tables; the writer is flexible so records may differ in length.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use super::error::{ReportError, ReportResult};
use super::modules::TableReportModule;
use super::naming::safe_file_name;

pub const TABLES_FOLDER: &str = "Tables";

const COMMENT_MARKER: &str = "# Comment";
const SET_MARKER: &str = "# Set";
const ELEMENT_MARKER: &str = "# Element";

#[derive(Default)]
pub struct CsvTableReport {
    folder: PathBuf,
    writer: Option<Writer<File>>,
    written: Vec<PathBuf>,
}

impl CsvTableReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn writer(&mut self) -> ReportResult<&mut Writer<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| ReportError::InvalidState("no data type is open".to_string()))
    }
}

impl TableReportModule for CsvTableReport {
    fn name(&self) -> &str {
        "CSV"
    }

    fn relative_file_path(&self) -> &str {
        TABLES_FOLDER
    }

    fn start_report(&mut self, report_dir: &Path) -> ReportResult<()> {
        self.folder = report_dir.join(TABLES_FOLDER);
        fs::create_dir_all(&self.folder)?;
        Ok(())
    }

    fn end_report(&mut self) -> ReportResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn start_data_type(&mut self, name: &str, comment: &str) -> ReportResult<()> {
        let path = self.folder.join(format!("{}.csv", safe_file_name(name)));
        let mut writer = WriterBuilder::new().flexible(true).from_path(&path)?;
        if !comment.is_empty() {
            writer.write_record([COMMENT_MARKER, comment])?;
        }
        self.writer = Some(writer);
        self.written.push(path);
        Ok(())
    }

    fn end_data_type(&mut self) -> ReportResult<()> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| ReportError::InvalidState("no data type is open".to_string()))?;
        writer.flush()?;
        Ok(())
    }

    fn start_set(&mut self, set_name: &str) -> ReportResult<()> {
        self.writer()?.write_record([SET_MARKER, set_name])?;
        Ok(())
    }

    fn end_set(&mut self) -> ReportResult<()> {
        Ok(())
    }

    // Sets are marked where they start
    fn add_set_index(&mut self, _sets: &[String]) -> ReportResult<()> {
        Ok(())
    }

    fn add_set_element(&mut self, element_name: &str) -> ReportResult<()> {
        self.writer()?.write_record([ELEMENT_MARKER, element_name])?;
        Ok(())
    }

    fn start_table(&mut self, headers: &[String]) -> ReportResult<()> {
        self.writer()?.write_record(headers)?;
        Ok(())
    }

    fn end_table(&mut self) -> ReportResult<()> {
        Ok(())
    }

    fn add_row(&mut self, cells: &[String]) -> ReportResult<()> {
        self.writer()?.write_record(cells)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_grouped_data_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = CsvTableReport::new();
        report.start_report(dir.path()).unwrap();
        report.start_data_type("Keyword Hits", "Contains results tagged Evidence").unwrap();
        report.start_set("ListA").unwrap();
        report.add_set_element("alpha").unwrap();
        report.start_table(&strings(&["Preview", "Source File"])).unwrap();
        report.add_row(&strings(&["a, b", "/img/x"])).unwrap();
        report.end_table().unwrap();
        report.end_set().unwrap();
        report.end_data_type().unwrap();
        report.end_report().unwrap();

        let text = fs::read_to_string(dir.path().join("Tables").join("Keyword Hits.csv")).unwrap();
        assert_eq!(
            text,
            "# Comment,Contains results tagged Evidence\n# Set,ListA\n# Element,alpha\nPreview,Source File\n\"a, b\",/img/x\n"
        );
        assert_eq!(report.written().len(), 1);
    }

    #[test]
    fn test_row_outside_data_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = CsvTableReport::new();
        report.start_report(dir.path()).unwrap();
        assert!(matches!(report.add_row(&strings(&["x"])), Err(ReportError::InvalidState(_))));
    }
}
