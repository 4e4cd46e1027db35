//! Case Report Generator Module
//!
//! Turns the contents of a case database into report files. Three kinds of
//! run are supported, each fanned out to every enabled module of its kind.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Report Generator                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐  │
//! │  │    Case      │───▶│   Schema +   │───▶│   Fan-out    │  │
//! │  │  (SQLite)    │    │  Projector   │    │   worker     │  │
//! │  └──────────────┘    └──────────────┘    └──────────────┘  │
//! │                                                 │          │
//! │                                                 ▼          │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │                  Report Modules                       │  │
//! │  │  ┌────────┐  ┌────────┐  ┌────────┐  ┌────────────┐  │  │
//! │  │  │  HTML  │  │  CSV   │  │  DOCX  │  │ file list, │  │  │
//! │  │  │  tera  │  │  csv   │  │docx-rs │  │  summary   │  │  │
//! │  │  └────────┘  └────────┘  └────────┘  └────────────┘  │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let pool = Arc::new(ReportWorkerPool::new(2)?);
//! let modules = EnabledModules {
//!     table: vec![TableFormat::Html.module("Case 1", None)],
//!     ..Default::default()
//! };
//! let mut generator = ReportGenerator::new(case, &case_info, modules, pool)?;
//! let outcome = generator.generate_table_reports(selection).wait()?;
//! ```

pub mod csv_table;
pub mod docx;
pub mod error;
pub mod fanout;
pub mod file_list;
pub mod file_worker;
pub mod generator;
pub mod html;
pub mod modules;
pub mod naming;
pub mod progress;
pub mod projector;
pub mod schema;
pub mod summary;
pub mod table_worker;
pub mod tags;
pub mod task;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use csv_table::CsvTableReport;
pub use docx::DocxTableReport;
pub use error::{ErrorLog, ReportError, ReportResult};
pub use fanout::{RunOutcome, RunStatus};
pub use file_list::TsvFileListReport;
pub use generator::{CaseInfo, EnabledModules, ReportGenerator};
pub use html::HtmlReport;
pub use modules::{FileReportDataType, FileReportModule, GeneralReportModule, TableReportModule};
pub use progress::{ProgressEvent, ProgressSnapshot, ReportProgress, ReportStatus};
pub use summary::CaseSummaryReport;
pub use table_worker::TableSelection;
pub use tags::TagFilter;
pub use task::{CancelFlag, ReportWorkerPool, TaskError, TaskHandle};
pub use template::TemplateEngine;

use std::path::Path;
use std::str::FromStr;

/// Table report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// HTML pages (using Tera templates)
    Html,
    /// One CSV file per data type
    Csv,
    /// Microsoft Word document (using docx-rs)
    Docx,
}

impl TableFormat {
    pub const ALL: [TableFormat; 3] = [TableFormat::Html, TableFormat::Csv, TableFormat::Docx];

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Html => "html",
            TableFormat::Csv => "csv",
            TableFormat::Docx => "docx",
        }
    }

    /// Build the table module for this format
    pub fn module(&self, case_name: &str, template_dir: Option<&Path>) -> Box<dyn TableReportModule> {
        match self {
            TableFormat::Html => {
                let report = HtmlReport::new(case_name);
                match template_dir {
                    Some(dir) => Box::new(report.with_template_dir(dir)),
                    None => Box::new(report),
                }
            }
            TableFormat::Csv => Box::new(CsvTableReport::new()),
            TableFormat::Docx => Box::new(DocxTableReport::new(case_name)),
        }
    }
}

impl FromStr for TableFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TableFormat::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ReportError::Config(format!("unknown table format: {}", s)))
    }
}
