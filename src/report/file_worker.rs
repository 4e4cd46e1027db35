//! File list report run

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use super::error::ErrorLog;
use super::fanout::{Active, ActiveSet, RunOutcome};
use super::modules::{FileReportDataType, FileReportModule};
use super::task::CancelFlag;
use crate::case::CaseDataSource;

/// Status label refresh interval, in files
const LABEL_INTERVAL: usize = 100;

pub struct FileListWorker {
    case: Arc<dyn CaseDataSource>,
    modules: ActiveSet<dyn FileReportModule>,
    report_path: PathBuf,
    columns: Vec<FileReportDataType>,
    errors: ErrorLog,
}

impl FileListWorker {
    pub fn new(
        case: Arc<dyn CaseDataSource>,
        modules: Vec<Active<dyn FileReportModule>>,
        report_path: PathBuf,
        columns: Vec<FileReportDataType>,
    ) -> Self {
        let errors = ErrorLog::new();
        Self {
            case,
            modules: ActiveSet::new(modules, errors.clone()),
            report_path,
            columns,
            errors,
        }
    }

    pub fn run(mut self, cancel: &CancelFlag) -> RunOutcome {
        self.modules.remove_cancelled(cancel);
        if self.modules.is_empty() {
            return self.modules.finish(cancel);
        }
        for progress in self.modules.progress() {
            progress.start();
            progress.set_indeterminate(true);
            progress.update_label("Querying database...");
        }

        // Nothing is written until the file list is in hand
        let files = match self.case.all_files() {
            Ok(files) => files,
            Err(e) => {
                self.errors.record(format!("Failed to get the list of files: {}", e));
                self.modules.fail_all("Failed to get the list of files");
                return self.modules.finish(cancel);
            }
        };
        info!(files = files.len(), columns = self.columns.len(), "File list run started");

        let report_path = self.report_path.clone();
        let columns = self.columns.clone();
        self.modules.broadcast("start report", |m| m.start_report(&report_path));
        self.modules.broadcast("start a table", |m| m.start_table(&columns));
        for progress in self.modules.progress() {
            progress.set_maximum(files.len() as u64);
        }

        for (i, file) in files.iter().enumerate() {
            self.modules.remove_cancelled(cancel);
            if self.modules.is_empty() {
                break;
            }
            if i % LABEL_INTERVAL == 0 {
                self.modules
                    .update_label(&format!("Now processing {}...", file.name));
            }
            self.modules.broadcast("add a row", |m| m.add_row(file, &columns));
            self.modules.increment();
        }

        self.modules.remove_cancelled(cancel);
        self.modules.broadcast("end a table", |m| m.end_table());
        self.modules.broadcast("end report", |m| m.end_report());
        self.modules.finish(cancel)
    }
}
