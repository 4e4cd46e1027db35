//! Report generator
//!
//! Creates the report run folder, owns one progress handle per enabled module
//! and submits the three kinds of run (table, file list, general) to the
//! worker pool.
//!
//! Folder layout: `<report directory>/<case name> <MM-dd-yyyy-HH-mm-ss>/`,
//! each module writing below it at its relative path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use super::error::{ErrorLog, ReportError, ReportResult};
use super::fanout::{Active, RunOutcome, RunStatus};
use super::file_worker::FileListWorker;
use super::modules::{FileReportDataType, FileReportModule, GeneralReportModule, TableReportModule};
use super::progress::{ProgressEvent, ReportProgress};
use super::table_worker::{TableReportWorker, TableSelection};
use super::task::{CancelFlag, ReportWorkerPool, TaskHandle};
use crate::audit;
use crate::case::CaseDataSource;

/// Timestamp suffix of the report run folder
pub const FOLDER_TIMESTAMP_FORMAT: &str = "%m-%d-%Y-%H-%M-%S";

#[derive(Debug, Clone)]
pub struct CaseInfo {
    pub name: String,
    /// Parent of every report run folder for this case
    pub report_directory: PathBuf,
}

/// Modules the user enabled for this generator
#[derive(Default)]
pub struct EnabledModules {
    pub table: Vec<Box<dyn TableReportModule>>,
    pub file: Vec<Box<dyn FileReportModule>>,
    pub general: Vec<Box<dyn GeneralReportModule>>,
}

pub struct ReportGenerator {
    case: Arc<dyn CaseDataSource>,
    report_path: PathBuf,
    pool: Arc<ReportWorkerPool>,
    table: Vec<Active<dyn TableReportModule>>,
    file: Vec<Active<dyn FileReportModule>>,
    general: Vec<Active<dyn GeneralReportModule>>,
    progress: Vec<Arc<ReportProgress>>,
}

impl ReportGenerator {
    pub fn new(
        case: Arc<dyn CaseDataSource>,
        case_info: &CaseInfo,
        modules: EnabledModules,
        pool: Arc<ReportWorkerPool>,
    ) -> ReportResult<Self> {
        Self::with_observer(case, case_info, modules, pool, None)
    }

    /// Like [`new`](Self::new), forwarding every progress change to `observer`
    pub fn with_observer(
        case: Arc<dyn CaseDataSource>,
        case_info: &CaseInfo,
        modules: EnabledModules,
        pool: Arc<ReportWorkerPool>,
        observer: Option<UnboundedSender<ProgressEvent>>,
    ) -> ReportResult<Self> {
        let report_path = create_report_folder(case_info)?;
        info!(path = %report_path.display(), "Report folder created");

        let mut all_progress = Vec::new();
        let mut track = |name: &str, relative: &str| {
            let mut progress = ReportProgress::new(name, Some(report_path.join(relative)));
            if let Some(tx) = &observer {
                progress = progress.with_observer(tx.clone());
            }
            let progress = Arc::new(progress);
            all_progress.push(Arc::clone(&progress));
            progress
        };

        let table = modules
            .table
            .into_iter()
            .map(|m| {
                let progress = track(m.name(), m.relative_file_path());
                Active::new(m, progress)
            })
            .collect();
        let file = modules
            .file
            .into_iter()
            .map(|m| {
                let progress = track(m.name(), m.relative_file_path());
                Active::new(m, progress)
            })
            .collect();
        let general = modules
            .general
            .into_iter()
            .map(|m| {
                let progress = track(m.name(), m.relative_file_path());
                Active::new(m, progress)
            })
            .collect();

        Ok(Self {
            case,
            report_path,
            pool,
            table,
            file,
            general,
            progress: all_progress,
        })
    }

    /// The run folder every module writes below
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Progress of every enabled module, in table, file, general order
    pub fn progress(&self) -> &[Arc<ReportProgress>] {
        &self.progress
    }

    /// Stream the selected artifact types and the tag sections to the table modules
    pub fn generate_table_reports(&mut self, selection: TableSelection) -> TaskHandle<RunOutcome> {
        let modules = std::mem::take(&mut self.table);
        let case = Arc::clone(&self.case);
        let report_path = self.report_path.clone();
        audit::log_report_run_started("table", &report_path, modules.len());

        self.pool.submit(move |cancel: &CancelFlag| {
            let outcome = TableReportWorker::new(case, modules, report_path.clone(), selection).run(cancel);
            audit::log_report_run_finished("table", &report_path, &outcome);
            outcome
        })
    }

    /// One row per file, with the given columns, to the file modules
    pub fn generate_file_list_reports(
        &mut self,
        columns: Vec<FileReportDataType>,
    ) -> TaskHandle<RunOutcome> {
        let modules = std::mem::take(&mut self.file);
        let case = Arc::clone(&self.case);
        let report_path = self.report_path.clone();
        audit::log_report_run_started("file list", &report_path, modules.len());

        self.pool.submit(move |cancel: &CancelFlag| {
            let outcome = FileListWorker::new(case, modules, report_path.clone(), columns).run(cancel);
            audit::log_report_run_finished("file list", &report_path, &outcome);
            outcome
        })
    }

    /// Run each general module against the case
    pub fn generate_general_reports(&mut self) -> TaskHandle<RunOutcome> {
        let modules = std::mem::take(&mut self.general);
        let case = Arc::clone(&self.case);
        let report_path = self.report_path.clone();
        audit::log_report_run_started("general", &report_path, modules.len());

        self.pool.submit(move |cancel: &CancelFlag| {
            let outcome = run_general_reports(case, modules, &report_path, cancel);
            audit::log_report_run_finished("general", &report_path, &outcome);
            outcome
        })
    }
}

/// `<report dir>/<case name> <timestamp>`, created before any module runs
fn create_report_folder(case_info: &CaseInfo) -> ReportResult<PathBuf> {
    let folder = format!(
        "{} {}",
        case_info.name,
        Local::now().format(FOLDER_TIMESTAMP_FORMAT)
    );
    let path = case_info.report_directory.join(folder);
    fs::create_dir_all(&path).map_err(|source| {
        warn!(path = %path.display(), error = %source, "Failed to create report folder");
        ReportError::OutputFolder { path: path.clone(), source }
    })?;
    Ok(path)
}

fn run_general_reports(
    case: Arc<dyn CaseDataSource>,
    modules: Vec<Active<dyn GeneralReportModule>>,
    report_path: &Path,
    cancel: &CancelFlag,
) -> RunOutcome {
    let errors = ErrorLog::new();
    let total = modules.len();
    let mut canceled = 0;

    for mut active in modules {
        if cancel.is_cancelled() {
            active.progress.cancel();
        }
        if active.progress.is_canceled() {
            canceled += 1;
            continue;
        }

        active.progress.start();
        match active.module.generate_report(report_path, &active.progress, case.as_ref()) {
            Ok(()) => {
                // No-op when the module already set its own terminal state
                active.progress.complete();
            }
            Err(e) => {
                errors.record(format!("{} failed: {}", active.module.name(), e));
                active.progress.error(e.to_string());
            }
        }
        if active.progress.is_canceled() {
            canceled += 1;
        }
    }

    let status = if cancel.is_cancelled() || (total > 0 && canceled == total) {
        RunStatus::Cancelled
    } else {
        RunStatus::Completed
    };
    let errors = errors.take();
    if !errors.is_empty() {
        warn!(count = errors.len(), "General reports finished with errors:\n{}", errors.join("\n"));
    }
    RunOutcome { status, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::progress::ReportStatus;
    use crate::report::table_worker::TableSelection;
    use crate::report::tags::TagFilter;
    use crate::report::test_support::{all_types, calls, sample_case, RecordingSink};

    struct NoteWriter {
        fail: bool,
    }

    impl GeneralReportModule for NoteWriter {
        fn name(&self) -> &str {
            if self.fail {
                "Broken"
            } else {
                "Note"
            }
        }

        fn relative_file_path(&self) -> &str {
            "note.txt"
        }

        fn generate_report(
            &mut self,
            report_dir: &Path,
            progress: &ReportProgress,
            case: &dyn CaseDataSource,
        ) -> ReportResult<()> {
            if self.fail {
                return Err(ReportError::InvalidState("no notes today".to_string()));
            }
            let tags = case.tag_names_in_use()?;
            fs::write(report_dir.join("note.txt"), tags.join("\n"))?;
            progress.update_label("Written");
            Ok(())
        }
    }

    fn pool() -> Arc<ReportWorkerPool> {
        Arc::new(ReportWorkerPool::new(2).unwrap())
    }

    #[test]
    fn test_report_folder_and_table_run() {
        let dir = tempfile::tempdir().unwrap();
        let info = CaseInfo { name: "Case1".to_string(), report_directory: dir.path().to_path_buf() };
        let case: Arc<dyn CaseDataSource> = Arc::new(sample_case());
        let sink = RecordingSink::new("Recording");
        let log = sink.log();
        let modules = EnabledModules { table: vec![Box::new(sink)], ..Default::default() };

        let mut generator = ReportGenerator::new(Arc::clone(&case), &info, modules, pool()).unwrap();
        let report_path = generator.report_path().to_path_buf();
        assert!(report_path.is_dir());
        assert_eq!(report_path.parent(), Some(dir.path()));
        let folder = report_path.file_name().unwrap().to_string_lossy().to_string();
        assert!(folder.starts_with("Case1 "));
        assert_eq!(folder.len(), "Case1 ".len() + "01-31-2024-23-59-59".len());

        let progress = Arc::clone(&generator.progress()[0]);
        assert_eq!(progress.path(), Some(report_path.join("recording.txt").as_path()));

        let selection = TableSelection { artifact_types: all_types(case.as_ref()), tag_filter: TagFilter::all() };
        let outcome = generator.generate_table_reports(selection).wait().unwrap();
        assert!(!outcome.is_cancelled());
        assert_eq!(progress.status(), ReportStatus::Complete);
        assert!(calls(&log).contains(&"end_report".to_string()));
    }

    #[test]
    fn test_output_folder_failure_touches_no_module() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let info = CaseInfo { name: "Case1".to_string(), report_directory: blocker.path().to_path_buf() };
        let sink = RecordingSink::new("Recording");
        let log = sink.log();
        let modules = EnabledModules { table: vec![Box::new(sink)], ..Default::default() };

        let result = ReportGenerator::new(Arc::new(sample_case()), &info, modules, pool());
        assert!(matches!(result, Err(ReportError::OutputFolder { .. })));
        assert!(calls(&log).is_empty());
    }

    #[test]
    fn test_general_reports() {
        let dir = tempfile::tempdir().unwrap();
        let info = CaseInfo { name: "Case1".to_string(), report_directory: dir.path().to_path_buf() };
        let modules = EnabledModules {
            general: vec![Box::new(NoteWriter { fail: true }), Box::new(NoteWriter { fail: false })],
            ..Default::default()
        };

        let mut generator = ReportGenerator::new(Arc::new(sample_case()), &info, modules, pool()).unwrap();
        let outcome = generator.generate_general_reports().wait().unwrap();

        assert!(!outcome.is_cancelled());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Broken failed"));
        let statuses: Vec<ReportStatus> = generator.progress().iter().map(|p| p.status()).collect();
        assert_eq!(statuses, vec![ReportStatus::Error, ReportStatus::Complete]);
        let note = fs::read_to_string(generator.report_path().join("note.txt")).unwrap();
        assert_eq!(note, "Evidence");
    }

    #[test]
    fn test_cancelled_general_run() {
        let dir = tempfile::tempdir().unwrap();
        let info = CaseInfo { name: "Case1".to_string(), report_directory: dir.path().to_path_buf() };
        let modules = EnabledModules { general: vec![Box::new(NoteWriter { fail: false })], ..Default::default() };

        let generator = ReportGenerator::new(Arc::new(sample_case()), &info, modules, pool()).unwrap();
        let progress = Arc::clone(&generator.progress()[0]);
        progress.cancel();

        let mut generator = generator;
        let outcome = generator.generate_general_reports().wait().unwrap();
        assert!(outcome.is_cancelled());
        assert!(!generator.report_path().join("note.txt").exists());
    }
}
