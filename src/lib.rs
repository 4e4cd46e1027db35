//! Case report generator
//!
//! Reads a Sleuth Kit style case database and writes table reports (HTML,
//! CSV, Word), a tab-separated file list and a JSON case summary into a
//! timestamped report folder.

pub mod audit;
pub mod case;
pub mod config;
pub mod logging;
pub mod report;
pub mod search;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::case::{CaseDataSource, SqliteCase};
use crate::config::ReportConfig;
use crate::report::{
    CaseInfo, CaseSummaryReport, EnabledModules, ProgressEvent, ProgressSnapshot, ReportError,
    ReportGenerator, ReportResult, ReportWorkerPool, RunOutcome, TableSelection, TsvFileListReport,
};
use crate::search::{mini_timeline_result, spawn_mini_timeline, CommonFilesSearch};

/// What one invocation produced
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub table: Option<RunOutcome>,
    pub file_list: Option<RunOutcome>,
    pub general: Option<RunOutcome>,
    pub modules: Vec<ProgressSnapshot>,
}

impl RunSummary {
    /// Every recoverable error across the runs
    pub fn errors(&self) -> impl Iterator<Item = &String> {
        [&self.table, &self.file_list, &self.general]
            .into_iter()
            .flatten()
            .flat_map(|outcome| outcome.errors.iter())
    }
}

/// A search run from the command line instead of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// Files sharing an MD5 hash, optionally within one data source
    CommonFiles { data_source: Option<i64> },
    /// Artifacts of a web domain grouped by day
    Timeline { domain: String },
}

/// Open the configured case database
pub fn open_case(config: &ReportConfig) -> ReportResult<Arc<dyn CaseDataSource>> {
    let case_db = config
        .case_db
        .as_ref()
        .ok_or_else(|| ReportError::Config("no case database given".to_string()))?;
    let case: Arc<dyn CaseDataSource> = Arc::new(SqliteCase::open(case_db)?);
    audit::log_case_opened(case_db, &config.resolved_case_name());
    Ok(case)
}

/// Open the configured case and run every enabled report category
pub fn run(
    config: &ReportConfig,
    observer: Option<UnboundedSender<ProgressEvent>>,
) -> ReportResult<RunSummary> {
    run_with_case(open_case(config)?, config, observer)
}

/// Run a search and return its results as JSON
pub fn run_search(
    case: Arc<dyn CaseDataSource>,
    request: &SearchRequest,
    threads: usize,
) -> ReportResult<serde_json::Value> {
    let value = match request {
        SearchRequest::CommonFiles { data_source } => {
            let search = data_source.map_or(CommonFilesSearch::AllDataSources, CommonFilesSearch::DataSource);
            serde_json::to_value(search.run(case.as_ref())?)?
        }
        SearchRequest::Timeline { domain } => {
            let pool = ReportWorkerPool::new(threads)?;
            let days = mini_timeline_result(spawn_mini_timeline(&pool, case, domain.clone()));
            serde_json::to_value(days)?
        }
    };
    Ok(value)
}

/// Run the enabled report categories against an open case
pub fn run_with_case(
    case: Arc<dyn CaseDataSource>,
    config: &ReportConfig,
    observer: Option<UnboundedSender<ProgressEvent>>,
) -> ReportResult<RunSummary> {
    let case_name = config.resolved_case_name();
    // Resolve before any folder is created so bad names fail fast
    let selection = TableSelection {
        artifact_types: config.resolve_artifact_types(case.as_ref())?,
        tag_filter: config.tag_filter(),
    };

    let template_dir = config.html_template_dir.as_deref();
    let mut modules = EnabledModules {
        table: config
            .table_formats
            .iter()
            .map(|format| format.module(&case_name, template_dir))
            .collect(),
        ..Default::default()
    };
    if config.file_list {
        modules.file.push(Box::new(TsvFileListReport::new()));
    }
    if config.case_summary {
        modules.general.push(Box::new(CaseSummaryReport::new(case_name.clone())));
    }
    let (has_table, has_file, has_general) =
        (!modules.table.is_empty(), !modules.file.is_empty(), !modules.general.is_empty());

    let pool = Arc::new(ReportWorkerPool::new(config.threads)?);
    let case_info = CaseInfo {
        name: case_name,
        report_directory: config.resolved_report_directory(),
    };
    let mut generator = ReportGenerator::with_observer(case, &case_info, modules, pool, observer)?;
    info!(
        path = %generator.report_path().display(),
        types = selection.artifact_types.len(),
        filter = %selection.tag_filter.describe(),
        "Generating reports"
    );

    // All three categories run side by side on the pool
    let table = has_table.then(|| generator.generate_table_reports(selection));
    let file_list = has_file.then(|| generator.generate_file_list_reports(config.file_list_columns.clone()));
    let general = has_general.then(|| generator.generate_general_reports());

    Ok(RunSummary {
        table: table.map(|h| h.wait()).transpose()?,
        file_list: file_list.map(|h| h.wait()).transpose()?,
        general: general.map(|h| h.wait()).transpose()?,
        report_path: generator.report_path().to_path_buf(),
        modules: generator.progress().iter().map(|p| p.snapshot()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::NewFile;
    use crate::report::test_support::sample_case;
    use crate::report::{ReportStatus, TableFormat};

    #[test]
    fn test_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            case_name: Some("Case 1".to_string()),
            report_directory: Some(dir.path().to_path_buf()),
            table_formats: TableFormat::ALL.to_vec(),
            file_list: true,
            ..Default::default()
        };

        let summary = run_with_case(Arc::new(sample_case()), &config, None).unwrap();

        assert_eq!(summary.errors().count(), 0);
        assert_eq!(summary.modules.len(), 5);
        assert!(summary.modules.iter().all(|m| m.status == ReportStatus::Complete));
        let root = &summary.report_path;
        assert!(root.join("HTML Report").join("index.html").is_file());
        assert!(root.join("HTML Report").join("content").join("Keyword Hits.html").is_file());
        assert!(root.join("Tables").join("Web Bookmarks.csv").is_file());
        assert!(root.join("Word Report").join("report.docx").is_file());
        assert!(root.join("file-list.txt").is_file());
        assert!(root.join("case-summary.json").is_file());
    }

    #[test]
    fn test_unknown_type_fails_before_folder() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            report_directory: Some(dir.path().to_path_buf()),
            artifact_types: vec!["No Such Type".to_string()],
            ..Default::default()
        };
        let result = run_with_case(Arc::new(sample_case()), &config, None);
        assert!(matches!(result, Err(ReportError::Config(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_case_db() {
        assert!(matches!(run(&ReportConfig::default(), None), Err(ReportError::Config(_))));
        assert!(matches!(open_case(&ReportConfig::default()), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_common_files_search() {
        let case = SqliteCase::open_in_memory().unwrap();
        let ds = case.add_data_source("/evidence/disk.E01").unwrap();
        case.add_file(&NewFile::new(ds, "/a/", "copy1.txt").md5("0123")).unwrap();
        case.add_file(&NewFile::new(ds, "/b/", "copy2.txt").md5("0123")).unwrap();
        case.add_file(&NewFile::new(ds, "/", "single.txt").md5("4567")).unwrap();
        let case: Arc<dyn CaseDataSource> = Arc::new(case);

        let json = run_search(case.clone(), &SearchRequest::CommonFiles { data_source: None }, 1).unwrap();
        let groups = json.as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["md5"], "0123");
        assert_eq!(groups[0]["files"].as_array().unwrap().len(), 2);

        let other = SearchRequest::CommonFiles { data_source: Some(ds + 1000) };
        assert_eq!(run_search(case, &other, 1).unwrap(), serde_json::json!([]));
    }

    #[test]
    fn test_timeline_search_without_matches() {
        let request = SearchRequest::Timeline { domain: "nowhere.example".to_string() };
        let json = run_search(Arc::new(sample_case()), &request, 2).unwrap();
        assert_eq!(json, serde_json::json!([]));
    }
}
