//! Shared fixtures for report tests

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::error::{ReportError, ReportResult};
use super::modules::{FileReportDataType, FileReportModule, TableReportModule};
use super::progress::ReportProgress;
use crate::case::ids::{artifact, attribute};
use crate::case::{
    Artifact, ArtifactRecord, ArtifactTag, ArtifactType, AttributeValue, Attribute, CaseDataSource,
    CaseError, CaseResult, ContentTag, FileRecord, NewFile, SqliteCase,
};

// ============================================================================
// Case fixtures
// ============================================================================

/// Case whose every query fails
#[derive(Debug, Default)]
pub struct FailingCase;

fn fail<T>() -> CaseResult<T> {
    Err(CaseError::InvalidData("unavailable".to_string()))
}

impl CaseDataSource for FailingCase {
    fn artifact_types_in_use(&self) -> CaseResult<Vec<ArtifactType>> {
        fail()
    }
    fn artifact_type(&self, _type_id: i32) -> CaseResult<Option<ArtifactType>> {
        fail()
    }
    fn artifact_count(&self, _type_id: i32) -> CaseResult<u64> {
        fail()
    }
    fn artifacts_of_type(&self, _type_id: i32) -> CaseResult<Vec<Artifact>> {
        fail()
    }
    fn artifact_attributes(&self, _artifact_id: i64) -> CaseResult<Vec<Attribute>> {
        fail()
    }
    fn artifact_tag_names(&self, _artifact_id: i64) -> CaseResult<BTreeSet<String>> {
        fail()
    }
    fn content_tags(&self) -> CaseResult<Vec<ContentTag>> {
        fail()
    }
    fn artifact_tags(&self) -> CaseResult<Vec<ArtifactTag>> {
        fail()
    }
    fn tag_names_in_use(&self) -> CaseResult<Vec<String>> {
        fail()
    }
    fn file_by_id(&self, _object_id: i64) -> CaseResult<Option<FileRecord>> {
        fail()
    }
    fn set_names(&self, _artifact_type_id: i32) -> CaseResult<Vec<String>> {
        fail()
    }
    fn files_where(&self, _clause: &str) -> CaseResult<Vec<FileRecord>> {
        fail()
    }
    fn all_files(&self) -> CaseResult<Vec<FileRecord>> {
        fail()
    }
    fn artifacts_for_domain(&self, _domain: &str) -> CaseResult<Vec<ArtifactRecord>> {
        fail()
    }
}

/// Real case whose per-artifact queries fail for chosen artifacts
pub struct FlakyCase {
    inner: SqliteCase,
    fail_attributes_of: Option<i64>,
    fail_tags_of: Option<i64>,
}

impl FlakyCase {
    pub fn new(inner: SqliteCase) -> Self {
        Self { inner, fail_attributes_of: None, fail_tags_of: None }
    }

    pub fn failing_attributes_of(mut self, artifact_id: i64) -> Self {
        self.fail_attributes_of = Some(artifact_id);
        self
    }

    pub fn failing_tags_of(mut self, artifact_id: i64) -> Self {
        self.fail_tags_of = Some(artifact_id);
        self
    }
}

impl CaseDataSource for FlakyCase {
    fn artifact_types_in_use(&self) -> CaseResult<Vec<ArtifactType>> {
        self.inner.artifact_types_in_use()
    }
    fn artifact_type(&self, type_id: i32) -> CaseResult<Option<ArtifactType>> {
        self.inner.artifact_type(type_id)
    }
    fn artifact_count(&self, type_id: i32) -> CaseResult<u64> {
        self.inner.artifact_count(type_id)
    }
    fn artifacts_of_type(&self, type_id: i32) -> CaseResult<Vec<Artifact>> {
        self.inner.artifacts_of_type(type_id)
    }
    fn artifact_attributes(&self, artifact_id: i64) -> CaseResult<Vec<Attribute>> {
        if self.fail_attributes_of == Some(artifact_id) {
            return fail();
        }
        self.inner.artifact_attributes(artifact_id)
    }
    fn artifact_tag_names(&self, artifact_id: i64) -> CaseResult<BTreeSet<String>> {
        if self.fail_tags_of == Some(artifact_id) {
            return fail();
        }
        self.inner.artifact_tag_names(artifact_id)
    }
    fn content_tags(&self) -> CaseResult<Vec<ContentTag>> {
        self.inner.content_tags()
    }
    fn artifact_tags(&self) -> CaseResult<Vec<ArtifactTag>> {
        self.inner.artifact_tags()
    }
    fn tag_names_in_use(&self) -> CaseResult<Vec<String>> {
        self.inner.tag_names_in_use()
    }
    fn file_by_id(&self, object_id: i64) -> CaseResult<Option<FileRecord>> {
        self.inner.file_by_id(object_id)
    }
    fn set_names(&self, artifact_type_id: i32) -> CaseResult<Vec<String>> {
        self.inner.set_names(artifact_type_id)
    }
    fn files_where(&self, clause: &str) -> CaseResult<Vec<FileRecord>> {
        self.inner.files_where(clause)
    }
    fn all_files(&self) -> CaseResult<Vec<FileRecord>> {
        self.inner.all_files()
    }
    fn artifacts_for_domain(&self, domain: &str) -> CaseResult<Vec<ArtifactRecord>> {
        self.inner.artifacts_for_domain(domain)
    }
}

fn text(value: &str) -> AttributeValue {
    AttributeValue::String(value.to_string())
}

/// Small case with one data source "img":
///
/// - two bookmarks, the second tagged "Evidence"
/// - keyword hits in ListA (two keywords) and ListB
/// - one hashset hit in "Known Bad"
/// - `/docs/notes.txt` tagged "Evidence" and a deleted `/tmp/old.log`
pub fn sample_case() -> SqliteCase {
    let case = SqliteCase::open_in_memory().unwrap();
    let ds = case.add_data_source("img").unwrap();

    let bookmarks = case.add_file(&NewFile::new(ds, "/Users/bob/", "Bookmarks").size(512)).unwrap();
    let notes = case
        .add_file(
            &NewFile::new(ds, "/docs/", "notes.txt")
                .size(42)
                .md5("d41d8cd98f00b204e9800998ecf8427e")
                .times(1_000_000_000, 1_000_000_000, 1_000_000_000, 1_000_000_000),
        )
        .unwrap();
    case.add_file(&NewFile::new(ds, "/tmp/", "old.log").deleted()).unwrap();
    case.add_file(&NewFile::new(ds, "/", "docs").directory()).unwrap();

    let first = case.add_artifact(bookmarks, artifact::WEB_BOOKMARK).unwrap();
    case.add_attribute(first, attribute::URL, &text("http://b.example")).unwrap();
    case.add_attribute(first, attribute::DOMAIN, &text("b.example")).unwrap();
    let second = case.add_artifact(bookmarks, artifact::WEB_BOOKMARK).unwrap();
    case.add_attribute(second, attribute::URL, &text("http://a.example")).unwrap();
    case.add_attribute(second, attribute::DOMAIN, &text("a.example")).unwrap();
    case.add_attribute(second, attribute::DATETIME_CREATED, &AttributeValue::DateTime(1_000_000_000))
        .unwrap();

    for (list, keyword) in [("ListB", "zeta"), ("ListA", "beta"), ("ListA", "alpha")] {
        let hit = case.add_artifact(notes, artifact::KEYWORD_HIT).unwrap();
        case.add_attribute(hit, attribute::SET_NAME, &text(list)).unwrap();
        case.add_attribute(hit, attribute::KEYWORD, &text(keyword)).unwrap();
        case.add_attribute(hit, attribute::KEYWORD_PREVIEW, &text("...")).unwrap();
    }

    let hash_hit = case.add_artifact(notes, artifact::HASHSET_HIT).unwrap();
    case.add_attribute(hash_hit, attribute::SET_NAME, &text("Known Bad")).unwrap();

    let evidence = case.add_tag_name("Evidence").unwrap();
    case.tag_artifact(second, evidence, "seen").unwrap();
    case.tag_content(notes, evidence, "check").unwrap();

    case
}

/// Artifact types present in a case, as the selection for a full run
pub fn all_types(case: &dyn CaseDataSource) -> Vec<ArtifactType> {
    case.artifact_types_in_use().unwrap()
}

// ============================================================================
// Recording modules
// ============================================================================

/// Calls seen by a recording module, shared with the test
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Table module that records each call as a short string
#[derive(Default)]
pub struct RecordingSink {
    pub calls: CallLog,
    name: String,
    fail_on: Option<&'static str>,
    cancel_after_rows: Option<(usize, Arc<ReportProgress>)>,
    rows: usize,
    thumbnails: bool,
}

impl RecordingSink {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Default::default() }
    }

    /// Fail every call with this name (e.g. "add_row")
    pub fn failing_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Cancel `progress` once this many rows arrived
    pub fn cancel_after(mut self, rows: usize, progress: Arc<ReportProgress>) -> Self {
        self.cancel_after_rows = Some((rows, progress));
        self
    }

    /// Take part in the thumbnails section
    pub fn with_thumbnails(mut self) -> Self {
        self.thumbnails = true;
        self
    }

    pub fn log(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: &'static str, detail: String) -> ReportResult<()> {
        if self.fail_on == Some(call) {
            return Err(ReportError::InvalidState(format!("{} refused", call)));
        }
        let entry = if detail.is_empty() { call.to_string() } else { format!("{}:{}", call, detail) };
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(entry);
        }
        Ok(())
    }
}

impl TableReportModule for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }
    fn relative_file_path(&self) -> &str {
        "recording.txt"
    }
    fn start_report(&mut self, _report_dir: &Path) -> ReportResult<()> {
        self.record("start_report", String::new())
    }
    fn end_report(&mut self) -> ReportResult<()> {
        self.record("end_report", String::new())
    }
    fn start_data_type(&mut self, name: &str, comment: &str) -> ReportResult<()> {
        let detail = if comment.is_empty() { name.to_string() } else { format!("{}|{}", name, comment) };
        self.record("start_data_type", detail)
    }
    fn end_data_type(&mut self) -> ReportResult<()> {
        self.record("end_data_type", String::new())
    }
    fn start_set(&mut self, set_name: &str) -> ReportResult<()> {
        self.record("start_set", set_name.to_string())
    }
    fn end_set(&mut self) -> ReportResult<()> {
        self.record("end_set", String::new())
    }
    fn add_set_index(&mut self, sets: &[String]) -> ReportResult<()> {
        self.record("add_set_index", sets.join(","))
    }
    fn add_set_element(&mut self, element_name: &str) -> ReportResult<()> {
        self.record("add_set_element", element_name.to_string())
    }
    fn start_table(&mut self, headers: &[String]) -> ReportResult<()> {
        self.record("start_table", headers.join(","))
    }
    fn end_table(&mut self) -> ReportResult<()> {
        self.record("end_table", String::new())
    }
    fn add_row(&mut self, cells: &[String]) -> ReportResult<()> {
        self.record("add_row", cells.join(","))?;
        self.rows += 1;
        if let Some((limit, progress)) = &self.cancel_after_rows {
            if self.rows >= *limit {
                progress.cancel();
            }
        }
        Ok(())
    }
    fn supports_thumbnails(&self) -> bool {
        self.thumbnails
    }
    fn add_thumbnail_rows(&mut self, images: &[FileRecord]) -> ReportResult<()> {
        let names: Vec<&str> = images.iter().map(|f| f.name.as_str()).collect();
        self.record("add_thumbnail_rows", names.join(","))
    }
}

impl FileReportModule for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }
    fn relative_file_path(&self) -> &str {
        "recording.txt"
    }
    fn start_report(&mut self, _report_dir: &Path) -> ReportResult<()> {
        self.record("start_report", String::new())
    }
    fn end_report(&mut self) -> ReportResult<()> {
        self.record("end_report", String::new())
    }
    fn start_table(&mut self, columns: &[FileReportDataType]) -> ReportResult<()> {
        let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        self.record("start_table", names.join(","))
    }
    fn add_row(&mut self, file: &FileRecord, _columns: &[FileReportDataType]) -> ReportResult<()> {
        self.record("add_row", file.name.clone())
    }
    fn end_table(&mut self) -> ReportResult<()> {
        self.record("end_table", String::new())
    }
}

/// Snapshot of the calls recorded so far
pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().map(|c| c.clone()).unwrap_or_default()
}

/// Regular allocated file at `/img/<name>`
pub fn sample_file(object_id: i64, name: &str) -> FileRecord {
    FileRecord {
        object_id,
        data_source_id: 1,
        name: name.to_string(),
        parent_path: "/".to_string(),
        unique_path: format!("/img/{}", name),
        extension: name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()),
        size: 42,
        meta_type: 1,
        meta_addr: 0,
        dir_flags: 1,
        mode: 0o644,
        known: None,
        md5: None,
        mime_type: None,
        crtime: 0,
        mtime: 0,
        atime: 0,
        ctime: 0,
        file_kind: 0,
        local_path: None,
    }
}
