//! Table report run
//!
//! Streams every selected artifact type, then the tagged files and tagged
//! results sections, to all active table modules. Processing is sequential:
//! one data type after another, one module after another per row.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use super::error::ErrorLog;
use super::fanout::{Active, ActiveSet, RunOutcome};
use super::modules::{TableReportModule, THUMBNAIL_COLUMNS};
use super::projector::{format_file_time, ArtifactData, ReportRow, RowProjector};
use super::schema::{columns_for, headers};
use super::tags::TagFilter;
use super::task::CancelFlag;
use crate::case::ids::{artifact, artifact_display_name, attribute};
use crate::case::{ArtifactType, CaseDataSource, FileRecord};

/// Cancellation is polled once per this many rows
pub const ROW_BATCH: usize = 100;

/// Set name shown for keyword hits from ad hoc searches
pub const USER_SEARCHES: &str = "User Searches";

const TAGGED_FILES_HEADERS: [&str; 9] = [
    "Tag",
    "File",
    "Comment",
    "Time Modified",
    "Time Changed",
    "Time Accessed",
    "Time Created",
    "Size",
    "Hash",
];

const TAGGED_RESULTS_HEADERS: [&str; 4] = ["Result Type", "Tag", "Comment", "Source File"];

pub const THUMBNAILS: &str = "Thumbnails";
const THUMBNAILS_COMMENT: &str = "Contains thumbnails of images that are associated with tagged files and results.";

/// What a table run covers
#[derive(Debug, Clone, Default)]
pub struct TableSelection {
    pub artifact_types: Vec<ArtifactType>,
    pub tag_filter: TagFilter,
}

pub struct TableReportWorker {
    case: Arc<dyn CaseDataSource>,
    modules: ActiveSet<dyn TableReportModule>,
    report_path: PathBuf,
    selection: TableSelection,
    errors: ErrorLog,
    /// Tagged image files seen by the tag sections, in tag order
    images: Vec<FileRecord>,
}

impl TableReportWorker {
    pub fn new(
        case: Arc<dyn CaseDataSource>,
        modules: Vec<Active<dyn TableReportModule>>,
        report_path: PathBuf,
        selection: TableSelection,
    ) -> Self {
        let errors = ErrorLog::new();
        Self {
            case,
            modules: ActiveSet::new(modules, errors.clone()),
            report_path,
            selection,
            errors,
            images: Vec::new(),
        }
    }

    pub fn run(mut self, cancel: &CancelFlag) -> RunOutcome {
        self.modules.remove_cancelled(cancel);
        let maximum = self.selection.artifact_types.len() as u64 + 2;
        for progress in self.modules.progress() {
            progress.start();
            progress.set_indeterminate(false);
            progress.set_maximum(maximum);
        }
        let report_path = self.report_path.clone();
        self.modules.broadcast("start report", |m| m.start_report(&report_path));
        info!(
            types = self.selection.artifact_types.len(),
            modules = self.modules.len(),
            "Table report run started"
        );

        self.make_artifact_tables(cancel);
        self.make_content_tags_table(cancel);
        self.make_artifact_tags_table(cancel);
        self.make_thumbnail_table(cancel);

        self.modules.remove_cancelled(cancel);
        self.modules.broadcast("end report", |m| m.end_report());
        self.modules.finish(cancel)
    }

    fn comment(&self, subject: &str) -> String {
        if self.selection.tag_filter.is_empty() {
            String::new()
        } else {
            format!(
                "Contains {} that were tagged with one of the following: {}",
                subject,
                self.selection.tag_filter.describe()
            )
        }
    }

    /// Stream rows, polling for cancellation between batches
    fn stream_rows(&mut self, rows: &[ReportRow], cancel: &CancelFlag) -> bool {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 && i % ROW_BATCH == 0 {
                self.modules.remove_cancelled(cancel);
            }
            if self.modules.is_empty() {
                return false;
            }
            self.modules.broadcast("add a row", |m| m.add_row(&row.cells));
        }
        !self.modules.is_empty()
    }

    // ========================================================================
    // Artifact tables
    // ========================================================================

    fn make_artifact_tables(&mut self, cancel: &CancelFlag) {
        let types = self.selection.artifact_types.clone();
        for artifact_type in &types {
            self.modules.remove_cancelled(cancel);
            if self.modules.is_empty() {
                return;
            }
            self.modules
                .update_label(&format!("Processing {}...", artifact_type.display_name));

            match artifact_type.id {
                artifact::KEYWORD_HIT => self.write_keyword_hits(artifact_type, cancel),
                artifact::HASHSET_HIT => self.write_hashset_hits(artifact_type, cancel),
                _ => self.write_artifact_table(artifact_type, cancel),
            }
            self.modules.increment();
        }
    }

    /// Artifacts of one type that pass the tag filter, with their attributes
    fn filtered_artifacts(&self, type_id: i32) -> Option<Vec<ArtifactData>> {
        let headers = match self.case.artifacts_of_type(type_id) {
            Ok(headers) => headers,
            Err(e) => {
                self.errors
                    .record(format!("Failed to get artifacts of type {}: {}", type_id, e));
                return None;
            }
        };

        let mut artifacts = Vec::with_capacity(headers.len());
        for header in headers {
            let tags = match self.case.artifact_tag_names(header.artifact_id) {
                Ok(tags) => tags,
                Err(e) => {
                    self.errors.record(format!(
                        "Failed to get tags for artifact {}: {}",
                        header.artifact_id, e
                    ));
                    continue;
                }
            };
            if !self.selection.tag_filter.passes(&tags) {
                continue;
            }
            match self.case.artifact_record(header) {
                Ok(record) => artifacts.push(ArtifactData { record, tags }),
                Err(e) => self.errors.record(format!(
                    "Failed to get attributes for artifact {}: {}",
                    header.artifact_id, e
                )),
            }
        }
        Some(artifacts)
    }

    fn write_artifact_table(&mut self, artifact_type: &ArtifactType, cancel: &CancelFlag) {
        let Some(artifacts) = self.filtered_artifacts(artifact_type.id) else {
            return;
        };
        if artifacts.is_empty() {
            debug!(type_name = %artifact_type.type_name, "No artifacts to report");
            return;
        }

        let records: Vec<_> = artifacts.iter().map(|a| a.record.clone()).collect();
        let columns = columns_for(artifact_type.id, &records);
        let column_headers = headers(&columns);
        let rows = {
            let case = Arc::clone(&self.case);
            let mut projector = RowProjector::new(case.as_ref(), &self.errors);
            projector.project_sorted(&artifacts, &columns)
        };

        let comment = self.comment("results");
        self.modules.broadcast("start a data type", |m| {
            m.start_data_type(&artifact_type.display_name, &comment)
        });
        self.modules.broadcast("start a table", |m| m.start_table(&column_headers));
        if !self.stream_rows(&rows, cancel) {
            return;
        }
        self.modules.broadcast("end a table", |m| m.end_table());
        self.modules.broadcast("end a data type", |m| m.end_data_type());
    }

    // ========================================================================
    // Grouped tables
    // ========================================================================

    /// Set order from the case's list query, restricted to sets with rows
    ///
    /// Sets that only show up in the artifacts are appended in name order.
    fn set_order<V>(&self, type_id: i32, groups: &BTreeMap<String, V>) -> Vec<String> {
        let mut order = match self.case.set_names(type_id) {
            Ok(names) => names,
            Err(e) => {
                self.errors
                    .record(format!("Failed to get set names for type {}: {}", type_id, e));
                Vec::new()
            }
        };
        order.retain(|name| groups.contains_key(name));
        for name in groups.keys() {
            if !order.contains(name) {
                order.push(name.clone());
            }
        }
        order
    }

    fn write_keyword_hits(&mut self, artifact_type: &ArtifactType, cancel: &CancelFlag) {
        let Some(artifacts) = self.filtered_artifacts(artifact_type.id) else {
            return;
        };
        if artifacts.is_empty() {
            return;
        }

        let columns = columns_for(artifact::KEYWORD_HIT, &[]);
        let column_headers = headers(&columns);

        // list -> keyword -> sorted rows
        let mut groups: BTreeMap<String, BTreeMap<String, Vec<ArtifactData>>> = BTreeMap::new();
        for data in artifacts {
            let (Some(list), Some(keyword)) = (
                data.record.attribute_text(attribute::SET_NAME),
                data.record.attribute_text(attribute::KEYWORD),
            ) else {
                debug!(artifact_id = data.record.artifact.artifact_id, "Keyword hit without list or keyword");
                continue;
            };
            let (list, keyword) = (list.to_string(), keyword.to_string());
            groups.entry(list).or_default().entry(keyword).or_default().push(data);
        }
        if groups.is_empty() {
            return;
        }
        let order = self.set_order(artifact::KEYWORD_HIT, &groups);

        let mut sections: Vec<(String, Vec<(String, Vec<ReportRow>)>)> = Vec::new();
        {
            let case = Arc::clone(&self.case);
            let mut projector = RowProjector::new(case.as_ref(), &self.errors);
            for list in &order {
                let Some(keywords) = groups.remove(list) else {
                    continue;
                };
                let tables = keywords
                    .into_iter()
                    .map(|(keyword, hits)| (keyword, projector.project_sorted(&hits, &columns)))
                    .collect();
                sections.push((keyword_list_name(list), tables));
            }
        }

        let set_names: Vec<String> = sections.iter().map(|(name, _)| name.clone()).collect();
        let comment = self.comment("results");
        self.modules.broadcast("start a data type", |m| {
            m.start_data_type(&artifact_type.display_name, &comment)
        });
        self.modules.broadcast("add a set index", |m| m.add_set_index(&set_names));

        for (list, tables) in &sections {
            self.modules.remove_cancelled(cancel);
            if self.modules.is_empty() {
                return;
            }
            self.modules.broadcast("start a set", |m| m.start_set(list));
            for (keyword, rows) in tables {
                self.modules.broadcast("add a set element", |m| m.add_set_element(keyword));
                self.modules.broadcast("start a table", |m| m.start_table(&column_headers));
                if !self.stream_rows(rows, cancel) {
                    return;
                }
                self.modules.broadcast("end a table", |m| m.end_table());
            }
            self.modules.broadcast("end a set", |m| m.end_set());
        }
        self.modules.broadcast("end a data type", |m| m.end_data_type());
    }

    fn write_hashset_hits(&mut self, artifact_type: &ArtifactType, cancel: &CancelFlag) {
        let Some(artifacts) = self.filtered_artifacts(artifact_type.id) else {
            return;
        };
        if artifacts.is_empty() {
            return;
        }

        let columns = columns_for(artifact::HASHSET_HIT, &[]);
        let column_headers = headers(&columns);

        let mut groups: BTreeMap<String, Vec<ArtifactData>> = BTreeMap::new();
        for data in artifacts {
            let Some(set) = data.record.attribute_text(attribute::SET_NAME) else {
                debug!(artifact_id = data.record.artifact.artifact_id, "Hashset hit without set name");
                continue;
            };
            groups.entry(set.to_string()).or_default().push(data);
        }
        if groups.is_empty() {
            return;
        }
        let order = self.set_order(artifact::HASHSET_HIT, &groups);

        let mut sections: Vec<(String, Vec<ReportRow>)> = Vec::new();
        {
            let case = Arc::clone(&self.case);
            let mut projector = RowProjector::new(case.as_ref(), &self.errors);
            for set in &order {
                if let Some(hits) = groups.remove(set) {
                    sections.push((set.clone(), projector.project_sorted(&hits, &columns)));
                }
            }
        }

        let set_names: Vec<String> = sections.iter().map(|(name, _)| name.clone()).collect();
        let comment = self.comment("results");
        self.modules.broadcast("start a data type", |m| {
            m.start_data_type(&artifact_type.display_name, &comment)
        });
        self.modules.broadcast("add a set index", |m| m.add_set_index(&set_names));

        for (set, rows) in &sections {
            self.modules.remove_cancelled(cancel);
            if self.modules.is_empty() {
                return;
            }
            self.modules.broadcast("start a set", |m| m.start_set(set));
            self.modules.broadcast("start a table", |m| m.start_table(&column_headers));
            if !self.stream_rows(rows, cancel) {
                return;
            }
            self.modules.broadcast("end a table", |m| m.end_table());
            self.modules.broadcast("end a set", |m| m.end_set());
        }
        self.modules.broadcast("end a data type", |m| m.end_data_type());
    }

    // ========================================================================
    // Tag sections
    // ========================================================================

    fn make_content_tags_table(&mut self, cancel: &CancelFlag) {
        self.modules.remove_cancelled(cancel);
        if self.modules.is_empty() {
            return;
        }

        let tags = match self.case.content_tags() {
            Ok(tags) => tags,
            Err(e) => {
                self.errors.record(format!("Failed to get content tags: {}", e));
                return;
            }
        };

        let section = artifact_display_name(artifact::TAG_FILE).unwrap_or("Tagged Files");
        self.modules.update_label(&format!("Processing {}...", section));
        let column_headers: Vec<String> = TAGGED_FILES_HEADERS.iter().map(|h| h.to_string()).collect();
        let comment = self.comment("files");
        self.modules.broadcast("start a data type", |m| m.start_data_type(section, &comment));
        self.modules.broadcast("start a table", |m| m.start_table(&column_headers));

        let tagged: Vec<_> = tags
            .into_iter()
            .filter(|tag| self.selection.tag_filter.passes_name(&tag.tag_name))
            .collect();
        for (i, tag) in tagged.iter().enumerate() {
            if i > 0 && i % ROW_BATCH == 0 {
                self.modules.remove_cancelled(cancel);
                if self.modules.is_empty() {
                    return;
                }
            }

            let file = match self.case.file_by_id(tag.object_id) {
                Ok(file) => file,
                Err(e) => {
                    self.errors.record(format!(
                        "Failed to get file {} for content tag {}: {}",
                        tag.object_id, tag.tag_id, e
                    ));
                    None
                }
            };
            let cells = match &file {
                Some(f) => vec![
                    tag.tag_name.clone(),
                    f.unique_path.clone(),
                    tag.comment.clone(),
                    format_file_time(f.mtime),
                    format_file_time(f.ctime),
                    format_file_time(f.atime),
                    format_file_time(f.crtime),
                    f.size.to_string(),
                    f.md5.clone().unwrap_or_default(),
                ],
                None => {
                    let mut cells = vec![tag.tag_name.clone(), String::new(), tag.comment.clone()];
                    cells.resize(TAGGED_FILES_HEADERS.len(), String::new());
                    cells
                }
            };

            self.modules.broadcast("add a tagged file row", |m| {
                if m.supports_tagged_content_links() {
                    m.add_tagged_content_row(&cells, tag, file.as_ref())
                } else {
                    m.add_row(&cells)
                }
            });
            if let Some(f) = file {
                self.note_image(f);
            }
        }

        self.modules.increment();
        self.modules.broadcast("end a table", |m| m.end_table());
        self.modules.broadcast("end a data type", |m| m.end_data_type());
    }

    fn make_artifact_tags_table(&mut self, cancel: &CancelFlag) {
        self.modules.remove_cancelled(cancel);
        if self.modules.is_empty() {
            return;
        }

        let tags = match self.case.artifact_tags() {
            Ok(tags) => tags,
            Err(e) => {
                self.errors.record(format!("Failed to get result tags: {}", e));
                return;
            }
        };

        let section = artifact_display_name(artifact::TAG_ARTIFACT).unwrap_or("Tagged Results");
        self.modules.update_label(&format!("Processing {}...", section));
        let column_headers: Vec<String> =
            TAGGED_RESULTS_HEADERS.iter().map(|h| h.to_string()).collect();
        let comment = self.comment("results");
        self.modules.broadcast("start a data type", |m| m.start_data_type(section, &comment));
        self.modules.broadcast("start a table", |m| m.start_table(&column_headers));

        let tagged: Vec<_> = tags
            .into_iter()
            .filter(|tag| self.selection.tag_filter.passes_name(&tag.tag_name))
            .collect();
        for (i, tag) in tagged.iter().enumerate() {
            if i > 0 && i % ROW_BATCH == 0 {
                self.modules.remove_cancelled(cancel);
                if self.modules.is_empty() {
                    return;
                }
            }

            let file = match self.case.file_by_id(tag.object_id) {
                Ok(file) => file,
                Err(e) => {
                    self.errors.record(format!(
                        "Failed to get source file for result tag {}: {}",
                        tag.tag_id, e
                    ));
                    None
                }
            };
            let cells = vec![
                tag.artifact_type_name.clone(),
                tag.tag_name.clone(),
                tag.comment.clone(),
                file.as_ref().map(|f| f.name.clone()).unwrap_or_default(),
            ];
            self.modules.broadcast("add a row", |m| m.add_row(&cells));
            if let Some(f) = file {
                self.note_image(f);
            }
        }

        self.modules.increment();
        self.modules.broadcast("end a table", |m| m.end_table());
        self.modules.broadcast("end a data type", |m| m.end_data_type());
    }
}

impl TableReportWorker {
    // ========================================================================
    // Thumbnails
    // ========================================================================

    fn note_image(&mut self, file: FileRecord) {
        if file.is_image() && !self.images.iter().any(|f| f.object_id == file.object_id) {
            self.images.push(file);
        }
    }

    /// Tagged images, for the modules that can show them
    fn make_thumbnail_table(&mut self, cancel: &CancelFlag) {
        self.modules.remove_cancelled(cancel);
        if self.modules.is_empty() {
            return;
        }

        self.modules.update_label("Creating thumbnails...");
        let images = std::mem::take(&mut self.images);
        let column_headers = vec![String::new(); THUMBNAIL_COLUMNS];
        debug!(images = images.len(), "Thumbnail table");
        self.modules.broadcast("add thumbnails", |m| {
            if !m.supports_thumbnails() {
                return Ok(());
            }
            m.start_data_type(THUMBNAILS, THUMBNAILS_COMMENT)?;
            m.start_table(&column_headers)?;
            m.add_thumbnail_rows(&images)?;
            m.end_table()?;
            m.end_data_type()
        });
    }
}

fn keyword_list_name(list: &str) -> String {
    if list.is_empty() {
        USER_SEARCHES.to_string()
    } else {
        list.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fanout::RunStatus;
    use crate::report::progress::{ReportProgress, ReportStatus};
    use crate::case::{AttributeValue, NewFile, SqliteCase};
    use crate::report::test_support::{all_types, calls, sample_case, FlakyCase, RecordingSink};

    fn active(sink: RecordingSink) -> (Active<dyn TableReportModule>, Arc<ReportProgress>) {
        let progress = Arc::new(ReportProgress::new("recording", None));
        let module: Box<dyn TableReportModule> = Box::new(sink);
        (Active::new(module, Arc::clone(&progress)), progress)
    }

    fn of_type(case: &dyn CaseDataSource, id: i32) -> Vec<ArtifactType> {
        vec![case.artifact_type(id).unwrap().unwrap()]
    }

    fn run_all(case: Arc<dyn CaseDataSource>, sink: RecordingSink, tag_filter: TagFilter) -> (RunOutcome, Vec<String>) {
        let log = sink.log();
        let (module, _progress) = active(sink);
        let selection = TableSelection { artifact_types: all_types(case.as_ref()), tag_filter };
        let outcome = TableReportWorker::new(case, vec![module], PathBuf::from("/out"), selection)
            .run(&CancelFlag::new());
        (outcome, calls(&log))
    }

    fn first_bookmark(case: &SqliteCase) -> i64 {
        case.artifacts_of_type(artifact::WEB_BOOKMARK).unwrap()[0].artifact_id
    }

    /// Sample case plus a tagged photo, a tagged result on a PNG and an
    /// image tagged with a tag outside the usual filter
    fn case_with_images() -> SqliteCase {
        let case = sample_case();
        let ds = case.all_files().unwrap()[0].data_source_id;
        let evidence = case.add_tag_name("Evidence").unwrap();
        let other = case.add_tag_name("Other").unwrap();

        let photo = case
            .add_file(&NewFile::new(ds, "/pics/", "photo.jpg").mime_type("image/jpeg"))
            .unwrap();
        case.tag_content(photo, evidence, "").unwrap();

        let screenshot = case
            .add_file(&NewFile::new(ds, "/pics/", "screen.png").mime_type("image/png"))
            .unwrap();
        let art = case.add_artifact(screenshot, artifact::METADATA_EXIF).unwrap();
        case.add_attribute(art, attribute::DEVICE_MAKE, &AttributeValue::String("Acme".into()))
            .unwrap();
        case.tag_artifact(art, evidence, "").unwrap();

        let private = case
            .add_file(&NewFile::new(ds, "/pics/", "private.gif").mime_type("image/gif"))
            .unwrap();
        case.tag_content(private, other, "").unwrap();
        case
    }

    #[test]
    fn test_keyword_sets_in_list_order() {
        let case: Arc<dyn CaseDataSource> = Arc::new(sample_case());
        let sink = RecordingSink::new("sink");
        let log = sink.log();
        let (module, progress) = active(sink);
        let selection = TableSelection {
            artifact_types: of_type(case.as_ref(), artifact::KEYWORD_HIT),
            tag_filter: TagFilter::all(),
        };

        let outcome = TableReportWorker::new(case, vec![module], PathBuf::from("/out"), selection)
            .run(&CancelFlag::new());
        assert_eq!(outcome.status, RunStatus::Completed);
        assert!(outcome.errors.is_empty());
        assert_eq!(progress.status(), ReportStatus::Complete);

        let structure: Vec<String> = calls(&log)
            .into_iter()
            .filter(|c| c.starts_with("add_set") || c.contains("_set:") || c == "end_set")
            .collect();
        assert_eq!(
            structure,
            vec![
                "add_set_index:ListA,ListB",
                "start_set:ListA",
                "add_set_element:alpha",
                "add_set_element:beta",
                "end_set",
                "start_set:ListB",
                "add_set_element:zeta",
                "end_set",
            ]
        );
    }

    #[test]
    fn test_tables_are_balanced() {
        let case: Arc<dyn CaseDataSource> = Arc::new(sample_case());
        let sink = RecordingSink::new("sink");
        let log = sink.log();
        let (module, _progress) = active(sink);
        let selection = TableSelection {
            artifact_types: all_types(case.as_ref()),
            tag_filter: TagFilter::all(),
        };

        TableReportWorker::new(case, vec![module], PathBuf::from("/out"), selection)
            .run(&CancelFlag::new());

        let log = calls(&log);
        let count = |prefix: &str| log.iter().filter(|c| c.starts_with(prefix)).count();
        assert_eq!(log.first().map(String::as_str), Some("start_report"));
        assert_eq!(log.last().map(String::as_str), Some("end_report"));
        assert_eq!(count("start_table"), count("end_table"));
        assert_eq!(count("start_data_type"), count("end_data_type"));
        assert_eq!(count("start_set"), count("end_set"));
        // bookmarks, keyword hits, hashset hits, tagged files, tagged results
        assert_eq!(count("start_data_type"), 5);
    }

    #[test]
    fn test_tag_filter_keeps_only_tagged_rows() {
        let case: Arc<dyn CaseDataSource> = Arc::new(sample_case());
        let sink = RecordingSink::new("sink");
        let log = sink.log();
        let (module, _progress) = active(sink);
        let selection = TableSelection {
            artifact_types: all_types(case.as_ref()),
            tag_filter: TagFilter::new(["Evidence"]),
        };

        TableReportWorker::new(case, vec![module], PathBuf::from("/out"), selection)
            .run(&CancelFlag::new());

        let log = calls(&log);
        let bookmark_rows: Vec<&String> = log
            .iter()
            .filter(|c| c.starts_with("add_row:http://"))
            .collect();
        assert_eq!(bookmark_rows.len(), 1);
        assert!(bookmark_rows[0].starts_with("add_row:http://a.example,"));
        assert!(bookmark_rows[0].ends_with(",Evidence"));

        // Untagged keyword and hashset hits leave their types empty
        assert!(!log.iter().any(|c| c.starts_with("start_data_type:Keyword Hits")));
        assert!(!log.iter().any(|c| c.starts_with("start_data_type:Hashset Hits")));
        assert!(log.contains(
            &"start_data_type:Web Bookmarks|Contains results that were tagged with one of the following: Evidence"
                .to_string()
        ));
        assert!(log.contains(
            &"start_data_type:Tagged Files|Contains files that were tagged with one of the following: Evidence"
                .to_string()
        ));
        assert!(log.iter().any(|c| c.starts_with("add_row:Evidence,/img/docs/notes.txt,check,2001/09/09")));
        assert!(log.contains(&"add_row:Web Bookmarks,Evidence,seen,Bookmarks".to_string()));
    }

    #[test]
    fn test_failing_module_is_dropped() {
        let case: Arc<dyn CaseDataSource> = Arc::new(sample_case());
        let good = RecordingSink::new("good");
        let good_log = good.log();
        let bad = RecordingSink::new("bad").failing_on("add_row");
        let bad_log = bad.log();
        let (good, good_progress) = active(good);
        let (bad, bad_progress) = active(bad);
        let selection = TableSelection {
            artifact_types: all_types(case.as_ref()),
            tag_filter: TagFilter::all(),
        };

        let outcome = TableReportWorker::new(case, vec![bad, good], PathBuf::from("/out"), selection)
            .run(&CancelFlag::new());

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("add a row"));
        assert_eq!(bad_progress.status(), ReportStatus::Error);
        assert_eq!(good_progress.status(), ReportStatus::Complete);
        assert!(!calls(&bad_log).contains(&"end_report".to_string()));
        assert!(calls(&good_log).contains(&"end_report".to_string()));
    }

    #[test]
    fn test_canceled_module_gets_no_more_calls() {
        let case: Arc<dyn CaseDataSource> = Arc::new(sample_case());
        let progress = Arc::new(ReportProgress::new("recording", None));
        let sink = RecordingSink::new("sink").cancel_after(1, Arc::clone(&progress));
        let log = sink.log();
        let module: Box<dyn TableReportModule> = Box::new(sink);
        let selection = TableSelection {
            artifact_types: all_types(case.as_ref()),
            tag_filter: TagFilter::all(),
        };

        let outcome = TableReportWorker::new(
            case,
            vec![Active::new(module, Arc::clone(&progress))],
            PathBuf::from("/out"),
            selection,
        )
        .run(&CancelFlag::new());

        assert!(outcome.is_cancelled());
        assert_eq!(progress.status(), ReportStatus::Canceled);
        let log = calls(&log);
        assert_eq!(log.iter().filter(|c| c.starts_with("add_row")).count(), 1);
        assert!(log.last().unwrap().starts_with("add_row"));
        // Canceled is final
        assert!(!progress.complete());
    }

    #[test]
    fn test_unreadable_artifact_is_skipped() {
        let inner = sample_case();
        let broken = first_bookmark(&inner);
        let case: Arc<dyn CaseDataSource> = Arc::new(FlakyCase::new(inner).failing_attributes_of(broken));

        let (outcome, log) = run_all(case, RecordingSink::new("sink"), TagFilter::all());

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains(&format!("Failed to get attributes for artifact {}", broken)));

        // Its sibling is still written, and so is everything after it
        let bookmark_rows: Vec<&String> = log.iter().filter(|c| c.starts_with("add_row:http://")).collect();
        assert_eq!(bookmark_rows.len(), 1);
        assert!(bookmark_rows[0].starts_with("add_row:http://a.example,"));
        assert!(log.contains(&"add_set_element:alpha".to_string()));
        assert!(log.contains(&"start_set:Known Bad".to_string()));
        assert!(log.iter().any(|c| c.starts_with("start_data_type:Tagged Results")));
        assert_eq!(log.last().map(String::as_str), Some("end_report"));
    }

    #[test]
    fn test_unreadable_tags_skip_only_that_artifact() {
        let inner = sample_case();
        let broken = first_bookmark(&inner);
        let case: Arc<dyn CaseDataSource> = Arc::new(FlakyCase::new(inner).failing_tags_of(broken));

        let (outcome, log) = run_all(case, RecordingSink::new("sink"), TagFilter::all());

        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains(&format!("Failed to get tags for artifact {}", broken)));
        assert!(!log.iter().any(|c| c.starts_with("add_row:http://b.example")));
        assert!(log.iter().any(|c| c.starts_with("add_row:http://a.example")));
    }

    #[test]
    fn test_type_without_layout_uses_generic_columns() {
        let inner = sample_case();
        inner.add_artifact_type(9001, "TSK_CUSTOM_THING", "Custom Things").unwrap();
        let bookmarks = inner
            .all_files()
            .unwrap()
            .into_iter()
            .find(|f| f.name == "Bookmarks")
            .unwrap();
        let art = inner.add_artifact(bookmarks.object_id, 9001).unwrap();
        inner.add_attribute(art, attribute::COUNT, &AttributeValue::Integer(3)).unwrap();
        inner.add_attribute(art, attribute::URL, &AttributeValue::String("http://c.example".into())).unwrap();

        let case: Arc<dyn CaseDataSource> = Arc::new(inner);
        let sink = RecordingSink::new("sink");
        let log = sink.log();
        let (module, _progress) = active(sink);
        let selection = TableSelection {
            artifact_types: of_type(case.as_ref(), 9001),
            tag_filter: TagFilter::all(),
        };
        let outcome = TableReportWorker::new(case, vec![module], PathBuf::from("/out"), selection)
            .run(&CancelFlag::new());

        assert!(outcome.errors.is_empty());
        let log = calls(&log);
        assert!(log.contains(&"start_data_type:Custom Things".to_string()));
        assert!(log.contains(&"start_table:URL,Count,Source File,Tags".to_string()));
        assert!(log.contains(&"add_row:http://c.example,3,/img/Users/bob/Bookmarks,".to_string()));
    }

    #[test]
    fn test_keyword_hit_without_list_is_left_out() {
        let inner = sample_case();
        let notes = inner.all_files().unwrap().into_iter().find(|f| f.name == "notes.txt").unwrap();
        let stray = inner.add_artifact(notes.object_id, artifact::KEYWORD_HIT).unwrap();
        inner.add_attribute(stray, attribute::KEYWORD, &AttributeValue::String("orphan".into())).unwrap();

        let case: Arc<dyn CaseDataSource> = Arc::new(inner);
        let (outcome, log) = run_all(case, RecordingSink::new("sink"), TagFilter::all());

        assert!(outcome.errors.is_empty());
        assert!(!log.iter().any(|c| c.contains("orphan")));
        assert!(log.contains(&"add_set_index:ListA,ListB".to_string()));
    }

    #[test]
    fn test_thumbnails_list_tagged_images() {
        let case: Arc<dyn CaseDataSource> = Arc::new(case_with_images());
        let (outcome, log) = run_all(case, RecordingSink::new("sink").with_thumbnails(), TagFilter::all());

        assert!(outcome.errors.is_empty());
        let thumbnails: Vec<&String> = log.iter().filter(|c| c.starts_with("add_thumbnail_rows")).collect();
        // notes.txt is tagged too, but is not an image
        assert_eq!(thumbnails, vec!["add_thumbnail_rows:photo.jpg,private.gif,screen.png"]);

        let at = |call: &str| log.iter().position(|c| c.starts_with(call)).unwrap();
        assert!(at("start_data_type:Tagged Results") < at("start_data_type:Thumbnails"));
        assert!(at("add_thumbnail_rows") < at("end_report"));
    }

    #[test]
    fn test_thumbnails_follow_tag_filter() {
        let case: Arc<dyn CaseDataSource> = Arc::new(case_with_images());
        let (_, log) = run_all(case, RecordingSink::new("sink").with_thumbnails(), TagFilter::new(["Evidence"]));
        assert!(log.contains(&"add_thumbnail_rows:photo.jpg,screen.png".to_string()));
    }

    #[test]
    fn test_thumbnails_skipped_without_support() {
        let case: Arc<dyn CaseDataSource> = Arc::new(case_with_images());
        let (_, log) = run_all(case, RecordingSink::new("sink"), TagFilter::all());
        assert!(!log.iter().any(|c| c.contains("Thumbnails") || c.starts_with("add_thumbnail_rows")));
    }

    #[test]
    fn test_cancelled_task_touches_nothing() {
        let case: Arc<dyn CaseDataSource> = Arc::new(sample_case());
        let sink = RecordingSink::new("sink");
        let log = sink.log();
        let (module, progress) = active(sink);
        let cancel = CancelFlag::new();
        cancel.cancel();

        let selection = TableSelection {
            artifact_types: all_types(case.as_ref()),
            tag_filter: TagFilter::all(),
        };
        let outcome =
            TableReportWorker::new(case, vec![module], PathBuf::from("/out"), selection).run(&cancel);

        assert!(outcome.is_cancelled());
        assert_eq!(progress.status(), ReportStatus::Canceled);
        assert!(calls(&log).is_empty());
    }
}
