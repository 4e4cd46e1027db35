//! Row projection
//!
//! Turns one artifact (attributes plus tag names) into the string cells of a
//! column layout. Lookups through the case that fail are logged, recorded in
//! the run's error log and rendered as an empty cell; the row is never cut
//! short.

use std::collections::{BTreeSet, HashMap};

use chrono::DateTime;

use super::error::ErrorLog;
use super::schema::{ColumnSource, ColumnSpec};
use crate::case::{ArtifactRecord, AttributeValue, CaseDataSource, FileRecord};

/// Display format for attribute timestamps
pub const DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// An artifact with the tag names applied to it
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactData {
    pub record: ArtifactRecord,
    pub tags: BTreeSet<String>,
}

impl ArtifactData {
    pub fn artifact_id(&self) -> i64 {
        self.record.artifact.artifact_id
    }
}

/// Projected cells of one artifact
///
/// Ordering is the cells left to right, then the artifact id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportRow {
    pub cells: Vec<String>,
    pub artifact_id: i64,
}

/// Render a Unix timestamp (seconds) in UTC; out-of-range values render empty
pub fn format_datetime(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// File system times of zero mean "not recorded"
pub fn format_file_time(secs: i64) -> String {
    if secs == 0 {
        String::new()
    } else {
        format_datetime(secs)
    }
}

pub fn render_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::String(s) => s.clone(),
        AttributeValue::Integer(n) => n.to_string(),
        AttributeValue::Long(n) => n.to_string(),
        AttributeValue::Double(d) => d.to_string(),
        AttributeValue::DateTime(secs) => format_datetime(*secs),
        AttributeValue::Bytes(bytes) => hex::encode(bytes),
    }
}

/// Projects rows for one report run, caching source file lookups
pub struct RowProjector<'a> {
    case: &'a dyn CaseDataSource,
    errors: &'a ErrorLog,
    files: HashMap<i64, Option<FileRecord>>,
}

impl<'a> RowProjector<'a> {
    pub fn new(case: &'a dyn CaseDataSource, errors: &'a ErrorLog) -> Self {
        Self {
            case,
            errors,
            files: HashMap::new(),
        }
    }

    fn file(&mut self, object_id: i64, artifact_id: i64) -> Option<&FileRecord> {
        if !self.files.contains_key(&object_id) {
            let file = match self.case.file_by_id(object_id) {
                Ok(file) => file,
                Err(e) => {
                    self.errors.record(format!(
                        "Failed to look up file {} for artifact {}: {}",
                        object_id, artifact_id, e
                    ));
                    None
                }
            };
            self.files.insert(object_id, file);
        }
        self.files.get(&object_id).and_then(Option::as_ref)
    }

    fn file_cell(&mut self, data: &ArtifactData, render: impl FnOnce(&FileRecord) -> String) -> String {
        let artifact = data.record.artifact;
        self.file(artifact.object_id, artifact.artifact_id)
            .map(render)
            .unwrap_or_default()
    }

    fn cell(&mut self, data: &ArtifactData, source: ColumnSource) -> String {
        match source {
            ColumnSource::Attribute(type_id) => data
                .record
                .attribute(type_id)
                .map(|a| render_value(&a.value))
                .unwrap_or_default(),
            ColumnSource::AttributeOrSourceFile(type_id) => match data.record.attribute(type_id) {
                Some(attr) => render_value(&attr.value),
                None => self.file_cell(data, |f| f.unique_path.clone()),
            },
            ColumnSource::SourceFile => self.file_cell(data, |f| f.unique_path.clone()),
            ColumnSource::FileName => self.file_cell(data, |f| f.name.clone()),
            ColumnSource::FileExtension => {
                self.file_cell(data, |f| f.extension.clone().unwrap_or_default())
            }
            ColumnSource::FileMimeType => {
                self.file_cell(data, |f| f.mime_type.clone().unwrap_or_default())
            }
            ColumnSource::FileSize => self.file_cell(data, |f| f.size.to_string()),
            ColumnSource::Tags => join_tags(&data.tags),
        }
    }

    /// One cell per column, in column order
    pub fn project(&mut self, data: &ArtifactData, columns: &[ColumnSpec]) -> ReportRow {
        let cells = columns.iter().map(|c| self.cell(data, c.source)).collect();
        ReportRow {
            cells,
            artifact_id: data.artifact_id(),
        }
    }

    /// Project and sort a batch of artifacts
    pub fn project_sorted(&mut self, artifacts: &[ArtifactData], columns: &[ColumnSpec]) -> Vec<ReportRow> {
        let mut rows: Vec<ReportRow> = artifacts.iter().map(|a| self.project(a, columns)).collect();
        rows.sort();
        rows
    }
}

/// Project a single artifact without a shared file cache
pub fn project(
    case: &dyn CaseDataSource,
    errors: &ErrorLog,
    data: &ArtifactData,
    columns: &[ColumnSpec],
) -> ReportRow {
    RowProjector::new(case, errors).project(data, columns)
}

pub fn join_tags<'a, I>(tags: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    tags.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
