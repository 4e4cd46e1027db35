//! Report module interfaces
//!
//! Three kinds of output module:
//! - [`TableReportModule`] receives artifact tables section by section
//! - [`FileReportModule`] receives one row per file in the case
//! - [`GeneralReportModule`] inspects the case itself and writes its own output
//!
//! Every call returns a [`ReportResult`]; a module that fails is dropped from
//! the rest of the run with status `Error`.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ReportError, ReportResult};
use super::progress::ReportProgress;
use super::projector::format_file_time;
use crate::case::{CaseDataSource, ContentTag, FileRecord};

/// Images per row of the thumbnails table
pub const THUMBNAIL_COLUMNS: usize = 5;

/// Consumer of tabular artifact reports
///
/// Call order within a run:
/// `start_report`, then per data type `start_data_type`, optionally
/// `add_set_index` and `start_set`/`add_set_element`, `start_table`,
/// `add_row`*, `end_table`, closing any set, `end_data_type`, and finally
/// `end_report`. Modules that support thumbnails get one more data type,
/// filled through `add_thumbnail_rows`, before `end_report`.
pub trait TableReportModule: Send {
    fn name(&self) -> &str;

    /// Output location relative to the report run folder
    fn relative_file_path(&self) -> &str;

    fn start_report(&mut self, report_dir: &Path) -> ReportResult<()>;
    fn end_report(&mut self) -> ReportResult<()>;

    fn start_data_type(&mut self, name: &str, comment: &str) -> ReportResult<()>;
    fn end_data_type(&mut self) -> ReportResult<()>;

    fn start_set(&mut self, set_name: &str) -> ReportResult<()>;
    fn end_set(&mut self) -> ReportResult<()>;

    /// Names of every set about to be started in this data type
    fn add_set_index(&mut self, sets: &[String]) -> ReportResult<()>;
    fn add_set_element(&mut self, element_name: &str) -> ReportResult<()>;

    fn start_table(&mut self, headers: &[String]) -> ReportResult<()>;
    fn end_table(&mut self) -> ReportResult<()>;
    fn add_row(&mut self, cells: &[String]) -> ReportResult<()>;

    /// Whether [`add_tagged_content_row`](Self::add_tagged_content_row) does
    /// anything beyond `add_row`
    fn supports_tagged_content_links(&self) -> bool {
        false
    }

    /// Row of the tagged files table, with the tag and the tagged file
    fn add_tagged_content_row(
        &mut self,
        cells: &[String],
        _tag: &ContentTag,
        _file: Option<&FileRecord>,
    ) -> ReportResult<()> {
        self.add_row(cells)
    }

    /// Whether this module renders the tagged images section
    fn supports_thumbnails(&self) -> bool {
        false
    }

    /// Fill the open thumbnails table, [`THUMBNAIL_COLUMNS`] images per row
    fn add_thumbnail_rows(&mut self, _images: &[FileRecord]) -> ReportResult<()> {
        Ok(())
    }
}

/// Consumer of the per-file listing
pub trait FileReportModule: Send {
    fn name(&self) -> &str;
    fn relative_file_path(&self) -> &str;
    fn start_report(&mut self, report_dir: &Path) -> ReportResult<()>;
    fn end_report(&mut self) -> ReportResult<()>;
    fn start_table(&mut self, columns: &[FileReportDataType]) -> ReportResult<()>;
    fn add_row(&mut self, file: &FileRecord, columns: &[FileReportDataType]) -> ReportResult<()>;
    fn end_table(&mut self) -> ReportResult<()>;
}

/// Module that reads the case on its own and writes its own output
pub trait GeneralReportModule: Send {
    fn name(&self) -> &str;
    fn relative_file_path(&self) -> &str;
    fn generate_report(
        &mut self,
        report_dir: &Path,
        progress: &ReportProgress,
        case: &dyn CaseDataSource,
    ) -> ReportResult<()>;
}

// ============================================================================
// File list columns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileReportDataType {
    Name,
    Extension,
    FileType,
    IsDeleted,
    LastAccessed,
    Created,
    LastModified,
    Size,
    Address,
    Hash,
    KnownStatus,
    Permissions,
    FullPath,
}

impl FileReportDataType {
    pub const ALL: [FileReportDataType; 13] = [
        FileReportDataType::Name,
        FileReportDataType::Extension,
        FileReportDataType::FileType,
        FileReportDataType::IsDeleted,
        FileReportDataType::LastAccessed,
        FileReportDataType::Created,
        FileReportDataType::LastModified,
        FileReportDataType::Size,
        FileReportDataType::Address,
        FileReportDataType::Hash,
        FileReportDataType::KnownStatus,
        FileReportDataType::Permissions,
        FileReportDataType::FullPath,
    ];

    /// Column header
    pub fn name(self) -> &'static str {
        match self {
            FileReportDataType::Name => "Name",
            FileReportDataType::Extension => "Extension",
            FileReportDataType::FileType => "File Type",
            FileReportDataType::IsDeleted => "Is Deleted",
            FileReportDataType::LastAccessed => "Last Accessed",
            FileReportDataType::Created => "Created",
            FileReportDataType::LastModified => "Last Modified",
            FileReportDataType::Size => "Size",
            FileReportDataType::Address => "Address",
            FileReportDataType::Hash => "Hash",
            FileReportDataType::KnownStatus => "Known Status",
            FileReportDataType::Permissions => "Permissions",
            FileReportDataType::FullPath => "Full Path",
        }
    }

    pub fn value(self, file: &FileRecord) -> String {
        match self {
            FileReportDataType::Name => file.name.clone(),
            FileReportDataType::Extension => file
                .name
                .rfind('.')
                .map(|i| file.name[i..].to_string())
                .unwrap_or_default(),
            FileReportDataType::FileType => meta_type_letter(file.meta_type).to_string(),
            FileReportDataType::IsDeleted => {
                if file.is_deleted() { "yes".to_string() } else { String::new() }
            }
            FileReportDataType::LastAccessed => format_file_time(file.atime),
            FileReportDataType::Created => format_file_time(file.crtime),
            FileReportDataType::LastModified => format_file_time(file.mtime),
            FileReportDataType::Size => file.size.to_string(),
            FileReportDataType::Address => file.meta_addr.to_string(),
            FileReportDataType::Hash => file.md5.clone().unwrap_or_default(),
            FileReportDataType::KnownStatus => known_status(file.known).to_string(),
            FileReportDataType::Permissions => mode_string(file.meta_type, file.mode),
            FileReportDataType::FullPath => file.unique_path.clone(),
        }
    }
}

impl FromStr for FileReportDataType {
    type Err = ReportError;

    /// Accepts the header ("Known Status") or the config key ("known_status")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', " ");
        FileReportDataType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ReportError::Config(format!("unknown file list column: {}", s)))
    }
}

fn meta_type_letter(meta_type: i32) -> &'static str {
    match meta_type {
        1 => "r",
        2 => "d",
        3 => "p",
        4 => "c",
        5 => "b",
        6 => "l",
        7 => "s",
        8 => "h",
        9 => "w",
        10 => "v",
        _ => "-",
    }
}

fn known_status(known: Option<i32>) -> &'static str {
    match known {
        Some(1) => "known",
        Some(2) => "notable",
        _ => "unknown",
    }
}

/// `ls -l` style permission string
fn mode_string(meta_type: i32, mode: i32) -> String {
    let kind = match meta_type {
        2 => 'd',
        6 => 'l',
        _ => '-',
    };
    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}
