//! Report configuration file
//!
//! A pretty-printed JSON file naming the case, where reports go and what they
//! contain. Every field has a default so a partial file is valid; command
//! line flags override what the file says.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::case::ids::artifact_type_id_by_name;
use crate::case::{ArtifactType, CaseDataSource};
use crate::report::{FileReportDataType, ReportError, ReportResult, TableFormat, TagFilter};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Worker threads when the config does not say
pub const DEFAULT_THREADS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Config file format version
    pub version: u32,
    /// Case database (SQLite)
    pub case_db: Option<PathBuf>,
    /// Used in the report folder name; defaults to the database file stem
    pub case_name: Option<String>,
    /// Parent folder of every report run
    pub report_directory: Option<PathBuf>,
    /// Artifact types by name or display name; empty means every type in use
    pub artifact_types: Vec<String>,
    /// Tag names a row must carry; empty means no filtering
    pub tag_filter: Vec<String>,
    pub table_formats: Vec<TableFormat>,
    pub file_list: bool,
    pub file_list_columns: Vec<FileReportDataType>,
    pub case_summary: bool,
    /// Overrides for the HTML templates
    pub html_template_dir: Option<PathBuf>,
    pub threads: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            case_db: None,
            case_name: None,
            report_directory: None,
            artifact_types: Vec::new(),
            tag_filter: Vec::new(),
            table_formats: vec![TableFormat::Html],
            file_list: false,
            file_list_columns: FileReportDataType::ALL.to_vec(),
            case_summary: true,
            html_template_dir: None,
            threads: DEFAULT_THREADS,
        }
    }
}

impl ReportConfig {
    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> ReportResult<Self> {
        let path = path.as_ref();
        info!("Loading report config from: {:?}", path);

        let json = fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ReportError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: ReportConfig = serde_json::from_str(&json).map_err(|e| {
            warn!("Failed to parse config file: {}", e);
            ReportError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if config.version > CONFIG_VERSION {
            warn!(
                "Config file version {} is newer than supported version {}",
                config.version, CONFIG_VERSION
            );
        }
        Ok(config)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> ReportResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, &json)?;
        info!("Report config saved: {} bytes", json.len());
        Ok(())
    }

    /// Case name for folders and titles
    pub fn resolved_case_name(&self) -> String {
        self.case_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                self.case_db
                    .as_ref()
                    .and_then(|p| p.file_stem())
                    .map(|s| s.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "Case".to_string())
    }

    /// Report directory; defaults to `Reports` next to the case database
    pub fn resolved_report_directory(&self) -> PathBuf {
        match (&self.report_directory, &self.case_db) {
            (Some(dir), _) => dir.clone(),
            (None, Some(db)) => db
                .parent()
                .map(|p| p.join("Reports"))
                .unwrap_or_else(|| PathBuf::from("Reports")),
            (None, None) => PathBuf::from("Reports"),
        }
    }

    pub fn tag_filter(&self) -> TagFilter {
        TagFilter::new(self.tag_filter.iter().map(String::as_str))
    }

    /// The artifact types to report, in id order
    ///
    /// Unknown names are a config error; known types with no artifacts are
    /// kept so the run still reports them as empty.
    pub fn resolve_artifact_types(&self, case: &dyn CaseDataSource) -> ReportResult<Vec<ArtifactType>> {
        if self.artifact_types.is_empty() {
            return Ok(case.artifact_types_in_use()?);
        }

        let mut types = Vec::with_capacity(self.artifact_types.len());
        for name in &self.artifact_types {
            let id = artifact_type_id_by_name(name)
                .ok_or_else(|| ReportError::Config(format!("unknown artifact type: {}", name)))?;
            let artifact_type = case
                .artifact_type(id)?
                .ok_or_else(|| ReportError::Config(format!("artifact type not in case: {}", name)))?;
            if !types.iter().any(|t: &ArtifactType| t.id == artifact_type.id) {
                types.push(artifact_type);
            }
        }
        types.sort_by_key(|t| t.id);
        Ok(types)
    }
}
