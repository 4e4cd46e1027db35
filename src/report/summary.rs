//! Case summary: `case-summary.json`
//!
//! A general module; reads counts straight from the case instead of going
//! through the table pipeline.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::error::ReportResult;
use super::modules::GeneralReportModule;
use super::progress::ReportProgress;
use crate::case::CaseDataSource;

pub const SUMMARY_FILE_NAME: &str = "case-summary.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCount {
    pub type_name: String,
    pub display_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub case_name: String,
    pub artifact_counts: Vec<ArtifactCount>,
    pub tag_names: Vec<String>,
    pub file_count: usize,
}

pub struct CaseSummaryReport {
    case_name: String,
}

impl CaseSummaryReport {
    pub fn new(case_name: impl Into<String>) -> Self {
        Self { case_name: case_name.into() }
    }

    fn collect(&self, progress: &ReportProgress, case: &dyn CaseDataSource) -> ReportResult<CaseSummary> {
        let types = case.artifact_types_in_use()?;
        progress.set_indeterminate(false);
        progress.set_maximum(types.len() as u64 + 2);

        let mut artifact_counts = Vec::with_capacity(types.len());
        for artifact_type in types {
            if progress.is_canceled() {
                break;
            }
            progress.update_label(format!("Counting {}...", artifact_type.display_name));
            artifact_counts.push(ArtifactCount {
                count: case.artifact_count(artifact_type.id)?,
                type_name: artifact_type.type_name,
                display_name: artifact_type.display_name,
            });
            progress.increment();
        }

        let tag_names = case.tag_names_in_use()?;
        progress.increment();
        let file_count = case.all_files()?.len();
        progress.increment();

        Ok(CaseSummary {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            case_name: self.case_name.clone(),
            artifact_counts,
            tag_names,
            file_count,
        })
    }
}

impl GeneralReportModule for CaseSummaryReport {
    fn name(&self) -> &str {
        "Case Summary"
    }

    fn relative_file_path(&self) -> &str {
        SUMMARY_FILE_NAME
    }

    fn generate_report(
        &mut self,
        report_dir: &Path,
        progress: &ReportProgress,
        case: &dyn CaseDataSource,
    ) -> ReportResult<()> {
        let summary = self.collect(progress, case)?;
        if progress.is_canceled() {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(report_dir.join(SUMMARY_FILE_NAME), json)?;
        info!(run_id = %summary.run_id, files = summary.file_count, "Case summary written");
        Ok(())
    }
}
