//! Forensic Audit Logging
//!
//! Structured records of report runs and case access for chain of custody.
//! Every entry goes to the `forensic_audit` target with a UTC timestamp.

use std::path::Path;
use tracing::{info, span, warn, Level};

use crate::report::RunOutcome;

/// Log the case database being opened for reporting
pub fn log_case_opened(path: &Path, case_name: &str) {
    let _span = span!(
        Level::INFO,
        "case_access",
        path = %path.display(),
    )
    .entered();

    info!(
        target: "forensic_audit",
        operation = "case_open",
        path = %path.display(),
        case_name = case_name,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        "Case database opened"
    );
}

/// Log a report run being handed to the worker pool
pub fn log_report_run_started(kind: &str, report_path: &Path, modules: usize) {
    info!(
        target: "forensic_audit",
        operation = "report_start",
        kind = kind,
        output_path = %report_path.display(),
        modules = modules,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        "Report run started"
    );
}

/// Log the end of a report run
pub fn log_report_run_finished(kind: &str, report_path: &Path, outcome: &RunOutcome) {
    if outcome.errors.is_empty() {
        info!(
            target: "forensic_audit",
            operation = "report_finish",
            kind = kind,
            output_path = %report_path.display(),
            status = ?outcome.status,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "Report run finished"
        );
    } else {
        warn!(
            target: "forensic_audit",
            operation = "report_finish",
            kind = kind,
            output_path = %report_path.display(),
            status = ?outcome.status,
            errors = outcome.errors.len(),
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "Report run finished with errors"
        );
    }
}

/// Log evidence content copied out of the case into a report
pub fn log_data_export(source: &Path, destination: &Path, bytes_exported: u64) {
    info!(
        target: "forensic_audit",
        operation = "data_export",
        source = %source.display(),
        destination = %destination.display(),
        bytes_exported = bytes_exported,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        "Evidence data exported"
    );
}
