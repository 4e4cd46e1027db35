//! Mini timeline: artifacts of one web domain grouped by creation day

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::DateTime;
use serde::Serialize;
use tracing::{debug, error};

use crate::case::ids::attribute;
use crate::case::{ArtifactRecord, CaseDataSource, CaseResult};
use crate::report::{ReportWorkerPool, TaskHandle};

/// Day format of timeline entries
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Artifacts created on one day
#[derive(Debug, Clone, Serialize)]
pub struct DateArtifacts {
    pub date: String,
    pub artifacts: Vec<ArtifactRecord>,
}

/// Group a domain's artifacts by the day of their creation time, days ascending
///
/// Artifacts without a creation time are left out; a blank domain gives nothing.
pub fn mini_timeline(case: &dyn CaseDataSource, domain: &str) -> CaseResult<Vec<DateArtifacts>> {
    if domain.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut days: BTreeMap<String, Vec<ArtifactRecord>> = BTreeMap::new();
    for record in case.artifacts_for_domain(domain)? {
        let day = record
            .attribute(attribute::DATETIME_CREATED)
            .and_then(|a| a.value.as_datetime())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.format(DAY_FORMAT).to_string());
        if let Some(day) = day {
            days.entry(day).or_default().push(record);
        }
    }

    Ok(days
        .into_iter()
        .map(|(date, artifacts)| DateArtifacts { date, artifacts })
        .collect())
}

/// Build the timeline on the worker pool
///
/// Failures and cancellation give an empty timeline; they are only logged.
pub fn spawn_mini_timeline(
    pool: &ReportWorkerPool,
    case: Arc<dyn CaseDataSource>,
    domain: String,
) -> TaskHandle<Vec<DateArtifacts>> {
    pool.submit(move |cancel| {
        if cancel.is_cancelled() {
            return Vec::new();
        }
        match mini_timeline(case.as_ref(), &domain) {
            Ok(_) if cancel.is_cancelled() => {
                debug!(domain = %domain, "Mini timeline cancelled");
                Vec::new()
            }
            Ok(days) => days,
            Err(e) => {
                error!(domain = %domain, error = %e, "Failed to build mini timeline");
                Vec::new()
            }
        }
    })
}

/// Wait for a spawned timeline; an interrupted task gives an empty one
pub fn mini_timeline_result(handle: TaskHandle<Vec<DateArtifacts>>) -> Vec<DateArtifacts> {
    handle.wait().unwrap_or_else(|e| {
        error!(error = %e, "Mini timeline task failed");
        Vec::new()
    })
}
