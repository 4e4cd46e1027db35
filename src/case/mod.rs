//! Case database access
//!
//! Read-side view over a Sleuth Kit style case database: files, blackboard
//! artifacts with their attributes, and the tags examiners put on both.
//!
//! Report code only talks to [`CaseDataSource`]; [`SqliteCase`] is the
//! rusqlite-backed implementation.

pub mod ids;
pub mod sqlite;
pub mod types;

pub use sqlite::{NewFile, SqliteCase};
pub use types::*;

use std::collections::BTreeSet;
use thiserror::Error;

/// Result type alias for case access
pub type CaseResult<T> = Result<T, CaseError>;

/// Failures talking to the case database
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Case database lock poisoned")]
    LockPoisoned,
    #[error("Invalid case data: {0}")]
    InvalidData(String),
}

/// Queries the report generator needs from a case
pub trait CaseDataSource: Send + Sync {
    /// Artifact types that have at least one artifact, by id
    fn artifact_types_in_use(&self) -> CaseResult<Vec<ArtifactType>>;

    fn artifact_type(&self, type_id: i32) -> CaseResult<Option<ArtifactType>>;

    fn artifact_count(&self, type_id: i32) -> CaseResult<u64>;

    /// Artifact headers of one type, by artifact id
    fn artifacts_of_type(&self, type_id: i32) -> CaseResult<Vec<Artifact>>;

    /// Attributes of one artifact in insertion order
    fn artifact_attributes(&self, artifact_id: i64) -> CaseResult<Vec<Attribute>>;

    /// Display names of the tags applied to one artifact
    fn artifact_tag_names(&self, artifact_id: i64) -> CaseResult<BTreeSet<String>>;

    fn content_tags(&self) -> CaseResult<Vec<ContentTag>>;

    fn artifact_tags(&self) -> CaseResult<Vec<ArtifactTag>>;

    /// Tag names with at least one content or artifact tag, ascending
    fn tag_names_in_use(&self) -> CaseResult<Vec<String>>;

    fn file_by_id(&self, object_id: i64) -> CaseResult<Option<FileRecord>>;

    /// Canonical display path of a file
    fn file_unique_path(&self, object_id: i64) -> CaseResult<Option<String>> {
        Ok(self.file_by_id(object_id)?.map(|f| f.unique_path))
    }

    /// Distinct set/list names carried by artifacts of one type, ascending
    fn set_names(&self, artifact_type_id: i32) -> CaseResult<Vec<String>>;

    /// Files matching a raw SQL `WHERE` clause over `tsk_files`
    fn files_where(&self, clause: &str) -> CaseResult<Vec<FileRecord>>;

    /// Every non-directory file, by object id
    fn all_files(&self) -> CaseResult<Vec<FileRecord>>;

    /// Artifacts whose domain attribute matches, case-insensitively
    fn artifacts_for_domain(&self, domain: &str) -> CaseResult<Vec<ArtifactRecord>>;

    /// Load an artifact together with its attributes
    fn artifact_record(&self, artifact: Artifact) -> CaseResult<ArtifactRecord> {
        let attributes = self.artifact_attributes(artifact.artifact_id)?;
        Ok(ArtifactRecord::new(artifact, attributes))
    }
}
