//! Common file search: files whose MD5 occurs more than once

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::case::{CaseDataSource, CaseResult, FileRecord};

/// Files that share one hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonFileGroup {
    pub md5: String,
    pub files: Vec<FileRecord>,
}

/// Which data sources a search covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonFilesSearch {
    AllDataSources,
    /// Files duplicated within one data source, by its object id
    DataSource(i64),
}

impl CommonFilesSearch {
    /// `WHERE` clause over `tsk_files`; known files never count as common
    pub fn where_clause(&self) -> String {
        match self {
            CommonFilesSearch::AllDataSources => "md5 in (select md5 from tsk_files where (known != 1 OR known IS NULL) \
                 GROUP BY md5 HAVING COUNT(*) > 1) order by md5"
                .to_string(),
            CommonFilesSearch::DataSource(id) => format!(
                "md5 in (select md5 from tsk_files where data_source_obj_id={id} and (known != 1 OR known IS NULL) \
                 GROUP BY md5 HAVING COUNT(*) > 1) AND data_source_obj_id={id} order by md5"
            ),
        }
    }

    /// Run the search and group the matches by hash, in hash order
    pub fn run(&self, case: &dyn CaseDataSource) -> CaseResult<Vec<CommonFileGroup>> {
        let files = case.files_where(&self.where_clause())?;
        let mut groups: BTreeMap<String, Vec<FileRecord>> = BTreeMap::new();
        for file in files {
            if let Some(md5) = file.md5.clone() {
                groups.entry(md5).or_default().push(file);
            }
        }
        debug!(search = ?self, groups = groups.len(), "Common file search finished");
        Ok(groups
            .into_iter()
            .map(|(md5, files)| CommonFileGroup { md5, files })
            .collect())
    }
}
