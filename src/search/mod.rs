//! Case searches outside the report pipeline
//!
//! - [`CommonFilesSearch`]: files sharing an MD5 hash
//! - [`mini_timeline`]: artifacts of a web domain grouped by day

pub mod common_files;
pub mod timeline;

pub use common_files::{CommonFileGroup, CommonFilesSearch};
pub use timeline::{mini_timeline, mini_timeline_result, spawn_mini_timeline, DateArtifacts};
