//! Error types for report generation

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::error;

use super::task::TaskError;
use crate::case::CaseError;

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors that can occur during report generation
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error (file read/write)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Template rendering error
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
    /// DOCX generation error
    #[error("DOCX generation error: {0}")]
    Docx(String),
    /// Delimited table writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Report output folder could not be created
    #[error("Failed to create report folder {path}: {source}")]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Case database access failed
    #[error("Case access error: {0}")]
    Case(#[from] CaseError),
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
    /// Sink called out of lifecycle order
    #[error("Invalid sink state: {0}")]
    InvalidState(String),
    /// Background task stopped without a result
    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}

/// Messages accumulated during one report run
///
/// Written by the background task, read by the caller once the task signals
/// completion.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable failure and log it
    pub fn record(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
    }

    pub fn len(&self) -> usize {
        match self.messages.lock() {
            Ok(messages) => messages.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the recorded messages, leaving the log empty
    pub fn take(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}
