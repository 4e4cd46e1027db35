//! Active module bookkeeping shared by the report workers
//!
//! Holds the modules still taking part in a run together with their progress.
//! A module leaves the set when it is canceled or when one of its calls fails;
//! after that it receives no further calls.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::error::{ErrorLog, ReportResult};
use super::progress::ReportProgress;
use super::task::CancelFlag;

/// A module with its progress handle
pub struct Active<M: ?Sized> {
    pub module: Box<M>,
    pub progress: Arc<ReportProgress>,
}

impl<M: ?Sized> Active<M> {
    pub fn new(module: Box<M>, progress: Arc<ReportProgress>) -> Self {
        Self { module, progress }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Completed,
    Cancelled,
}

/// Result of one background report run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Recoverable failures, in the order they happened
    pub errors: Vec<String>,
}

impl RunOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.status == RunStatus::Cancelled
    }
}

pub struct ActiveSet<M: ?Sized> {
    modules: Vec<Active<M>>,
    errors: ErrorLog,
    canceled: usize,
}

impl<M: ?Sized> ActiveSet<M> {
    pub fn new(modules: Vec<Active<M>>, errors: ErrorLog) -> Self {
        Self { modules, errors, canceled: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Drop canceled modules; a canceled task cancels every module first
    pub fn remove_cancelled(&mut self, cancel: &CancelFlag) {
        if cancel.is_cancelled() {
            for active in &self.modules {
                active.progress.cancel();
            }
        }
        let before = self.modules.len();
        self.modules.retain(|active| !active.progress.status().is_terminal());
        let removed = before - self.modules.len();
        if removed > 0 {
            self.canceled += removed;
            info!(removed, remaining = self.modules.len(), "Dropped canceled report modules");
        }
    }

    pub fn progress(&self) -> impl Iterator<Item = &Arc<ReportProgress>> {
        self.modules.iter().map(|active| &active.progress)
    }

    pub fn update_label(&self, label: &str) {
        for progress in self.progress() {
            progress.update_label(label);
        }
    }

    pub fn increment(&self) {
        for progress in self.progress() {
            progress.increment();
        }
    }

    /// Call every active module; a failing or canceled module is dropped
    pub fn broadcast<F>(&mut self, what: &str, mut call: F)
    where
        F: FnMut(&mut M) -> ReportResult<()>,
    {
        let errors = &self.errors;
        let mut canceled = 0;
        self.modules.retain_mut(|active| {
            if active.progress.is_canceled() {
                canceled += 1;
                return false;
            }
            match call(active.module.as_mut()) {
                Ok(()) => true,
                Err(e) => {
                    errors.record(format!(
                        "{} failed to {}: {}",
                        active.progress.module_name(),
                        what,
                        e
                    ));
                    active.progress.error(format!("Failed to {}", what));
                    false
                }
            }
        });
        self.canceled += canceled;
    }

    /// Mark every module failed and empty the set
    pub fn fail_all(&mut self, label: &str) {
        for active in self.modules.drain(..) {
            active.progress.error(label);
        }
    }

    /// Complete every remaining module and build the run outcome
    pub fn finish(mut self, cancel: &CancelFlag) -> RunOutcome {
        self.remove_cancelled(cancel);
        for active in &self.modules {
            active.progress.update_label("Complete");
            active.progress.complete();
        }

        let status = if cancel.is_cancelled() || (self.modules.is_empty() && self.canceled > 0) {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };

        let errors = self.errors.take();
        if !errors.is_empty() {
            warn!(
                count = errors.len(),
                "Report run finished with errors:\n{}",
                errors.join("\n")
            );
        }
        RunOutcome { status, errors }
    }
}
