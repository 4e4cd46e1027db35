//! Per-sink progress and cancellation state
//!
//! One [`ReportProgress`] exists per enabled report module. The worker task
//! moves it through `Queued -> Started -> Complete | Error` and polls it for
//! `Canceled`, which the interactive side may set at any time. Terminal states
//! are sticky: a canceled module never reports completion.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportStatus {
    Queued,
    Started,
    Canceled,
    Complete,
    Error,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Canceled | ReportStatus::Complete | ReportStatus::Error)
    }
}

/// Change notification for an interactive observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Status { module: String, status: ReportStatus },
    Progress { module: String, current: u64, maximum: u64 },
    Label { module: String, label: String },
}

/// Point-in-time copy of a module's progress
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub module_name: String,
    pub path: Option<PathBuf>,
    pub status: ReportStatus,
    pub maximum: u64,
    pub current: u64,
    pub label: String,
    pub indeterminate: bool,
}

#[derive(Debug)]
struct ProgressState {
    status: ReportStatus,
    maximum: u64,
    current: u64,
    label: String,
    indeterminate: bool,
}

#[derive(Debug)]
pub struct ReportProgress {
    module_name: String,
    path: Option<PathBuf>,
    state: Mutex<ProgressState>,
    observer: Option<UnboundedSender<ProgressEvent>>,
}

impl ReportProgress {
    pub fn new(module_name: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            module_name: module_name.into(),
            path,
            state: Mutex::new(ProgressState {
                status: ReportStatus::Queued,
                maximum: 0,
                current: 0,
                label: String::from("Queued"),
                indeterminate: true,
            }),
            observer: None,
        }
    }

    /// Forward every change to `observer`
    pub fn with_observer(mut self, observer: UnboundedSender<ProgressEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn state(&self) -> MutexGuard<'_, ProgressState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn notify(&self, event: ProgressEvent) {
        if let Some(observer) = &self.observer {
            // Receiver gone just means nobody is watching anymore
            let _ = observer.send(event);
        }
    }

    fn transition(&self, to: ReportStatus) -> bool {
        {
            let mut state = self.state();
            if state.status == to || state.status.is_terminal() {
                return false;
            }
            state.status = to;
            if to.is_terminal() {
                state.indeterminate = false;
            }
        }
        debug!(module = %self.module_name, status = ?to, "Report status changed");
        self.notify(ProgressEvent::Status { module: self.module_name.clone(), status: to });
        true
    }

    pub fn start(&self) -> bool {
        self.transition(ReportStatus::Started)
    }

    /// Request cancellation; ignored once the module has finished
    pub fn cancel(&self) -> bool {
        self.transition(ReportStatus::Canceled)
    }

    pub fn complete(&self) -> bool {
        let done = self.transition(ReportStatus::Complete);
        if done {
            let mut state = self.state();
            state.current = state.maximum;
        }
        done
    }

    /// Mark the module failed with a status label
    pub fn error(&self, label: impl Into<String>) -> bool {
        let failed = self.transition(ReportStatus::Error);
        if failed {
            self.update_label(label);
        }
        failed
    }

    pub fn status(&self) -> ReportStatus {
        self.state().status
    }

    pub fn is_canceled(&self) -> bool {
        self.status() == ReportStatus::Canceled
    }

    pub fn set_indeterminate(&self, indeterminate: bool) {
        self.state().indeterminate = indeterminate;
    }

    pub fn set_maximum(&self, maximum: u64) {
        let current = {
            let mut state = self.state();
            state.maximum = maximum;
            state.indeterminate = false;
            state.current
        };
        self.notify(ProgressEvent::Progress {
            module: self.module_name.clone(),
            current,
            maximum,
        });
    }

    pub fn increment(&self) {
        let (current, maximum) = {
            let mut state = self.state();
            state.current = state.current.saturating_add(1);
            (state.current, state.maximum)
        };
        self.notify(ProgressEvent::Progress {
            module: self.module_name.clone(),
            current,
            maximum,
        });
    }

    pub fn update_label(&self, label: impl Into<String>) {
        let label = label.into();
        self.state().label = label.clone();
        self.notify(ProgressEvent::Label { module: self.module_name.clone(), label });
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state();
        ProgressSnapshot {
            module_name: self.module_name.clone(),
            path: self.path.clone(),
            status: state.status,
            maximum: state.maximum,
            current: state.current,
            label: state.label.clone(),
            indeterminate: state.indeterminate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_lifecycle() {
        let progress = ReportProgress::new("HTML", None);
        assert_eq!(progress.status(), ReportStatus::Queued);
        assert!(progress.start());
        progress.set_maximum(3);
        progress.increment();
        assert_eq!(progress.snapshot().current, 1);
        assert!(progress.complete());
        let snap = progress.snapshot();
        assert_eq!(snap.status, ReportStatus::Complete);
        assert_eq!(snap.current, 3);
    }

    #[test]
    fn test_cancel_is_sticky() {
        let progress = ReportProgress::new("CSV", None);
        progress.start();
        assert!(progress.cancel());
        assert!(!progress.complete());
        assert!(!progress.start());
        assert!(!progress.error("late failure"));
        assert!(progress.is_canceled());
    }

    #[test]
    fn test_observer_receives_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let progress = ReportProgress::new("Word", None).with_observer(tx);
        progress.start();
        progress.update_label("Processing Web Bookmarks");

        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::Status { module: "Word".into(), status: ReportStatus::Started }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::Label { module: "Word".into(), label: "Processing Web Bookmarks".into() }
        );
    }
}
