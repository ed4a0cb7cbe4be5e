//! # Progress Reporting
//!
//! Coarse task milestones (`load-<project>`, `compute-cred`, per-source tasks).
//! Reporting is observational only; nothing a reporter does can change the
//! outcome of a load.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{info, warn};

/// Receives task start/finish events.
pub trait ProgressReporter: Send + Sync {
    /// A task started.
    fn start(&self, task: &str);

    /// A task finished.
    fn finish(&self, task: &str);
}

/// Reporter that logs milestones through `tracing`, with elapsed time.
#[derive(Debug, Default)]
pub struct LoggingReporter {
    active: Mutex<BTreeMap<String, Instant>>,
}

impl LoggingReporter {
    /// Create a reporter with no active tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Instant>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProgressReporter for LoggingReporter {
    fn start(&self, task: &str) {
        let mut active = self.active();
        if active.contains_key(task) {
            warn!(task, "task started twice");
        }
        active.insert(task.to_owned(), Instant::now());
        info!(task, "start");
    }

    fn finish(&self, task: &str) {
        match self.active().remove(task) {
            Some(started) => {
                info!(task, elapsed_ms = started.elapsed().as_millis() as u64, "finish");
            }
            None => warn!(task, "finished a task that was never started"),
        }
    }
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn start(&self, _task: &str) {}

    fn finish(&self, _task: &str) {}
}
