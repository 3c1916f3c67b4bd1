// file: src/utils/reporter.rs
// description: injected progress/status reporter used by the upload pipeline
// reference: https://docs.rs/tracing

use std::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Sink for the human-readable status lines emitted during a run.
pub trait Reporter: Send + Sync {
    fn report(&self, level: ReportLevel, message: &str);

    fn info(&self, message: &str) {
        self.report(ReportLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.report(ReportLevel::Success, message);
    }

    fn warn(&self, message: &str) {
        self.report(ReportLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.report(ReportLevel::Error, message);
    }

    fn step(&self, step: usize, total: usize, message: &str) {
        self.report(
            ReportLevel::Info,
            &format!("[{}/{}] {}", step, total, message),
        );
    }
}

/// Forwards every line to the active `tracing` subscriber.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Info | ReportLevel::Success => info!("{}", message),
            ReportLevel::Warning => warn!("{}", message),
            ReportLevel::Error => error!("{}", message),
        }
    }
}

/// Keeps lines in memory so a host can show them next to the node output.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<(ReportLevel, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(ReportLevel, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self, level: ReportLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, m)| m.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}
