//! Per-request diagnostics sink.
//!
//! Decoding is lenient: clamps, skipped cells and truncated columns are
//! recovered locally and reported here instead of failing the operation.
//! Every entry is mirrored to `tracing`, and the collected trace can be
//! rendered for a response's `logs` field.

use std::cell::RefCell;

use chrono::{DateTime, Utc};

const TARGET: &str = "lontar::decode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Log,
    Warn,
    Error,
}

impl LogLevel {
    fn tag(&self) -> &'static str {
        match self {
            LogLevel::Log => "LOG",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct DecodeLog {
    capture: bool,
    entries: RefCell<Vec<LogEntry>>,
}

impl Default for DecodeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeLog {
    pub fn new() -> Self {
        Self {
            capture: true,
            entries: RefCell::new(Vec::new()),
        }
    }

    /// A sink that only forwards to `tracing` and keeps nothing.
    pub fn disabled() -> Self {
        Self {
            capture: false,
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(target: TARGET, "{}", message);
        self.push(LogLevel::Log, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: TARGET, "{}", message);
        self.push(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(target: TARGET, "{}", message);
        self.push(LogLevel::Error, message);
    }

    fn push(&self, level: LogLevel, message: String) {
        if !self.capture {
            return;
        }
        self.entries.borrow_mut().push(LogEntry {
            level,
            message,
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.level == level)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// `[LOG] ...`, `[WARN] ...`, `[ERROR] ...` lines in arrival order.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| format!("[{}] {}", entry.level.tag(), entry.message))
            .collect()
    }
}
