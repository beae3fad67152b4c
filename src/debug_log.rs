//! Structured debug log returned alongside every invocation.

use std::fmt;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Step-by-step progress.
    Info,
    /// Recovered problem (e.g. a payload that failed to decode).
    Warn,
    /// Terminal failure of the invocation.
    Error,
}

impl LogLevel {
    /// Upper-case label used when rendering.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// A single log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ImageFX] {} {}", self.level.as_str(), self.message)
    }
}

/// Ordered log of one invocation.
///
/// Entries are only kept when the log is enabled. Kept entries are also
/// emitted as `tracing` debug events under the `imagefx` target, so
/// `RUST_LOG=imagefx=debug` shows them as they happen.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    enabled: bool,
    entries: Vec<LogEntry>,
}

impl DebugLog {
    /// Create a log; when `enabled` is false every push is a no-op.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
        }
    }

    /// Whether entries are being recorded.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append an info entry.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    /// Append a warning entry.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message);
    }

    /// Append an error entry.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    /// Append an entry at the given level.
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let message = message.into();
        tracing::debug!(target: "imagefx", severity = level.as_str(), "{message}");
        self.entries.push(LogEntry { level, message });
    }

    /// Recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// True if any entry contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    /// Render all entries as newline-separated text (empty when disabled).
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
