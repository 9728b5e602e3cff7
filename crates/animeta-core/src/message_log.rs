//! Append-only message accumulator threaded through a mapping pass.
//!
//! Each call to [`MessageLog::log`] hands its value straight back, so a log
//! line can wrap any expression without changing what it evaluates to. The
//! log has a single owner; per-task logs are combined with
//! [`MessageLog::extend`] once the task finishes.

/// Severity scale shared with the host's logging sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub source: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message and return `value` unchanged.
    pub fn log<T>(
        &mut self,
        value: T,
        source: &str,
        message: impl Into<String>,
        severity: Severity,
    ) -> T {
        let message = message.into();
        match severity {
            Severity::Debug => tracing::debug!(source, "{message}"),
            Severity::Info => tracing::info!(source, "{message}"),
            Severity::Warn => tracing::warn!(source, "{message}"),
            Severity::Error => tracing::error!(source, "{message}"),
            Severity::Fatal => tracing::error!(source, fatal = true, "{message}"),
        }
        self.entries.push(LogEntry {
            source: source.to_string(),
            message,
            severity,
        });
        value
    }

    /// Entries in the order they were logged.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries at `min` or above.
    pub fn at_least(&self, min: Severity) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.severity >= min)
    }

    /// Append another log after this one's entries.
    pub fn extend(&mut self, other: MessageLog) {
        self.entries.extend(other.entries);
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_returns_value_unchanged() {
        let mut log = MessageLog::new();
        let v = log.log(Some(42), "mapper", "picked rating", Severity::Debug);
        assert_eq!(v, Some(42));
        let r: Result<u8, &str> = log.log(Err("boom"), "mapper", "failed", Severity::Error);
        assert_eq!(r, Err("boom"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_entries_keep_order() {
        let mut log = MessageLog::new();
        log.log((), "a", "first", Severity::Info);
        log.log((), "b", "second", Severity::Fatal);
        let messages: Vec<&str> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(log.entries()[1].source, "b");
    }

    #[test]
    fn test_extend_merges_after_existing() {
        let mut main = MessageLog::new();
        main.log((), "main", "one", Severity::Debug);
        let mut task = MessageLog::new();
        task.log((), "task", "two", Severity::Warn);
        main.extend(task);

        assert_eq!(main.len(), 2);
        assert_eq!(main.at_least(Severity::Warn).count(), 1);
        assert_eq!(main.into_entries()[1].message, "two");
    }

    #[test]
    fn test_severity_is_ordered() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::Warn.to_string(), "warn");
    }
}
