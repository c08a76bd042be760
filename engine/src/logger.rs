//! User-facing logging port.
//!
//! The pipeline routes help/version text, success confirmations, and error
//! messages through a [`Logger`]; internal engine diagnostics go through
//! `tracing` instead. Handlers use the logger for their business output but
//! never for their own invocation outcome.

use std::sync::Mutex;

/// Severity of a user-facing log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Diagnostic detail, shown only when verbosity is raised.
    Debug,
    /// Normal output: help text, confirmations.
    Info,
    /// Recoverable oddities.
    Warning,
    /// Failures surfaced to the user.
    Error,
}

/// Accepts a severity level and a message string.
pub trait Logger: Send + Sync {
    /// Writes one message at the given level.
    fn log(&self, level: LogLevel, message: &str);

    /// Writes at [`LogLevel::Debug`].
    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Writes at [`LogLevel::Info`].
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Writes at [`LogLevel::Warning`].
    fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    /// Writes at [`LogLevel::Error`].
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Plain console logger: info and below to stdout, warnings and errors to
/// stderr. Messages below the threshold are dropped.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLogger {
    threshold: LogLevel,
}

impl ConsoleLogger {
    /// Creates a console logger dropping everything below `threshold`.
    pub fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level < self.threshold {
            return;
        }
        if level >= LogLevel::Warning {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}

/// Recording logger for tests and debug inspection.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    /// All recorded entries, in order.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().expect("logger poisoned").clone()
    }

    /// Recorded messages at one level, in order.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .expect("logger poisoned")
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_records_in_order() {
        let logger = MemoryLogger::default();
        logger.info("first");
        logger.error("second");

        assert_eq!(
            logger.entries(),
            vec![
                (LogLevel::Info, "first".to_string()),
                (LogLevel::Error, "second".to_string()),
            ]
        );
        assert_eq!(logger.messages_at(LogLevel::Info), vec!["first"]);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warning < LogLevel::Error);
    }
}
