//! Log record representation consumed by the appender.
//!
//! A [`LogioRecord`] carries the severity and message of one logging call
//! together with the metadata a layout may render: timestamp, thread, a
//! mutable property bag, an optional call site, and optional trace lines
//! describing an attached error.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::thread::{self, ThreadId};
use std::time::SystemTime;

use crate::level::LogioLevel;

/// Source location of the logging call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub module_path: String,
    pub filename: String,
    pub line_number: u32,
}

/// Additional context associated with a log record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// ID of the thread that created the record.
    pub thread_id: ThreadId,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
    /// Where the logging call was made, when the caller supplied it.
    pub location: Option<CallSite>,
    /// Structured key-value pairs attached to the record.
    pub properties: BTreeMap<String, String>,
}

impl Default for RecordMetadata {
    fn default() -> Self {
        let current = thread::current();
        Self {
            timestamp: SystemTime::now(),
            thread_id: current.id(),
            thread_name: current.name().map(ToString::to_string),
            location: None,
            properties: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogioRecord {
    /// Name of the logger that created this record.
    pub logger: String,
    pub level: LogioLevel,
    /// The log message content.
    pub message: String,
    /// Contextual metadata for the record.
    pub metadata: RecordMetadata,
    trace: Option<Vec<String>>,
}

impl LogioRecord {
    /// Construct a new log record from logger `name`, `level`, and `message`.
    pub fn new(logger: &str, level: LogioLevel, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata: RecordMetadata::default(),
            trace: None,
        }
    }

    /// Attach pre-rendered trace lines.
    ///
    /// Continuation lines conventionally begin with a tab; the appender
    /// replaces that tab with its configured indent before sending.
    pub fn with_trace_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trace = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Attach `err` and its chain of sources as trace lines.
    ///
    /// The first line is the error itself; each source follows on its own
    /// tab-prefixed `caused by:` line.
    pub fn with_error(self, err: &(dyn Error + 'static)) -> Self {
        let mut lines = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            lines.push(format!("\tcaused by: {cause}"));
            source = cause.source();
        }
        self.with_trace_lines(lines)
    }

    /// Record the call site of the logging statement.
    pub fn with_location(mut self, module_path: &str, filename: &str, line_number: u32) -> Self {
        self.metadata.location = Some(CallSite {
            module_path: module_path.to_owned(),
            filename: filename.to_owned(),
            line_number,
        });
        self
    }

    /// Trace lines attached to the record, if any.
    pub fn trace_lines(&self) -> Option<&[String]> {
        self.trace.as_deref()
    }

    pub fn location(&self) -> Option<&CallSite> {
        self.metadata.location.as_ref()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.metadata.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: &str, value: &str) {
        self.metadata
            .properties
            .insert(key.to_owned(), value.to_owned());
    }
}

impl fmt::Display for LogioRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("request failed")]
    struct RequestError {
        #[source]
        source: io::Error,
    }

    #[test]
    fn error_chain_becomes_tabbed_trace_lines() {
        let err = RequestError {
            source: io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"),
        };
        let record = LogioRecord::new("app", LogioLevel::Error, "boom").with_error(&err);
        assert_eq!(
            record.trace_lines(),
            Some(&["request failed".to_string(), "\tcaused by: peer reset".to_string()][..])
        );
    }

    #[test]
    fn records_without_trace_report_none() {
        let record = LogioRecord::new("app", LogioLevel::Info, "hello");
        assert!(record.trace_lines().is_none());
        assert_eq!(record.to_string(), "INFO - hello");
    }

    #[test]
    fn properties_are_mutable() {
        let mut record = LogioRecord::new("app", LogioLevel::Info, "hello");
        record.set_property("application", "billing");
        assert_eq!(record.property("application"), Some("billing"));
        assert_eq!(record.property("missing"), None);
    }

    #[test]
    fn location_is_optional() {
        let record = LogioRecord::new("app", LogioLevel::Info, "hello")
            .with_location("app::billing", "billing.rs", 42);
        let site = record.location().expect("location recorded");
        assert_eq!(site.line_number, 42);
        assert_eq!(site.filename, "billing.rs");
    }
}
