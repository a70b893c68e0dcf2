//! Timestamped layout in the style of `%d [%p|%c] %m%n`.

use chrono::{DateTime, Local};

use crate::log_record::LogioRecord;

use super::{LINE_SEPARATOR, LogioLayout};

/// Default `chrono` format string for the timestamp column.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Renders `<timestamp> [<LEVEL>|<logger>] <message>` and a line separator.
///
/// The timestamp uses the local time zone. The `application` property, when
/// present, is appended to the bracketed header.
#[derive(Clone, Debug)]
pub struct PatternLayout {
    timestamp_format: String,
}

impl PatternLayout {
    pub fn new() -> Self {
        Self::with_timestamp_format(DEFAULT_TIMESTAMP_FORMAT)
    }

    pub fn with_timestamp_format(format: impl Into<String>) -> Self {
        Self {
            timestamp_format: format.into(),
        }
    }
}

impl Default for PatternLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl LogioLayout for PatternLayout {
    fn format(&self, record: &LogioRecord) -> String {
        let timestamp: DateTime<Local> = record.metadata.timestamp.into();
        let header = match record.property("application") {
            Some(app) => format!("{}|{}|{}", record.level, record.logger, app),
            None => format!("{}|{}", record.level, record.logger),
        };
        format!(
            "{} [{}] {}{}",
            timestamp.format(&self.timestamp_format),
            header,
            record.message,
            LINE_SEPARATOR
        )
    }
}
