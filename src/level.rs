//! Severity levels understood by the appender.
//!
//! The remote harvester receives the lower-cased level name as the severity
//! field of each log entry, so [`LogioLevel::wire_name`] is the only spelling
//! that ever reaches the socket.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogioLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Critical,
}

/// Returned when a level name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl LogioLevel {
    /// Upper-case display name, e.g. `"WARN"`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogioLevel::Trace => "TRACE",
            LogioLevel::Debug => "DEBUG",
            LogioLevel::Info => "INFO",
            LogioLevel::Warn => "WARN",
            LogioLevel::Error => "ERROR",
            LogioLevel::Critical => "CRITICAL",
        }
    }

    /// Severity field written on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            LogioLevel::Trace => "trace",
            LogioLevel::Debug => "debug",
            LogioLevel::Info => "info",
            LogioLevel::Warn => "warn",
            LogioLevel::Error => "error",
            LogioLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for LogioLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogioLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl From<log::Level> for LogioLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Self::Trace,
            log::Level::Debug => Self::Debug,
            log::Level::Info => Self::Info,
            log::Level::Warn => Self::Warn,
            log::Level::Error => Self::Error,
        }
    }
}
