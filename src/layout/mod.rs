//! Layouts render a [`LogioRecord`] into the text carried by a log entry.
//!
//! A layout also declares whether it renders attached trace lines itself.
//! When it does not (the common case), the appender sends every trace line
//! as its own log entry after the primary message.

use std::{fmt, sync::Arc};

use crate::log_record::LogioRecord;

mod pattern;

pub use pattern::{DEFAULT_TIMESTAMP_FORMAT, PatternLayout};

/// Line terminator of the host platform.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Line terminator of the host platform.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Trait for rendering log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) because a single layout
/// is shared by every thread logging through an appender.
pub trait LogioLayout: Send + Sync {
    /// Render a record into the text of its primary log entry.
    fn format(&self, record: &LogioRecord) -> String;

    /// Whether trace lines attached to the record are left out of
    /// [`format`](Self::format) and must be sent separately.
    fn ignores_throwable(&self) -> bool {
        true
    }

    /// Terminator appended to each separately sent trace line.
    fn line_separator(&self) -> &str {
        LINE_SEPARATOR
    }
}

/// Shared layout trait object used by appenders.
#[derive(Clone)]
pub struct SharedLayout {
    inner: Arc<dyn LogioLayout>,
}

impl SharedLayout {
    pub fn new<L>(layout: L) -> Self
    where
        L: LogioLayout + 'static,
    {
        Self {
            inner: Arc::new(layout),
        }
    }

    pub fn format(&self, record: &LogioRecord) -> String {
        self.inner.format(record)
    }

    pub fn ignores_throwable(&self) -> bool {
        self.inner.ignores_throwable()
    }

    pub fn line_separator(&self) -> &str {
        self.inner.line_separator()
    }
}

impl Default for SharedLayout {
    fn default() -> Self {
        Self::new(SimpleLayout)
    }
}

impl fmt::Debug for SharedLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedLayout(<dyn LogioLayout>)")
    }
}

/// Renders `LEVEL - message` followed by the line separator.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimpleLayout;

impl LogioLayout for SimpleLayout {
    fn format(&self, record: &LogioRecord) -> String {
        format!("{} - {}{}", record.level, record.message, LINE_SEPARATOR)
    }
}
