//! Sink receiving failures the appender cannot recover from on its own.
//!
//! The appender never returns errors to the code that logs through it.
//! Configuration problems and failures in non-retrying mode are reported
//! here instead.

use std::{fmt, io, sync::Arc, time::Duration};

use log::error;

use crate::rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};

/// Classification attached to each report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An I/O failure the appender will not retry.
    GenericFailure,
    /// No usable destination address is configured.
    AddressMissing,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCode::GenericFailure => "generic failure",
            ErrorCode::AddressMissing => "address missing",
        })
    }
}

/// Receiver of unrecoverable-failure notifications.
pub trait ErrorSink: Send + Sync {
    fn notify(&self, message: &str, error: Option<&io::Error>, code: ErrorCode);
}

impl<T: ErrorSink + ?Sized> ErrorSink for Arc<T> {
    fn notify(&self, message: &str, error: Option<&io::Error>, code: ErrorCode) {
        (**self).notify(message, error, code)
    }
}

/// Default sink: logs reports at error level, rate limited.
///
/// Repeated reports inside the warn interval are counted and summarised on
/// the next report that is let through.
pub struct LogErrorSink {
    warner: RateLimitedWarner,
}

impl LogErrorSink {
    pub fn new(interval: Duration) -> Self {
        Self {
            warner: RateLimitedWarner::new(interval),
        }
    }
}

impl Default for LogErrorSink {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}

impl ErrorSink for LogErrorSink {
    fn notify(&self, message: &str, err: Option<&io::Error>, code: ErrorCode) {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            let suppressed = count.saturating_sub(1);
            match (err, suppressed) {
                (Some(err), 0) => error!("{message} [{code}]: {err}"),
                (None, 0) => error!("{message} [{code}]"),
                (Some(err), n) => {
                    error!("{message} [{code}]: {err} ({n} earlier reports suppressed)")
                }
                (None, n) => error!("{message} [{code}] ({n} earlier reports suppressed)"),
            }
        });
    }
}

impl fmt::Debug for LogErrorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogErrorSink").finish_non_exhaustive()
    }
}
