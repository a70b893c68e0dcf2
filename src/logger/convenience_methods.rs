//! Per-level convenience methods for [`LogioLogger`].
//!
//! These accept a pre-formatted message; callers format before logging.

use std::error::Error;

use crate::{level::LogioLevel, log_record::LogioRecord};

use super::LogioLogger;

impl LogioLogger {
    pub fn trace(&self, message: &str) -> bool {
        self.log(LogioLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> bool {
        self.log(LogioLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> bool {
        self.log(LogioLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> bool {
        self.log(LogioLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> bool {
        self.log(LogioLevel::Error, message)
    }

    pub fn critical(&self, message: &str) -> bool {
        self.log(LogioLevel::Critical, message)
    }

    /// Log at `ERROR` with `err` and its sources attached as trace lines.
    pub fn exception(&self, message: &str, err: &(dyn Error + 'static)) -> bool {
        if !self.is_enabled_for(LogioLevel::Error) {
            return false;
        }
        self.dispatch(LogioRecord::new(self.name(), LogioLevel::Error, message).with_error(err))
    }
}
