//! Minimal dispatcher feeding records to registered handlers.
//!
//! [`LogioLogger`] owns a level threshold and a list of
//! [`LogioHandler`]s. Records at or above the threshold are cloned to every
//! handler on the calling thread; the handlers decide what blocking, if any,
//! that involves.

mod convenience_methods;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use parking_lot::RwLock;

use crate::{handler::LogioHandler, level::LogioLevel, log_record::LogioRecord};

pub struct LogioLogger {
    name: String,
    level: RwLock<LogioLevel>,
    handlers: RwLock<Vec<Arc<dyn LogioHandler>>>,
    shut_down: AtomicBool,
}

impl LogioLogger {
    /// Create a logger passing records at `INFO` and above.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: RwLock::new(LogioLevel::default()),
            handlers: RwLock::new(Vec::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn with_level(self, level: LogioLevel) -> Self {
        *self.level.write() = level;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogioLevel {
        *self.level.read()
    }

    pub fn set_level(&self, level: LogioLevel) {
        *self.level.write() = level;
    }

    pub fn is_enabled_for(&self, level: LogioLevel) -> bool {
        !self.shut_down.load(Ordering::Acquire) && level >= self.level()
    }

    /// Configure `handler` and start dispatching to it.
    pub fn add_handler(&self, handler: Arc<dyn LogioHandler>) {
        handler.configure();
        self.handlers.write().push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Dispatch `message` at `level`. Returns whether it passed the threshold.
    pub fn log(&self, level: LogioLevel, message: &str) -> bool {
        self.dispatch(LogioRecord::new(&self.name, level, message))
    }

    /// Dispatch a prepared record. Returns whether it passed the threshold.
    pub fn dispatch(&self, record: LogioRecord) -> bool {
        if !self.is_enabled_for(record.level) {
            return false;
        }
        let handlers = self.handlers.read();
        if let Some((last, rest)) = handlers.split_last() {
            for handler in rest {
                handler.handle(record.clone());
            }
            last.handle(record);
        }
        true
    }

    /// Shut down every handler. Later calls and later records are ignored.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        let handlers = std::mem::take(&mut *self.handlers.write());
        debug!("LogioLogger {}: shutting down {} handlers", self.name, handlers.len());
        for handler in handlers {
            handler.shutdown();
        }
    }
}

impl Drop for LogioLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for LogioLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogioLogger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("handlers", &self.handler_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_utils::CollectingHandler;

    fn logger_with_collector(level: LogioLevel) -> (LogioLogger, CollectingHandler) {
        let collector = CollectingHandler::new();
        let logger = LogioLogger::new("core").with_level(level);
        logger.add_handler(Arc::new(collector.clone()));
        (logger, collector)
    }

    #[rstest]
    fn add_handler_configures_it() {
        let (_logger, collector) = logger_with_collector(LogioLevel::Info);
        assert_eq!(collector.configured(), 1);
    }

    #[rstest]
    #[case(LogioLevel::Debug, false)]
    #[case(LogioLevel::Info, true)]
    #[case(LogioLevel::Critical, true)]
    fn threshold_filters_records(#[case] level: LogioLevel, #[case] passes: bool) {
        let (logger, collector) = logger_with_collector(LogioLevel::Info);
        assert_eq!(logger.log(level, "msg"), passes);
        assert_eq!(collector.collected().len(), usize::from(passes));
    }

    #[rstest]
    fn records_reach_every_handler() {
        let (logger, first) = logger_with_collector(LogioLevel::Trace);
        let second = CollectingHandler::new();
        logger.add_handler(Arc::new(second.clone()));
        logger.log(LogioLevel::Warn, "careful");
        assert_eq!(first.collected()[0].message, "careful");
        assert_eq!(second.collected()[0].logger, "core");
    }

    #[rstest]
    fn shutdown_is_idempotent_and_stops_dispatch() {
        let (logger, collector) = logger_with_collector(LogioLevel::Info);
        logger.shutdown();
        logger.shutdown();
        assert_eq!(collector.shutdowns(), 1);
        assert!(!logger.log(LogioLevel::Error, "late"));
        assert!(collector.collected().is_empty());
        assert_eq!(logger.handler_count(), 0);
    }

    #[rstest]
    fn set_level_changes_threshold() {
        let (logger, _collector) = logger_with_collector(LogioLevel::Info);
        logger.set_level(LogioLevel::Error);
        assert!(!logger.is_enabled_for(LogioLevel::Warn));
        assert!(logger.is_enabled_for(LogioLevel::Error));
    }
}
