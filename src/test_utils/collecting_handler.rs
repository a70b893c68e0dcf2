//! A handler that accumulates records in memory for test assertions.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use parking_lot::Mutex;

use crate::{handler::LogioHandler, log_record::LogioRecord};

/// Handler that stores every record it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingHandler {
    records: Arc<Mutex<Vec<LogioRecord>>>,
    configured: Arc<AtomicUsize>,
    shutdowns: Arc<AtomicUsize>,
}

impl CollectingHandler {
    /// Create a new empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all records received so far.
    pub fn collected(&self) -> Vec<LogioRecord> {
        self.records.lock().clone()
    }

    pub fn configured(&self) -> usize {
        self.configured.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl LogioHandler for CollectingHandler {
    fn configure(&self) {
        self.configured.fetch_add(1, Ordering::SeqCst);
    }

    fn handle(&self, record: LogioRecord) {
        self.records.lock().push(record);
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
