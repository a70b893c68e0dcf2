use crate::log_record::LogioRecord;

/// Capability interface implemented by appenders.
///
/// A dispatcher such as [`LogioLogger`](crate::LogioLogger) calls
/// [`configure`](Self::configure) once, [`handle`](Self::handle) for every
/// record that passes its threshold, and [`shutdown`](Self::shutdown) when it
/// is torn down. None of the methods report failure to the caller.
pub trait LogioHandler: Send + Sync {
    fn configure(&self);

    /// Dispatch a log record for handling.
    fn handle(&self, record: LogioRecord);

    fn shutdown(&self);
}
