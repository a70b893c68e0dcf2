//! Forward log records to a log.io harvester over a persistent TCP session.
//!
//! The crate is built around [`LogioAppender`]: it registers a node and
//! stream with the remote server, turns each [`LogioRecord`] into
//! pipe-delimited log entries, and recovers from dropped connections with a
//! single background reconnector. [`LogioLogger`] is a small dispatcher for
//! hosts without their own logging pipeline.

pub mod error_sink;
pub mod file_config;
mod handler;
pub mod handlers;
pub mod layout;
mod level;
mod log_record;
mod logger;
pub mod logio_appender;
pub mod presence;
pub mod rate_limited_warner;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use error_sink::{ErrorCode, ErrorSink, LogErrorSink};
pub use file_config::{ConfigError, load_appender_config, parse_appender_config};
pub use handler::LogioHandler;
pub use handlers::{HandlerBuildError, HandlerBuilderTrait, LogioAppenderBuilder};
pub use layout::{LINE_SEPARATOR, LogioLayout, PatternLayout, SharedLayout, SimpleLayout};
pub use level::{LogioLevel, ParseLevelError};
pub use log_record::{CallSite, LogioRecord, RecordMetadata};
pub use logger::LogioLogger;
pub use logio_appender::{AppenderConfig, AppenderState, LogioAppender};
pub use presence::{AddressResolver, PresenceAdvertiser, SystemResolver};
