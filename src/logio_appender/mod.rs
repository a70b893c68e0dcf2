//! Appender forwarding records to a log.io server.
//!
//! This module defines [`LogioAppender`], which renders each record into
//! pipe-delimited log entries and writes them to a persistent TCP session.
//! The session registers the configured node and stream when it opens and
//! deregisters when the appender closes. A failed write discards the session
//! and hands recovery to a single background reconnector.

mod appender;
mod config;
pub mod protocol;
mod reconnector;
mod state;
mod transport;


pub(crate) use appender::Collaborators;
pub use appender::LogioAppender;
pub use config::{
    AppenderConfig, DEFAULT_APPENDER_NAME, DEFAULT_CONNECT_TIMEOUT, DEFAULT_INDENT, DEFAULT_PORT,
    DEFAULT_RECONNECTION_DELAY, DEFAULT_WRITE_TIMEOUT, EndpointConfig,
};
pub use state::AppenderState;
pub use transport::{Session, SessionStream, StreamConnector, TcpConnector, TransportOptions};
