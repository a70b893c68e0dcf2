//! Configuration structures consumed by the appender lifecycle.
//!
//! [`LogioAppenderBuilder`](crate::handlers::LogioAppenderBuilder) and the
//! INI loader construct these values before passing them to
//! [`LogioAppender`](super::LogioAppender) for runtime use.

use std::{net::IpAddr, time::Duration};

use encoding_rs::{Encoding, UTF_8};

/// Default port of the remote harvester.
pub const DEFAULT_PORT: u16 = 28777;
/// Default wait between reconnection attempts.
pub const DEFAULT_RECONNECTION_DELAY: Duration = Duration::from_millis(30_000);
/// Default replacement for the leading tab of trace lines.
pub const DEFAULT_INDENT: &str = "    ";
/// Default connection timeout applied when establishing sockets.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write timeout applied to socket writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);
/// Name used in diagnostics when none is configured.
pub const DEFAULT_APPENDER_NAME: &str = "logio";

/// Where the appender sends its messages.
#[derive(Clone, Debug, Default)]
pub struct EndpointConfig {
    /// Host name as configured; resolved during activation.
    pub remote_host: Option<String>,
    /// Address supplied directly, bypassing resolution.
    pub address: Option<IpAddr>,
    pub port: u16,
}

/// Runtime configuration of a [`LogioAppender`](super::LogioAppender).
#[derive(Clone, Debug)]
pub struct AppenderConfig {
    pub name: String,
    pub endpoint: EndpointConfig,
    pub node: String,
    pub stream: String,
    pub encoding: &'static Encoding,
    /// Zero disables reconnection.
    pub reconnection_delay: Duration,
    /// Accepted for compatibility; has no effect on wire output.
    pub location_info: bool,
    /// Attached to each record as the `application` property.
    pub application: Option<String>,
    pub indent: String,
    pub advertise: bool,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_APPENDER_NAME.into(),
            endpoint: EndpointConfig {
                port: DEFAULT_PORT,
                ..EndpointConfig::default()
            },
            node: String::new(),
            stream: String::new(),
            encoding: UTF_8,
            reconnection_delay: DEFAULT_RECONNECTION_DELAY,
            location_info: false,
            application: None,
            indent: DEFAULT_INDENT.into(),
            advertise: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl AppenderConfig {
    /// Whether a failed send schedules background reconnection.
    pub fn retries(&self) -> bool {
        !self.reconnection_delay.is_zero()
    }
}
