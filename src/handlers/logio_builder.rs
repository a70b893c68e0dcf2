//! Builder for [`LogioAppender`](crate::logio_appender::LogioAppender).
//!
//! Exposes the destination, the publisher identity, the reconnection delay,
//! trace rendering options and the collaborators the appender delegates to.
//! Nothing connects until the built appender is activated.

use std::{fmt, net::IpAddr, sync::Arc, time::Duration};

use encoding_rs::Encoding;

use crate::{
    error_sink::{ErrorSink, LogErrorSink},
    layout::{LogioLayout, SharedLayout},
    logio_appender::{AppenderConfig, Collaborators, LogioAppender, StreamConnector, TcpConnector},
    presence::{AddressResolver, PresenceAdvertiser, SystemResolver},
};

use super::{HandlerBuildError, HandlerBuilderTrait};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(HandlerBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`LogioAppender`] instances.
#[derive(Clone, Default)]
pub struct LogioAppenderBuilder {
    name: Option<String>,
    remote_host: Option<String>,
    address: Option<IpAddr>,
    port: Option<u16>,
    node: Option<String>,
    stream: Option<String>,
    encoding: Option<String>,
    reconnection_delay_ms: Option<u64>,
    location_info: Option<bool>,
    application: Option<String>,
    indent: Option<String>,
    advertise: Option<bool>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    layout: Option<SharedLayout>,
    error_sink: Option<Arc<dyn ErrorSink>>,
    advertiser: Option<Arc<dyn PresenceAdvertiser>>,
    resolver: Option<Arc<dyn AddressResolver>>,
    connector: Option<Arc<dyn StreamConnector>>,
}

impl LogioAppenderBuilder {
    /// Create a new builder with default options and no destination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host name resolved when the appender is activated.
    pub fn with_remote_host(mut self, host: impl Into<String>) -> Self {
        self.remote_host = Some(host.into());
        self
    }

    /// Publish as `node` on `stream`.
    pub fn with_identity(mut self, node: impl Into<String>, stream: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self.stream = Some(stream.into());
        self
    }

    option_setter!(
        #[doc = "Name used in diagnostics and advertisement."]
        with_name,
        name,
        String
    );
    option_setter!(
        #[doc = "Use a pre-resolved address; takes precedence over the host."]
        with_address,
        address,
        IpAddr
    );
    option_setter!(with_port, port, u16);
    option_setter!(with_node, node, String);
    option_setter!(with_stream, stream, String);
    option_setter!(
        #[doc = "Character encoding label, e.g. `utf-8` or `windows-1252`."]
        with_encoding,
        encoding,
        String
    );
    option_setter!(
        #[doc = "Delay between reconnection attempts; zero disables retrying."]
        with_reconnection_delay_ms,
        reconnection_delay_ms,
        u64
    );
    option_setter!(with_location_info, location_info, bool);
    option_setter!(
        #[doc = "Value of the `application` property attached to each record."]
        with_application,
        application,
        String
    );
    option_setter!(
        #[doc = "Replacement for the leading tab of trace lines."]
        with_indent,
        indent,
        String
    );
    option_setter!(with_advertise, advertise, bool);
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_write_timeout_ms, write_timeout_ms, u64);

    pub fn with_layout<L: LogioLayout + 'static>(mut self, layout: L) -> Self {
        self.layout = Some(SharedLayout::new(layout));
        self
    }

    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    pub fn with_advertiser(mut self, advertiser: Arc<dyn PresenceAdvertiser>) -> Self {
        self.advertiser = Some(advertiser);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn AddressResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replace the TCP connector used to open sessions.
    pub fn with_connector(mut self, connector: Arc<dyn StreamConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        self.validate_identity()?;
        self.validate_endpoint()?;
        self.validate_timeouts()?;
        self.validate_advertise()?;
        Ok(())
    }

    fn validate_identity(&self) -> Result<(), HandlerBuildError> {
        for (field, value) in [("node", &self.node), ("stream", &self.stream)] {
            match value {
                Some(v) if !v.trim().is_empty() => {}
                _ => {
                    return Err(HandlerBuildError::InvalidConfig(format!(
                        "logio appender requires a {field}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_endpoint(&self) -> Result<(), HandlerBuildError> {
        if let Some(port) = self.port {
            ensure_positive!(port, "port")?;
        }
        if let Some(host) = &self.remote_host
            && host.trim().is_empty()
        {
            return Err(HandlerBuildError::InvalidConfig(
                "remote host must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn validate_timeouts(&self) -> Result<(), HandlerBuildError> {
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive!(timeout, "write_timeout_ms")?;
        }
        Ok(())
    }

    fn validate_advertise(&self) -> Result<(), HandlerBuildError> {
        if self.advertise == Some(true) && self.advertiser.is_none() {
            return Err(HandlerBuildError::InvalidConfig(
                "advertise requires a presence advertiser".into(),
            ));
        }
        Ok(())
    }

    /// Sessions can only write encodings that encode to themselves; UTF-16
    /// and `replacement` would silently fall back to UTF-8.
    fn resolve_encoding(&self) -> Result<Option<&'static Encoding>, HandlerBuildError> {
        let Some(label) = self.encoding.as_deref() else {
            return Ok(None);
        };
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| HandlerBuildError::InvalidConfig(format!("unknown encoding {label}")))?;
        if encoding.output_encoding() != encoding {
            return Err(HandlerBuildError::InvalidConfig(format!(
                "encoding {label} cannot be used for output"
            )));
        }
        Ok(Some(encoding))
    }

    /// Validate the options and produce the runtime configuration.
    pub fn build_config(&self) -> Result<AppenderConfig, HandlerBuildError> {
        self.validate()?;
        let mut config = AppenderConfig::default();
        if let Some(encoding) = self.resolve_encoding()? {
            config.encoding = encoding;
        }
        self.apply_optional_fields(&mut config);
        Ok(config)
    }

    fn apply_optional_fields(&self, config: &mut AppenderConfig) {
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        config.endpoint.remote_host = self.remote_host.clone();
        config.endpoint.address = self.address;
        if let Some(port) = self.port {
            config.endpoint.port = port;
        }
        if let Some(node) = &self.node {
            config.node = node.clone();
        }
        if let Some(stream) = &self.stream {
            config.stream = stream.clone();
        }
        if let Some(delay) = self.reconnection_delay_ms {
            config.reconnection_delay = Duration::from_millis(delay);
        }
        if let Some(location_info) = self.location_info {
            config.location_info = location_info;
        }
        config.application = self.application.clone();
        if let Some(indent) = &self.indent {
            config.indent = indent.clone();
        }
        if let Some(advertise) = self.advertise {
            config.advertise = advertise;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(timeout);
        }
        if let Some(timeout) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(timeout);
        }
    }

    fn collaborators(&self) -> Collaborators {
        Collaborators {
            layout: self.layout.clone().unwrap_or_default(),
            error_sink: self
                .error_sink
                .clone()
                .unwrap_or_else(|| Arc::new(LogErrorSink::default())),
            advertiser: self.advertiser.clone(),
            resolver: self
                .resolver
                .clone()
                .unwrap_or_else(|| Arc::new(SystemResolver)),
            connector: self
                .connector
                .clone()
                .unwrap_or_else(|| Arc::new(TcpConnector)),
        }
    }
}

impl HandlerBuilderTrait for LogioAppenderBuilder {
    type Handler = LogioAppender;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        let config = self.build_config()?;
        Ok(LogioAppender::with_parts(config, self.collaborators()))
    }
}

impl fmt::Debug for LogioAppenderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogioAppenderBuilder")
            .field("name", &self.name)
            .field("remote_host", &self.remote_host)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("node", &self.node)
            .field("stream", &self.stream)
            .field("encoding", &self.encoding)
            .field("reconnection_delay_ms", &self.reconnection_delay_ms)
            .field("advertise", &self.advertise)
            .finish_non_exhaustive()
    }
}
