//! Public appender type exported by the crate.

use std::{fmt, io, net::SocketAddr, sync::Arc};

use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::{
    error_sink::{ErrorCode, ErrorSink},
    handler::LogioHandler,
    layout::SharedLayout,
    log_record::LogioRecord,
    presence::{AddressResolver, DEFAULT_ZONE, PresenceAdvertiser},
};

use super::{
    config::AppenderConfig,
    protocol::{encode_deregister, encode_log_entry, encode_register},
    reconnector,
    state::{AppenderState, ConnectionState},
    transport::{Session, StreamConnector, TransportOptions},
};

/// Collaborators an appender delegates to.
pub(crate) struct Collaborators {
    pub layout: SharedLayout,
    pub error_sink: Arc<dyn ErrorSink>,
    pub advertiser: Option<Arc<dyn PresenceAdvertiser>>,
    pub resolver: Arc<dyn AddressResolver>,
    pub connector: Arc<dyn StreamConnector>,
}

/// Error-sink notification deferred until the state lock is released.
struct PendingReport {
    message: String,
    error: Option<io::Error>,
    code: ErrorCode,
}

/// State shared between the appender and its reconnector thread.
pub(crate) struct AppenderShared {
    config: AppenderConfig,
    transport: TransportOptions,
    collaborators: Collaborators,
    state: Mutex<ConnectionState>,
}

impl AppenderShared {
    pub(super) fn config(&self) -> &AppenderConfig {
        &self.config
    }

    pub(super) fn connector(&self) -> &dyn StreamConnector {
        self.collaborators.connector.as_ref()
    }

    pub(super) fn transport(&self) -> &TransportOptions {
        &self.transport
    }

    fn register(&self, session: &mut Session) -> io::Result<()> {
        session.send(&encode_register(&self.config.node, &[&self.config.stream]))
    }

    /// Install a session opened by the reconnector started as `generation`.
    ///
    /// Returns `true` when the reconnector is done, either because the
    /// session was installed or because it is no longer wanted.
    pub(super) fn complete_reconnect(&self, generation: u64, mut session: Session) -> bool {
        let mut state = self.state.lock();
        if state.is_closed() || !state.owns_reconnector(generation) {
            drop(state);
            debug!("LogioAppender: reconnector superseded; discarding new session.");
            session.close();
            return true;
        }
        match self.register(&mut session) {
            Ok(()) => {
                state.install_session(session);
                state.clear_reconnector(generation);
                debug!("LogioAppender: connection established. Exiting reconnector thread.");
                true
            }
            Err(err) => {
                debug!(
                    "LogioAppender: could not register with {}: {err}",
                    session.peer()
                );
                session.abandon();
                false
            }
        }
    }

    /// Apply the failure policy to an I/O error seen under the state lock.
    fn handle_io_error(
        self: &Arc<Self>,
        state: &mut ConnectionState,
        err: io::Error,
        message: &str,
    ) -> Option<PendingReport> {
        if self.config.retries() {
            warn!("{message} We will try again later. ({err})");
            self.fire_reconnector(state);
            None
        } else {
            let message = format!("{message} We are not retrying.");
            warn!("{message} ({err})");
            Some(PendingReport {
                message,
                error: Some(err),
                code: ErrorCode::GenericFailure,
            })
        }
    }

    fn fire_reconnector(self: &Arc<Self>, state: &mut ConnectionState) {
        let Some(peer) = state.address() else {
            return;
        };
        match state.start_reconnector(|generation| {
            reconnector::spawn(Arc::clone(self), peer, generation)
        }) {
            Ok(true) => debug!("LogioAppender: starting a new reconnector thread."),
            Ok(false) => {}
            Err(err) => error!("LogioAppender: could not start reconnector thread: {err}"),
        }
    }

    fn report(&self, pending: Option<PendingReport>) {
        if let Some(report) = pending {
            self.collaborators.error_sink.notify(
                &report.message,
                report.error.as_ref(),
                report.code,
            );
        }
    }

    fn resolve_address(&self) -> Option<SocketAddr> {
        let endpoint = &self.config.endpoint;
        let ip = match (endpoint.address, endpoint.remote_host.as_deref()) {
            (Some(ip), _) => Some(ip),
            (None, Some(host)) => {
                let resolved = self.collaborators.resolver.resolve(host);
                if resolved.is_none() {
                    error!("Could not find address of [{host}].");
                }
                resolved
            }
            (None, None) => None,
        };
        ip.map(|ip| SocketAddr::new(ip, endpoint.port))
    }

    fn activate(self: &Arc<Self>) {
        let address = self.resolve_address();
        let advertise = {
            let mut state = self.state.lock();
            if state.is_closed() {
                debug!("LogioAppender \"{}\": activate after close ignored.", self.config.name);
                return;
            }
            state.set_address(address);
            self.config.advertise && state.mark_advertised()
        };
        if advertise && let Some(advertiser) = &self.collaborators.advertiser {
            advertiser.advertise(DEFAULT_ZONE, self.config.endpoint.port, &self.config.name);
        }
        self.connect();
    }

    fn connect(self: &Arc<Self>) {
        let (peer, stale) = {
            let mut state = self.state.lock();
            if state.is_closed() {
                return;
            }
            let Some(peer) = state.address() else {
                return;
            };
            state.cancel_reconnector();
            (peer, state.discard_session())
        };
        if let Some(stale) = stale {
            stale.close();
        }

        let opened = Session::open(peer, self.connector(), &self.transport);
        let mut state = self.state.lock();
        if state.is_closed() {
            drop(state);
            if let Ok(session) = opened {
                session.close();
            }
            return;
        }
        let message = format!("Could not connect to remote log.io server at [{peer}].");
        let pending = match opened {
            Ok(mut session) => match self.register(&mut session) {
                Ok(()) => {
                    state.cancel_reconnector();
                    state.install_session(session);
                    None
                }
                Err(err) => {
                    session.abandon();
                    self.handle_io_error(&mut state, err, &message)
                }
            },
            Err(err) => self.handle_io_error(&mut state, err, &message),
        };
        drop(state);
        self.report(pending);
    }

    /// Render a record into its primary entry followed by trace entries.
    fn render(&self, record: &LogioRecord) -> Vec<String> {
        let layout = &self.collaborators.layout;
        let node = &self.config.node;
        let stream = &self.config.stream;
        let severity = record.level.wire_name();
        let mut messages = vec![encode_log_entry(
            node,
            stream,
            severity,
            &layout.format(record),
        )];
        if layout.ignores_throwable()
            && let Some(lines) = record.trace_lines()
        {
            let separator = layout.line_separator();
            messages.extend(lines.iter().map(|line| {
                let text = match line.strip_prefix('\t') {
                    Some(rest) => format!("{}{rest}{separator}", self.config.indent),
                    None => format!("{line}{separator}"),
                };
                encode_log_entry(node, stream, severity, &text)
            }));
        }
        messages
    }

    fn append(self: &Arc<Self>, mut record: LogioRecord) {
        {
            let state = self.state.lock();
            if state.is_closed() {
                return;
            }
            if state.address().is_none() {
                drop(state);
                self.report(Some(PendingReport {
                    message: format!(
                        "No remote host is set for LogioAppender named \"{}\".",
                        self.config.name
                    ),
                    error: None,
                    code: ErrorCode::AddressMissing,
                }));
                return;
            }
            if !state.has_session() {
                return;
            }
        }

        if let Some(application) = &self.config.application {
            record.set_property("application", application);
        }
        let messages = self.render(&record);

        let mut state = self.state.lock();
        let Some(session) = state.session_mut() else {
            return;
        };
        let pending = match messages.iter().try_for_each(|message| session.send(message)) {
            Ok(()) => None,
            Err(err) => {
                if let Some(broken) = state.discard_session() {
                    broken.abandon();
                }
                self.handle_io_error(&mut state, err, "Could not log message.")
            }
        };
        drop(state);
        self.report(pending);
    }

    fn close(&self) {
        let Some(parts) = self.state.lock().shut_down() else {
            return;
        };
        if parts.advertised && let Some(advertiser) = &self.collaborators.advertiser {
            advertiser.unadvertise();
        }
        if let Some(mut session) = parts.session {
            if let Err(err) = session.send(&encode_deregister(&self.config.node)) {
                warn!("LogioAppender: could not send deregistration: {err}");
            }
            session.close();
        }
        if let Some(reconnector) = parts.reconnector {
            reconnector.cancel();
        }
    }
}

/// Appender forwarding records to a log.io server over TCP.
///
/// Records are sent synchronously on the calling thread while a session is
/// live and dropped while it is not. A failed write discards the session and,
/// when a reconnection delay is configured, starts a single background
/// reconnector. Nothing is ever returned to the logging caller: failures go to
/// the `log` facade and the configured [`ErrorSink`].
pub struct LogioAppender {
    shared: Arc<AppenderShared>,
}

impl LogioAppender {
    pub(crate) fn with_parts(config: AppenderConfig, collaborators: Collaborators) -> Self {
        let transport = TransportOptions {
            encoding: config.encoding,
            connect_timeout: config.connect_timeout,
            write_timeout: config.write_timeout,
        };
        Self {
            shared: Arc::new(AppenderShared {
                config,
                transport,
                collaborators,
                state: Mutex::new(ConnectionState::default()),
            }),
        }
    }

    /// Resolve the destination, advertise if enabled, and connect.
    pub fn activate(&self) {
        self.shared.activate();
    }

    /// Replace the current session with a freshly registered one.
    ///
    /// Cancels a running reconnector first. Useful to recover an appender
    /// configured without reconnection.
    pub fn connect(&self) {
        self.shared.connect();
    }

    /// Send one record. Never blocks on reconnection and never fails.
    pub fn append(&self, record: LogioRecord) {
        self.shared.append(record);
    }

    /// Deregister, close the session and stop reconnecting. Idempotent.
    pub fn close(&self) {
        self.shared.close();
    }

    pub fn state(&self) -> AppenderState {
        self.shared.state.lock().lifecycle()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().is_closed()
    }

    /// Peer of the live session, if any.
    pub fn peer(&self) -> Option<SocketAddr> {
        let mut state = self.shared.state.lock();
        state.session_mut().map(|session| session.peer())
    }

    /// Number of reconnector threads started over the appender's lifetime.
    pub fn reconnectors_started(&self) -> u64 {
        self.shared.state.lock().reconnectors_started()
    }

    pub fn config(&self) -> &AppenderConfig {
        &self.shared.config
    }
}

impl LogioHandler for LogioAppender {
    fn configure(&self) {
        self.activate();
    }

    fn handle(&self, record: LogioRecord) {
        self.append(record);
    }

    fn shutdown(&self) {
        self.close();
    }
}

impl Drop for LogioAppender {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for LogioAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogioAppender")
            .field("name", &self.shared.config.name)
            .field("node", &self.shared.config.node)
            .field("stream", &self.shared.config.stream)
            .field("state", &self.state())
            .finish()
    }
}
