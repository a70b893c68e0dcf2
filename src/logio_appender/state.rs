//! Connection state owned by one appender.
//!
//! Every field lives behind the appender's single mutex. The send path, the
//! close path and the reconnect-completion path only change the state through
//! the transitions below.

use std::{fmt, net::SocketAddr};

use super::{reconnector::ReconnectorHandle, transport::Session};

/// Externally visible lifecycle state of an appender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppenderState {
    /// No destination address is known.
    Unconfigured,
    /// A session is live.
    Connected,
    /// No session; a reconnector is retrying in the background.
    Reconnecting,
    /// No session and nothing retrying.
    Disconnected,
    /// Terminal.
    Closed,
}

/// Resources released by [`ConnectionState::shut_down`].
pub(super) struct ShutdownParts {
    pub session: Option<Session>,
    pub reconnector: Option<ReconnectorHandle>,
    pub advertised: bool,
}

#[derive(Default)]
pub(super) struct ConnectionState {
    address: Option<SocketAddr>,
    session: Option<Session>,
    reconnector: Option<ReconnectorHandle>,
    next_generation: u64,
    reconnectors_started: u64,
    advertised: bool,
    closed: bool,
}

impl ConnectionState {
    pub fn lifecycle(&self) -> AppenderState {
        if self.closed {
            AppenderState::Closed
        } else if self.address.is_none() {
            AppenderState::Unconfigured
        } else if self.session.is_some() {
            AppenderState::Connected
        } else if self.reconnector.is_some() {
            AppenderState::Reconnecting
        } else {
            AppenderState::Disconnected
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn address(&self) -> Option<SocketAddr> {
        self.address
    }

    pub fn set_address(&mut self, address: Option<SocketAddr>) {
        self.address = address;
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn reconnectors_started(&self) -> u64 {
        self.reconnectors_started
    }

    /// Mark presence as advertised. Returns `false` if it already was.
    pub fn mark_advertised(&mut self) -> bool {
        !std::mem::replace(&mut self.advertised, true)
    }

    /// Install a freshly registered session, closing any previous one.
    pub fn install_session(&mut self, session: Session) {
        if let Some(previous) = self.session.replace(session) {
            previous.close();
        }
    }

    /// Take the current session out of the state.
    pub fn discard_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Start a reconnector unless one is already running.
    ///
    /// `spawn` receives the generation the new reconnector must present when
    /// it completes. Returns `true` only when a new reconnector was started.
    pub fn start_reconnector<F, E>(&mut self, spawn: F) -> Result<bool, E>
    where
        F: FnOnce(u64) -> Result<ReconnectorHandle, E>,
    {
        if self.closed || self.reconnector.is_some() {
            return Ok(false);
        }
        self.next_generation += 1;
        let handle = spawn(self.next_generation)?;
        self.reconnector = Some(handle);
        self.reconnectors_started += 1;
        Ok(true)
    }

    /// Whether the running reconnector is the one started as `generation`.
    pub fn owns_reconnector(&self, generation: u64) -> bool {
        self.reconnector
            .as_ref()
            .is_some_and(|handle| handle.generation() == generation)
    }

    /// Forget the reconnector started as `generation` once it has finished.
    pub fn clear_reconnector(&mut self, generation: u64) {
        if self.owns_reconnector(generation) {
            self.reconnector = None;
        }
    }

    /// Cancel whichever reconnector is running.
    pub fn cancel_reconnector(&mut self) {
        if let Some(handle) = self.reconnector.take() {
            handle.cancel();
        }
    }

    /// Enter the terminal state. Returns `None` if already closed.
    pub fn shut_down(&mut self) -> Option<ShutdownParts> {
        if self.closed {
            return None;
        }
        self.closed = true;
        Some(ShutdownParts {
            session: self.session.take(),
            reconnector: self.reconnector.take(),
            advertised: std::mem::take(&mut self.advertised),
        })
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionState")
            .field("lifecycle", &self.lifecycle())
            .field("address", &self.address)
            .field("reconnectors_started", &self.reconnectors_started)
            .finish()
    }
}
