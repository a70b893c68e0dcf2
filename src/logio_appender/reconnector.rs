//! Background thread re-establishing a dropped session.
//!
//! The thread waits one reconnection interval on its cancellation channel,
//! then tries a direct connect. It installs the first session that registers
//! successfully and exits. Cancelling, or dropping the handle, ends the loop
//! at the next wait. A connect already in flight is not interrupted.

use std::{
    io,
    net::SocketAddr,
    sync::Arc,
    thread,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::debug;

use super::{appender::AppenderShared, transport::Session};

/// Owner's side of a running reconnector.
pub(crate) struct ReconnectorHandle {
    generation: u64,
    cancel: Sender<()>,
}

impl ReconnectorHandle {
    /// Create a handle and the cancellation receiver its thread listens on.
    pub(super) fn channel(generation: u64) -> (Self, Receiver<()>) {
        let (cancel, cancelled) = bounded(1);
        (Self { generation, cancel }, cancelled)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask the thread to stop at its next wait.
    pub fn cancel(self) {
        let _ = self.cancel.try_send(());
    }
}

/// Start a reconnector thread targeting `peer`.
pub(super) fn spawn(
    shared: Arc<AppenderShared>,
    peer: SocketAddr,
    generation: u64,
) -> io::Result<ReconnectorHandle> {
    let (handle, cancelled) = ReconnectorHandle::channel(generation);
    thread::Builder::new()
        .name("logio-reconnector".into())
        .spawn(move || run(&shared, peer, generation, &cancelled))?;
    Ok(handle)
}

fn run(shared: &AppenderShared, peer: SocketAddr, generation: u64, cancelled: &Receiver<()>) {
    let delay = shared.config().reconnection_delay;
    loop {
        match cancelled.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                debug!("LogioAppender: reconnector cancelled. Leaving loop.");
                return;
            }
        }
        debug!("LogioAppender: attempting connection to {peer}");
        match Session::open(peer, shared.connector(), shared.transport()) {
            Ok(session) => {
                if shared.complete_reconnect(generation, session) {
                    return;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::ConnectionRefused => {
                debug!("LogioAppender: remote host {peer} refused connection.");
            }
            Err(err) => {
                debug!("LogioAppender: could not connect to {peer}: {err}");
            }
        }
    }
}
