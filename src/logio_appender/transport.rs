//! Transport primitives for the appender.
//!
//! A [`Session`] owns exactly one live output channel. It is opened through a
//! [`StreamConnector`], written to one message at a time with a flush after
//! each, and consumed by [`Session::close`].

use std::{
    fmt,
    io::{self, BufWriter, Write},
    net::{Shutdown, SocketAddr, TcpStream},
    time::Duration,
};

use encoding_rs::Encoding;
use log::{debug, warn};

/// Byte stream a session writes to.
pub trait SessionStream: Write + Send {
    /// Release the underlying socket. Called once, after a final flush.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SessionStream for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Opens the byte stream underlying a new session.
pub trait StreamConnector: Send + Sync {
    fn connect(
        &self,
        addr: SocketAddr,
        options: &TransportOptions,
    ) -> io::Result<Box<dyn SessionStream>>;
}

/// Plain TCP connector.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector;

impl StreamConnector for TcpConnector {
    fn connect(
        &self,
        addr: SocketAddr,
        options: &TransportOptions,
    ) -> io::Result<Box<dyn SessionStream>> {
        let stream = TcpStream::connect_timeout(&addr, options.connect_timeout)?;
        stream.set_nonblocking(false)?;
        stream.set_write_timeout(Some(options.write_timeout))?;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}

/// Settings applied to every session.
#[derive(Clone, Copy, Debug)]
pub struct TransportOptions {
    pub encoding: &'static Encoding,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
}

/// One live connection to the remote server.
pub struct Session {
    writer: BufWriter<Box<dyn SessionStream>>,
    encoding: &'static Encoding,
    peer: SocketAddr,
}

impl Session {
    /// Connect to `peer`, blocking until the handshake completes or fails.
    pub fn open(
        peer: SocketAddr,
        connector: &dyn StreamConnector,
        options: &TransportOptions,
    ) -> io::Result<Self> {
        let stream = connector.connect(peer, options)?;
        Ok(Self {
            writer: BufWriter::new(stream),
            encoding: options.encoding,
            peer,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Encode, write and flush one message.
    ///
    /// Any error leaves the session unusable; the caller must discard it.
    pub fn send(&mut self, message: &str) -> io::Result<()> {
        let (bytes, _, unmappable) = self.encoding.encode(message);
        if unmappable {
            debug!(
                "LogioAppender: message contains characters not representable in {}",
                self.encoding.name()
            );
        }
        self.writer.write_all(&bytes)?;
        self.writer.flush()
    }

    /// Flush and release the connection. Failures are logged and ignored.
    pub fn close(mut self) {
        if let Err(err) = self.writer.flush() {
            warn!("LogioAppender: could not flush session to {}: {err}", self.peer);
        }
        let (mut stream, _) = self.writer.into_parts();
        if let Err(err) = stream.shutdown() {
            debug!("LogioAppender: could not close session to {}: {err}", self.peer);
        }
    }

    /// Release a session that already failed, dropping any unflushed bytes.
    pub fn abandon(self) {
        let (mut stream, _) = self.writer.into_parts();
        if let Err(err) = stream.shutdown() {
            debug!("LogioAppender: could not release session to {}: {err}", self.peer);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.peer)
            .field("encoding", &self.encoding.name())
            .finish()
    }
}
