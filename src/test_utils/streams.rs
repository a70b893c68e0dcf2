//! In-memory session streams and a connector that follows a script.

use std::{
    collections::VecDeque,
    io::{self, Write},
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;

use crate::logio_appender::{SessionStream, StreamConnector, TransportOptions};

/// Stream capturing everything written to it.
///
/// Clones share the same buffer, so a test can keep one clone while the
/// session owns another. [`break_pipe`](Self::break_pipe) makes every later
/// write fail with `BrokenPipe`.
#[derive(Clone, Default)]
pub struct RecordingStream {
    buffer: Arc<Mutex<Vec<u8>>>,
    broken: Arc<AtomicBool>,
    shut_down: Arc<AtomicBool>,
}

impl RecordingStream {
    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Written text split into lines, terminators removed.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn break_pipe(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl Write for RecordingStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe broken"));
        }
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe broken"));
        }
        Ok(())
    }
}

impl SessionStream for RecordingStream {
    fn shutdown(&mut self) -> io::Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Stream whose writes always fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingStream;

impl Write for FailingStream {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe broken"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe broken"))
    }
}

impl SessionStream for FailingStream {}

/// Result of one scripted connection attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    Accept,
    Refuse,
    /// Accept, but hand out a stream whose writes fail.
    AcceptBroken,
}

#[derive(Default)]
struct Script {
    plan: VecDeque<ConnectOutcome>,
    fallback: Option<ConnectOutcome>,
    attempts: usize,
    streams: Vec<RecordingStream>,
}

/// Connector replaying planned outcomes, then a fallback outcome.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    /// Connector accepting every attempt.
    pub fn accepting() -> Self {
        Self::with_fallback(ConnectOutcome::Accept)
    }

    /// Connector refusing every attempt.
    pub fn refusing() -> Self {
        Self::with_fallback(ConnectOutcome::Refuse)
    }

    pub fn with_fallback(outcome: ConnectOutcome) -> Self {
        let connector = Self::default();
        connector.set_fallback(outcome);
        connector
    }

    /// Outcome used once the planned outcomes run out.
    pub fn set_fallback(&self, outcome: ConnectOutcome) {
        self.script.lock().fallback = Some(outcome);
    }

    /// Queue `outcome` for the next unplanned attempt.
    pub fn then(self, outcome: ConnectOutcome) -> Self {
        self.script.lock().plan.push_back(outcome);
        self
    }

    pub fn attempts(&self) -> usize {
        self.script.lock().attempts
    }

    /// Every stream handed out so far, oldest first.
    pub fn streams(&self) -> Vec<RecordingStream> {
        self.script.lock().streams.clone()
    }

    pub fn latest(&self) -> Option<RecordingStream> {
        self.script.lock().streams.last().cloned()
    }
}

impl StreamConnector for ScriptedConnector {
    fn connect(
        &self,
        addr: SocketAddr,
        _options: &TransportOptions,
    ) -> io::Result<Box<dyn SessionStream>> {
        let mut script = self.script.lock();
        script.attempts += 1;
        let outcome = script
            .plan
            .pop_front()
            .or(script.fallback)
            .unwrap_or(ConnectOutcome::Accept);
        let stream = match outcome {
            ConnectOutcome::Refuse => {
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    format!("{addr} refused connection"),
                ));
            }
            ConnectOutcome::Accept => RecordingStream::default(),
            ConnectOutcome::AcceptBroken => {
                let stream = RecordingStream::default();
                stream.break_pipe();
                stream
            }
        };
        script.streams.push(stream.clone());
        Ok(Box::new(stream))
    }
}
