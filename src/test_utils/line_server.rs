//! Minimal line-oriented TCP server standing in for the remote harvester.

use std::{
    io::{self, BufRead, BufReader},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Accepts any number of connections and forwards every received line.
///
/// Lines from all connections arrive on one channel in the order they are
/// read. The listener thread lives until the process exits.
pub struct LineServer {
    addr: SocketAddr,
    lines: Receiver<String>,
    connections: Arc<AtomicUsize>,
}

impl LineServer {
    /// Listen on an ephemeral loopback port.
    pub fn start() -> io::Result<Self> {
        Self::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    /// Listen on `addr`.
    pub fn bind(addr: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;
        let (tx, lines) = unbounded();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);
        thread::Builder::new()
            .name("line-server".into())
            .spawn(move || {
                for stream in listener.incoming().flatten() {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let tx = tx.clone();
                    let _ = thread::Builder::new()
                        .name("line-server-conn".into())
                        .spawn(move || forward_lines(stream, &tx));
                }
            })?;
        Ok(Self {
            addr,
            lines,
            connections,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn next_line(&self, timeout: Duration) -> Option<String> {
        self.lines.recv_timeout(timeout).ok()
    }

    /// Collect lines until one satisfies `last` or `timeout` passes.
    pub fn lines_until(&self, timeout: Duration, last: impl Fn(&str) -> bool) -> Vec<String> {
        let deadline = Instant::now() + timeout;
        let mut collected = Vec::new();
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    let done = last(&line);
                    collected.push(line);
                    if done {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        collected
    }
}

fn forward_lines(stream: TcpStream, tx: &Sender<String>) {
    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else {
            return;
        };
        if tx.send(line).is_err() {
            return;
        }
    }
}
