//! Recording implementations of the appender's collaborator traits.

use std::{
    io,
    net::IpAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;

use crate::{
    error_sink::{ErrorCode, ErrorSink},
    presence::{AddressResolver, PresenceAdvertiser},
};

/// One report received by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub error_kind: Option<io::ErrorKind>,
    pub code: ErrorCode,
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.notifications.lock().len()
    }
}

impl ErrorSink for RecordingSink {
    fn notify(&self, message: &str, error: Option<&io::Error>, code: ErrorCode) {
        self.notifications.lock().push(Notification {
            message: message.to_owned(),
            error_kind: error.map(io::Error::kind),
            code,
        });
    }
}

/// Advertiser counting calls and remembering the last announcement.
#[derive(Clone, Default)]
pub struct RecordingAdvertiser {
    advertised: Arc<Mutex<Vec<(String, u16, String)>>>,
    unadvertised: Arc<AtomicUsize>,
}

impl RecordingAdvertiser {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(zone, port, name)` of every announcement.
    pub fn advertisements(&self) -> Vec<(String, u16, String)> {
        self.advertised.lock().clone()
    }

    pub fn unadvertisements(&self) -> usize {
        self.unadvertised.load(Ordering::SeqCst)
    }
}

impl PresenceAdvertiser for RecordingAdvertiser {
    fn advertise(&self, zone: &str, port: u16, name: &str) {
        self.advertised
            .lock()
            .push((zone.to_owned(), port, name.to_owned()));
    }

    fn unadvertise(&self) {
        self.unadvertised.fetch_add(1, Ordering::SeqCst);
    }
}

/// Resolver answering every lookup with a fixed result.
#[derive(Clone, Default)]
pub struct StaticResolver {
    answer: Option<IpAddr>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl StaticResolver {
    pub fn new(answer: Option<IpAddr>) -> Self {
        Self {
            answer,
            lookups: Arc::default(),
        }
    }

    /// Host names looked up so far.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }
}

impl AddressResolver for StaticResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        self.lookups.lock().push(host.to_owned());
        self.answer
    }
}
