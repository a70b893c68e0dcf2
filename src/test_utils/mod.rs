//! Test doubles shared by unit and integration tests.
//!
//! Enabled for `cfg(test)` and by the `test-util` feature so the integration
//! tests under `tests/` can reuse them.

mod collaborators;
mod collecting_handler;
mod line_server;
mod streams;

use std::{
    thread,
    time::{Duration, Instant},
};

pub use collaborators::{Notification, RecordingAdvertiser, RecordingSink, StaticResolver};
pub use collecting_handler::CollectingHandler;
pub use line_server::LineServer;
pub use streams::{ConnectOutcome, FailingStream, RecordingStream, ScriptedConnector};

/// Poll `condition` every few milliseconds until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
}
