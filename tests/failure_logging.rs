//! Diagnostics emitted through the `log` facade.
//!
//! `logtest` installs a process-wide logger, so everything lives in one test.

use std::{
    io::{self, Write},
    net::{Ipv4Addr, SocketAddr, TcpListener},
    time::Duration,
};

use log::Level;
use logio_appender::{
    ErrorCode, ErrorSink, HandlerBuilderTrait, LogErrorSink, LogioAppenderBuilder, LogioLevel,
    LogioRecord,
    logio_appender::{Session, SessionStream, StreamConnector, TransportOptions},
};
use logtest::Logger;

/// Stream whose socket cannot be released.
struct StuckStream;

impl Write for StuckStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SessionStream for StuckStream {
    fn shutdown(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotConnected, "already gone"))
    }
}

struct StuckConnector;

impl StreamConnector for StuckConnector {
    fn connect(
        &self,
        _addr: SocketAddr,
        _options: &TransportOptions,
    ) -> io::Result<Box<dyn SessionStream>> {
        Ok(Box::new(StuckStream))
    }
}

fn drain(logger: &mut Logger) -> Vec<(Level, String)> {
    std::iter::from_fn(|| logger.pop())
        .map(|record| (record.level(), record.args().to_owned()))
        .collect()
}

#[test]
fn failures_are_logged() {
    let mut logger = Logger::start();

    // Error sink: first report passes, the next is held back and summarised.
    let sink = LogErrorSink::new(Duration::from_millis(50));
    sink.notify("first", None, ErrorCode::AddressMissing);
    sink.notify("second", None, ErrorCode::AddressMissing);
    std::thread::sleep(Duration::from_millis(80));
    sink.notify("third", None, ErrorCode::AddressMissing);
    let errors: Vec<_> = drain(&mut logger)
        .into_iter()
        .filter(|(level, _)| *level == Level::Error)
        .map(|(_, message)| message)
        .collect();
    assert_eq!(
        errors,
        vec![
            "first [address missing]".to_owned(),
            "third [address missing] (1 earlier reports suppressed)".to_owned(),
        ]
    );

    // Appender without retry: a warning, then the default sink's error.
    let addr = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .and_then(|listener| listener.local_addr())
        .expect("ephemeral port");
    let appender = LogioAppenderBuilder::new()
        .with_identity("testNode", "testStream")
        .with_address(addr.ip())
        .with_port(addr.port())
        .with_reconnection_delay_ms(0)
        .build_inner()
        .expect("valid appender");
    appender.activate();
    appender.append(LogioRecord::new("app", LogioLevel::Info, "lost"));
    let records = drain(&mut logger);
    let expected = format!("Could not connect to remote log.io server at [{addr}]. We are not retrying.");
    assert!(
        records
            .iter()
            .any(|(level, message)| *level == Level::Warn && message.starts_with(&expected)),
        "{records:?}"
    );
    assert!(
        records
            .iter()
            .any(|(level, message)| *level == Level::Error
                && message.starts_with(&format!("{expected} [generic failure]"))),
        "{records:?}"
    );

    // Abandoned session whose socket cannot be shut down.
    let options = TransportOptions {
        encoding: encoding_rs::UTF_8,
        connect_timeout: Duration::from_millis(100),
        write_timeout: Duration::from_millis(100),
    };
    let session =
        Session::open(addr, &StuckConnector, &options).expect("stuck connector always opens");
    session.abandon();
    let records = drain(&mut logger);
    let expected = format!("LogioAppender: could not release session to {addr}: already gone");
    assert!(
        records
            .iter()
            .any(|(level, message)| *level == Level::Debug && *message == expected),
        "{records:?}"
    );

    // Unresolvable host.
    let appender = LogioAppenderBuilder::new()
        .with_identity("testNode", "testStream")
        .with_remote_host("no-such-host.invalid")
        .build_inner()
        .expect("valid appender");
    appender.activate();
    let records = drain(&mut logger);
    assert!(
        records.iter().any(|(level, message)| *level == Level::Error
            && message == "Could not find address of [no-such-host.invalid]."),
        "{records:?}"
    );
}
