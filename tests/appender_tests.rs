//! End-to-end behaviour of the appender against a real TCP listener.

use std::{
    net::{Ipv4Addr, SocketAddr, TcpListener},
    sync::Arc,
    time::Duration,
};

use logio_appender::{
    AppenderState, ErrorCode, HandlerBuilderTrait, LogioAppender, LogioAppenderBuilder,
    LogioLevel, LogioRecord,
    test_utils::{LineServer, RecordingSink, wait_until},
};
use rstest::rstest;

const WAIT: Duration = Duration::from_secs(5);

fn builder_for(addr: SocketAddr) -> LogioAppenderBuilder {
    LogioAppenderBuilder::new()
        .with_identity("testNode", "testStream")
        .with_address(addr.ip())
        .with_port(addr.port())
}

fn appender_for(addr: SocketAddr, reconnection_delay_ms: u64) -> LogioAppender {
    builder_for(addr)
        .with_reconnection_delay_ms(reconnection_delay_ms)
        .build_inner()
        .expect("valid appender")
}

/// Address nobody is listening on, at least for the moment.
fn vacant_addr() -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind ephemeral port");
    listener.local_addr().expect("listener has address")
}

#[rstest]
fn server_receives_full_session() {
    let server = LineServer::start().expect("start line server");
    let appender = appender_for(server.addr(), 30_000);
    appender.activate();
    appender.append(
        LogioRecord::new("app", LogioLevel::Error, "boom")
            .with_trace_lines(["java.lang.Exception: boom", "\tat Foo.bar(Foo.java:1)"]),
    );
    appender.append(LogioRecord::new("app", LogioLevel::Info, "one"));
    appender.append(LogioRecord::new("app", LogioLevel::Info, "two"));
    appender.close();

    let lines = server.lines_until(WAIT, |line| line.starts_with("-node"));
    assert_eq!(
        lines,
        vec![
            "+node|testNode|testStream",
            "+log|testStream|testNode|error|ERROR - boom",
            "+log|testStream|testNode|error|java.lang.Exception: boom",
            "+log|testStream|testNode|error|    at Foo.bar(Foo.java:1)",
            "+log|testStream|testNode|info|INFO - one",
            "+log|testStream|testNode|info|INFO - two",
            "-node|testNode",
        ]
    );
    assert_eq!(server.connections(), 1);
}

#[rstest]
fn remote_host_is_resolved_on_activation() {
    let server = LineServer::start().expect("start line server");
    let appender = LogioAppenderBuilder::new()
        .with_identity("testNode", "testStream")
        .with_remote_host("localhost")
        .with_port(server.addr().port())
        .build_inner()
        .expect("valid appender");
    appender.activate();
    // `localhost` may resolve to ::1 first; only a loopback peer is required.
    if appender.state() == AppenderState::Connected {
        let peer = appender.peer().expect("connected peer");
        assert!(peer.ip().is_loopback());
        assert_eq!(peer.port(), server.addr().port());
    }
    appender.close();
}

#[rstest]
fn unreachable_server_is_tolerated() {
    let sink = RecordingSink::new();
    let appender = builder_for(vacant_addr())
        .with_reconnection_delay_ms(0)
        .with_error_sink(Arc::new(sink.clone()))
        .build_inner()
        .expect("valid appender");
    appender.activate();
    for i in 0..10 {
        appender.append(LogioRecord::new("app", LogioLevel::Info, &format!("lost {i}")));
    }
    appender.close();

    assert_eq!(appender.state(), AppenderState::Closed);
    let notifications = sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].code, ErrorCode::GenericFailure);
}

#[rstest]
fn late_server_is_registered_by_reconnector() {
    let addr = vacant_addr();
    let appender = appender_for(addr, 50);
    appender.activate();
    assert_eq!(appender.state(), AppenderState::Reconnecting);
    appender.append(LogioRecord::new("app", LogioLevel::Info, "dropped"));

    let server = LineServer::bind(addr).expect("bind late server");
    assert_eq!(
        server.next_line(WAIT).as_deref(),
        Some("+node|testNode|testStream")
    );
    assert!(wait_until(WAIT, || appender.state() == AppenderState::Connected));
    assert_eq!(appender.reconnectors_started(), 1);

    appender.append(LogioRecord::new("app", LogioLevel::Warn, "back"));
    assert_eq!(
        server.next_line(WAIT).as_deref(),
        Some("+log|testStream|testNode|warn|WARN - back")
    );
    appender.close();
    assert_eq!(server.next_line(WAIT).as_deref(), Some("-node|testNode"));
}

#[rstest]
fn explicit_connect_opens_a_fresh_session() {
    let server = LineServer::start().expect("start line server");
    let appender = appender_for(server.addr(), 0);
    appender.activate();
    appender.connect();
    assert!(wait_until(WAIT, || server.connections() == 2));
    appender.append(LogioRecord::new("app", LogioLevel::Info, "after reconnect"));
    appender.close();

    let lines = server.lines_until(WAIT, |line| line.starts_with("-node"));
    assert_eq!(
        lines
            .iter()
            .filter(|line| *line == "+node|testNode|testStream")
            .count(),
        2
    );
    assert!(lines.contains(&"+log|testStream|testNode|info|INFO - after reconnect".to_owned()));
    // Replacing a session does not deregister the node.
    assert_eq!(
        lines.iter().filter(|line| line.starts_with("-node")).count(),
        1
    );
}

#[rstest]
fn appender_without_destination_reports_missing_address() {
    let sink = RecordingSink::new();
    let appender = LogioAppenderBuilder::new()
        .with_identity("testNode", "testStream")
        .with_error_sink(Arc::new(sink.clone()))
        .build_inner()
        .expect("valid appender");
    appender.activate();
    appender.append(LogioRecord::new("app", LogioLevel::Info, "nowhere"));
    assert_eq!(appender.state(), AppenderState::Unconfigured);
    assert_eq!(sink.notifications()[0].code, ErrorCode::AddressMissing);
    assert!(appender.config().endpoint.address.is_none());
}
