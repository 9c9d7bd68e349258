//! Integration tests for the REPL transport.
//!
//! These tests start a real listener and talk to it over loopback TCP,
//! writing and reading frames exactly as a remote REPL client would.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Notify;

use repl_wire::config::Settings;
use repl_wire::dispatch::CommandDispatcher;
use repl_wire::error::{ReplError, TransportErrorKind};
use repl_wire::protocol::{
    decode_response, encode_command, read_frame, write_frame, ReplResponse, ResponseStatus,
    DEFAULT_MAX_FRAME_SIZE,
};
use repl_wire::transport::{ReplListener, ReplTransport};

/// Echoes every command back; ":quit" ends the session.
struct EchoDispatcher;

impl CommandDispatcher for EchoDispatcher {
    fn dispatch(&self, command: &str) -> ReplResponse {
        if command == ":quit" {
            ReplResponse::shutdown()
        } else {
            ReplResponse::ok(command)
        }
    }
}

/// Test server instance.
struct TestServer {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl TestServer {
    async fn start() -> Self {
        let mut settings = Settings::default();
        settings.listen.addr = "127.0.0.1:0".to_string();

        let listener = ReplListener::bind(Arc::new(settings), Arc::new(EchoDispatcher))
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read bound address");

        let shutdown = Arc::new(Notify::new());
        let shutdown_for_run = Arc::clone(&shutdown);
        tokio::spawn(async move {
            let _ = listener.run(shutdown_for_run).await;
        });

        Self { addr, shutdown }
    }

    async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr)
            .await
            .expect("Failed to connect to test server")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.notify_one();
    }
}

/// Send one command frame and read back the decoded response.
async fn round_trip(stream: &mut TcpStream, command: &str) -> ReplResponse {
    let bytes = encode_command(command).expect("encode failed");
    write_frame(stream, &bytes).await.expect("write failed");

    let frame = read_frame(stream, DEFAULT_MAX_FRAME_SIZE)
        .await
        .expect("read failed");
    decode_response(&frame).expect("decode failed")
}

#[tokio::test]
async fn recv_then_send_completes() {
    let server = TestServer::start().await;
    let mut stream = server.connect().await;

    let response = round_trip(&mut stream, "(+ 1 2)").await;
    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(response.value.as_deref(), Some("(+ 1 2)"));
}

#[tokio::test]
async fn session_serves_multiple_commands_in_order() {
    let server = TestServer::start().await;
    let mut stream = server.connect().await;

    for command in ["first", "second", "third"] {
        let response = round_trip(&mut stream, command).await;
        assert_eq!(response.value.as_deref(), Some(command));
    }
}

#[tokio::test]
async fn shutdown_response_ends_the_session() {
    let server = TestServer::start().await;
    let mut stream = server.connect().await;

    let response = round_trip(&mut stream, ":quit").await;
    assert_eq!(response.status, ResponseStatus::Shutdown);

    // The server closes its end; the next read sees EOF.
    let result = read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE).await;
    assert!(matches!(
        result,
        Err(ReplError::Transport {
            kind: TransportErrorKind::ConnectionClosed
        })
    ));
}

#[tokio::test]
async fn concurrent_sessions_are_isolated() {
    let server = TestServer::start().await;
    let mut first = server.connect().await;
    let mut second = server.connect().await;

    // Interleave commands across the two sessions; each must only ever see
    // its own traffic.
    let response_b = round_trip(&mut second, "from-b").await;
    let response_a = round_trip(&mut first, "from-a").await;

    assert_eq!(response_a.value.as_deref(), Some("from-a"));
    assert_eq!(response_b.value.as_deref(), Some("from-b"));
}

#[tokio::test]
async fn use_after_close_is_rejected() {
    let server = TestServer::start().await;
    let stream = server.connect().await;

    let mut transport = ReplTransport::new(stream, DEFAULT_MAX_FRAME_SIZE);
    transport.close().await.expect("first close succeeds");

    let send_err = transport.send(&ReplResponse::ok("late")).await.unwrap_err();
    assert!(matches!(
        send_err,
        ReplError::Transport {
            kind: TransportErrorKind::SessionClosed
        }
    ));

    let recv_err = transport.recv(0).await.unwrap_err();
    assert!(matches!(
        recv_err,
        ReplError::Transport {
            kind: TransportErrorKind::SessionClosed
        }
    ));
}

#[tokio::test]
async fn double_close_errors() {
    let server = TestServer::start().await;
    let stream = server.connect().await;

    let mut transport = ReplTransport::new(stream, DEFAULT_MAX_FRAME_SIZE);
    transport.close().await.expect("first close succeeds");

    let err = transport.close().await.unwrap_err();
    assert!(matches!(
        err,
        ReplError::Transport {
            kind: TransportErrorKind::SessionClosed
        }
    ));
}

#[tokio::test]
async fn recv_timeout_is_enforced() {
    let server = TestServer::start().await;

    // Server side of a raw pair: connect a transport as if we were serving,
    // and never send anything from the peer.
    let stream = server.connect().await;
    let mut transport = ReplTransport::new(stream, DEFAULT_MAX_FRAME_SIZE);

    let started = std::time::Instant::now();
    let err = transport.recv(100).await.unwrap_err();
    assert!(matches!(
        err,
        ReplError::Transport {
            kind: TransportErrorKind::ConnectionTimeout
        }
    ));
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn io_failure_surfaces_as_faltering() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let addr = listener.local_addr().expect("no local addr");

    let mut transport = ReplTransport::connect(&addr.to_string(), DEFAULT_MAX_FRAME_SIZE)
        .await
        .expect("connect failed");
    let (peer, _) = listener.accept().await.expect("accept failed");

    // Reset the connection instead of closing it cleanly, so the next read
    // fails with a raw I/O error rather than a plain EOF.
    peer.set_linger(Some(Duration::from_secs(0)))
        .expect("set_linger failed");
    drop(peer);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = transport.recv(0).await.unwrap_err();
    assert!(
        matches!(err, ReplError::Faltering { .. }),
        "reset mid-session must surface as Faltering, got: {err:?}"
    );

    // Releasing the torn-down socket may also hit an I/O error; if it does,
    // that error gets the same fold.
    if let Err(err) = transport.close().await {
        assert!(
            matches!(err, ReplError::Faltering { .. }),
            "close I/O failure must surface as Faltering, got: {err:?}"
        );
    }
}

#[tokio::test]
async fn connect_establishes_a_usable_session() {
    let server = TestServer::start().await;

    let mut transport = ReplTransport::connect(&server.addr.to_string(), DEFAULT_MAX_FRAME_SIZE)
        .await
        .expect("connect failed");
    transport.close().await.expect("close failed");
}
