//! Per-session transport over one connected socket.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::dispatch::CommandDispatcher;
use crate::error::{ReplError, ReplResult, TransportErrorKind};
use crate::protocol::{
    decode_command, encode_response, read_frame, read_frame_with_timeout, write_frame,
    ReplResponse, ResponseStatus,
};

/// Transport for one REPL session.
///
/// Owns exactly one socket for its lifetime. States are open and closed,
/// closed being terminal: any I/O failure leaves the session unusable and
/// the caller must [`close`](Self::close) it. There is no reconnection; a
/// new session requires a new connection.
pub struct ReplTransport {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    max_frame_size: usize,
    closed: bool,
}

impl ReplTransport {
    /// Wrap an established connection.
    pub fn new(stream: TcpStream, max_frame_size: usize) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            reader,
            writer,
            max_frame_size,
            closed: false,
        }
    }

    /// Connect to a waiting peer and wrap the resulting stream.
    pub async fn connect(addr: &str, max_frame_size: usize) -> ReplResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream, max_frame_size))
    }

    /// Serialize `response` and write it fully to the socket, then flush.
    ///
    /// Any I/O failure is surfaced as an environment-faltered transport
    /// error; the session must not be used again after one.
    pub async fn send(&mut self, response: &ReplResponse) -> ReplResult<()> {
        self.ensure_open()?;
        let bytes = encode_response(response)?;
        write_frame(&mut self.writer, &bytes)
            .await
            .map_err(ReplError::into_faltering)
    }

    /// Block until a complete command frame arrives, then decode it.
    ///
    /// `timeout_millis` is enforced with the tokio timer; zero means wait
    /// indefinitely. A lapsed timeout and a vanished peer are operationally
    /// equivalent: both end the session.
    pub async fn recv(&mut self, timeout_millis: u64) -> ReplResult<String> {
        self.ensure_open()?;
        let frame = if timeout_millis == 0 {
            read_frame(&mut self.reader, self.max_frame_size).await
        } else {
            read_frame_with_timeout(
                &mut self.reader,
                self.max_frame_size,
                Duration::from_millis(timeout_millis),
            )
            .await
        }
        .map_err(ReplError::into_faltering)?;

        decode_command(&frame)
    }

    /// Release the socket.
    ///
    /// Not idempotent: a second call returns `SessionClosed`. Higher-level
    /// code must close exactly once per session, on every exit path.
    pub async fn close(&mut self) -> ReplResult<()> {
        self.ensure_open()?;
        self.closed = true;
        self.writer.shutdown().await.map_err(ReplError::faltering)?;
        Ok(())
    }

    fn ensure_open(&self) -> ReplResult<()> {
        if self.closed {
            return Err(ReplError::transport(TransportErrorKind::SessionClosed));
        }
        Ok(())
    }
}

impl ReplError {
    /// Fold raw I/O failures into the environment-faltered kind. Structured
    /// transport conditions (closed, timeout, oversized) pass through as-is.
    fn into_faltering(self) -> Self {
        match self {
            ReplError::Io(e) => ReplError::faltering(e),
            other => other,
        }
    }
}

/// Serve a single REPL session.
///
/// Strictly alternating loop: `recv` a command, dispatch it on the blocking
/// pool, `send` the response. The loop ends when the peer disconnects, when
/// the dispatcher answers with a `Shutdown` status, or on the first I/O
/// failure. The socket is released on every exit path.
pub async fn handle_session(
    stream: TcpStream,
    dispatcher: Arc<dyn CommandDispatcher>,
    max_frame_size: usize,
    recv_timeout_millis: u64,
) -> ReplResult<()> {
    let session_id = Uuid::new_v4();
    let mut transport = ReplTransport::new(stream, max_frame_size);

    let result = session_loop(&mut transport, &dispatcher, session_id, recv_timeout_millis).await;

    // Guaranteed release, error paths included. A failed send may already
    // have torn the socket down, in which case shutdown reports an error we
    // only log.
    if let Err(e) = transport.close().await {
        debug!(session_id = %session_id, error = %e, "Session close reported an error");
    }

    result
}

async fn session_loop(
    transport: &mut ReplTransport,
    dispatcher: &Arc<dyn CommandDispatcher>,
    session_id: Uuid,
    recv_timeout_millis: u64,
) -> ReplResult<()> {
    loop {
        let command = match transport.recv(recv_timeout_millis).await {
            Ok(command) => command,
            Err(ReplError::Transport {
                kind: TransportErrorKind::ConnectionClosed,
            }) => {
                debug!(session_id = %session_id, "Peer disconnected");
                return Ok(());
            }
            Err(ReplError::Transport {
                kind: TransportErrorKind::ConnectionTimeout,
            }) => {
                warn!(session_id = %session_id, "Session timed out waiting for a command");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        debug!(session_id = %session_id, command = %command, "Received command");

        // Dispatch on the blocking pool; evaluation may take a while.
        let dispatcher = Arc::clone(dispatcher);
        let response = match tokio::task::spawn_blocking(move || {
            let response = dispatcher.dispatch(&command);
            (command, response)
        })
        .await
        {
            Ok((command, response)) => {
                info!(
                    session_id = %session_id,
                    command = %command,
                    status = ?response.status,
                    "Command dispatched"
                );
                response
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Dispatcher panicked");
                ReplResponse::error("dispatcher failed")
            }
        };

        let ending = response.status == ResponseStatus::Shutdown;
        transport.send(&response).await?;

        if ending {
            info!(session_id = %session_id, "Session shut down by dispatcher");
            return Ok(());
        }
    }
}
