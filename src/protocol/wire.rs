//! Wire format for message framing.
//!
//! Frames are length-prefixed: [4 bytes big-endian u32][payload]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

use crate::error::{ReplError, TransportErrorKind};

/// Maximum frame size (1 MB by default, can be overridden).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1_048_576;

/// Read a length-prefixed frame from the reader.
///
/// Returns the raw bytes of the frame payload.
/// Returns an error if the frame is too large or if reading fails.
pub async fn read_frame<R>(reader: &mut R, max_size: usize) -> Result<Vec<u8>, ReplError>
where
    R: AsyncReadExt + Unpin,
{
    // Read the 4-byte length prefix
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ReplError::transport(TransportErrorKind::ConnectionClosed));
        }
        Err(e) => return Err(ReplError::Io(e)),
    }

    let len = u32::from_be_bytes(len_buf) as usize;

    // Sanity check frame size before allocating
    if len > max_size {
        return Err(ReplError::transport(TransportErrorKind::FrameTooLarge {
            size: len,
            max: max_size,
        }));
    }

    // Read the frame payload
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;

    Ok(buf)
}

/// Write a length-prefixed frame to the writer and flush it.
///
/// No buffering state outlives this call.
pub async fn write_frame<W>(writer: &mut W, data: &[u8]) -> Result<(), ReplError>
where
    W: AsyncWriteExt + Unpin,
{
    let len = (data.len() as u32).to_be_bytes();
    writer.write_all(&len).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a length-prefixed frame with a timeout.
///
/// Returns a ConnectionTimeout error if the read takes longer than the
/// specified duration.
pub async fn read_frame_with_timeout<R>(
    reader: &mut R,
    max_size: usize,
    timeout_duration: Duration,
) -> Result<Vec<u8>, ReplError>
where
    R: AsyncReadExt + Unpin,
{
    timeout(timeout_duration, read_frame(reader, max_size))
        .await
        .map_err(|_| ReplError::transport(TransportErrorKind::ConnectionTimeout))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn frame_round_trips_through_a_buffer() {
        let payload = b"(doc map)";
        let mut buffer = Vec::new();
        write_frame(&mut buffer, payload).await.unwrap();

        // Four-byte big-endian prefix, then the payload untouched
        assert_eq!(buffer.len(), 4 + payload.len());
        assert_eq!(u32::from_be_bytes(buffer[0..4].try_into().unwrap()), 9);

        let mut cursor = Cursor::new(buffer);
        let read_back = read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await.unwrap();
        assert_eq!(read_back, payload);
    }

    #[tokio::test]
    async fn length_prefix_over_limit_is_rejected_before_reading() {
        // A prefix claiming far more than the limit, followed by almost no
        // actual payload. The reject must happen on the prefix alone.
        let mut frame = u32::MAX.to_be_bytes().to_vec();
        frame.extend_from_slice(&[0u8; 16]);
        let mut cursor = Cursor::new(frame);

        let result = read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await;
        assert!(matches!(
            result,
            Err(ReplError::Transport {
                kind: TransportErrorKind::FrameTooLarge {
                    size,
                    max: DEFAULT_MAX_FRAME_SIZE,
                }
            }) if size == u32::MAX as usize
        ));
    }

    #[tokio::test]
    async fn eof_reads_as_connection_closed() {
        let mut cursor = Cursor::new(Vec::new());
        let result = read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await;
        assert!(matches!(
            result,
            Err(ReplError::Transport {
                kind: TransportErrorKind::ConnectionClosed
            })
        ));
    }
}
