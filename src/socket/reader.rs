//! Reply read loop.
//!
//! Pulls chunks from the stream into a growing buffer until the reply is
//! complete (confirmed mode) or the stream goes quiet (unconfirmed mode).

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::Instant;

use super::SocketError;
use crate::config::SocketConfig;
use crate::protocol::{last_line_start, ReplyClassifier};

/// How a read loop decides that a reply is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Stop at the first completion line.
    #[default]
    Confirmed,
    /// Ignore framing and drain until the deadline fires or the stream ends.
    Unconfirmed,
}

/// Read one reply from `reader`.
///
/// The read deadline from `config`, if any, is armed once on entry and
/// covers the whole loop. When it fires the bytes gathered so far are
/// returned as a successful result.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid ([`SocketError::Config`])
/// - An unconfirmed read has no deadline ([`SocketError::DeadlineRequired`])
/// - A read fails ([`SocketError::Read`])
/// - The stream ends before a confirmed reply completes
///   ([`SocketError::ConnectionClosed`])
/// - An unconfirmed drain outgrows `max_reply_size`
///   ([`SocketError::ReplyTooLarge`])
pub async fn read_reply<R>(
    reader: &mut R,
    mode: ReadMode,
    config: &SocketConfig,
) -> Result<Vec<u8>, SocketError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    config.validate()?;
    let timeout = config.read_timeout();
    if mode == ReadMode::Unconfirmed && timeout.is_none() {
        return Err(SocketError::DeadlineRequired);
    }

    let deadline = timeout.map(|t| Instant::now() + t);
    let classifier = ReplyClassifier::shared();
    let mut reply = Vec::new();
    let mut chunk = vec![0u8; config.buffer_size];
    // Start of the first line not yet known to be free of a completion code.
    let mut scan_from = 0;

    loop {
        let read = reader.read(&mut chunk);
        let result = match deadline {
            Some(deadline) => {
                if let Ok(result) = tokio::time::timeout_at(deadline, read).await {
                    result
                } else {
                    tracing::debug!(bytes = reply.len(), ?mode, "Read deadline elapsed");
                    break;
                }
            }
            None => read.await,
        };
        let n = result.map_err(SocketError::Read)?;

        if n == 0 {
            match mode {
                ReadMode::Confirmed => {
                    tracing::debug!(bytes = reply.len(), "Stream closed before completion code");
                    return Err(SocketError::ConnectionClosed);
                }
                ReadMode::Unconfirmed => {
                    tracing::debug!(bytes = reply.len(), "Stream closed, drain finished");
                    break;
                }
            }
        }

        if mode == ReadMode::Unconfirmed && reply.len() + n > config.max_reply_size {
            return Err(SocketError::ReplyTooLarge(config.max_reply_size));
        }

        reply.extend_from_slice(&chunk[..n]);
        tracing::trace!(chunk = n, total = reply.len(), "Read reply chunk");

        if mode == ReadMode::Confirmed {
            if classifier.is_complete(&reply[scan_from..]) {
                break;
            }
            scan_from += last_line_start(&reply[scan_from..]);
        }
    }

    Ok(reply)
}
