//! Control socket session.
//!
//! A [`BirdSocket`] owns one connection from `connect` to `close`.

use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;

use super::{read_reply, ReadMode, SocketError};
use crate::config::SocketConfig;

/// Session with the BIRD control socket.
///
/// The stream type defaults to a Unix domain socket; any ordered, reliable
/// byte stream can be attached with [`BirdSocket::from_stream`].
///
/// Queries take `&mut self`, so one session never has two replies in
/// flight. The connection is released by [`BirdSocket::close`] or when the
/// session is dropped.
#[derive(Debug)]
pub struct BirdSocket<S = UnixStream> {
    config: SocketConfig,
    conn: Option<S>,
}

impl BirdSocket<UnixStream> {
    /// Creates an unconnected session with default settings.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(socket_path: P) -> Self {
        Self::with_config(SocketConfig::new(socket_path))
    }

    /// Creates an unconnected session with the given settings.
    #[must_use]
    pub fn with_config(config: SocketConfig) -> Self {
        Self { config, conn: None }
    }

    /// Dials the control socket and consumes the greeting banner.
    ///
    /// Returns the greeting bytes verbatim. The greeting is taken from a
    /// single read of at most `buffer_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid ([`SocketError::Config`])
    /// - The socket cannot be dialed ([`SocketError::Connect`])
    /// - The greeting read fails ([`SocketError::Read`],
    ///   [`SocketError::ConnectionClosed`])
    pub async fn connect(&mut self) -> Result<Vec<u8>, SocketError> {
        self.config.validate()?;

        let path = &self.config.socket_path;
        tracing::debug!(path = %path.display(), "Connecting to control socket");
        let stream = UnixStream::connect(path)
            .await
            .map_err(|source| SocketError::Connect {
                path: path.clone(),
                source,
            })?;
        self.conn = Some(stream);

        match self.read_greeting().await {
            Ok(greeting) => Ok(greeting),
            Err(e) => {
                self.conn = None;
                Err(e)
            }
        }
    }
}

impl<S> BirdSocket<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already-open stream. The greeting has not been read yet.
    #[must_use]
    pub fn from_stream(config: SocketConfig, stream: S) -> Self {
        Self {
            config,
            conn: Some(stream),
        }
    }

    /// Returns the session settings.
    #[must_use]
    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    /// Returns true between a successful connect and close.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Reads the greeting banner with one bounded read.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::NotConnected`] without a connection,
    /// [`SocketError::Read`] if the read fails, or
    /// [`SocketError::ConnectionClosed`] if the daemon hung up.
    pub async fn read_greeting(&mut self) -> Result<Vec<u8>, SocketError> {
        let conn = self.conn.as_mut().ok_or(SocketError::NotConnected)?;

        let mut greeting = vec![0u8; self.config.buffer_size];
        let n = conn.read(&mut greeting).await.map_err(SocketError::Read)?;
        if n == 0 {
            return Err(SocketError::ConnectionClosed);
        }
        greeting.truncate(n);

        tracing::debug!(bytes = n, "Received greeting");
        Ok(greeting)
    }

    /// Sends a command and waits for its completion line.
    ///
    /// # Errors
    ///
    /// See [`BirdSocket::query_with_mode`].
    pub async fn query(&mut self, command: &str) -> Result<Vec<u8>, SocketError> {
        self.query_with_mode(command, ReadMode::Confirmed).await
    }

    /// Sends a command and reads the reply using `mode`.
    ///
    /// Returns every byte of the reply up to and including the line that
    /// ended the read.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session is not connected ([`SocketError::NotConnected`])
    /// - The command has an embedded newline ([`SocketError::InvalidCommand`])
    /// - `mode` is unconfirmed and no read timeout is configured
    ///   ([`SocketError::DeadlineRequired`])
    /// - The command cannot be written ([`SocketError::Write`])
    /// - The reply cannot be read (see [`read_reply`])
    pub async fn query_with_mode(
        &mut self,
        command: &str,
        mode: ReadMode,
    ) -> Result<Vec<u8>, SocketError> {
        let conn = self.conn.as_mut().ok_or(SocketError::NotConnected)?;
        let line = normalize_command(command)?;
        if mode == ReadMode::Unconfirmed && self.config.read_timeout().is_none() {
            return Err(SocketError::DeadlineRequired);
        }

        tracing::debug!(command = %line.trim_end(), ?mode, "Sending command");
        conn.write_all(line.as_bytes())
            .await
            .map_err(SocketError::Write)?;
        conn.flush().await.map_err(SocketError::Write)?;

        let reply = read_reply(conn, mode, &self.config).await?;
        tracing::debug!(bytes = reply.len(), "Received reply");
        Ok(reply)
    }

    /// Releases the connection, if any. Safe to call more than once.
    pub async fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.shutdown().await {
                tracing::debug!(error = %e, "Ignoring error while closing connection");
            }
            tracing::debug!("Connection closed");
        }
    }
}

/// Frame a command as exactly one line.
///
/// Leading and trailing newlines are stripped and a single `\n` appended.
///
/// # Errors
///
/// Returns [`SocketError::InvalidCommand`] if a newline remains inside the
/// command.
pub fn normalize_command(command: &str) -> Result<String, SocketError> {
    let trimmed = command.trim_matches('\n');
    if trimmed.contains('\n') {
        return Err(SocketError::InvalidCommand);
    }
    Ok(format!("{trimmed}\n"))
}
