//! Socket session error types.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors that can occur while talking to the daemon.
///
/// Each variant names the phase that failed. A read deadline expiring is not
/// an error; the read returns whatever arrived before it.
#[derive(thiserror::Error, Debug)]
pub enum SocketError {
    /// Dialing the control socket failed.
    #[error("Failed to connect to {path}: {source}")]
    Connect {
        /// Socket path that was dialed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The command could not be sent.
    #[error("Failed to write command: {0}")]
    Write(#[source] std::io::Error),

    /// A read failed for a reason other than the deadline.
    #[error("Failed to read reply: {0}")]
    Read(#[source] std::io::Error),

    /// The daemon closed the stream before the reply was complete.
    #[error("Connection closed by daemon")]
    ConnectionClosed,

    /// The session has no open connection.
    #[error("Session is not connected")]
    NotConnected,

    /// The command spans more than one line.
    #[error("Command must be a single line")]
    InvalidCommand,

    /// An unconfirmed read was requested without a read deadline.
    #[error("Unconfirmed reads require a read timeout")]
    DeadlineRequired,

    /// An unconfirmed drain grew past the configured cap.
    #[error("Reply exceeded {0} bytes")]
    ReplyTooLarge(usize),

    /// The session configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
