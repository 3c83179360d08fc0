//! BIRD control socket client.
//!
//! # Example
//!
//! ```no_run
//! use birdsock::socket::BirdSocket;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut socket = BirdSocket::new("/run/bird/bird.ctl");
//! let greeting = socket.connect().await?;
//! println!("{}", String::from_utf8_lossy(&greeting));
//!
//! let reply = socket.query("show protocols").await;
//! socket.close().await;
//! print!("{}", String::from_utf8_lossy(&reply?));
//! # Ok(())
//! # }
//! ```
//!
//! For a single command, [`query`] handles the whole session.

mod error;
mod reader;
mod session;

use std::path::Path;

pub use error::SocketError;
pub use reader::{read_reply, ReadMode};
pub use session::{normalize_command, BirdSocket};

use crate::config::SocketConfig;

/// Sends one command to the daemon at `socket_path` and returns the reply.
///
/// Opens a session with default settings, consumes the greeting, runs one
/// confirmed query and closes the session whatever the outcome.
///
/// # Errors
///
/// Returns an error if connecting, writing or reading fails.
pub async fn query(socket_path: impl AsRef<Path>, command: &str) -> Result<Vec<u8>, SocketError> {
    query_with_config(SocketConfig::new(socket_path.as_ref()), command).await
}

/// Like [`query`], with caller-supplied settings.
///
/// # Errors
///
/// Returns an error if connecting, writing or reading fails.
pub async fn query_with_config(
    config: SocketConfig,
    command: &str,
) -> Result<Vec<u8>, SocketError> {
    let mut socket = BirdSocket::with_config(config);
    socket.connect().await?;

    let reply = socket.query(command).await;
    socket.close().await;
    reply
}
