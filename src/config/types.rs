//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default path of the BIRD control socket.
pub const DEFAULT_SOCKET_PATH: &str = "/run/bird/bird.ctl";

/// Default capacity of a single socket read, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default cap on an unconfirmed drain (16 MiB).
pub const DEFAULT_MAX_REPLY_SIZE: usize = 16 * 1024 * 1024;

/// Connection settings for a BIRD control socket session.
///
/// Evaluated once when a session is built. All fields have defaults, so a
/// TOML file only needs to name the values it changes:
///
/// ```toml
/// socket_path = "/var/run/bird.ctl"
/// read_timeout_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Path of the daemon's Unix domain socket.
    pub socket_path: PathBuf,
    /// Maximum number of bytes requested per read.
    pub buffer_size: usize,
    /// Total wait allowed for one reply, in milliseconds. `None` waits
    /// until the reply completes.
    pub read_timeout_ms: Option<u64>,
    /// Largest reply accepted by an unconfirmed drain.
    pub max_reply_size: usize,
}

impl SocketConfig {
    /// Default settings for the given socket path.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(socket_path: P) -> Self {
        Self {
            socket_path: socket_path.into(),
            ..Self::default()
        }
    }

    /// Sets the per-read chunk capacity.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Sets the read deadline applied to each reply.
    ///
    /// The deadline is kept in whole milliseconds, rounded up, so a
    /// sub-millisecond timeout still waits 1 ms rather than none.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.read_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    /// Sets the unconfirmed drain size cap.
    #[must_use]
    pub fn with_max_reply_size(mut self, max_reply_size: usize) -> Self {
        self.max_reply_size = max_reply_size;
        self
    }

    /// Read deadline as a [`Duration`], if one is configured.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    /// Check the values that would make a session misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `buffer_size` is zero or
    /// `max_reply_size` is smaller than `buffer_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.max_reply_size < self.buffer_size {
            return Err(ConfigError::Invalid(format!(
                "max_reply_size ({}) must be at least buffer_size ({})",
                self.max_reply_size, self.buffer_size
            )));
        }
        Ok(())
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            buffer_size: DEFAULT_BUFFER_SIZE,
            read_timeout_ms: None,
            max_reply_size: DEFAULT_MAX_REPLY_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_socket_config() {
        let config = SocketConfig::default();
        assert_eq!(config.socket_path, PathBuf::from("/run/bird/bird.ctl"));
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.read_timeout(), None);
        assert_eq!(config.max_reply_size, 16 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_keeps_defaults() {
        let config = SocketConfig::new("/tmp/bird.ctl");
        assert_eq!(config.socket_path, PathBuf::from("/tmp/bird.ctl"));
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_with_setters() {
        let config = SocketConfig::new("/tmp/bird.ctl")
            .with_buffer_size(512)
            .with_read_timeout(Duration::from_millis(1500))
            .with_max_reply_size(1024);
        assert_eq!(config.buffer_size, 512);
        assert_eq!(config.read_timeout_ms, Some(1500));
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.max_reply_size, 1024);
    }

    #[test]
    fn test_read_timeout_rounds_up_to_whole_millis() {
        let config = SocketConfig::default().with_read_timeout(Duration::from_micros(900));
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(1)));

        let config = SocketConfig::default().with_read_timeout(Duration::from_micros(1500));
        assert_eq!(config.read_timeout_ms, Some(2));

        let config = SocketConfig::default().with_read_timeout(Duration::ZERO);
        assert_eq!(config.read_timeout_ms, Some(0));
    }

    #[test]
    fn test_zero_buffer_size_is_invalid() {
        let err = SocketConfig::default()
            .with_buffer_size(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn test_reply_cap_below_buffer_is_invalid() {
        let err = SocketConfig::default()
            .with_buffer_size(4096)
            .with_max_reply_size(100)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: SocketConfig = toml::from_str(
            r#"
            socket_path = "/var/run/bird.ctl"
            read_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/var/run/bird.ctl"));
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }
}
