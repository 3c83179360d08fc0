//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::SocketConfig;

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".birdsock.toml";

/// Finds and reads the `birdsock` settings file.
///
/// Candidates are tried in order and the first existing one wins. Without
/// any, the defaults apply, unless the loader was pointed at one file
/// explicitly.
#[derive(Debug)]
pub struct ConfigLoader {
    candidates: Vec<PathBuf>,
    required: bool,
}

impl ConfigLoader {
    /// Looks in `./.birdsock.toml`, then `<config_dir>/birdsock/config.toml`.
    #[must_use]
    pub fn new() -> Self {
        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
            .chain(dirs::config_dir().map(|dir| dir.join("birdsock").join("config.toml")))
            .collect();
        Self {
            candidates,
            required: false,
        }
    }

    /// Reads exactly `path`, which must exist.
    #[must_use]
    pub fn from_file(path: PathBuf) -> Self {
        Self {
            candidates: vec![path],
            required: true,
        }
    }

    /// Paths that will be tried, in order.
    #[must_use]
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate present on disk.
    #[must_use]
    pub fn locate(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|path| path.exists())
    }

    /// Load the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if the file found
    /// cannot be read, parsed, or holds invalid values.
    pub fn load(&self) -> Result<SocketConfig, ConfigError> {
        match self.locate() {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using config file");
                read_config(path)
            }
            None if self.required => Err(ConfigError::ReadError {
                path: self.candidates.first().cloned().unwrap_or_default(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            }),
            None => {
                tracing::debug!(candidates = ?self.candidates, "No config file, using defaults");
                Ok(SocketConfig::default())
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_config(path: &Path) -> Result<SocketConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SocketConfig =
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
