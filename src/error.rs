//! Error handling for lyricsget
//!
//! Hierarchical error types: one enum per concern, wrapped by [`LyricsGetError`].
//! "No lyrics available" is deliberately absent from this module; providers
//! report it as [`FetchOutcome::NotFound`](crate::core::provider::FetchOutcome).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LyricsGetError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("File system error: {0}")]
    FileSystem(#[from] FileSystemError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Lyrics error: {0}")]
    Lyrics(#[from] LyricsError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LyricsGetError {
    /// True when the failure happened while negotiating with the source itself,
    /// so switching provider or retrying later is the sensible advice.
    pub fn is_upstream_protocol(&self) -> bool {
        matches!(self, LyricsGetError::Network(NetworkError::Tls { .. }))
    }
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("TLS handshake with {host} failed: {reason}")]
    Tls { host: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },
}

#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot write {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

#[derive(Error, Debug)]
pub enum LyricsError {
    #[error("Song name or artist name has zero length")]
    BadArgument,

    #[error("Provider {provider} cannot {action} while {state}")]
    InvalidState {
        provider: &'static str,
        action: &'static str,
        state: String,
    },

    #[error("Failed to parse page: {reason}")]
    ParseFailed { reason: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Selected index {index} not in viable range 0..{len}")]
    OutOfRange { index: i64, len: usize },

    #[error("No candidate has been selected yet")]
    NotSelected,

    #[error("Cannot read a candidate number from {input:?}")]
    Unparsable { input: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry does not contain provider {name}")]
    NotFound { name: String },

    #[error("Provider {name} registered twice")]
    Duplicate { name: String },
}

pub type Result<T> = std::result::Result<T, LyricsGetError>;

impl From<std::io::Error> for LyricsGetError {
    fn from(err: std::io::Error) -> Self {
        LyricsGetError::FileSystem(FileSystemError::Io(err))
    }
}

impl From<toml::de::Error> for LyricsGetError {
    fn from(err: toml::de::Error) -> Self {
        LyricsGetError::Config(ConfigError::InvalidFormat(err))
    }
}

impl From<toml::ser::Error> for LyricsGetError {
    fn from(err: toml::ser::Error) -> Self {
        LyricsGetError::Config(ConfigError::Serialize(err))
    }
}
