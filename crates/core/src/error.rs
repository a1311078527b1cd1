//! Error types for bsync-core
//!
//! A single error enum shared by the core and the S3 adapter. Store access
//! errors are kept opaque, domain errors get their own variants so callers
//! can tell "nothing to do" apart from "something broke".

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for bsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The bucket listing returned no objects
    #[error("No files in bucket: {0}")]
    NoFiles(String),

    /// A path could not be inspected while walking a directory tree
    #[error("Failed to inspect path {}: {source}", .path.display())]
    PathInspection {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store returned a listing that cannot be continued
    #[error("Invalid listing: {0}")]
    Listing(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Object body is not valid UTF-8
    #[error("Object body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error (retryable)
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Whether this is the empty-bucket condition of a single-object read
    pub const fn is_no_files(&self) -> bool {
        matches!(self, Error::NoFiles(_))
    }

    /// Whether a caller could reasonably retry the operation later
    ///
    /// The core never retries by itself.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}
