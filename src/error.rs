//! Error types for runout

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Runout error types
#[derive(Error, Debug)]
pub enum Error {
    /// Directory or file creation, read, or write failure
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        /// Path the operation was acting on
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Load requested for an artifact that does not exist
    #[error("artifact not found: {path}")]
    NotFound {
        /// Path that was probed
        path: PathBuf,
    },

    /// Malformed artifact name (empty, path separators, traversal)
    #[error("invalid artifact name: {0:?}")]
    InvalidName(String),

    /// Malformed or reserved custom format tag
    #[error("invalid format tag: {0:?}")]
    InvalidFormat(String),

    /// Encode/decode failure from an array payload or a caller codec
    #[error("codec error: {0}")]
    Codec(String),
}

impl Error {
    /// Wrap an IO error with the path it occurred on.
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}
