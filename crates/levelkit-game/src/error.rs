//! Error types for game operations

use std::path::PathBuf;

use levelkit_vfs::VfsError;
use thiserror::Error;

/// Result type for game operations
pub type GameResult<T> = std::result::Result<T, GameError>;

/// Errors surfaced at the game boundary
#[derive(Debug, Error)]
pub enum GameError {
    /// A file system or parse failure while loading an asset
    #[error("{context}: {message}")]
    Asset {
        /// Operation and path that failed
        context: String,
        /// Message of the underlying error
        message: String,
    },

    /// A requested file does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Entity definition file specification is malformed
    #[error("invalid entity definition file spec: {0}")]
    InvalidSpec(String),

    /// Package, model, or definition format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Game configuration is incomplete or unreadable
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error on a real file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl GameError {
    /// Wrap any lower layer failure with the operation that hit it
    pub fn asset(context: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Asset {
            context: context.into(),
            message: error.to_string(),
        }
    }

    /// Wrap an I/O error with its path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<VfsError> for GameError {
    fn from(error: VfsError) -> Self {
        match error {
            VfsError::NotFound(path) => Self::NotFound(path),
            VfsError::UnsupportedFormat(format) => Self::UnsupportedFormat(format),
            VfsError::Io { path, source } => Self::Io { path, source },
            other @ VfsError::MalformedArchive { .. } => Self::asset("Cannot mount package", other),
        }
    }
}
