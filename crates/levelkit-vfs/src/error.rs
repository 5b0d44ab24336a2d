//! Error types for virtual file system operations

use std::path::PathBuf;

use levelkit_formats::pak::PakError;
use thiserror::Error;

/// Result type for virtual file system operations
pub type VfsResult<T> = std::result::Result<T, VfsError>;

/// Virtual file system errors
#[derive(Debug, Error)]
pub enum VfsError {
    /// No mounted provider has the file or directory
    #[error("not found: {0}")]
    NotFound(String),

    /// A package archive could not be indexed
    #[error("malformed archive '{name}': {source}")]
    MalformedArchive {
        /// Archive file name
        name: String,
        /// Underlying container error
        #[source]
        source: PakError,
    },

    /// The configured package format is not recognized
    #[error("unsupported package format: {0}")]
    UnsupportedFormat(String),

    /// I/O error on a real file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl VfsError {
    /// Not found error for a path
    pub fn not_found(path: impl std::fmt::Display) -> Self {
        Self::NotFound(path.to_string())
    }

    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the requested entry does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<VfsError> for std::io::Error {
    fn from(error: VfsError) -> Self {
        if error.is_not_found() {
            Self::new(std::io::ErrorKind::NotFound, error)
        } else {
            Self::other(error)
        }
    }
}
