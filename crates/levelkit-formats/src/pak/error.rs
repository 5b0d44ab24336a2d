//! Error types for package archive parsing

use thiserror::Error;

/// Package archive result type
pub type PakResult<T> = Result<T, PakError>;

/// Malformed archive errors
#[derive(Debug, Error)]
pub enum PakError {
    /// Container is shorter than the fixed header
    #[error("archive too small for header: {size} bytes")]
    TruncatedHeader {
        /// Container size in bytes
        size: usize,
    },

    /// Header signature is not `PACK`
    #[error("invalid archive signature: expected 'PACK', got {0:?}")]
    InvalidSignature([u8; 4]),

    /// Directory offset or length is negative
    #[error("invalid {field} in archive header: {value}")]
    InvalidHeaderField {
        /// Header field name
        field: &'static str,
        /// Value found
        value: i32,
    },

    /// Directory length is not a whole number of entries
    #[error("directory length {0} is not a multiple of the entry size")]
    InvalidDirectoryLength(usize),

    /// Directory runs past the end of the container
    #[error("truncated directory: {offset} + {length} exceeds archive size {size}")]
    TruncatedIndex {
        /// Directory offset
        offset: usize,
        /// Directory length
        length: usize,
        /// Container size
        size: usize,
    },

    /// A member's data range lies outside the container
    #[error("member '{name}' out of bounds: {offset} + {length} exceeds archive size {size}")]
    EntryOutOfBounds {
        /// Member name
        name: String,
        /// Member offset as stored
        offset: i64,
        /// Member length as stored
        length: i64,
        /// Container size
        size: usize,
    },

    /// Binary read error
    #[error("binary format error: {0}")]
    BinRead(#[from] binrw::Error),
}

impl PakError {
    /// Check if this error was caused by missing bytes rather than bad values
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::TruncatedHeader { .. } | Self::TruncatedIndex { .. }
        )
    }
}
