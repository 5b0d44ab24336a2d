//! Error types shared by the palette, PCX and model parsers

use thiserror::Error;

/// Result type for asset parsing
pub type AssetResult<T> = Result<T, AssetError>;

/// Malformed asset errors
///
/// Every variant that stems from the byte stream carries the offset of the
/// offending read so a bad file can be inspected with a hex editor.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Signature at the start of a header does not match
    #[error(
        "invalid magic at offset {offset}: expected '{}', found '{}'",
        fourcc(.expected),
        fourcc(.found)
    )]
    InvalidMagic {
        /// Offset of the signature
        offset: usize,
        /// Expected signature bytes
        expected: [u8; 4],
        /// Signature bytes found in the data
        found: [u8; 4],
    },

    /// Header version field does not match the supported version
    #[error("unsupported version at offset {offset}: expected {expected}, found {found}")]
    UnsupportedVersion {
        /// Offset of the version field
        offset: usize,
        /// Supported version
        expected: i32,
        /// Version found in the data
        found: i32,
    },

    /// A read would run past the end of the supplied data
    #[error("truncated data at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        /// Offset of the attempted read
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the data
        available: usize,
    },

    /// Structurally invalid field value
    #[error("invalid data at offset {offset}: {reason}")]
    InvalidData {
        /// Offset of the field
        offset: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Palette data is not exactly `3 * size` bytes
    #[error("invalid palette size: expected {expected} bytes, found {found}")]
    InvalidPaletteSize {
        /// Required byte count
        expected: usize,
        /// Actual byte count
        found: usize,
    },

    /// An externally referenced skin could not be read
    #[error("cannot load skin '{path}': {source}")]
    MissingSkin {
        /// Skin path as stored in the model
        path: String,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Binary format error that is not a plain truncation
    #[error("binary format error: {0}")]
    Binary(binrw::Error),
}

impl AssetError {
    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(offset: usize, reason: S) -> Self {
        Self::InvalidData {
            offset,
            reason: reason.into(),
        }
    }

    /// Create a truncation error
    pub fn truncated(offset: usize, needed: usize, available: usize) -> Self {
        Self::Truncated {
            offset,
            needed,
            available,
        }
    }

    /// Map a binrw error raised while reading a fixed header of `size` bytes
    /// at `offset` out of `available` bytes.
    pub(crate) fn from_header_read(
        error: binrw::Error,
        offset: usize,
        size: usize,
        available: usize,
    ) -> Self {
        if error.is_eof() {
            Self::truncated(offset, size, available)
        } else {
            Self::Binary(error)
        }
    }

    /// Check if this error indicates the data ended early
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

fn fourcc(bytes: &[u8; 4]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() {
                char::from(b).to_string()
            } else {
                format!("\\x{b:02x}")
            }
        })
        .collect()
}
