//! Package archive header and directory entry structures

use binrw::BinRead;

/// Archive signature
pub const PAK_MAGIC: [u8; 4] = *b"PACK";
/// Size of the fixed header
pub const PAK_HEADER_SIZE: usize = 12;
/// Size of one directory entry
pub const PAK_ENTRY_SIZE: usize = 64;
/// Width of the NUL padded member name
pub const PAK_NAME_SIZE: usize = 56;

/// Archive header (12 bytes, little-endian)
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct PakHeader {
    /// Signature, `PACK`
    pub magic: [u8; 4],
    /// Offset of the directory
    pub directory_offset: i32,
    /// Length of the directory in bytes
    pub directory_length: i32,
}

/// Directory entry as stored (64 bytes, little-endian)
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct PakDirectoryEntry {
    /// NUL padded member path
    pub name: [u8; PAK_NAME_SIZE],
    /// Offset of the member data
    pub offset: i32,
    /// Length of the member data
    pub length: i32,
}
