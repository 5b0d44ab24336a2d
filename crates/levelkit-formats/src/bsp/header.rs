//! BSP29 header and lump directory

use binrw::BinRead;

/// Supported BSP version
pub const BSP_VERSION: i32 = 29;
/// Number of lumps in a BSP29 file
pub const BSP_LUMP_COUNT: usize = 15;
/// Size of the fixed BSP header
pub const BSP_HEADER_SIZE: usize = 4 + BSP_LUMP_COUNT * 8;

/// Lump indices used when building entity models
pub mod lump {
    /// Mip texture directory and pixels
    pub const TEXTURES: usize = 2;
    /// Vertex positions
    pub const VERTICES: usize = 3;
    /// Texture projection vectors
    pub const TEXINFO: usize = 6;
    /// Polygon faces
    pub const FACES: usize = 7;
    /// Vertex index pairs
    pub const EDGES: usize = 12;
    /// Signed edge references
    pub const SURFEDGES: usize = 13;
    /// Brush sub-models
    pub const MODELS: usize = 14;
}

/// Location of one lump within the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct BspLump {
    /// Lump offset
    pub offset: i32,
    /// Lump length in bytes
    pub length: i32,
}

/// BSP29 header (124 bytes, little-endian)
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct BspHeader {
    /// Format version, 29
    pub version: i32,
    /// Lump directory
    pub lumps: [BspLump; BSP_LUMP_COUNT],
}

impl BspHeader {
    /// Offset of a lump's directory entry within the header
    pub const fn lump_field_offset(index: usize) -> usize {
        4 + index * 8
    }
}
