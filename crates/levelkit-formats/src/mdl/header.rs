//! MDL header structure

use binrw::BinRead;

/// MDL signature
pub const MDL_MAGIC: [u8; 4] = *b"IDPO";
/// Supported MDL version
pub const MDL_VERSION: i32 = 6;
/// Size of the fixed MDL header
pub const MDL_HEADER_SIZE: usize = 84;

/// MDL header (84 bytes, little-endian)
#[derive(Debug, Clone, PartialEq, BinRead)]
#[br(little)]
pub struct MdlHeader {
    /// Signature, `IDPO`
    pub magic: [u8; 4],
    /// Format version, 6
    pub version: i32,
    /// Scale applied to packed vertex coordinates
    pub scale: [f32; 3],
    /// Origin added after scaling
    pub translate: [f32; 3],
    /// Radius of the bounding sphere
    pub bounding_radius: f32,
    /// Eye position
    pub eye_position: [f32; 3],
    /// Number of skins or skin groups
    pub num_skins: i32,
    /// Skin width in pixels
    pub skin_width: i32,
    /// Skin height in pixels
    pub skin_height: i32,
    /// Vertices per frame
    pub num_vertices: i32,
    /// Triangles
    pub num_triangles: i32,
    /// Frames or frame groups
    pub num_frames: i32,
    /// Animation sync type
    pub sync_type: i32,
    /// Model effect flags
    pub flags: i32,
    /// Average triangle size
    pub size: f32,
}
