//! MD2 header structure

use binrw::BinRead;

/// MD2 signature
pub const MD2_MAGIC: [u8; 4] = *b"IDP2";
/// Supported MD2 version
pub const MD2_VERSION: i32 = 8;
/// Size of the fixed MD2 header
pub const MD2_HEADER_SIZE: usize = 68;

/// MD2 header (68 bytes, little-endian)
///
/// Unlike MDL, every section is located through an explicit offset.
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct Md2Header {
    /// Signature, `IDP2`
    pub magic: [u8; 4],
    /// Format version, 8
    pub version: i32,
    /// Skin width in pixels
    pub skin_width: i32,
    /// Skin height in pixels
    pub skin_height: i32,
    /// Size of one frame in bytes
    pub frame_size: i32,
    /// Number of skin paths
    pub num_skins: i32,
    /// Vertices per frame
    pub num_vertices: i32,
    /// Texture coordinates
    pub num_st: i32,
    /// Triangles
    pub num_triangles: i32,
    /// OpenGL command words
    pub num_gl_commands: i32,
    /// Frames
    pub num_frames: i32,
    /// Offset of the skin path table
    pub offset_skins: i32,
    /// Offset of the texture coordinates
    pub offset_st: i32,
    /// Offset of the triangles
    pub offset_triangles: i32,
    /// Offset of the frames
    pub offset_frames: i32,
    /// Offset of the OpenGL commands
    pub offset_gl_commands: i32,
    /// File size
    pub offset_end: i32,
}
