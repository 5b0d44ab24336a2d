//! Parsers for the binary asset formats of id Software's Quake-family games
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::cast_precision_loss)] // Texel coordinates
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format names don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
//! This crate contains the read side of every binary format a level editor
//! needs to show game content: the package archive container, the shared
//! colour palette, PCX skins, and the three entity model formats.
//!
//! # Supported Formats
//!
//! - **Pak**: `PACK` archive container, a flat index of named members
//! - **Palette**: raw 256 entry RGB table used to expand indexed pixels
//! - **PCX**: 8-bit RLE images referenced as external MD2 skins
//! - **MDL**: Quake skeletal/vertex-animated models with embedded skins
//! - **MD2**: Quake II models with externally referenced skins
//! - **BSP29**: compiled brush models with embedded mip textures
//!
//! # Design Principles
//!
//! - **Bounds Checked**: every read is checked against the supplied slice;
//!   malformed input produces an error, never a panic
//! - **Zero-Copy Members**: archive members are sub-slices of the container
//! - **Fail Fast**: a malformed section aborts the whole parse
//! - **Format Agnostic Output**: all model parsers produce an [`EntityModel`]

#![warn(missing_docs)]

/// BSP29 compiled brush models
pub mod bsp;
/// Quake II MD2 models
pub mod md2;
/// Quake MDL models
pub mod mdl;
/// Format-agnostic entity model and the shared asset error type
pub mod model;
/// Package archive container (`PACK`)
///
/// The archive is a header, a flat data section and a trailing directory of
/// fixed-size entries. Parsing validates every entry against the container
/// bounds so a parsed [`pak::PakArchive`] can hand out member slices without
/// further checks.
pub mod pak;
pub mod palette;
pub mod pcx;
mod reader;

pub use model::{AssetError, AssetResult, EntityModel};
pub use palette::Palette;

/// Source of auxiliary files referenced by a model (MD2 skins).
///
/// Implemented by the virtual file system so parsers stay independent of
/// how files are located.
pub trait AssetSource {
    /// Read the complete contents of `path`.
    fn read_asset(&self, path: &str) -> std::io::Result<bytes::Bytes>;
}

/// Common interface of the entity model parsers
pub trait ModelParser {
    /// Parse the supplied bytes into an [`EntityModel`]
    fn parse_model(&self) -> AssetResult<EntityModel>;
}
