//! 8-bit PCX image decoding
//!
//! Quake II stores model skins as run-length encoded, single plane, 8 bits per
//! pixel PCX files. The 768 byte palette follows the image data, introduced by
//! a `0x0C` marker byte.

use crate::model::{AssetError, AssetResult, ModelTexture};
use crate::palette::Palette;
use crate::reader::SliceReader;
use binrw::BinRead;

/// Size of the fixed PCX header
pub const PCX_HEADER_SIZE: usize = 128;

const PCX_MANUFACTURER: u8 = 0x0A;
const PALETTE_MARKER: u8 = 0x0C;
const PALETTE_TRAILER_SIZE: usize = 769;

/// PCX header (128 bytes, little-endian)
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct PcxHeader {
    /// Always `0x0A`
    pub manufacturer: u8,
    /// Format version, 5 for 256 color images
    pub version: u8,
    /// 1 for RLE
    pub encoding: u8,
    /// Bits per pixel per plane
    pub bits_per_pixel: u8,
    /// Left edge
    pub x_min: u16,
    /// Top edge
    pub y_min: u16,
    /// Right edge, inclusive
    pub x_max: u16,
    /// Bottom edge, inclusive
    pub y_max: u16,
    /// Horizontal resolution
    pub h_dpi: u16,
    /// Vertical resolution
    pub v_dpi: u16,
    /// 16 color EGA palette, unused here
    pub colormap: [u8; 48],
    /// Reserved, zero
    pub reserved: u8,
    /// Number of color planes
    pub planes: u8,
    /// Decoded bytes per scan line (even)
    pub bytes_per_line: u16,
    /// Palette interpretation
    pub palette_info: u16,
    /// Screen width
    pub h_screen: u16,
    /// Screen height
    pub v_screen: u16,
    /// Padding up to 128 bytes
    pub filler: [u8; 54],
}

impl PcxHeader {
    /// Image width in pixels
    pub fn width(&self) -> usize {
        usize::from(self.x_max.saturating_sub(self.x_min)) + 1
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        usize::from(self.y_max.saturating_sub(self.y_min)) + 1
    }

    fn validate(&self) -> AssetResult<()> {
        if self.manufacturer != PCX_MANUFACTURER {
            return Err(AssetError::invalid_data(
                0,
                format!(
                    "expected PCX manufacturer {:#04x}, found {:#04x}",
                    PCX_MANUFACTURER, self.manufacturer
                ),
            ));
        }
        if self.bits_per_pixel != 8 || self.planes != 1 {
            return Err(AssetError::invalid_data(
                3,
                format!(
                    "only 8-bit single plane PCX is supported, found {} bpp x {} planes",
                    self.bits_per_pixel, self.planes
                ),
            ));
        }
        if usize::from(self.bytes_per_line) < self.width() {
            return Err(AssetError::invalid_data(
                66,
                format!(
                    "bytes per line {} is less than width {}",
                    self.bytes_per_line,
                    self.width()
                ),
            ));
        }
        Ok(())
    }
}

/// Decode a PCX image to RGB.
///
/// The embedded palette is used when present, `fallback` otherwise.
pub fn decode_pcx(name: &str, data: &[u8], fallback: &Palette) -> AssetResult<ModelTexture> {
    let mut reader = SliceReader::new(data);
    let header: PcxHeader = reader.read_header(PCX_HEADER_SIZE)?;
    header.validate()?;

    let width = header.width();
    let height = header.height();
    let stride = usize::from(header.bytes_per_line);

    let embedded = embedded_palette(data)?;
    let palette = embedded.as_ref().unwrap_or(fallback);

    let expected = stride * height;
    // A run byte pair expands to at most 63 pixels
    let mut scanlines = Vec::with_capacity(expected.min(reader.remaining().saturating_mul(32)));
    while scanlines.len() < expected {
        let byte = reader.read_u8()?;
        if byte & 0xC0 == 0xC0 {
            let count = usize::from(byte & 0x3F);
            let value = reader.read_u8()?;
            scanlines.extend(std::iter::repeat_n(value, count));
        } else {
            scanlines.push(byte);
        }
    }

    let mut indices = Vec::with_capacity(width * height);
    for row in scanlines.chunks_exact(stride).take(height) {
        indices.extend_from_slice(&row[..width]);
    }

    Ok(ModelTexture {
        name: name.to_string(),
        width,
        height,
        rgb: palette.indexed_to_rgb(&indices),
    })
}

fn embedded_palette(data: &[u8]) -> AssetResult<Option<Palette>> {
    if data.len() < PCX_HEADER_SIZE + PALETTE_TRAILER_SIZE {
        return Ok(None);
    }
    let start = data.len() - PALETTE_TRAILER_SIZE;
    if data[start] != PALETTE_MARKER {
        return Ok(None);
    }
    Palette::parse(&data[start + 1..]).map(Some)
}
