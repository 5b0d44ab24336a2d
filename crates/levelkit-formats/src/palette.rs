//! Indexed color palette
//!
//! A palette file is a raw table of RGB triples with no header. Quake's
//! `gfx/palette.lmp` holds 256 entries (768 bytes).

use crate::model::{AssetError, AssetResult};

/// Number of entries in a standard palette
pub const PALETTE_SIZE: usize = 256;

/// Immutable RGB lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

impl Palette {
    /// Parse a standard 256 entry palette
    pub fn parse(data: &[u8]) -> AssetResult<Self> {
        Self::parse_sized(data, PALETTE_SIZE)
    }

    /// Parse a palette of exactly `size` entries
    pub fn parse_sized(data: &[u8], size: usize) -> AssetResult<Self> {
        let expected = size * 3;
        if data.len() != expected {
            return Err(AssetError::InvalidPaletteSize {
                expected,
                found: data.len(),
            });
        }
        let colors = data
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(Self { colors })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True for a palette without entries
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`; indices past the table are black
    pub fn color(&self, index: u8) -> [u8; 3] {
        self.colors
            .get(usize::from(index))
            .copied()
            .unwrap_or([0, 0, 0])
    }

    /// Expand indexed pixels into tightly packed RGB
    pub fn indexed_to_rgb(&self, indices: &[u8]) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(indices.len() * 3);
        for &index in indices {
            rgb.extend_from_slice(&self.color(index));
        }
        rgb
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ramp() -> Vec<u8> {
        (0..PALETTE_SIZE)
            .flat_map(|i| [i as u8, 255 - i as u8, 7])
            .collect()
    }

    #[test]
    fn test_parse_768_bytes() {
        let palette = Palette::parse(&ramp()).unwrap();
        assert_eq!(palette.len(), 256);
        assert_eq!(palette.color(0), [0, 255, 7]);
        assert_eq!(palette.color(255), [255, 0, 7]);
    }

    #[test]
    fn test_parse_767_bytes_fails() {
        let data = ramp();
        let err = Palette::parse(&data[..767]).unwrap_err();
        assert!(matches!(
            err,
            AssetError::InvalidPaletteSize {
                expected: 768,
                found: 767
            }
        ));
    }

    #[test]
    fn test_oversized_data_fails() {
        let mut data = ramp();
        data.push(0);
        assert!(Palette::parse(&data).is_err());
    }

    #[test]
    fn test_indexed_to_rgb() {
        let palette = Palette::parse(&ramp()).unwrap();
        assert_eq!(palette.indexed_to_rgb(&[1, 2]), vec![1, 254, 7, 2, 253, 7]);
    }

    #[test]
    fn test_small_palette_out_of_range_is_black() {
        let palette = Palette::parse_sized(&[9, 9, 9], 1).unwrap();
        assert_eq!(palette.color(0), [9, 9, 9]);
        assert_eq!(palette.color(5), [0, 0, 0]);
    }
}
