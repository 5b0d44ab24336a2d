//! Quake MDL model parsing
//!
//! An MDL file is a fixed header followed by four variable sections:
//!
//! - **Skins**: single skins or timed skin groups of `width * height`
//!   palette indices
//! - **Texture coordinates**: one `(on_seam, s, t)` triple per vertex
//! - **Triangles**: front-facing flag plus three vertex indices
//! - **Frames**: single frames or timed frame groups of packed vertices
//!
//! Vertices on the seam of a back-facing triangle sample the right half of
//! the skin, so their `s` coordinate is shifted by half the skin width.

mod header;

pub use header::{MDL_HEADER_SIZE, MDL_MAGIC, MDL_VERSION, MdlHeader};

use crate::model::{
    AssetError, AssetResult, EntityModel, ModelFrame, ModelSurface, ModelTexture, ModelTriangle,
    ModelVertex, reserve_frame,
};
use crate::palette::Palette;
use crate::reader::SliceReader;
use crate::ModelParser;

const FRAME_NAME_SIZE: usize = 16;
const PACKED_VERTEX_SIZE: usize = 4;

#[derive(Debug, Clone, Copy)]
struct SkinVertex {
    on_seam: bool,
    s: i32,
    t: i32,
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    front: bool,
    vertices: [usize; 3],
}

/// Parser for Quake MDL models
#[derive(Debug)]
pub struct MdlParser<'a> {
    name: String,
    data: &'a [u8],
    palette: &'a Palette,
}

impl<'a> MdlParser<'a> {
    /// Create a parser over the complete file contents
    pub fn new(name: impl Into<String>, data: &'a [u8], palette: &'a Palette) -> Self {
        Self {
            name: name.into(),
            data,
            palette,
        }
    }

    fn read_header(&self, reader: &mut SliceReader<'_>) -> AssetResult<MdlHeader> {
        let header: MdlHeader = reader.read_header(MDL_HEADER_SIZE)?;
        if header.magic != MDL_MAGIC {
            return Err(AssetError::InvalidMagic {
                offset: 0,
                expected: MDL_MAGIC,
                found: header.magic,
            });
        }
        if header.version != MDL_VERSION {
            return Err(AssetError::UnsupportedVersion {
                offset: 4,
                expected: MDL_VERSION,
                found: header.version,
            });
        }
        if header.skin_width <= 0 || header.skin_height <= 0 {
            return Err(AssetError::invalid_data(
                52,
                format!(
                    "invalid skin size {}x{}",
                    header.skin_width, header.skin_height
                ),
            ));
        }
        Ok(header)
    }

    fn parse_skins(
        &self,
        reader: &mut SliceReader<'_>,
        count: usize,
        width: usize,
        height: usize,
    ) -> AssetResult<Vec<ModelTexture>> {
        let size = width
            .checked_mul(height)
            .ok_or_else(|| AssetError::invalid_data(reader.position(), "skin size overflows"))?;

        let mut skins = Vec::new();
        for i in 0..count {
            let group = reader.read_i32()?;
            let pictures = if group == 0 {
                1
            } else {
                let pictures = reader.read_count()?;
                // Per-picture intervals
                reader.skip(pictures.saturating_mul(4))?;
                pictures
            };
            for j in 0..pictures {
                let indices = reader.read_bytes(size)?;
                let name = if group == 0 {
                    format!("{}_{}", self.name, i)
                } else {
                    format!("{}_{}_{}", self.name, i, j)
                };
                skins.push(ModelTexture {
                    name,
                    width,
                    height,
                    rgb: self.palette.indexed_to_rgb(indices),
                });
            }
        }
        Ok(skins)
    }

    fn parse_frame(
        reader: &mut SliceReader<'_>,
        header: &MdlHeader,
        vertex_count: usize,
    ) -> AssetResult<(String, Vec<[f32; 3]>)> {
        // Packed bounding box min and max
        reader.skip(2 * PACKED_VERTEX_SIZE)?;
        let name = reader.read_name(FRAME_NAME_SIZE)?;
        let packed = reader.read_bytes(vertex_count.saturating_mul(PACKED_VERTEX_SIZE))?;
        let positions = packed
            .chunks_exact(PACKED_VERTEX_SIZE)
            .map(|v| {
                [
                    header.scale[0] * f32::from(v[0]) + header.translate[0],
                    header.scale[1] * f32::from(v[1]) + header.translate[1],
                    header.scale[2] * f32::from(v[2]) + header.translate[2],
                ]
            })
            .collect();
        Ok((name, positions))
    }
}

impl ModelParser for MdlParser<'_> {
    fn parse_model(&self) -> AssetResult<EntityModel> {
        let mut reader = SliceReader::new(self.data);
        let header = self.read_header(&mut reader)?;

        let count = |offset: usize, value: i32| {
            usize::try_from(value)
                .map_err(|_| AssetError::invalid_data(offset, format!("negative count {value}")))
        };
        let num_skins = count(48, header.num_skins)?;
        let width = count(52, header.skin_width)?;
        let height = count(56, header.skin_height)?;
        let num_vertices = count(60, header.num_vertices)?;
        let num_triangles = count(64, header.num_triangles)?;
        let num_frames = count(68, header.num_frames)?;

        let skins = self.parse_skins(&mut reader, num_skins, width, height)?;

        let mut skin_vertices = Vec::with_capacity(num_vertices.min(reader.remaining() / 12));
        for _ in 0..num_vertices {
            skin_vertices.push(SkinVertex {
                on_seam: reader.read_i32()? != 0,
                s: reader.read_i32()?,
                t: reader.read_i32()?,
            });
        }

        let mut triangles = Vec::with_capacity(num_triangles.min(reader.remaining() / 16));
        for _ in 0..num_triangles {
            let front = reader.read_i32()? != 0;
            let mut vertices = [0usize; 3];
            for slot in &mut vertices {
                let offset = reader.position();
                let index = reader.read_i32()?;
                *slot = usize::try_from(index)
                    .ok()
                    .filter(|&i| i < num_vertices)
                    .ok_or_else(|| {
                        AssetError::invalid_data(offset, format!("vertex index {index} out of range"))
                    })?;
            }
            triangles.push(Triangle { front, vertices });
        }

        let mut frames = Vec::new();
        let mut total_triangles = 0;
        for _ in 0..num_frames {
            let frame_type = reader.read_i32()?;
            let group_size = if frame_type == 0 {
                1
            } else {
                let size = reader.read_count()?;
                reader.skip(2 * PACKED_VERTEX_SIZE)?;
                reader.skip(size.saturating_mul(4))?;
                size
            };
            for _ in 0..group_size {
                reserve_frame(&mut total_triangles, triangles.len(), reader.position())?;
                let (name, positions) = Self::parse_frame(&mut reader, &header, num_vertices)?;
                frames.push(build_frame(
                    name,
                    &positions,
                    &skin_vertices,
                    &triangles,
                    width as f32,
                    height as f32,
                ));
            }
        }

        Ok(EntityModel {
            name: self.name.clone(),
            surfaces: vec![ModelSurface {
                name: self.name.clone(),
                skins,
            }],
            frames,
        })
    }
}

fn build_frame(
    name: String,
    positions: &[[f32; 3]],
    skin_vertices: &[SkinVertex],
    triangles: &[Triangle],
    width: f32,
    height: f32,
) -> ModelFrame {
    let triangles = triangles
        .iter()
        .map(|triangle| {
            let vertices = triangle.vertices.map(|index| {
                let skin = skin_vertices[index];
                let mut s = skin.s as f32;
                if skin.on_seam && !triangle.front {
                    s += width / 2.0;
                }
                ModelVertex {
                    position: positions[index],
                    uv: [(s + 0.5) / width, (skin.t as f32 + 0.5) / height],
                }
            });
            ModelTriangle {
                surface: 0,
                vertices,
            }
        })
        .collect();
    ModelFrame::new(name, triangles)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use levelkit_test_utils::{MdlBuilder, gray_palette};

    fn palette() -> Palette {
        Palette::parse(&gray_palette()).unwrap()
    }

    #[test]
    fn test_parse_single_frame_model() {
        let data = MdlBuilder::new(2, 2).build();
        let palette = palette();
        let model = MdlParser::new("test.mdl", &data, &palette)
            .parse_model()
            .unwrap();

        assert_eq!(model.name, "test.mdl");
        assert_eq!(model.skin_count(), 1);
        assert_eq!(model.frames.len(), 1);
        assert_eq!(model.frames[0].name, "frame1");
        assert_eq!(model.frames[0].triangles.len(), 1);

        let skin = &model.surfaces[0].skins[0];
        assert_eq!((skin.width, skin.height), (2, 2));
        // Builder fills the skin with indices 0, 1, 2, 3
        assert_eq!(skin.pixel(1, 1), Some([3, 3, 3]));
    }

    #[test]
    fn test_vertex_positions_are_scaled() {
        let data = MdlBuilder::new(2, 2)
            .scale([2.0, 2.0, 2.0])
            .translate([10.0, 0.0, -1.0])
            .build();
        let palette = palette();
        let model = MdlParser::new("m", &data, &palette).parse_model().unwrap();
        let v = model.frames[0].triangles[0].vertices[1];
        // Builder's second vertex is packed (1, 0, 0)
        assert_eq!(v.position, [12.0, 0.0, -1.0]);
    }

    #[test]
    fn test_seam_vertex_shifts_on_back_face() {
        let data = MdlBuilder::new(8, 8).seam_back_face().build();
        let palette = palette();
        let model = MdlParser::new("m", &data, &palette).parse_model().unwrap();
        let uv = model.frames[0].triangles[0].vertices[0].uv;
        assert!((uv[0] - (0.0 + 4.0 + 0.5) / 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_skin_and_frame_groups() {
        let data = MdlBuilder::new(2, 2).skin_group(3).frame_group(2).build();
        let palette = palette();
        let model = MdlParser::new("m", &data, &palette).parse_model().unwrap();
        assert_eq!(model.skin_count(), 3);
        assert_eq!(model.frames.len(), 2);
    }

    #[test]
    fn test_bad_magic_reports_offset_and_markers() {
        let mut data = MdlBuilder::new(2, 2).build();
        data[..4].copy_from_slice(b"IDP2");
        let palette = palette();
        let err = MdlParser::new("m", &data, &palette).parse_model().unwrap_err();
        match err {
            AssetError::InvalidMagic {
                offset,
                expected,
                found,
            } => {
                assert_eq!(offset, 0);
                assert_eq!(&expected, b"IDPO");
                assert_eq!(&found, b"IDP2");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_bad_version() {
        let mut data = MdlBuilder::new(2, 2).build();
        data[4..8].copy_from_slice(&7i32.to_le_bytes());
        let palette = palette();
        assert!(matches!(
            MdlParser::new("m", &data, &palette).parse_model(),
            Err(AssetError::UnsupportedVersion {
                offset: 4,
                expected: 6,
                found: 7
            })
        ));
    }

    #[test]
    fn test_shorter_than_header() {
        let data = MdlBuilder::new(2, 2).build();
        let palette = palette();
        let err = MdlParser::new("m", &data[..40], &palette)
            .parse_model()
            .unwrap_err();
        assert!(err.is_truncation());
    }

    #[test]
    fn test_every_truncation_fails_cleanly() {
        let data = MdlBuilder::new(2, 2).frame_group(2).build();
        let palette = palette();
        for len in 0..data.len() {
            let result = MdlParser::new("m", &data[..len], &palette).parse_model();
            assert!(result.is_err(), "length {len} should fail");
        }
    }

    #[test]
    fn test_triangle_index_out_of_range() {
        let data = MdlBuilder::new(2, 2).triangle_index(2, 99).build();
        let palette = palette();
        assert!(matches!(
            MdlParser::new("m", &data, &palette).parse_model(),
            Err(AssetError::InvalidData { .. })
        ));
    }
}
