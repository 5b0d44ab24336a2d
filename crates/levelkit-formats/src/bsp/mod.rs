//! BSP29 brush model parsing
//!
//! Brush entities such as health boxes and ammo crates in Quake are small
//! compiled BSP files. Only the lumps needed to rebuild textured polygons are
//! read; visibility, lighting and the node tree are ignored.
//!
//! Each BSP sub-model becomes one frame named `*<index>`. Each mip texture
//! becomes one surface.

mod header;

pub use header::{BSP_HEADER_SIZE, BSP_LUMP_COUNT, BSP_VERSION, BspHeader, BspLump, lump};

use crate::model::{
    AssetError, AssetResult, EntityModel, ModelFrame, ModelSurface, ModelTexture, ModelTriangle,
    ModelVertex,
};
use crate::palette::Palette;
use crate::reader::{SliceReader, sub_slice};
use crate::ModelParser;

const MIP_NAME_SIZE: usize = 16;
const TEXINFO_SIZE: usize = 40;
const VERTEX_SIZE: usize = 12;
const EDGE_SIZE: usize = 4;
const FACE_SIZE: usize = 20;
const SURFEDGE_SIZE: usize = 4;
const MODEL_SIZE: usize = 64;
const MISSING_TEXTURE: &str = "__missing";

#[derive(Debug, Clone, Copy)]
struct TexInfo {
    s: [f32; 4],
    t: [f32; 4],
    texture: usize,
}

#[derive(Debug, Clone, Copy)]
struct Face {
    first_edge: usize,
    edge_count: usize,
    texinfo: usize,
}

#[derive(Debug, Clone, Copy)]
struct SubModel {
    first_face: usize,
    face_count: usize,
}

/// Parser for BSP29 brush models
#[derive(Debug)]
pub struct BspParser<'a> {
    name: String,
    data: &'a [u8],
    palette: &'a Palette,
}

impl<'a> BspParser<'a> {
    /// Create a parser over the complete file contents
    pub fn new(name: impl Into<String>, data: &'a [u8], palette: &'a Palette) -> Self {
        Self {
            name: name.into(),
            data,
            palette,
        }
    }

    fn read_header(&self) -> AssetResult<BspHeader> {
        let header: BspHeader = SliceReader::new(self.data).read_header(BSP_HEADER_SIZE)?;
        if header.version != BSP_VERSION {
            return Err(AssetError::UnsupportedVersion {
                offset: 0,
                expected: BSP_VERSION,
                found: header.version,
            });
        }
        Ok(header)
    }

    /// Borrow a lump and return it with its element count
    fn lump(
        &self,
        header: &BspHeader,
        index: usize,
        element: usize,
    ) -> AssetResult<(&'a [u8], usize)> {
        let field = BspHeader::lump_field_offset(index);
        let entry = header.lumps[index];
        let offset = usize::try_from(entry.offset).map_err(|_| {
            AssetError::invalid_data(field, format!("negative lump offset {}", entry.offset))
        })?;
        let length = usize::try_from(entry.length).map_err(|_| {
            AssetError::invalid_data(field + 4, format!("negative lump length {}", entry.length))
        })?;
        let data = sub_slice(self.data, offset, length)?;
        Ok((data, length / element))
    }

    /// Mip textures; `None` marks a texture slot that is absent from the file
    fn parse_textures(&self, header: &BspHeader) -> AssetResult<Vec<Option<ModelTexture>>> {
        let (lump_data, _) = self.lump(header, lump::TEXTURES, 1)?;
        if lump_data.is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = SliceReader::new(lump_data);
        let count = reader.read_count()?;
        let mut offsets = Vec::with_capacity(count.min(reader.remaining() / 4));
        for _ in 0..count {
            offsets.push(reader.read_i32()?);
        }

        let mut textures = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let Ok(start) = usize::try_from(offset) else {
                textures.push(None);
                continue;
            };
            let mut mip = SliceReader::at(lump_data, start)?;
            let name = mip.read_name(MIP_NAME_SIZE)?;
            let width = mip.read_u32()? as usize;
            let height = mip.read_u32()? as usize;
            let pixels_offset = mip.read_u32()? as usize;
            let size = width
                .checked_mul(height)
                .ok_or_else(|| AssetError::invalid_data(start, "mip texture size overflows"))?;
            let pixels = sub_slice(
                lump_data,
                start
                    .checked_add(pixels_offset)
                    .ok_or_else(|| AssetError::invalid_data(start, "mip offset overflows"))?,
                size,
            )?;
            textures.push(Some(ModelTexture {
                name,
                width,
                height,
                rgb: self.palette.indexed_to_rgb(pixels),
            }));
        }
        Ok(textures)
    }

    fn parse_texinfos(
        &self,
        header: &BspHeader,
        texture_count: usize,
    ) -> AssetResult<Vec<TexInfo>> {
        let (data, count) = self.lump(header, lump::TEXINFO, TEXINFO_SIZE)?;
        let mut reader = SliceReader::new(data);
        let mut texinfos = Vec::with_capacity(count);
        for _ in 0..count {
            let mut s = [0f32; 4];
            for v in &mut s {
                *v = reader.read_f32()?;
            }
            let mut t = [0f32; 4];
            for v in &mut t {
                *v = reader.read_f32()?;
            }
            let at = reader.position();
            let texture = reader.read_i32()?;
            reader.skip(4)?;
            let texture = usize::try_from(texture)
                .ok()
                .filter(|&i| i < texture_count)
                .ok_or_else(|| {
                    AssetError::invalid_data(at, format!("texture index {texture} out of range"))
                })?;
            texinfos.push(TexInfo { s, t, texture });
        }
        Ok(texinfos)
    }

    fn parse_vertices(&self, header: &BspHeader) -> AssetResult<Vec<[f32; 3]>> {
        let (data, count) = self.lump(header, lump::VERTICES, VERTEX_SIZE)?;
        let mut reader = SliceReader::new(data);
        (0..count).map(|_| reader.read_vec3()).collect()
    }

    fn parse_edges(&self, header: &BspHeader) -> AssetResult<Vec<[usize; 2]>> {
        let (data, count) = self.lump(header, lump::EDGES, EDGE_SIZE)?;
        let mut reader = SliceReader::new(data);
        (0..count)
            .map(|_| {
                Ok([
                    usize::from(reader.read_u16()?),
                    usize::from(reader.read_u16()?),
                ])
            })
            .collect()
    }

    fn parse_surfedges(&self, header: &BspHeader) -> AssetResult<Vec<i32>> {
        let (data, count) = self.lump(header, lump::SURFEDGES, SURFEDGE_SIZE)?;
        let mut reader = SliceReader::new(data);
        (0..count).map(|_| reader.read_i32()).collect()
    }

    fn parse_faces(&self, header: &BspHeader) -> AssetResult<Vec<Face>> {
        let (data, count) = self.lump(header, lump::FACES, FACE_SIZE)?;
        let mut reader = SliceReader::new(data);
        let mut faces = Vec::with_capacity(count);
        for _ in 0..count {
            // Plane and side
            reader.skip(4)?;
            let at = reader.position();
            let first_edge = reader.read_i32()?;
            let edge_count = usize::from(reader.read_u16()?);
            let texinfo = usize::from(reader.read_u16()?);
            // Light styles and light map offset
            reader.skip(8)?;
            let first_edge = usize::try_from(first_edge).map_err(|_| {
                AssetError::invalid_data(at, format!("negative first edge {first_edge}"))
            })?;
            faces.push(Face {
                first_edge,
                edge_count,
                texinfo,
            });
        }
        Ok(faces)
    }

    fn parse_models(&self, header: &BspHeader) -> AssetResult<Vec<SubModel>> {
        let (data, count) = self.lump(header, lump::MODELS, MODEL_SIZE)?;
        let mut reader = SliceReader::new(data);
        let mut models = Vec::with_capacity(count);
        for _ in 0..count {
            // Bounds, origin, head nodes and visible leaf count
            reader.skip(56)?;
            let first_face = reader.read_count()?;
            let face_count = reader.read_count()?;
            models.push(SubModel {
                first_face,
                face_count,
            });
        }
        Ok(models)
    }
}

impl ModelParser for BspParser<'_> {
    fn parse_model(&self) -> AssetResult<EntityModel> {
        let header = self.read_header()?;

        let textures = self.parse_textures(&header)?;
        let texinfos = self.parse_texinfos(&header, textures.len())?;
        let vertices = self.parse_vertices(&header)?;
        let edges = self.parse_edges(&header)?;
        let surfedges = self.parse_surfedges(&header)?;
        let faces = self.parse_faces(&header)?;
        let models = self.parse_models(&header)?;

        let texture_sizes: Vec<(f32, f32)> = textures
            .iter()
            .map(|t| {
                t.as_ref().map_or((1.0, 1.0), |t| {
                    (t.width.max(1) as f32, t.height.max(1) as f32)
                })
            })
            .collect();

        let geometry = Geometry {
            texinfos: &texinfos,
            vertices: &vertices,
            edges: &edges,
            surfedges: &surfedges,
            texture_sizes: &texture_sizes,
        };

        let mut frames = Vec::with_capacity(models.len());
        for (index, model) in models.iter().enumerate() {
            let face_range = model
                .first_face
                .checked_add(model.face_count)
                .filter(|&end| end <= faces.len())
                .map(|end| model.first_face..end)
                .ok_or_else(|| {
                    AssetError::invalid_data(
                        0,
                        format!("model {index} references faces past the face lump"),
                    )
                })?;

            let mut triangles = Vec::new();
            for face in &faces[face_range] {
                geometry.triangulate(face, &mut triangles)?;
            }
            frames.push(ModelFrame::new(format!("*{index}"), triangles));
        }

        let surfaces = textures
            .into_iter()
            .map(|texture| match texture {
                Some(texture) => ModelSurface {
                    name: texture.name.clone(),
                    skins: vec![texture],
                },
                None => ModelSurface {
                    name: MISSING_TEXTURE.to_string(),
                    skins: Vec::new(),
                },
            })
            .collect();

        Ok(EntityModel {
            name: self.name.clone(),
            surfaces,
            frames,
        })
    }
}

struct Geometry<'g> {
    texinfos: &'g [TexInfo],
    vertices: &'g [[f32; 3]],
    edges: &'g [[usize; 2]],
    surfedges: &'g [i32],
    texture_sizes: &'g [(f32, f32)],
}

impl Geometry<'_> {
    fn face_vertex(&self, surfedge: i32) -> AssetResult<[f32; 3]> {
        let edge_index = surfedge.unsigned_abs() as usize;
        let edge = self.edges.get(edge_index).ok_or_else(|| {
            AssetError::invalid_data(0, format!("edge {edge_index} out of range"))
        })?;
        let vertex_index = if surfedge >= 0 { edge[0] } else { edge[1] };
        self.vertices.get(vertex_index).copied().ok_or_else(|| {
            AssetError::invalid_data(0, format!("vertex {vertex_index} out of range"))
        })
    }

    fn triangulate(&self, face: &Face, out: &mut Vec<ModelTriangle>) -> AssetResult<()> {
        let texinfo = self.texinfos.get(face.texinfo).ok_or_else(|| {
            AssetError::invalid_data(0, format!("texinfo {} out of range", face.texinfo))
        })?;
        let surfedges = face
            .first_edge
            .checked_add(face.edge_count)
            .and_then(|end| self.surfedges.get(face.first_edge..end))
            .ok_or_else(|| {
                AssetError::invalid_data(
                    0,
                    format!(
                        "face edges {}..+{} out of range",
                        face.first_edge, face.edge_count
                    ),
                )
            })?;
        let (width, height) = self.texture_sizes[texinfo.texture];

        let polygon = surfedges
            .iter()
            .map(|&surfedge| {
                let position = self.face_vertex(surfedge)?;
                let s = dot(position, texinfo.s) / width;
                let t = dot(position, texinfo.t) / height;
                Ok(ModelVertex {
                    position,
                    uv: [s, t],
                })
            })
            .collect::<AssetResult<Vec<_>>>()?;

        for i in 1..polygon.len().saturating_sub(1) {
            out.push(ModelTriangle {
                surface: texinfo.texture,
                vertices: [polygon[0], polygon[i], polygon[i + 1]],
            });
        }
        Ok(())
    }
}

fn dot(p: [f32; 3], axis: [f32; 4]) -> f32 {
    p[0] * axis[0] + p[1] * axis[1] + p[2] * axis[2] + axis[3]
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use levelkit_test_utils::{BspBuilder, gray_palette};
    use pretty_assertions::assert_eq;

    fn palette() -> Palette {
        Palette::parse(&gray_palette()).unwrap()
    }

    #[test]
    fn test_parse_quad_model() {
        let data = BspBuilder::quad("crate1", 4, 4).build();
        let palette = palette();
        let model = BspParser::new("b_box.bsp", &data, &palette)
            .parse_model()
            .unwrap();

        assert_eq!(model.surfaces.len(), 1);
        assert_eq!(model.surfaces[0].name, "crate1");
        assert_eq!(model.surfaces[0].skins[0].width, 4);
        assert_eq!(model.frames.len(), 1);
        assert_eq!(model.frames[0].name, "*0");
        // Quad fans into two triangles
        assert_eq!(model.frames[0].triangles.len(), 2);
        assert_eq!(model.frames[0].bounds.max, [16.0, 16.0, 0.0]);
    }

    #[test]
    fn test_texture_coordinates_use_texinfo() {
        let data = BspBuilder::quad("crate1", 4, 4).build();
        let palette = palette();
        let model = BspParser::new("b", &data, &palette).parse_model().unwrap();
        let corner = model.frames[0].triangles[0].vertices[2];
        // Identity projection; vertex (16, 16, 0) on a 4x4 texture
        assert_eq!(corner.position, [16.0, 16.0, 0.0]);
        assert_eq!(corner.uv, [4.0, 4.0]);
    }

    #[test]
    fn test_missing_texture_slot() {
        let data = BspBuilder::quad("crate1", 4, 4).missing_texture().build();
        let palette = palette();
        let model = BspParser::new("b", &data, &palette).parse_model().unwrap();
        assert_eq!(model.surfaces[0].name, "__missing");
        assert!(model.surfaces[0].skins.is_empty());
    }

    #[test]
    fn test_wrong_version() {
        let mut data = BspBuilder::quad("crate1", 4, 4).build();
        data[..4].copy_from_slice(&30i32.to_le_bytes());
        let palette = palette();
        assert!(matches!(
            BspParser::new("b", &data, &palette).parse_model(),
            Err(AssetError::UnsupportedVersion {
                offset: 0,
                expected: 29,
                found: 30
            })
        ));
    }

    #[test]
    fn test_shorter_than_header() {
        let data = BspBuilder::quad("crate1", 4, 4).build();
        let palette = palette();
        let err = BspParser::new("b", &data[..100], &palette)
            .parse_model()
            .unwrap_err();
        assert!(err.is_truncation());
    }

    #[test]
    fn test_lump_past_end() {
        let mut data = BspBuilder::quad("crate1", 4, 4).build();
        let field = BspHeader::lump_field_offset(lump::MODELS) + 4;
        data[field..field + 4].copy_from_slice(&100_000i32.to_le_bytes());
        let palette = palette();
        let err = BspParser::new("b", &data, &palette).parse_model().unwrap_err();
        assert!(err.is_truncation());
    }

    #[test]
    fn test_every_truncation_fails_cleanly() {
        let data = BspBuilder::quad("crate1", 4, 4).build();
        let palette = palette();
        for len in 0..data.len() {
            let result = BspParser::new("b", &data[..len], &palette).parse_model();
            assert!(result.is_err(), "length {len} should fail");
        }
        assert!(BspParser::new("b", &data, &palette).parse_model().is_ok());
    }
}
