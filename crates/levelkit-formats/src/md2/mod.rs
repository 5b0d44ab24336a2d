//! Quake II MD2 model parsing
//!
//! MD2 models do not embed pixel data. The skin table holds 64 byte paths to
//! PCX images which are read through an [`AssetSource`], normally the game's
//! virtual file system.

mod header;

pub use header::{MD2_HEADER_SIZE, MD2_MAGIC, MD2_VERSION, Md2Header};

use crate::model::{
    AssetError, AssetResult, EntityModel, ModelFrame, ModelSurface, ModelTexture, ModelTriangle,
    ModelVertex, reserve_frame,
};
use crate::palette::Palette;
use crate::pcx::decode_pcx;
use crate::reader::{SliceReader, fixed_str, sub_slice};
use crate::{AssetSource, ModelParser};

const SKIN_NAME_SIZE: usize = 64;
const FRAME_NAME_SIZE: usize = 16;
/// scale[3] + translate[3] + name[16]
const FRAME_HEADER_SIZE: usize = 40;
const PACKED_VERTEX_SIZE: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [usize; 3],
    st: [usize; 3],
}

/// Parser for Quake II MD2 models
pub struct Md2Parser<'a> {
    name: String,
    data: &'a [u8],
    palette: &'a Palette,
    source: &'a dyn AssetSource,
}

impl<'a> Md2Parser<'a> {
    /// Create a parser over the complete file contents.
    ///
    /// `source` resolves the skin paths stored in the model.
    pub fn new(
        name: impl Into<String>,
        data: &'a [u8],
        palette: &'a Palette,
        source: &'a dyn AssetSource,
    ) -> Self {
        Self {
            name: name.into(),
            data,
            palette,
            source,
        }
    }

    fn read_header(&self) -> AssetResult<Md2Header> {
        let header: Md2Header = SliceReader::new(self.data).read_header(MD2_HEADER_SIZE)?;
        if header.magic != MD2_MAGIC {
            return Err(AssetError::InvalidMagic {
                offset: 0,
                expected: MD2_MAGIC,
                found: header.magic,
            });
        }
        if header.version != MD2_VERSION {
            return Err(AssetError::UnsupportedVersion {
                offset: 4,
                expected: MD2_VERSION,
                found: header.version,
            });
        }
        if header.skin_width <= 0 || header.skin_height <= 0 {
            return Err(AssetError::invalid_data(
                8,
                format!(
                    "invalid skin size {}x{}",
                    header.skin_width, header.skin_height
                ),
            ));
        }
        Ok(header)
    }

    fn load_skins(&self, offset: usize, count: usize) -> AssetResult<Vec<ModelTexture>> {
        let table = sub_slice(
            self.data,
            offset,
            count
                .checked_mul(SKIN_NAME_SIZE)
                .ok_or_else(|| AssetError::invalid_data(20, "skin count overflows"))?,
        )?;

        let mut skins = Vec::with_capacity(count);
        for (i, raw) in table.chunks_exact(SKIN_NAME_SIZE).enumerate() {
            let path = fixed_str(raw);
            let is_pcx = std::path::Path::new(&path)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pcx"));
            if !is_pcx {
                return Err(AssetError::invalid_data(
                    offset + i * SKIN_NAME_SIZE,
                    format!("unsupported skin format '{path}'"),
                ));
            }
            let bytes = self
                .source
                .read_asset(&path)
                .map_err(|source| AssetError::MissingSkin {
                    path: path.clone(),
                    source,
                })?;
            skins.push(decode_pcx(&path, &bytes, self.palette)?);
        }
        Ok(skins)
    }

    fn read_triangles(
        &self,
        offset: usize,
        count: usize,
        num_vertices: usize,
        num_st: usize,
    ) -> AssetResult<Vec<Triangle>> {
        let mut reader = SliceReader::at(self.data, offset)?;
        let mut triangles = Vec::with_capacity(count.min(reader.remaining() / 12));
        for _ in 0..count {
            let mut read_indices = |limit: usize| -> AssetResult<[usize; 3]> {
                let mut out = [0usize; 3];
                for slot in &mut out {
                    let at = reader.position();
                    let index = usize::from(reader.read_u16()?);
                    if index >= limit {
                        return Err(AssetError::invalid_data(
                            at,
                            format!("index {index} out of range (limit {limit})"),
                        ));
                    }
                    *slot = index;
                }
                Ok(out)
            };
            let vertices = read_indices(num_vertices)?;
            let st = read_indices(num_st)?;
            triangles.push(Triangle { vertices, st });
        }
        Ok(triangles)
    }
}

impl ModelParser for Md2Parser<'_> {
    fn parse_model(&self) -> AssetResult<EntityModel> {
        let header = self.read_header()?;

        let field = |offset: usize, value: i32| {
            usize::try_from(value)
                .map_err(|_| AssetError::invalid_data(offset, format!("negative field {value}")))
        };
        let width = field(8, header.skin_width)?;
        let height = field(12, header.skin_height)?;
        let frame_size = field(16, header.frame_size)?;
        let num_skins = field(20, header.num_skins)?;
        let num_vertices = field(24, header.num_vertices)?;
        let num_st = field(28, header.num_st)?;
        let num_triangles = field(32, header.num_triangles)?;
        let num_frames = field(40, header.num_frames)?;
        let offset_skins = field(44, header.offset_skins)?;
        let offset_st = field(48, header.offset_st)?;
        let offset_triangles = field(52, header.offset_triangles)?;
        let offset_frames = field(56, header.offset_frames)?;

        let vertex_bytes = num_vertices.saturating_mul(PACKED_VERTEX_SIZE);
        if frame_size < FRAME_HEADER_SIZE.saturating_add(vertex_bytes) {
            return Err(AssetError::invalid_data(
                16,
                format!("frame size {frame_size} too small for {num_vertices} vertices"),
            ));
        }

        let skins = self.load_skins(offset_skins, num_skins)?;

        let mut reader = SliceReader::at(self.data, offset_st)?;
        let mut st = Vec::with_capacity(num_st.min(reader.remaining() / 4));
        for _ in 0..num_st {
            let s = f32::from(reader.read_i16()?);
            let t = f32::from(reader.read_i16()?);
            st.push([s / width as f32, t / height as f32]);
        }

        let triangles = self.read_triangles(offset_triangles, num_triangles, num_vertices, num_st)?;

        let mut frames = Vec::with_capacity(num_frames.min(self.data.len() / frame_size.max(1)));
        let mut total_triangles = 0;
        for i in 0..num_frames {
            let start = i
                .checked_mul(frame_size)
                .and_then(|o| o.checked_add(offset_frames))
                .ok_or_else(|| AssetError::invalid_data(56, "frame offset overflows"))?;
            reserve_frame(&mut total_triangles, triangles.len(), start)?;
            let mut reader = SliceReader::new(sub_slice(self.data, start, frame_size)?);
            let scale = reader.read_vec3()?;
            let translate = reader.read_vec3()?;
            let name = reader.read_name(FRAME_NAME_SIZE)?;
            let packed = reader.read_bytes(vertex_bytes)?;
            let positions: Vec<[f32; 3]> = packed
                .chunks_exact(PACKED_VERTEX_SIZE)
                .map(|v| {
                    [
                        scale[0] * f32::from(v[0]) + translate[0],
                        scale[1] * f32::from(v[1]) + translate[1],
                        scale[2] * f32::from(v[2]) + translate[2],
                    ]
                })
                .collect();

            let frame_triangles = triangles
                .iter()
                .map(|t| ModelTriangle {
                    surface: 0,
                    vertices: [0, 1, 2].map(|corner| ModelVertex {
                        position: positions[t.vertices[corner]],
                        uv: st[t.st[corner]],
                    }),
                })
                .collect();
            frames.push(ModelFrame::new(name, frame_triangles));
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
