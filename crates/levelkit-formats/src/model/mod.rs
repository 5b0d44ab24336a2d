//! Format-agnostic entity model
//!
//! All model parsers produce the same structure: a list of surfaces, each with
//! one or more skins, and a list of animation frames whose triangles point at
//! a surface by index. The caller owns the model after parsing.

mod error;

pub use error::{AssetError, AssetResult};

/// Most triangles the frames of one animated model may hold together.
///
/// Every MDL and MD2 frame repeats the full triangle list, so the output
/// grows with `triangles * frames` while the input only grows with their sum.
pub const MAX_MODEL_TRIANGLES: usize = 1 << 21;

/// Add one frame of `triangles` to `total`, failing once the model would
/// exceed [`MAX_MODEL_TRIANGLES`]
pub(crate) fn reserve_frame(total: &mut usize, triangles: usize, offset: usize) -> AssetResult<()> {
    *total = total.saturating_add(triangles);
    if *total > MAX_MODEL_TRIANGLES {
        return Err(AssetError::invalid_data(
            offset,
            format!("model exceeds {MAX_MODEL_TRIANGLES} triangles across all frames"),
        ));
    }
    Ok(())
}

/// RGB texture expanded from indexed pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTexture {
    /// Texture name (skin path or mip texture name)
    pub name: String,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Tightly packed RGB bytes, `width * height * 3`
    pub rgb: Vec<u8>,
}

impl ModelTexture {
    /// Color of the pixel at `(x, y)`, if in range
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        let px = self.rgb.get(i..i + 3)?;
        Some([px[0], px[1], px[2]])
    }
}

/// A named group of skins that triangles are textured with
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelSurface {
    /// Surface name
    pub name: String,
    /// Alternative skins; frame 0 is the default
    pub skins: Vec<ModelTexture>,
}

/// Vertex with position and normalized texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelVertex {
    /// Model space position
    pub position: [f32; 3],
    /// Texture coordinates in `[0, 1]` for in-range texels
    pub uv: [f32; 2],
}

/// Triangle assigned to a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTriangle {
    /// Index into [`EntityModel::surfaces`]
    pub surface: usize,
    /// Corners in winding order
    pub vertices: [ModelVertex; 3],
}

/// Axis aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner
    pub min: [f32; 3],
    /// Maximum corner
    pub max: [f32; 3],
}

impl Bounds {
    /// Bounds enclosing all `points`, or `None` if there are none
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [f32; 3]>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(p[axis]);
                bounds.max[axis] = bounds.max[axis].max(p[axis]);
            }
        }
        Some(bounds)
    }
}

/// One animation frame (MDL/MD2) or one brush sub-model (BSP)
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFrame {
    /// Frame name
    pub name: String,
    /// Bounds of all frame vertices
    pub bounds: Bounds,
    /// Triangles of this frame
    pub triangles: Vec<ModelTriangle>,
}

impl ModelFrame {
    /// Build a frame, computing its bounds from the triangles
    pub fn new(name: impl Into<String>, triangles: Vec<ModelTriangle>) -> Self {
        let bounds = Bounds::from_points(
            triangles
                .iter()
                .flat_map(|t| t.vertices.iter().map(|v| &v.position)),
        )
        .unwrap_or(Bounds {
            min: [0.0; 3],
            max: [0.0; 3],
        });
        Self {
            name: name.into(),
            bounds,
            triangles,
        }
    }
}

/// Parsed entity model
#[derive(Debug, Clone, PartialEq)]
pub struct EntityModel {
    /// Model name, usually the file name
    pub name: String,
    /// Texture surfaces
    pub surfaces: Vec<ModelSurface>,
    /// Animation frames
    pub frames: Vec<ModelFrame>,
}

impl EntityModel {
    /// Create an empty model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surfaces: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Total number of skins across all surfaces
    pub fn skin_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.skins.len()).sum()
    }

    /// Look up a frame by name
    pub fn frame(&self, name: &str) -> Option<&ModelFrame> {
        self.frames.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> ModelVertex {
        ModelVertex {
            position: [x, y, z],
            uv: [0.0, 0.0],
        }
    }

    #[test]
    fn test_frame_bounds() {
        let frame = ModelFrame::new(
            "stand1",
            vec![ModelTriangle {
                surface: 0,
                vertices: [
                    vertex(-1.0, 0.0, 2.0),
                    vertex(3.0, -4.0, 0.0),
                    vertex(0.0, 5.0, -6.0),
                ],
            }],
        );
        assert_eq!(frame.bounds.min, [-1.0, -4.0, -6.0]);
        assert_eq!(frame.bounds.max, [3.0, 5.0, 2.0]);
    }

    #[test]
    fn test_reserve_frame_stops_at_cap() {
        let mut total = 0;
        reserve_frame(&mut total, MAX_MODEL_TRIANGLES - 1, 0).unwrap();
        reserve_frame(&mut total, 1, 0).unwrap();
        assert_eq!(total, MAX_MODEL_TRIANGLES);
        let err = reserve_frame(&mut total, 1, 96).unwrap_err();
        assert!(matches!(err, AssetError::InvalidData { offset: 96, .. }));

        let mut total = usize::MAX - 1;
        assert!(reserve_frame(&mut total, 10, 0).is_err());
    }

    #[test]
    fn test_empty_frame_bounds() {
        let frame = ModelFrame::new("empty", Vec::new());
        assert_eq!(frame.bounds.min, [0.0; 3]);
    }

    #[test]
    fn test_texture_pixel() {
        let texture = ModelTexture {
            name: "t".to_string(),
            width: 2,
            height: 1,
            rgb: vec![1, 2, 3, 4, 5, 6],
        };
        assert_eq!(texture.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(texture.pixel(2, 0), None);
    }
}
