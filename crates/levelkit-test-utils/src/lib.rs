//! Test utilities for levelkit
//!
//! Builders for small, valid instances of every binary format the workspace
//! reads, plus a throwaway on-disk game directory. Tests patch individual
//! fields of the produced bytes to exercise error paths.

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

fn put_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_f32(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_name(out: &mut Vec<u8>, name: &str, width: usize) {
    let mut field = vec![0u8; width];
    let len = name.len().min(width - 1);
    field[..len].copy_from_slice(&name.as_bytes()[..len]);
    out.extend_from_slice(&field);
}

/// 768 byte palette where entry `i` is `[i, i, i]`
pub fn gray_palette() -> Vec<u8> {
    (0..=255u8).flat_map(|i| [i, i, i]).collect()
}

/// Encode an 8-bit PCX image.
///
/// Pixels are run-length encoded only where the format requires it (values
/// with both top bits set). A palette, when given, is appended after the
/// `0x0C` marker.
pub fn pcx_image(width: u16, height: u16, pixels: &[u8], palette: Option<&[u8]>) -> Vec<u8> {
    assert_eq!(pixels.len(), usize::from(width) * usize::from(height));

    let mut out = Vec::with_capacity(128 + pixels.len() * 2 + 769);
    out.extend_from_slice(&[0x0A, 5, 1, 8]);
    for value in [0, 0, width - 1, height - 1, 72, 72] {
        put_u16(&mut out, value);
    }
    out.extend_from_slice(&[0u8; 48]);
    out.push(0);
    out.push(1);
    put_u16(&mut out, width);
    put_u16(&mut out, 1);
    put_u16(&mut out, width);
    put_u16(&mut out, height);
    out.extend_from_slice(&[0u8; 54]);

    for &pixel in pixels {
        if pixel & 0xC0 == 0xC0 {
            out.push(0xC1);
        }
        out.push(pixel);
    }

    if let Some(palette) = palette {
        out.push(0x0C);
        out.extend_from_slice(palette);
    }
    out
}

/// Builder for `PACK` archives.
///
/// Layout: 12 byte header, member data in insertion order, then the
/// directory.
#[derive(Debug, Default)]
pub struct PakBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl PakBuilder {
    /// Empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member
    #[must_use]
    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        self.files.push((name.to_string(), data.to_vec()));
        self
    }

    /// Serialize the archive
    pub fn build(&self) -> Vec<u8> {
        let data_len: usize = self.files.iter().map(|(_, d)| d.len()).sum();
        let directory_offset = 12 + data_len;

        let mut out = Vec::with_capacity(directory_offset + self.files.len() * 64);
        out.extend_from_slice(b"PACK");
        put_i32(&mut out, directory_offset as i32);
        put_i32(&mut out, (self.files.len() * 64) as i32);

        let mut offsets = Vec::with_capacity(self.files.len());
        for (_, data) in &self.files {
            offsets.push(out.len());
            out.extend_from_slice(data);
        }
        for ((name, data), offset) in self.files.iter().zip(offsets) {
            put_name(&mut out, name, 56);
            put_i32(&mut out, offset as i32);
            put_i32(&mut out, data.len() as i32);
        }
        out
    }
}

/// Builder for Quake MDL models.
///
/// Produces one skin of `width * height` pixels numbered `0, 1, 2, ...`,
/// three vertices packed at `(0,0,0)`, `(1,0,0)` and `(0,1,0)`, one
/// front-facing triangle `[0, 1, 2]` and one frame named `frame1`. Frame data
/// is always the last section of the file.
#[derive(Debug, Clone)]
pub struct MdlBuilder {
    width: usize,
    height: usize,
    scale: [f32; 3],
    translate: [f32; 3],
    seam_back_face: bool,
    skin_group: Option<usize>,
    frame_group: Option<usize>,
    triangle: [i32; 3],
    triangle_count: usize,
}

impl MdlBuilder {
    /// Model with a `width` x `height` skin
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            scale: [1.0; 3],
            translate: [0.0; 3],
            seam_back_face: false,
            skin_group: None,
            frame_group: None,
            triangle: [0, 1, 2],
            triangle_count: 1,
        }
    }

    /// Vertex scale
    #[must_use]
    pub fn scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Vertex origin
    #[must_use]
    pub fn translate(mut self, translate: [f32; 3]) -> Self {
        self.translate = translate;
        self
    }

    /// Put vertex 0 on the seam at `s = 0` and make the triangle back-facing
    #[must_use]
    pub fn seam_back_face(mut self) -> Self {
        self.seam_back_face = true;
        self
    }

    /// Replace the single skin with a group of `pictures` skins
    #[must_use]
    pub fn skin_group(mut self, pictures: usize) -> Self {
        self.skin_group = Some(pictures);
        self
    }

    /// Replace the single frame with a group of `frames` frames
    #[must_use]
    pub fn frame_group(mut self, frames: usize) -> Self {
        self.frame_group = Some(frames);
        self
    }

    /// Overwrite one corner of the triangle's vertex indices
    #[must_use]
    pub fn triangle_index(mut self, corner: usize, value: i32) -> Self {
        self.triangle[corner] = value;
        self
    }

    /// Repeat the triangle `count` times
    #[must_use]
    pub fn triangles(mut self, count: usize) -> Self {
        self.triangle_count = count;
        self
    }

    /// Serialize the model
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"IDPO");
        put_i32(&mut out, 6);
        for v in self.scale.into_iter().chain(self.translate) {
            put_f32(&mut out, v);
        }
        put_f32(&mut out, 1.0);
        for _ in 0..3 {
            put_f32(&mut out, 0.0);
        }
        put_i32(&mut out, 1);
        put_i32(&mut out, self.width as i32);
        put_i32(&mut out, self.height as i32);
        put_i32(&mut out, 3);
        put_i32(&mut out, self.triangle_count as i32);
        put_i32(&mut out, 1);
        put_i32(&mut out, 0);
        put_i32(&mut out, 0);
        put_f32(&mut out, 1.0);

        let skin: Vec<u8> = (0..self.width * self.height).map(|i| i as u8).collect();
        match self.skin_group {
            None => {
                put_i32(&mut out, 0);
                out.extend_from_slice(&skin);
            }
            Some(pictures) => {
                put_i32(&mut out, 1);
                put_i32(&mut out, pictures as i32);
                for i in 0..pictures {
                    put_f32(&mut out, 0.1 * (i + 1) as f32);
                }
                for _ in 0..pictures {
                    out.extend_from_slice(&skin);
                }
            }
        }

        for (i, (s, t)) in [(0, 0), (1, 0), (0, 1)].into_iter().enumerate() {
            let on_seam = i == 0 && self.seam_back_face;
            put_i32(&mut out, i32::from(on_seam));
            put_i32(&mut out, s);
            put_i32(&mut out, t);
        }

        for _ in 0..self.triangle_count {
            put_i32(&mut out, i32::from(!self.seam_back_face));
            for index in self.triangle {
                put_i32(&mut out, index);
            }
        }

        match self.frame_group {
            None => {
                put_i32(&mut out, 0);
                Self::write_frame(&mut out, "frame1");
            }
            Some(frames) => {
                put_i32(&mut out, 1);
                put_i32(&mut out, frames as i32);
                out.extend_from_slice(&[0, 0, 0, 0, 1, 1, 0, 0]);
                for i in 0..frames {
                    put_f32(&mut out, 0.1 * (i + 1) as f32);
                }
                for i in 0..frames {
                    Self::write_frame(&mut out, &format!("frame{}", i + 1));
                }
            }
        }
        out
    }

    fn write_frame(out: &mut Vec<u8>, name: &str) {
        out.extend_from_slice(&[0, 0, 0, 0, 1, 1, 0, 0]);
        put_name(out, name, 16);
        out.extend_from_slice(&[0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0]);
    }
}

/// Builder for Quake II MD2 models.
///
/// Produces a 2x2 skin size, three vertices at `(0,0,0)`, `(1,0,0)` and
/// `(0,1,0)`, one triangle and one frame. Skin paths are stored but the
/// images themselves must be supplied by the test.
#[derive(Debug, Clone, Default)]
pub struct Md2Builder {
    skins: Vec<String>,
}

impl Md2Builder {
    /// Model without skins
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference an external skin image
    #[must_use]
    pub fn skin(mut self, path: &str) -> Self {
        self.skins.push(path.to_string());
        self
    }

    /// Serialize the model
    pub fn build(&self) -> Vec<u8> {
        const HEADER: usize = 68;
        const FRAME_SIZE: usize = 40 + 3 * 4;

        let offset_skins = HEADER;
        let offset_st = offset_skins + self.skins.len() * 64;
        let offset_triangles = offset_st + 3 * 4;
        let offset_frames = offset_triangles + 12;
        let offset_end = offset_frames + FRAME_SIZE;

        let mut out = Vec::with_capacity(offset_end);
        out.extend_from_slice(b"IDP2");
        for value in [
            8,
            2,
            2,
            FRAME_SIZE,
            self.skins.len(),
            3,
            3,
            1,
            0,
            1,
            offset_skins,
            offset_st,
            offset_triangles,
            offset_frames,
            offset_end,
            offset_end,
        ] {
            put_i32(&mut out, value as i32);
        }

        for skin in &self.skins {
            put_name(&mut out, skin, 64);
        }

        for (s, t) in [(0u16, 0u16), (2, 0), (0, 2)] {
            put_u16(&mut out, s);
            put_u16(&mut out, t);
        }

        for index in [0, 1, 2, 0, 1, 2] {
            put_u16(&mut out, index);
        }

        for v in [1.0, 1.0, 1.0, 0.0, 0.0, 0.0] {
            put_f32(&mut out, v);
        }
        put_name(&mut out, "stand01", 16);
        out.extend_from_slice(&[0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0]);
        out
    }
}

/// Builder for BSP29 brush models containing one textured quad.
///
/// The quad spans `(0,0,0)` to `(16,16,0)` and is projected with an identity
/// texinfo, so texture coordinates equal positions divided by the texture
/// size.
#[derive(Debug, Clone)]
pub struct BspBuilder {
    texture: String,
    width: u32,
    height: u32,
    missing_texture: bool,
}

impl BspBuilder {
    /// Quad textured with a `width` x `height` mip texture named `texture`
    pub fn quad(texture: &str, width: u32, height: u32) -> Self {
        Self {
            texture: texture.to_string(),
            width,
            height,
            missing_texture: false,
        }
    }

    /// Mark the only texture slot as absent (offset `-1`)
    #[must_use]
    pub fn missing_texture(mut self) -> Self {
        self.missing_texture = true;
        self
    }

    fn textures_lump(&self) -> Vec<u8> {
        let mut lump = Vec::new();
        put_i32(&mut lump, 1);
        if self.missing_texture {
            put_i32(&mut lump, -1);
            return lump;
        }
        put_i32(&mut lump, 8);
        put_name(&mut lump, &self.texture, 16);
        put_i32(&mut lump, self.width as i32);
        put_i32(&mut lump, self.height as i32);
        let pixels = self.width * self.height;
        for mip in [40, 40 + pixels, 40 + pixels, 40 + pixels] {
            put_i32(&mut lump, mip as i32);
        }
        lump.extend((0..pixels).map(|i| i as u8));
        lump
    }

    /// Serialize the model
    pub fn build(&self) -> Vec<u8> {
        let mut lumps: Vec<Vec<u8>> = vec![Vec::new(); 15];

        lumps[2] = self.textures_lump();

        let vertices = &mut lumps[3];
        for [x, y] in [[0.0, 0.0], [16.0, 0.0], [16.0, 16.0], [0.0, 16.0]] {
            put_f32(vertices, x);
            put_f32(vertices, y);
            put_f32(vertices, 0.0);
        }

        let texinfo = &mut lumps[6];
        for v in [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0] {
            put_f32(texinfo, v);
        }
        put_i32(texinfo, 0);
        put_i32(texinfo, 0);

        let faces = &mut lumps[7];
        put_u16(faces, 0);
        put_u16(faces, 0);
        put_i32(faces, 0);
        put_u16(faces, 4);
        put_u16(faces, 0);
        faces.extend_from_slice(&[0, 0, 0, 0]);
        put_i32(faces, -1);

        // Edge 0 is unused by convention
        let edges = &mut lumps[12];
        for [a, b] in [[0, 0], [0, 1], [1, 2], [2, 3], [0, 3]] {
            put_u16(edges, a);
            put_u16(edges, b);
        }

        // The last edge is walked backwards
        let surfedges = &mut lumps[13];
        for edge in [1, 2, 3, -4] {
            put_i32(surfedges, edge);
        }

        let models = &mut lumps[14];
        for v in [0.0, 0.0, 0.0, 16.0, 16.0, 0.0, 0.0, 0.0, 0.0] {
            put_f32(models, v);
        }
        for _ in 0..5 {
            put_i32(models, 0);
        }
        put_i32(models, 0);
        put_i32(models, 1);

        let mut out = Vec::new();
        put_i32(&mut out, 29);
        let mut offset = 4 + 15 * 8;
        for lump in &lumps {
            put_i32(&mut out, offset as i32);
            put_i32(&mut out, lump.len() as i32);
            offset += lump.len();
        }
        for lump in &lumps {
            out.extend_from_slice(lump);
        }
        out
    }
}

/// Temporary game installation directory.
///
/// Deleted when dropped.
#[derive(Debug)]
pub struct GameTree {
    dir: TempDir,
}

impl GameTree {
    /// Create an empty directory
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Root of the tree
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the tree
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file, creating parent directories
    pub fn file(&self, relative: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        Ok(path)
    }

    /// Create a directory and its parents
    pub fn dir(&self, relative: &str) -> io::Result<PathBuf> {
        let path = self.join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}
