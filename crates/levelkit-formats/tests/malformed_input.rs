//! Parsers must reject corrupted input with an error instead of panicking

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bytes::Bytes;
use levelkit_formats::bsp::BspParser;
use levelkit_formats::md2::Md2Parser;
use levelkit_formats::mdl::MdlParser;
use levelkit_formats::pak::PakArchive;
use levelkit_formats::pcx::decode_pcx;
use levelkit_formats::model::MAX_MODEL_TRIANGLES;
use levelkit_formats::{AssetError, AssetSource, ModelParser, Palette};
use levelkit_test_utils::{BspBuilder, Md2Builder, MdlBuilder, PakBuilder, gray_palette, pcx_image};
use proptest::prelude::*;

struct SkinSource(Vec<u8>);

impl AssetSource for SkinSource {
    fn read_asset(&self, _path: &str) -> std::io::Result<Bytes> {
        Ok(Bytes::copy_from_slice(&self.0))
    }
}

fn palette() -> Palette {
    Palette::parse(&gray_palette()).unwrap()
}

/// Overwrite up to eight bytes of `data` at arbitrary positions
fn corrupt(mut data: Vec<u8>, patches: &[(usize, u8)]) -> Vec<u8> {
    if data.is_empty() {
        return data;
    }
    let len = data.len();
    for &(at, value) in patches {
        data[at % len] = value;
    }
    data
}

fn patches() -> impl Strategy<Value = Vec<(usize, u8)>> {
    prop::collection::vec((any::<usize>(), any::<u8>()), 1..8)
}

proptest! {
    #[test]
    fn pak_survives_corruption(patches in patches()) {
        let data = PakBuilder::new()
            .file("progs/player.mdl", b"model data")
            .file("gfx/palette.lmp", &gray_palette())
            .build();
        let data = corrupt(data, &patches);
        if let Ok(archive) = PakArchive::parse(&data) {
            for entry in archive.entries() {
                prop_assert!(entry.range().end <= data.len());
            }
        }
    }

    #[test]
    fn mdl_survives_corruption(patches in patches()) {
        let data = corrupt(MdlBuilder::new(4, 4).skin_group(2).frame_group(2).build(), &patches);
        let palette = palette();
        let _ = MdlParser::new("m", &data, &palette).parse_model();
    }

    #[test]
    fn md2_survives_corruption(patches in patches()) {
        let data = corrupt(Md2Builder::new().skin("skin.pcx").build(), &patches);
        let palette = palette();
        let source = SkinSource(pcx_image(2, 2, &[1, 2, 3, 4], None));
        let _ = Md2Parser::new("m", &data, &palette, &source).parse_model();
    }

    #[test]
    fn bsp_survives_corruption(patches in patches()) {
        let data = corrupt(BspBuilder::quad("wall", 8, 8).build(), &patches);
        let palette = palette();
        let _ = BspParser::new("b", &data, &palette).parse_model();
    }

    #[test]
    fn pcx_survives_corruption(patches in patches()) {
        let data = corrupt(pcx_image(4, 4, &[0xC5; 16], Some(&gray_palette())), &patches);
        let _ = decode_pcx("skin.pcx", &data, &palette());
    }

    #[test]
    fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let palette = palette();
        let source = SkinSource(Vec::new());
        let _ = PakArchive::parse(&data);
        let _ = MdlParser::new("m", &data, &palette).parse_model();
        let _ = Md2Parser::new("m", &data, &palette, &source).parse_model();
        let _ = BspParser::new("b", &data, &palette).parse_model();
        let _ = decode_pcx("p", &data, &palette);
    }
}

#[test]
fn md2_skin_resolved_through_source() {
    let data = Md2Builder::new().skin("models/items/armor/skin.pcx").build();
    let palette = palette();
    let source = SkinSource(pcx_image(2, 2, &[9, 9, 9, 9], None));
    let model = Md2Parser::new("armor", &data, &palette, &source)
        .parse_model()
        .unwrap();
    assert_eq!(model.surfaces[0].skins[0].pixel(0, 0), Some([9, 9, 9]));
}

#[test]
fn mdl_frames_times_triangles_is_capped() {
    let triangles = 2048;
    let frames = MAX_MODEL_TRIANGLES / triangles + 1;
    let data = MdlBuilder::new(2, 2)
        .triangles(triangles)
        .frame_group(frames)
        .build();
    // Input stays small while the expanded model would not
    assert!(data.len() < 128 * 1024);

    let palette = palette();
    let err = MdlParser::new("m", &data, &palette).parse_model().unwrap_err();
    assert!(matches!(err, AssetError::InvalidData { .. }), "{err}");
    assert!(err.to_string().contains("triangles"));
}

#[test]
fn mdl_many_triangles_within_cap_parse() {
    let data = MdlBuilder::new(2, 2).triangles(512).frame_group(4).build();
    let palette = palette();
    let model = MdlParser::new("m", &data, &palette).parse_model().unwrap();
    assert_eq!(model.frames.len(), 4);
    assert!(model.frames.iter().all(|f| f.triangles.len() == 512));
}
