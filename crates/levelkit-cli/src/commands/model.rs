//! Entity model summaries

use std::io::Write;

use anyhow::{Context, Result};
use levelkit_formats::EntityModel;
use levelkit_game::Game;
use levelkit_vfs::VfsPath;
use serde::Serialize;

use super::write_json;
use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct SurfaceSummary {
    name: String,
    skins: Vec<[usize; 2]>,
}

#[derive(Debug, Serialize)]
struct FrameSummary {
    name: String,
    triangles: usize,
    min: [f32; 3],
    max: [f32; 3],
}

#[derive(Debug, Serialize)]
struct ModelSummary {
    name: String,
    surfaces: Vec<SurfaceSummary>,
    frames: Vec<FrameSummary>,
}

impl From<&EntityModel> for ModelSummary {
    fn from(model: &EntityModel) -> Self {
        Self {
            name: model.name.clone(),
            surfaces: model
                .surfaces
                .iter()
                .map(|surface| SurfaceSummary {
                    name: surface.name.clone(),
                    skins: surface
                        .skins
                        .iter()
                        .map(|skin| [skin.width, skin.height])
                        .collect(),
                })
                .collect(),
            frames: model
                .frames
                .iter()
                .map(|frame| FrameSummary {
                    name: frame.name.clone(),
                    triangles: frame.triangles.len(),
                    min: frame.bounds.min,
                    max: frame.bounds.max,
                })
                .collect(),
        }
    }
}

/// Parse the model at `path` and print its surfaces and frames
pub fn handle_model(game: &Game, path: &str, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let model = game
        .load_entity_model(&VfsPath::new(path))
        .with_context(|| format!("Failed to load model {path}"))?;
    let summary = ModelSummary::from(&model);

    if format == OutputFormat::Json {
        return write_json(out, &summary);
    }

    writeln!(out, "Model: {}", summary.name)?;
    writeln!(out, "Surfaces: {}", summary.surfaces.len())?;
    for surface in &summary.surfaces {
        let skins: Vec<String> = surface
            .skins
            .iter()
            .map(|[w, h]| format!("{w}x{h}"))
            .collect();
        writeln!(out, "  {} [{}]", surface.name, skins.join(", "))?;
    }
    writeln!(out, "Frames: {}", summary.frames.len())?;
    for frame in &summary.frames {
        writeln!(
            out,
            "  {} ({} triangles) {:?} .. {:?}",
            frame.name, frame.triangles, frame.min, frame.max
        )?;
    }
    Ok(())
}
