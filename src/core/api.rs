//! Top-level entry: read a scene description, build the scene, render.

// std
use std::path::Path;
// others
use anyhow::{Context, Result};
// lumiray
use crate::core::image::Image;
use crate::core::parser::{build_scene, parse_scene_str};

pub fn render_scene_file(scene_path: &Path) -> Result<Image> {
    log::info!("parsing {}", scene_path.display());
    let text = std::fs::read_to_string(scene_path)
        .with_context(|| format!("failed to read {}", scene_path.display()))?;
    let desc = parse_scene_str(&text)
        .with_context(|| format!("failed to parse {}", scene_path.display()))?;

    let base_dir = scene_path.parent().unwrap_or_else(|| Path::new("."));
    let (scene, integrator) = build_scene(desc, base_dir)?;

    Ok(integrator.render(&scene))
}
