//! Headless export: the scene graph as RON plus every glow texture as a PNG.

use anyhow::{anyhow, Context, Result};
use engine_core::{SceneGraph, TextureData};
use procgen::TextureCache;
use std::fs;
use std::path::{Path, PathBuf};

/// What an export wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub scene: PathBuf,
    pub textures: Vec<PathBuf>,
}

pub fn export_city(dir: &Path, scene: &SceneGraph, textures: &TextureCache) -> Result<ExportSummary> {
    fs::create_dir_all(dir).with_context(|| format!("creating export directory {}", dir.display()))?;

    let scene_path = dir.join("scene.ron");
    let ron = ron::ser::to_string_pretty(scene, ron::ser::PrettyConfig::default()).context("serializing scene")?;
    fs::write(&scene_path, ron).with_context(|| format!("writing {}", scene_path.display()))?;

    let mut written = Vec::with_capacity(textures.len());
    for (key, texture) in textures.iter() {
        let path = dir.join(format!("{}.png", file_stem(&key.label())));
        write_png(&path, texture).with_context(|| format!("writing glow texture {}", path.display()))?;
        written.push(path);
    }
    written.sort();

    log::info!(
        "Exported {} and {} glow textures to {}",
        scene_path.display(),
        written.len(),
        dir.display()
    );
    Ok(ExportSummary {
        scene: scene_path,
        textures: written,
    })
}

fn write_png(path: &Path, texture: &TextureData) -> Result<()> {
    let image = image::RgbaImage::from_raw(texture.width, texture.height, texture.to_bytes())
        .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", texture.width, texture.height))?;
    image.save(path)?;
    Ok(())
}

/// File-system safe form of a cache label. ASCII letters, digits, `-` and `_` pass through,
/// anything else becomes `u<hex>` so distinct labels stay distinct.
pub fn file_stem(label: &str) -> String {
    let mut stem = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            stem.push(c);
        } else if c == '#' {
            continue;
        } else {
            stem.push_str(&format!("u{:x}", c as u32));
        }
    }
    stem
}
