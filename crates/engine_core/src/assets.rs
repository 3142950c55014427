//! Seam to the external asset loader: texture URL resolution, material overrides and placement
//! of loaded models. Fetching and decoding files is the loader's business, not ours.

use crate::color::Color;
use crate::material::{Emissive, Material};
use crate::scene::SceneNode;
use crate::texture::TextureRef;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("model `{url}` could not be loaded: {reason}")]
    LoadFailed { url: String, reason: String },
    #[error("no loader is available for `{0}`")]
    Unsupported(String),
}

/// Implemented by whatever actually fetches and parses model files.
pub trait AssetLoader {
    fn load_model(&mut self, url: &str) -> Result<SceneNode, AssetError>;
}

/// Texture URLs requested for a model. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureUrls {
    #[serde(default)]
    pub diffuse_map_url: Option<String>,
    #[serde(default)]
    pub emission_map_url: Option<String>,
}

/// Textures that survived resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTextures {
    pub diffuse: TextureRef,
    pub emissive: Option<TextureRef>,
}

/// Resolve requested URLs into texture references.
///
/// No diffuse map means no override at all; a missing emission map only drops the glow layer.
/// Both cases are warnings, never errors.
pub fn resolve_textures(urls: &TextureUrls) -> Option<ModelTextures> {
    let Some(diffuse) = urls.diffuse_map_url.as_deref() else {
        log::warn!("Missing texture URLs; model keeps its own materials");
        return None;
    };
    let diffuse = TextureRef::External(diffuse.to_string());

    let Some(emission) = urls.emission_map_url.as_deref() else {
        log::warn!("Missing emission map URL; model will not glow");
        return Some(ModelTextures { diffuse, emissive: None });
    };

    Some(ModelTextures {
        diffuse,
        emissive: Some(TextureRef::External(emission.to_string())),
    })
}

/// Material applied to every mesh of a model with resolved textures.
pub fn override_material(textures: &ModelTextures) -> Material {
    let mut material = Material::standard(Color::WHITE)
        .with_metalness(1.0)
        .with_roughness(1.0)
        .with_map(textures.diffuse.clone());
    if let Some(map) = &textures.emissive {
        material.emissive = Some(Emissive {
            color: Color::WHITE,
            intensity: 1.4,
            map: Some(map.clone()),
        });
    }
    material
}

/// Optional placement of a loaded model. Missing components default to identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPlacement {
    #[serde(default)]
    pub position: Option<Vec3>,
    #[serde(default)]
    pub scale: Option<Vec3>,
    /// XYZ Euler angles, radians.
    #[serde(default)]
    pub rotation: Option<Vec3>,
}

/// A model to load and drop into the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub url: String,
    #[serde(default)]
    pub textures: TextureUrls,
    #[serde(default)]
    pub placement: ModelPlacement,
}

/// Load, restyle and place a model. The caller decides what a failure means; the scene is
/// never touched here.
pub fn prepare_model(loader: &mut dyn AssetLoader, request: &ModelRequest) -> Result<SceneNode, AssetError> {
    log::info!("Loading model {}", request.url);
    let mut model = loader.load_model(&request.url)?;

    if let Some(textures) = resolve_textures(&request.textures) {
        let material = override_material(&textures);
        model.for_each_mesh_mut(&mut |mesh| mesh.material = material.clone());
    }

    let placement = request.placement;
    let transform = model.transform_mut();
    transform.position = placement.position.unwrap_or(Vec3::ZERO);
    transform.scale = placement.scale.unwrap_or(Vec3::ONE);
    transform.rotation = crate::transform::euler_to_quat(placement.rotation.unwrap_or(Vec3::ZERO));

    Ok(model)
}
