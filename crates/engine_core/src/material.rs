//! Material descriptions attached to mesh nodes. The render backend decides how to shade them.

use crate::color::Color;
use crate::texture::TextureRef;
use serde::Serialize;

/// Shading model hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MaterialKind {
    /// Lit, physically based (roughness/metalness).
    #[default]
    Standard,
    /// Ignores scene lighting; used for glowing panels.
    Unlit,
}

/// Self-illumination layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emissive {
    pub color: Color,
    pub intensity: f32,
    pub map: Option<TextureRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    /// 1.0 = opaque. Anything lower implies alpha blending.
    pub opacity: f32,
    /// Alpha-blend even at full opacity (textures with transparent texels).
    pub transparent: bool,
    pub double_sided: bool,
    pub map: Option<TextureRef>,
    pub emissive: Option<Emissive>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Standard,
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            map: None,
            emissive: None,
        }
    }
}

impl Material {
    pub fn standard(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn unlit(color: Color) -> Self {
        Self {
            kind: MaterialKind::Unlit,
            color,
            ..Default::default()
        }
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = opacity < 1.0 || self.transparent;
        self
    }

    pub fn with_map(mut self, map: TextureRef) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_emissive(mut self, color: Color, intensity: f32) -> Self {
        self.emissive = Some(Emissive { color, intensity, map: None });
        self
    }

    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    /// Emissive intensity, 0 when the material does not glow.
    pub fn emissive_intensity(&self) -> f32 {
        self.emissive.as_ref().map_or(0.0, |e| e.intensity)
    }
}
