//! Neon sign generation: a cached glow-text panel in front of a tinted frame and a dark
//! backing board.

use crate::glow::{GlowRasterizer, GlowStyle};
use crate::random::RandomSource;
use crate::sign_templates::{SignTemplate, SignTemplateCatalog, TemplateKind};
use crate::texture_cache::{TextureCache, TextureKey};
use engine_core::{
    Color, Emissive, GroupNode, Material, MeshNode, Primitive, SceneNode, TextureHandle, TextureRef, Transform,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shop names and phrases you'd see on a Tokyo side street.
pub const JAPANESE_TEXTS: [&str; 19] = [
    "居酒屋",
    "寿司",
    "ラーメン",
    "カラオケ",
    "バー",
    "ホテル",
    "24時間",
    "美容院",
    "銀行",
    "カフェ",
    "書店",
    "ゲームセンター",
    "歓迎",
    "新鮮",
    "激安",
    "本日営業",
    "成功",
    "電器",
    "薬局",
];

pub const ENGLISH_TEXTS: [&str; 18] = [
    "BAR", "HOTEL", "LOUNGE", "CAFE", "CLUB", "NOODLE", "SUSHI", "TECH", "CYBER", "NIGHT", "DREAM", "STAR", "LUCKY",
    "DRAGON", "GLOW", "GAMES", "24H", "OPEN",
];

pub const NEON_PALETTE: [Color; 8] = [
    Color::from_hex(0xff3366),
    Color::from_hex(0x33ccff),
    Color::from_hex(0xffcc00),
    Color::from_hex(0x66ff66),
    Color::from_hex(0xcc33ff),
    Color::from_hex(0xff6600),
    Color::from_hex(0x00ffcc),
    Color::from_hex(0xff0099),
];

/// Chance a mixed-language sign uses the Japanese pool.
const JAPANESE_SHARE: f32 = 0.7;

const FRAME_MARGIN: f32 = 0.2;
const FRAME_OFFSET: f32 = -0.05;
const FRAME_OPACITY: f32 = 0.7;
const BACKING_MARGIN: f32 = 0.3;
const BACKING_DEPTH: f32 = 0.1;
const BACKING_OFFSET: f32 = -0.1;

/// Which text pool random signs draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextLanguage {
    Japanese,
    English,
    #[default]
    Mixed,
}

/// Random shop text for `language`.
pub fn random_text<R: RandomSource + ?Sized>(rng: &mut R, language: TextLanguage) -> &'static str {
    match language {
        TextLanguage::Japanese => *rng.pick(&JAPANESE_TEXTS),
        TextLanguage::English => *rng.pick(&ENGLISH_TEXTS),
        TextLanguage::Mixed => {
            if rng.chance(JAPANESE_SHARE) {
                *rng.pick(&JAPANESE_TEXTS)
            } else {
                *rng.pick(&ENGLISH_TEXTS)
            }
        }
    }
}

/// Per-field overrides. Anything left `None` is drawn at random (text, color, template) or
/// defaults to the origin with no rotation (position, rotation).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignOptions {
    pub text: Option<String>,
    pub color: Option<Color>,
    pub template: Option<TemplateKind>,
    pub position: Option<Vec3>,
    /// XYZ Euler angles, radians.
    pub rotation: Option<Vec3>,
}

/// A finished sign. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NeonSign {
    pub text: String,
    pub color: Color,
    pub template: TemplateKind,
    pub dimensions: SignTemplate,
    pub position: Vec3,
    pub rotation: Vec3,
    pub texture_key: TextureKey,
    pub texture: TextureHandle,
}

impl NeonSign {
    pub fn transform(&self) -> Transform {
        Transform::from_position_euler(self.position, self.rotation)
    }

    /// Glow panel, frame and backing, grouped and placed.
    pub fn to_node(&self) -> SceneNode {
        let SignTemplate {
            width,
            height,
            glow_intensity,
        } = self.dimensions;
        let texture = TextureRef::generated(self.texture_key.label(), Arc::clone(&self.texture));

        let mut glow = Material::unlit(Color::WHITE).with_map(texture.clone()).transparent().double_sided();
        glow.emissive = Some(Emissive {
            color: Color::WHITE,
            intensity: glow_intensity,
            map: Some(texture),
        });
        let text_panel = MeshNode::new("glow_text", Primitive::Plane { width, height }, glow);

        let frame = MeshNode::new(
            "frame",
            Primitive::Plane {
                width: width + FRAME_MARGIN,
                height: height + FRAME_MARGIN,
            },
            Material::unlit(self.color).with_opacity(FRAME_OPACITY),
        )
        .at(Vec3::new(0.0, 0.0, FRAME_OFFSET));

        let backing = MeshNode::new(
            "backing",
            Primitive::Box {
                width: width + BACKING_MARGIN,
                height: height + BACKING_MARGIN,
                depth: BACKING_DEPTH,
            },
            Material::standard(Color::from_hex(0x111111)).with_roughness(0.8).with_metalness(0.2),
        )
        .at(Vec3::new(0.0, 0.0, BACKING_OFFSET));

        GroupNode::new(format!("sign:{}", self.text))
            .with_transform(self.transform())
            .with_child(text_panel)
            .with_child(frame)
            .with_child(backing)
            .into()
    }
}

/// Builds signs and owns the glow-texture cache for one scene.
#[derive(Debug)]
pub struct NeonSignFactory {
    catalog: SignTemplateCatalog,
    cache: TextureCache,
    rasterizer: GlowRasterizer,
    language: TextLanguage,
    palette: Vec<Color>,
}

impl Default for NeonSignFactory {
    fn default() -> Self {
        Self::new(GlowStyle::default(), TextLanguage::Mixed)
    }
}

impl NeonSignFactory {
    pub fn new(style: GlowStyle, language: TextLanguage) -> Self {
        Self {
            catalog: SignTemplateCatalog::default(),
            cache: TextureCache::new(),
            rasterizer: GlowRasterizer::new(style),
            language,
            palette: NEON_PALETTE.to_vec(),
        }
    }

    /// Replace the neon palette. An empty palette is ignored.
    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        if palette.is_empty() {
            log::warn!("Empty neon palette ignored, keeping the default colors");
        } else {
            self.palette = palette;
        }
        self
    }

    pub fn catalog(&self) -> &SignTemplateCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    pub fn rasterizer(&self) -> &GlowRasterizer {
        &self.rasterizer
    }

    pub fn language(&self) -> TextLanguage {
        self.language
    }

    pub fn random_color<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Color {
        *rng.pick(&self.palette)
    }

    pub fn random_template<R: RandomSource + ?Sized>(&self, rng: &mut R) -> TemplateKind {
        let kinds: Vec<TemplateKind> = self.catalog.kinds().collect();
        *rng.pick(&kinds)
    }

    /// Glow texture for `(text, color)`, rasterized on first request only.
    pub fn create_text_texture(&mut self, text: &str, color: Color) -> TextureHandle {
        let rasterizer = &mut self.rasterizer;
        self.cache
            .get_or_insert_with(TextureKey::new(text, color), |key| rasterizer.rasterize(&key.text, key.color))
    }

    pub fn create_neon_sign<R: RandomSource + ?Sized>(&mut self, rng: &mut R, options: SignOptions) -> NeonSign {
        let text = options
            .text
            .unwrap_or_else(|| random_text(rng, self.language).to_string());
        let color = options.color.unwrap_or_else(|| self.random_color(rng));
        let template = options.template.unwrap_or_else(|| self.random_template(rng));
        let dimensions = self.catalog.get(template);

        let texture = self.create_text_texture(&text, color);
        log::debug!("Neon sign {:?} ({}, {})", text, template, color);

        NeonSign {
            texture_key: TextureKey::new(text.clone(), color),
            text,
            color,
            template,
            dimensions,
            position: options.position.unwrap_or(Vec3::ZERO),
            rotation: options.rotation.unwrap_or(Vec3::ZERO),
            texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::{Constant, Scripted};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn factory() -> NeonSignFactory {
        NeonSignFactory::new(
            GlowStyle {
                width: 64,
                height: 32,
                font_px: 10.0,
                max_fill: 0.9,
            },
            TextLanguage::Mixed,
        )
    }

    #[test]
    fn identical_text_and_color_share_one_texture() {
        let mut signs = factory();
        let color = Color::from_hex(0xff3366);
        let a = signs.create_text_texture("寿司", color);
        let b = signs.create_text_texture("寿司", color);
        assert!(Arc::ptr_eq(&a, &b));
        // One texture, six passes, no matter how often it is requested.
        assert_eq!(signs.rasterizer().textures_drawn(), 1);
        assert_eq!(signs.rasterizer().passes_drawn(), 6);
        assert_eq!(signs.cache().stats().hits, 1);
    }

    #[test]
    fn explicit_options_draw_nothing_random() {
        let mut signs = factory();
        let mut rng = Scripted::new(&[0.5]);
        let sign = signs.create_neon_sign(
            &mut rng,
            SignOptions {
                text: Some("OPEN".into()),
                color: Some(Color::from_hex(0x00ffcc)),
                template: Some(TemplateKind::Large),
                position: Some(Vec3::new(1.0, 2.0, 3.0)),
                rotation: Some(Vec3::new(0.0, std::f32::consts::PI, 0.0)),
            },
        );
        assert_eq!(rng.consumed(), 0);
        assert_eq!(sign.text, "OPEN");
        assert_eq!(sign.dimensions, SignTemplate::new(8.0, 2.0, 1.3));
        assert_eq!(sign.transform().position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn mixed_language_splits_seventy_thirty() {
        // Below 0.7 picks the Japanese pool, at or above picks English.
        let mut low = Scripted::new(&[0.69, 0.0]);
        assert_eq!(random_text(&mut low, TextLanguage::Mixed), JAPANESE_TEXTS[0]);
        let mut high = Scripted::new(&[0.7, 0.0]);
        assert_eq!(random_text(&mut high, TextLanguage::Mixed), ENGLISH_TEXTS[0]);
    }

    #[test]
    fn forced_language_uses_one_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(ENGLISH_TEXTS.contains(&random_text(&mut rng, TextLanguage::English)));
            assert!(JAPANESE_TEXTS.contains(&random_text(&mut rng, TextLanguage::Japanese)));
        }
    }

    #[test]
    fn random_fields_come_from_their_pools() {
        let mut signs = factory();
        // text pool draw, text index, color index, template index
        let mut rng = Scripted::new(&[0.9, 0.0, 0.99, 0.99]);
        let sign = signs.create_neon_sign(&mut rng, SignOptions::default());
        assert_eq!(sign.text, ENGLISH_TEXTS[0]);
        assert_eq!(sign.color, NEON_PALETTE[7]);
        assert_eq!(sign.template, TemplateKind::Vertical);
        assert_eq!(rng.consumed(), 4);
    }

    #[test]
    fn sign_node_stacks_panel_frame_and_backing() {
        let mut signs = factory();
        let sign = signs.create_neon_sign(
            &mut Constant(0.1),
            SignOptions {
                template: Some(TemplateKind::Small),
                ..Default::default()
            },
        );
        let node = sign.to_node();
        let children = node.children();
        assert_eq!(children.len(), 3);

        let SceneNode::Mesh(panel) = &children[0] else { panic!("panel is not a mesh") };
        assert_eq!(panel.primitive, Primitive::Plane { width: 3.0, height: 1.0 });
        assert_eq!(panel.material.map.as_ref().and_then(|m| m.handle()), Some(&sign.texture));
        assert_eq!(panel.material.emissive_intensity(), 1.1);

        let SceneNode::Mesh(frame) = &children[1] else { panic!("frame is not a mesh") };
        let Primitive::Plane { width, height } = frame.primitive else { panic!("frame is not a plane") };
        assert!((width - 3.2).abs() < 1e-5 && (height - 1.2).abs() < 1e-5);
        assert_eq!(frame.material.color, sign.color);
        assert!(frame.transform.position.z < 0.0);

        let SceneNode::Mesh(backing) = &children[2] else { panic!("backing is not a mesh") };
        let Primitive::Box { width, height, depth } = backing.primitive else { panic!("backing is not a box") };
        assert!((width - 3.3).abs() < 1e-5 && (height - 1.3).abs() < 1e-5 && depth == 0.1);
        assert!(backing.transform.position.z < frame.transform.position.z);
    }

    #[test]
    fn empty_palette_is_ignored() {
        let signs = factory().with_palette(Vec::new());
        let mut rng = Constant(0.0);
        assert_eq!(signs.random_color(&mut rng), NEON_PALETTE[0]);
    }
}
