//! City layout: ground, road, streetlights, and a grid of buildings dressed with neon signs.
//!
//! The road runs along X through the middle of the grid. Plots in the road row are skipped and
//! the remaining rows are pushed outward so buildings line both kerbs.

use crate::building::{Building, BuildingFactory, BuildingOptions, Face};
use crate::neon_sign::{NeonSign, NeonSignFactory, SignOptions};
use crate::random::RandomSource;
use crate::sign_templates::{TemplateKind, UnknownTemplate};
use engine_core::{Color, Fog, Light, LightNode, Material, MeshNode, Primitive, SceneGraph, Transform};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Order in which a sign's face draw indexes the building sides.
const SIGN_FACES: [Face; 4] = [Face::Front, Face::Right, Face::Back, Face::Left];

/// Tunables for [`CityLayoutGenerator`]. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Plots per side; plot indices run over `-grid_size/2 .. grid_size/2`.
    pub grid_size: u32,
    /// Distance between neighbouring plot centers.
    pub block_size: f32,
    /// Extra push away from the road for plots either side of it.
    pub road_offset: f32,
    pub road_width: f32,
    pub ground_size: f32,
    pub ground_color: Color,
    pub road_color: Color,
    pub background: Color,
    pub fog_density: f32,
    pub ambient_color: Color,

    pub streetlight_spacing: f32,
    /// Streetlights span `-extent ..= extent` along the road.
    pub streetlight_extent: f32,
    pub streetlight_height: f32,
    pub streetlight_color: Color,
    pub streetlight_intensity: f32,
    pub streetlight_range: f32,

    pub min_building_height: f32,
    /// Heights are `min + floor(r * spread)`.
    pub building_height_spread: f32,
    pub min_footprint: f32,
    pub footprint_spread: f32,

    pub max_signs_per_building: u32,
    /// Lowest sign height; the same clearance is kept below the roof.
    pub sign_clearance: f32,
    /// Gap between a sign and the wall it hangs on.
    pub sign_standoff: f32,
    /// Keeps signs this far from the vertical edges of a face.
    pub sign_edge_margin: f32,
    pub vertical_sign_chance: f32,
    /// Among non-vertical signs, share that are `small` rather than `medium`.
    pub small_sign_chance: f32,
    /// Template names hung for the vertical, small and wide sign draws. Unknown names fall
    /// back to `vertical`, `small` and `medium`.
    pub vertical_sign_template: String,
    pub small_sign_template: String,
    pub wide_sign_template: String,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            grid_size: 6,
            block_size: 15.0,
            road_offset: 8.0,
            road_width: 16.0,
            ground_size: 150.0,
            ground_color: Color::from_hex(0x111111),
            road_color: Color::from_hex(0x222222),
            background: Color::from_hex(0x050510),
            fog_density: 0.015,
            ambient_color: Color::from_hex(0x101020),

            streetlight_spacing: 15.0,
            streetlight_extent: 45.0,
            streetlight_height: 6.0,
            streetlight_color: Color::from_hex(0xffffaa),
            streetlight_intensity: 0.8,
            streetlight_range: 30.0,

            min_building_height: 5.0,
            building_height_spread: 20.0,
            min_footprint: 8.0,
            footprint_spread: 4.0,

            max_signs_per_building: 3,
            sign_clearance: 3.0,
            sign_standoff: 0.1,
            sign_edge_margin: 1.0,
            vertical_sign_chance: 0.3,
            small_sign_chance: 0.7,
            vertical_sign_template: TemplateKind::Vertical.name().to_string(),
            small_sign_template: TemplateKind::Small.name().to_string(),
            wide_sign_template: TemplateKind::Medium.name().to_string(),
        }
    }
}

impl CityConfig {
    /// Plot indices along one axis.
    pub fn plot_range(&self) -> std::ops::Range<i32> {
        let half = self.grid_size as i32 / 2;
        -half..(self.grid_size as i32 - half)
    }

    /// Streetlight positions along the road, `-extent ..= extent` in `spacing` steps.
    pub fn streetlight_xs(&self) -> Vec<f32> {
        if self.streetlight_spacing <= 0.0 {
            log::warn!("Streetlight spacing {} is not positive, no streetlights placed", self.streetlight_spacing);
            return Vec::new();
        }
        let steps = (self.streetlight_extent / self.streetlight_spacing).floor() as i32;
        (-steps..=steps).map(|i| i as f32 * self.streetlight_spacing).collect()
    }

    /// Resolve the configured sign template names, warning about unknown ones.
    pub fn sign_templates(&self) -> SignTemplateChoice {
        SignTemplateChoice {
            vertical: template_or(&self.vertical_sign_template, TemplateKind::Vertical),
            small: template_or(&self.small_sign_template, TemplateKind::Small),
            wide: template_or(&self.wide_sign_template, TemplateKind::Medium),
        }
    }
}

/// Templates behind the three sign draws of [`CityLayoutGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignTemplateChoice {
    pub vertical: TemplateKind,
    pub small: TemplateKind,
    pub wide: TemplateKind,
}

fn template_or(name: &str, fallback: TemplateKind) -> TemplateKind {
    name.parse().unwrap_or_else(|e: UnknownTemplate| {
        log::warn!("{}, using {}", e, fallback);
        fallback
    })
}

/// Grid cell indices of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Plot {
    pub x: i32,
    pub z: i32,
}

impl Plot {
    /// Plots in the road row stay empty.
    pub fn is_road(&self) -> bool {
        self.z.abs() < 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityBlock {
    pub plot: Plot,
    pub building: Building,
}

/// A sign and the building face it hangs on.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSign {
    /// Index into [`CityScene::blocks`].
    pub building: usize,
    pub face: Face,
    pub sign: NeonSign,
}

/// Point light on a pole.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetLight {
    pub light: LightNode,
    pub pole: MeshNode,
}

/// Everything [`CityLayoutGenerator::generate`] produces, before it is flattened into a scene.
#[derive(Debug, Clone)]
pub struct CityScene {
    pub background: Color,
    pub fog: Fog,
    pub ambient: LightNode,
    pub ground: MeshNode,
    pub road: MeshNode,
    pub streetlights: Vec<StreetLight>,
    pub blocks: Vec<CityBlock>,
    pub signs: Vec<PlacedSign>,
}

impl CityScene {
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.blocks.iter().map(|block| &block.building)
    }

    pub fn to_scene_graph(&self) -> SceneGraph {
        let mut graph = SceneGraph::new(self.background, Some(self.fog));
        graph.add(self.ambient.clone());
        graph.add(self.ground.clone());
        graph.add(self.road.clone());
        for streetlight in &self.streetlights {
            graph.add(streetlight.light.clone());
            graph.add(streetlight.pole.clone());
        }
        graph.extend(self.blocks.iter().map(|block| {
            block
                .building
                .to_node(format!("building:{},{}", block.plot.x, block.plot.z))
        }));
        graph.extend(self.signs.iter().map(|placed| placed.sign.to_node()));
        graph
    }
}

/// Lays out one city. Owns the factories, so the sign texture cache lives as long as the
/// generator and is shared by every sign it places.
#[derive(Debug)]
pub struct CityLayoutGenerator {
    config: CityConfig,
    templates: SignTemplateChoice,
    buildings: BuildingFactory,
    signs: NeonSignFactory,
}

impl CityLayoutGenerator {
    pub fn new(config: CityConfig, signs: NeonSignFactory) -> Self {
        Self {
            templates: config.sign_templates(),
            config,
            buildings: BuildingFactory::new(),
            signs,
        }
    }

    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    pub fn sign_factory(&self) -> &NeonSignFactory {
        &self.signs
    }

    /// Generate the city. Identical random streams give identical cities.
    pub fn generate<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> CityScene {
        let streetlights = self.streetlights();
        let plots = self.config.plot_range();

        let mut blocks = Vec::new();
        let mut signs = Vec::new();
        for x in plots.clone() {
            for z in plots.clone() {
                let plot = Plot { x, z };
                if plot.is_road() {
                    continue;
                }
                let block = self.place_building(rng, plot);
                self.dress_building(rng, blocks.len(), &block.building, &mut signs);
                blocks.push(block);
            }
        }

        let cfg = &self.config;
        let scene = CityScene {
            background: cfg.background,
            fog: Fog {
                color: cfg.background,
                density: cfg.fog_density,
            },
            ambient: LightNode::new("ambient", Light::Ambient { color: cfg.ambient_color }),
            ground: flat_strip("ground", cfg.ground_size, cfg.ground_size, cfg.ground_color, 0.8, -0.1),
            road: flat_strip("road", cfg.ground_size, cfg.road_width, cfg.road_color, 0.9, 0.0),
            streetlights,
            blocks,
            signs,
        };

        log::info!(
            "Generated city: {} buildings, {} signs, {} streetlights, {} glow textures",
            scene.blocks.len(),
            scene.signs.len(),
            scene.streetlights.len(),
            self.signs.cache().len()
        );
        scene
    }

    fn streetlights(&self) -> Vec<StreetLight> {
        let cfg = &self.config;
        let pole_height = cfg.streetlight_height;
        let mut lights = Vec::new();
        for x in cfg.streetlight_xs() {
            for z in [-cfg.road_offset, cfg.road_offset] {
                let light = LightNode::new(
                    "streetlight",
                    Light::Point {
                        color: cfg.streetlight_color,
                        intensity: cfg.streetlight_intensity,
                        range: cfg.streetlight_range,
                    },
                )
                .at(Vec3::new(x, pole_height, z));
                let pole = MeshNode::new(
                    "streetlight_pole",
                    Primitive::Cylinder {
                        radius_top: 0.1,
                        radius_bottom: 0.1,
                        height: pole_height,
                        segments: 6,
                    },
                    Material::standard(Color::from_hex(0x333333)),
                )
                .at(Vec3::new(x, pole_height / 2.0, z));
                lights.push(StreetLight { light, pole });
            }
        }
        lights
    }

    /// Draw order: height, width, depth, then whatever the building factory draws.
    fn place_building<R: RandomSource + ?Sized>(&self, rng: &mut R, plot: Plot) -> CityBlock {
        let cfg = &self.config;
        let push = if plot.z > 0 { cfg.road_offset } else { -cfg.road_offset };
        let position = Vec3::new(
            plot.x as f32 * cfg.block_size,
            0.0,
            plot.z as f32 * cfg.block_size + push,
        );

        let height = cfg.min_building_height + (rng.next_f32() * cfg.building_height_spread).floor();
        let width = rng.range(cfg.min_footprint, cfg.min_footprint + cfg.footprint_spread);
        let depth = rng.range(cfg.min_footprint, cfg.min_footprint + cfg.footprint_spread);

        let building = self.buildings.create_building(
            rng,
            BuildingOptions {
                width: Some(width),
                depth: Some(depth),
                height: Some(height),
                position: Some(position),
                ..Default::default()
            },
        );
        log::debug!(
            "Plot ({}, {}): {:.1}x{:.1}x{:.0} building at {:?}",
            plot.x,
            plot.z,
            width,
            depth,
            height,
            position
        );
        CityBlock { plot, building }
    }

    /// Hang 1..=max signs on random faces of `building`.
    fn dress_building<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        index: usize,
        building: &Building,
        out: &mut Vec<PlacedSign>,
    ) {
        let cfg = &self.config;
        let count = rng.index(cfg.max_signs_per_building.max(1) as usize) + 1;
        for _ in 0..count {
            let face = *rng.pick(&SIGN_FACES);
            let height = cfg.sign_clearance + rng.next_f32() * (building.height - 2.0 * cfg.sign_clearance);
            let template = if rng.chance(cfg.vertical_sign_chance) {
                self.templates.vertical
            } else if rng.chance(cfg.small_sign_chance) {
                self.templates.small
            } else {
                self.templates.wide
            };
            let position = sign_anchor(
                building,
                face,
                height,
                rng.next_f32() - 0.5,
                cfg.sign_standoff,
                cfg.sign_edge_margin,
            );

            let sign = self.signs.create_neon_sign(
                rng,
                SignOptions {
                    template: Some(template),
                    position: Some(position),
                    rotation: Some(Vec3::new(0.0, face.yaw(), 0.0)),
                    ..Default::default()
                },
            );
            out.push(PlacedSign {
                building: index,
                face,
                sign,
            });
        }
    }
}

/// World position of a sign on `face`, `lateral ∈ [-0.5, 0.5)` of the usable face width.
fn sign_anchor(building: &Building, face: Face, height: f32, lateral: f32, standoff: f32, margin: f32) -> Vec3 {
    let base = building.position;
    let normal = face.normal();
    if face.spans_width() {
        Vec3::new(
            base.x + lateral * (building.width - 2.0 * margin),
            height,
            base.z + normal.z * (building.depth / 2.0 + standoff),
        )
    } else {
        Vec3::new(
            base.x + normal.x * (building.width / 2.0 + standoff),
            height,
            base.z + lateral * (building.depth - 2.0 * margin),
        )
    }
}

/// Horizontal plane lying on the XZ plane at height `y`.
fn flat_strip(name: &str, width: f32, length: f32, color: Color, roughness: f32, y: f32) -> MeshNode {
    MeshNode::new(
        name,
        Primitive::Plane { width, height: length },
        Material::standard(color).with_roughness(roughness),
    )
    .with_transform(Transform::from_position_rotation(
        Vec3::new(0.0, y, 0.0),
        Quat::from_rotation_x(-FRAC_PI_2),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glow::GlowStyle;
    use crate::neon_sign::TextLanguage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator() -> CityLayoutGenerator {
        let signs = NeonSignFactory::new(
            GlowStyle {
                width: 32,
                height: 16,
                font_px: 6.0,
                max_fill: 0.9,
            },
            TextLanguage::Mixed,
        );
        CityLayoutGenerator::new(CityConfig::default(), signs)
    }

    fn generate(seed: u64) -> CityScene {
        generator().generate(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn default_grid_fills_thirty_plots() {
        let city = generate(1);
        assert_eq!(city.blocks.len(), 30);
        assert!(city.blocks.iter().all(|b| !b.plot.is_road()));
        // The nearest rows sit one block plus the road push away from the center line.
        assert!(city.buildings().all(|b| b.position.z.abs() >= 23.0));
    }

    #[test]
    fn same_seed_same_city() {
        let a = generate(42);
        let b = generate(42);
        assert_eq!(a.blocks, b.blocks);
        assert_eq!(a.signs.len(), b.signs.len());
        for (sa, sb) in a.signs.iter().zip(&b.signs) {
            assert_eq!(sa.sign.text, sb.sign.text);
            assert_eq!(sa.sign.color, sb.sign.color);
            assert_eq!(sa.sign.position, sb.sign.position);
        }
    }

    #[test]
    fn building_dimensions_follow_plot_draws() {
        let city = generate(7);
        for building in city.buildings() {
            assert_eq!(building.height, building.height.floor());
            assert!((5.0..25.0).contains(&building.height));
            assert!((8.0..12.0).contains(&building.width));
            assert!((8.0..12.0).contains(&building.depth));
        }
    }

    #[test]
    fn every_building_gets_one_to_three_signs() {
        let city = generate(3);
        for index in 0..city.blocks.len() {
            let count = city.signs.iter().filter(|s| s.building == index).count();
            assert!((1..=3).contains(&count), "building {index} has {count} signs");
        }
    }

    #[test]
    fn signs_hang_flush_with_their_face() {
        let city = generate(9);
        for placed in &city.signs {
            let b = &city.blocks[placed.building].building;
            let p = placed.sign.position;
            let local = p - b.position;
            match placed.face {
                Face::Front | Face::Back => {
                    assert!((local.z.abs() - (b.depth / 2.0 + 0.1)).abs() < 1e-3);
                    assert!(local.x.abs() <= b.width / 2.0 - 1.0 + 1e-3);
                }
                Face::Right | Face::Left => {
                    assert!((local.x.abs() - (b.width / 2.0 + 0.1)).abs() < 1e-3);
                    assert!(local.z.abs() <= b.depth / 2.0 - 1.0 + 1e-3);
                }
            }
            assert_eq!(placed.sign.rotation, Vec3::new(0.0, placed.face.yaw(), 0.0));
            assert_ne!(placed.sign.template, TemplateKind::Large);
        }
    }

    #[test]
    fn fourteen_streetlights_line_the_road() {
        let city = generate(5);
        assert_eq!(city.streetlights.len(), 14);
        for streetlight in &city.streetlights {
            let light = streetlight.light.transform.position;
            let pole = streetlight.pole.transform.position;
            assert_eq!(light.y, 6.0);
            assert_eq!(pole.y, 3.0);
            assert_eq!(light.z.abs(), 8.0);
            assert_eq!((light.x, light.z), (pole.x, pole.z));
        }
    }

    #[test]
    fn repeated_text_and_color_reuse_textures() {
        let mut generator = generator();
        let city = generator.generate(&mut StdRng::seed_from_u64(12));
        let cache = generator.sign_factory().cache();
        assert!(cache.len() <= city.signs.len());
        assert_eq!(generator.sign_factory().rasterizer().textures_drawn() as usize, cache.len());
    }

    #[test]
    fn scene_graph_holds_every_part() {
        let city = generate(2);
        let graph = city.to_scene_graph();
        let expected_roots = 3 + 2 * city.streetlights.len() + city.blocks.len() + city.signs.len();
        assert_eq!(graph.nodes.len(), expected_roots);
        assert_eq!(graph.background, Color::from_hex(0x050510));
        assert_eq!(graph.fog.map(|f| f.density), Some(0.015));

        let stats = graph.stats();
        // Ambient plus one point light per streetlight.
        assert_eq!(stats.lights, 1 + city.streetlights.len());
    }

    #[test]
    fn sign_templates_come_from_config_names() {
        let config: CityConfig =
            ron::from_str(r#"(vertical_sign_chance: 0.0, small_sign_chance: 0.0, wide_sign_template: "large")"#)
                .unwrap();
        let mut generator = CityLayoutGenerator::new(config, generator().signs);
        let city = generator.generate(&mut StdRng::seed_from_u64(4));
        assert!(!city.signs.is_empty());
        assert!(city.signs.iter().all(|placed| placed.sign.template == TemplateKind::Large));
    }

    #[test]
    fn unknown_template_names_fall_back() {
        let config = CityConfig {
            vertical_sign_template: "tall".into(),
            small_sign_template: "Small".into(),
            wide_sign_template: "vertical".into(),
            ..Default::default()
        };
        assert_eq!(
            config.sign_templates(),
            SignTemplateChoice {
                vertical: TemplateKind::Vertical,
                small: TemplateKind::Small,
                wide: TemplateKind::Vertical,
            }
        );
    }

    #[test]
    fn config_reads_partial_ron() {
        let config: CityConfig = ron::from_str("(grid_size: 4, ground_color: \"#203040\")").unwrap();
        assert_eq!(config.grid_size, 4);
        assert_eq!(config.ground_color, Color::from_hex(0x203040));
        assert_eq!(config.block_size, 15.0);
        assert_eq!(config.plot_range(), -2..2);
    }
}
