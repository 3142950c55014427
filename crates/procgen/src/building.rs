//! Building generation: one box volume plus a lattice of lit windows on all four faces.

use crate::random::RandomSource;
use engine_core::{Color, GroupNode, Material, MeshNode, Primitive, SceneNode, Transform};
use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

/// Spacing between window centers, both across and up a face.
pub const WINDOW_SPACING: f32 = 1.5;
/// Side length of a square window quad.
pub const WINDOW_SIZE: f32 = 0.6;
/// Height of the first window row above the base.
const FIRST_ROW_Y: f32 = 1.0;
/// Outward offset so windows never share a plane with the wall.
const WINDOW_STANDOFF: f32 = 0.01;
/// Share of lattice cells left dark.
pub const DARK_WINDOW_CHANCE: f32 = 0.3;
const MIN_WINDOW_BRIGHTNESS: f32 = 0.1;
const MAX_WINDOW_BRIGHTNESS: f32 = 0.4;

const DEFAULT_WIDTH: (f32, f32) = (5.0, 10.0);
const DEFAULT_DEPTH: (f32, f32) = (5.0, 10.0);
const DEFAULT_HEIGHT: (f32, f32) = (5.0, 25.0);

/// Concrete-and-glass facade presets.
pub fn building_palette() -> [Material; 4] {
    [0x333344, 0x444455, 0x222233, 0x555566].map(|hex| Material::standard(Color::from_hex(hex)).with_roughness(0.7))
}

/// Warm office glow. Each window gets its own emissive intensity on top of this.
pub fn window_material(brightness: f32) -> Material {
    let warm = Color::from_hex(0xffffcc);
    Material::standard(warm).with_emissive(warm, brightness).with_opacity(0.8)
}

/// Building faces, in the order windows are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
    Right,
    Left,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::Front, Face::Back, Face::Right, Face::Left];

    /// Rotation about Y that turns a +Z-facing quad to face outward from this side.
    pub fn yaw(self) -> f32 {
        match self {
            Face::Front => 0.0,
            Face::Back => PI,
            Face::Right => FRAC_PI_2,
            Face::Left => -FRAC_PI_2,
        }
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vec3 {
        match self {
            Face::Front => Vec3::Z,
            Face::Back => Vec3::NEG_Z,
            Face::Right => Vec3::X,
            Face::Left => Vec3::NEG_X,
        }
    }

    /// Whether windows on this face spread along X (front/back) or Z (sides).
    pub fn spans_width(self) -> bool {
        matches!(self, Face::Front | Face::Back)
    }
}

/// Overrides for [`BuildingFactory::create_building`]. Unset numeric fields are drawn uniformly:
/// width and depth in `[5, 10)`, height in `[5, 25)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingOptions {
    pub width: Option<f32>,
    pub depth: Option<f32>,
    pub height: Option<f32>,
    /// Base (ground-level center) of the building. Defaults to the origin.
    pub position: Option<Vec3>,
    pub material: Option<Material>,
    /// Defaults to `true`.
    pub windows: Option<bool>,
}

/// One lit window, in building-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub face: Face,
    pub row: u32,
    pub col: u32,
    pub position: Vec3,
    pub brightness: f32,
}

/// Lattice dimensions for a building footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGrid {
    pub rows: u32,
    pub cols_front_back: u32,
    pub cols_side: u32,
}

impl WindowGrid {
    pub fn for_size(width: f32, depth: f32, height: f32) -> Self {
        Self {
            rows: (height / 2.0).floor().max(0.0) as u32,
            cols_front_back: (width / WINDOW_SPACING).floor().max(0.0) as u32,
            cols_side: (depth / WINDOW_SPACING).floor().max(0.0) as u32,
        }
    }

    pub fn cols(&self, face: Face) -> u32 {
        if face.spans_width() {
            self.cols_front_back
        } else {
            self.cols_side
        }
    }

    /// Window count if no cell were left dark.
    pub fn capacity(&self) -> u32 {
        self.rows * (2 * self.cols_front_back + 2 * self.cols_side)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    /// Ground-level center.
    pub position: Vec3,
    pub material: Material,
    pub windows: Vec<Window>,
}

impl Building {
    pub fn window_grid(&self) -> WindowGrid {
        WindowGrid::for_size(self.width, self.depth, self.height)
    }

    /// Structure and windows under one group placed at the building's base.
    pub fn to_node(&self, name: impl Into<String>) -> SceneNode {
        let mut group = GroupNode::new(name).with_transform(Transform::from_position(self.position));
        group.push(
            MeshNode::new(
                "structure",
                Primitive::Box {
                    width: self.width,
                    height: self.height,
                    depth: self.depth,
                },
                self.material.clone(),
            )
            .at(Vec3::new(0.0, self.height / 2.0, 0.0)),
        );
        for window in &self.windows {
            group.push(
                MeshNode::new(
                    "window",
                    Primitive::Plane {
                        width: WINDOW_SIZE,
                        height: WINDOW_SIZE,
                    },
                    window_material(window.brightness),
                )
                .with_transform(Transform::from_position_rotation(
                    window.position,
                    Quat::from_rotation_y(window.face.yaw()),
                )),
            );
        }
        group.into()
    }
}

#[derive(Debug, Clone)]
pub struct BuildingFactory {
    palette: [Material; 4],
}

impl Default for BuildingFactory {
    fn default() -> Self {
        Self {
            palette: building_palette(),
        }
    }
}

impl BuildingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn palette(&self) -> &[Material] {
        &self.palette
    }

    /// Build one building. Draw order: width, depth, height, material, then per window cell
    /// a dark-or-lit draw followed by a brightness draw for lit cells.
    pub fn create_building<R: RandomSource + ?Sized>(&self, rng: &mut R, options: BuildingOptions) -> Building {
        let width = options.width.unwrap_or_else(|| rng.range(DEFAULT_WIDTH.0, DEFAULT_WIDTH.1));
        let depth = options.depth.unwrap_or_else(|| rng.range(DEFAULT_DEPTH.0, DEFAULT_DEPTH.1));
        let height = options.height.unwrap_or_else(|| rng.range(DEFAULT_HEIGHT.0, DEFAULT_HEIGHT.1));
        let material = options.material.unwrap_or_else(|| rng.pick(&self.palette).clone());

        let windows = if options.windows.unwrap_or(true) {
            lay_out_windows(rng, width, depth, height)
        } else {
            Vec::new()
        };

        log::trace!(
            "Building {:.1}x{:.1}x{:.1} with {} lit windows",
            width,
            depth,
            height,
            windows.len()
        );

        Building {
            width,
            depth,
            height,
            position: options.position.unwrap_or(Vec3::ZERO),
            material,
            windows,
        }
    }
}

fn lay_out_windows<R: RandomSource + ?Sized>(rng: &mut R, width: f32, depth: f32, height: f32) -> Vec<Window> {
    let grid = WindowGrid::for_size(width, depth, height);
    let mut windows = Vec::with_capacity(grid.capacity() as usize);

    for face in Face::ALL {
        let cols = grid.cols(face);
        // Distance from the center to the face plane, plus the anti z-fighting nudge.
        let half_extent = if face.spans_width() { depth } else { width } / 2.0 + WINDOW_STANDOFF;
        let normal = face.normal();

        for row in 0..grid.rows {
            for col in 0..cols {
                if rng.chance(DARK_WINDOW_CHANCE) {
                    continue;
                }
                let lateral = col as f32 * WINDOW_SPACING - (cols as f32 - 1.0) * WINDOW_SPACING / 2.0;
                let y = row as f32 * WINDOW_SPACING + FIRST_ROW_Y;
                let position = if face.spans_width() {
                    Vec3::new(lateral, y, normal.z * half_extent)
                } else {
                    Vec3::new(normal.x * half_extent, y, lateral)
                };
                windows.push(Window {
                    face,
                    row,
                    col,
                    position,
                    brightness: rng.range(MIN_WINDOW_BRIGHTNESS, MAX_WINDOW_BRIGHTNESS),
                });
            }
        }
    }
    windows
}
