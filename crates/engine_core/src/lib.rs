//! Core engine types shared by every Neon City crate.
//!
//! This crate provides the foundational types the generators produce and the viewer consumes:
//! - Transform and spatial helpers
//! - The scene graph (groups, meshes, lights) and material descriptions
//! - RGBA texture buffers for generated images
//! - The seam to the external asset loader

pub mod assets;
pub mod color;
pub mod material;
pub mod scene;
pub mod texture;
pub mod transform;

pub use assets::*;
pub use color::*;
pub use material::*;
pub use scene::*;
pub use texture::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
