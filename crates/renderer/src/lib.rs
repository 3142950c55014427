//! Orbit camera, scene ownership and the render backend seam.

pub mod assembler;
pub mod camera;

pub use assembler::*;
pub use camera::*;
