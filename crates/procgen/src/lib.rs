//! Procedural generation for the neon city: buildings, neon signs and their glow textures,
//! and the city layout that places them.

pub mod building;
pub mod city;
pub mod glow;
pub mod glyphs;
pub mod neon_sign;
pub mod random;
pub mod sign_templates;
pub mod texture_cache;

pub use building::*;
pub use city::*;
pub use glow::*;
pub use glyphs::*;
pub use neon_sign::*;
pub use random::*;
pub use sign_templates::*;
pub use texture_cache::*;
