//! CPU-side RGBA images produced by the generators (glow text and friends).

use serde::Serialize;
use std::sync::Arc;

/// RGBA pixel, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: (r.clamp(0.0, 1.0) * 255.0).round() as u8,
            g: (g.clamp(0.0, 1.0) * 255.0).round() as u8,
            b: (b.clamp(0.0, 1.0) * 255.0).round() as u8,
            a: (a.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A generated image. Starts fully transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Pixel>,
}

/// Shared, identity-comparable handle to a generated image.
pub type TextureHandle = Arc<TextureData>;

impl TextureData {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.pixels[i] = pixel;
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Pixel {
        if x < self.width && y < self.height {
            self.pixels[self.index(x, y)]
        } else {
            Pixel::TRANSPARENT
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Number of pixels with any coverage at all.
    pub fn opaque_pixel_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0).count()
    }

    /// Tightly packed RGBA8 bytes, row-major from the top-left corner.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&pixel.to_bytes());
        }
        bytes
    }
}

/// Reference from a material to an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TextureRef {
    /// Image generated in-process. Serialized by its cache key only.
    Generated {
        key: String,
        #[serde(skip)]
        data: TextureHandle,
    },
    /// Opaque URL resolved by the external loader.
    External(String),
}

impl TextureRef {
    pub fn generated(key: impl Into<String>, data: TextureHandle) -> Self {
        Self::Generated { key: key.into(), data }
    }

    /// The in-process image, if this reference points at one.
    pub fn handle(&self) -> Option<&TextureHandle> {
        match self {
            Self::Generated { data, .. } => Some(data),
            Self::External(_) => None,
        }
    }
}
