//! Neon glow-text rasterization.
//!
//! Emulates a 2D canvas drawing text with `shadowBlur`: several colored passes with a wide,
//! shrinking blur and rising opacity build the halo, then a white pass with a tight colored
//! shadow lays down the bright core.

use crate::glyphs::layout_coverage;
use engine_core::{Color, Pixel, TextureData};

/// Intensity steps of the halo passes: 15, 12, 9, 6, 3.
pub fn glow_steps() -> impl Iterator<Item = u32> {
    (1..=15).rev().step_by(3)
}

/// Blur of the final white core pass.
const CORE_BLUR: f32 = 10.0;
/// Surface width the blur radii are specified against.
const REFERENCE_WIDTH: f32 = 512.0;

/// Surface and type settings for sign textures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowStyle {
    pub width: u32,
    pub height: u32,
    /// Nominal glyph height in surface pixels.
    pub font_px: f32,
    /// Fraction of the surface the text may span before it is shrunk.
    pub max_fill: f32,
}

impl Default for GlowStyle {
    fn default() -> Self {
        Self {
            width: 512,
            height: 256,
            font_px: 80.0,
            max_fill: 0.9,
        }
    }
}

impl GlowStyle {
    /// Blur radii are tuned for a 512px surface; smaller surfaces scale them down.
    fn blur_scale(&self) -> f32 {
        self.width as f32 / REFERENCE_WIDTH
    }
}

/// Draws glow-text images. Keeps counters so callers can check how much work was done.
#[derive(Debug, Default)]
pub struct GlowRasterizer {
    style: GlowStyle,
    passes_drawn: u64,
    textures_drawn: u64,
}

impl GlowRasterizer {
    pub fn new(style: GlowStyle) -> Self {
        Self {
            style,
            passes_drawn: 0,
            textures_drawn: 0,
        }
    }

    pub fn style(&self) -> &GlowStyle {
        &self.style
    }

    /// Total drawing passes executed (halo passes + core pass per texture).
    pub fn passes_drawn(&self) -> u64 {
        self.passes_drawn
    }

    pub fn textures_drawn(&self) -> u64 {
        self.textures_drawn
    }

    /// Rasterize `text` glowing in `color` onto a fresh transparent surface.
    pub fn rasterize(&mut self, text: &str, color: Color) -> TextureData {
        let style = self.style;
        let (w, h) = (style.width as usize, style.height as usize);
        let mask = layout_coverage(text, style.width, style.height, style.font_px, style.max_fill);
        let mut canvas = Canvas::new(w, h);
        let rgb = color.to_vec3();
        let scale = style.blur_scale();

        for i in glow_steps() {
            let alpha = (i as f32 / 10.0).min(1.0);
            let blurred = gaussian_blur(&mask, w, h, (30.0 + i as f32) * scale / 2.0);
            canvas.draw(&blurred, [rgb.x, rgb.y, rgb.z], alpha);
            canvas.draw(&mask, [rgb.x, rgb.y, rgb.z], alpha);
            self.passes_drawn += 1;
        }

        let core_shadow = gaussian_blur(&mask, w, h, CORE_BLUR * scale / 2.0);
        canvas.draw(&core_shadow, [rgb.x, rgb.y, rgb.z], 1.0);
        canvas.draw(&mask, [1.0, 1.0, 1.0], 1.0);
        self.passes_drawn += 1;
        self.textures_drawn += 1;

        log::trace!("Rasterized glow text {:?} in {} ({}x{})", text, color, w, h);
        canvas.into_texture(style.width, style.height)
    }
}

/// Premultiplied RGBA float surface with source-over compositing.
struct Canvas {
    width: usize,
    height: usize,
    data: Vec<[f32; 4]>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![[0.0; 4]; width * height],
        }
    }

    /// Composite `rgb` at `alpha × coverage` over the surface.
    fn draw(&mut self, coverage: &[f32], rgb: [f32; 3], alpha: f32) {
        for (dst, cov) in self.data.iter_mut().zip(coverage) {
            let a = (cov * alpha).clamp(0.0, 1.0);
            if a <= 0.0 {
                continue;
            }
            let keep = 1.0 - a;
            dst[0] = rgb[0] * a + dst[0] * keep;
            dst[1] = rgb[1] * a + dst[1] * keep;
            dst[2] = rgb[2] * a + dst[2] * keep;
            dst[3] = a + dst[3] * keep;
        }
    }

    fn into_texture(self, width: u32, height: u32) -> TextureData {
        debug_assert_eq!(self.width * self.height, width as usize * height as usize);
        let mut texture = TextureData::new(width, height);
        for (px, src) in texture.pixels.iter_mut().zip(&self.data) {
            let a = src[3];
            *px = if a > 0.0 {
                Pixel::from_rgba(src[0] / a, src[1] / a, src[2] / a, a)
            } else {
                Pixel::TRANSPARENT
            };
        }
        texture
    }
}

/// Three box passes approximating a Gaussian of standard deviation `sigma`.
/// Pixels outside the surface count as transparent.
fn gaussian_blur(mask: &[f32], w: usize, h: usize, sigma: f32) -> Vec<f32> {
    let mut a = mask.to_vec();
    if sigma < 0.5 || w == 0 || h == 0 {
        return a;
    }
    let mut b = vec![0.0f32; a.len()];
    for r in box_radii(sigma) {
        blur_horizontal(&a, &mut b, w, h, r);
        blur_vertical(&b, &mut a, w, h, r);
    }
    a
}

/// Box radii whose three successive passes match the variance of `sigma`.
fn box_radii(sigma: f32) -> [usize; 3] {
    const N: f32 = 3.0;
    let ideal = (12.0 * sigma * sigma / N + 1.0).sqrt();
    let mut lower = ideal.floor() as i32;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;
    let (wl, s2) = (lower as f32, sigma * sigma);
    let m = ((12.0 * s2 - N * wl * wl - 4.0 * N * wl - 3.0 * N) / (-4.0 * wl - 4.0)).round() as i32;
    let mut radii = [0usize; 3];
    for (i, r) in radii.iter_mut().enumerate() {
        let width = if (i as i32) < m { lower } else { upper };
        *r = ((width - 1) / 2) as usize;
    }
    radii
}

fn blur_horizontal(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: usize) {
    let norm = 1.0 / (2 * r + 1) as f32;
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        let out = &mut dst[y * w..(y + 1) * w];
        let mut acc: f32 = row[..=r.min(w - 1)].iter().sum();
        for x in 0..w {
            out[x] = acc * norm;
            if x + r + 1 < w {
                acc += row[x + r + 1];
            }
            if x >= r {
                acc -= row[x - r];
            }
        }
    }
}

fn blur_vertical(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: usize) {
    let norm = 1.0 / (2 * r + 1) as f32;
    for x in 0..w {
        let mut acc: f32 = (0..=r.min(h - 1)).map(|y| src[y * w + x]).sum();
        for y in 0..h {
            dst[y * w + x] = acc * norm;
            if y + r + 1 < h {
                acc += src[(y + r + 1) * w + x];
            }
            if y >= r {
                acc -= src[(y - r) * w + x];
            }
        }
    }
}
