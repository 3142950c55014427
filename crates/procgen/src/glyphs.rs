//! Bitmap glyphs and text layout for sign rasterization.
//!
//! Latin, Latin-1 and Hiragana come from the `font8x8` tables. Katakana, kanji and fullwidth
//! forms have no bitmap there, so they get a deterministic per-code-point pattern that keeps
//! the footprint of a CJK character without pretending to be legible.

use font8x8::{UnicodeFonts, BASIC_FONTS, HIRAGANA_FONTS, LATIN_FONTS};

/// Glyph family, picked from the text's script. Affects shapes and spacing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Latin,
    Cjk,
}

impl FontFamily {
    pub fn for_text(text: &str) -> Self {
        if text.chars().any(is_cjk) {
            FontFamily::Cjk
        } else {
            FontFamily::Latin
        }
    }

    /// Horizontal advance per character, in glyph cells (8 cells = one em).
    fn advance_cells(self) -> f32 {
        match self {
            FontFamily::Latin => 8.0,
            FontFamily::Cjk => 9.0,
        }
    }
}

/// CJK punctuation, kana, unified ideographs (incl. extension A) and half/fullwidth forms.
pub fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x3000..=0x303f | 0x3040..=0x309f | 0x30a0..=0x30ff | 0xff00..=0xff9f | 0x4e00..=0x9faf | 0x3400..=0x4dbf
    )
}

/// 8x8 one-bit glyph. Bit 0 of each row is the leftmost pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    rows: [u8; 8],
}

impl Glyph {
    pub fn for_char(c: char) -> Self {
        let rows = BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| HIRAGANA_FONTS.get(c))
            .unwrap_or_else(|| synthetic_rows(c));
        Self { rows }
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < 8 && y < 8 && self.rows[y as usize] & (1 << x) != 0
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|r| *r == 0)
    }
}

/// Stable pseudo-glyph for code points without a bitmap: a framed 6x6 block with
/// hashed interior strokes. Whitespace stays blank.
fn synthetic_rows(c: char) -> [u8; 8] {
    if c.is_whitespace() || c == '\u{3000}' {
        return [0; 8];
    }
    let mut h = (c as u32).wrapping_mul(0x9E37_79B9) ^ 0x5bd1_e995;
    let mut rows = [0u8; 8];
    for (y, row) in rows.iter_mut().enumerate().take(7).skip(1) {
        h ^= h << 13;
        h ^= h >> 17;
        h ^= h << 5;
        *row = (h as u8) & 0b0111_1110;
        if y == 1 || y == 6 {
            *row |= 0b0111_1110;
        }
    }
    // Vertical stroke so every pattern reads as one connected character.
    let column = 1 + (c as u32 % 6) as u8;
    for row in rows.iter_mut().take(7).skip(1) {
        *row |= 1 << column;
    }
    rows
}

/// Coverage mask of `text` laid out centered on a `width`×`height` surface.
///
/// `font_px` is the nominal glyph height. Text wider than `max_fill` of the surface width
/// is scaled down uniformly to fit.
pub fn layout_coverage(text: &str, width: u32, height: u32, font_px: f32, max_fill: f32) -> Vec<f32> {
    let mut mask = vec![0.0f32; width as usize * height as usize];
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || width == 0 || height == 0 {
        return mask;
    }

    let family = FontFamily::for_text(text);
    let advance = family.advance_cells();
    // Trailing gap of the last glyph doesn't count towards the drawn width.
    let text_cells = advance * (chars.len() as f32 - 1.0) + 8.0;

    let mut cell = font_px / 8.0;
    let max_width = width as f32 * max_fill;
    if text_cells * cell > max_width {
        cell = max_width / text_cells;
    }
    let max_height = height as f32 * max_fill;
    if 8.0 * cell > max_height {
        cell = max_height / 8.0;
    }

    let origin_x = (width as f32 - text_cells * cell) / 2.0;
    let origin_y = (height as f32 - 8.0 * cell) / 2.0;

    for (i, c) in chars.iter().enumerate() {
        let glyph = Glyph::for_char(*c);
        if glyph.is_blank() {
            continue;
        }
        let glyph_x = origin_x + i as f32 * advance * cell;
        for gy in 0..8 {
            for gx in 0..8 {
                if !glyph.is_set(gx, gy) {
                    continue;
                }
                let x0 = glyph_x + gx as f32 * cell;
                let y0 = origin_y + gy as f32 * cell;
                fill_rect(&mut mask, width, height, x0, y0, cell, cell);
            }
        }
    }
    mask
}

/// Mark every pixel whose center falls inside the rectangle.
fn fill_rect(mask: &mut [f32], width: u32, height: u32, x0: f32, y0: f32, w: f32, h: f32) {
    let px_start = (x0 - 0.5).ceil().max(0.0) as u32;
    let px_end = ((x0 + w - 0.5).ceil().max(0.0) as u32).min(width);
    let py_start = (y0 - 0.5).ceil().max(0.0) as u32;
    let py_end = ((y0 + h - 0.5).ceil().max(0.0) as u32).min(height);
    for y in py_start..py_end {
        let row = y as usize * width as usize;
        for x in px_start..px_end {
            mask[row + x as usize] = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_cjk_scripts() {
        assert_eq!(FontFamily::for_text("ラーメン"), FontFamily::Cjk);
        assert_eq!(FontFamily::for_text("寿司"), FontFamily::Cjk);
        assert_eq!(FontFamily::for_text("24時間"), FontFamily::Cjk);
        assert_eq!(FontFamily::for_text("CYBER"), FontFamily::Latin);
        assert_eq!(FontFamily::for_text("24H"), FontFamily::Latin);
    }

    #[test]
    fn every_sign_character_has_ink() {
        for c in "居酒屋カラオケBARかわいい".chars() {
            assert!(!Glyph::for_char(c).is_blank(), "{c} rendered blank");
        }
        assert!(Glyph::for_char(' ').is_blank());
    }

    #[test]
    fn synthetic_glyphs_are_stable() {
        assert_eq!(Glyph::for_char('銀'), Glyph::for_char('銀'));
        assert_ne!(Glyph::for_char('銀'), Glyph::for_char('行'));
    }

    #[test]
    fn coverage_is_centered_and_inside_bounds() {
        let (w, h) = (128u32, 64u32);
        let mask = layout_coverage("BAR", w, h, 20.0, 0.9);
        let covered: Vec<(u32, u32)> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|(x, y)| mask[(y * w + x) as usize] > 0.0)
            .collect();
        assert!(!covered.is_empty());

        let mean_x = covered.iter().map(|(x, _)| *x as f32).sum::<f32>() / covered.len() as f32;
        let mean_y = covered.iter().map(|(_, y)| *y as f32).sum::<f32>() / covered.len() as f32;
        assert!((mean_x - w as f32 / 2.0).abs() < 12.0);
        assert!((mean_y - h as f32 / 2.0).abs() < 8.0);
    }

    #[test]
    fn long_text_is_scaled_to_fit() {
        let (w, h) = (64u32, 32u32);
        let mask = layout_coverage("ゲームセンター", w, h, 80.0, 0.9);
        // Nothing in the outer 5% margin columns.
        let margin = (w as f32 * 0.05) as u32;
        for y in 0..h {
            for x in 0..margin {
                assert_eq!(mask[(y * w + x) as usize], 0.0);
            }
        }
    }
}
