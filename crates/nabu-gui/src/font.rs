use std::collections::HashMap;

use crate::math::Vec2;

const ATLAS_WIDTH: u32 = 512;
const GLYPH_PADDING: u32 = 1;

/// Font atlas build parameters.
#[derive(Debug, Clone)]
pub struct FontConfig {
    /// TrueType/OpenType bytes. `None` builds an atlas without glyphs.
    pub data: Option<Vec<u8>>,
    /// Pixel height the glyphs are rasterized at.
    pub size_px: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { data: None, size_px: 15.0 }
    }
}

/// A rasterized glyph placed in the atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    /// Quad offset from the pen position (top of the line), logical px.
    pub offset: Vec2,
    pub size: Vec2,
    pub uv0: [f32; 2],
    pub uv1: [f32; 2],
    pub advance: f32,
}

/// RGBA32 glyph atlas with a white texel block for untextured geometry.
///
/// Built once on the CPU; the platform bridge uploads [`FontAtlas::tex_data_rgba32`]
/// to the GPU and refers to it through [`crate::TextureId::Font`].
pub struct FontAtlas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    glyphs: HashMap<char, Glyph>,
    white_uv: [f32; 2],
    size_px: f32,
    ascent: f32,
    line_height: f32,
    fallback_advance: f32,
}

struct Raster {
    ch: char,
    metrics: fontdue::Metrics,
    coverage: Vec<u8>,
}

impl FontAtlas {
    /// Rasterizes printable ASCII plus Latin-1 into a shelf-packed atlas.
    pub fn build(config: &FontConfig) -> Self {
        let size_px = config.size_px.max(1.0);

        let font = config.data.as_deref().and_then(|bytes| {
            match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
                Ok(f) => Some(f),
                Err(e) => {
                    log::warn!("FontAtlas: failed to parse font data: {e}");
                    None
                }
            }
        });
        if config.data.is_none() {
            log::warn!("FontAtlas: no font data supplied; text will not be rendered");
        }

        let (ascent, line_height) = font
            .as_ref()
            .and_then(|f| f.horizontal_line_metrics(size_px))
            .map(|m| (m.ascent, m.new_line_size))
            .unwrap_or((size_px * 0.8, size_px));

        let rasters: Vec<Raster> = match font.as_ref() {
            Some(f) => (0x20u32..=0x7E)
                .chain(0xA0..=0xFF)
                .filter_map(char::from_u32)
                .filter(|&c| f.lookup_glyph_index(c) != 0 || c == ' ')
                .map(|ch| {
                    let (metrics, coverage) = f.rasterize(ch, size_px);
                    Raster { ch, metrics, coverage }
                })
                .collect(),
            None => Vec::new(),
        };

        // Shelf packing. The 2x2 white block goes first at the origin.
        let mut placements = Vec::with_capacity(rasters.len());
        let mut cursor_x = 2 + GLYPH_PADDING;
        let mut cursor_y = 0;
        let mut row_height = 2;

        for r in &rasters {
            let (w, h) = (r.metrics.width as u32, r.metrics.height as u32);
            if cursor_x + w + GLYPH_PADDING > ATLAS_WIDTH {
                cursor_y += row_height + GLYPH_PADDING;
                cursor_x = 0;
                row_height = 0;
            }
            placements.push((cursor_x, cursor_y));
            cursor_x += w + GLYPH_PADDING;
            row_height = row_height.max(h);
        }

        let height = (cursor_y + row_height + GLYPH_PADDING).next_power_of_two().max(8);
        let width = ATLAS_WIDTH;
        let mut pixels = vec![0u8; (width * height * 4) as usize];

        for y in 0..2 {
            for x in 0..2 {
                let i = ((y * width + x) * 4) as usize;
                pixels[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }

        let (wf, hf) = (width as f32, height as f32);
        let mut glyphs = HashMap::with_capacity(rasters.len());

        for (r, &(gx, gy)) in rasters.iter().zip(&placements) {
            let (w, h) = (r.metrics.width as u32, r.metrics.height as u32);
            for row in 0..h {
                for col in 0..w {
                    let cov = r.coverage[(row * w + col) as usize];
                    let i = (((gy + row) * width + gx + col) * 4) as usize;
                    pixels[i..i + 4].copy_from_slice(&[255, 255, 255, cov]);
                }
            }

            // fontdue reports ymin relative to the baseline, +Y up.
            let top = ascent - (r.metrics.ymin as f32 + h as f32);
            glyphs.insert(
                r.ch,
                Glyph {
                    offset: Vec2::new(r.metrics.xmin as f32, top),
                    size: Vec2::new(w as f32, h as f32),
                    uv0: [gx as f32 / wf, gy as f32 / hf],
                    uv1: [(gx + w) as f32 / wf, (gy + h) as f32 / hf],
                    advance: r.metrics.advance_width,
                },
            );
        }

        log::debug!(
            "FontAtlas: {} glyphs at {size_px}px packed into {width}x{height}",
            glyphs.len()
        );

        Self {
            width,
            height,
            pixels,
            glyphs,
            white_uv: [1.0 / wf, 1.0 / hf],
            size_px,
            ascent,
            line_height,
            fallback_advance: size_px * 0.5,
        }
    }

    /// Returns `(width, height, rgba_pixels)`.
    pub fn tex_data_rgba32(&self) -> (u32, u32, &[u8]) {
        (self.width, self.height, &self.pixels)
    }

    #[inline]
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    #[inline]
    pub fn white_uv(&self) -> [f32; 2] {
        self.white_uv
    }

    #[inline]
    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    #[inline]
    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn advance(&self, c: char) -> f32 {
        self.glyph(c).map_or(self.fallback_advance, |g| g.advance)
    }

    /// Size of `text` laid out on `\n`-separated lines.
    pub fn calc_text_size(&self, text: &str) -> Vec2 {
        let mut width: f32 = 0.0;
        let mut lines = 0;
        for line in text.split('\n') {
            lines += 1;
            width = width.max(line.chars().map(|c| self.advance(c)).sum());
        }
        Vec2::new(width, lines as f32 * self.line_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atlas_without_font_has_white_block() {
        let atlas = FontAtlas::build(&FontConfig::default());
        let (w, h, px) = atlas.tex_data_rgba32();
        assert_eq!(w, ATLAS_WIDTH);
        assert!(h >= 8);
        assert_eq!(px.len(), (w * h * 4) as usize);
        assert_eq!(&px[0..4], &[255, 255, 255, 255]);
        assert!(atlas.glyph('A').is_none());
    }

    #[test]
    fn white_uv_samples_inside_block() {
        let atlas = FontAtlas::build(&FontConfig::default());
        let (w, h, _) = atlas.tex_data_rgba32();
        let [u, v] = atlas.white_uv();
        assert!(u * (w as f32) <= 2.0);
        assert!(v * (h as f32) <= 2.0);
    }

    #[test]
    fn text_size_uses_fallback_advance_and_lines() {
        let atlas = FontAtlas::build(&FontConfig { data: None, size_px: 10.0 });
        let size = atlas.calc_text_size("abcd\nxy");
        assert_eq!(size.x, 20.0);
        assert_eq!(size.y, 2.0 * atlas.line_height());
    }

    #[test]
    fn invalid_font_bytes_fall_back() {
        let atlas = FontAtlas::build(&FontConfig { data: Some(vec![1, 2, 3]), size_px: 12.0 });
        assert!(atlas.glyph('a').is_none());
    }
}
