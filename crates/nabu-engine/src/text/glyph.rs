use crate::coords::Vec2;
use crate::render::TextureId;

/// Character whose atlas cell is solid; its uv centre is the "blank" sample
/// used for untextured fills.
pub const BLANK_GLYPH: char = '■';

/// Font style selector. Sources without a dedicated face fall back to `Normal`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            FontStyle::Normal => 0,
            FontStyle::Bold => 1,
            FontStyle::Italic => 2,
            FontStyle::BoldItalic => 3,
        }
    }
}

/// Placement metrics and atlas location of one glyph.
///
/// Bearings are relative to the pen position on the baseline with +Y up,
/// in pixels at the size the glyph was requested with.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlyphInfo {
    pub advance: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub uv_top_left: Vec2,
    pub uv_top_right: Vec2,
    pub uv_bottom_right: Vec2,
    pub uv_bottom_left: Vec2,
}

impl GlyphInfo {
    /// Corner uvs in quad order: top-left, top-right, bottom-right, bottom-left.
    #[inline]
    pub fn uvs(&self) -> [Vec2; 4] {
        [self.uv_top_left, self.uv_top_right, self.uv_bottom_right, self.uv_bottom_left]
    }

    #[inline]
    pub fn uv_center(&self) -> Vec2 {
        (self.uv_top_left + self.uv_bottom_right) * 0.5
    }

    #[inline]
    pub fn has_area(&self) -> bool {
        self.max_x > self.min_x && self.max_y > self.min_y
    }
}

/// Font/atlas collaborator consumed by the renderer.
pub trait GlyphSource {
    /// Makes sure every glyph of `text` is present in the atlas.
    ///
    /// Must be called before measuring or drawing text with new characters.
    /// May rebuild the atlas, which bumps [`generation`](Self::generation).
    fn request_glyphs(&mut self, text: &str, size: f32, style: FontStyle);

    /// Metrics of a previously requested glyph; `None` if unknown.
    fn glyph(&self, ch: char, size: f32, style: FontStyle) -> Option<GlyphInfo>;

    /// Pixel size glyphs are rasterized and measured at.
    fn native_size(&self) -> f32;

    /// Line height at [`native_size`](Self::native_size); text scales relative to it.
    fn line_height(&self) -> f32;

    fn texture(&self) -> TextureId {
        TextureId::GLYPH_ATLAS
    }

    /// Increases whenever previously returned uvs become invalid.
    fn generation(&self) -> u64;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Monospace glyph source: every printable character is `advance` wide
    /// and `ascent` tall, with uvs covering the unit square.
    #[derive(Debug, Clone)]
    pub(crate) struct FixedGlyphs {
        pub advance: f32,
        pub ascent: f32,
        pub native_size: f32,
        pub line_height: f32,
        pub blank_uv: Vec2,
        pub missing: Vec<char>,
        pub generation: u64,
        pub requests: usize,
    }

    impl Default for FixedGlyphs {
        fn default() -> Self {
            Self {
                advance: 10.0,
                ascent: 15.0,
                native_size: 20.0,
                line_height: 20.0,
                blank_uv: Vec2::new(0.25, 0.25),
                missing: Vec::new(),
                generation: 0,
                requests: 0,
            }
        }
    }

    impl GlyphSource for FixedGlyphs {
        fn request_glyphs(&mut self, _text: &str, _size: f32, _style: FontStyle) {
            self.requests += 1;
        }

        fn glyph(&self, ch: char, _size: f32, _style: FontStyle) -> Option<GlyphInfo> {
            if ch == BLANK_GLYPH {
                let uv = self.blank_uv;
                return Some(GlyphInfo {
                    advance: self.advance,
                    max_x: self.advance,
                    max_y: self.ascent,
                    uv_top_left: uv,
                    uv_top_right: uv,
                    uv_bottom_right: uv,
                    uv_bottom_left: uv,
                    ..GlyphInfo::default()
                });
            }
            if ch.is_control() || self.missing.contains(&ch) {
                return None;
            }
            Some(GlyphInfo {
                advance: self.advance,
                min_x: 0.0,
                max_x: self.advance,
                min_y: 0.0,
                max_y: self.ascent,
                uv_top_left: Vec2::new(0.0, 0.0),
                uv_top_right: Vec2::new(1.0, 0.0),
                uv_bottom_right: Vec2::new(1.0, 1.0),
                uv_bottom_left: Vec2::new(0.0, 1.0),
            })
        }

        fn native_size(&self) -> f32 {
            self.native_size
        }

        fn line_height(&self) -> f32 {
            self.line_height
        }

        fn generation(&self) -> u64 {
            self.generation
        }
    }
}
