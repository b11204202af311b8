use std::collections::HashMap;
use std::fmt;

use crate::coords::Vec2;

use super::glyph::{BLANK_GLYPH, FontStyle, GlyphInfo, GlyphSource};

/// Side of the solid cell reserved for [`BLANK_GLYPH`], in texels.
const BLANK_CELL: u32 = 4;

/// Error returned by [`FontAtlas::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Atlas sizing and rasterization parameters.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Pixel size glyphs are rasterized at. Text at other sizes is scaled.
    pub native_size: f32,
    /// Initial atlas side in texels.
    pub initial_size: u32,
    /// The atlas doubles up to this side before giving up on new glyphs.
    pub max_size: u32,
    /// Empty texels between cells.
    pub padding: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            native_size: 20.0,
            initial_size: 512,
            max_size: 4096,
            padding: 1,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct GlyphKey {
    ch: char,
    style: FontStyle,
    size_bits: u32,
}

impl GlyphKey {
    fn new(ch: char, size: f32, style: FontStyle) -> Self {
        Self { ch, style, size_bits: size.to_bits() }
    }

    fn size(self) -> f32 {
        f32::from_bits(self.size_bits)
    }
}

enum Placement {
    Placed(GlyphInfo),
    Missing,
    NoSpace,
}

/// Single-channel glyph atlas rasterized with fontdue.
///
/// Glyphs are shelf-packed on demand. When the atlas runs out of room it
/// doubles in size and re-rasterizes every cached glyph, which invalidates
/// all uvs and bumps [`generation`](GlyphSource::generation). Pixel content
/// changes bump [`revision`](Self::revision) so hosts know when to re-upload.
pub struct FontAtlas {
    config: AtlasConfig,
    fonts: [Option<fontdue::Font>; 4],

    size: u32,
    pixels: Vec<u8>,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,

    blank: GlyphInfo,
    // `None` marks characters the fonts do not cover.
    glyphs: HashMap<GlyphKey, Option<GlyphInfo>>,

    generation: u64,
    revision: u64,
    warned_full: bool,
}

impl FontAtlas {
    pub fn new(config: AtlasConfig) -> Self {
        let size = config.initial_size.max(BLANK_CELL + 2 * config.padding);
        let mut atlas = Self {
            config,
            fonts: [None, None, None, None],
            size,
            pixels: Vec::new(),
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
            blank: GlyphInfo::default(),
            glyphs: HashMap::new(),
            generation: 0,
            revision: 0,
            warned_full: false,
        };
        atlas.reset_pixels(size);
        atlas
    }

    /// Parses a TrueType or OpenType font and uses it for `style`.
    pub fn load_font(&mut self, style: FontStyle, bytes: &[u8]) -> Result<(), FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        self.fonts[style.slot()] = Some(font);

        let faces = self.fonts.each_ref().map(Option::is_some);
        self.glyphs.retain(|key, _| !cached_from_replaced_face(key.style, style, faces));
        log::debug!("font loaded for {style:?}");
        Ok(())
    }

    /// Atlas side in texels.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row-major R8 coverage, `size × size` texels.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Increases on every pixel change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn font_for(&self, style: FontStyle) -> Option<&fontdue::Font> {
        self.fonts[style.slot()]
            .as_ref()
            .or(self.fonts[FontStyle::Normal.slot()].as_ref())
            .or_else(|| self.fonts.iter().flatten().next())
    }

    // ── packing ───────────────────────────────────────────────────────────

    fn reset_pixels(&mut self, size: u32) {
        self.size = size;
        self.pixels = vec![0; (size * size) as usize];
        self.cursor_x = self.config.padding;
        self.cursor_y = self.config.padding;
        self.row_height = 0;
        self.revision += 1;
        self.place_blank();
    }

    fn allocate(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        let pad = self.config.padding;

        // Advance to a new shelf row when the cell doesn't fit horizontally.
        if self.cursor_x + w + pad > self.size {
            self.cursor_y += self.row_height + pad;
            self.cursor_x = pad;
            self.row_height = 0;
        }

        if self.cursor_x + w + pad > self.size || self.cursor_y + h + pad > self.size {
            return None;
        }

        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + pad;
        self.row_height = self.row_height.max(h);
        Some(at)
    }

    fn blit(&mut self, x: u32, y: u32, w: u32, h: u32, coverage: &[u8]) {
        let (w, h, size) = (w as usize, h as usize, self.size as usize);
        for row in 0..h {
            let dst = (y as usize + row) * size + x as usize;
            self.pixels[dst..dst + w].copy_from_slice(&coverage[row * w..row * w + w]);
        }
        self.revision += 1;
    }

    fn uv_rect(&self, x: f32, y: f32, w: f32, h: f32) -> (Vec2, Vec2) {
        let s = self.size as f32;
        (Vec2::new(x / s, y / s), Vec2::new((x + w) / s, (y + h) / s))
    }

    fn place_blank(&mut self) {
        let Some((x, y)) = self.allocate(BLANK_CELL, BLANK_CELL) else {
            log::warn!("glyph atlas too small for the blank cell");
            return;
        };
        let solid = [u8::MAX; (BLANK_CELL * BLANK_CELL) as usize];
        self.blit(x, y, BLANK_CELL, BLANK_CELL, &solid);

        // Sample the interior so filtering never reaches the padding.
        let (tl, br) = self.uv_rect(x as f32 + 1.0, y as f32 + 1.0, 2.0, 2.0);
        let n = self.config.native_size;
        self.blank = GlyphInfo {
            advance: n,
            min_x: 0.0,
            max_x: n,
            min_y: 0.0,
            max_y: n,
            uv_top_left: tl,
            uv_top_right: Vec2::new(br.x, tl.y),
            uv_bottom_right: br,
            uv_bottom_left: Vec2::new(tl.x, br.y),
        };
    }

    fn rasterize(&mut self, key: GlyphKey) -> Placement {
        let (metrics, coverage) = {
            let Some(font) = self.font_for(key.style) else { return Placement::Missing };
            if font.lookup_glyph_index(key.ch) == 0 {
                return Placement::Missing;
            }
            font.rasterize(key.ch, key.size())
        };

        let mut info = GlyphInfo { advance: metrics.advance_width, ..GlyphInfo::default() };
        if metrics.width == 0 || metrics.height == 0 {
            return Placement::Placed(info);
        }

        let (w, h) = (metrics.width as u32, metrics.height as u32);
        let Some((x, y)) = self.allocate(w, h) else { return Placement::NoSpace };
        self.blit(x, y, w, h, &coverage);

        let (tl, br) = self.uv_rect(x as f32, y as f32, w as f32, h as f32);
        info.min_x = metrics.xmin as f32;
        info.max_x = (metrics.xmin + metrics.width as i32) as f32;
        info.min_y = metrics.ymin as f32;
        info.max_y = (metrics.ymin + metrics.height as i32) as f32;
        info.uv_top_left = tl;
        info.uv_top_right = Vec2::new(br.x, tl.y);
        info.uv_bottom_right = br;
        info.uv_bottom_left = Vec2::new(tl.x, br.y);
        Placement::Placed(info)
    }

    fn ensure(&mut self, key: GlyphKey) {
        if self.glyphs.contains_key(&key) {
            return;
        }
        loop {
            match self.rasterize(key) {
                Placement::Placed(info) => {
                    self.glyphs.insert(key, Some(info));
                    return;
                }
                Placement::Missing => {
                    self.glyphs.insert(key, None);
                    return;
                }
                Placement::NoSpace => {
                    if !self.grow() {
                        return;
                    }
                }
            }
        }
    }

    /// Doubles the atlas and re-rasterizes every cached glyph.
    ///
    /// Returns `false` once the atlas is at its maximum size.
    fn grow(&mut self) -> bool {
        if self.size >= self.config.max_size {
            if !self.warned_full {
                log::warn!(
                    "glyph atlas is full ({0}×{0}); some glyphs will not be rendered",
                    self.size
                );
                self.warned_full = true;
            }
            return false;
        }

        let new_size = (self.size * 2).min(self.config.max_size);
        let keys: Vec<GlyphKey> = self
            .glyphs
            .iter()
            .filter_map(|(k, v)| v.map(|_| *k))
            .collect();

        self.reset_pixels(new_size);
        for key in keys {
            match self.rasterize(key) {
                Placement::Placed(info) => {
                    self.glyphs.insert(key, Some(info));
                }
                _ => {
                    self.glyphs.remove(&key);
                }
            }
        }

        self.generation += 1;
        log::warn!("glyph atlas grown to {new_size}×{new_size}; cached uvs rebuilt");
        true
    }
}

impl Default for FontAtlas {
    fn default() -> Self {
        Self::new(AtlasConfig::default())
    }
}

impl GlyphSource for FontAtlas {
    fn request_glyphs(&mut self, text: &str, size: f32, style: FontStyle) {
        for ch in text.chars() {
            if ch == BLANK_GLYPH || ch.is_control() {
                continue;
            }
            self.ensure(GlyphKey::new(ch, size, style));
        }
    }

    fn glyph(&self, ch: char, size: f32, style: FontStyle) -> Option<GlyphInfo> {
        if ch == BLANK_GLYPH {
            return Some(self.blank);
        }
        self.glyphs.get(&GlyphKey::new(ch, size, style)).copied().flatten()
    }

    fn native_size(&self) -> f32 {
        self.config.native_size
    }

    fn line_height(&self) -> f32 {
        let n = self.config.native_size;
        self.font_for(FontStyle::Normal)
            .and_then(|f| f.horizontal_line_metrics(n))
            .map_or(n * 1.2, |m| m.new_line_size)
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// Whether a glyph cached for `cached` may have been produced by a face that
/// loading `loaded` replaces: its own slot, or any slot it fell back through.
fn cached_from_replaced_face(cached: FontStyle, loaded: FontStyle, faces: [bool; 4]) -> bool {
    cached == loaded || !faces[cached.slot()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> FontAtlas {
        FontAtlas::new(AtlasConfig { native_size: 20.0, initial_size: 16, max_size: 32, padding: 1 })
    }

    #[test]
    fn blank_cell_is_solid() {
        let atlas = small();
        let blank = atlas.glyph(BLANK_GLYPH, 20.0, FontStyle::Bold).unwrap();
        let c = blank.uv_center();
        let s = atlas.size() as f32;
        let (x, y) = ((c.x * s) as usize, (c.y * s) as usize);
        assert_eq!(atlas.pixels()[y * atlas.size() as usize + x], u8::MAX);
    }

    #[test]
    fn unknown_glyph_without_fonts_is_none() {
        let mut atlas = small();
        atlas.request_glyphs("abc", 20.0, FontStyle::Normal);
        assert!(atlas.glyph('a', 20.0, FontStyle::Normal).is_none());
        assert_eq!(atlas.generation(), 0);
    }

    #[test]
    fn loading_a_face_evicts_styles_that_fell_back_to_it() {
        // Normal and Bold have faces; Italic and BoldItalic fall back.
        let faces = [true, true, false, false];
        let evicted = |cached| cached_from_replaced_face(cached, FontStyle::Normal, faces);
        assert!(evicted(FontStyle::Normal));
        assert!(!evicted(FontStyle::Bold));
        assert!(evicted(FontStyle::Italic));
        assert!(evicted(FontStyle::BoldItalic));

        // A dedicated face only replaces its own entries once Normal exists.
        let all = [true; 4];
        assert!(cached_from_replaced_face(FontStyle::Bold, FontStyle::Bold, all));
        assert!(!cached_from_replaced_face(FontStyle::Italic, FontStyle::Bold, all));
    }

    #[test]
    fn line_height_falls_back_without_fonts() {
        assert!((small().line_height() - 24.0).abs() < 1e-4);
    }

    #[test]
    fn allocation_wraps_rows_then_fails() {
        let mut atlas = small();
        // Blank cell occupies (1,1)..(5,5); the rest of the 16×16 atlas is free.
        assert_eq!(atlas.allocate(9, 4), Some((6, 1)));
        assert_eq!(atlas.allocate(9, 4), Some((1, 6)));
        assert_eq!(atlas.allocate(14, 14), None);
    }

    #[test]
    fn grow_doubles_and_bumps_generation() {
        let mut atlas = small();
        let before = atlas.glyph(BLANK_GLYPH, 20.0, FontStyle::Normal).unwrap();
        let revision = atlas.revision();

        assert!(atlas.grow());
        assert_eq!(atlas.size(), 32);
        assert_eq!(atlas.pixels().len(), 32 * 32);
        assert_eq!(atlas.generation(), 1);
        assert!(atlas.revision() > revision);

        let after = atlas.glyph(BLANK_GLYPH, 20.0, FontStyle::Normal).unwrap();
        assert_ne!(before.uv_center(), after.uv_center());

        // At the maximum size the atlas refuses to grow further.
        assert!(!atlas.grow());
        assert_eq!(atlas.generation(), 1);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let mut atlas = small();
        let err = atlas.load_font(FontStyle::Normal, b"not a font").unwrap_err();
        assert!(err.to_string().starts_with("font load error"));
    }
}
