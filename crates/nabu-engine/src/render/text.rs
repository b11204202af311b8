//! Text measurement and glyph placement.
//!
//! Glyph metrics come from the [`GlyphSource`] at its native size and are
//! scaled by `font_size / line_height` of the source. Each glyph becomes one
//! fast-path rectangle, so masks apply to text like to any other fill.

use std::ops::Range;

use crate::coords::{Rect, Vec2};
use crate::text::{FontStyle, GlyphSource};

use super::renderer::Renderer2D;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
}

/// What happens when text is larger than its area.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Overflow {
    /// Draw at the requested size regardless of the area.
    #[default]
    Visible,
    /// Scale font size and line height down until the text fits.
    Shrink,
}

/// How a string is laid out in its area. Passed by value per call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextFormat {
    pub align: HorizontalAlign,
    pub vertical_align: VerticalAlign,
    pub overflow: Overflow,
    pub style: FontStyle,
    pub font_size: f32,
    pub line_height: f32,
}

impl TextFormat {
    #[inline]
    pub const fn new(font_size: f32, line_height: f32) -> Self {
        Self {
            align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            overflow: Overflow::Visible,
            style: FontStyle::Normal,
            font_size,
            line_height,
        }
    }

    #[inline]
    pub const fn with_align(mut self, align: HorizontalAlign) -> Self {
        self.align = align;
        self
    }

    #[inline]
    pub const fn with_vertical_align(mut self, vertical_align: VerticalAlign) -> Self {
        self.vertical_align = vertical_align;
        self
    }

    #[inline]
    pub const fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    #[inline]
    pub const fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}

impl Default for TextFormat {
    fn default() -> Self {
        Self::new(20.0, 30.0)
    }
}

impl<G: GlyphSource> Renderer2D<G> {
    /// Size of `text` laid out with `format`; zero for empty text.
    ///
    /// Height counts every line, including a trailing empty one.
    pub fn measure_text(&mut self, text: &str, format: &TextFormat) -> Vec2 {
        self.request_text(text, format.style);
        self.measure_laid_out(text, format)
    }

    /// Like [`measure_text`](Self::measure_text) for the byte `range` of `text`.
    ///
    /// Ranges outside the string or off char boundaries measure as zero.
    pub fn measure_text_range(&mut self, text: &str, range: Range<usize>, format: &TextFormat) -> Vec2 {
        let Some(slice) = text.get(range) else { return Vec2::zero(); };
        self.measure_text(slice, format)
    }

    /// Lays `text` out in `area` and emits one quad per visible glyph in the
    /// current color.
    pub fn draw_text(&mut self, text: &str, area: Rect, format: &TextFormat) {
        if text.is_empty() {
            return;
        }
        self.request_text(text, format.style);

        let mut format = *format;
        let mut area = area;

        let measured = if format.overflow == Overflow::Shrink
            || format.vertical_align == VerticalAlign::Middle
        {
            self.measure_laid_out(text, &format)
        } else {
            Vec2::zero()
        };

        if format.overflow == Overflow::Shrink {
            let scale = shrink_scale(measured, area.size());
            if scale < 1.0 {
                format.font_size *= scale;
                format.line_height *= scale;
            }
        }

        // Offset by the unshrunk block height; shrinking does not re-center.
        if format.vertical_align == VerticalAlign::Middle {
            area.top += (area.height() - measured.y) * 0.5;
        }

        let mut line_top = area.top;
        for line in text.split('\n') {
            let x = match format.align {
                HorizontalAlign::Left => area.left,
                HorizontalAlign::Center => {
                    let width = self.measure_laid_out(line, &format).x;
                    area.left + (area.width() - width) * 0.5
                }
            };
            self.emit_line(line, x, line_top, &format);
            line_top += format.line_height;
        }
    }

    fn request_text(&mut self, text: &str, style: FontStyle) {
        if text.is_empty() {
            return;
        }
        let native = self.glyphs.native_size();
        self.glyphs.request_glyphs(text, native, style);
        self.refresh_blank_uv();
    }

    /// Measures without requesting glyphs.
    fn measure_laid_out(&self, text: &str, format: &TextFormat) -> Vec2 {
        if text.is_empty() {
            return Vec2::zero();
        }

        let native = self.glyphs.native_size();
        let scale = format.font_size / self.glyphs.line_height();

        let mut lines = 1;
        let mut width: f32 = 0.0;
        let mut line_width = 0.0;
        for ch in text.chars() {
            if ch == '\n' {
                width = width.max(line_width);
                line_width = 0.0;
                lines += 1;
                continue;
            }
            if ch.is_control() {
                continue;
            }
            if let Some(glyph) = self.glyphs.glyph(ch, native, format.style) {
                line_width += glyph.advance * scale;
            }
        }

        Vec2::new(width.max(line_width), format.line_height * lines as f32)
    }

    fn emit_line(&mut self, line: &str, mut x: f32, line_top: f32, format: &TextFormat) {
        let native = self.glyphs.native_size();
        let texture = self.glyphs.texture();
        let scale = format.font_size / self.glyphs.line_height();
        let baseline = line_top + (format.line_height - format.font_size) * 0.5 + format.font_size;
        let colors = [self.color; 4];

        for ch in line.chars() {
            if ch.is_control() {
                continue;
            }
            let Some(glyph) = self.glyphs.glyph(ch, native, format.style) else { continue; };

            if glyph.has_area() {
                let rect = Rect::from_ltrb(
                    x + glyph.min_x * scale,
                    baseline - glyph.max_y * scale,
                    x + glyph.max_x * scale,
                    baseline - glyph.min_y * scale,
                );
                self.fill_rect_fast(rect, texture, glyph.uvs(), colors);
            }
            x += glyph.advance * scale;
        }
    }
}

/// Uniform factor that fits `measured` into `area`, never above 1.
///
/// Each axis only constrains when it overflows; the smaller factor wins.
fn shrink_scale(measured: Vec2, area: Vec2) -> f32 {
    let sx = if measured.x > area.x { area.x / measured.x } else { 1.0 };
    let sy = if measured.y > area.y { area.y / measured.y } else { 1.0 };
    sx.min(sy)
}
