use cgmath::Matrix4;

use crate::coords::{Color32, CoordinateSystem, Rect, SurfaceMetrics, Vec2};
use crate::coords::{DEFAULT_REFERENCE_HEIGHT, DEFAULT_REFERENCE_WIDTH};
use crate::text::{BLANK_GLYPH, FontStyle, GlyphSource};

use super::batch::SubmeshBatcher;
use super::geometry::GeometryAccumulator;
use super::surface::{FrameStats, RenderSurface, TextureId};
use super::text::TextFormat;

/// Renderer construction parameters.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Triangles the per-frame buffers are pre-sized for. They still grow on demand.
    pub triangle_capacity: usize,
    /// Batches pre-allocated per frame.
    pub batch_capacity: usize,
    /// Virtual width kept constant on surfaces narrower than 16:9.
    pub reference_width: f32,
    /// Virtual height kept constant on surfaces 16:9 or wider.
    pub reference_height: f32,
    /// Format returned by [`Renderer2D::default_text_format`].
    pub default_text_format: TextFormat,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            triangle_capacity: 1024,
            batch_capacity: 16,
            reference_width: DEFAULT_REFERENCE_WIDTH,
            reference_height: DEFAULT_REFERENCE_HEIGHT,
            default_text_format: TextFormat::default(),
        }
    }
}

/// Immediate-mode 2D overlay renderer.
///
/// Shapes and text are written into one shared vertex/index stream during the
/// frame and partitioned into (texture, transform) batches; [`flush`](Self::flush)
/// hands the frame to a [`RenderSurface`] and resets everything for the next one.
///
/// Drawing state (color, mask, texture, transform) is explicit and persists
/// across flushes, except the texture, which flush resets to the glyph atlas.
pub struct Renderer2D<G: GlyphSource> {
    pub(super) glyphs: G,
    pub(super) coords: CoordinateSystem,

    pub(super) geometry: GeometryAccumulator,
    pub(super) batcher: SubmeshBatcher,

    pub(super) color: Color32,
    pub(super) mask: Option<Rect>,
    pub(super) texture: TextureId,
    pub(super) transform: Matrix4<f32>,

    blank_uv: Vec2,
    glyph_generation: Option<u64>,
    default_text_format: TextFormat,
}

impl<G: GlyphSource> Renderer2D<G> {
    pub fn new(glyphs: G, surface: SurfaceMetrics, config: RendererConfig) -> Self {
        let coords = CoordinateSystem::with_reference(
            surface,
            config.reference_width,
            config.reference_height,
        );

        let mut renderer = Self {
            transform: coords.transform(),
            glyphs,
            coords,
            geometry: GeometryAccumulator::with_capacity(config.triangle_capacity),
            batcher: SubmeshBatcher::with_capacity(config.batch_capacity),
            color: Color32::WHITE,
            mask: None,
            texture: TextureId::GLYPH_ATLAS,
            blank_uv: Vec2::zero(),
            glyph_generation: None,
            default_text_format: config.default_text_format,
        };

        let native = renderer.glyphs.native_size();
        let blank = BLANK_GLYPH.to_string();
        renderer.glyphs.request_glyphs(&blank, native, FontStyle::Normal);
        renderer.refresh_blank_uv();

        log::debug!(
            "renderer created: reference {}×{} ({:?} fixed)",
            renderer.coords.reference_width(),
            renderer.coords.reference_height(),
            renderer.coords.fixed_axis()
        );
        renderer
    }

    // ── state ──────────────────────────────────────────────────────────────

    /// Texture used by the uv-carrying fill forms.
    #[inline]
    pub fn set_texture(&mut self, texture: TextureId) {
        self.texture = texture;
    }

    #[inline]
    pub fn reset_texture(&mut self) {
        self.texture = TextureId::GLYPH_ATLAS;
    }

    #[inline]
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Virtual → scene transform attached to subsequent shapes.
    #[inline]
    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
    }

    /// Restores the coordinate system's forward transform.
    #[inline]
    pub fn reset_transform(&mut self) {
        self.transform = self.coords.transform();
    }

    #[inline]
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    /// Clip rectangle for subsequent shapes and glyphs; `None` removes it.
    #[inline]
    pub fn set_mask(&mut self, mask: Option<Rect>) {
        self.mask = mask;
    }

    #[inline]
    pub fn mask(&self) -> Option<Rect> {
        self.mask
    }

    #[inline]
    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    #[inline]
    pub fn color(&self) -> Color32 {
        self.color
    }

    #[inline]
    pub fn default_text_format(&self) -> TextFormat {
        self.default_text_format
    }

    // ── collaborators ──────────────────────────────────────────────────────

    #[inline]
    pub fn coords(&self) -> &CoordinateSystem {
        &self.coords
    }

    /// Mutable coordinate system; call [`reset_transform`](Self::reset_transform)
    /// afterwards to draw with the re-derived transform.
    #[inline]
    pub fn coords_mut(&mut self) -> &mut CoordinateSystem {
        &mut self.coords
    }

    /// Re-derives the coordinate system for a resized surface and resets the
    /// transform to it.
    pub fn resize(&mut self, surface: SurfaceMetrics) {
        self.coords.set_surface(surface);
        self.reset_transform();
    }

    #[inline]
    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    #[inline]
    pub fn glyphs_mut(&mut self) -> &mut G {
        &mut self.glyphs
    }

    /// Uv sampling the solid cell of the glyph atlas.
    pub fn blank_uv(&mut self) -> Vec2 {
        self.refresh_blank_uv();
        self.blank_uv
    }

    pub(super) fn refresh_blank_uv(&mut self) {
        let generation = self.glyphs.generation();
        if self.glyph_generation == Some(generation) {
            return;
        }

        let native = self.glyphs.native_size();
        match self.glyphs.glyph(BLANK_GLYPH, native, FontStyle::Normal) {
            Some(info) => self.blank_uv = info.uv_center(),
            None => {
                log::warn!("glyph source has no blank glyph; solid fills sample uv (0, 0)");
                self.blank_uv = Vec2::zero();
            }
        }
        self.glyph_generation = Some(generation);
    }

    // ── frame ──────────────────────────────────────────────────────────────

    /// Issues the frame's batches to `surface` and resets per-frame state.
    ///
    /// A frame without geometry makes no surface calls.
    pub fn flush<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> FrameStats {
        let stats = self.batcher.flush(&mut self.geometry, surface);
        self.texture = TextureId::GLYPH_ATLAS;
        stats
    }

    /// Tears the renderer down and hands back the glyph source.
    ///
    /// Unflushed geometry is discarded.
    pub fn dispose(self) -> G {
        log::debug!(
            "renderer disposed with {} unflushed vertices",
            self.geometry.vertices().len()
        );
        self.glyphs
    }

    // ── shared emission ────────────────────────────────────────────────────

    #[inline]
    pub(super) fn begin_shape(&mut self, texture: TextureId) {
        self.batcher.begin_shape(texture, self.transform, self.geometry.index_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::testing::RecordingSurface;
    use crate::text::testing::FixedGlyphs;

    fn renderer() -> Renderer2D<FixedGlyphs> {
        Renderer2D::new(
            FixedGlyphs::default(),
            SurfaceMetrics::new(1136, 640, 5.0),
            RendererConfig::default(),
        )
    }

    #[test]
    fn new_starts_with_coordinate_transform() {
        let r = renderer();
        assert_eq!(r.transform(), r.coords().transform());
        assert_eq!(r.texture(), TextureId::GLYPH_ATLAS);
        assert_eq!(r.color(), Color32::WHITE);
        assert_eq!(r.mask(), None);
    }

    #[test]
    fn blank_uv_follows_glyph_generation() {
        let mut r = renderer();
        assert_eq!(r.blank_uv(), Vec2::new(0.25, 0.25));

        r.glyphs_mut().blank_uv = Vec2::new(0.75, 0.5);
        assert_eq!(r.blank_uv(), Vec2::new(0.25, 0.25));

        r.glyphs_mut().generation += 1;
        assert_eq!(r.blank_uv(), Vec2::new(0.75, 0.5));
    }

    #[test]
    fn flush_resets_texture_but_keeps_drawing_state() {
        let mut r = renderer();
        let mask = Rect::new(0.0, 0.0, 10.0, 10.0);
        r.set_texture(TextureId(5));
        r.set_mask(Some(mask));
        r.set_color(Color32::BLACK);

        r.flush(&mut RecordingSurface::default());

        assert_eq!(r.texture(), TextureId::GLYPH_ATLAS);
        assert_eq!(r.mask(), Some(mask));
        assert_eq!(r.color(), Color32::BLACK);
    }

    #[test]
    fn transform_is_attached_to_draws() {
        let mut r = renderer();
        let scaled = Matrix4::from_scale(3.0);

        r.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        r.set_transform(scaled);
        r.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        r.reset_transform();
        r.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));

        let mut surface = RecordingSurface::default();
        let stats = r.flush(&mut surface);
        assert_eq!(stats.draw_calls, 3);
        assert_eq!(surface.calls[1].transform, scaled);
        assert_eq!(surface.calls[2].transform, r.coords().transform());
    }

    #[test]
    fn resize_rederives_transform() {
        let mut r = renderer();
        r.set_transform(Matrix4::from_scale(2.0));
        r.resize(SurfaceMetrics::new(640, 1136, 5.0));
        assert_eq!(r.transform(), r.coords().transform());
    }

    #[test]
    fn dispose_returns_glyph_source() {
        let mut r = renderer();
        r.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        let glyphs = r.dispose();
        assert_eq!(glyphs.advance, 10.0);
    }
}
