//! Filled shapes, lines and borders.
//!
//! Axis-aligned rectangles take the fast path: the mask clamps the edges and
//! uvs/colors are resampled from the original corners, always one quad.
//! Arbitrary quads and triangles under a mask go through the polygon clipper
//! and are fanned back into triangles.

use crate::coords::{Color32, Rect, Vec2};
use crate::text::GlyphSource;

use super::clip::{VertexList, clip_polygon};
use super::renderer::Renderer2D;
use super::surface::TextureId;
use super::vertex::Vertex;

/// Interpolation clamped to the source endpoints so untouched edges keep
/// their exact corner values.
#[inline]
fn edge_lerp<T: Copy>(a: T, b: T, t: f32, lerp: impl Fn(T, T, f32) -> T) -> T {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        lerp(a, b, t)
    }
}

/// Bilinear sample of corner values ordered top-left, top-right, bottom-right,
/// bottom-left at normalized position `(s, t)`.
fn bilinear<T, F>(corners: [T; 4], s: f32, t: f32, lerp: F) -> T
where
    T: Copy,
    F: Fn(T, T, f32) -> T + Copy,
{
    let [tl, tr, br, bl] = corners;
    let top = edge_lerp(tl, tr, s, lerp);
    let bottom = edge_lerp(bl, br, s, lerp);
    edge_lerp(top, bottom, t, lerp)
}

impl<G: GlyphSource> Renderer2D<G> {
    // ── rectangles ─────────────────────────────────────────────────────────

    /// Solid rectangle in the current color.
    pub fn fill_rect(&mut self, rect: Rect) {
        let uv = self.blank_uv();
        let color = self.color;
        self.fill_rect_fast(rect, TextureId::GLYPH_ATLAS, [uv; 4], [color; 4]);
    }

    /// Rectangle sampling a single uv of the current texture.
    pub fn fill_rect_uv(&mut self, rect: Rect, uv: Vec2) {
        let color = self.color;
        self.fill_rect_fast(rect, self.texture, [uv; 4], [color; 4]);
    }

    /// Rectangle with per-corner uvs (top-left, top-right, bottom-right,
    /// bottom-left) into the current texture.
    pub fn fill_rect_uvs(&mut self, rect: Rect, uvs: [Vec2; 4]) {
        let color = self.color;
        self.fill_rect_fast(rect, self.texture, uvs, [color; 4]);
    }

    /// Rectangle with per-corner uvs and colors, same corner order as
    /// [`fill_rect_uvs`](Self::fill_rect_uvs).
    pub fn fill_rect_uvs_colors(&mut self, rect: Rect, uvs: [Vec2; 4], colors: [Color32; 4]) {
        self.fill_rect_fast(rect, self.texture, uvs, colors);
    }

    /// Emits exactly one quad, clamped to the mask when one is set.
    ///
    /// Rectangles without area, or entirely outside the mask, emit nothing.
    pub(super) fn fill_rect_fast(
        &mut self,
        rect: Rect,
        texture: TextureId,
        uvs: [Vec2; 4],
        colors: [Color32; 4],
    ) {
        let (draw, uvs, colors) = match self.mask {
            None => {
                if rect.normalized().is_empty() {
                    return;
                }
                (rect, uvs, colors)
            }
            Some(mask) => {
                let Some(draw) = rect.intersect(mask) else { return; };
                if draw == rect {
                    (rect, uvs, colors)
                } else {
                    let w = rect.right - rect.left;
                    let h = rect.bottom - rect.top;
                    let s0 = (draw.left - rect.left) / w;
                    let s1 = (draw.right - rect.left) / w;
                    let t0 = (draw.top - rect.top) / h;
                    let t1 = (draw.bottom - rect.top) / h;

                    let uv_at = |s, t| bilinear(uvs, s, t, Vec2::lerp);
                    let color_at = |s, t| bilinear(colors, s, t, Color32::lerp);
                    (
                        draw,
                        [uv_at(s0, t0), uv_at(s1, t0), uv_at(s1, t1), uv_at(s0, t1)],
                        [color_at(s0, t0), color_at(s1, t0), color_at(s1, t1), color_at(s0, t1)],
                    )
                }
            }
        };

        let corners = [
            Vec2::new(draw.left, draw.top),
            Vec2::new(draw.right, draw.top),
            Vec2::new(draw.right, draw.bottom),
            Vec2::new(draw.left, draw.bottom),
        ];
        let quad: [Vertex; 4] = std::array::from_fn(|i| Vertex::new(corners[i], uvs[i], colors[i]));

        self.begin_shape(texture);
        self.geometry.add_quad(&quad);
    }

    // ── arbitrary polygons ─────────────────────────────────────────────────

    /// Convex quad in the current texture, clipped to the mask.
    ///
    /// Vertices go in winding order. Self-intersecting quads are not supported.
    pub fn fill_quad(&mut self, vertices: &[Vertex; 4]) {
        let texture = self.texture;
        match self.mask {
            None => {
                self.begin_shape(texture);
                self.geometry.add_quad(vertices);
            }
            Some(mask) => self.fill_clipped(&VertexList::from_slice(vertices), mask, texture),
        }
    }

    /// Solid convex quad in the current color.
    pub fn fill_quad_points(&mut self, points: [Vec2; 4]) {
        let uv = self.blank_uv();
        let color = self.color;
        let vertices = points.map(|p| Vertex::new(p, uv, color));

        let texture = self.texture;
        self.texture = TextureId::GLYPH_ATLAS;
        self.fill_quad(&vertices);
        self.texture = texture;
    }

    /// Triangle in the current texture, clipped to the mask.
    pub fn fill_triangle(&mut self, vertices: &[Vertex; 3]) {
        let texture = self.texture;
        match self.mask {
            None => {
                self.begin_shape(texture);
                self.geometry.add_triangle(vertices);
            }
            Some(mask) => self.fill_clipped(&VertexList::from_slice(vertices), mask, texture),
        }
    }

    /// Solid triangle in the current color.
    pub fn fill_triangle_points(&mut self, points: [Vec2; 3]) {
        let uv = self.blank_uv();
        let color = self.color;
        let vertices = points.map(|p| Vertex::new(p, uv, color));

        let texture = self.texture;
        self.texture = TextureId::GLYPH_ATLAS;
        self.fill_triangle(&vertices);
        self.texture = texture;
    }

    fn fill_clipped(&mut self, polygon: &VertexList, mask: Rect, texture: TextureId) {
        let clipped = clip_polygon(polygon, mask);
        if clipped.len() <= 2 {
            return;
        }
        self.begin_shape(texture);
        self.geometry.add_polygon(&clipped);
    }

    // ── lines & borders ────────────────────────────────────────────────────

    /// Horizontal line of `width` centered on `y`, starting at `left_x`.
    pub fn draw_horizontal_line(&mut self, left_x: f32, y: f32, length: f32, width: f32) {
        let half = width * 0.5;
        self.fill_rect(Rect::from_ltrb(left_x, y - half, left_x + length, y + half));
    }

    /// Vertical line of `width` centered on `x`, starting at `top_y`.
    pub fn draw_vertical_line(&mut self, x: f32, top_y: f32, length: f32, width: f32) {
        let half = width * 0.5;
        self.fill_rect(Rect::from_ltrb(x - half, top_y, x + half, top_y + length));
    }

    /// Border centered on the edges of `rect`.
    ///
    /// The horizontal bars cover the corners; the vertical bars fill the gap
    /// between them.
    pub fn draw_rect(&mut self, rect: Rect, line_width: f32) {
        let h = line_width * 0.5;
        let Rect { left: l, top: t, right: r, bottom: b } = rect;

        self.fill_rect(Rect::from_ltrb(l - h, t - h, r + h, t + h));
        self.fill_rect(Rect::from_ltrb(l - h, b - h, r + h, b + h));
        self.fill_rect(Rect::from_ltrb(l - h, t + h, l + h, b - h));
        self.fill_rect(Rect::from_ltrb(r - h, t + h, r + h, b - h));
    }

    /// Border drawn entirely inside `rect`.
    pub fn draw_rect_inside(&mut self, rect: Rect, line_width: f32) {
        let w = line_width;
        let Rect { left: l, top: t, right: r, bottom: b } = rect;

        self.fill_rect(Rect::from_ltrb(l, t, r, t + w));
        self.fill_rect(Rect::from_ltrb(l, b - w, r, b));
        self.fill_rect(Rect::from_ltrb(l, t + w, l + w, b - w));
        self.fill_rect(Rect::from_ltrb(r - w, t + w, r, b - w));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::SurfaceMetrics;
    use crate::render::RendererConfig;
    use crate::render::surface::testing::RecordingSurface;
    use crate::text::testing::FixedGlyphs;

    fn renderer() -> Renderer2D<FixedGlyphs> {
        Renderer2D::new(
            FixedGlyphs::default(),
            SurfaceMetrics::new(1136, 640, 5.0),
            RendererConfig::default(),
        )
    }

    fn unit_uvs() -> [Vec2; 4] {
        [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)]
    }

    fn frame(r: &mut Renderer2D<FixedGlyphs>) -> RecordingSurface {
        let mut surface = RecordingSurface::default();
        r.flush(&mut surface);
        surface
    }

    fn v(x: f32, y: f32) -> Vertex {
        Vertex::new(Vec2::new(x, y), Vec2::zero(), Color32::WHITE)
    }

    // ── fast rectangle ────────────────────────────────────────────────────

    #[test]
    fn fill_rect_emits_one_quad_with_blank_uv() {
        let mut r = renderer();
        r.set_color(Color32::new(10, 20, 30, 255));
        r.fill_rect(Rect::new(10.0, 20.0, 30.0, 40.0));

        let s = frame(&mut r);
        assert_eq!(s.vertices.len(), 4);
        assert_eq!(s.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(s.vertices[2].position, [40.0, 60.0, 0.0]);
        assert!(s.vertices.iter().all(|v| v.uv() == Vec2::new(0.25, 0.25)));
        assert!(s.vertices.iter().all(|v| v.color() == Color32::new(10, 20, 30, 255)));
        assert_eq!(s.calls[0].texture, TextureId::GLYPH_ATLAS);
    }

    #[test]
    fn fill_rect_ignores_current_texture() {
        let mut r = renderer();
        r.set_texture(TextureId(9));
        r.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        r.fill_rect_uv(Rect::new(0.0, 0.0, 1.0, 1.0), Vec2::new(0.5, 0.5));

        let s = frame(&mut r);
        let textures: Vec<_> = s.calls.iter().map(|c| c.texture).collect();
        assert_eq!(textures, vec![TextureId::GLYPH_ATLAS, TextureId(9)]);
    }

    #[test]
    fn half_width_mask_samples_uv_midpoint() {
        let mut r = renderer();
        r.set_mask(Some(Rect::from_ltrb(50.0, -100.0, 500.0, 500.0)));
        r.fill_rect_uvs(Rect::from_ltrb(0.0, 0.0, 100.0, 10.0), unit_uvs());

        let s = frame(&mut r);
        assert_eq!(s.vertices.len(), 4);
        assert_eq!(s.vertices[0].position, [50.0, 0.0, 0.0]);
        assert_eq!(s.vertices[0].uv(), Vec2::new(0.5, 0.0));
        assert_eq!(s.vertices[1].uv(), Vec2::new(1.0, 0.0));
        assert_eq!(s.vertices[2].uv(), Vec2::new(1.0, 1.0));
        assert_eq!(s.vertices[3].uv(), Vec2::new(0.5, 1.0));
    }

    #[test]
    fn two_axis_clamp_is_bilinear() {
        let mut r = renderer();
        r.set_mask(Some(Rect::from_ltrb(0.0, 0.0, 50.0, 50.0)));
        let colors = [
            Color32::new(0, 0, 0, 255),
            Color32::new(200, 0, 0, 255),
            Color32::new(200, 200, 0, 255),
            Color32::new(0, 200, 0, 255),
        ];
        r.fill_rect_uvs_colors(Rect::from_ltrb(0.0, 0.0, 100.0, 100.0), unit_uvs(), colors);

        let s = frame(&mut r);
        assert_eq!(s.vertices[2].uv(), Vec2::new(0.5, 0.5));
        assert_eq!(s.vertices[2].color(), Color32::new(100, 100, 0, 255));
        assert_eq!(s.vertices[0].color(), colors[0]);
    }

    #[test]
    fn containing_mask_leaves_rect_untouched() {
        let rect = Rect::from_ltrb(3.0, 4.0, 30.0, 40.0);
        let uvs = [Vec2::new(0.1, 0.2), Vec2::new(0.7, 0.2), Vec2::new(0.7, 0.9), Vec2::new(0.1, 0.9)];

        let mut plain = renderer();
        plain.fill_rect_uvs(rect, uvs);
        let expected = frame(&mut plain);

        let mut masked = renderer();
        masked.set_mask(Some(Rect::from_ltrb(-1000.0, -1000.0, 1000.0, 1000.0)));
        masked.fill_rect_uvs(rect, uvs);
        let actual = frame(&mut masked);

        assert_eq!(actual.vertices, expected.vertices);
        assert_eq!(actual.indices, expected.indices);
    }

    #[test]
    fn masked_out_rect_emits_nothing() {
        let mut r = renderer();
        r.set_mask(Some(Rect::from_ltrb(200.0, 200.0, 300.0, 300.0)));
        r.fill_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        // Touching edges only: no area.
        r.fill_rect(Rect::from_ltrb(100.0, 200.0, 200.0, 300.0));

        let s = frame(&mut r);
        assert_eq!(s.frames, 0);
        assert!(s.vertices.is_empty());
    }

    #[test]
    fn zero_area_rect_emits_nothing() {
        let mut r = renderer();
        r.fill_rect(Rect::from_ltrb(5.0, 5.0, 5.0, 20.0));
        assert_eq!(frame(&mut r).frames, 0);
    }

    // ── quads & triangles ─────────────────────────────────────────────────

    #[test]
    fn unmasked_quad_is_emitted_verbatim() {
        let mut r = renderer();
        let quad = [v(0.0, 0.0), v(10.0, 0.0), v(12.0, 8.0), v(-2.0, 8.0)];
        r.fill_quad(&quad);

        let s = frame(&mut r);
        assert_eq!(s.vertices, quad.to_vec());
        assert_eq!(s.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn masked_triangle_is_clipped_and_fanned() {
        let mut r = renderer();
        r.set_mask(Some(Rect::from_ltrb(0.0, 0.0, 5.0, 100.0)));
        r.fill_triangle(&[v(0.0, 0.0), v(10.0, 0.0), v(0.0, 10.0)]);

        let s = frame(&mut r);
        // The right pass cuts the tip off: a quad remains.
        assert_eq!(s.vertices.len(), 4);
        assert_eq!(s.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(s.vertices.iter().all(|v| v.x() <= 5.0));
    }

    #[test]
    fn fully_masked_quad_emits_nothing() {
        let mut r = renderer();
        r.set_mask(Some(Rect::from_ltrb(100.0, 100.0, 200.0, 200.0)));
        r.fill_quad_points([
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]);

        let s = frame(&mut r);
        assert_eq!(s.frames, 0);
        assert!(s.calls.is_empty());
    }

    #[test]
    fn point_forms_use_blank_uv_and_atlas() {
        let mut r = renderer();
        r.set_texture(TextureId(4));
        r.fill_triangle_points([Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]);
        assert_eq!(r.texture(), TextureId(4));

        let s = frame(&mut r);
        assert_eq!(s.calls[0].texture, TextureId::GLYPH_ATLAS);
        assert!(s.vertices.iter().all(|v| v.uv() == Vec2::new(0.25, 0.25)));
    }

    // ── lines & borders ───────────────────────────────────────────────────

    #[test]
    fn lines_are_centered() {
        let mut r = renderer();
        r.draw_horizontal_line(10.0, 20.0, 30.0, 4.0);
        r.draw_vertical_line(10.0, 20.0, 30.0, 4.0);

        let s = frame(&mut r);
        assert_eq!(s.vertices[0].position, [10.0, 18.0, 0.0]);
        assert_eq!(s.vertices[2].position, [40.0, 22.0, 0.0]);
        assert_eq!(s.vertices[4].position, [8.0, 20.0, 0.0]);
        assert_eq!(s.vertices[6].position, [12.0, 50.0, 0.0]);
    }

    #[test]
    fn border_straddles_edges() {
        let mut r = renderer();
        r.draw_rect(Rect::from_ltrb(10.0, 10.0, 50.0, 30.0), 2.0);

        let s = frame(&mut r);
        assert_eq!(s.vertices.len(), 16);
        // top bar spans the full width including half the stroke on each side
        assert_eq!(s.vertices[0].position, [9.0, 9.0, 0.0]);
        assert_eq!(s.vertices[2].position, [51.0, 11.0, 0.0]);
        // left bar fits between the horizontal bars
        assert_eq!(s.vertices[8].position, [9.0, 11.0, 0.0]);
        assert_eq!(s.vertices[10].position, [11.0, 29.0, 0.0]);
    }

    #[test]
    fn inside_border_stays_within_rect() {
        let mut r = renderer();
        let rect = Rect::from_ltrb(10.0, 10.0, 50.0, 30.0);
        r.draw_rect_inside(rect, 3.0);

        let s = frame(&mut r);
        assert_eq!(s.vertices.len(), 16);
        assert!(s.vertices.iter().all(|v| {
            v.x() >= rect.left && v.x() <= rect.right && v.y() >= rect.top && v.y() <= rect.bottom
        }));
    }
}
