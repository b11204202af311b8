//! Demo overlay: a debug panel exercising every drawing primitive.

use nabu_engine::coords::{Color32, Rect, Vec2};
use nabu_engine::render::{
    HorizontalAlign, Overflow, Renderer2D, TextureId, Vertex, VerticalAlign,
};
use nabu_engine::text::{FontStyle, GlyphSource};

const PANEL_BG: Color32 = Color32::new(16, 18, 24, 220);
const PANEL_EDGE: Color32 = Color32::new(90, 160, 255, 255);
const TEXT: Color32 = Color32::new(230, 230, 230, 255);
const ACCENT: Color32 = Color32::new(255, 180, 60, 255);

/// Side of the checker texture created by the studio.
pub const CHECKER_SIZE: u32 = 8;

/// RGBA8 checkerboard, `CHECKER_SIZE × CHECKER_SIZE`.
pub fn checker_pixels() -> Vec<u8> {
    let mut pixels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let v = if (x + y) % 2 == 0 { 255 } else { 60 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

pub fn draw<G: GlyphSource>(r: &mut Renderer2D<G>, checker: TextureId, frame: u32) {
    let w = r.coords().reference_width();
    let h = r.coords().reference_height();

    // ── panel ─────────────────────────────────────────────────────────────
    let panel = Rect::new(24.0, 24.0, (w * 0.4).min(420.0), h - 48.0);
    r.set_color(PANEL_BG);
    r.fill_rect(panel);
    r.set_color(PANEL_EDGE);
    r.draw_rect_inside(panel, 2.0);

    let title = r.default_text_format().with_style(FontStyle::Bold);
    r.set_color(TEXT);
    r.draw_text("nabu overlay", Rect::new(panel.left + 12.0, panel.top + 8.0, panel.width() - 24.0, 30.0), &title);
    r.draw_horizontal_line(panel.left + 12.0, panel.top + 44.0, panel.width() - 24.0, 1.0);

    // ── stats block, clipped to the panel body ────────────────────────────
    let body = Rect::from_ltrb(panel.left + 12.0, panel.top + 52.0, panel.right - 12.0, panel.bottom - 12.0);
    r.set_mask(Some(body));

    let lines = format!(
        "frame      {frame}\nreference  {w:.0}×{h:.0}\nscale      {:.3}\naxis       {:?}",
        r.coords().scale_factor(),
        r.coords().fixed_axis()
    );
    let body_text = r.default_text_format();
    r.draw_text(&lines, body, &body_text);
    let measured = r.measure_text(&lines, &body_text);

    // Gradient bar under the text; wider than the body so the mask trims it.
    let bar = Rect::new(body.left - 40.0, body.top + measured.y + 12.0, body.width() + 80.0, 18.0);
    let uv = r.blank_uv();
    r.fill_rect_uvs_colors(
        bar,
        [uv; 4],
        [ACCENT, PANEL_EDGE, PANEL_EDGE, ACCENT],
    );

    // Rotated square straddling the body edge goes through the clipper.
    let c = Vec2::new(body.right, body.top + measured.y + 80.0);
    r.set_color(ACCENT);
    r.fill_quad_points([
        Vec2::new(c.x, c.y - 30.0),
        Vec2::new(c.x + 30.0, c.y),
        Vec2::new(c.x, c.y + 30.0),
        Vec2::new(c.x - 30.0, c.y),
    ]);
    r.set_mask(None);

    // ── textured quad and triangle ────────────────────────────────────────
    let tile = Rect::new(w - 180.0, 40.0, 128.0, 128.0);
    r.set_texture(checker);
    r.set_color(Color32::WHITE);
    r.fill_rect_uvs(
        tile,
        [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)],
    );
    let white = Color32::WHITE;
    r.fill_triangle(&[
        Vertex::new(Vec2::new(tile.left, tile.bottom + 20.0), Vec2::new(0.0, 0.0), white),
        Vertex::new(Vec2::new(tile.right, tile.bottom + 20.0), Vec2::new(1.0, 0.0), ACCENT),
        Vertex::new(Vec2::new(tile.left, tile.bottom + 120.0), Vec2::new(0.0, 1.0), PANEL_EDGE),
    ]);
    r.reset_texture();

    r.set_color(PANEL_EDGE);
    r.draw_rect(tile, 3.0);
    r.fill_triangle_points([
        Vec2::new(tile.right, tile.bottom + 20.0),
        Vec2::new(tile.right, tile.bottom + 120.0),
        Vec2::new(tile.left, tile.bottom + 120.0),
    ]);

    // ── footer: centered, shrunk to fit ───────────────────────────────────
    let footer = Rect::new(w * 0.5, h - 80.0, w * 0.5 - 24.0, 56.0);
    r.set_color(PANEL_BG);
    r.fill_rect(footer);
    r.set_color(TEXT);
    let fit = r
        .default_text_format()
        .with_align(HorizontalAlign::Center)
        .with_vertical_align(VerticalAlign::Middle)
        .with_overflow(Overflow::Shrink);
    r.draw_text("centered, middle-aligned text shrunk to fit its box", footer, &fit);
    r.draw_vertical_line(footer.left, footer.top, footer.height(), 2.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_alternates() {
        let px = checker_pixels();
        assert_eq!(px.len(), (CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
        assert_eq!(px[0], 255);
        assert_eq!(px[4], 60);
        assert_eq!(px[(CHECKER_SIZE * 4) as usize], 60);
    }
}
