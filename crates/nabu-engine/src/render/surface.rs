use std::ops::Range;

use cgmath::Matrix4;

use super::Vertex;

/// Opaque texture handle understood by the host surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub u32);

impl TextureId {
    /// The glyph atlas, which also carries the blank cell used for solid fills.
    pub const GLYPH_ATLAS: TextureId = TextureId(0);
}

impl Default for TextureId {
    fn default() -> Self {
        TextureId::GLYPH_ATLAS
    }
}

/// Shading program for a batch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Material {
    /// Coverage from the glyph atlas' single channel, tinted by vertex color.
    Text,
    /// RGBA texture modulated by vertex color.
    Textured,
}

impl Material {
    #[inline]
    pub fn for_texture(texture: TextureId) -> Self {
        if texture == TextureId::GLYPH_ATLAS { Material::Text } else { Material::Textured }
    }
}

/// One draw issued to the host surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture: TextureId,
    pub material: Material,
    /// Virtual → scene transform for the batch.
    pub transform: Matrix4<f32>,
    /// Range into the index buffer passed to [`RenderSurface::begin_frame`].
    pub indices: Range<u32>,
}

/// Host surface contract: receives one frame's geometry, then its draws in order.
///
/// A frame with no geometry produces no calls at all.
pub trait RenderSurface {
    /// Receives the whole frame's vertices and indices once, before any draw.
    fn begin_frame(&mut self, vertices: &[Vertex], indices: &[u32]);

    fn draw(&mut self, call: &DrawCall);

    fn end_frame(&mut self) {}
}

/// Counters returned by a flush.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub vertices: usize,
    pub indices: usize,
}
