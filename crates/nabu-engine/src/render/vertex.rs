use bytemuck::{Pod, Zeroable};

use crate::coords::{Color32, Vec2};

/// One overlay vertex as uploaded to the GPU (24 bytes).
///
///  offset  0  position  [f32; 3]
///  offset 12  uv        [f32; 2]
///  offset 20  color     [u8; 4]   straight-alpha RGBA
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

impl Vertex {
    #[inline]
    pub fn new(position: Vec2, uv: Vec2, color: Color32) -> Self {
        Self {
            position: [position.x, position.y, 0.0],
            uv: uv.to_array(),
            color: color.to_array(),
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.position[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.position[1]
    }

    #[inline]
    pub fn uv(&self) -> Vec2 {
        Vec2::from(self.uv)
    }

    #[inline]
    pub fn color(&self) -> Color32 {
        Color32::from(self.color)
    }

    /// Interpolates position, uv and color independently (affine, no perspective).
    pub fn lerp(a: &Vertex, b: &Vertex, t: f32) -> Vertex {
        let p = |i: usize| a.position[i] + (b.position[i] - a.position[i]) * t;
        Vertex {
            position: [p(0), p(1), p(2)],
            uv: a.uv().lerp(b.uv(), t).to_array(),
            color: a.color().lerp(b.color(), t).to_array(),
        }
    }
}
