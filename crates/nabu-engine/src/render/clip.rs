//! Sutherland–Hodgman clipping of triangles and convex quads against the mask.

use crate::coords::Rect;

use super::Vertex;

/// Capacity of [`VertexList`]. A quad gains at most one vertex per clip pass.
pub const MAX_CLIP_VERTICES: usize = 8;

/// Fixed-capacity, stack-allocated vertex list used while clipping.
#[derive(Debug, Copy, Clone, Default)]
pub struct VertexList {
    items: [Vertex; MAX_CLIP_VERTICES],
    len: usize,
}

impl VertexList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(vertices: &[Vertex]) -> Self {
        let mut list = Self::new();
        for v in vertices {
            list.push(*v);
        }
        list
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Appends `v`; a full list drops it.
    ///
    /// Only self-intersecting input can fill the list while clipping.
    #[inline]
    pub fn push(&mut self, v: Vertex) {
        if self.len == MAX_CLIP_VERTICES {
            return;
        }
        self.items[self.len] = v;
        self.len += 1;
    }

    #[inline]
    pub fn get(&self, i: usize) -> Vertex {
        debug_assert!(i < self.len);
        self.items[i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, v: Vertex) {
        debug_assert!(i < self.len);
        self.items[i] = v;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vertex] {
        &self.items[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Vertex> {
        self.as_slice().iter()
    }
}

#[derive(Debug, Copy, Clone)]
enum Boundary {
    Left(f32),
    Top(f32),
    Right(f32),
    Bottom(f32),
}

impl Boundary {
    #[inline]
    fn coord(self, v: &Vertex) -> f32 {
        match self {
            Boundary::Left(_) | Boundary::Right(_) => v.x(),
            Boundary::Top(_) | Boundary::Bottom(_) => v.y(),
        }
    }

    #[inline]
    fn bound(self) -> f32 {
        match self {
            Boundary::Left(b) | Boundary::Top(b) | Boundary::Right(b) | Boundary::Bottom(b) => b,
        }
    }

    #[inline]
    fn inside(self, v: &Vertex) -> bool {
        match self {
            Boundary::Left(b) => v.x() >= b,
            Boundary::Top(b) => v.y() >= b,
            Boundary::Right(b) => v.x() <= b,
            Boundary::Bottom(b) => v.y() <= b,
        }
    }

    /// Vertex where the edge `cur`→`prev` crosses the boundary.
    #[inline]
    fn crossing(self, cur: &Vertex, prev: &Vertex) -> Vertex {
        let c = self.coord(cur);
        let t = (self.bound() - c) / (self.coord(prev) - c);
        Vertex::lerp(cur, prev, t)
    }
}

/// One half-plane pass: reads `input` in winding order, writes kept and
/// crossing vertices into `output`.
fn clip_pass(input: &VertexList, output: &mut VertexList, boundary: Boundary) {
    output.clear();
    if input.is_empty() {
        return;
    }

    let mut prev = input.get(input.len() - 1);
    for cur in input.iter() {
        let cur_in = boundary.inside(cur);
        let prev_in = boundary.inside(&prev);

        if cur_in {
            if !prev_in {
                output.push(boundary.crossing(cur, &prev));
            }
            output.push(*cur);
        } else if prev_in {
            output.push(boundary.crossing(cur, &prev));
        }

        prev = *cur;
    }
}

/// Clips a triangle or convex quad against `mask` (left, top, right, bottom
/// passes in that order).
///
/// Input must be convex. Self-intersecting quads do not panic, but their
/// output is truncated to [`MAX_CLIP_VERTICES`] and is not meaningful.
///
/// Returns an empty list as soon as a pass leaves two vertices or fewer.
pub fn clip_polygon(polygon: &VertexList, mask: Rect) -> VertexList {
    let passes = [
        Boundary::Left(mask.left),
        Boundary::Top(mask.top),
        Boundary::Right(mask.right),
        Boundary::Bottom(mask.bottom),
    ];

    let mut current = *polygon;
    let mut scratch = VertexList::new();

    for boundary in passes {
        clip_pass(&current, &mut scratch, boundary);
        if scratch.len() <= 2 {
            return VertexList::new();
        }
        std::mem::swap(&mut current, &mut scratch);
    }

    current
}
