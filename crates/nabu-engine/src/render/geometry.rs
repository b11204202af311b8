use super::Vertex;
use super::clip::VertexList;

/// Per-frame vertex and triangle-index buffers shared by every shape.
///
/// Both buffers only grow during a frame; [`clear`](Self::clear) keeps the
/// allocation for reuse.
#[derive(Debug, Default)]
pub struct GeometryAccumulator {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GeometryAccumulator {
    /// Creates buffers pre-sized for `triangle_capacity` triangles.
    pub fn with_capacity(triangle_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(triangle_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn push_vertex(&mut self, v: Vertex) {
        self.vertices.push(v);
    }

    #[inline]
    pub fn push_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Two triangles `(i0, i1, i2)` and `(i0, i2, i3)`.
    #[inline]
    pub fn push_quad_indices(&mut self, i0: u32, i1: u32, i2: u32, i3: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
    }

    /// Appends a triangle with its own three vertices.
    pub fn add_triangle(&mut self, v: &[Vertex; 3]) {
        let base = self.vertex_count();
        self.vertices.extend_from_slice(v);
        self.push_triangle(base, base + 1, base + 2);
    }

    /// Appends a quad (four shared vertices, two triangles).
    pub fn add_quad(&mut self, v: &[Vertex; 4]) {
        let base = self.vertex_count();
        self.vertices.extend_from_slice(v);
        self.push_quad_indices(base, base + 1, base + 2, base + 3);
    }

    /// Appends a convex polygon as a triangle fan anchored at its first vertex.
    ///
    /// Polygons with two vertices or fewer emit nothing.
    pub fn add_polygon(&mut self, polygon: &VertexList) {
        let n = polygon.len();
        if n <= 2 {
            return;
        }

        let base = self.vertex_count();
        self.push_vertex(polygon.get(0));
        self.push_vertex(polygon.get(1));

        let mut i = 3;
        while i < n {
            self.push_vertex(polygon.get(i - 1));
            self.push_vertex(polygon.get(i));
            let k = i as u32;
            self.push_quad_indices(base, base + k - 2, base + k - 1, base + k);
            i += 2;
        }

        if n % 2 == 1 {
            self.push_vertex(polygon.get(n - 1));
            let n = n as u32;
            self.push_triangle(base, base + n - 2, base + n - 1);
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}
