use cgmath::Matrix4;

use super::geometry::GeometryAccumulator;
use super::surface::{DrawCall, FrameStats, Material, RenderSurface, TextureId};

/// Contiguous index range drawn with one texture/transform/material.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub texture: TextureId,
    pub transform: Matrix4<f32>,
    pub material: Material,
    pub start: u32,
}

/// Groups the frame's index stream into ordered batches.
///
/// A batch is opened whenever the (texture, transform) pair of the next shape
/// differs from the last opened batch. A trailing batch that has not received
/// any index yet is re-targeted instead of being left empty.
#[derive(Debug, Default)]
pub struct SubmeshBatcher {
    batches: Vec<Batch>,
}

impl SubmeshBatcher {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { batches: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Makes sure the shape about to be appended at `index_len` lands in a
    /// batch keyed by `texture` and `transform`.
    pub fn begin_shape(&mut self, texture: TextureId, transform: Matrix4<f32>, index_len: usize) {
        let start = index_len as u32;

        if let Some(last) = self.batches.last_mut() {
            if last.texture == texture && last.transform == transform {
                return;
            }
            if last.start == start {
                last.texture = texture;
                last.transform = transform;
                last.material = Material::for_texture(texture);
                return;
            }
        }

        self.batches.push(Batch {
            texture,
            transform,
            material: Material::for_texture(texture),
            start,
        });
    }

    /// Issues every non-empty batch to `surface` in emission order, then
    /// clears the batches and `geometry`.
    pub fn flush<S: RenderSurface + ?Sized>(
        &mut self,
        geometry: &mut GeometryAccumulator,
        surface: &mut S,
    ) -> FrameStats {
        let end = geometry.index_count() as u32;
        let mut stats = FrameStats::default();

        if !geometry.is_empty() && !self.batches.is_empty() {
            surface.begin_frame(geometry.vertices(), geometry.indices());

            for (i, batch) in self.batches.iter().enumerate() {
                let batch_end = self.batches.get(i + 1).map_or(end, |next| next.start);
                if batch_end <= batch.start {
                    continue;
                }
                surface.draw(&DrawCall {
                    texture: batch.texture,
                    material: batch.material,
                    transform: batch.transform,
                    indices: batch.start..batch_end,
                });
                stats.draw_calls += 1;
            }

            surface.end_frame();

            stats.vertices = geometry.vertices().len();
            stats.indices = geometry.index_count();
        }

        log::trace!(
            "flush: {} draw call(s), {} vertices, {} indices",
            stats.draw_calls,
            stats.vertices,
            stats.indices
        );

        self.batches.clear();
        geometry.clear();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Vertex;
    use crate::render::surface::testing::RecordingSurface;

    fn identity() -> Matrix4<f32> {
        Matrix4::from_scale(1.0)
    }

    fn emit(batcher: &mut SubmeshBatcher, geo: &mut GeometryAccumulator, tex: u32, transform: Matrix4<f32>) {
        batcher.begin_shape(TextureId(tex), transform, geo.index_count());
        geo.add_triangle(&[Vertex::default(); 3]);
    }

    #[test]
    fn batches_follow_texture_changes_not_shape_count() {
        let mut batcher = SubmeshBatcher::default();
        let mut geo = GeometryAccumulator::default();

        for tex in [0, 0, 0, 1, 1, 0, 0, 2] {
            emit(&mut batcher, &mut geo, tex, identity());
        }

        let mut surface = RecordingSurface::default();
        let stats = batcher.flush(&mut geo, &mut surface);

        assert_eq!(stats.draw_calls, 4);
        let ranges: Vec<_> = surface.calls.iter().map(|c| c.indices.clone()).collect();
        assert_eq!(ranges, vec![0..9, 9..15, 15..21, 21..24]);
        let textures: Vec<_> = surface.calls.iter().map(|c| c.texture.0).collect();
        assert_eq!(textures, vec![0, 1, 0, 2]);
    }

    #[test]
    fn transform_change_opens_batch() {
        let mut batcher = SubmeshBatcher::default();
        let mut geo = GeometryAccumulator::default();

        emit(&mut batcher, &mut geo, 0, identity());
        emit(&mut batcher, &mut geo, 0, Matrix4::from_scale(2.0));
        emit(&mut batcher, &mut geo, 0, Matrix4::from_scale(2.0));

        assert_eq!(batcher.batches().len(), 2);
    }

    #[test]
    fn material_follows_texture() {
        let mut batcher = SubmeshBatcher::default();
        let mut geo = GeometryAccumulator::default();
        emit(&mut batcher, &mut geo, 0, identity());
        emit(&mut batcher, &mut geo, 7, identity());

        let mut surface = RecordingSurface::default();
        batcher.flush(&mut geo, &mut surface);
        assert_eq!(surface.calls[0].material, Material::Text);
        assert_eq!(surface.calls[1].material, Material::Textured);
    }

    #[test]
    fn empty_trailing_batch_is_retargeted() {
        let mut batcher = SubmeshBatcher::default();
        batcher.begin_shape(TextureId(3), identity(), 0);
        batcher.begin_shape(TextureId(4), identity(), 0);
        assert_eq!(batcher.batches().len(), 1);
        assert_eq!(batcher.batches()[0].texture, TextureId(4));
    }

    #[test]
    fn empty_frame_makes_no_surface_calls() {
        let mut batcher = SubmeshBatcher::default();
        let mut geo = GeometryAccumulator::default();
        let mut surface = RecordingSurface::default();

        let stats = batcher.flush(&mut geo, &mut surface);

        assert_eq!(stats, FrameStats::default());
        assert_eq!(surface.frames, 0);
        assert_eq!(surface.ended, 0);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn flush_resets_state() {
        let mut batcher = SubmeshBatcher::default();
        let mut geo = GeometryAccumulator::default();
        emit(&mut batcher, &mut geo, 0, identity());

        let mut surface = RecordingSurface::default();
        batcher.flush(&mut geo, &mut surface);
        assert_eq!(surface.frames, 1);
        assert_eq!(surface.ended, 1);
        assert_eq!(surface.indices, vec![0, 1, 2]);

        assert!(batcher.batches().is_empty());
        assert!(geo.vertices().is_empty());
        assert!(geo.is_empty());

        let stats = batcher.flush(&mut geo, &mut surface);
        assert_eq!(stats.draw_calls, 0);
        assert_eq!(surface.frames, 1);
    }
}
