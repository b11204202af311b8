//! GPU-side types shared by the overlay pipelines.

use bytemuck::{Pod, Zeroable};
use cgmath::Matrix4;

use crate::render::Vertex;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── per-batch uniform ─────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct Globals {
    pub view_proj: [[f32; 4]; 4],
}

impl Globals {
    #[inline]
    pub(super) fn new(projection: Matrix4<f32>, transform: Matrix4<f32>) -> Self {
        Self { view_proj: (projection * transform).into() }
    }
}

/// Minimum binding size of the [`Globals`] uniform.
///
/// `Globals` is a 64-byte matrix, so the size is always non-zero.
pub(super) fn globals_binding_size() -> wgpu::BufferSize {
    wgpu::BufferSize::new(std::mem::size_of::<Globals>() as u64)
        .expect("Globals has non-zero size by construction")
}

/// Distance between per-draw uniforms, rounded up to the device's dynamic
/// offset alignment.
pub(super) fn globals_stride(device: &wgpu::Device) -> u64 {
    let align = u64::from(device.limits().min_uniform_buffer_offset_alignment).max(1);
    (std::mem::size_of::<Globals>() as u64).div_ceil(align) * align
}

// ── vertex layout ─────────────────────────────────────────────────────────

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x2, // uv
    2 => Unorm8x4   // color
];

pub(super) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector3};

    #[test]
    fn vertex_layout_matches_vertex_struct() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 20);
    }

    #[test]
    fn globals_compose_projection_after_transform() {
        let projection = Matrix4::from_nonuniform_scale(0.5, 0.5, 1.0);
        let transform = Matrix4::from_translation(Vector3::new(2.0, 4.0, 0.0));
        let g = Globals::new(projection, transform);
        // Column-major: translation lives in the fourth column.
        assert_eq!(g.view_proj[3][0], 1.0);
        assert_eq!(g.view_proj[3][1], 2.0);

        let identity = Globals::new(Matrix4::identity(), Matrix4::identity());
        assert_eq!(identity.view_proj[0][0], 1.0);
    }
}
