use std::collections::{HashMap, HashSet};

use cgmath::Matrix4;

use crate::render::{
    DrawCall, Material, RenderCtx, RenderSurface, RenderTarget, TextureId, Vertex,
};
use crate::text::FontAtlas;

use super::common::{Globals, globals_binding_size, globals_stride, premul_alpha_blend, vertex_layout};

// ── pipelines ─────────────────────────────────────────────────────────────

struct Pipelines {
    format: wgpu::TextureFormat,
    text: wgpu::RenderPipeline,
    textured: wgpu::RenderPipeline,
}

impl Pipelines {
    #[inline]
    fn for_material(&self, material: Material) -> &wgpu::RenderPipeline {
        match material {
            Material::Text => &self.text,
            Material::Textured => &self.textured,
        }
    }
}

// ── overlay ───────────────────────────────────────────────────────────────

/// wgpu host surface for [`Renderer2D`](crate::render::Renderer2D) output.
///
/// Owns the overlay pipelines, the glyph-atlas texture and the per-frame
/// vertex/index/uniform buffers, which grow to the next power of two when a
/// frame outgrows them. Each [`DrawCall`] selects a pipeline by material, a
/// texture bind group by id and a dynamic offset into the uniform buffer
/// holding `projection * transform`.
pub struct WgpuOverlay {
    shader: wgpu::ShaderModule,
    globals_bgl: wgpu::BindGroupLayout,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipelines: Option<Pipelines>,

    // per-draw uniforms
    globals_stride: u64,
    globals_buffer: Option<wgpu::Buffer>,
    globals_bind_group: Option<wgpu::BindGroup>,
    globals_capacity: usize,

    // geometry
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    index_buffer: Option<wgpu::Buffer>,
    index_capacity: usize,

    // textures
    atlas_texture: Option<wgpu::Texture>,
    atlas_size: u32,
    atlas_revision: Option<u64>,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    next_texture: u32,
    warned_unknown: HashSet<TextureId>,
}

impl WgpuOverlay {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("nabu overlay shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/overlay.wgsl").into()),
        });

        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu overlay globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(globals_binding_size()),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu overlay texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("nabu overlay sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            shader,
            globals_bgl,
            texture_bgl,
            sampler,
            pipelines: None,
            globals_stride: globals_stride(device),
            globals_buffer: None,
            globals_bind_group: None,
            globals_capacity: 0,
            vertex_buffer: None,
            vertex_capacity: 0,
            index_buffer: None,
            index_capacity: 0,
            atlas_texture: None,
            atlas_size: 0,
            atlas_revision: None,
            textures: HashMap::new(),
            next_texture: 1,
            warned_unknown: HashSet::new(),
        }
    }

    /// Makes `view` drawable through the returned id.
    pub fn register_texture(&mut self, ctx: &RenderCtx<'_>, view: &wgpu::TextureView) -> TextureId {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;

        let bind_group = self.texture_bind_group(ctx, view);
        self.textures.insert(id, bind_group);
        log::debug!("overlay texture registered as {id:?}");
        id
    }

    /// Re-uploads the glyph atlas when its pixels changed since the last sync.
    ///
    /// The texture is recreated when the atlas was resized.
    pub fn sync_atlas(&mut self, ctx: &RenderCtx<'_>, atlas: &FontAtlas) {
        if self.atlas_revision == Some(atlas.revision()) {
            return;
        }

        let size = atlas.size();
        if self.atlas_texture.is_none() || self.atlas_size != size {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("nabu glyph atlas"),
                size: wgpu::Extent3d { width: size, height: size, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = self.texture_bind_group(ctx, &view);
            self.textures.insert(TextureId::GLYPH_ATLAS, bind_group);
            self.atlas_texture = Some(texture);
            self.atlas_size = size;
            log::debug!("glyph atlas texture created ({size}×{size})");
        }

        let Some(texture) = self.atlas_texture.as_ref() else { return; };
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size),
                rows_per_image: Some(size),
            },
            wgpu::Extent3d { width: size, height: size, depth_or_array_layers: 1 },
        );
        self.atlas_revision = Some(atlas.revision());
    }

    /// Starts a frame that draws into `target` with `projection` applied
    /// after each batch transform.
    pub fn frame<'f>(
        &'f mut self,
        ctx: &'f RenderCtx<'f>,
        target: RenderTarget<'f>,
        projection: Matrix4<f32>,
    ) -> WgpuFrame<'f> {
        WgpuFrame {
            overlay: self,
            ctx,
            target,
            projection,
            calls: Vec::new(),
        }
    }

    fn texture_bind_group(&self, ctx: &RenderCtx<'_>, view: &wgpu::TextureView) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nabu overlay texture bind group"),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipelines.as_ref().is_some_and(|p| p.format == ctx.target_format) {
            return;
        }

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nabu overlay pipeline layout"),
            bind_group_layouts: &[&self.globals_bgl, &self.texture_bgl],
            immediate_size: 0,
        });

        let build = |label: &str, fragment: &str| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some(fragment),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.target_format,
                        blend: Some(premul_alpha_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let text = build("nabu overlay text pipeline", "fs_text");
        let textured = build("nabu overlay textured pipeline", "fs_textured");

        self.pipelines = Some(Pipelines { format: ctx.target_format, text, textured });
        log::debug!("overlay pipelines built for {:?}", ctx.target_format);
    }

    fn ensure_geometry_capacity(&mut self, ctx: &RenderCtx<'_>, vertices: usize, indices: usize) {
        if vertices > self.vertex_capacity || self.vertex_buffer.is_none() {
            let cap = vertices.next_power_of_two().max(64);
            self.vertex_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("nabu overlay vbo"),
                size: (cap * std::mem::size_of::<Vertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = cap;
        }

        if indices > self.index_capacity || self.index_buffer.is_none() {
            let cap = indices.next_power_of_two().max(64);
            self.index_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("nabu overlay ibo"),
                size: (cap * std::mem::size_of::<u32>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.index_capacity = cap;
        }
    }

    fn ensure_globals_capacity(&mut self, ctx: &RenderCtx<'_>, draws: usize) {
        if draws <= self.globals_capacity && self.globals_bind_group.is_some() {
            return;
        }

        let cap = draws.next_power_of_two().max(64);
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("nabu overlay globals ubo"),
            size: cap as u64 * self.globals_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nabu overlay globals bind group"),
            layout: &self.globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: Some(globals_binding_size()),
                }),
            }],
        });

        self.globals_buffer = Some(buffer);
        self.globals_bind_group = Some(bind_group);
        self.globals_capacity = cap;
    }

    // ── frame helpers ──────────────────────────────────────────────────────

    fn upload_geometry(&mut self, ctx: &RenderCtx<'_>, vertices: &[Vertex], indices: &[u32]) {
        self.ensure_geometry_capacity(ctx, vertices.len(), indices.len());

        if let Some(vbo) = self.vertex_buffer.as_ref() {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(vertices));
        }
        if let Some(ibo) = self.index_buffer.as_ref() {
            ctx.queue.write_buffer(ibo, 0, bytemuck::cast_slice(indices));
        }
    }

    fn encode(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        projection: Matrix4<f32>,
        calls: &[DrawCall],
    ) {
        if calls.is_empty() {
            return;
        }

        // ── mutable operations before any immutable borrows ────────────────
        self.ensure_pipelines(ctx);
        self.ensure_globals_capacity(ctx, calls.len());

        for call in calls {
            if !self.textures.contains_key(&call.texture) && self.warned_unknown.insert(call.texture) {
                log::warn!("overlay: unknown texture {:?}, skipping its draws", call.texture);
            }
        }

        let stride = self.globals_stride as usize;
        let mut uniforms = vec![0u8; stride * calls.len()];
        for (i, call) in calls.iter().enumerate() {
            let globals = Globals::new(projection, call.transform);
            let bytes = bytemuck::bytes_of(&globals);
            uniforms[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }

        // ── immutable borrows ──────────────────────────────────────────────
        let Some(pipelines)  = self.pipelines.as_ref()          else { return; };
        let Some(globals)    = self.globals_buffer.as_ref()     else { return; };
        let Some(globals_bg) = self.globals_bind_group.as_ref() else { return; };
        let Some(vbo)        = self.vertex_buffer.as_ref()      else { return; };
        let Some(ibo)        = self.index_buffer.as_ref()       else { return; };

        ctx.queue.write_buffer(globals, 0, &uniforms);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("nabu overlay pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

        for (i, call) in calls.iter().enumerate() {
            let Some(texture_bg) = self.textures.get(&call.texture) else { continue; };
            rpass.set_pipeline(pipelines.for_material(call.material));
            rpass.set_bind_group(0, globals_bg, &[(i * stride) as u32]);
            rpass.set_bind_group(1, texture_bg, &[]);
            rpass.draw_indexed(call.indices.clone(), 0, 0..1);
        }
    }
}

// ── frame ─────────────────────────────────────────────────────────────────

/// One frame of overlay drawing; pass it to
/// [`Renderer2D::flush`](crate::render::Renderer2D::flush).
///
/// Draw calls are collected and encoded into a single render pass that loads
/// the existing target contents when the frame ends.
pub struct WgpuFrame<'f> {
    overlay: &'f mut WgpuOverlay,
    ctx: &'f RenderCtx<'f>,
    target: RenderTarget<'f>,
    projection: Matrix4<f32>,
    calls: Vec<DrawCall>,
}

impl RenderSurface for WgpuFrame<'_> {
    fn begin_frame(&mut self, vertices: &[Vertex], indices: &[u32]) {
        self.calls.clear();
        self.overlay.upload_geometry(self.ctx, vertices, indices);
    }

    fn draw(&mut self, call: &DrawCall) {
        self.calls.push(call.clone());
    }

    fn end_frame(&mut self) {
        let calls = std::mem::take(&mut self.calls);
        self.overlay.encode(self.ctx, &mut self.target, self.projection, &calls);
    }
}
