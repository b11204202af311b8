mod demo;
mod headless;

use std::path::PathBuf;

use anyhow::{Context, Result};
use nabu_engine::coords::{SurfaceMetrics, Vec2};
use nabu_engine::logging::{LoggingConfig, init_logging};
use nabu_engine::render::{RenderCtx, RenderTarget, Renderer2D, RendererConfig, TextureId};
use nabu_engine::render::backend::WgpuOverlay;
use nabu_engine::text::{AtlasConfig, FontAtlas, FontStyle, GlyphSource};

use headless::{Headless, HeadlessInit};

const FONT_ENV: &str = "NABU_FONT";

const FONT_CANDIDATES: [&str; 5] = [
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let init = HeadlessInit::default();
    let gpu = pollster::block_on(Headless::new(&init)).context("headless GPU setup failed")?;

    let mut atlas = FontAtlas::new(AtlasConfig::default());
    match load_font()? {
        Some(bytes) => atlas
            .load_font(FontStyle::Normal, &bytes)
            .context("failed to parse font")?,
        None => log::warn!("no font found (set {FONT_ENV} or pass a path); text will be skipped"),
    }

    let surface = SurfaceMetrics::new(init.width, init.height, init.half_height);
    let mut renderer = Renderer2D::new(atlas, surface, RendererConfig::default());

    let ctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.format());
    let mut overlay = WgpuOverlay::new(ctx.device);
    let checker = upload_checker(&ctx, &mut overlay);

    for frame in 0..3 {
        demo::draw(&mut renderer, checker, frame);
        overlay.sync_atlas(&ctx, renderer.glyphs());

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("nabu-studio frame encoder"),
        });
        clear(&mut encoder, gpu.view());

        let stats = {
            let target = RenderTarget::new(&mut encoder, gpu.view());
            let mut surface = overlay.frame(&ctx, target, renderer.coords().projection());
            renderer.flush(&mut surface)
        };
        ctx.queue.submit(Some(encoder.finish()));

        log::info!(
            "frame {frame}: {} draw call(s), {} vertices, {} indices",
            stats.draw_calls,
            stats.vertices,
            stats.indices
        );
    }

    // Pointer input arrives in device pixels with +Y up.
    for px in [Vec2::zero(), Vec2::new(init.width as f32 * 0.5, init.height as f32 * 0.5)] {
        let v = renderer.coords().to_virtual(px);
        log::info!("pointer ({:.0}, {:.0}) px -> virtual ({:.1}, {:.1})", px.x, px.y, v.x, v.y);
    }

    let atlas = renderer.dispose();
    log::info!("glyph atlas {0}×{0}, generation {1}", atlas.size(), atlas.generation());
    Ok(())
}

/// Explicit path (first argument, then `NABU_FONT`) or the first system font found.
fn load_font() -> Result<Option<Vec<u8>>> {
    let explicit = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(FONT_ENV).map(PathBuf::from));

    if let Some(path) = explicit {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read font {}", path.display()))?;
        return Ok(Some(bytes));
    }

    Ok(FONT_CANDIDATES.iter().find_map(|p| std::fs::read(p).ok()))
}

fn upload_checker(ctx: &RenderCtx<'_>, overlay: &mut WgpuOverlay) -> TextureId {
    let size = wgpu::Extent3d {
        width: demo::CHECKER_SIZE,
        height: demo::CHECKER_SIZE,
        depth_or_array_layers: 1,
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("nabu-studio checker"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &demo::checker_pixels(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(demo::CHECKER_SIZE * 4),
            rows_per_image: Some(demo::CHECKER_SIZE),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    overlay.register_texture(ctx, &view)
}

fn clear(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("nabu-studio clear pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.05, g: 0.05, b: 0.07, a: 1.0 }),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}
