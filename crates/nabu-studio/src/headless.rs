use anyhow::{Context, Result};

/// Initialization parameters for the offscreen GPU target.
#[derive(Debug, Clone)]
pub struct HeadlessInit {
    /// Render into an sRGB target.
    pub prefer_srgb: bool,

    /// Target size in pixels.
    pub width: u32,
    pub height: u32,

    /// Vertical half-extent of scene space.
    pub half_height: f32,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for HeadlessInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            width: 1280,
            height: 720,
            half_height: 5.0,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

/// Device, queue and an offscreen color target.
pub struct Headless {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    // Kept alive for `view`.
    _target: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Headless {
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: &HeadlessInit) -> Result<Self> {
        anyhow::ensure!(init.width > 0 && init.height > 0, "target has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("nabu-studio device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let format = if init.prefer_srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("nabu-studio target"),
            size: wgpu::Extent3d {
                width: init.width,
                height: init.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        log::info!(
            "headless target {}×{} {format:?} on {:?}",
            init.width,
            init.height,
            adapter.get_info().backend
        );

        Ok(Self { device, queue, format, _target: target, view })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
