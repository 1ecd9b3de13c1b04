use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::config::{AntialiasMode, GraphicsConfig};
use crate::coords::Viewport;

use super::surface;
use super::{SurfaceErrorAction, WgpuDevice};

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). `Fifo` when vsync is on.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Defaults with the present mode chosen from the vsync flag.
    pub fn with_vsync(vsync: bool) -> Self {
        Self {
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            ..Self::default()
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

/// A single acquired frame, presented by [`Gpu::submit`].
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Owns wgpu core objects and the surface configuration.
pub struct Gpu<'w> {
    surface: wgpu::Surface<'w>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sgl device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        log::info!(
            "gpu: adapter={:?}, format={format:?}, present={:?}",
            adapter.get_info().name,
            init.present_mode
        );

        Ok(Gpu {
            surface,
            adapter,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.size.width, self.size.height)
    }

    /// Largest sample count not above `mode.samples()` that the surface
    /// format supports.
    pub fn sample_count(&self, mode: AntialiasMode) -> u32 {
        let flags = self
            .adapter
            .get_texture_format_features(self.config.format)
            .flags;
        let mut count = mode.samples();
        while count > 1 && !flags.sample_count_supported(count) {
            count /= 2;
        }
        if count != mode.samples() {
            log::warn!("{mode} unsupported by {:?}; using {count} samples", self.config.format);
        }
        count
    }

    /// Creates the batch-facing device sharing this context's device/queue.
    pub fn create_graphics_device(&self, config: &GraphicsConfig) -> WgpuDevice {
        WgpuDevice::new(
            self.device.clone(),
            self.queue.clone(),
            self.config.format,
            self.viewport(),
            config,
            self.sample_count(config.antialias),
        )
    }

    /// Reconfigures the surface after a resize. A 0x0 size defers configuration.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sgl frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the frame.
    pub fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }

    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }
}
