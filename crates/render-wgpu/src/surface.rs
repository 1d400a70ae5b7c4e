use crate::gpu::WgpuRenderer;
use cubeview_common::{Extent, RendererConfig};
use cubeview_frame::{BackingBuffer, RenderTarget};
use cubeview_render::{PerspectiveCamera, Scene};
use std::sync::Arc;
use winit::window::Window;

const MSAA_SAMPLES: u32 = 4;

/// Errors from bringing up the GPU for a window.
#[derive(Debug, thiserror::Error)]
pub enum GpuInitError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// A window surface seen as a render target.
///
/// The drawable size is the window's inner size; the backing buffer is the
/// configured surface. A zero-sized backing buffer is recorded as requested
/// but configured as 1x1 and skipped when drawing.
pub struct SurfaceTarget {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    backing: Extent,
    backend: wgpu::Backend,
}

impl SurfaceTarget {
    /// Create a surface for `window` with its backing buffer at the window's
    /// current inner size.
    pub fn new(window: Arc<Window>, settings: &RendererConfig) -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuInitError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubeview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let alpha_mode = if settings.transparent {
            [
                wgpu::CompositeAlphaMode::PreMultiplied,
                wgpu::CompositeAlphaMode::PostMultiplied,
            ]
            .into_iter()
            .find(|mode| surface_caps.alpha_modes.contains(mode))
            .unwrap_or(surface_caps.alpha_modes[0])
        } else {
            surface_caps.alpha_modes[0]
        };

        let sample_count = if settings.antialias
            && adapter
                .get_texture_format_features(surface_format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        {
            MSAA_SAMPLES
        } else {
            1
        };

        let size = window.inner_size();
        let backing = Extent::new(size.width, size.height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: backing.width.max(1),
            height: backing.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            backing,
            sample_count,
            settings.effective_clear_color(),
        );

        let backend = adapter.get_info().backend;
        tracing::info!(
            backend = backend.to_str(),
            format = ?surface_format,
            sample_count,
            %backing,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            backing,
            backend,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn backend(&self) -> wgpu::Backend {
        self.backend
    }

    fn configure(&mut self) {
        self.config.width = self.backing.width.max(1);
        self.config.height = self.backing.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(
            &self.device,
            Extent::new(self.config.width, self.config.height),
        );
    }
}

impl BackingBuffer for SurfaceTarget {
    fn drawable_size(&self) -> Extent {
        let size = self.window.inner_size();
        Extent::new(size.width, size.height)
    }

    fn backing_size(&self) -> Extent {
        self.backing
    }

    fn set_backing_size(&mut self, size: Extent) {
        self.backing = size;
        self.configure();
    }
}

impl RenderTarget<Scene, PerspectiveCamera> for SurfaceTarget {
    /// Draw and present. A lost or outdated surface is reconfigured and the
    /// frame is dropped; the scheduler counts it in `frames_dropped`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> bool {
        if self.backing.is_empty() {
            return false;
        }

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated, reconfiguring");
                self.configure();
                return false;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return false;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.device, &self.queue, &view, scene, camera);

        self.window.pre_present_notify();
        output.present();
        true
    }
}
