use anyhow::{Context, Result};
use clap::Parser;
use cubeview_common::{Extent, ViewerConfig};
use cubeview_frame::{
    BackingBuffer, Clock, Frame, FrameOutcome, FrameScheduler, MonotonicClock, ProjectionCamera,
};
use cubeview_input::{NavAction, PointerButton, PointerTracker};
use cubeview_render::{OrbitControls, PerspectiveCamera, Scene};
use cubeview_render_wgpu::SurfaceTarget;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    ElementState, KeyEvent, MouseButton, MouseScrollDelta, StartCause, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixels per wheel line for touchpads that report pixel deltas.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Parser)]
#[command(name = "cubeview-desktop", about = "Orbit a cube in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Initial window height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Minimum time between rendered frames
    #[arg(long)]
    frame_interval_ms: Option<f64>,

    /// Start with auto-rotation off
    #[arg(long)]
    no_auto_rotate: bool,

    /// Clear to the configured color instead of transparent
    #[arg(long)]
    opaque: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ViewerConfig::default(),
        };
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if let Some(interval) = self.frame_interval_ms {
            config.frame.target_interval_ms = interval;
        }
        if self.no_auto_rotate {
            config.controls.auto_rotate = false;
        }
        if self.opaque {
            config.renderer.transparent = false;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Everything one viewport needs; nothing is global.
struct ViewerApp {
    config: ViewerConfig,
    clock: MonotonicClock,
    scheduler: FrameScheduler,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    pointer: PointerTracker,
    target: Option<SurfaceTarget>,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(config: ViewerConfig) -> Self {
        let aspect = config.window.extent().aspect_ratio();
        Self {
            clock: MonotonicClock::new(),
            scheduler: FrameScheduler::with_interval(config.frame.target_interval_ms),
            scene: Scene::new(),
            camera: PerspectiveCamera::from_config(&config.camera, aspect),
            controls: OrbitControls::from_config(&config.controls),
            pointer: PointerTracker::new(),
            target: None,
            error: None,
            config,
        }
    }

    fn create_target(&self, event_loop: &ActiveEventLoop) -> Result<SurfaceTarget> {
        let window = &self.config.window;
        let attrs = Window::default_attributes()
            .with_title(window.title.clone())
            .with_inner_size(PhysicalSize::new(window.width, window.height))
            .with_transparent(self.config.renderer.transparent);
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);
        Ok(SurfaceTarget::new(window, &self.config.renderer)?)
    }
}

/// Time left until a skipped frame may render, clamped to one interval.
fn redraw_delay(interval_ms: f64, elapsed_ms: f64) -> Duration {
    let remaining = interval_ms - elapsed_ms;
    let remaining = if remaining.is_nan() {
        interval_ms
    } else {
        remaining.clamp(0.0, interval_ms)
    };
    Duration::from_secs_f64(remaining / 1000.0)
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.target.is_some() {
            return;
        }

        let target = match self.create_target(event_loop) {
            Ok(target) => target,
            Err(e) => {
                tracing::error!("failed to initialize viewport: {e:#}");
                self.error = Some(e);
                event_loop.exit();
                return;
            }
        };

        self.camera
            .set_aspect(target.drawable_size().aspect_ratio());
        self.camera.update_projection_matrix();

        let window = target.window().clone();
        self.target = Some(target);
        self.scene.populate_default(|_| window.request_redraw());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(target) = self.target.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.scheduler.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.scheduler.on_viewport_resize(
                    Extent::new(size.width, size.height),
                    &mut self.camera,
                    target,
                );
            }
            WindowEvent::RedrawRequested => {
                let now = self.clock.now_ms();
                let window = target.window().clone();
                let mut requested = false;
                let report = self.scheduler.tick(
                    now,
                    Frame {
                        scene: &self.scene,
                        camera: &mut self.camera,
                        target,
                        controls: &mut self.controls,
                    },
                    &mut || requested = true,
                );
                if !requested {
                    return;
                }
                // Skipped: wake once the interval has elapsed.
                match report.outcome {
                    FrameOutcome::Skipped { elapsed_ms } => {
                        let delay = redraw_delay(self.scheduler.interval_ms(), elapsed_ms);
                        event_loop
                            .set_control_flow(ControlFlow::WaitUntil(Instant::now() + delay));
                    }
                    _ => window.request_redraw(),
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::KeyR => {
                    let height = target.drawable_size().height;
                    self.controls.apply(NavAction::ToggleAutoRotate, height);
                }
                KeyCode::Escape => {
                    self.scheduler.stop();
                    event_loop.exit();
                }
                _ => {}
            },
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = pointer_button(button) {
                    let action = self
                        .pointer
                        .button(button, state == ElementState::Pressed);
                    self.controls.apply(action, target.drawable_size().height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .pointer
                    .cursor_moved(Vec2::new(position.x as f32, position.y as f32));
                self.controls.apply(action, target.drawable_size().height);
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.cursor_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                let action = self.pointer.wheel(lines);
                self.controls.apply(action, target.drawable_size().height);
            }
            _ => {}
        }
    }

    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            event_loop.set_control_flow(ControlFlow::Wait);
            if let Some(target) = &self.target {
                target.window().request_redraw();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.scheduler.stop();
        let stats = self.scheduler.stats();
        tracing::info!(
            rendered = stats.frames_rendered,
            skipped = stats.frames_skipped,
            dropped = stats.frames_dropped,
            tick_resizes = stats.tick_resizes,
            viewport_resizes = stats.viewport_resizes,
            "viewer exiting"
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.viewer_config()?;
    tracing::info!(
        interval_ms = config.frame.target_interval_ms,
        "cubeview-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
