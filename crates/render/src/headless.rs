use crate::camera::PerspectiveCamera;
use crate::renderer::{DebugTextRenderer, Renderer};
use crate::scene::Scene;
use cubeview_common::Extent;
use cubeview_frame::{BackingBuffer, RenderTarget};

/// GPU-free render target that records frames as text.
///
/// The drawable size stands in for the on-screen element size and is moved
/// by [`set_drawable_size`](Self::set_drawable_size), the way a window
/// layout change would.
#[derive(Debug)]
pub struct HeadlessTarget {
    drawable: Extent,
    backing: Extent,
    renderer: DebugTextRenderer,
    last_frame: Option<String>,
    draw_count: u64,
    reallocations: u64,
}

impl HeadlessTarget {
    /// Drawable and backing buffer both start at `size`.
    pub fn new(size: Extent) -> Self {
        Self {
            drawable: size,
            backing: size,
            renderer: DebugTextRenderer::new(),
            last_frame: None,
            draw_count: 0,
            reallocations: 0,
        }
    }

    pub fn set_drawable_size(&mut self, size: Extent) {
        self.drawable = size;
    }

    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }

    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }
}

impl BackingBuffer for HeadlessTarget {
    fn drawable_size(&self) -> Extent {
        self.drawable
    }

    fn backing_size(&self) -> Extent {
        self.backing
    }

    fn set_backing_size(&mut self, size: Extent) {
        self.backing = size;
        self.reallocations += 1;
    }
}

impl RenderTarget<Scene, PerspectiveCamera> for HeadlessTarget {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> bool {
        if self.backing.is_empty() {
            return false;
        }
        let mut frame = format!("backing={}\n", self.backing);
        frame.push_str(&self.renderer.render(scene, camera));
        self.last_frame = Some(frame);
        self.draw_count += 1;
        true
    }
}
