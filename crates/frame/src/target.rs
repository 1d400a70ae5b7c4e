use cubeview_common::Extent;

/// A render target whose pixel storage can differ from its on-screen size.
pub trait BackingBuffer {
    /// Current on-screen size of the viewport element, in pixels.
    fn drawable_size(&self) -> Extent;

    /// Current size of the pixel storage the renderer draws into.
    fn backing_size(&self) -> Extent;

    /// Reallocate the pixel storage to `size`.
    fn set_backing_size(&mut self, size: Extent);
}

/// A backing buffer that can draw a scene `S` through a camera `C`.
pub trait RenderTarget<S, C>: BackingBuffer {
    /// Draw one frame. Returns false if nothing reached the screen, e.g. the
    /// surface had to be reconfigured or the backing buffer is empty.
    fn render(&mut self, scene: &S, camera: &C) -> bool;
}

/// The camera surface the scheduler touches.
///
/// Setting the aspect leaves the projection matrix stale until
/// [`update_projection_matrix`](Self::update_projection_matrix) is called.
pub trait ProjectionCamera {
    fn aspect(&self) -> f32;
    fn set_aspect(&mut self, aspect: f32);
    fn update_projection_matrix(&mut self);
}

/// Navigation controls advanced once per rendered frame.
pub trait CameraControls<C> {
    /// Consume input accumulated since the last rendered frame and move the
    /// camera. Returns true if the camera changed.
    fn update(&mut self, camera: &mut C) -> bool;
}

/// Asks the platform for the next animation opportunity.
pub trait FrameRequester {
    fn request_frame(&mut self);
}

impl<F: FnMut()> FrameRequester for F {
    fn request_frame(&mut self) {
        self()
    }
}
