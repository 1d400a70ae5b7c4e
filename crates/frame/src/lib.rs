//! Frame scheduling: rate-capped rendering and viewport reconciliation.
//!
//! The scheduler decides, each time the platform offers an animation
//! opportunity, whether to draw, whether the backing buffer must follow the
//! drawable size, and keeps the camera projection consistent with it.
//!
//! # Invariants
//! - `last_tick_ms` only moves forward, and only when a frame is rendered.
//! - Within a rendered frame: resize reconciliation, then controls, then the
//!   projection recompute, then the draw.
//! - Every resize path derives the aspect ratio from the same formula.
//! - A stopped scheduler never requests another frame.
//! - The scheduler owns no collaborator; they are borrowed per call.

mod clock;
mod resize;
mod scheduler;
mod stop;
mod target;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use resize::{apply_viewport_resize, resize_to_display_size};
pub use scheduler::{
    Frame, FrameOutcome, FrameScheduler, FrameStats, TARGET_FRAME_INTERVAL_MS, TickReport,
};
pub use stop::StopToken;
pub use target::{BackingBuffer, CameraControls, FrameRequester, ProjectionCamera, RenderTarget};

pub fn crate_info() -> &'static str {
    "cubeview-frame v0.1.0"
}
