//! wgpu render backend for the viewer.
//!
//! Draws the scene's box meshes as instances of one unit cube, shaded either
//! by normal direction or by ambient plus a fixed key light. The window
//! surface is exposed to the frame loop as a [`SurfaceTarget`].
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - The surface is only reconfigured through `set_backing_size` or after a
//!   lost/outdated surface; never as a side effect of drawing.
//! - A zero-sized backing buffer is remembered but never drawn into.

mod gpu;
mod shaders;
mod surface;

pub use gpu::WgpuRenderer;
pub use surface::{GpuInitError, SurfaceTarget};
