//! Rendering collaborators of the frame loop, independent of any GPU API.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - The camera projection is only rebuilt by `update_projection_matrix`;
//!   changing aspect or field of view marks it dirty.
//! - Orbit controls move the camera only inside `update`, once per rendered
//!   frame.

mod camera;
mod controls;
mod headless;
mod renderer;
mod scene;

pub use camera::PerspectiveCamera;
pub use controls::OrbitControls;
pub use headless::HeadlessTarget;
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{AmbientLight, Geometry, Material, Mesh, MeshId, Scene};

pub fn crate_info() -> &'static str {
    "cubeview-render v0.1.0"
}
