use crate::camera::PerspectiveCamera;
use crate::scene::{Geometry, Material, Scene};
use cubeview_frame::ProjectionCamera;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a camera, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen by `camera`.
    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Text renderer for headless runs.
///
/// Produces a human-readable description of what a GPU frame would contain.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let mut out = String::new();
        let ambient = scene.ambient_term();
        let _ = writeln!(
            out,
            "=== Scene (meshes={}, ambient=({:.3}, {:.3}, {:.3})) ===",
            scene.len(),
            ambient.r,
            ambient.g,
            ambient.b
        );
        let (p, t) = (camera.position, camera.target());
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
            p.x,
            p.y,
            p.z,
            t.x,
            t.y,
            t.z,
            camera.fov_degrees(),
            camera.aspect()
        );

        for mesh in scene.meshes() {
            let Geometry::Box {
                width,
                height,
                depth,
            } = mesh.geometry;
            let material = match mesh.material {
                Material::Normal => "normal".to_string(),
                Material::Lit { color } => {
                    format!("lit({:.2}, {:.2}, {:.2})", color.r, color.g, color.b)
                }
            };
            let pos = mesh.transform.position;
            let _ = writeln!(
                out,
                "  [{}] box {width:.2}x{height:.2}x{depth:.2} material={material} pos=({:.2}, {:.2}, {:.2})",
                mesh.name, pos.x, pos.y, pos.z
            );
        }

        out
    }
}
