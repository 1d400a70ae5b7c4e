use cubeview_common::CameraConfig;
use cubeview_frame::ProjectionCamera;
use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point.
///
/// The projection matrix is cached. Changing the aspect ratio or field of
/// view marks it dirty; [`ProjectionCamera::update_projection_matrix`]
/// rebuilds it.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    target: Vec3,
    fov: f32,
    aspect: f32,
    projection: Mat4,
    projection_dirty: bool,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let fov = fov_degrees.to_radians();
        Self {
            position: Vec3::ZERO,
            up: Vec3::Y,
            near,
            far,
            target: Vec3::NEG_Z,
            fov,
            aspect,
            projection: Mat4::perspective_rh(fov, aspect, near, far),
            projection_dirty: false,
        }
    }

    /// Camera on the +Z axis at `config.distance`, looking at the origin.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(config.fov_degrees, aspect, config.near, config.far);
        camera.position = Vec3::new(0.0, 0.0, config.distance);
        camera.look_at(Vec3::ZERO);
        camera
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov = fov_degrees.to_radians();
        self.projection_dirty = true;
    }

    /// True between an aspect or fov change and the next projection update.
    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// The cached projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

impl ProjectionCamera for PerspectiveCamera {
    fn aspect(&self) -> f32 {
        self.aspect
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_dirty = true;
    }

    fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        self.projection_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
        assert!((cam.fov_degrees() - 75.0).abs() < 1e-4);
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn aspect_change_is_deferred_until_update() {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        let before = cam.projection_matrix();

        cam.set_aspect(2.0);
        assert!(cam.is_projection_dirty());
        assert_eq!(cam.projection_matrix(), before);

        cam.update_projection_matrix();
        assert!(!cam.is_projection_dirty());
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh(75.0_f32.to_radians(), 2.0, 0.1, 1000.0)
        );
    }

    #[test]
    fn update_is_idempotent() {
        let mut cam = PerspectiveCamera::default();
        cam.update_projection_matrix();
        let once = cam.projection_matrix();
        cam.update_projection_matrix();
        assert_eq!(cam.projection_matrix(), once);
    }

    #[test]
    fn fov_change_marks_dirty() {
        let mut cam = PerspectiveCamera::default();
        cam.set_fov_degrees(50.0);
        assert!(cam.is_projection_dirty());
    }

    #[test]
    fn forward_points_at_target() {
        let cam = PerspectiveCamera::default();
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-6);
    }
}
