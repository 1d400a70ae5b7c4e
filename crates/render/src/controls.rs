use crate::camera::PerspectiveCamera;
use cubeview_common::ControlsConfig;
use cubeview_frame::CameraControls;
use cubeview_input::NavAction;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

/// Orbit radius bounds applied on top of the configured distance limits.
const MIN_RADIUS: f32 = 1e-4;
const MAX_RADIUS: f32 = 1e6;

/// Orbit navigation around a target point.
///
/// Pointer input accumulates into a pending spherical delta and a dolly
/// scale; [`update`](CameraControls::update) consumes them once per rendered
/// frame. Auto-rotation advances a fixed angle per update, so its speed is
/// tied to the frame rate.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    // Pending (theta, phi) delta in radians.
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::from_config(&ControlsConfig::default())
    }
}

impl OrbitControls {
    pub fn from_config(config: &ControlsConfig) -> Self {
        Self {
            target: Vec3::ZERO,
            auto_rotate: config.auto_rotate,
            auto_rotate_speed: config.auto_rotate_speed,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    /// Angle added per update while auto-rotating.
    pub fn auto_rotation_angle(&self) -> f32 {
        TAU / 60.0 / 60.0 * self.auto_rotate_speed
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Move closer by `factor` (< 1 zooms in).
    pub fn dolly(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Feed one navigation action. `viewport_height` scales drag deltas so a
    /// drag across the full height is one full turn.
    pub fn apply(&mut self, action: NavAction, viewport_height: u32) {
        match action {
            NavAction::Orbit(delta) => {
                let height = viewport_height.max(1) as f32;
                self.rotate_left(TAU * delta.x / height * self.rotate_speed);
                self.rotate_up(TAU * delta.y / height * self.rotate_speed);
            }
            NavAction::Zoom(lines) => {
                let step = 0.95_f32.powf(self.zoom_speed);
                let factor = step.powf(lines.abs());
                if lines > 0.0 {
                    self.dolly(factor);
                } else {
                    self.dolly(1.0 / factor);
                }
            }
            NavAction::ToggleAutoRotate => {
                self.auto_rotate = !self.auto_rotate;
                tracing::debug!(auto_rotate = self.auto_rotate, "auto-rotate toggled");
            }
            NavAction::Noop => {}
        }
    }

    /// True while input is still waiting to be consumed.
    pub fn has_pending_input(&self) -> bool {
        self.delta_theta.abs() > EPS || self.delta_phi.abs() > EPS || (self.scale - 1.0).abs() > EPS
    }
}

impl CameraControls<PerspectiveCamera> for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > MIN_RADIUS {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };

        if self.auto_rotate {
            self.rotate_left(self.auto_rotation_angle());
        }

        if self.enable_damping {
            theta += self.delta_theta * self.damping_factor;
            phi += self.delta_phi * self.damping_factor;
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
        }

        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        let scaled = radius * self.scale;
        if scaled.is_finite() {
            radius = scaled;
        }
        let lo = self.min_distance.max(MIN_RADIUS);
        let hi = self.max_distance.min(MAX_RADIUS).max(lo);
        radius = radius.clamp(lo, hi);

        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let position = self.target + offset;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        let changed = position.distance_squared(camera.position) > EPS;
        camera.position = position;
        camera.look_at(self.target);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn still_controls() -> OrbitControls {
        let mut controls = OrbitControls::default();
        controls.auto_rotate = false;
        controls
    }

    #[test]
    fn idle_update_leaves_camera_in_place() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = still_controls();
        let start = camera.position;
        assert!(!controls.update(&mut camera));
        assert!((camera.position - start).length() < 1e-4);
    }

    #[test]
    fn auto_rotate_orbits_at_constant_distance() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::default();
        assert!(controls.update(&mut camera));
        assert!((camera.position.length() - 5.0).abs() < 1e-4);
        assert!(camera.position.x < 0.0);
    }

    #[test]
    fn auto_rotate_full_turn_in_thirty_seconds_of_frames() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::default();
        let start = camera.position;
        // 30 s at 60 frames per second with speed 2.0.
        for _ in 0..1800 {
            controls.update(&mut camera);
        }
        assert!((camera.position - start).length() < 1e-2);
    }

    #[test]
    fn drag_is_consumed_by_one_update() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = still_controls();
        controls.apply(NavAction::Orbit(Vec2::new(100.0, 0.0)), 600);
        assert!(controls.has_pending_input());

        assert!(controls.update(&mut camera));
        assert!(!controls.has_pending_input());

        let after = camera.position;
        controls.update(&mut camera);
        assert!((camera.position - after).length() < 1e-4);
    }

    #[test]
    fn full_height_drag_is_a_full_turn() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = still_controls();
        let start = camera.position;
        controls.apply(NavAction::Orbit(Vec2::new(600.0, 0.0)), 600);
        controls.update(&mut camera);
        assert!((camera.position - start).length() < 1e-3);
    }

    #[test]
    fn zoom_in_moves_closer() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = still_controls();
        controls.apply(NavAction::Zoom(1.0), 600);
        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0 * 0.95).abs() < 1e-4);

        controls.apply(NavAction::Zoom(-1.0), 600);
        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn distance_is_clamped() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = still_controls();
        controls.min_distance = 4.0;
        for _ in 0..20 {
            controls.apply(NavAction::Zoom(1.0), 600);
        }
        controls.update(&mut camera);
        assert!((camera.position.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn extreme_zoom_keeps_camera_finite() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = still_controls();
        for _ in 0..3000 {
            controls.apply(NavAction::Zoom(1.0), 600);
            controls.update(&mut camera);
        }
        assert!(camera.position.is_finite());
        assert!(camera.position.length() > 0.0);

        for _ in 0..3000 {
            controls.apply(NavAction::Zoom(-1.0), 600);
            controls.update(&mut camera);
        }
        assert!(camera.position.is_finite());
        assert!(camera.position.length() > 5.0);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn zoom_recovers_from_camera_on_target() {
        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::ZERO;
        let mut controls = still_controls();
        controls.apply(NavAction::Zoom(-1.0), 600);
        controls.update(&mut camera);
        assert!(camera.position.is_finite());
        assert!(camera.position.length() > 0.0);
    }

    #[test]
    fn polar_angle_stays_off_the_pole() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = still_controls();
        controls.apply(NavAction::Orbit(Vec2::new(0.0, 10_000.0)), 600);
        controls.update(&mut camera);
        let horizontal = Vec2::new(camera.position.x, camera.position.z).length();
        assert!(horizontal > 0.0);
        assert!(camera.position.y > 0.0);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = still_controls();
        controls.enable_damping = true;
        controls.damping_factor = 0.5;
        controls.apply(NavAction::Orbit(Vec2::new(60.0, 0.0)), 600);

        controls.update(&mut camera);
        assert!(controls.has_pending_input());
        let first = camera.position;
        controls.update(&mut camera);
        assert!((camera.position - first).length() > 0.0);
    }

    #[test]
    fn toggle_auto_rotate() {
        let mut controls = OrbitControls::default();
        assert!(controls.auto_rotate);
        controls.apply(NavAction::ToggleAutoRotate, 600);
        assert!(!controls.auto_rotate);
    }

    #[test]
    fn camera_keeps_looking_at_target() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::default();
        controls.target = Vec3::new(1.0, 0.0, 0.0);
        controls.update(&mut camera);
        assert_eq!(camera.target(), Vec3::new(1.0, 0.0, 0.0));
    }
}
