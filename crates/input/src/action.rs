use glam::Vec2;

/// A navigation intent produced from pointer or keyboard input.
///
/// Orbit controls accumulate these between rendered frames and consume them
/// on the next update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavAction {
    /// Drag delta in pixels while the orbit button is held.
    Orbit(Vec2),
    /// Wheel delta in lines; positive zooms in.
    Zoom(f32),
    /// Flip automatic rotation on or off.
    ToggleAutoRotate,
    /// Input that maps to nothing.
    Noop,
}

impl NavAction {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Noop)
    }
}
