use crate::action::NavAction;
use glam::Vec2;

/// Mouse buttons the tracker distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns button, cursor and wheel samples into navigation actions.
///
/// Dragging with the primary button orbits. The first cursor sample after a
/// press only records the position.
#[derive(Debug, Default)]
pub struct PointerTracker {
    last_position: Option<Vec2>,
    orbiting: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_orbiting(&self) -> bool {
        self.orbiting
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) -> NavAction {
        if button == PointerButton::Primary {
            self.orbiting = pressed;
            if !pressed {
                self.last_position = None;
            }
        }
        NavAction::Noop
    }

    pub fn cursor_moved(&mut self, position: Vec2) -> NavAction {
        let previous = self.last_position.replace(position);
        match previous {
            Some(prev) if self.orbiting => {
                let delta = position - prev;
                if delta == Vec2::ZERO {
                    NavAction::Noop
                } else {
                    NavAction::Orbit(delta)
                }
            }
            _ => NavAction::Noop,
        }
    }

    /// Pointer left the viewport: drop the drag anchor.
    pub fn cursor_left(&mut self) -> NavAction {
        self.last_position = None;
        NavAction::Noop
    }

    pub fn wheel(&mut self, lines: f32) -> NavAction {
        if lines == 0.0 || !lines.is_finite() {
            NavAction::Noop
        } else {
            NavAction::Zoom(lines)
        }
    }
}
