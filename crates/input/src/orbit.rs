use crate::action::Action;

/// Pixel deltas are scaled by this to get dolly steps (one wheel notch is
/// roughly 100 pixels).
const PIXELS_PER_ZOOM_STEP: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns pointer drags and wheel motion into camera actions.
#[derive(Debug, Default)]
pub struct OrbitInput {
    held: Option<PointerButton>,
    last_cursor: Option<(f32, f32)>,
}

impl OrbitInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag. A second button pressed mid-drag is ignored.
    pub fn press(&mut self, button: PointerButton) {
        if self.held.is_none() {
            self.held = Some(button);
            tracing::trace!(?button, "drag started");
        }
    }

    pub fn release(&mut self, button: PointerButton) {
        if self.held == Some(button) {
            self.held = None;
            tracing::trace!(?button, "drag ended");
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.held.is_some()
    }

    /// Feed an absolute cursor position; returns the action for the delta
    /// since the previous position.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Action {
        let previous = self.last_cursor.replace((x, y));
        let (Some(button), Some((px, py))) = (self.held, previous) else {
            return Action::Noop;
        };
        let (dx, dy) = (x - px, y - py);
        if dx == 0.0 && dy == 0.0 {
            return Action::Noop;
        }
        match button {
            PointerButton::Primary => Action::Orbit { dx, dy },
            PointerButton::Secondary => Action::Pan { dx, dy },
            // Dragging down pulls the camera back.
            PointerButton::Middle => Action::Zoom(-dy / PIXELS_PER_ZOOM_STEP),
        }
    }

    /// Forget the cursor, e.g. when it leaves the window.
    pub fn cursor_left(&mut self) {
        self.last_cursor = None;
        self.held = None;
    }

    /// Wheel motion in lines; positive scrolls away from the user and zooms in.
    pub fn wheel_lines(&self, lines: f32) -> Action {
        if lines == 0.0 {
            Action::Noop
        } else {
            Action::Zoom(lines)
        }
    }

    /// Wheel motion in pixels (touchpads).
    pub fn wheel_pixels(&self, pixels: f32) -> Action {
        self.wheel_lines(pixels / PIXELS_PER_ZOOM_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_without_drag_is_noop() {
        let mut input = OrbitInput::new();
        assert_eq!(input.cursor_moved(10.0, 10.0), Action::Noop);
        assert_eq!(input.cursor_moved(20.0, 10.0), Action::Noop);
    }

    #[test]
    fn primary_drag_orbits() {
        let mut input = OrbitInput::new();
        input.cursor_moved(100.0, 100.0);
        input.press(PointerButton::Primary);
        assert!(input.is_dragging());
        assert_eq!(
            input.cursor_moved(110.0, 95.0),
            Action::Orbit { dx: 10.0, dy: -5.0 }
        );
        input.release(PointerButton::Primary);
        assert!(!input.is_dragging());
        assert_eq!(input.cursor_moved(120.0, 95.0), Action::Noop);
    }

    #[test]
    fn secondary_drag_pans() {
        let mut input = OrbitInput::new();
        input.cursor_moved(0.0, 0.0);
        input.press(PointerButton::Secondary);
        assert_eq!(
            input.cursor_moved(4.0, 2.0),
            Action::Pan { dx: 4.0, dy: 2.0 }
        );
    }

    #[test]
    fn middle_drag_down_zooms_out() {
        let mut input = OrbitInput::new();
        input.cursor_moved(0.0, 0.0);
        input.press(PointerButton::Middle);
        assert_eq!(input.cursor_moved(0.0, 50.0), Action::Zoom(-0.5));
    }

    #[test]
    fn first_move_after_press_without_history_is_noop() {
        let mut input = OrbitInput::new();
        input.press(PointerButton::Primary);
        assert_eq!(input.cursor_moved(5.0, 5.0), Action::Noop);
        assert_eq!(
            input.cursor_moved(6.0, 5.0),
            Action::Orbit { dx: 1.0, dy: 0.0 }
        );
    }

    #[test]
    fn second_button_does_not_steal_drag() {
        let mut input = OrbitInput::new();
        input.cursor_moved(0.0, 0.0);
        input.press(PointerButton::Primary);
        input.press(PointerButton::Secondary);
        input.release(PointerButton::Secondary);
        assert!(input.is_dragging());
        assert!(matches!(input.cursor_moved(1.0, 0.0), Action::Orbit { .. }));
    }

    #[test]
    fn wheel_zooms() {
        let input = OrbitInput::new();
        assert_eq!(input.wheel_lines(1.0), Action::Zoom(1.0));
        assert_eq!(input.wheel_lines(0.0), Action::Noop);
        assert_eq!(input.wheel_pixels(-200.0), Action::Zoom(-2.0));
    }

    #[test]
    fn leaving_window_cancels_drag() {
        let mut input = OrbitInput::new();
        input.cursor_moved(0.0, 0.0);
        input.press(PointerButton::Primary);
        input.cursor_left();
        assert!(!input.is_dragging());
        assert_eq!(input.cursor_moved(3.0, 3.0), Action::Noop);
    }
}
