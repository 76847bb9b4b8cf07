/// A high-level action produced from raw input.
///
/// The desktop app consumes actions, never raw window events, so the same
/// bindings can be exercised headless in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Rotate the camera around its target by a pointer delta in pixels.
    Orbit { dx: f32, dy: f32 },
    /// Slide the camera target in the view plane by a pointer delta in pixels.
    Pan { dx: f32, dy: f32 },
    /// Dolly towards (positive) or away from (negative) the target, in steps.
    Zoom(f32),
    /// Return the camera to its configured position.
    ResetCamera,
    /// Freeze or resume the animation clock.
    TogglePause,
    ToggleAxes,
    ToggleGrid,
    ToggleOverlay,
    /// No-op (used for input that has no binding).
    Noop,
}

/// Keys with a binding. Windowing backends translate their key codes to this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    R,
    Space,
    A,
    G,
    F1,
    Other,
}

/// Map a key press to its action.
pub fn map_key(key: Key) -> Action {
    match key {
        Key::R => Action::ResetCamera,
        Key::Space => Action::TogglePause,
        Key::A => Action::ToggleAxes,
        Key::G => Action::ToggleGrid,
        Key::F1 => Action::ToggleOverlay,
        Key::Other => Action::Noop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_keys() {
        assert_eq!(map_key(Key::R), Action::ResetCamera);
        assert_eq!(map_key(Key::Space), Action::TogglePause);
        assert_eq!(map_key(Key::A), Action::ToggleAxes);
        assert_eq!(map_key(Key::G), Action::ToggleGrid);
        assert_eq!(map_key(Key::F1), Action::ToggleOverlay);
    }

    #[test]
    fn unbound_key_is_noop() {
        assert_eq!(map_key(Key::Other), Action::Noop);
    }

    #[test]
    fn orbit_carries_delta() {
        let a = Action::Orbit { dx: 3.0, dy: -1.0 };
        assert!(matches!(a, Action::Orbit { dx, .. } if dx == 3.0));
    }
}
