/// Snapshot of the clock handed to animators each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    /// Seconds since the clock started, excluding paused time.
    pub elapsed: f32,
    /// Seconds added by this frame.
    pub delta: f32,
    /// Number of frames advanced so far, including this one.
    pub frame: u64,
}

/// Frame clock driven by explicit deltas.
///
/// Elapsed time never decreases: negative or non-finite deltas count as zero.
/// The running total is kept in `f64`; frame deltas are summed for hours.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    elapsed: f64,
    frame: u64,
    paused: bool,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds and return the resulting frame state.
    pub fn advance(&mut self, dt: f32) -> FrameState {
        let delta = if self.paused || !dt.is_finite() || dt < 0.0 {
            0.0
        } else {
            dt
        };
        self.elapsed += f64::from(delta);
        self.frame += 1;
        FrameState {
            elapsed: self.elapsed as f32,
            delta,
            frame: self.frame,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Back to zero elapsed time and zero frames. Pause state is kept.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut clock = Clock::new();
        clock.advance(0.5);
        let f = clock.advance(0.25);
        assert_eq!(f.elapsed, 0.75);
        assert_eq!(f.delta, 0.25);
        assert_eq!(f.frame, 2);
    }

    #[test]
    fn elapsed_never_decreases() {
        let mut clock = Clock::new();
        clock.advance(1.0);
        for dt in [-0.5, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let f = clock.advance(dt);
            assert_eq!(f.elapsed, 1.0);
            assert_eq!(f.delta, 0.0);
        }
        assert_eq!(clock.frame(), 5);
    }

    #[test]
    fn paused_clock_holds_time() {
        let mut clock = Clock::new();
        clock.advance(0.1);
        clock.set_paused(true);
        let f = clock.advance(0.1);
        assert_eq!(f.elapsed, 0.1);
        assert_eq!(f.delta, 0.0);
        clock.set_paused(false);
        assert!((clock.advance(0.1).elapsed - 0.2).abs() < 1e-6);
    }

    #[test]
    fn an_hour_of_frames_does_not_drift() {
        let mut clock = Clock::new();
        let mut last = FrameState::default();
        for _ in 0..216_000 {
            last = clock.advance(1.0 / 60.0);
        }
        assert!((clock.elapsed() - 3600.0).abs() < 1e-3, "elapsed {}", clock.elapsed());
        assert!((last.elapsed - 3600.0).abs() < 1e-3);
        assert_eq!(last.frame, 216_000);
    }

    #[test]
    fn reset_clears_time() {
        let mut clock = Clock::new();
        clock.advance(3.0);
        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.frame(), 0);
    }
}
