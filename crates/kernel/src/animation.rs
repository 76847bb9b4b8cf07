use crate::clock::FrameState;
use cubescene_common::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Per-frame callback that drives a node's transform.
pub trait Animator {
    /// Called when a fresh node is mounted, before its first frame.
    fn on_mount(&mut self) {}

    fn on_frame(&mut self, frame: &FrameState, transform: &mut Transform);
}

/// The translate / rotate / scale demo.
///
/// Position walks a tilted circle of radius `path_radius`, scale breathes
/// around `scale_base`, and rotation about X and Y grows by `rotation_step`
/// every frame. The rotation is recomputed from the number of frames run
/// since mount, so it stays `rotation_step * n` however long the scene runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDemo {
    pub path_radius: f32,
    pub rotation_step: f32,
    pub scale_base: f32,
    pub scale_amplitude: f32,
    #[serde(skip)]
    steps: u64,
}

impl Default for TransformDemo {
    fn default() -> Self {
        Self {
            path_radius: 2.0,
            rotation_step: 0.01,
            scale_base: 1.0,
            scale_amplitude: 0.5,
            steps: 0,
        }
    }
}

impl TransformDemo {
    pub fn position_at(&self, t: f32) -> Vec3 {
        let (sin, cos) = t.sin_cos();
        Vec3::new(sin * self.path_radius, sin * self.path_radius, cos * self.path_radius)
    }

    pub fn scale_at(&self, t: f32) -> f32 {
        self.scale_base + t.sin() * self.scale_amplitude
    }

    /// Rotation about X and Y after `steps` frames.
    pub fn rotation_after(&self, steps: u64) -> f32 {
        (f64::from(self.rotation_step) * steps as f64) as f32
    }
}

impl Animator for TransformDemo {
    fn on_mount(&mut self) {
        self.steps = 0;
    }

    fn on_frame(&mut self, frame: &FrameState, transform: &mut Transform) {
        self.steps += 1;
        let angle = self.rotation_after(self.steps);
        transform.position = self.position_at(frame.elapsed);
        transform.rotation.x = angle;
        transform.rotation.y = angle;
        transform.set_uniform_scale(self.scale_at(frame.elapsed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn frame_at(t: f32) -> FrameState {
        FrameState {
            elapsed: t,
            delta: 0.0,
            frame: 1,
        }
    }

    #[test]
    fn position_follows_formula() {
        let demo = TransformDemo::default();
        for i in 0..200 {
            let t = i as f32 * 0.137;
            let p = demo.position_at(t);
            assert!((p.x - t.sin() * 2.0).abs() < EPS);
            assert!((p.y - t.sin() * 2.0).abs() < EPS);
            assert!((p.z - t.cos() * 2.0).abs() < EPS);
        }
    }

    #[test]
    fn scale_stays_in_band() {
        let demo = TransformDemo::default();
        for i in 0..1000 {
            let s = demo.scale_at(i as f32 * 0.01);
            assert!((0.5..=1.5).contains(&s), "scale {s} out of band");
        }
    }

    #[test]
    fn start_of_animation() {
        let mut demo = TransformDemo::default();
        let mut t = Transform::default();
        demo.on_frame(&frame_at(0.0), &mut t);
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), EPS));
        assert!(t.scale.abs_diff_eq(Vec3::ONE, EPS));
    }

    #[test]
    fn quarter_turn() {
        let mut demo = TransformDemo::default();
        let mut t = Transform::default();
        demo.on_frame(&frame_at(FRAC_PI_2), &mut t);
        assert!(t.position.abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), EPS));
        assert!(t.scale.abs_diff_eq(Vec3::splat(1.5), EPS));
    }

    #[test]
    fn rotation_accumulates_per_frame() {
        let mut demo = TransformDemo::default();
        let mut t = Transform::default();
        let n = 500;
        for i in 0..n {
            demo.on_frame(&frame_at(i as f32 / 60.0), &mut t);
        }
        let expected = 0.01 * n as f32;
        assert!((t.rotation.x - expected).abs() < 1e-3);
        assert!((t.rotation.y - expected).abs() < 1e-3);
        assert_eq!(t.rotation.z, 0.0);
    }

    #[test]
    fn rotation_ignores_elapsed_time() {
        let mut a = Transform::default();
        let mut b = Transform::default();
        TransformDemo::default().on_frame(&frame_at(0.0), &mut a);
        TransformDemo::default().on_frame(&frame_at(100.0), &mut b);
        assert_eq!(a.rotation, b.rotation);
    }

    #[test]
    fn long_runs_keep_exact_rotation() {
        let mut demo = TransformDemo::default();
        let mut t = Transform::default();
        for i in 0..216_000u32 {
            demo.on_frame(&frame_at(i as f32 / 60.0), &mut t);
        }
        assert!((t.rotation.x - 2160.0).abs() < 1e-3, "rotation {}", t.rotation.x);
        assert_eq!(t.rotation.x, t.rotation.y);

        for _ in 216_000..1_000_000 {
            demo.on_frame(&frame_at(0.0), &mut t);
        }
        assert!((t.rotation.x - 10_000.0).abs() < 1e-2);
    }

    #[test]
    fn mount_restarts_rotation() {
        let mut demo = TransformDemo::default();
        let mut t = Transform::default();
        for _ in 0..10 {
            demo.on_frame(&frame_at(0.0), &mut t);
        }
        demo.on_mount();
        let mut fresh = Transform::default();
        demo.on_frame(&frame_at(0.0), &mut fresh);
        assert!((fresh.rotation.x - 0.01).abs() < 1e-6);
    }

    #[test]
    fn position_overwrites_previous_value() {
        let mut demo = TransformDemo::default();
        let mut t = Transform {
            position: Vec3::splat(99.0),
            ..Transform::default()
        };
        demo.on_frame(&frame_at(1.0), &mut t);
        assert!(t.position.abs_diff_eq(demo.position_at(1.0), EPS));
    }
}
