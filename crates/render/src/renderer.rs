use cubescene_kernel::{CameraConfig, Light, Scene};
use glam::Vec3;
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

impl From<&CameraConfig> for RenderView {
    fn from(camera: &CameraConfig) -> Self {
        Self {
            eye: camera.eye(),
            target: camera.look_at(),
            fov_degrees: camera.fov_degrees,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view configuration, then produces
/// output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Headless renderer producing a human-readable report of the scene.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    // Writing to a String cannot fail, so the fmt results are dropped.
    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let clock = scene.clock();
        let _ = writeln!(
            out,
            "=== Scene (frame={}, t={:.3}s{}) ===",
            clock.frame(),
            clock.elapsed(),
            if clock.is_paused() { ", paused" } else { "" }
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        );

        for light in scene.lights() {
            match light {
                Light::Ambient { intensity, .. } => {
                    let _ = writeln!(out, "Light: ambient intensity={intensity:.2}");
                }
                Light::Directional {
                    position,
                    intensity,
                    ..
                } => {
                    let _ = writeln!(
                        out,
                        "Light: directional at ({:.1}, {:.1}, {:.1}) intensity={intensity:.2}",
                        position.x, position.y, position.z
                    );
                }
            }
        }

        let axes = scene.axes();
        let grid = scene.grid();
        let _ = writeln!(
            out,
            "Helpers: axes size={:.1}{} grid {:.0}x{}{}",
            axes.size,
            if axes.visible { "" } else { " (hidden)" },
            grid.size,
            grid.divisions,
            if grid.visible { "" } else { " (hidden)" }
        );

        match scene.mesh() {
            Some(node) => {
                let t = &node.transform;
                let _ = writeln!(
                    out,
                    "  [{}] box {}x{}x{} pos=({:.3}, {:.3}, {:.3}) rot=({:.3}, {:.3}, {:.3}) scale={:.3}",
                    node.id.short(),
                    node.geometry.width,
                    node.geometry.height,
                    node.geometry.depth,
                    t.position.x,
                    t.position.y,
                    t.position.z,
                    t.rotation.x,
                    t.rotation.y,
                    t.rotation.z,
                    t.scale.x
                );
            }
            None => {
                let _ = writeln!(out, "  (mesh not mounted)");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_renderer_unmounted_scene() {
        let scene = Scene::default();
        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::default());

        assert!(output.contains("frame=0"));
        assert!(output.contains("mesh not mounted"));
        assert!(output.contains("ambient intensity=0.50"));
        assert!(output.contains("directional at (10.0, 10.0, 5.0)"));
    }

    #[test]
    fn debug_renderer_with_mounted_mesh() {
        let mut scene = Scene::default();
        scene.mount();
        scene.frame(0.0);

        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::from(scene.camera()));

        assert!(output.contains("frame=1"));
        assert!(output.contains("pos=(0.000, 0.000, 2.000)"));
        assert!(output.contains("rot=(0.010, 0.010, 0.000)"));
        assert!(output.contains("scale=1.000"));
    }

    #[test]
    fn hidden_helpers_are_marked() {
        let mut scene = Scene::default();
        scene.set_grid_visible(false);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("grid 10x10 (hidden)"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 60.0);
        assert_eq!(view.eye, Vec3::splat(5.0));
        assert_eq!(view.target, Vec3::ZERO);
    }
}
