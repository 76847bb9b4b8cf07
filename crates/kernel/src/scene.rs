use crate::animation::Animator;
use crate::clock::{Clock, FrameState};
use crate::config::{ConfigError, SceneConfig, parse_color};
use cubescene_common::{Color, NodeId, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Perspective camera setup for the scene root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 5.0, 5.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn eye(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn look_at(&self) -> Vec3 {
        Vec3::from_array(self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light from every direction.
    Ambient { color: Color, intensity: f32 },
    /// Parallel rays travelling from `position` towards `target`.
    Directional {
        position: Vec3,
        target: Vec3,
        color: Color,
        intensity: f32,
    },
}

impl Light {
    /// Unit vector pointing from the surface towards a directional light.
    pub fn direction_to_light(&self) -> Option<Vec3> {
        match self {
            Light::Ambient { .. } => None,
            Light::Directional {
                position, target, ..
            } => Some((*position - *target).try_normalize().unwrap_or(Vec3::Y)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesHelper {
    pub size: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub center_color: Color,
    pub line_color: Color,
    pub visible: bool,
}

/// A mounted mesh: geometry, material and its live transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    pub id: NodeId,
    pub geometry: BoxGeometry,
    pub material: StandardMaterial,
    pub transform: Transform,
}

/// The declarative scene plus the state of its one animated node.
pub struct Scene {
    camera: CameraConfig,
    background: Color,
    lights: Vec<Light>,
    axes: AxesHelper,
    grid: GridHelper,
    geometry: BoxGeometry,
    material: StandardMaterial,
    animator: Box<dyn Animator>,
    node: Option<MeshNode>,
    clock: Clock,
}

impl Scene {
    /// Build the scene description. The mesh is not mounted yet.
    pub fn from_config(config: &SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let lights = vec![
            Light::Ambient {
                color: parse_color("ambient.color", &config.ambient.color)?,
                intensity: config.ambient.intensity,
            },
            Light::Directional {
                position: Vec3::from_array(config.directional.position),
                target: Vec3::from_array(config.directional.target),
                color: parse_color("directional.color", &config.directional.color)?,
                intensity: config.directional.intensity,
            },
        ];

        let [width, height, depth] = config.mesh.size;
        let helpers = &config.helpers;

        Ok(Self {
            camera: config.camera,
            background: parse_color("background", &config.background)?,
            lights,
            axes: AxesHelper {
                size: helpers.axes_size,
                visible: helpers.show_axes,
            },
            grid: GridHelper {
                size: helpers.grid_size,
                divisions: helpers.grid_divisions,
                center_color: parse_color("helpers.grid_center_color", &helpers.grid_center_color)?,
                line_color: parse_color("helpers.grid_line_color", &helpers.grid_line_color)?,
                visible: helpers.show_grid,
            },
            geometry: BoxGeometry {
                width,
                height,
                depth,
            },
            material: StandardMaterial {
                color: parse_color("mesh.color", &config.mesh.color)?,
                roughness: config.mesh.roughness,
                metalness: config.mesh.metalness,
            },
            animator: Box::new(config.animation),
            node: None,
            clock: Clock::new(),
        })
    }

    /// Replace the per-frame callback driving the mesh.
    pub fn set_animator(&mut self, animator: Box<dyn Animator>) {
        self.animator = animator;
    }

    /// Create the mesh node and restart the clock.
    ///
    /// Mounting an already mounted scene returns the existing id untouched.
    pub fn mount(&mut self) -> NodeId {
        if let Some(node) = &self.node {
            return node.id;
        }
        let node = MeshNode {
            id: NodeId::new(),
            geometry: self.geometry,
            material: self.material,
            transform: Transform::default(),
        };
        let id = node.id;
        self.node = Some(node);
        self.clock.reset();
        self.animator.on_mount();
        tracing::info!(node = %id.short(), "mesh mounted");
        id
    }

    /// Drop the mesh node. Later frames only advance the clock.
    pub fn unmount(&mut self) -> Option<MeshNode> {
        let node = self.node.take();
        if let Some(n) = &node {
            tracing::info!(node = %n.id.short(), frames = self.clock.frame(), "mesh unmounted");
        }
        node
    }

    /// Advance the clock by `dt` seconds and run the animator on the mesh.
    pub fn frame(&mut self, dt: f32) -> FrameState {
        let state = self.clock.advance(dt);
        if self.clock.is_paused() {
            return state;
        }
        match self.node.as_mut() {
            Some(node) => self.animator.on_frame(&state, &mut node.transform),
            None => tracing::trace!(frame = state.frame, "no mounted mesh, update skipped"),
        }
        state
    }

    pub fn is_mounted(&self) -> bool {
        self.node.is_some()
    }

    pub fn mesh(&self) -> Option<&MeshNode> {
        self.node.as_ref()
    }

    /// Geometry the mesh is (or will be) mounted with.
    pub fn geometry(&self) -> &BoxGeometry {
        &self.geometry
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Sum of ambient light contributions, pre-multiplied by intensity.
    pub fn ambient(&self) -> Color {
        self.lights
            .iter()
            .filter_map(|l| match l {
                Light::Ambient { color, intensity } => Some(color.scaled(*intensity)),
                Light::Directional { .. } => None,
            })
            .fold(Color::BLACK, |acc, c| {
                Color::linear(acc.r + c.r, acc.g + c.g, acc.b + c.b)
            })
    }

    /// First directional light, if any.
    pub fn sun(&self) -> Option<&Light> {
        self.lights
            .iter()
            .find(|l| matches!(l, Light::Directional { .. }))
    }

    pub fn axes(&self) -> &AxesHelper {
        &self.axes
    }

    pub fn grid(&self) -> &GridHelper {
        &self.grid
    }

    pub fn set_axes_visible(&mut self, visible: bool) {
        self.axes.visible = visible;
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid.visible = visible;
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
        tracing::debug!(paused, "animation pause toggled");
    }
}

impl Default for Scene {
    fn default() -> Self {
        // The stock config always validates.
        match Self::from_config(&SceneConfig::default()) {
            Ok(scene) => scene,
            Err(e) => unreachable!("default scene config rejected: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn stock_scene_layout() {
        let scene = Scene::default();
        assert_eq!(scene.camera().eye(), Vec3::splat(5.0));
        assert_eq!(scene.camera().fov_degrees, 60.0);
        assert_eq!(scene.lights().len(), 2);
        assert_eq!(scene.axes().size, 5.0);
        assert_eq!(scene.grid().divisions, 10);
        assert!(!scene.is_mounted());
        assert!(scene.mesh().is_none());
    }

    #[test]
    fn ambient_is_half_white() {
        let scene = Scene::default();
        assert_eq!(scene.ambient().to_array(), [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn sun_points_towards_its_position() {
        let scene = Scene::default();
        let dir = scene.sun().and_then(Light::direction_to_light).unwrap();
        assert!(dir.abs_diff_eq(Vec3::new(10.0, 10.0, 5.0).normalize(), 1e-6));
    }

    #[test]
    fn frames_before_mount_are_skipped() {
        let mut scene = Scene::default();
        let state = scene.frame(0.016);
        assert_eq!(state.frame, 1);
        assert!(scene.mesh().is_none());
    }

    #[test]
    fn mount_is_idempotent() {
        let mut scene = Scene::default();
        let a = scene.mount();
        scene.frame(0.5);
        let b = scene.mount();
        assert_eq!(a, b);
        // Second mount did not reset anything.
        assert_eq!(scene.clock().frame(), 1);
    }

    #[test]
    fn mounted_mesh_animates() {
        let mut scene = Scene::default();
        scene.mount();
        scene.frame(0.0);
        let t = scene.mesh().unwrap().transform;
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-5));
        assert!((t.rotation.x - 0.01).abs() < 1e-6);

        scene.frame(FRAC_PI_2);
        let t = scene.mesh().unwrap().transform;
        assert!(t.position.abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), 1e-5));
        assert!(t.scale.abs_diff_eq(Vec3::splat(1.5), 1e-5));
        assert!((t.rotation.y - 0.02).abs() < 1e-6);
    }

    #[test]
    fn mount_restarts_clock() {
        let mut scene = Scene::default();
        scene.frame(10.0);
        scene.mount();
        assert_eq!(scene.clock().elapsed(), 0.0);
        scene.frame(0.0);
        let t = scene.mesh().unwrap().transform;
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-5));
    }

    #[test]
    fn remount_restarts_rotation() {
        let mut scene = Scene::default();
        scene.mount();
        for _ in 0..5 {
            scene.frame(0.1);
        }
        scene.unmount();
        scene.mount();
        scene.frame(0.0);
        let t = scene.mesh().unwrap().transform;
        assert!((t.rotation.x - 0.01).abs() < 1e-6);
    }

    #[test]
    fn hour_long_run_stays_on_the_path() {
        let mut scene = Scene::default();
        scene.mount();
        for _ in 0..216_000 {
            scene.frame(1.0 / 60.0);
        }
        let t = scene.mesh().unwrap().transform;
        let expected = 3600.0f32.sin() * 2.0;
        assert!((t.position.x - expected).abs() < 5e-3, "x {} vs {}", t.position.x, expected);
        assert!((t.rotation.x - 2160.0).abs() < 1e-3);
    }

    #[test]
    fn unmount_stops_updates() {
        let mut scene = Scene::default();
        let id = scene.mount();
        scene.frame(0.1);
        let node = scene.unmount().unwrap();
        assert_eq!(node.id, id);
        scene.frame(0.1);
        assert!(scene.mesh().is_none());
        assert!(scene.unmount().is_none());
    }

    #[test]
    fn pause_freezes_the_mesh() {
        let mut scene = Scene::default();
        scene.mount();
        scene.frame(0.3);
        let before = scene.mesh().unwrap().transform;
        scene.set_paused(true);
        scene.frame(0.3);
        scene.frame(0.3);
        assert_eq!(scene.mesh().unwrap().transform, before);
        scene.set_paused(false);
        scene.frame(0.3);
        assert_ne!(scene.mesh().unwrap().transform, before);
    }

    struct Counter(u64);

    impl Animator for Counter {
        fn on_frame(&mut self, _frame: &FrameState, transform: &mut Transform) {
            self.0 += 1;
            transform.position.x = self.0 as f32;
        }
    }

    #[test]
    fn custom_animator_is_driven() {
        let mut scene = Scene::default();
        scene.set_animator(Box::new(Counter(0)));
        scene.mount();
        for _ in 0..3 {
            scene.frame(0.016);
        }
        assert_eq!(scene.mesh().unwrap().transform.position.x, 3.0);
    }

    #[test]
    fn config_colors_reach_the_material() {
        let mut config = SceneConfig::default();
        config.mesh.color = "#ff0000".into();
        let mut scene = Scene::from_config(&config).unwrap();
        scene.mount();
        assert_eq!(scene.mesh().unwrap().material.color, Color::linear(1.0, 0.0, 0.0));
    }
}
