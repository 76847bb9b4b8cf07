use cubescene_kernel::CameraConfig;
use cubescene_render::RenderView;
use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

/// Keeps the polar angle off the poles so `look_at` never degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Camera orbiting a target point, driven by pointer drags.
///
/// The offset from the target is stored in spherical coordinates: `polar` is
/// measured from +Y, `azimuth` around +Y starting at +Z. Input accumulates
/// pending deltas which [`OrbitCamera::update`] applies once per frame, easing
/// them out when damping is enabled.
/// Camera motion lives outside the scene; it never touches the scene clock.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub polar: f32,
    pub azimuth: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    pending_scale: f32,
    home: (Vec3, Vec3),
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&RenderView::default(), 16.0 / 9.0)
    }
}

impl OrbitCamera {
    /// Place the camera at `view.eye` looking at `view.target`.
    pub fn new(view: &RenderView, aspect: f32) -> Self {
        let mut camera = Self {
            target: view.target,
            radius: 1.0,
            polar: 0.0,
            azimuth: 0.0,
            fov: view.fov_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            enable_damping: true,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
            home: (view.eye, view.target),
        };
        camera.look_from(view.eye, view.target);
        camera
    }

    /// Build from the scene camera, including its clip planes.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(&RenderView::from(config), aspect);
        camera.near = config.near;
        camera.far = config.far;
        camera
    }

    fn look_from(&mut self, eye: Vec3, target: Vec3) {
        let offset = eye - target;
        self.target = target;
        self.radius = offset.length();
        if self.radius == 0.0 {
            self.polar = 0.0;
            self.azimuth = 0.0;
        } else {
            self.azimuth = offset.x.atan2(offset.z);
            self.polar = (offset.y / self.radius).clamp(-1.0, 1.0).acos();
        }
    }

    /// Orbit by a pointer delta in pixels. A drag across the full viewport
    /// height turns the camera once around.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.pending_azimuth -= TAU * dx / h * self.rotate_speed;
        self.pending_polar -= TAU * dy / h * self.rotate_speed;
    }

    /// Slide the target in the view plane so the point under the cursor
    /// follows it at the target's depth.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        let target_distance = self.radius * (self.fov / 2.0).tan();
        let view = self.view_matrix().inverse();
        let right = view.x_axis.truncate();
        let up = view.y_axis.truncate();
        let scale = 2.0 * target_distance / h * self.pan_speed;
        self.pending_pan += -right * dx * scale + up * dy * scale;
    }

    /// Dolly towards the target by `steps` (negative moves away).
    pub fn dolly(&mut self, steps: f32) {
        self.pending_scale *= 0.95_f32.powf(steps * self.zoom_speed);
    }

    /// Apply pending input. Call once per frame; with damping enabled the
    /// camera keeps easing for a while after input stops.
    pub fn update(&mut self) {
        let k = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        self.azimuth += self.pending_azimuth * k;
        self.polar = (self.polar + self.pending_polar * k).clamp(POLE_EPSILON, PI - POLE_EPSILON);
        self.radius = (self.radius * self.pending_scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pending_pan * k;

        if self.enable_damping {
            self.pending_azimuth *= 1.0 - k;
            self.pending_polar *= 1.0 - k;
            self.pending_pan *= 1.0 - k;
        } else {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
            self.pending_pan = Vec3::ZERO;
        }
        self.pending_scale = 1.0;
    }

    /// Return to the pose the camera was created with.
    pub fn reset(&mut self) {
        let (eye, target) = self.home;
        self.look_from(eye, target);
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.pending_scale = 1.0;
        tracing::debug!("camera reset");
    }

    pub fn eye(&self) -> Vec3 {
        let s = self.polar.sin();
        self.target
            + self.radius
                * Vec3::new(
                    s * self.azimuth.sin(),
                    self.polar.cos(),
                    s * self.azimuth.cos(),
                )
    }

    /// Current pose as a renderer-agnostic view.
    pub fn view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            fov_degrees: self.fov.to_degrees(),
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
