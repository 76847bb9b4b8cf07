//! Scene kernel: the declarative scene description, its frame clock and the
//! per-frame animation callback.
//!
//! # Invariants
//! - Position and scale of the animated node are pure functions of elapsed time.
//! - Rotation is the only state that accumulates across frames.
//! - Frames run against an unmounted scene are no-ops for the node.

pub mod animation;
pub mod clock;
pub mod config;
pub mod scene;

pub use animation::{Animator, TransformDemo};
pub use clock::{Clock, FrameState};
pub use config::{ConfigError, SceneConfig};
pub use scene::{
    AxesHelper, BoxGeometry, CameraConfig, GridHelper, Light, MeshNode, Scene, StandardMaterial,
};
