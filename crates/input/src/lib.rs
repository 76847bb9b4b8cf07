//! Input mapping: raw pointer and key events become [`Action`]s.
//!
//! # Invariants
//! - Nothing here touches the camera or the scene; callers apply actions.
//! - Bindings follow orbit-controls defaults: primary drag orbits, middle
//!   drag dollies, secondary drag pans, the wheel zooms.

pub mod action;
pub mod orbit;

pub use action::{Action, Key, map_key};
pub use orbit::{OrbitInput, PointerButton};
