//! Shared value types used across the cube scene crates.

mod color;
mod types;

pub use color::{Color, ColorError};
pub use types::{NodeId, Transform};
