//! wgpu render backend for the cube scene.
//!
//! Draws the grid and axes helpers as line lists and the animated box with
//! ambient plus directional lighting. The camera orbits a target point.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Camera motion is not part of the scene; the scene clock ignores it.
//! - Helper geometry is built once; only the mesh instance changes per frame.

mod camera;
mod gpu;
mod mesh;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
pub use mesh::{LineVertex, Vertex, axes_lines, box_mesh, grid_lines};
