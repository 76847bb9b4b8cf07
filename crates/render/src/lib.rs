//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never advance its clock or move its mesh.
//! - What gets drawn derives from the scene and a view only.
//!
//! The GPU backend lives in `cubescene-render-wgpu`. [`DebugTextRenderer`]
//! implements the same trait for headless runs and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    concat!("cubescene-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
