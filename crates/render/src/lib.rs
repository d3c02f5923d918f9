//! Rendering adapter: renderer-agnostic capability interface and the scene
//! bootstrapper that drives it.
//!
//! # Invariants
//! - The bootstrapper never reaches for host globals: the surface, the FPS
//!   text target, and the [`SceneBuilder`] are injected.
//! - Each refresh tick renders, then writes the FPS of that frame, then
//!   presents. The text never describes a stale frame.
//! - One engine and one scene per bootstrapper.
//!
//! The [`GraphBuilder`]/[`DebugTextEngine`] pair is a headless backend used
//! by the CLI and tests; GPU backends implement the same traits.

mod bootstrap;
mod builder;
mod clock;
mod debug;
mod demo;
mod engine;
mod host;

pub use bootstrap::{LoopHandle, LoopState, SceneBootstrapper};
pub use builder::{BuildRequest, GraphBuilder, SceneBuilder};
pub use clock::{FrameClock, format_fps};
pub use debug::DebugTextEngine;
pub use demo::{DemoIds, DemoScene, GROUND_BUMP_TEXTURE, GROUND_DIFFUSE_TEXTURE, build_demo_scene};
pub use engine::{RenderEngine, RenderError};
pub use host::{
    BufferedText, DEFAULT_FPS_TARGET_ID, DEFAULT_SURFACE_ID, HeadlessSurface, Surface,
    SurfaceSize, TextTarget,
};

pub fn crate_info() -> &'static str {
    "tableau-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
