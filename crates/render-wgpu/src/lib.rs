//! wgpu render backend for tableau scenes.
//!
//! Tessellates scene shapes, renders a shadow pass for each frame's shadow
//! generator, forward-shades meshes and polylines, and draws UI text with
//! egui on top before presenting.
//!
//! # Invariants
//! - The engine never mutates the scene; GPU resources are caches keyed by
//!   scene ids and are dropped when their entity disappears.
//! - Only registered shadow casters are drawn into the shadow map, and only
//!   meshes flagged as receivers sample it.

mod builder;
mod context;
mod geometry;
mod gpu;
mod overlay;
mod shaders;
mod surface;
mod uniforms;

pub use builder::WgpuSceneBuilder;
pub use geometry::{MeshData, Topology, Vertex};
pub use gpu::WgpuEngine;
pub use overlay::OverlayText;
pub use surface::WindowSurface;
