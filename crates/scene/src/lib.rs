//! Scene graph: the entities that collectively define what gets rendered.
//!
//! # Invariants
//! - A scene holds at most one camera; setting a new one replaces it.
//! - Every mesh belongs to exactly one scene.
//! - Shadow generators only reference directional lights and meshes of the
//!   same scene; only registered casters cast, only receivers receive.

pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod shadow;
pub mod summary;

pub use glam;

pub use camera::ArcRotateCamera;
pub use light::{DirectionalLight, HemisphericLight, Light};
pub use material::{MaterialId, StandardMaterial, Texture, TextureId};
pub use mesh::{Mesh, Shape};
pub use scene::{Scene, SceneError};
pub use shadow::{ShadowFilter, ShadowGenerator, ShadowGeneratorId};
pub use summary::SceneSummary;

pub fn crate_info() -> &'static str {
    "tableau-scene v0.1.0"
}
