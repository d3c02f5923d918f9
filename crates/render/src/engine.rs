use tableau_assets::AssetError;
use tableau_scene::{Scene, SceneError};

/// Errors surfaced by render backends and the bootstrapper.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(String),
    #[error("no suitable graphics adapter")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(String),
    #[error("frame error: {0}")]
    Frame(String),
    #[error("scene is not initialized")]
    Uninitialized,
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Turns scene state into presented frames on the surface it was built for.
///
/// A frame is `render` followed by `present`; anything drawn in between
/// (overlays, UI text) lands on the same frame.
pub trait RenderEngine {
    /// Re-read the surface size and resize output buffers. Idempotent.
    fn resize(&mut self);

    /// Draw one frame of `scene`. Never mutates the scene.
    fn render(&mut self, scene: &Scene) -> Result<(), RenderError>;

    /// Frames per second measured over recent frames.
    fn fps(&self) -> f32;

    /// Show the frame drawn by the last `render`.
    fn present(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}
