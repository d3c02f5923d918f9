use crate::gpu::WgpuEngine;
use crate::overlay::OverlayText;
use crate::surface::WindowSurface;
use tableau_assets::AssetRoot;
use tableau_render::{RenderError, SceneBuilder};
use tableau_scene::{Scene, Texture, TextureId};

/// Builds [`WgpuEngine`]s for window surfaces.
///
/// Textures are decoded when requested, so a missing or corrupt image
/// aborts scene construction instead of showing up as a blank material.
#[derive(Debug, Clone)]
pub struct WgpuSceneBuilder {
    assets: AssetRoot,
    overlay: Option<OverlayText>,
}

impl WgpuSceneBuilder {
    pub fn new(assets: AssetRoot) -> Self {
        Self {
            assets,
            overlay: None,
        }
    }

    /// Draw `text` over every frame the engine presents.
    pub fn with_overlay(mut self, text: OverlayText) -> Self {
        self.overlay = Some(text);
        self
    }

    pub fn assets(&self) -> &AssetRoot {
        &self.assets
    }
}

impl SceneBuilder for WgpuSceneBuilder {
    type Surface = WindowSurface;
    type Engine = WgpuEngine;

    fn create_engine(&mut self, surface: &WindowSurface) -> Result<WgpuEngine, RenderError> {
        WgpuEngine::new(surface.clone(), self.overlay.clone())
    }

    fn load_texture(&mut self, scene: &mut Scene, source: &str) -> Result<TextureId, RenderError> {
        let pixels = self.assets.load_image(source)?;
        tracing::debug!(
            "decoded texture {source} ({}x{})",
            pixels.width,
            pixels.height
        );
        Ok(scene.add_texture(Texture::new(source).with_pixels(pixels)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_texture_is_an_asset_error() {
        let mut builder = WgpuSceneBuilder::new(AssetRoot::new("/nonexistent-tableau-assets"));
        let mut scene = Scene::new();
        let err = builder
            .load_texture(&mut scene, "/assets/textures/diffuse/sand.jpg")
            .unwrap_err();
        assert!(matches!(err, RenderError::Asset(_)));
        assert!(scene.textures().is_empty());
    }

    #[test]
    fn overlay_is_shared_with_the_builder() {
        let text = OverlayText::new("ui");
        let builder = WgpuSceneBuilder::new(AssetRoot::default()).with_overlay(text.clone());
        assert!(builder.overlay.is_some());
        assert_eq!(builder.assets().dir(), std::path::Path::new("."));
    }
}
