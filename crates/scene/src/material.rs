use serde::Serialize;
use std::sync::Arc;
use tableau_assets::ImageData;
use tableau_common::Color3;

/// Index of a material within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MaterialId(pub u32);

/// Index of a texture within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TextureId(pub u32);

/// An image referenced by materials. Pixels are present once a builder has
/// decoded the source; headless builders may leave them empty.
#[derive(Debug, Clone, Serialize)]
pub struct Texture {
    pub source: String,
    #[serde(skip)]
    pub pixels: Option<Arc<ImageData>>,
}

impl Texture {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pixels: None,
        }
    }

    pub fn with_pixels(mut self, pixels: ImageData) -> Self {
        self.pixels = Some(Arc::new(pixels));
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.pixels.is_some()
    }
}

/// Blinn-Phong style surface description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardMaterial {
    pub name: String,
    pub diffuse_color: Color3,
    pub emissive_color: Color3,
    pub specular_color: Color3,
    pub specular_power: f32,
    /// Widens the specular lobe; zero keeps `specular_power` as is.
    pub roughness: f32,
    pub diffuse_texture: Option<TextureId>,
    pub bump_texture: Option<TextureId>,
    pub disable_lighting: bool,
}

impl StandardMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_color: Color3::WHITE,
            emissive_color: Color3::BLACK,
            specular_color: Color3::WHITE,
            specular_power: 64.0,
            roughness: 0.0,
            diffuse_texture: None,
            bump_texture: None,
            disable_lighting: false,
        }
    }

    pub fn with_diffuse(mut self, color: Color3) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn with_emissive(mut self, color: Color3) -> Self {
        self.emissive_color = color;
        self
    }

    pub fn with_specular(mut self, color: Color3) -> Self {
        self.specular_color = color;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_diffuse_texture(mut self, texture: TextureId) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    pub fn with_bump_texture(mut self, texture: TextureId) -> Self {
        self.bump_texture = Some(texture);
        self
    }

    /// Specular exponent after roughness is applied.
    pub fn effective_specular_power(&self) -> f32 {
        self.specular_power / (1.0 + self.roughness.max(0.0))
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_is_white_and_lit() {
        let m = StandardMaterial::default();
        assert_eq!(m.diffuse_color, Color3::WHITE);
        assert_eq!(m.emissive_color, Color3::BLACK);
        assert!(!m.disable_lighting);
        assert_eq!(m.effective_specular_power(), 64.0);
    }

    #[test]
    fn roughness_softens_specular() {
        let m = StandardMaterial::new("GroundMat").with_roughness(15.0);
        assert_eq!(m.effective_specular_power(), 4.0);
    }

    #[test]
    fn texture_tracks_loaded_pixels() {
        let t = Texture::new("/assets/textures/diffuse/sand.jpg");
        assert!(!t.is_loaded());
        let t = t.with_pixels(ImageData::solid([1, 2, 3, 4]));
        assert!(t.is_loaded());
    }
}
