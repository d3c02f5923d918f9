use glam::Vec3;
use serde::Serialize;
use tableau_common::Color3;

/// Non-directional fill light blending a sky and a ground colour by how
/// much a surface faces `direction`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HemisphericLight {
    pub name: String,
    pub direction: Vec3,
    pub intensity: f32,
    pub diffuse: Color3,
    pub ground_color: Color3,
}

impl HemisphericLight {
    pub fn new(name: impl Into<String>, direction: Vec3) -> Self {
        Self {
            name: name.into(),
            direction,
            intensity: 1.0,
            diffuse: Color3::WHITE,
            ground_color: Color3::BLACK,
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}

/// Parallel light travelling along `direction`. `position` is where shadow
/// maps are rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionalLight {
    pub name: String,
    pub direction: Vec3,
    pub position: Vec3,
    pub intensity: f32,
    pub diffuse: Color3,
    pub specular: Color3,
}

impl DirectionalLight {
    /// The light starts positioned at `-direction`.
    pub fn new(name: impl Into<String>, direction: Vec3) -> Self {
        Self {
            name: name.into(),
            direction,
            position: -direction,
            intensity: 1.0,
            diffuse: Color3::WHITE,
            specular: Color3::WHITE,
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Light {
    Hemispheric(HemisphericLight),
    Directional(DirectionalLight),
}

impl Light {
    pub fn name(&self) -> &str {
        match self {
            Light::Hemispheric(l) => &l.name,
            Light::Directional(l) => &l.name,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Hemispheric(l) => l.intensity,
            Light::Directional(l) => l.intensity,
        }
    }

    pub fn as_directional(&self) -> Option<&DirectionalLight> {
        match self {
            Light::Directional(l) => Some(l),
            Light::Hemispheric(_) => None,
        }
    }

    pub fn as_hemispheric(&self) -> Option<&HemisphericLight> {
        match self {
            Light::Hemispheric(l) => Some(l),
            Light::Directional(_) => None,
        }
    }
}

impl From<HemisphericLight> for Light {
    fn from(light: HemisphericLight) -> Self {
        Light::Hemispheric(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_light_sits_opposite_its_direction() {
        let light = DirectionalLight::new("DLight", Vec3::new(2.0, -15.0, 2.0));
        assert_eq!(light.position, Vec3::new(-2.0, 15.0, -2.0));
        assert_eq!(light.intensity, 1.0);
    }

    #[test]
    fn light_accessors() {
        let hemi: Light = HemisphericLight::new("light1", Vec3::Y)
            .with_intensity(0.2)
            .into();
        assert_eq!(hemi.name(), "light1");
        assert_eq!(hemi.intensity(), 0.2);
        assert!(hemi.as_directional().is_none());
        assert_eq!(hemi.as_hemispheric().unwrap().ground_color, Color3::BLACK);
    }
}
