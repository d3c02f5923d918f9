use crate::camera::ArcRotateCamera;
use crate::light::Light;
use crate::material::{MaterialId, StandardMaterial, Texture, TextureId};
use crate::mesh::Mesh;
use crate::shadow::{ShadowGenerator, ShadowGeneratorId};
use serde::Serialize;
use std::collections::BTreeMap;
use tableau_common::{Color3, EntityId};

/// Errors from scene mutations that would break a scene invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("unknown light {0:?}")]
    UnknownLight(EntityId),
    #[error("light {0:?} is not directional")]
    NotDirectional(EntityId),
    #[error("unknown mesh {0:?}")]
    UnknownMesh(EntityId),
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialId),
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),
    #[error("unknown shadow generator {0:?}")]
    UnknownShadowGenerator(ShadowGeneratorId),
}

/// Container of everything that gets rendered.
///
/// All mutations go through explicit operations that keep references
/// between entities valid. Entity maps are BTreeMaps so iteration order is
/// stable for a given set of ids.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    clear_color: Color3,
    camera: Option<(EntityId, ArcRotateCamera)>,
    lights: BTreeMap<EntityId, Light>,
    meshes: BTreeMap<EntityId, Mesh>,
    materials: Vec<StandardMaterial>,
    textures: Vec<Texture>,
    shadow_generators: Vec<ShadowGenerator>,
}

impl Scene {
    /// An empty scene with the default clear colour.
    pub fn new() -> Self {
        Self {
            clear_color: Color3::new(0.2, 0.2, 0.3),
            camera: None,
            lights: BTreeMap::new(),
            meshes: BTreeMap::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            shadow_generators: Vec::new(),
        }
    }

    pub fn clear_color(&self) -> Color3 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color3) {
        self.clear_color = color;
    }

    /// Install the scene's camera, replacing any previous one.
    pub fn set_camera(&mut self, camera: ArcRotateCamera) -> EntityId {
        let id = EntityId::new();
        if let Some((old, _)) = self.camera.replace((id, camera)) {
            tracing::debug!("camera {} replaced by {}", old.short(), id.short());
        }
        id
    }

    pub fn camera(&self) -> Option<&ArcRotateCamera> {
        self.camera.as_ref().map(|(_, c)| c)
    }

    pub fn camera_mut(&mut self) -> Option<&mut ArcRotateCamera> {
        self.camera.as_mut().map(|(_, c)| c)
    }

    pub fn camera_id(&self) -> Option<EntityId> {
        self.camera.as_ref().map(|(id, _)| *id)
    }

    pub fn add_light(&mut self, light: impl Into<Light>) -> EntityId {
        let id = EntityId::new();
        self.lights.insert(id, light.into());
        id
    }

    pub fn light(&self, id: EntityId) -> Option<&Light> {
        self.lights.get(&id)
    }

    pub fn lights(&self) -> &BTreeMap<EntityId, Light> {
        &self.lights
    }

    /// Register a material. Referenced textures must already exist.
    pub fn add_material(&mut self, material: StandardMaterial) -> Result<MaterialId, SceneError> {
        for texture in [material.diffuse_texture, material.bump_texture]
            .into_iter()
            .flatten()
        {
            if self.texture(texture).is_none() {
                return Err(SceneError::UnknownTexture(texture));
            }
        }
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        Ok(id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&StandardMaterial> {
        self.materials.get(id.0 as usize)
    }

    pub fn materials(&self) -> &[StandardMaterial] {
        &self.materials
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);
        id
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0 as usize)
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Add a mesh. Its material, if any, must already exist.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<EntityId, SceneError> {
        if let Some(material) = mesh.material {
            if self.material(material).is_none() {
                return Err(SceneError::UnknownMaterial(material));
            }
        }
        let id = EntityId::new();
        self.meshes.insert(id, mesh);
        Ok(id)
    }

    pub fn mesh(&self, id: EntityId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn mesh_by_name(&self, name: &str) -> Option<(EntityId, &Mesh)> {
        self.meshes
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(id, m)| (*id, m))
    }

    pub fn meshes(&self) -> &BTreeMap<EntityId, Mesh> {
        &self.meshes
    }

    /// Attach a shadow generator. Its light must be a directional light of
    /// this scene.
    pub fn add_shadow_generator(
        &mut self,
        generator: ShadowGenerator,
    ) -> Result<ShadowGeneratorId, SceneError> {
        match self.lights.get(&generator.light) {
            None => return Err(SceneError::UnknownLight(generator.light)),
            Some(Light::Hemispheric(_)) => {
                return Err(SceneError::NotDirectional(generator.light));
            }
            Some(Light::Directional(_)) => {}
        }
        for caster in generator.casters() {
            if !self.meshes.contains_key(caster) {
                return Err(SceneError::UnknownMesh(*caster));
            }
        }
        let id = ShadowGeneratorId(self.shadow_generators.len() as u32);
        self.shadow_generators.push(generator);
        Ok(id)
    }

    /// Register `mesh` as a shadow caster of `generator`.
    pub fn add_shadow_caster(
        &mut self,
        generator: ShadowGeneratorId,
        mesh: EntityId,
    ) -> Result<(), SceneError> {
        if !self.meshes.contains_key(&mesh) {
            return Err(SceneError::UnknownMesh(mesh));
        }
        let generator = self
            .shadow_generators
            .get_mut(generator.0 as usize)
            .ok_or(SceneError::UnknownShadowGenerator(generator))?;
        generator.add_caster(mesh);
        Ok(())
    }

    pub fn shadow_generator(&self, id: ShadowGeneratorId) -> Option<&ShadowGenerator> {
        self.shadow_generators.get(id.0 as usize)
    }

    pub fn shadow_generators(&self) -> &[ShadowGenerator] {
        &self.shadow_generators
    }

    /// Whether any generator lists `mesh` as a caster.
    pub fn is_shadow_caster(&self, mesh: EntityId) -> bool {
        self.shadow_generators.iter().any(|g| g.is_caster(mesh))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{DirectionalLight, HemisphericLight};
    use crate::mesh::Shape;
    use crate::shadow::ShadowFilter;
    use glam::Vec3;

    fn scene_with_sun() -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let sun = scene.add_light(DirectionalLight::new("DLight", Vec3::new(2.0, -15.0, 2.0)));
        (scene, sun)
    }

    #[test]
    fn empty_scene() {
        let scene = Scene::new();
        assert!(scene.camera().is_none());
        assert!(scene.lights().is_empty());
        assert!(scene.meshes().is_empty());
    }

    #[test]
    fn set_camera_replaces_previous() {
        let mut scene = Scene::new();
        let first = scene.set_camera(ArcRotateCamera::new("a", 1.0, 0.8, 10.0, Vec3::ZERO));
        let second = scene.set_camera(ArcRotateCamera::new("b", 1.0, 0.8, 10.0, Vec3::ZERO));
        assert_ne!(first, second);
        assert_eq!(scene.camera_id(), Some(second));
        assert_eq!(scene.camera().unwrap().name, "b");
    }

    #[test]
    fn mesh_with_unknown_material_is_rejected() {
        let mut scene = Scene::new();
        let err = scene
            .add_mesh(Mesh::new("m", Shape::cube(1.0)).with_material(MaterialId(4)))
            .unwrap_err();
        assert_eq!(err, SceneError::UnknownMaterial(MaterialId(4)));
    }

    #[test]
    fn material_with_unknown_texture_is_rejected() {
        let mut scene = Scene::new();
        let err = scene
            .add_material(StandardMaterial::new("m").with_bump_texture(TextureId(0)))
            .unwrap_err();
        assert_eq!(err, SceneError::UnknownTexture(TextureId(0)));

        let tex = scene.add_texture(Texture::new("/assets/textures/normals/sand.png"));
        assert!(scene
            .add_material(StandardMaterial::new("m").with_bump_texture(tex))
            .is_ok());
    }

    #[test]
    fn shadow_generator_requires_directional_light() {
        let mut scene = Scene::new();
        let hemi = scene.add_light(HemisphericLight::new("light1", Vec3::Y));
        assert_eq!(
            scene.add_shadow_generator(ShadowGenerator::new(1024, hemi)),
            Err(SceneError::NotDirectional(hemi))
        );

        let missing = EntityId::new();
        assert_eq!(
            scene.add_shadow_generator(ShadowGenerator::new(1024, missing)),
            Err(SceneError::UnknownLight(missing))
        );
    }

    #[test]
    fn shadow_casters_must_exist() {
        let (mut scene, sun) = scene_with_sun();
        let generator = scene
            .add_shadow_generator(
                ShadowGenerator::new(1024, sun).with_filter(ShadowFilter::BlurExponential),
            )
            .unwrap();

        let ghost = EntityId::new();
        assert_eq!(
            scene.add_shadow_caster(generator, ghost),
            Err(SceneError::UnknownMesh(ghost))
        );

        let sphere = scene.add_mesh(Mesh::new("sphere", Shape::sphere(16, 2.0))).unwrap();
        scene.add_shadow_caster(generator, sphere).unwrap();
        assert!(scene.is_shadow_caster(sphere));
        assert_eq!(scene.shadow_generator(generator).unwrap().casters(), &[sphere]);
    }

    #[test]
    fn mesh_lookup_by_name() {
        let mut scene = Scene::new();
        let id = scene.add_mesh(Mesh::new("Box", Shape::cube(1.0))).unwrap();
        assert_eq!(scene.mesh_by_name("Box").map(|(i, _)| i), Some(id));
        assert!(scene.mesh_by_name("missing").is_none());
    }

    #[test]
    fn scene_serializes_to_json() {
        let (mut scene, _) = scene_with_sun();
        scene
            .add_mesh(Mesh::new("ground1", Shape::ground(20.0, 20.0, 2)).receiving_shadows())
            .unwrap();
        let json = serde_json::to_string(&scene).unwrap();
        assert!(json.contains("ground1"));
        assert!(json.contains("DLight"));
    }
}
