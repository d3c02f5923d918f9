use crate::debug::DebugTextEngine;
use crate::engine::{RenderEngine, RenderError};
use crate::host::{HeadlessSurface, Surface};
use tableau_assets::AssetRoot;
use tableau_common::EntityId;
use tableau_scene::{
    ArcRotateCamera, Light, MaterialId, Mesh, Scene, ShadowGenerator, ShadowGeneratorId,
    StandardMaterial, Texture, TextureId,
};

/// Capability interface for creating an engine and populating scenes.
///
/// The default methods build plain scene data. Backends override the
/// creation steps they need to observe, e.g. decoding textures eagerly so a
/// missing file fails at startup instead of on the first frame.
pub trait SceneBuilder {
    type Surface: Surface;
    type Engine: RenderEngine;

    /// Bind a new engine to `surface`.
    fn create_engine(&mut self, surface: &Self::Surface) -> Result<Self::Engine, RenderError>;

    fn create_scene(&mut self, _engine: &Self::Engine) -> Scene {
        Scene::new()
    }

    fn create_camera(&mut self, scene: &mut Scene, camera: ArcRotateCamera) -> EntityId {
        scene.set_camera(camera)
    }

    fn create_light(&mut self, scene: &mut Scene, light: Light) -> EntityId {
        scene.add_light(light)
    }

    fn load_texture(&mut self, scene: &mut Scene, source: &str) -> Result<TextureId, RenderError> {
        Ok(scene.add_texture(Texture::new(source)))
    }

    fn create_material(
        &mut self,
        scene: &mut Scene,
        material: StandardMaterial,
    ) -> Result<MaterialId, RenderError> {
        Ok(scene.add_material(material)?)
    }

    fn create_mesh(&mut self, scene: &mut Scene, mesh: Mesh) -> Result<EntityId, RenderError> {
        Ok(scene.add_mesh(mesh)?)
    }

    /// Attach `generator` and register `casters` with it.
    fn create_shadow_generator(
        &mut self,
        scene: &mut Scene,
        generator: ShadowGenerator,
        casters: &[EntityId],
    ) -> Result<ShadowGeneratorId, RenderError> {
        let id = scene.add_shadow_generator(generator)?;
        for caster in casters {
            scene.add_shadow_caster(id, *caster)?;
        }
        Ok(id)
    }
}

/// One creation request observed by a [`GraphBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum BuildRequest {
    Engine { surface: String },
    Scene,
    Camera(String),
    Light(String),
    Texture(String),
    Material(String),
    Mesh(String),
    ShadowGenerator { map_size: u32, casters: usize },
}

/// Headless builder producing [`DebugTextEngine`]s.
///
/// Every request is recorded in order. With an asset root, textures are
/// decoded on load and missing files are errors; without one, textures are
/// kept as unresolved references.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    assets: Option<AssetRoot>,
    requests: Vec<BuildRequest>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(assets: AssetRoot) -> Self {
        Self {
            assets: Some(assets),
            requests: Vec::new(),
        }
    }

    pub fn requests(&self) -> &[BuildRequest] {
        &self.requests
    }

    pub fn count(&self, pred: impl Fn(&BuildRequest) -> bool) -> usize {
        self.requests.iter().filter(|r| pred(r)).count()
    }
}

impl SceneBuilder for GraphBuilder {
    type Surface = HeadlessSurface;
    type Engine = DebugTextEngine;

    fn create_engine(&mut self, surface: &HeadlessSurface) -> Result<DebugTextEngine, RenderError> {
        self.requests.push(BuildRequest::Engine {
            surface: surface.id().to_string(),
        });
        Ok(DebugTextEngine::new(surface.clone()))
    }

    fn create_scene(&mut self, _engine: &DebugTextEngine) -> Scene {
        self.requests.push(BuildRequest::Scene);
        Scene::new()
    }

    fn create_camera(&mut self, scene: &mut Scene, camera: ArcRotateCamera) -> EntityId {
        self.requests.push(BuildRequest::Camera(camera.name.clone()));
        scene.set_camera(camera)
    }

    fn create_light(&mut self, scene: &mut Scene, light: Light) -> EntityId {
        self.requests.push(BuildRequest::Light(light.name().to_string()));
        scene.add_light(light)
    }

    fn load_texture(&mut self, scene: &mut Scene, source: &str) -> Result<TextureId, RenderError> {
        self.requests.push(BuildRequest::Texture(source.to_string()));
        let texture = match &self.assets {
            Some(root) => Texture::new(source).with_pixels(root.load_image(source)?),
            None => Texture::new(source),
        };
        Ok(scene.add_texture(texture))
    }

    fn create_material(
        &mut self,
        scene: &mut Scene,
        material: StandardMaterial,
    ) -> Result<MaterialId, RenderError> {
        self.requests.push(BuildRequest::Material(material.name.clone()));
        Ok(scene.add_material(material)?)
    }

    fn create_mesh(&mut self, scene: &mut Scene, mesh: Mesh) -> Result<EntityId, RenderError> {
        self.requests.push(BuildRequest::Mesh(mesh.name.clone()));
        Ok(scene.add_mesh(mesh)?)
    }

    fn create_shadow_generator(
        &mut self,
        scene: &mut Scene,
        generator: ShadowGenerator,
        casters: &[EntityId],
    ) -> Result<ShadowGeneratorId, RenderError> {
        self.requests.push(BuildRequest::ShadowGenerator {
            map_size: generator.map_size,
            casters: casters.len(),
        });
        let id = scene.add_shadow_generator(generator)?;
        for caster in casters {
            scene.add_shadow_caster(id, *caster)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tableau_scene::{DirectionalLight, HemisphericLight, Shape};

    #[test]
    fn records_requests_in_order() {
        let mut builder = GraphBuilder::new();
        let engine = builder.create_engine(&HeadlessSurface::default()).unwrap();
        let mut scene = builder.create_scene(&engine);
        builder.create_light(&mut scene, HemisphericLight::new("light1", Vec3::Y).into());
        builder
            .create_mesh(&mut scene, Mesh::new("Box", Shape::cube(1.0)))
            .unwrap();

        assert_eq!(
            builder.requests(),
            &[
                BuildRequest::Engine {
                    surface: "renderCanvas".into()
                },
                BuildRequest::Scene,
                BuildRequest::Light("light1".into()),
                BuildRequest::Mesh("Box".into()),
            ]
        );
    }

    #[test]
    fn textures_stay_unresolved_without_assets() {
        let mut builder = GraphBuilder::new();
        let mut scene = Scene::new();
        let id = builder.load_texture(&mut scene, "/missing.png").unwrap();
        assert!(!scene.texture(id).unwrap().is_loaded());
    }

    #[test]
    fn missing_texture_fails_with_assets() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = GraphBuilder::with_assets(AssetRoot::new(dir.path()));
        let mut scene = Scene::new();
        let err = builder.load_texture(&mut scene, "/missing.png").unwrap_err();
        assert!(matches!(err, RenderError::Asset(_)));
        assert!(scene.textures().is_empty());
    }

    #[test]
    fn shadow_generator_registers_casters() {
        let mut builder = GraphBuilder::new();
        let mut scene = Scene::new();
        let sun = builder.create_light(
            &mut scene,
            DirectionalLight::new("DLight", Vec3::new(2.0, -15.0, 2.0)).into(),
        );
        let ball = builder
            .create_mesh(&mut scene, Mesh::new("sphere", Shape::sphere(16, 2.0)))
            .unwrap();
        let id = builder
            .create_shadow_generator(&mut scene, ShadowGenerator::new(1024, sun), &[ball])
            .unwrap();
        assert_eq!(scene.shadow_generator(id).unwrap().casters(), &[ball]);
        assert_eq!(
            builder.count(|r| matches!(r, BuildRequest::ShadowGenerator { casters: 1, .. })),
            1
        );
    }

    #[test]
    fn shadow_generator_on_ambient_light_is_a_scene_error() {
        let mut builder = GraphBuilder::new();
        let mut scene = Scene::new();
        let hemi = builder.create_light(&mut scene, HemisphericLight::new("light1", Vec3::Y).into());
        let err = builder
            .create_shadow_generator(&mut scene, ShadowGenerator::new(1024, hemi), &[])
            .unwrap_err();
        assert!(matches!(err, RenderError::Scene(_)));
    }
}
