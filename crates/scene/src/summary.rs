use crate::light::Light;
use crate::scene::Scene;
use serde::Serialize;

/// Entity counts of a scene, for logs and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub cameras: usize,
    pub hemispheric_lights: usize,
    pub directional_lights: usize,
    /// Solid meshes; polylines are counted in `lines`.
    pub meshes: usize,
    pub lines: usize,
    pub materials: usize,
    pub textures: usize,
    pub shadow_generators: usize,
    pub shadow_casters: usize,
    pub shadow_receivers: usize,
}

impl SceneSummary {
    pub fn of(scene: &Scene) -> Self {
        let hemispheric_lights = scene
            .lights()
            .values()
            .filter(|l| matches!(l, Light::Hemispheric(_)))
            .count();
        let lines = scene.meshes().values().filter(|m| m.shape.is_lines()).count();

        Self {
            cameras: usize::from(scene.camera().is_some()),
            hemispheric_lights,
            directional_lights: scene.lights().len() - hemispheric_lights,
            meshes: scene.meshes().len() - lines,
            lines,
            materials: scene.materials().len(),
            textures: scene.textures().len(),
            shadow_generators: scene.shadow_generators().len(),
            shadow_casters: scene
                .meshes()
                .keys()
                .filter(|id| scene.is_shadow_caster(**id))
                .count(),
            shadow_receivers: scene.meshes().values().filter(|m| m.receive_shadows).count(),
        }
    }

    pub fn lights(&self) -> usize {
        self.hemispheric_lights + self.directional_lights
    }
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: cameras={} lights={} (hemispheric={} directional={}) meshes={} lines={} \
             materials={} textures={} shadow_generators={} casters={} receivers={}",
            self.cameras,
            self.lights(),
            self.hemispheric_lights,
            self.directional_lights,
            self.meshes,
            self.lines,
            self.materials,
            self.textures,
            self.shadow_generators,
            self.shadow_casters,
            self.shadow_receivers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArcRotateCamera, DirectionalLight, HemisphericLight, Mesh, Shape, ShadowGenerator};
    use glam::Vec3;

    #[test]
    fn empty_scene_summary() {
        let summary = SceneSummary::of(&Scene::new());
        assert_eq!(summary.cameras, 0);
        assert_eq!(summary.lights(), 0);
        assert_eq!(summary.meshes, 0);
    }

    #[test]
    fn summary_counts_by_kind() {
        let mut scene = Scene::new();
        scene.set_camera(ArcRotateCamera::new("camera", 1.0, 0.8, 10.0, Vec3::ZERO));
        scene.add_light(HemisphericLight::new("light1", Vec3::Y));
        let sun = scene.add_light(DirectionalLight::new("DLight", Vec3::NEG_Y));
        let ball = scene.add_mesh(Mesh::new("sphere", Shape::sphere(16, 2.0))).unwrap();
        scene
            .add_mesh(Mesh::new("ground1", Shape::ground(20.0, 20.0, 2)).receiving_shadows())
            .unwrap();
        scene
            .add_mesh(Mesh::new("Lines", Shape::lines(vec![Vec3::ZERO, Vec3::X])))
            .unwrap();
        let generator = scene.add_shadow_generator(ShadowGenerator::new(1024, sun)).unwrap();
        scene.add_shadow_caster(generator, ball).unwrap();

        let summary = SceneSummary::of(&scene);
        assert_eq!(summary.cameras, 1);
        assert_eq!(summary.hemispheric_lights, 1);
        assert_eq!(summary.directional_lights, 1);
        assert_eq!(summary.meshes, 2);
        assert_eq!(summary.lines, 1);
        assert_eq!(summary.shadow_casters, 1);
        assert_eq!(summary.shadow_receivers, 1);

        let text = summary.to_string();
        assert!(text.contains("lights=2"));
        assert!(text.contains("casters=1"));
    }
}
