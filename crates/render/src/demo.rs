//! The fixed demo scene: a sandy ground, a magenta ball casting a soft
//! shadow, a sun marker, and a few untextured primitives.

use crate::builder::SceneBuilder;
use crate::engine::RenderError;
use glam::Vec3;
use tableau_common::{Color3, EntityId};
use tableau_scene::{
    ArcRotateCamera, DirectionalLight, HemisphericLight, Mesh, Scene, Shape, ShadowFilter,
    ShadowGenerator, ShadowGeneratorId, StandardMaterial,
};

pub const GROUND_DIFFUSE_TEXTURE: &str = "/assets/textures/diffuse/sand.jpg";
pub const GROUND_BUMP_TEXTURE: &str = "/assets/textures/normals/sand.png";

const CLEAR_COLOR: Color3 = Color3::new(0.1, 0.1, 0.1);
const SUN_DIRECTION: Vec3 = Vec3::new(2.0, -15.0, 2.0);
const SHADOW_MAP_SIZE: u32 = 1024;

/// Ids of the entities the demo creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoIds {
    pub camera: EntityId,
    pub ambient: EntityId,
    pub sun: EntityId,
    pub sun_marker: EntityId,
    pub sphere: EntityId,
    pub ground: EntityId,
    pub cube: EntityId,
    pub cylinder: EntityId,
    pub lines: EntityId,
    pub shadows: ShadowGeneratorId,
}

/// A freshly built demo scene.
#[derive(Debug)]
pub struct DemoScene {
    pub scene: Scene,
    pub ids: DemoIds,
}

/// Build the demo scene through `builder`. Each call yields an independent
/// scene with new entity ids.
pub fn build_demo_scene<B: SceneBuilder>(
    builder: &mut B,
    engine: &B::Engine,
    surface_id: &str,
) -> Result<DemoScene, RenderError> {
    let mut scene = builder.create_scene(engine);
    scene.set_clear_color(CLEAR_COLOR);

    let mut camera = ArcRotateCamera::new("camera", 1.0, 0.8, 10.0, Vec3::ZERO);
    camera.set_target(Vec3::ZERO);
    camera.attach_control(surface_id);
    let camera = builder.create_camera(&mut scene, camera);

    let ambient = builder.create_light(
        &mut scene,
        HemisphericLight::new("light1", Vec3::Y)
            .with_intensity(0.2)
            .into(),
    );

    let sun_light = DirectionalLight::new("DLight", SUN_DIRECTION).with_intensity(0.5);
    let sun_position = sun_light.position;
    let sun = builder.create_light(&mut scene, sun_light.into());

    let sun_material = builder.create_material(
        &mut scene,
        StandardMaterial::new("dLight").with_emissive(Color3::new(1.0, 1.0, 0.0)),
    )?;
    let sun_marker = builder.create_mesh(
        &mut scene,
        Mesh::new("Sun", Shape::sphere(10, 2.0))
            .with_material(sun_material)
            .with_position(sun_position),
    )?;

    let sphere_material = builder.create_material(
        &mut scene,
        StandardMaterial::new("sphereMat").with_diffuse(Color3::new(1.0, 0.0, 1.0)),
    )?;
    let sphere = builder.create_mesh(
        &mut scene,
        Mesh::new("sphere", Shape::sphere(16, 2.0))
            .with_material(sphere_material)
            .with_position(Vec3::new(0.0, 1.0, 0.0)),
    )?;

    let diffuse = builder.load_texture(&mut scene, GROUND_DIFFUSE_TEXTURE)?;
    let bump = builder.load_texture(&mut scene, GROUND_BUMP_TEXTURE)?;
    let ground_material = builder.create_material(
        &mut scene,
        StandardMaterial::new("GroundMat")
            .with_diffuse_texture(diffuse)
            .with_bump_texture(bump)
            .with_roughness(15.0)
            .with_specular(Color3::BLACK),
    )?;
    let ground = builder.create_mesh(
        &mut scene,
        Mesh::new("ground1", Shape::ground(20.0, 20.0, 2))
            .with_material(ground_material)
            .receiving_shadows(),
    )?;

    let cube = builder.create_mesh(
        &mut scene,
        Mesh::new("Box", Shape::cube(1.0)).with_position(Vec3::new(7.0, 2.0, -5.0)),
    )?;
    let cylinder = builder.create_mesh(
        &mut scene,
        Mesh::new("Cylinder", Shape::cylinder(5.0, 1.0, 1.0, 10))
            .with_position(Vec3::new(5.0, 0.0, 5.0)),
    )?;
    let lines = builder.create_mesh(
        &mut scene,
        Mesh::new(
            "Lines",
            Shape::lines(vec![
                Vec3::new(0.0, 5.0, 0.0),
                Vec3::new(1.0, 5.0, 0.0),
                Vec3::new(0.0, 5.0, 1.0),
            ]),
        )
        .with_position(Vec3::new(-6.0, -3.0, 6.0)),
    )?;

    let shadows = builder.create_shadow_generator(
        &mut scene,
        ShadowGenerator::new(SHADOW_MAP_SIZE, sun).with_filter(ShadowFilter::BlurExponential),
        &[sphere],
    )?;

    Ok(DemoScene {
        scene,
        ids: DemoIds {
            camera,
            ambient,
            sun,
            sun_marker,
            sphere,
            ground,
            cube,
            cylinder,
            lines,
            shadows,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildRequest, GraphBuilder};
    use crate::host::HeadlessSurface;
    use tableau_scene::{Light, SceneSummary};

    fn build() -> (GraphBuilder, DemoScene) {
        let mut builder = GraphBuilder::new();
        let engine = builder.create_engine(&HeadlessSurface::default()).unwrap();
        let demo = build_demo_scene(&mut builder, &engine, "renderCanvas").unwrap();
        (builder, demo)
    }

    #[test]
    fn entity_counts() {
        let (_, demo) = build();
        let summary = SceneSummary::of(&demo.scene);
        assert_eq!(summary.cameras, 1);
        assert_eq!(summary.hemispheric_lights, 1);
        assert_eq!(summary.directional_lights, 1);
        assert_eq!(summary.meshes, 5);
        assert_eq!(summary.lines, 1);
        assert_eq!(summary.textures, 2);
        assert_eq!(summary.shadow_generators, 1);
    }

    #[test]
    fn ground_receives_and_sphere_is_sole_caster() {
        let (_, demo) = build();
        let scene = &demo.scene;
        assert!(scene.mesh(demo.ids.ground).unwrap().receive_shadows);

        let generator = scene.shadow_generator(demo.ids.shadows).unwrap();
        assert_eq!(generator.casters(), &[demo.ids.sphere]);
        assert_eq!(generator.map_size, 1024);
        assert_eq!(generator.filter, ShadowFilter::BlurExponential);
        assert_eq!(generator.light, demo.ids.sun);

        let casters: Vec<_> = scene
            .meshes()
            .keys()
            .filter(|id| scene.is_shadow_caster(**id))
            .collect();
        assert_eq!(casters, vec![&demo.ids.sphere]);
    }

    #[test]
    fn lights_have_literal_parameters() {
        let (_, demo) = build();
        let scene = &demo.scene;
        match scene.light(demo.ids.ambient) {
            Some(Light::Hemispheric(l)) => {
                assert_eq!(l.intensity, 0.2);
                assert_eq!(l.direction, Vec3::Y);
            }
            other => panic!("expected hemispheric light, got {other:?}"),
        }
        let sun = scene.light(demo.ids.sun).unwrap().as_directional().unwrap();
        assert_eq!(sun.intensity, 0.5);
        assert_eq!(sun.direction, SUN_DIRECTION);

        let marker = scene.mesh(demo.ids.sun_marker).unwrap();
        assert_eq!(marker.transform.position, sun.position);
        let marker_material = scene.material(marker.material.unwrap()).unwrap();
        assert_eq!(marker_material.emissive_color, Color3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn meshes_have_literal_placement() {
        let (_, demo) = build();
        let scene = &demo.scene;

        let sphere = scene.mesh(demo.ids.sphere).unwrap();
        assert_eq!(sphere.transform.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(sphere.shape, Shape::sphere(16, 2.0));
        let sphere_material = scene.material(sphere.material.unwrap()).unwrap();
        assert_eq!(sphere_material.diffuse_color, Color3::new(1.0, 0.0, 1.0));

        let cube = scene.mesh(demo.ids.cube).unwrap();
        assert_eq!(cube.transform.position, Vec3::new(7.0, 2.0, -5.0));
        assert!(cube.material.is_none());

        let cylinder = scene.mesh(demo.ids.cylinder).unwrap();
        assert_eq!(cylinder.transform.position, Vec3::new(5.0, 0.0, 5.0));

        let lines = scene.mesh(demo.ids.lines).unwrap();
        assert_eq!(lines.transform.position, Vec3::new(-6.0, -3.0, 6.0));
        match &lines.shape {
            Shape::Lines { points } => assert_eq!(points.len(), 3),
            other => panic!("expected lines, got {other:?}"),
        }
    }

    #[test]
    fn ground_material_is_textured_and_matte() {
        let (_, demo) = build();
        let scene = &demo.scene;
        let ground = scene.mesh(demo.ids.ground).unwrap();
        assert_eq!(ground.shape, Shape::ground(20.0, 20.0, 2));

        let material = scene.material(ground.material.unwrap()).unwrap();
        assert_eq!(material.roughness, 15.0);
        assert_eq!(material.specular_color, Color3::BLACK);
        let diffuse = scene.texture(material.diffuse_texture.unwrap()).unwrap();
        let bump = scene.texture(material.bump_texture.unwrap()).unwrap();
        assert_eq!(diffuse.source, GROUND_DIFFUSE_TEXTURE);
        assert_eq!(bump.source, GROUND_BUMP_TEXTURE);
    }

    #[test]
    fn camera_is_attached_to_surface() {
        let (_, demo) = build();
        let camera = demo.scene.camera().unwrap();
        assert_eq!(demo.scene.camera_id(), Some(demo.ids.camera));
        assert_eq!(camera.attached_surface(), Some("renderCanvas"));
        assert_eq!((camera.alpha, camera.beta, camera.radius), (1.0, 0.8, 10.0));
        assert_eq!(demo.scene.clear_color(), CLEAR_COLOR);
    }

    #[test]
    fn builder_sees_every_request() {
        let (builder, _) = build();
        assert_eq!(builder.count(|r| matches!(r, BuildRequest::Camera(_))), 1);
        assert_eq!(builder.count(|r| matches!(r, BuildRequest::Light(_))), 2);
        assert_eq!(builder.count(|r| matches!(r, BuildRequest::Mesh(_))), 6);
        assert_eq!(builder.count(|r| matches!(r, BuildRequest::Texture(_))), 2);
        assert_eq!(builder.count(|r| matches!(r, BuildRequest::Material(_))), 3);
        assert_eq!(
            builder.count(|r| matches!(r, BuildRequest::ShadowGenerator { map_size: 1024, casters: 1 })),
            1
        );
    }
}
