//! CPU-side layouts of the shader uniform blocks and the per-frame light
//! selection that fills them.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tableau_scene::{
    DirectionalLight, HemisphericLight, Light, Mesh, Scene, ShadowFilter, ShadowGenerator,
    StandardMaterial,
};

const SHADOW_HALF_EXTENT: f32 = 15.0;
const SHADOW_EYE_DISTANCE: f32 = 30.0;
const SHADOW_NEAR: f32 = 0.1;
const SHADOW_FAR: f32 = 60.0;

/// Lights the forward shader consumes this frame.
///
/// The shader has one ambient slot and one sun slot; extra lights of the
/// same kind are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightRig<'a> {
    pub ambient: Option<&'a HemisphericLight>,
    pub sun: Option<&'a DirectionalLight>,
    pub shadow: Option<&'a ShadowGenerator>,
}

impl<'a> LightRig<'a> {
    pub fn of(scene: &'a Scene) -> Self {
        let shadow = scene.shadow_generators().iter().find(|g| {
            scene
                .light(g.light)
                .and_then(Light::as_directional)
                .is_some()
        });
        let sun = shadow
            .and_then(|g| scene.light(g.light))
            .and_then(Light::as_directional)
            .or_else(|| scene.lights().values().find_map(Light::as_directional));
        let ambient = scene.lights().values().find_map(Light::as_hemispheric);
        Self {
            ambient,
            sun,
            shadow,
        }
    }

    /// View-projection of the shadow camera, identity without a sun.
    pub fn light_view_proj(&self) -> Mat4 {
        self.sun
            .map(|sun| light_view_projection(sun.direction))
            .unwrap_or(Mat4::IDENTITY)
    }
}

/// Orthographic projection looking along `direction` at the origin.
pub fn light_view_projection(direction: Vec3) -> Mat4 {
    let dir = direction.try_normalize().unwrap_or(Vec3::NEG_Y);
    let up = if dir.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
    let view = Mat4::look_at_lh(-dir * SHADOW_EYE_DISTANCE, Vec3::ZERO, up);
    let proj = Mat4::orthographic_lh(
        -SHADOW_HALF_EXTENT,
        SHADOW_HALF_EXTENT,
        -SHADOW_HALF_EXTENT,
        SHADOW_HALF_EXTENT,
        SHADOW_NEAR,
        SHADOW_FAR,
    );
    proj * view
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub hemi_dir: [f32; 4],
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub sun_dir: [f32; 4],
    pub sun_diffuse: [f32; 4],
    pub sun_specular: [f32; 4],
    pub shadow: [f32; 4],
}

impl FrameUniform {
    pub fn new(scene: &Scene, aspect: f32, rig: &LightRig<'_>) -> Self {
        let (view_proj, camera_pos) = match scene.camera() {
            Some(camera) => (camera.view_projection(aspect), camera.position()),
            None => (Mat4::IDENTITY, Vec3::ZERO),
        };

        let mut uniform = Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_view_proj: rig.light_view_proj().to_cols_array_2d(),
            camera_pos: vec4(camera_pos, 1.0),
            hemi_dir: [0.0, 1.0, 0.0, 0.0],
            hemi_sky: [0.0; 4],
            hemi_ground: [0.0; 4],
            sun_dir: [0.0, -1.0, 0.0, 0.0],
            sun_diffuse: [0.0; 4],
            sun_specular: [0.0; 4],
            shadow: [0.0; 4],
        };

        if let Some(ambient) = rig.ambient {
            uniform.hemi_dir = vec4(ambient.direction, ambient.intensity);
            uniform.hemi_sky = ambient.diffuse.extend(1.0);
            uniform.hemi_ground = ambient.ground_color.extend(1.0);
        }
        if let Some(sun) = rig.sun {
            uniform.sun_dir = vec4(sun.direction, sun.intensity);
            uniform.sun_diffuse = sun.diffuse.extend(1.0);
            uniform.sun_specular = sun.specular.extend(1.0);
        }
        if let Some(generator) = rig.shadow {
            let filter = match generator.filter {
                ShadowFilter::None => 0.0,
                ShadowFilter::Exponential | ShadowFilter::BlurExponential => 1.0,
            };
            uniform.shadow = [1.0, generator.depth_scale, generator.darkness, filter];
        }
        uniform
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MaterialUniform {
    pub diffuse: [f32; 4],
    pub emissive: [f32; 4],
    pub specular: [f32; 4],
    pub flags: [f32; 4],
}

impl MaterialUniform {
    pub fn new(material: &StandardMaterial, diffuse_texture: bool, bump_texture: bool) -> Self {
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        Self {
            diffuse: material.diffuse_color.extend(1.0),
            emissive: material.emissive_color.extend(1.0),
            specular: material
                .specular_color
                .extend(material.effective_specular_power()),
            flags: [
                flag(diffuse_texture),
                flag(bump_texture),
                flag(material.disable_lighting),
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub flags: [f32; 4],
}

impl ObjectUniform {
    pub fn new(mesh: &Mesh) -> Self {
        let receive = if mesh.receive_shadows { 1.0 } else { 0.0 };
        Self {
            model: mesh.transform.matrix().to_cols_array_2d(),
            flags: [receive, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ShadowPassUniform {
    pub light_view_proj: [[f32; 4]; 4],
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct BlurUniform {
    pub params: [f32; 4],
}

impl BlurUniform {
    pub fn horizontal(kernel: u32) -> Self {
        Self {
            params: [1.0, 0.0, kernel as f32, 0.0],
        }
    }

    pub fn vertical(kernel: u32) -> Self {
        Self {
            params: [0.0, 1.0, kernel as f32, 0.0],
        }
    }
}
