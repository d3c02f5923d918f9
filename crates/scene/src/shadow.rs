use serde::Serialize;
use tableau_common::EntityId;

/// Index of a shadow generator within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShadowGeneratorId(pub u32);

/// How the shadow map is filtered when shading receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ShadowFilter {
    /// Hard depth comparison.
    #[default]
    None,
    /// Exponential shadow map.
    Exponential,
    /// Exponential shadow map smoothed by a separable blur.
    BlurExponential,
}

/// Renders shadows cast by registered meshes from one directional light.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowGenerator {
    pub light: EntityId,
    /// Width and height of the square shadow map in texels.
    pub map_size: u32,
    pub filter: ShadowFilter,
    /// Half width of the blur kernel in texels.
    pub blur_kernel: u32,
    /// Exponent scale for exponential filters.
    pub depth_scale: f32,
    /// 0 keeps shadowed areas fully dark, 1 removes shadows.
    pub darkness: f32,
    casters: Vec<EntityId>,
}

impl ShadowGenerator {
    pub fn new(map_size: u32, light: EntityId) -> Self {
        Self {
            light,
            map_size: map_size.max(1),
            filter: ShadowFilter::None,
            blur_kernel: 2,
            depth_scale: 50.0,
            darkness: 0.0,
            casters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: ShadowFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn casters(&self) -> &[EntityId] {
        &self.casters
    }

    pub fn is_caster(&self, mesh: EntityId) -> bool {
        self.casters.contains(&mesh)
    }

    /// Registering the same mesh twice is a no-op.
    pub(crate) fn add_caster(&mut self, mesh: EntityId) {
        if !self.casters.contains(&mesh) {
            self.casters.push(mesh);
        }
    }
}
