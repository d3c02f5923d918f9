use crate::context::GpuContext;
use crate::geometry::{MeshData, Topology, Vertex};
use crate::overlay::{FpsOverlay, OverlayText};
use crate::shaders;
use crate::surface::WindowSurface;
use crate::uniforms::{
    BlurUniform, FrameUniform, LightRig, MaterialUniform, ObjectUniform, ShadowPassUniform,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tableau_assets::ImageData;
use tableau_common::EntityId;
use tableau_render::{FrameClock, RenderEngine, RenderError, Surface, SurfaceSize};
use tableau_scene::{
    Mesh, MaterialId, Scene, Shape, ShadowFilter, ShadowGenerator, StandardMaterial, TextureId,
};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;
const WHITE: [u8; 4] = [255, 255, 255, 255];
const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
    3 => Float32x3,
];
const POSITION_ATTRIBUTE: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

fn vertex_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, value: &T) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

fn render_target(
    device: &wgpu::Device,
    label: &str,
    size: SurfaceSize,
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

struct Layouts {
    frame: wgpu::BindGroupLayout,
    material: wgpu::BindGroupLayout,
    object: wgpu::BindGroupLayout,
    shadow_pass: wgpu::BindGroupLayout,
    blur: wgpu::BindGroupLayout,
}

impl Layouts {
    fn new(device: &wgpu::Device) -> Self {
        let layout = |label: &str, entries: &[wgpu::BindGroupLayoutEntry]| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
        };
        Self {
            frame: layout("frame_layout", &[uniform_entry(0), texture_entry(1, false)]),
            material: layout(
                "material_layout",
                &[
                    uniform_entry(0),
                    texture_entry(1, true),
                    texture_entry(2, true),
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            ),
            object: layout("object_layout", &[uniform_entry(0)]),
            shadow_pass: layout("shadow_pass_layout", &[uniform_entry(0)]),
            blur: layout("blur_layout", &[texture_entry(0, false), uniform_entry(1)]),
        }
    }
}

struct Pipelines {
    triangles: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
    shadow: wgpu::RenderPipeline,
    blur: wgpu::RenderPipeline,
}

impl Pipelines {
    fn new(device: &wgpu::Device, layouts: &Layouts, surface_format: wgpu::TextureFormat) -> Self {
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });
        let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blur_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLUR_SHADER.into()),
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&layouts.frame, &layouts.material, &layouts.object],
            push_constant_ranges: &[],
        });
        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_pipeline_layout"),
            bind_group_layouts: &[&layouts.shadow_pass, &layouts.object],
            push_constant_ranges: &[],
        });
        let blur_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blur_pipeline_layout"),
            bind_group_layouts: &[&layouts.blur],
            push_constant_ranges: &[],
        });

        let depth_state = || {
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            })
        };

        let scene_pipeline = |label: &str, fs: &str, topology: wgpu::PrimitiveTopology| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&scene_layout),
                vertex: wgpu::VertexState {
                    module: &scene_shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout(&VERTEX_ATTRIBUTES)],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &scene_shader,
                    entry_point: Some(fs),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: depth_state(),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let triangles = scene_pipeline(
            "triangle_pipeline",
            "fs_main",
            wgpu::PrimitiveTopology::TriangleList,
        );
        let lines = scene_pipeline("line_pipeline", "fs_line", wgpu::PrimitiveTopology::LineStrip);

        let shadow = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&shadow_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout(&POSITION_ATTRIBUTE)],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shadow_shader,
                entry_point: Some("fs_shadow"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: SHADOW_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: depth_state(),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let blur = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blur_pipeline"),
            layout: Some(&blur_layout),
            vertex: wgpu::VertexState {
                module: &blur_shader,
                entry_point: Some("vs_fullscreen"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blur_shader,
                entry_point: Some("fs_blur"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: SHADOW_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: Default::default(),
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self {
            triangles,
            lines,
            shadow,
            blur,
        }
    }
}

/// Ping-pong exponential shadow maps. The result always ends up in
/// `targets[0]`.
struct ShadowMaps {
    size: u32,
    targets: [wgpu::TextureView; 2],
    depth: wgpu::TextureView,
    blur_buffers: [wgpu::Buffer; 2],
    blur_bind_groups: [wgpu::BindGroup; 2],
}

impl ShadowMaps {
    fn new(device: &wgpu::Device, layouts: &Layouts, size: u32) -> Self {
        let extent = SurfaceSize::new(size, size);
        let targets = [
            render_target(device, "shadow_map_a", extent, SHADOW_FORMAT),
            render_target(device, "shadow_map_b", extent, SHADOW_FORMAT),
        ];
        let depth = render_target(device, "shadow_depth", extent, DEPTH_FORMAT);
        let blur_buffers = [
            uniform_buffer(device, "blur_h", &BlurUniform::horizontal(0)),
            uniform_buffer(device, "blur_v", &BlurUniform::vertical(0)),
        ];
        let blur_bind_group = |source: &wgpu::TextureView, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("blur_bind_group"),
                layout: &layouts.blur,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let blur_bind_groups = [
            blur_bind_group(&targets[0], &blur_buffers[0]),
            blur_bind_group(&targets[1], &blur_buffers[1]),
        ];
        Self {
            size,
            targets,
            depth,
            blur_buffers,
            blur_bind_groups,
        }
    }
}

struct GpuTexture {
    source: Arc<ImageData>,
    view: wgpu::TextureView,
}

impl GpuTexture {
    fn upload(device: &wgpu::Device, queue: &wgpu::Queue, pixels: &Arc<ImageData>, srgb: bool) -> Self {
        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("scene_texture"),
                size: wgpu::Extent3d {
                    width: pixels.width,
                    height: pixels.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &pixels.rgba,
        );
        Self {
            source: pixels.clone(),
            view: texture.create_view(&Default::default()),
        }
    }
}

fn same_pixels(a: Option<&Arc<ImageData>>, b: Option<&Arc<ImageData>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

struct GpuMaterial {
    material: StandardMaterial,
    diffuse: Option<Arc<ImageData>>,
    bump: Option<Arc<ImageData>>,
    bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    fn is_current(
        &self,
        material: &StandardMaterial,
        diffuse: Option<&Arc<ImageData>>,
        bump: Option<&Arc<ImageData>>,
    ) -> bool {
        self.material == *material
            && same_pixels(self.diffuse.as_ref(), diffuse)
            && same_pixels(self.bump.as_ref(), bump)
    }
}

struct GpuMesh {
    shape: Shape,
    vertices: wgpu::Buffer,
    indices: Option<wgpu::Buffer>,
    count: u32,
    topology: Topology,
    object: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, layouts: &Layouts, mesh: &Mesh) -> Self {
        let data = MeshData::from_shape(&mesh.shape);
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertices"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = (!data.indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        let object = uniform_buffer(device, "object_uniform", &ObjectUniform::new(mesh));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object.as_entire_binding(),
            }],
        });
        Self {
            shape: mesh.shape.clone(),
            vertices,
            indices,
            count: data.element_count(),
            topology: data.topology,
            object,
            bind_group,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        match &self.indices {
            Some(indices) => {
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.count, 0, 0..1);
            }
            None => pass.draw(0..self.count, 0..1),
        }
    }
}

struct PendingFrame {
    frame: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// [`RenderEngine`] drawing into a winit window with wgpu.
///
/// GPU buffers are caches over the scene: meshes are keyed by entity id and
/// re-tessellated when their shape changes, materials and textures are
/// rebuilt when their description or decoded pixels change.
pub struct WgpuEngine {
    surface: WindowSurface,
    gpu: GpuContext,
    layouts: Layouts,
    pipelines: Pipelines,
    sampler: wgpu::Sampler,
    depth: wgpu::TextureView,
    frame_uniform: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    shadow_pass_uniform: wgpu::Buffer,
    shadow_pass_bind_group: wgpu::BindGroup,
    shadow_maps: ShadowMaps,
    white: GpuTexture,
    flat_normal: GpuTexture,
    default_material: GpuMaterial,
    meshes: HashMap<EntityId, GpuMesh>,
    materials: HashMap<MaterialId, GpuMaterial>,
    textures: HashMap<(TextureId, bool), GpuTexture>,
    overlay: Option<FpsOverlay>,
    clock: FrameClock,
    pending: Option<PendingFrame>,
}

impl WgpuEngine {
    pub fn new(surface: WindowSurface, overlay: Option<OverlayText>) -> Result<Self, RenderError> {
        let gpu = GpuContext::new(surface.window().clone(), surface.size())?;
        let device = &gpu.device;

        let layouts = Layouts::new(device);
        let pipelines = Pipelines::new(device, &layouts, gpu.format());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let depth = render_target(device, "depth_texture", gpu.size(), DEPTH_FORMAT);

        let empty = Scene::new();
        let frame_uniform = uniform_buffer(
            device,
            "frame_uniform",
            &FrameUniform::new(&empty, 1.0, &LightRig::default()),
        );
        let shadow_maps = ShadowMaps::new(device, &layouts, 1);
        let frame_bind_group = Self::frame_bind_group(device, &layouts, &frame_uniform, &shadow_maps);

        let shadow_pass_uniform = uniform_buffer(
            device,
            "shadow_pass_uniform",
            &ShadowPassUniform {
                light_view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                params: [0.0; 4],
            },
        );
        let shadow_pass_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_pass_bind_group"),
            layout: &layouts.shadow_pass,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_pass_uniform.as_entire_binding(),
            }],
        });

        let white = GpuTexture::upload(device, &gpu.queue, &Arc::new(ImageData::solid(WHITE)), true);
        let flat_normal = GpuTexture::upload(
            device,
            &gpu.queue,
            &Arc::new(ImageData::solid(FLAT_NORMAL)),
            false,
        );
        let default_material = Self::material_bind_group(
            device,
            &layouts,
            &sampler,
            &StandardMaterial::new("default"),
            (None, &white.view),
            (None, &flat_normal.view),
        );

        let overlay = overlay
            .map(|text| FpsOverlay::new(text, surface.window().clone(), device, gpu.format()));

        let size = gpu.size();
        tracing::info!(
            "wgpu engine ready on '{}' ({}x{}, {:?})",
            surface.id(),
            size.width,
            size.height,
            gpu.format()
        );

        Ok(Self {
            surface,
            gpu,
            layouts,
            pipelines,
            sampler,
            depth,
            frame_uniform,
            frame_bind_group,
            shadow_pass_uniform,
            shadow_pass_bind_group,
            shadow_maps,
            white,
            flat_normal,
            default_material,
            meshes: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            overlay,
            clock: FrameClock::new(),
            pending: None,
        })
    }

    pub fn size(&self) -> SurfaceSize {
        self.gpu.size()
    }

    /// Forward a window event to the overlay, if there is one.
    pub fn handle_window_event(&mut self, event: &winit::event::WindowEvent) {
        if let Some(overlay) = &mut self.overlay {
            overlay.on_window_event(event);
        }
    }

    fn frame_bind_group(
        device: &wgpu::Device,
        layouts: &Layouts,
        uniform: &wgpu::Buffer,
        shadow_maps: &ShadowMaps,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &layouts.frame,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_maps.targets[0]),
                },
            ],
        })
    }

    fn material_bind_group(
        device: &wgpu::Device,
        layouts: &Layouts,
        sampler: &wgpu::Sampler,
        material: &StandardMaterial,
        diffuse: (Option<&Arc<ImageData>>, &wgpu::TextureView),
        bump: (Option<&Arc<ImageData>>, &wgpu::TextureView),
    ) -> GpuMaterial {
        let uniform = uniform_buffer(
            device,
            "material_uniform",
            &MaterialUniform::new(material, diffuse.0.is_some(), bump.0.is_some()),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material_bind_group"),
            layout: &layouts.material,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(diffuse.1),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(bump.1),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        GpuMaterial {
            material: material.clone(),
            diffuse: diffuse.0.cloned(),
            bump: bump.0.cloned(),
            bind_group,
        }
    }

    fn sync_meshes(&mut self, scene: &Scene) {
        self.meshes.retain(|id, _| scene.mesh(*id).is_some());
        for (id, mesh) in scene.meshes() {
            let stale = self.meshes.get(id).is_none_or(|gpu| gpu.shape != mesh.shape);
            if stale {
                tracing::debug!("uploading mesh '{}' ({})", mesh.name, mesh.shape.kind());
                let gpu = GpuMesh::upload(&self.gpu.device, &self.layouts, mesh);
                self.meshes.insert(*id, gpu);
            } else if let Some(gpu) = self.meshes.get(id) {
                self.gpu
                    .queue
                    .write_buffer(&gpu.object, 0, bytemuck::bytes_of(&ObjectUniform::new(mesh)));
            }
        }
    }

    fn sync_materials(&mut self, scene: &Scene) {
        let loaded = move |id: Option<TextureId>| {
            let id = id?;
            scene.texture(id)?.pixels.as_ref().map(|pixels| (id, pixels))
        };

        self.textures.retain(|(id, _), gpu| {
            scene
                .texture(*id)
                .and_then(|t| t.pixels.as_ref())
                .is_some_and(|pixels| Arc::ptr_eq(pixels, &gpu.source))
        });
        self.materials
            .retain(|id, _| (id.0 as usize) < scene.materials().len());

        for (index, material) in scene.materials().iter().enumerate() {
            let id = MaterialId(index as u32);
            let diffuse = loaded(material.diffuse_texture);
            let bump = loaded(material.bump_texture);

            for (texture, srgb) in [(diffuse, true), (bump, false)] {
                if let Some((texture, pixels)) = texture {
                    self.textures.entry((texture, srgb)).or_insert_with(|| {
                        GpuTexture::upload(&self.gpu.device, &self.gpu.queue, pixels, srgb)
                    });
                }
            }

            let current = self.materials.get(&id).is_some_and(|gpu| {
                gpu.is_current(material, diffuse.map(|d| d.1), bump.map(|b| b.1))
            });
            if current {
                continue;
            }

            let textures = &self.textures;
            let view = |id: Option<TextureId>, srgb: bool| {
                id.and_then(|id| textures.get(&(id, srgb))).map(|t| &t.view)
            };
            let diffuse_view = view(diffuse.map(|d| d.0), true).unwrap_or(&self.white.view);
            let bump_view = view(bump.map(|b| b.0), false).unwrap_or(&self.flat_normal.view);
            let gpu = Self::material_bind_group(
                &self.gpu.device,
                &self.layouts,
                &self.sampler,
                material,
                (diffuse.map(|d| d.1), diffuse_view),
                (bump.map(|b| b.1), bump_view),
            );
            tracing::debug!("built material '{}'", material.name);
            self.materials.insert(id, gpu);
        }
    }

    fn ensure_shadow_maps(&mut self, size: u32) {
        if self.shadow_maps.size == size {
            return;
        }
        tracing::debug!("allocating {size}x{size} shadow maps");
        self.shadow_maps = ShadowMaps::new(&self.gpu.device, &self.layouts, size);
        self.frame_bind_group = Self::frame_bind_group(
            &self.gpu.device,
            &self.layouts,
            &self.frame_uniform,
            &self.shadow_maps,
        );
    }

    fn encode_shadow_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        generator: &ShadowGenerator,
        light_view_proj: glam::Mat4,
    ) {
        let queue = &self.gpu.queue;
        queue.write_buffer(
            &self.shadow_pass_uniform,
            0,
            bytemuck::bytes_of(&ShadowPassUniform {
                light_view_proj: light_view_proj.to_cols_array_2d(),
                params: [generator.depth_scale, 0.0, 0.0, 0.0],
            }),
        );

        // Empty texels read as "at the far plane".
        let far = f64::from(generator.depth_scale).exp();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.shadow_maps.targets[0],
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: far,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_maps.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.pipelines.shadow);
            pass.set_bind_group(0, &self.shadow_pass_bind_group, &[]);
            for caster in generator.casters() {
                let Some(mesh) = self.meshes.get(caster) else {
                    continue;
                };
                if mesh.topology != Topology::Triangles || mesh.count == 0 {
                    continue;
                }
                pass.set_bind_group(1, &mesh.bind_group, &[]);
                mesh.draw(&mut pass);
            }
        }

        if generator.filter != ShadowFilter::BlurExponential || generator.blur_kernel == 0 {
            return;
        }
        let maps = &self.shadow_maps;
        queue.write_buffer(
            &maps.blur_buffers[0],
            0,
            bytemuck::bytes_of(&BlurUniform::horizontal(generator.blur_kernel)),
        );
        queue.write_buffer(
            &maps.blur_buffers[1],
            0,
            bytemuck::bytes_of(&BlurUniform::vertical(generator.blur_kernel)),
        );
        // Horizontal A -> B, then vertical B -> A.
        for (bind_group, target) in [
            (&maps.blur_bind_groups[0], &maps.targets[1]),
            (&maps.blur_bind_groups[1], &maps.targets[0]),
        ] {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_blur_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_pipeline(&self.pipelines.blur);
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }

    fn encode_scene_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        view: &wgpu::TextureView,
    ) {
        let clear = scene.clear_color();
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(clear.r),
                        g: f64::from(clear.g),
                        b: f64::from(clear.b),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        if scene.camera().is_none() {
            return;
        }
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for (id, mesh) in scene.meshes() {
            let Some(gpu) = self.meshes.get(id) else {
                continue;
            };
            if gpu.count == 0 {
                continue;
            }
            let material = mesh
                .material
                .and_then(|m| self.materials.get(&m))
                .unwrap_or(&self.default_material);
            pass.set_pipeline(match gpu.topology {
                Topology::Triangles => &self.pipelines.triangles,
                Topology::LineStrip => &self.pipelines.lines,
            });
            pass.set_bind_group(1, &material.bind_group, &[]);
            pass.set_bind_group(2, &gpu.bind_group, &[]);
            gpu.draw(&mut pass);
        }
    }
}

impl RenderEngine for WgpuEngine {
    fn resize(&mut self) {
        // A surface cannot be reconfigured while a frame is outstanding.
        self.pending = None;
        self.gpu.resize(self.surface.size());
        let size = self.gpu.size();
        self.depth = render_target(&self.gpu.device, "depth_texture", size, DEPTH_FORMAT);
        tracing::debug!("surface resized to {}x{}", size.width, size.height);
    }

    fn render(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.clock.tick(Instant::now());
        if self.pending.take().is_some() {
            tracing::debug!("dropping a frame that was never presented");
        }

        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("timed out acquiring a frame");
                return Ok(());
            }
            Err(e) => return Err(RenderError::Frame(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sync_meshes(scene);
        self.sync_materials(scene);

        let rig = LightRig::of(scene);
        if let Some(generator) = rig.shadow {
            self.ensure_shadow_maps(generator.map_size);
        }
        let uniform = FrameUniform::new(scene, self.gpu.size().aspect(), &rig);
        self.gpu
            .queue
            .write_buffer(&self.frame_uniform, 0, bytemuck::bytes_of(&uniform));

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        if let Some(generator) = rig.shadow {
            self.encode_shadow_pass(&mut encoder, generator, rig.light_view_proj());
        }
        self.encode_scene_pass(&mut encoder, scene, &view);
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        self.pending = Some(PendingFrame { frame, view });
        Ok(())
    }

    fn fps(&self) -> f32 {
        self.clock.fps()
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        if let Some(overlay) = &mut self.overlay {
            let size = pending.frame.texture.size();
            overlay.paint(
                &self.gpu.device,
                &self.gpu.queue,
                &pending.view,
                [size.width, size.height],
            );
        }
        pending.frame.present();
        Ok(())
    }
}
