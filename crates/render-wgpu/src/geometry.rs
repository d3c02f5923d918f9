use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use tableau_scene::Shape;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3, uv: [f32; 2], tangent: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
            tangent: tangent.to_array(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    LineStrip,
}

/// CPU-side tessellation of a [`Shape`].
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    /// Empty for line strips, which draw vertices in order.
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl MeshData {
    pub fn from_shape(shape: &Shape) -> Self {
        match shape {
            Shape::Sphere { segments, diameter } => sphere(*segments, *diameter),
            Shape::Ground {
                width,
                height,
                subdivisions,
            } => ground(*width, *height, *subdivisions),
            Shape::Box { size } => cube(*size),
            Shape::Cylinder {
                height,
                diameter_top,
                diameter_bottom,
                tessellation,
                subdivisions,
            } => cylinder(
                *height,
                *diameter_top,
                *diameter_bottom,
                *tessellation,
                *subdivisions,
            ),
            Shape::Lines { points } => lines(points),
        }
    }

    /// Number of elements a draw call covers.
    pub fn element_count(&self) -> u32 {
        match self.topology {
            Topology::Triangles => self.indices.len() as u32,
            Topology::LineStrip => self.vertices.len() as u32,
        }
    }
}

/// Push the two triangles of a grid quad whose top-left corner is `a`.
fn push_quad(indices: &mut Vec<u32>, a: u32, row_stride: u32) {
    let b = a + row_stride;
    indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
}

/// UV sphere with `segments + 2` rings and twice as many sectors.
fn sphere(segments: u32, diameter: f32) -> MeshData {
    let rings = segments.max(1) + 2;
    let sectors = rings * 2;
    let radius = diameter * 0.5;

    let mut vertices = Vec::with_capacity(((rings + 1) * (sectors + 1)) as usize);
    for i in 0..=rings {
        let v = i as f32 / rings as f32;
        let (sin_t, cos_t) = (v * PI).sin_cos();
        for j in 0..=sectors {
            let u = j as f32 / sectors as f32;
            let (sin_p, cos_p) = (u * TAU).sin_cos();
            let normal = Vec3::new(sin_t * cos_p, cos_t, sin_t * sin_p);
            let tangent = Vec3::new(-sin_p, 0.0, cos_p);
            vertices.push(Vertex::new(normal * radius, normal, [u, v], tangent));
        }
    }

    let mut indices = Vec::with_capacity((rings * sectors * 6) as usize);
    for i in 0..rings {
        for j in 0..sectors {
            push_quad(&mut indices, i * (sectors + 1) + j, sectors + 1);
        }
    }

    MeshData {
        vertices,
        indices,
        topology: Topology::Triangles,
    }
}

/// Plane on XZ facing +Y, centred at the origin.
fn ground(width: f32, height: f32, subdivisions: u32) -> MeshData {
    let sub = subdivisions.max(1);
    let mut vertices = Vec::with_capacity(((sub + 1) * (sub + 1)) as usize);
    for row in 0..=sub {
        let v = row as f32 / sub as f32;
        let z = (0.5 - v) * height;
        for col in 0..=sub {
            let u = col as f32 / sub as f32;
            let x = (u - 0.5) * width;
            vertices.push(Vertex::new(Vec3::new(x, 0.0, z), Vec3::Y, [u, v], Vec3::X));
        }
    }

    let mut indices = Vec::with_capacity((sub * sub * 6) as usize);
    for row in 0..sub {
        for col in 0..sub {
            push_quad(&mut indices, row * (sub + 1) + col, sub + 1);
        }
    }

    MeshData {
        vertices,
        indices,
        topology: Topology::Triangles,
    }
}

/// Axis-aligned cube with four vertices per face.
fn cube(size: f32) -> MeshData {
    let p = size * 0.5;
    // (normal, tangent) per face; bitangent = normal x tangent.
    let faces = [
        (Vec3::Z, Vec3::X),
        (Vec3::NEG_Z, Vec3::NEG_X),
        (Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_X, Vec3::Z),
        (Vec3::Y, Vec3::X),
        (Vec3::NEG_Y, Vec3::X),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, tangent) in faces {
        let bitangent = normal.cross(tangent);
        let base = vertices.len() as u32;
        for (s, t) in corners {
            let position = (normal + tangent * s + bitangent * t) * p;
            let uv = [(s + 1.0) * 0.5, 1.0 - (t + 1.0) * 0.5];
            vertices.push(Vertex::new(position, normal, uv, tangent));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    MeshData {
        vertices,
        indices,
        topology: Topology::Triangles,
    }
}

/// Capped cylinder (or cone frustum) along Y, centred at the origin.
fn cylinder(
    height: f32,
    diameter_top: f32,
    diameter_bottom: f32,
    tessellation: u32,
    subdivisions: u32,
) -> MeshData {
    let tess = tessellation.max(3);
    let sub = subdivisions.max(1);
    let (r_top, r_bottom) = (diameter_top * 0.5, diameter_bottom * 0.5);
    let slope = (r_bottom - r_top) / height.max(f32::EPSILON);

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for i in 0..=sub {
        let v = i as f32 / sub as f32;
        let y = (v - 0.5) * height;
        let radius = r_bottom + (r_top - r_bottom) * v;
        for j in 0..=tess {
            let u = j as f32 / tess as f32;
            let (sin_a, cos_a) = (u * TAU).sin_cos();
            let normal = Vec3::new(cos_a, slope, sin_a).normalize();
            let position = Vec3::new(cos_a * radius, y, sin_a * radius);
            let tangent = Vec3::new(-sin_a, 0.0, cos_a);
            vertices.push(Vertex::new(position, normal, [u, 1.0 - v], tangent));
        }
    }
    for i in 0..sub {
        for j in 0..tess {
            push_quad(&mut indices, i * (tess + 1) + j, tess + 1);
        }
    }

    for (y, radius, normal) in [
        (height * 0.5, r_top, Vec3::Y),
        (-height * 0.5, r_bottom, Vec3::NEG_Y),
    ] {
        let center = vertices.len() as u32;
        vertices.push(Vertex::new(Vec3::new(0.0, y, 0.0), normal, [0.5, 0.5], Vec3::X));
        for j in 0..=tess {
            let (sin_a, cos_a) = (j as f32 / tess as f32 * TAU).sin_cos();
            let position = Vec3::new(cos_a * radius, y, sin_a * radius);
            let uv = [0.5 + cos_a * 0.5, 0.5 + sin_a * 0.5];
            vertices.push(Vertex::new(position, normal, uv, Vec3::X));
        }
        for j in 0..tess {
            indices.extend_from_slice(&[center, center + 1 + j, center + 2 + j]);
        }
    }

    MeshData {
        vertices,
        indices,
        topology: Topology::Triangles,
    }
}

fn lines(points: &[Vec3]) -> MeshData {
    let vertices = points
        .iter()
        .map(|p| Vertex::new(*p, Vec3::ZERO, [0.0, 0.0], Vec3::ZERO))
        .collect();
    MeshData {
        vertices,
        indices: Vec::new(),
        topology: Topology::LineStrip,
    }
}
