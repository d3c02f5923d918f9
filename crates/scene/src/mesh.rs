use crate::material::MaterialId;
use glam::Vec3;
use serde::Serialize;
use tableau_common::Transform;

/// Geometric description of a mesh. Tessellation is left to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    Sphere {
        segments: u32,
        diameter: f32,
    },
    /// Flat plane on XZ centred at the origin.
    Ground {
        width: f32,
        height: f32,
        subdivisions: u32,
    },
    Box {
        size: f32,
    },
    Cylinder {
        height: f32,
        diameter_top: f32,
        diameter_bottom: f32,
        tessellation: u32,
        subdivisions: u32,
    },
    /// Open polyline through the given local-space points.
    Lines {
        points: Vec<Vec3>,
    },
}

impl Shape {
    pub fn sphere(segments: u32, diameter: f32) -> Self {
        Shape::Sphere { segments, diameter }
    }

    pub fn ground(width: f32, height: f32, subdivisions: u32) -> Self {
        Shape::Ground {
            width,
            height,
            subdivisions,
        }
    }

    pub fn cube(size: f32) -> Self {
        Shape::Box { size }
    }

    pub fn cylinder(height: f32, diameter_top: f32, diameter_bottom: f32, subdivisions: u32) -> Self {
        Shape::Cylinder {
            height,
            diameter_top,
            diameter_bottom,
            tessellation: 24,
            subdivisions,
        }
    }

    pub fn lines(points: Vec<Vec3>) -> Self {
        Shape::Lines { points }
    }

    pub fn is_lines(&self) -> bool {
        matches!(self, Shape::Lines { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Sphere { .. } => "sphere",
            Shape::Ground { .. } => "ground",
            Shape::Box { .. } => "box",
            Shape::Cylinder { .. } => "cylinder",
            Shape::Lines { .. } => "lines",
        }
    }
}

/// A renderable entity: shape, placement, and surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    pub name: String,
    pub shape: Shape,
    pub transform: Transform,
    /// `None` renders with the backend's default material.
    pub material: Option<MaterialId>,
    pub receive_shadows: bool,
}

impl Mesh {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            transform: Transform::default(),
            material: None,
            receive_shadows: false,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn receiving_shadows(mut self) -> Self {
        self.receive_shadows = true;
        self
    }
}
