use glam::{Mat4, Vec3};
use serde::Serialize;

const MIN_BETA: f32 = 0.01;
const MAX_BETA: f32 = std::f32::consts::PI - 0.01;
const MIN_RADIUS: f32 = 1.0;

/// Orbit camera looking at a target point from spherical coordinates.
///
/// `alpha` is the longitudinal angle, `beta` the latitudinal one measured
/// from +Y, both in radians. The scene uses a left-handed, Y-up space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcRotateCamera {
    pub name: String,
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Identifier of the surface whose pointer input drives this camera.
    attached_to: Option<String>,
}

impl ArcRotateCamera {
    pub fn new(name: impl Into<String>, alpha: f32, beta: f32, radius: f32, target: Vec3) -> Self {
        let mut camera = Self {
            name: name.into(),
            alpha,
            beta,
            radius,
            target,
            fov: 0.8,
            near: 1.0,
            far: 10_000.0,
            attached_to: None,
        };
        camera.clamp();
        camera
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn position(&self) -> Vec3 {
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let (sin_b, cos_b) = self.beta.sin_cos();
        self.target + self.radius * Vec3::new(cos_a * sin_b, cos_b, sin_a * sin_b)
    }

    /// Bind pointer controls to the given surface.
    pub fn attach_control(&mut self, surface_id: impl Into<String>) {
        self.attached_to = Some(surface_id.into());
    }

    pub fn attached_surface(&self) -> Option<&str> {
        self.attached_to.as_deref()
    }

    pub fn controls_attached(&self) -> bool {
        self.attached_to.is_some()
    }

    /// Orbit by the given angle deltas, respecting latitude limits.
    pub fn rotate(&mut self, d_alpha: f32, d_beta: f32) {
        self.alpha += d_alpha;
        self.beta += d_beta;
        self.clamp();
    }

    /// Move towards (positive) or away from (negative) the target.
    pub fn zoom(&mut self, delta: f32) {
        self.radius -= delta;
        self.clamp();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov, aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn clamp(&mut self) {
        self.beta = self.beta.clamp(MIN_BETA, MAX_BETA);
        self.radius = self.radius.max(MIN_RADIUS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn position_from_spherical_coordinates() {
        let cam = ArcRotateCamera::new("camera", 0.0, std::f32::consts::FRAC_PI_2, 10.0, Vec3::ZERO);
        assert!(approx(cam.position(), Vec3::new(10.0, 0.0, 0.0)));

        let cam = ArcRotateCamera::new("camera", 1.0, 0.8, 10.0, Vec3::ZERO);
        assert!((cam.position().length() - 10.0).abs() < 1e-4);
        assert!(cam.position().y > 0.0);
    }

    #[test]
    fn position_follows_target() {
        let mut cam = ArcRotateCamera::new("camera", 1.0, 0.8, 10.0, Vec3::ZERO);
        let before = cam.position();
        cam.set_target(Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(cam.position(), before + Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn beta_and_radius_are_clamped() {
        let mut cam = ArcRotateCamera::new("camera", 1.0, 0.8, 10.0, Vec3::ZERO);
        cam.rotate(0.0, -10.0);
        assert!((cam.beta - MIN_BETA).abs() < 1e-6);
        cam.rotate(0.0, 20.0);
        assert!((cam.beta - MAX_BETA).abs() < 1e-6);
        cam.zoom(100.0);
        assert_eq!(cam.radius, MIN_RADIUS);
    }

    #[test]
    fn attach_controls() {
        let mut cam = ArcRotateCamera::new("camera", 1.0, 0.8, 10.0, Vec3::ZERO);
        assert!(!cam.controls_attached());
        cam.attach_control("renderCanvas");
        assert_eq!(cam.attached_surface(), Some("renderCanvas"));
        assert!(cam.controls_attached());
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = ArcRotateCamera::new("camera", 1.0, 0.8, 10.0, Vec3::ZERO);
        let clip = cam.view_projection(16.0 / 9.0) * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
