use crate::clock::FrameClock;
use crate::engine::{RenderEngine, RenderError};
use crate::host::{HeadlessSurface, Surface, SurfaceSize};
use std::fmt::Write;
use std::time::{Duration, Instant};
use tableau_scene::{Light, Scene, SceneSummary};

/// Headless engine whose frames are human-readable text dumps.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug)]
pub struct DebugTextEngine {
    surface: HeadlessSurface,
    size: SurfaceSize,
    clock: FrameClock,
    fixed_frame_time: Option<Duration>,
    frames: u64,
    resizes: u64,
    presents: u64,
    output: String,
}

impl DebugTextEngine {
    pub fn new(surface: HeadlessSurface) -> Self {
        let size = surface.size().non_zero();
        Self {
            surface,
            size,
            clock: FrameClock::new(),
            fixed_frame_time: None,
            frames: 0,
            resizes: 0,
            presents: 0,
            output: String::new(),
        }
    }

    /// Pretend every frame takes `frame` instead of measuring wall time.
    pub fn set_fixed_frame_time(&mut self, frame: Duration) {
        self.fixed_frame_time = Some(frame);
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    pub fn presents(&self) -> u64 {
        self.presents
    }

    /// Mean frame time over the clock window.
    pub fn frame_time_ms(&self) -> f64 {
        self.clock.frame_time_ms()
    }

    /// Text of the last rendered frame.
    pub fn output(&self) -> &str {
        &self.output
    }

    fn dump(&mut self, scene: &Scene) -> std::fmt::Result {
        let out = &mut self.output;
        out.clear();
        writeln!(
            out,
            "=== Frame {} ({}x{}) ===",
            self.frames, self.size.width, self.size.height
        )?;
        writeln!(out, "{}", SceneSummary::of(scene))?;

        let c = scene.clear_color();
        writeln!(out, "Clear: ({:.2}, {:.2}, {:.2})", c.r, c.g, c.b)?;

        if let Some(cam) = scene.camera() {
            let p = cam.position();
            writeln!(
                out,
                "Camera: {} eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) aspect={:.2}",
                cam.name,
                p.x,
                p.y,
                p.z,
                cam.target.x,
                cam.target.y,
                cam.target.z,
                self.size.aspect()
            )?;
        }

        for (id, light) in scene.lights() {
            let kind = match light {
                Light::Hemispheric(_) => "hemispheric",
                Light::Directional(_) => "directional",
            };
            writeln!(
                out,
                "  light [{}] {} {kind} intensity={:.2}",
                id.short(),
                light.name(),
                light.intensity()
            )?;
        }

        for (id, mesh) in scene.meshes() {
            let p = mesh.transform.position;
            let mut flags = String::new();
            if scene.is_shadow_caster(*id) {
                flags.push_str(" caster");
            }
            if mesh.receive_shadows {
                flags.push_str(" receiver");
            }
            writeln!(
                out,
                "  mesh [{}] {} {} pos=({:.2}, {:.2}, {:.2}){flags}",
                id.short(),
                mesh.name,
                mesh.shape.kind(),
                p.x,
                p.y,
                p.z
            )?;
        }
        Ok(())
    }
}

impl RenderEngine for DebugTextEngine {
    fn resize(&mut self) {
        self.size = self.surface.size().non_zero();
        self.resizes += 1;
    }

    fn render(&mut self, scene: &Scene) -> Result<(), RenderError> {
        match self.fixed_frame_time {
            Some(frame) => self.clock.record(frame),
            None => self.clock.tick(Instant::now()),
        }
        self.frames += 1;
        self.dump(scene)
            .map_err(|e| RenderError::Frame(e.to_string()))
    }

    fn fps(&self) -> f32 {
        self.clock.fps()
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.presents += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tableau_scene::{ArcRotateCamera, HemisphericLight, Mesh, Shape};

    #[test]
    fn empty_scene_frame() {
        let mut engine = DebugTextEngine::new(HeadlessSurface::default());
        engine.render(&Scene::new()).unwrap();

        assert_eq!(engine.frames(), 1);
        assert!(engine.output().contains("=== Frame 1 (1280x720) ==="));
        assert!(engine.output().contains("meshes=0"));
    }

    #[test]
    fn frame_lists_entities() {
        let mut scene = Scene::new();
        scene.set_camera(ArcRotateCamera::new("camera", 1.0, 0.8, 10.0, Vec3::ZERO));
        scene.add_light(HemisphericLight::new("light1", Vec3::Y).with_intensity(0.2));
        scene
            .add_mesh(Mesh::new("Box", Shape::cube(1.0)).with_position(Vec3::new(7.0, 2.0, -5.0)))
            .unwrap();

        let mut engine = DebugTextEngine::new(HeadlessSurface::default());
        engine.render(&scene).unwrap();
        let out = engine.output();
        assert!(out.contains("Camera: camera"));
        assert!(out.contains("light1 hemispheric intensity=0.20"));
        assert!(out.contains("Box box pos=(7.00, 2.00, -5.00)"));
    }

    #[test]
    fn resize_rereads_surface() {
        let surface = HeadlessSurface::default();
        let mut engine = DebugTextEngine::new(surface.clone());
        surface.set_size(SurfaceSize::new(640, 0));
        engine.resize();
        assert_eq!(engine.size(), SurfaceSize::new(640, 1));
        assert_eq!(engine.resizes(), 1);
    }

    #[test]
    fn fixed_frame_time_drives_fps() {
        let mut engine = DebugTextEngine::new(HeadlessSurface::default());
        engine.set_fixed_frame_time(Duration::from_millis(25));
        engine.render(&Scene::new()).unwrap();
        assert!((engine.fps() - 40.0).abs() < 1e-3);
        assert!((engine.frame_time_ms() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn first_wall_clock_frame_reports_initial_rate() {
        let mut engine = DebugTextEngine::new(HeadlessSurface::default());
        engine.render(&Scene::new()).unwrap();
        assert_eq!(engine.fps(), FrameClock::INITIAL_FPS);
    }
}
