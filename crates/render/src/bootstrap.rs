use crate::builder::SceneBuilder;
use crate::clock::format_fps;
use crate::demo::{DemoIds, build_demo_scene};
use crate::engine::{RenderEngine, RenderError};
use crate::host::{Surface, TextTarget};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tableau_input::CameraAction;
use tableau_scene::{Scene, SceneSummary};

/// Lifecycle of a bootstrapper's render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Stopped,
}

/// Shared switch for a render loop. Clones control the same loop.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the loop; later ticks do nothing.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            tracing::info!("render loop stopped");
        }
    }

    fn start(&self) {
        self.running.store(true, Ordering::Release);
    }
}

/// Owns an engine and the demo scene, and drives the per-frame loop.
///
/// The host delivers refresh ticks with [`tick`](Self::tick) and viewport
/// changes with [`handle_resize`](Self::handle_resize).
pub struct SceneBootstrapper<B: SceneBuilder, T: TextTarget> {
    builder: B,
    surface: B::Surface,
    engine: B::Engine,
    fps_display: T,
    scene: Option<(Scene, DemoIds)>,
    handle: LoopHandle,
}

impl<B: SceneBuilder, T: TextTarget> SceneBootstrapper<B, T> {
    /// Create the engine for `surface`, build the scene, and start the loop.
    pub fn new(mut builder: B, surface: B::Surface, fps_display: T) -> Result<Self, RenderError> {
        let engine = builder.create_engine(&surface)?;
        tracing::info!(
            "engine bound to surface '{}', fps target '{}'",
            surface.id(),
            fps_display.id()
        );

        let mut boot = Self {
            builder,
            surface,
            engine,
            fps_display,
            scene: None,
            handle: LoopHandle::default(),
        };
        boot.initialize()?;
        boot.start();
        Ok(boot)
    }

    /// Build a fresh demo scene, replacing the current one if any.
    ///
    /// The resize subscription is live from the first successful call.
    pub fn initialize(&mut self) -> Result<(), RenderError> {
        let demo = build_demo_scene(&mut self.builder, &self.engine, self.surface.id())?;
        tracing::debug!("scene built: {}", SceneSummary::of(&demo.scene));
        if self.scene.replace((demo.scene, demo.ids)).is_some() {
            tracing::debug!("previous scene replaced");
        }
        Ok(())
    }

    /// Start (or restart) the render loop. A no-op before initialization.
    pub fn start(&mut self) {
        if self.scene.is_none() || self.handle.is_running() {
            return;
        }
        self.handle.start();
        tracing::info!("render loop started");
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> LoopState {
        match (&self.scene, self.handle.is_running()) {
            (None, _) => LoopState::Uninitialized,
            (Some(_), true) => LoopState::Running,
            (Some(_), false) => LoopState::Stopped,
        }
    }

    /// One refresh tick: render, publish the FPS of that frame, present.
    ///
    /// Returns `Ok(false)` without touching the engine when the loop is not
    /// running.
    pub fn tick(&mut self) -> Result<bool, RenderError> {
        if !self.handle.is_running() {
            return Ok(false);
        }
        let Some((scene, _)) = &self.scene else {
            return Err(RenderError::Uninitialized);
        };

        self.engine.render(scene)?;
        self.fps_display.set_text(&format_fps(self.engine.fps()));
        self.engine.present()?;
        Ok(true)
    }

    /// Viewport changed: have the engine recompute its output size once.
    pub fn handle_resize(&mut self) {
        if self.scene.is_none() {
            return;
        }
        self.engine.resize();
        let size = self.surface.size();
        tracing::debug!("resized to {}x{}", size.width, size.height);
    }

    /// Apply a camera control action if the camera has controls attached.
    pub fn control_camera(&mut self, action: CameraAction) -> bool {
        self.scene
            .as_mut()
            .and_then(|(scene, _)| scene.camera_mut())
            .is_some_and(|camera| action.apply(camera))
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref().map(|(s, _)| s)
    }

    pub fn ids(&self) -> Option<&DemoIds> {
        self.scene.as_ref().map(|(_, ids)| ids)
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn surface(&self) -> &B::Surface {
        &self.surface
    }

    pub fn engine(&self) -> &B::Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut B::Engine {
        &mut self.engine
    }

    pub fn fps_display(&self) -> &T {
        &self.fps_display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildRequest, GraphBuilder};
    use crate::debug::DebugTextEngine;
    use crate::host::{BufferedText, HeadlessSurface, SurfaceSize};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use tableau_assets::AssetRoot;

    type CallLog = Rc<RefCell<Vec<String>>>;

    /// Engine that logs each call and reports the number of frames rendered
    /// so far as its rate.
    struct LoggingEngine {
        log: CallLog,
        frames: u32,
    }

    impl RenderEngine for LoggingEngine {
        fn resize(&mut self) {
            self.log.borrow_mut().push("resize".into());
        }

        fn render(&mut self, _scene: &Scene) -> Result<(), RenderError> {
            self.frames += 1;
            self.log.borrow_mut().push(format!("render {}", self.frames));
            Ok(())
        }

        fn fps(&self) -> f32 {
            self.frames as f32
        }

        fn present(&mut self) -> Result<(), RenderError> {
            self.log.borrow_mut().push("present".into());
            Ok(())
        }
    }

    struct LoggingBuilder {
        log: CallLog,
    }

    impl SceneBuilder for LoggingBuilder {
        type Surface = HeadlessSurface;
        type Engine = LoggingEngine;

        fn create_engine(&mut self, _surface: &HeadlessSurface) -> Result<LoggingEngine, RenderError> {
            Ok(LoggingEngine {
                log: self.log.clone(),
                frames: 0,
            })
        }
    }

    struct LoggingText {
        log: CallLog,
    }

    impl TextTarget for LoggingText {
        fn id(&self) -> &str {
            "ui"
        }

        fn set_text(&mut self, text: &str) {
            self.log.borrow_mut().push(format!("text {text}"));
        }
    }

    type Boot = SceneBootstrapper<GraphBuilder, BufferedText>;

    fn boot() -> Boot {
        SceneBootstrapper::new(
            GraphBuilder::new(),
            HeadlessSurface::default(),
            BufferedText::new("ui"),
        )
        .unwrap()
    }

    fn run_at(rate: f64) -> String {
        let mut boot = boot();
        boot.engine_mut()
            .set_fixed_frame_time(Duration::from_secs_f64(1.0 / rate));
        for _ in 0..5 {
            assert!(boot.tick().unwrap());
        }
        boot.fps_display().text().to_string()
    }

    #[test]
    fn construction_initializes_and_starts() {
        let boot = boot();
        assert_eq!(boot.state(), LoopState::Running);
        let summary = SceneSummary::of(boot.scene().unwrap());
        assert_eq!(summary.cameras, 1);
        assert_eq!(summary.lights(), 2);
        assert_eq!(summary.meshes, 5);
        assert_eq!(summary.lines, 1);
        assert_eq!(
            boot.builder().requests().first(),
            Some(&BuildRequest::Engine {
                surface: "renderCanvas".into()
            })
        );
    }

    #[test]
    fn fps_text_rounds_up() {
        assert_eq!(run_at(59.6), "60 fps");
    }

    #[test]
    fn fps_text_rounds_down() {
        assert_eq!(run_at(59.4), "59 fps");
    }

    #[test]
    fn tick_renders_then_writes_then_presents() {
        let mut boot = boot();
        boot.engine_mut()
            .set_fixed_frame_time(Duration::from_millis(20));
        assert!(boot.tick().unwrap());
        assert!(boot.tick().unwrap());

        let engine: &DebugTextEngine = boot.engine();
        assert_eq!(engine.frames(), 2);
        assert_eq!(engine.presents(), 2);
        assert_eq!(boot.fps_display().writes(), 2);
        assert_eq!(boot.fps_display().text(), "50 fps");
        assert!(engine.output().contains("=== Frame 2"));
    }

    #[test]
    fn fps_text_is_written_between_render_and_present() {
        let log = CallLog::default();
        let mut boot = SceneBootstrapper::new(
            LoggingBuilder { log: log.clone() },
            HeadlessSurface::default(),
            LoggingText { log: log.clone() },
        )
        .unwrap();
        assert!(log.borrow().is_empty());

        assert!(boot.tick().unwrap());
        assert!(boot.tick().unwrap());
        assert_eq!(
            *log.borrow(),
            [
                "render 1",
                "text 1 fps",
                "present",
                "render 2",
                "text 2 fps",
                "present"
            ]
        );
    }

    #[test]
    fn first_frame_shows_initial_rate() {
        let mut boot = boot();
        assert!(boot.tick().unwrap());
        assert_eq!(boot.fps_display().text(), "60 fps");
    }

    #[test]
    fn each_resize_notification_resizes_once() {
        let mut boot = boot();
        boot.surface().set_size(SurfaceSize::new(800, 600));
        boot.handle_resize();
        assert_eq!(boot.engine().resizes(), 1);
        assert_eq!(boot.engine().size(), SurfaceSize::new(800, 600));

        boot.handle_resize();
        boot.handle_resize();
        assert_eq!(boot.engine().resizes(), 3);
    }

    #[test]
    fn stopped_loop_does_not_render() {
        let mut boot = boot();
        let handle = boot.handle();
        assert!(boot.tick().unwrap());

        handle.stop();
        assert_eq!(boot.state(), LoopState::Stopped);
        assert!(!boot.tick().unwrap());
        assert_eq!(boot.engine().frames(), 1);
        assert_eq!(boot.fps_display().writes(), 1);

        boot.start();
        assert_eq!(boot.state(), LoopState::Running);
        assert!(boot.tick().unwrap());
        assert_eq!(boot.engine().frames(), 2);
    }

    #[test]
    fn reinitialize_builds_a_fresh_scene() {
        let mut boot = boot();
        let first_camera = boot.scene().unwrap().camera_id();
        let first_sphere = boot.ids().unwrap().sphere;

        boot.initialize().unwrap();
        boot.initialize().unwrap();

        let scene = boot.scene().unwrap();
        assert_ne!(scene.camera_id(), first_camera);
        assert!(scene.mesh(first_sphere).is_none());
        let summary = SceneSummary::of(scene);
        assert_eq!(summary.cameras, 1);
        assert_eq!(summary.meshes, 5);
        assert_eq!(summary.lights(), 2);
        assert_eq!(
            boot.builder()
                .count(|r| matches!(r, BuildRequest::Scene)),
            3
        );
        assert_eq!(
            boot.builder()
                .count(|r| matches!(r, BuildRequest::Engine { .. })),
            1
        );
    }

    #[test]
    fn camera_controls_move_the_camera() {
        let mut boot = boot();
        let before = boot.scene().unwrap().camera().unwrap().radius;
        assert!(boot.control_camera(CameraAction::Zoom(2.0)));
        let after = boot.scene().unwrap().camera().unwrap().radius;
        assert!((before - after - 2.0).abs() < 1e-6);
    }

    #[test]
    fn missing_textures_fail_construction() {
        let dir = tempfile::tempdir().unwrap();
        let result = SceneBootstrapper::new(
            GraphBuilder::with_assets(AssetRoot::new(dir.path())),
            HeadlessSurface::default(),
            BufferedText::new("ui"),
        );
        assert!(matches!(result, Err(RenderError::Asset(_))));
    }

    #[test]
    fn present_textures_are_decoded() {
        let dir = tempfile::tempdir().unwrap();
        for (rel, format) in [
            ("assets/textures/diffuse/sand.jpg", image::ImageFormat::Jpeg),
            ("assets/textures/normals/sand.png", image::ImageFormat::Png),
        ] {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            image::RgbImage::from_pixel(4, 4, image::Rgb([194, 178, 128]))
                .save_with_format(&path, format)
                .unwrap();
        }

        let boot = SceneBootstrapper::new(
            GraphBuilder::with_assets(AssetRoot::new(dir.path())),
            HeadlessSurface::default(),
            BufferedText::new("ui"),
        )
        .unwrap();
        let scene = boot.scene().unwrap();
        assert!(scene.textures().iter().all(|t| t.is_loaded()));
    }
}
