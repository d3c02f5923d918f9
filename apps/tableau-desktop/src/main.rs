use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tableau_assets::AssetRoot;
use tableau_input::{PointerButton, PointerControls};
use tableau_render::{DEFAULT_FPS_TARGET_ID, DEFAULT_SURFACE_ID, SceneBootstrapper};
use tableau_render_wgpu::{OverlayText, WgpuSceneBuilder, WindowSurface};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Wheel pixels that count as one line on touchpads.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Parser)]
#[command(name = "tableau-desktop", about = "Render the tableau demo scene in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory the scene's texture paths are resolved against
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Initial window width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "720")]
    height: u32,
}

type Bootstrapper = SceneBootstrapper<WgpuSceneBuilder, OverlayText>;

struct DesktopApp {
    assets: AssetRoot,
    size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    boot: Option<Bootstrapper>,
    controls: PointerControls,
    failure: Option<anyhow::Error>,
}

impl DesktopApp {
    fn new(cli: &Cli) -> Self {
        Self {
            assets: AssetRoot::new(&cli.assets),
            size: PhysicalSize::new(cli.width, cli.height),
            window: None,
            boot: None,
            controls: PointerControls::new(),
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Tableau")
            .with_inner_size(self.size);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let surface = WindowSurface::new(DEFAULT_SURFACE_ID, window.clone());
        let fps_text = OverlayText::new(DEFAULT_FPS_TARGET_ID);
        let builder = WgpuSceneBuilder::new(self.assets.clone()).with_overlay(fps_text.clone());
        let boot = SceneBootstrapper::new(builder, surface, fps_text)?;

        window.request_redraw();
        self.window = Some(window);
        self.boot = Some(boot);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        if let Some(boot) = &self.boot {
            boot.stop();
        }
        self.failure = Some(err);
        event_loop.exit();
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.boot.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err.context("failed to start the scene"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(boot) = &mut self.boot else {
            return;
        };
        boot.engine_mut().handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                boot.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                boot.handle_resize();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = pointer_button(button) else {
                    return;
                };
                match state {
                    ElementState::Pressed => self.controls.pointer_down(button),
                    ElementState::Released => self.controls.pointer_up(button),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self.controls.pointer_moved(position.x, position.y);
                boot.control_camera(action);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                boot.control_camera(self.controls.wheel(lines));
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = boot.tick() {
                    tracing::error!("frame failed: {e}");
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let running = self.boot.as_ref().is_some_and(|b| b.handle().is_running());
        if let (true, Some(window)) = (running, &self.window) {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tableau-desktop starting (assets: {})", cli.assets.display());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(&cli);
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
