use std::sync::Arc;
use tableau_render::{Surface, SurfaceSize};
use winit::window::Window;

/// A winit window used as the drawing surface.
#[derive(Debug, Clone)]
pub struct WindowSurface {
    id: String,
    window: Arc<Window>,
}

impl WindowSurface {
    pub fn new(id: impl Into<String>, window: Arc<Window>) -> Self {
        Self {
            id: id.into(),
            window,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Surface for WindowSurface {
    fn id(&self) -> &str {
        &self.id
    }

    fn size(&self) -> SurfaceSize {
        let size = self.window.inner_size();
        SurfaceSize::new(size.width, size.height)
    }
}
