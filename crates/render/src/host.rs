use std::cell::Cell;
use std::rc::Rc;

/// Identifier of the drawing surface the demo renders into.
pub const DEFAULT_SURFACE_ID: &str = "renderCanvas";
/// Identifier of the text element that shows the frame rate.
pub const DEFAULT_FPS_TARGET_ID: &str = "ui";

/// Pixel dimensions of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; a zero height counts as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Both dimensions raised to at least one pixel.
    pub fn non_zero(&self) -> Self {
        Self::new(self.width.max(1), self.height.max(1))
    }
}

/// Host-owned drawing target an engine presents into.
pub trait Surface {
    fn id(&self) -> &str;
    /// Current size. Engines re-read this when asked to resize.
    fn size(&self) -> SurfaceSize;
}

/// Host-owned text element.
pub trait TextTarget {
    fn id(&self) -> &str;
    fn set_text(&mut self, text: &str);
}

/// Surface without a window. Clones share the size so a host can "resize"
/// it after handing a clone to an engine.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    id: String,
    size: Rc<Cell<SurfaceSize>>,
}

impl HeadlessSurface {
    pub fn new(id: impl Into<String>, size: SurfaceSize) -> Self {
        Self {
            id: id.into(),
            size: Rc::new(Cell::new(size)),
        }
    }

    pub fn set_size(&self, size: SurfaceSize) {
        self.size.set(size);
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_ID, SurfaceSize::new(1280, 720))
    }
}

impl Surface for HeadlessSurface {
    fn id(&self) -> &str {
        &self.id
    }

    fn size(&self) -> SurfaceSize {
        self.size.get()
    }
}

/// Text target that keeps the latest text in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedText {
    id: String,
    text: String,
    writes: usize,
}

impl BufferedText {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of `set_text` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl TextTarget for BufferedText {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_aspect() {
        assert_eq!(SurfaceSize::new(1280, 720).aspect(), 1280.0 / 720.0);
        assert_eq!(SurfaceSize::new(10, 0).aspect(), 10.0);
        assert_eq!(SurfaceSize::new(0, 0).non_zero(), SurfaceSize::new(1, 1));
    }

    #[test]
    fn headless_surface_clones_share_size() {
        let surface = HeadlessSurface::default();
        let clone = surface.clone();
        surface.set_size(SurfaceSize::new(800, 600));
        assert_eq!(clone.size(), SurfaceSize::new(800, 600));
        assert_eq!(clone.id(), DEFAULT_SURFACE_ID);
    }

    #[test]
    fn buffered_text_overwrites() {
        let mut text = BufferedText::new(DEFAULT_FPS_TARGET_ID);
        text.set_text("59 fps");
        text.set_text("60 fps");
        assert_eq!(text.text(), "60 fps");
        assert_eq!(text.writes(), 2);
        assert_eq!(text.id(), "ui");
    }
}
