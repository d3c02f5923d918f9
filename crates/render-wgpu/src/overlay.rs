use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tableau_render::TextTarget;
use winit::event::WindowEvent;
use winit::window::Window;

/// Text element drawn over the scene. Clones share the text, so the host
/// can hand one to the bootstrapper and another to the engine.
#[derive(Debug, Clone, Default)]
pub struct OverlayText {
    id: String,
    text: Rc<RefCell<String>>,
}

impl OverlayText {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Rc::default(),
        }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }
}

impl TextTarget for OverlayText {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_text(&mut self, text: &str) {
        let mut current = self.text.borrow_mut();
        current.clear();
        current.push_str(text);
    }
}

/// egui painter for an [`OverlayText`] in the top-left corner.
pub(crate) struct FpsOverlay {
    text: OverlayText,
    window: Arc<Window>,
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl FpsOverlay {
    pub fn new(
        text: OverlayText,
        window: Arc<Window>,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);
        Self {
            text,
            window,
            ctx,
            state,
            renderer,
        }
    }

    /// Feed a window event to egui. Scale factor and focus changes arrive
    /// this way.
    pub fn on_window_event(&mut self, event: &WindowEvent) {
        let _ = self.state.on_window_event(&self.window, event);
    }

    /// Paint the current text onto `view`, loading what is already there.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) {
        let mut raw_input = self.state.take_egui_input(&self.window);
        set_scale_factor(&mut raw_input, self.window.scale_factor());
        let id = egui::Id::new(self.text.id());
        let label = self.text.text();
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Area::new(id)
                .fixed_pos(egui::pos2(8.0, 8.0))
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(&label)
                            .monospace()
                            .color(egui::Color32::WHITE),
                    );
                });
        });
        self.state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("overlay_encoder"),
        });
        self.renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

/// Pin the frame's pixels-per-point to the window's current scale factor.
fn set_scale_factor(raw_input: &mut egui::RawInput, scale_factor: f64) {
    raw_input
        .viewports
        .entry(raw_input.viewport_id)
        .or_default()
        .native_pixels_per_point = Some(scale_factor as f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_factor_drives_pixels_per_point() {
        let ctx = egui::Context::default();
        let mut raw_input = egui::RawInput::default();
        set_scale_factor(&mut raw_input, 2.0);
        let output = ctx.run(raw_input, |_| {});
        assert_eq!(output.pixels_per_point, 2.0);

        let mut raw_input = egui::RawInput::default();
        set_scale_factor(&mut raw_input, 1.5);
        let output = ctx.run(raw_input, |_| {});
        assert_eq!(output.pixels_per_point, 1.5);
    }

    #[test]
    fn clones_share_text() {
        let mut writer = OverlayText::new("ui");
        let reader = writer.clone();
        writer.set_text("60 fps");
        assert_eq!(reader.text(), "60 fps");
        assert_eq!(reader.id(), "ui");

        writer.set_text("59 fps");
        assert_eq!(reader.text(), "59 fps");
    }
}
