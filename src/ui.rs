//! Settings overlay drawn with egui.
//!
//! [`Overlay`] owns the egui context, its winit input state and the wgpu
//! painter; [`settings_panel`] is the window drawn into it every frame.

use std::sync::Arc;

use winit::event::WindowEvent;
use winit::window::Window;

use crate::config::{
    SimulationConfig, BOX_SIZE_RANGE, GRAVITY_RANGE, MASS_RANGE, PRESSURE_MULTIPLIER_RANGE,
    SMOOTHING_RADIUS_RANGE, TARGET_DENSITY_RANGE,
};

/// Read-only numbers shown under the sliders.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelStats {
    pub fps: f32,
    pub particle_count: usize,
    pub frame_failed: bool,
    pub mouse_look: bool,
}

/// Tessellated UI for one frame, ready to paint.
pub struct UiFrame {
    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
}

pub struct Overlay {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    painter: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: &Arc<Window>) -> Self {
        let ctx = egui::Context::default();
        ctx.set_visuals(egui::Visuals {
            window_shadow: egui::Shadow::NONE,
            ..egui::Visuals::dark()
        });

        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        // No depth attachment, single sample, no dithering.
        let painter = egui_wgpu::Renderer::new(device, format, None, 1, false);

        Self {
            ctx,
            winit_state,
            painter,
        }
    }

    /// True when the pointer or keyboard belongs to the overlay; the event
    /// must then not drive the camera or the key bindings.
    pub fn consumes(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Draws the settings panel, letting it edit `config` in place.
    pub fn build(
        &mut self,
        window: &Window,
        config: &mut SimulationConfig,
        stats: &PanelStats,
    ) -> UiFrame {
        let input = self.winit_state.take_egui_input(window);
        let output = self.ctx.run(input, |ctx| settings_panel(ctx, config, stats));
        self.winit_state
            .handle_platform_output(window, output.platform_output);

        UiFrame {
            primitives: self.ctx.tessellate(output.shapes, output.pixels_per_point),
            textures: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        }
    }

    /// Paints `frame` over whatever `target` already holds.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        frame: &UiFrame,
        size_in_pixels: [u32; 2],
    ) {
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: frame.pixels_per_point,
        };

        for (id, delta) in &frame.textures.set {
            self.painter.update_texture(device, queue, *id, delta);
        }
        self.painter
            .update_buffers(device, queue, encoder, &frame.primitives, &screen);

        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.painter
            .render(&mut pass.forget_lifetime(), &frame.primitives, &screen);

        for id in &frame.textures.free {
            self.painter.free_texture(id);
        }
    }
}

pub fn settings_panel(ctx: &egui::Context, config: &mut SimulationConfig, stats: &PanelStats) {
    egui::Window::new("Fluid")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.add(egui::Slider::new(&mut config.mass, MASS_RANGE).text("mass"));
            ui.add(
                egui::Slider::new(&mut config.smoothing_radius, SMOOTHING_RADIUS_RANGE)
                    .text("smoothing radius"),
            );
            ui.add(
                egui::Slider::new(&mut config.target_density, TARGET_DENSITY_RANGE)
                    .text("target density"),
            );
            ui.add(
                egui::Slider::new(&mut config.pressure_multiplier, PRESSURE_MULTIPLIER_RANGE)
                    .logarithmic(true)
                    .text("pressure multiplier"),
            );
            ui.add(egui::Slider::new(&mut config.gravity, GRAVITY_RANGE).text("gravity"));

            ui.separator();
            for (axis, size) in ["box x", "box y", "box z"]
                .into_iter()
                .zip(config.bounding_box_size.iter_mut())
            {
                ui.add(egui::Slider::new(size, BOX_SIZE_RANGE).text(axis));
            }

            ui.separator();
            ui.label(format!("{} particles, {:.0} fps", stats.particle_count, stats.fps));
            if stats.frame_failed {
                ui.colored_label(egui::Color32::LIGHT_RED, "last frame failed, see log");
            }
            ui.label(if stats.mouse_look {
                "mouse look on (H to release)"
            } else {
                "H: mouse look, WASD/QE: move, T: push"
            });
        });
}
