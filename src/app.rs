//! Window, event loop and per-frame driver.

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::camera::Camera;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::gpu::{GpuBackend, GpuContext, RenderUniforms, Renderer, SurfaceState};
use crate::input::{Action, Input};
use crate::math::Vec3;
use crate::mesh::make_sphere;
use crate::particles::spawn_particles;
use crate::pipeline::{ComputeBackend, Pipeline, SimulationContext};

const FPS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Opens the window and runs until it is closed.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct FpsCounter {
    frames: u32,
    since: Instant,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= FPS_LOG_INTERVAL {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            log::info!("{:.1} fps", self.fps);
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}

/// Everything that exists only once the window is up.
struct Running {
    window: Arc<Window>,
    surface: SurfaceState,
    pipeline: Pipeline<GpuBackend>,
    renderer: Renderer,
    #[cfg(feature = "egui")]
    overlay: crate::ui::Overlay,
}

struct App {
    config: AppConfig,
    ctx: SimulationContext,
    input: Input,
    mouse_look: bool,
    last_frame_failed: bool,
    fps: FpsCounter,
    running: Option<Running>,
    error: Option<AppError>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let ctx = SimulationContext::new(
            config.simulation,
            Camera::new(Vec3::from(config.camera_position)),
        );
        Self {
            config,
            ctx,
            input: Input::new(),
            mouse_look: false,
            last_frame_failed: false,
            fps: FpsCounter::new(),
            running: None,
            error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running, AppError> {
        let window_attrs = Window::default_attributes()
            .with_title("fluidbox")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let surface = pollster::block_on(GpuContext::for_window(window.clone()))?;
        let context = surface.context.clone();

        let particles = spawn_particles(
            self.config.particle_count,
            self.config.seed,
            self.config.spawn_extent,
        );
        let backend = GpuBackend::new(context.clone(), &particles)?;

        let mesh = make_sphere(
            self.config.sphere_radius,
            self.config.sphere_theta_segments,
            self.config.sphere_rho_segments,
        );
        let renderer = Renderer::new(&context.device, &surface.config, &mesh);

        log::info!(
            "started: {} particles, sphere mesh {} vertices, surface {}x{} {:?}",
            particles.len(),
            mesh.vertex_count(),
            surface.config.width,
            surface.config.height,
            surface.config.format
        );

        #[cfg(feature = "egui")]
        let overlay = crate::ui::Overlay::new(&context.device, surface.config.format, &window);

        Ok(Running {
            window,
            surface,
            pipeline: Pipeline::new(backend),
            renderer,
            #[cfg(feature = "egui")]
            overlay,
        })
    }

    fn set_mouse_look(&mut self, enabled: bool) {
        let Some(running) = &self.running else {
            return;
        };
        let window = &running.window;
        if enabled {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                log::warn!("could not grab cursor: {}", err);
            }
        } else if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("could not release cursor: {}", err);
        }
        window.set_cursor_visible(!enabled);
        self.mouse_look = enabled;
    }

    /// Applies held keys and mouse motion to the camera and config.
    fn apply_input(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.pressed(Action::Exit) {
            event_loop.exit();
        }
        if self.input.pressed(Action::ToggleMouseLook) {
            self.set_mouse_look(!self.mouse_look);
        }

        self.ctx.camera.translate_relative(self.input.movement_axes());
        if self.mouse_look {
            let delta = self.input.mouse_delta();
            self.ctx.camera.rotate(delta.x, delta.y);
        }

        for (axis, delta) in self.input.box_resize().into_iter().enumerate() {
            if delta != 0.0 {
                self.ctx.config.resize_box(axis, delta);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.apply_input(event_loop);

        let Some(running) = &mut self.running else {
            return;
        };

        #[cfg(feature = "egui")]
        let ui_output = {
            let stats = crate::ui::PanelStats {
                fps: self.fps.fps,
                particle_count: running.pipeline.backend().capacity(),
                frame_failed: self.last_frame_failed,
                mouse_look: self.mouse_look,
            };
            running
                .overlay
                .build(&running.window, &mut self.ctx.config, &stats)
        };

        let impulse = self.input.held(Action::Impulse);
        let report = running.pipeline.step_frame(&self.ctx, impulse);
        self.last_frame_failed = !report.is_complete();

        let uniforms = RenderUniforms {
            view_proj: self
                .ctx
                .camera
                .view_projection(running.surface.aspect())
                .to_cols_array_2d(),
            box_size: [
                self.ctx.config.bounding_box_size[0],
                self.ctx.config.bounding_box_size[1],
                self.ctx.config.bounding_box_size[2],
                0.0,
            ],
            target_density: self.ctx.config.target_density,
            sphere_radius: self.config.sphere_radius,
            _pad: [0.0; 2],
        };
        let context = running.surface.context.clone();
        running.renderer.update_uniforms(&context.queue, &uniforms);

        let output = match running.surface.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = (running.surface.config.width, running.surface.config.height);
                running.surface.resize(width, height);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
                return;
            }
            Err(err) => {
                log::warn!("skipping frame: {}", err);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let backend = running.pipeline.backend();
        running.renderer.draw(
            &mut encoder,
            &view,
            backend.current_buffer(),
            backend.capacity() as u32,
        );

        #[cfg(feature = "egui")]
        running.overlay.paint(
            &context.device,
            &context.queue,
            &mut encoder,
            &view,
            &ui_output,
            [running.surface.config.width, running.surface.config.height],
        );

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.input.begin_frame();
        self.fps.tick();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(err) => {
                log::error!("startup failed: {}", err);
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        if let Some(running) = &mut self.running {
            if running.overlay.consumes(&running.window, &event) {
                return;
            }
        }

        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(running) = &mut self.running {
                    if running.surface.resize(size.width, size.height) {
                        let device = running.surface.context.device.clone();
                        running.renderer.resize(&device, &running.surface.config);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                if self.mouse_look {
                    self.set_mouse_look(false);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(running) = &self.running {
                    running.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.mouse_look {
                self.input.handle_mouse_motion(dx, dy);
            }
        }
    }
}
