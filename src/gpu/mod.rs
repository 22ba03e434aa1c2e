//! wgpu device bootstrap, compute backend and renderer.

mod compute;
mod render;

use std::sync::Arc;

use winit::window::Window;

pub use compute::{ComputeKernel, GpuBackend, WORKGROUP_SIZE};
pub use render::{RenderUniforms, Renderer, DEPTH_FORMAT};

use crate::error::GpuError;
use crate::pipeline::Stage;

/// Declarations shared by the compute kernels: the particle and parameter
/// structs, the three bindings, and the smoothing kernels.
pub const SPH_COMMON_WGSL: &str = include_str!("shaders/sph_common.wgsl");
pub const DENSITY_WGSL: &str = include_str!("shaders/density.wgsl");
pub const FORCE_WGSL: &str = include_str!("shaders/force.wgsl");
/// Instanced sphere and floor shaders.
pub const RENDER_WGSL: &str = include_str!("shaders/render.wgsl");

/// Full WGSL source for a device stage, `None` for host stages.
pub fn kernel_source(stage: Stage) -> Option<String> {
    let body = match stage {
        Stage::Density => DENSITY_WGSL,
        Stage::Force => FORCE_WGSL,
        Stage::Impulse => return None,
    };
    Some(format!("{}\n{}", SPH_COMMON_WGSL, body))
}

/// Device and queue shared by the compute backend and the renderer.
#[derive(Clone)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub adapter_info: wgpu::AdapterInfo,
}

/// A window surface plus the context created for it.
pub struct SurfaceState {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub context: GpuContext,
}

fn instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    })
}

async fn request_context(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
) -> Result<(GpuContext, wgpu::Adapter), GpuError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(GpuError::NoAdapter)?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await?;

    let adapter_info = adapter.get_info();
    log::info!(
        "using adapter {} ({:?}, {:?})",
        adapter_info.name,
        adapter_info.device_type,
        adapter_info.backend
    );

    let context = GpuContext {
        device: Arc::new(device),
        queue: Arc::new(queue),
        adapter_info,
    };
    Ok((context, adapter))
}

impl GpuContext {
    /// Context without a surface, for compute-only use.
    pub async fn headless() -> Result<Self, GpuError> {
        let instance = instance();
        let (context, _adapter) = request_context(&instance, None).await?;
        Ok(context)
    }

    /// Context plus a configured surface for `window`.
    pub async fn for_window(window: Arc<Window>) -> Result<SurfaceState, GpuError> {
        let size = window.inner_size();
        let instance = instance();
        let surface = instance.create_surface(window)?;
        let (context, adapter) = request_context(&instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&context.device, &config);

        Ok(SurfaceState {
            surface,
            config,
            context,
        })
    }
}

impl SurfaceState {
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.context.device, &self.config);
        true
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}
