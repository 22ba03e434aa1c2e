//! wgpu compute backend.
//!
//! Both particle buffers live on the device. Each stage binds `current` at
//! binding 0 (read-only storage), `next` at binding 1 and the
//! [`StageParams`] uniform at binding 2. The two possible bindings are
//! prebuilt as bind groups (A to B, B to A) and the role bit picks one.
//!
//! Every dispatch is its own queue submission wrapped in a validation error
//! scope, so a failing stage is reported before anything swaps.

use std::sync::mpsc;

use wgpu::util::DeviceExt;

use super::{kernel_source, GpuContext};
use crate::error::{DispatchError, GpuError, KernelCompileError};
use crate::particles::{Particle, ParticleStore, Slot};
use crate::pipeline::{ComputeBackend, Stage};
use crate::sph::StageParams;

pub const WORKGROUP_SIZE: u32 = 64;

/// A successfully compiled stage pipeline. Only constructible through
/// compilation, so holding one means the stage can be dispatched.
pub struct ComputeKernel {
    stage: Stage,
    pipeline: wgpu::ComputePipeline,
}

impl ComputeKernel {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn compile(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        stage: Stage,
        source: &str,
    ) -> Result<Self, KernelCompileError> {
        let label = format!("{} kernel", stage);
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&label),
            layout: Some(layout),
            module: &module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(KernelCompileError {
                stage,
                message: err.to_string(),
            });
        }
        Ok(Self { stage, pipeline })
    }
}

pub struct GpuBackend {
    context: GpuContext,
    store: ParticleStore<wgpu::Buffer>,
    params_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    bind_group_a_to_b: wgpu::BindGroup,
    bind_group_b_to_a: wgpu::BindGroup,
    density: Result<ComputeKernel, KernelCompileError>,
    force: Result<ComputeKernel, KernelCompileError>,
}

impl GpuBackend {
    /// Uploads `particles` into both buffers and compiles the stage kernels.
    ///
    /// A kernel that fails to compile is logged and kept as an error; the
    /// backend is still created, but dispatching that stage fails.
    pub fn new(context: GpuContext, particles: &[Particle]) -> Result<Self, GpuError> {
        let density = kernel_source(Stage::Density).unwrap_or_default();
        let force = kernel_source(Stage::Force).unwrap_or_default();
        Self::with_kernel_sources(context, particles, &density, &force)
    }

    /// Like [`GpuBackend::new`] with explicit WGSL for the two stages.
    pub fn with_kernel_sources(
        context: GpuContext,
        particles: &[Particle],
        density_source: &str,
        force_source: &str,
    ) -> Result<Self, GpuError> {
        if particles.is_empty() {
            return Err(GpuError::BufferMapping("cannot create empty particle buffers".into()));
        }
        let device = &context.device;
        let usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::VERTEX
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST;

        let buffer_a = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Buffer A"),
            contents: bytemuck::cast_slice(particles),
            usage,
        });
        let buffer_b = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Buffer B"),
            contents: bytemuck::cast_slice(particles),
            usage,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Staging Buffer"),
            size: std::mem::size_of_val(particles) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Stage Params Buffer"),
            size: std::mem::size_of::<StageParams>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let storage_entry = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SPH Stage Bind Group Layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let make_bind_group = |label, current: &wgpu::Buffer, next: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: current.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: next.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let bind_group_a_to_b = make_bind_group("SPH Bind Group A->B", &buffer_a, &buffer_b);
        let bind_group_b_to_a = make_bind_group("SPH Bind Group B->A", &buffer_b, &buffer_a);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("SPH Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let compile = |stage, source| {
            let kernel = ComputeKernel::compile(device, &pipeline_layout, stage, source);
            if let Err(err) = &kernel {
                log::error!("{}", err);
            }
            kernel
        };
        let density = compile(Stage::Density, density_source);
        let force = compile(Stage::Force, force_source);

        log::info!("GPU backend ready: {} particles", particles.len());

        let store = ParticleStore::from_buffers(buffer_a, buffer_b, particles.len());
        Ok(Self {
            context,
            store,
            params_buffer,
            staging_buffer,
            bind_group_a_to_b,
            bind_group_b_to_a,
            density,
            force,
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// Device buffer holding the last complete state; the renderer draws it.
    pub fn current_buffer(&self) -> &wgpu::Buffer {
        self.store.current()
    }

    /// Compilation result for a stage.
    pub fn kernel(&self, stage: Stage) -> Option<&Result<ComputeKernel, KernelCompileError>> {
        match stage {
            Stage::Density => Some(&self.density),
            Stage::Force => Some(&self.force),
            Stage::Impulse => None,
        }
    }

    fn byte_len(&self) -> wgpu::BufferAddress {
        (self.store.capacity() * std::mem::size_of::<Particle>()) as wgpu::BufferAddress
    }
}

impl ComputeBackend for GpuBackend {
    fn capacity(&self) -> usize {
        self.store.capacity()
    }

    fn current_slot(&self) -> Slot {
        self.store.current_slot()
    }

    fn swap_count(&self) -> u64 {
        self.store.swap_count()
    }

    fn swap(&mut self) {
        self.store.swap();
    }

    fn dispatch(&mut self, stage: Stage, params: &StageParams) -> Result<(), DispatchError> {
        let kernel = match self.kernel(stage) {
            Some(kernel) => kernel,
            None => return Err(DispatchError::HostStage(stage)),
        };
        let kernel = kernel
            .as_ref()
            .map_err(|err| DispatchError::KernelUnavailable(stage, err.message.clone()))?;

        let bind_group = match self.store.current_slot() {
            Slot::A => &self.bind_group_a_to_b,
            Slot::B => &self.bind_group_b_to_a,
        };

        let device = &self.context.device;
        let queue = &self.context.queue;
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("SPH Stage Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("SPH Stage Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&kernel.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(params.particle_count.div_ceil(WORKGROUP_SIZE), 1, 1);
        }
        queue.submit(std::iter::once(encoder.finish()));

        match pollster::block_on(device.pop_error_scope()) {
            Some(err) => Err(DispatchError::Execution(stage, err.to_string())),
            None => Ok(()),
        }
    }

    fn barrier(&mut self) {
        let _ = self.context.device.poll(wgpu::Maintain::Wait);
    }

    fn readback(&mut self) -> Result<Vec<Particle>, DispatchError> {
        let device = &self.context.device;
        let size = self.byte_len();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Particle Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(self.store.current(), 0, &self.staging_buffer, 0, size);
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging_buffer.slice(..size);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(DispatchError::Readback(err.to_string())),
            Err(err) => return Err(DispatchError::Readback(err.to_string())),
        }

        let particles = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, Particle>(&data).to_vec()
        };
        self.staging_buffer.unmap();
        Ok(particles)
    }

    fn writeback(&mut self, particles: &[Particle]) -> Result<(), DispatchError> {
        if particles.len() != self.store.capacity() {
            return Err(DispatchError::CapacityMismatch {
                expected: self.store.capacity(),
                actual: particles.len(),
            });
        }
        let queue = &self.context.queue;
        queue.write_buffer(self.store.next(), 0, bytemuck::cast_slice(particles));
        queue.submit(std::iter::empty());
        Ok(())
    }
}
