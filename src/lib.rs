//! # fluidbox
//!
//! Interactive smoothed-particle-hydrodynamics fluid in a resizable box.
//!
//! A fixed population of particles lives in two device buffers. Every frame
//! runs two compute stages, density estimation and then pressure force
//! integration with box containment, swapping the buffer roles after each.
//! The renderer draws one sphere instance per particle straight from the
//! `current` buffer.
//!
//! ## Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`math`] | vectors and the row-major [`Mat4`](math::Mat4) |
//! | [`mesh`] | procedural sphere |
//! | [`particles`] | [`Particle`] and the double-buffered [`ParticleStore`] |
//! | [`camera`] | free-fly [`Camera`] |
//! | [`sph`] | smoothing kernels and per-particle stage units |
//! | [`pipeline`] | stage planning, barriers, [`ComputeBackend`] |
//! | [`cpu`], [`gpu`] | rayon and wgpu backends |
//! | [`config`] | [`SimulationConfig`], [`AppConfig`] |
//!
//! ## Headless use
//!
//! ```
//! use fluidbox::{CpuBackend, Pipeline, SimulationContext, spawn_particles};
//!
//! let mut pipeline = Pipeline::new(CpuBackend::new(spawn_particles(64, 1, 4.0)));
//! let ctx = SimulationContext::default();
//! for _ in 0..10 {
//!     assert!(pipeline.step_frame(&ctx, false).is_complete());
//! }
//! ```

pub mod app;
pub mod camera;
pub mod config;
pub mod cpu;
pub mod error;
pub mod gpu;
pub mod input;
pub mod logging;
pub mod math;
pub mod mesh;
pub mod particles;
pub mod pipeline;
pub mod sph;
#[cfg(feature = "egui")]
pub mod ui;

pub use bytemuck;
pub use camera::Camera;
pub use config::{AppConfig, SimulationConfig};
pub use cpu::CpuBackend;
pub use error::{AppError, ConfigError, DispatchError, GpuError, KernelCompileError};
pub use gpu::{GpuBackend, GpuContext};
pub use math::{Mat4, Vec2, Vec3, Vec4};
pub use mesh::{make_sphere, Mesh, MeshVertex};
pub use particles::{spawn_particles, Particle, ParticleStore, Role, Slot};
pub use pipeline::{
    ComputeBackend, FramePlan, FrameReport, Pipeline, SimulationContext, Stage, Step,
};
pub use sph::StageParams;
