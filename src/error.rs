//! Error types for fluidbox.
//!
//! Startup failures ([`GpuError`], [`ConfigError`]) are fatal and propagate to
//! `main`. Per-frame failures ([`DispatchError`]) abandon the frame and leave
//! the last valid particle state in place.

use thiserror::Error;

use crate::pipeline::Stage;

/// Errors that can occur while acquiring or using GPU resources.
#[derive(Error, Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a Vulkan/Metal/DX12/WebGPU capable device is required")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// Failed to map buffer for reading.
    #[error("failed to map GPU buffer: {0}")]
    BufferMapping(String),
    /// The surface reports no usable configuration for the adapter.
    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,
}

/// A compute kernel failed to compile into a pipeline.
#[derive(Error, Debug, Clone)]
#[error("failed to compile {stage:?} kernel: {message}")]
pub struct KernelCompileError {
    pub stage: Stage,
    pub message: String,
}

/// A stage could not be run or its data could not be transferred.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    /// The stage's kernel failed to compile at startup.
    #[error("{0:?} kernel is unavailable: {1}")]
    KernelUnavailable(Stage, String),
    /// The backend reported an error while executing the stage.
    #[error("{0:?} dispatch failed: {1}")]
    Execution(Stage, String),
    /// Reading `current` back to the host failed.
    #[error("readback failed: {0}")]
    Readback(String),
    /// Uploading host data into `next` failed.
    #[error("writeback failed: {0}")]
    Writeback(String),
    /// Host data does not match the store capacity.
    #[error("expected {expected} particles, got {actual}")]
    CapacityMismatch { expected: usize, actual: usize },
    /// The stage has no device-side implementation on this backend.
    #[error("{0:?} is a host stage and cannot be dispatched")]
    HostStage(Stage),
}

/// Errors loading an [`AppConfig`](crate::config::AppConfig) file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur when running the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("logger error: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_names_stage() {
        let err = DispatchError::KernelUnavailable(Stage::Force, "bad shader".into());
        let msg = err.to_string();
        assert!(msg.contains("Force"));
        assert!(msg.contains("bad shader"));
    }

    #[test]
    fn test_gpu_error_converts_into_app_error() {
        let err: AppError = GpuError::NoAdapter.into();
        assert!(matches!(err, AppError::Gpu(GpuError::NoAdapter)));
    }
}
