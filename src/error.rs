//! Error types for treemorph.
//!
//! The morph engines themselves never fail at runtime. Errors come from
//! construction-time configuration, GPU initialization and the window loop.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("Surface exposes no usable texture format")]
    UnsupportedSurface,
}

/// Errors raised while loading or validating a [`SceneConfig`](crate::SceneConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read scene config: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid JSON for a scene.
    #[error("Failed to parse scene config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value violates a construction-time contract.
    #[error("Invalid config for {group}: {reason}")]
    Invalid {
        /// Name of the offending group ("foliage", "star", or an ornament name).
        group: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(group: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            group: group.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when running the viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The scene configuration was rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// The surface failed in a way that cannot be recovered by reconfiguring.
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
