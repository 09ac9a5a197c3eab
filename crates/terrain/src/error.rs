//! Error types for pipeline setup and host-side contract checks.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("height map size mismatch: expected {expected} samples, got {actual}")]
    HeightMapSize { expected: usize, actual: usize },

    #[error("invalid normal type selector: {0}")]
    InvalidNormalType(u32),

    #[error("too many lights: capacity {capacity}, got {actual}")]
    TooManyLights { capacity: usize, actual: usize },

    #[error("too many materials: capacity {capacity}, got {actual}")]
    TooManyMaterials { capacity: usize, actual: usize },

    #[error("buffer readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("buffer readback channel disconnected; device may be lost")]
    ReadbackChannel,

    #[error("diamond-square grid side must be 2^n + 1, got {0}")]
    BadGridSide(usize),
}
