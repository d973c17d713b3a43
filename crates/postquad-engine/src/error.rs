//! Per-frame error kinds.
//!
//! Startup failures are `anyhow::Error`s and end the program before the loop
//! starts. The types here are what a running frame can return.

use thiserror::Error;

/// Upload Channel precondition failures. These are caller bugs: the batch
/// handed to the channel does not fit the buffers sized at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("vertex data ({len} bytes) exceeds staging capacity ({capacity} bytes)")]
    VertexOverflow { len: u64, capacity: u64 },

    #[error("index data ({len} bytes) exceeds staging capacity ({capacity} bytes)")]
    IndexOverflow { len: u64, capacity: u64 },

    #[error("{what} data length {len} is not a multiple of {align} bytes")]
    Misaligned {
        what: &'static str,
        len: u64,
        align: u64,
    },
}

/// Errors surfaced by one frame of the loop.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("geometry upload rejected: {0}")]
    Upload(#[from] UploadError),

    #[error("swapchain is unrecoverable: {0}")]
    Surface(wgpu::SurfaceError),
}
