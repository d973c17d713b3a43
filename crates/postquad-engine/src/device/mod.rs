//! GPU device + window surface.
//!
//! `Gpu` creates the wgpu instance/adapter/device/queue, keeps the window's
//! swapchain configured, and opens and presents frames.

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
