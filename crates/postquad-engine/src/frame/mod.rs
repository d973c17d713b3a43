//! Per-frame loop.
//!
//! `FrameDriver` decides what a tick does; `FrameBackend` is the GPU side it
//! drives. The runtime wires a `WgpuBackend` in; tests use a recording one.

mod backend;
mod driver;

pub use backend::{FrameBackend, WgpuBackend};
pub use driver::{FrameDriver, TickOutcome};
