//! postquad engine crate.
//!
//! Dynamic quads are re-uploaded through a staging buffer every frame, drawn
//! into an offscreen target, then composited full-screen into the swapchain
//! through an animated distortion pass.
//!
//! `window::Runtime::run` is the entry point; everything below it is usable on
//! its own for headless tests.

pub mod device;
pub mod error;
pub mod frame;
pub mod input;
pub mod logging;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;

pub use error::{FrameError, UploadError};
