//! GPU rendering subsystem.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - The scene vertex shader converts to NDC with the `Projection` uniform.
//! - Geometry reaches the GPU only through the `upload` staging channel.

pub mod compositor;
pub mod config;
pub mod geometry;
pub mod offscreen;
pub mod texture;
pub mod uniforms;
pub mod upload;
pub mod vertex;

pub use compositor::{Compositor, DrawKind, FramePlan, PassPlan, PassTarget, PipelineKind};
pub use config::SceneConfig;
pub use geometry::{GeometryBatch, QuadGenerator, QuadLayout};
pub use uniforms::{FrameUniforms, PostEffect, PostParams, Projection};
pub use upload::{StagingLayout, UploadCapacity, UploadChannel, UploadReceipt};
pub use vertex::Vertex;
