//! Shader loading and pipeline provisioning.
//!
//! Shaders are one file per stage. Each file exposes a single entry point
//! named `main`. Resources follow a fixed binding convention:
//!
//! - bind group 0: vertex-stage resources
//! - bind group 1: fragment-stage resources
//! - uniform buffer `i` at binding `i`
//! - sampled texture `i` at `uniforms + 2i`, its sampler at `uniforms + 2i + 1`

mod loader;
mod provision;

pub use loader::{ShaderBlob, ShaderCode, ShaderLoader, ShaderNames, SPIRV_MAGIC};
pub use provision::{
    provision_pipeline, Pipeline, ProvisionError, ShaderStage, StageBindings, StageShader,
    VertexAttr, VertexLayout,
};

/// Entry point every stage file exposes.
pub const ENTRY_POINT: &str = "main";
