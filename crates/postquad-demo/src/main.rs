use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use winit::dpi::LogicalSize;

use postquad_engine::device::GpuInit;
use postquad_engine::logging::{init_logging, LoggingConfig};
use postquad_engine::render::{PostEffect, QuadLayout, SceneConfig};
use postquad_engine::shader::ShaderNames;
use postquad_engine::window::{Runtime, RuntimeConfig};

/// Textured quads drawn offscreen, then warped onto the window.
///
/// Hold the left mouse button (or touch) to draw a second quad at the pointer.
#[derive(Debug, Parser)]
#[command(name = "postquad-demo", version)]
struct Cli {
    /// Quad side length in logical pixels [default: 500, or 100 with
    /// `--follow`].
    #[arg(long)]
    side: Option<f32>,

    /// Upper bound on quads per frame; sizes the GPU buffers.
    #[arg(long, default_value_t = 4096)]
    max_quads: u32,

    /// Draw a single quad that follows the pointer.
    #[arg(long)]
    follow: bool,

    /// Distortion animation speed, in cycles per second.
    #[arg(long, default_value_t = 0.2)]
    speed: f32,

    /// Distortion wave frequency along Y.
    #[arg(long, default_value_t = 8.0)]
    frequency: f32,

    /// Distortion amplitude, in UV units.
    #[arg(long, default_value_t = 0.1)]
    amplitude: f32,

    /// Load shaders from this directory instead of the built-in WGSL.
    #[arg(long, value_name = "DIR")]
    shaders: Option<PathBuf>,

    /// With `--shaders`, load precompiled SPIR-V (vert.spv, frag.spv,
    /// ppvert.spv, ppfrag.spv).
    #[arg(long, requires = "shaders")]
    spirv: bool,

    /// Window width in logical pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Window height in logical pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Log filter, e.g. "debug" or "postquad_engine=debug,wgpu=warn".
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

impl Cli {
    fn scene(&self) -> SceneConfig {
        let layout = if self.follow {
            QuadLayout::Follow
        } else {
            QuadLayout::Anchored
        };
        SceneConfig {
            side: self.side.unwrap_or_else(|| layout.default_side()),
            max_quad_count: self.max_quads,
            layout,
            effect: PostEffect {
                speed: self.speed,
                frequency: self.frequency,
                amplitude: self.amplitude,
            },
            shader_dir: self.shaders.clone(),
            shader_names: if self.spirv {
                ShaderNames::spirv()
            } else {
                ShaderNames::wgsl()
            },
        }
    }

    fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            initial_size: LogicalSize::new(self.width, self.height),
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    Runtime::run(cli.runtime(), GpuInit::default(), cli.scene())
}
