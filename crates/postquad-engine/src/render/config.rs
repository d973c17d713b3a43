use std::path::PathBuf;

use anyhow::Result;

use crate::shader::{ShaderLoader, ShaderNames};

use super::geometry::{QuadGenerator, QuadLayout};
use super::uniforms::PostEffect;

/// Scene parameters fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Quad side length in logical pixels.
    pub side: f32,

    /// Sizes the GPU vertex/index buffers.
    pub max_quad_count: u32,

    pub layout: QuadLayout,
    pub effect: PostEffect,

    /// Load shaders from this directory instead of the embedded WGSL set.
    pub shader_dir: Option<PathBuf>,
    pub shader_names: ShaderNames,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            side: QuadLayout::Anchored.default_side(),
            max_quad_count: 4096,
            layout: QuadLayout::Anchored,
            effect: PostEffect::default(),
            shader_dir: None,
            shader_names: ShaderNames::wgsl(),
        }
    }
}

impl SceneConfig {
    pub fn generator(&self) -> QuadGenerator {
        QuadGenerator::new(self.side, self.layout)
    }

    pub fn shader_loader(&self) -> ShaderLoader {
        match &self.shader_dir {
            Some(dir) => ShaderLoader::from_dir(dir),
            None => ShaderLoader::embedded(),
        }
    }

    /// Rejects values the renderer cannot run with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.side.is_finite() && self.side >= 0.0,
            "quad side must be a non-negative number, got {}",
            self.side
        );

        let needed = QuadGenerator::new(0.0, self.layout).max_quads();
        anyhow::ensure!(
            self.max_quad_count as usize >= needed,
            "max quad count {} is below the {} quads a {:?} frame can produce",
            self.max_quad_count,
            needed,
            self.layout
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = SceneConfig::default();
        assert_eq!(c.side, 500.0);
        assert_eq!(c.max_quad_count, 4096);
        assert!(c.validate().is_ok());
        assert!(c.shader_loader().base_dir().is_none());
    }

    #[test]
    fn capacity_must_cover_one_frame() {
        let c = SceneConfig {
            max_quad_count: 1,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = SceneConfig {
            max_quad_count: 1,
            layout: QuadLayout::Follow,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn bad_side_is_rejected() {
        for side in [f32::NAN, -1.0, f32::INFINITY] {
            let c = SceneConfig {
                side,
                ..Default::default()
            };
            assert!(c.validate().is_err(), "side {side} accepted");
        }
    }
}
