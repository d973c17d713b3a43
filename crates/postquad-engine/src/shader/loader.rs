use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// First word of every SPIR-V module.
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Shaders compiled into the crate, by file name.
const EMBEDDED: &[(&str, &str)] = &[
    ("scene.vert.wgsl", include_str!("shaders/scene.vert.wgsl")),
    ("scene.frag.wgsl", include_str!("shaders/scene.frag.wgsl")),
    ("post.vert.wgsl", include_str!("shaders/post.vert.wgsl")),
    ("post.frag.wgsl", include_str!("shaders/post.frag.wgsl")),
];

/// Shader code in one of the two accepted encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderCode {
    Wgsl(Cow<'static, str>),
    SpirV(Vec<u32>),
}

/// A loaded shader file.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderBlob {
    pub name: String,
    pub code: ShaderCode,
}

/// File names of the four stage shaders the compositor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderNames {
    pub scene_vertex: String,
    pub scene_fragment: String,
    pub post_vertex: String,
    pub post_fragment: String,
}

impl ShaderNames {
    /// The embedded WGSL set.
    pub fn wgsl() -> Self {
        Self {
            scene_vertex: "scene.vert.wgsl".into(),
            scene_fragment: "scene.frag.wgsl".into(),
            post_vertex: "post.vert.wgsl".into(),
            post_fragment: "post.frag.wgsl".into(),
        }
    }

    /// Precompiled SPIR-V binaries, as laid out in a `shaders/` directory.
    pub fn spirv() -> Self {
        Self {
            scene_vertex: "vert.spv".into(),
            scene_fragment: "frag.spv".into(),
            post_vertex: "ppvert.spv".into(),
            post_fragment: "ppfrag.spv".into(),
        }
    }
}

impl Default for ShaderNames {
    fn default() -> Self {
        Self::wgsl()
    }
}

/// Resolves shader files by name.
///
/// Without a base directory only the embedded WGSL shaders are available.
#[derive(Debug, Clone, Default)]
pub struct ShaderLoader {
    base: Option<PathBuf>,
}

impl ShaderLoader {
    pub fn embedded() -> Self {
        Self { base: None }
    }

    pub fn from_dir(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    pub fn load(&self, name: &str) -> Result<ShaderBlob> {
        let code = match &self.base {
            None => {
                let (_, src) = EMBEDDED
                    .iter()
                    .find(|(n, _)| *n == name)
                    .with_context(|| format!("no embedded shader named `{name}`"))?;
                ShaderCode::Wgsl(Cow::Borrowed(src))
            }
            Some(base) => {
                let path = base.join(name);
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("failed to read shader {}", path.display()))?;
                decode(name, &bytes)
                    .with_context(|| format!("failed to decode shader {}", path.display()))?
            }
        };

        log::debug!("loaded shader `{name}`");
        Ok(ShaderBlob {
            name: name.to_owned(),
            code,
        })
    }
}

fn decode(name: &str, bytes: &[u8]) -> Result<ShaderCode> {
    if name.ends_with(".spv") {
        spirv_words(bytes).map(ShaderCode::SpirV)
    } else {
        let text = std::str::from_utf8(bytes).context("WGSL source is not valid UTF-8")?;
        Ok(ShaderCode::Wgsl(Cow::Owned(text.to_owned())))
    }
}

/// Splits a SPIR-V binary into little-endian words and checks the magic number.
pub(crate) fn spirv_words(bytes: &[u8]) -> Result<Vec<u32>> {
    anyhow::ensure!(
        bytes.len() % 4 == 0,
        "SPIR-V length {} is not a multiple of 4",
        bytes.len()
    );

    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    match words.first() {
        Some(&SPIRV_MAGIC) => Ok(words),
        Some(other) => anyhow::bail!("bad SPIR-V magic {other:#010x}"),
        None => anyhow::bail!("SPIR-V module is empty"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("postquad-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn embedded_set_is_complete() {
        let loader = ShaderLoader::embedded();
        let names = ShaderNames::wgsl();
        for name in [
            &names.scene_vertex,
            &names.scene_fragment,
            &names.post_vertex,
            &names.post_fragment,
        ] {
            let blob = loader.load(name).unwrap();
            let ShaderCode::Wgsl(src) = &blob.code else {
                panic!("{name} should be WGSL");
            };
            assert!(src.contains("fn main"), "{name} lacks a main entry point");
        }
    }

    #[test]
    fn unknown_embedded_name_fails() {
        let err = ShaderLoader::embedded().load("missing.wgsl").unwrap_err();
        assert!(err.to_string().contains("missing.wgsl"));
    }

    #[test]
    fn spirv_words_are_little_endian() {
        let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0x0001_0000u32.to_le_bytes());
        assert_eq!(spirv_words(&bytes).unwrap(), vec![SPIRV_MAGIC, 0x0001_0000]);
    }

    #[test]
    fn spirv_rejects_truncated_and_foreign_data() {
        assert!(spirv_words(&[0x03, 0x02, 0x23]).is_err());
        assert!(spirv_words(&[]).is_err());
        assert!(spirv_words(&0xDEAD_BEEFu32.to_le_bytes()).is_err());
    }

    #[test]
    fn disk_loader_reads_both_encodings() {
        let dir = scratch_dir("loader");
        std::fs::write(dir.join("a.wgsl"), "@fragment fn main() {}").unwrap();
        std::fs::write(dir.join("a.spv"), SPIRV_MAGIC.to_le_bytes()).unwrap();

        let loader = ShaderLoader::from_dir(&dir);
        assert_eq!(
            loader.load("a.wgsl").unwrap().code,
            ShaderCode::Wgsl(Cow::Owned("@fragment fn main() {}".into()))
        );
        assert_eq!(
            loader.load("a.spv").unwrap().code,
            ShaderCode::SpirV(vec![SPIRV_MAGIC])
        );
        assert!(loader.load("absent.spv").is_err());

        std::fs::remove_dir_all(dir).ok();
    }
}
