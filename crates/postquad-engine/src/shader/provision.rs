use thiserror::Error;

use super::{ShaderBlob, ShaderCode, ENTRY_POINT};

/// Pipeline stage a shader file was written for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Bind group index holding this stage's resources.
    #[inline]
    pub fn group(self) -> u32 {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Fragment => 1,
        }
    }

    fn visibility(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

/// Resource counts a stage shader declares.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct StageBindings {
    pub samplers: u32,
    pub uniforms: u32,
}

impl StageBindings {
    #[inline]
    pub fn uniform_binding(&self, i: u32) -> u32 {
        debug_assert!(i < self.uniforms);
        i
    }

    #[inline]
    pub fn texture_binding(&self, i: u32) -> u32 {
        debug_assert!(i < self.samplers);
        self.uniforms + 2 * i
    }

    #[inline]
    pub fn sampler_binding(&self, i: u32) -> u32 {
        self.texture_binding(i) + 1
    }

    /// Bind group layout entries, in binding order.
    pub fn layout_entries(&self, stage: ShaderStage) -> Vec<wgpu::BindGroupLayoutEntry> {
        let visibility = stage.visibility();
        let mut entries = Vec::with_capacity((self.uniforms + 2 * self.samplers) as usize);

        for i in 0..self.uniforms {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: self.uniform_binding(i),
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }
        for i in 0..self.samplers {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: self.texture_binding(i),
                visibility,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: self.sampler_binding(i),
                visibility,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }
        entries
    }
}

/// A compiled shader module for one stage.
///
/// Consumed by `provision_pipeline`; a module feeds exactly one pipeline.
#[derive(Debug)]
pub struct StageShader {
    name: String,
    stage: ShaderStage,
    bindings: StageBindings,
    module: wgpu::ShaderModule,
}

impl StageShader {
    /// Compiles `blob` for `stage`.
    ///
    /// wgpu validates the module against the device; invalid code is reported
    /// through the device's error handler.
    pub fn new(
        device: &wgpu::Device,
        blob: &ShaderBlob,
        stage: ShaderStage,
        bindings: StageBindings,
    ) -> Self {
        let source = match &blob.code {
            ShaderCode::Wgsl(src) => wgpu::ShaderSource::Wgsl(src.clone()),
            ShaderCode::SpirV(words) => wgpu::ShaderSource::SpirV(words.as_slice().into()),
        };

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(blob.name.as_str()),
            source,
        });

        Self {
            name: blob.name.clone(),
            stage,
            bindings,
            module,
        }
    }
}

/// One vertex attribute: which buffer slot it reads from and where.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexAttr {
    pub slot: u32,
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub offset: u64,
}

/// Vertex buffer slots plus the attributes read from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexLayout {
    buffers: Vec<(u32, u64)>,
    attributes: Vec<VertexAttr>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares buffer `slot` with the given stride.
    pub fn buffer(mut self, slot: u32, stride: u64) -> Self {
        self.buffers.push((slot, stride));
        self
    }

    pub fn attribute(mut self, attr: VertexAttr) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn attributes(&self) -> &[VertexAttr] {
        &self.attributes
    }

    pub fn stride(&self, slot: u32) -> Option<u64> {
        self.buffers
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, stride)| *stride)
    }

    /// wgpu attributes grouped per declared buffer, in slot order.
    fn grouped(&self) -> Result<Vec<(u64, Vec<wgpu::VertexAttribute>)>, ProvisionError> {
        let mut buffers = self.buffers.clone();
        buffers.sort_by_key(|(slot, _)| *slot);

        for (expected, (slot, _)) in buffers.iter().enumerate() {
            if *slot != expected as u32 {
                return Err(ProvisionError::VertexSlotGap { slot: *slot });
            }
        }
        if let Some(a) = self.attributes.iter().find(|a| self.stride(a.slot).is_none()) {
            return Err(ProvisionError::UnknownVertexSlot {
                location: a.location,
                slot: a.slot,
            });
        }

        Ok(buffers
            .iter()
            .map(|(slot, stride)| {
                let attrs = self
                    .attributes
                    .iter()
                    .filter(|a| a.slot == *slot)
                    .map(|a| wgpu::VertexAttribute {
                        format: a.format,
                        offset: a.offset,
                        shader_location: a.location,
                    })
                    .collect();
                (*stride, attrs)
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("`{name}` is a {found:?} shader but was passed as the {expected:?} stage")]
    StageMismatch {
        name: String,
        expected: ShaderStage,
        found: ShaderStage,
    },

    #[error("vertex attribute at location {location} reads undeclared buffer slot {slot}")]
    UnknownVertexSlot { location: u32, slot: u32 },

    #[error("vertex buffer slots must be contiguous from 0 (found slot {slot})")]
    VertexSlotGap { slot: u32 },
}

fn expect_stage(shader: &StageShader, expected: ShaderStage) -> Result<(), ProvisionError> {
    if shader.stage == expected {
        Ok(())
    } else {
        Err(ProvisionError::StageMismatch {
            name: shader.name.clone(),
            expected,
            found: shader.stage,
        })
    }
}

/// A render pipeline with the bind group layouts it was built against.
///
/// Field order is drop order.
#[derive(Debug)]
pub struct Pipeline {
    pipeline: wgpu::RenderPipeline,
    vertex_group: wgpu::BindGroupLayout,
    fragment_group: wgpu::BindGroupLayout,
    vertex_bindings: StageBindings,
    fragment_bindings: StageBindings,
}

impl Pipeline {
    #[inline]
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Layout of bind group `stage.group()`.
    pub fn group_layout(&self, stage: ShaderStage) -> &wgpu::BindGroupLayout {
        match stage {
            ShaderStage::Vertex => &self.vertex_group,
            ShaderStage::Fragment => &self.fragment_group,
        }
    }

    pub fn bindings(&self, stage: ShaderStage) -> StageBindings {
        match stage {
            ShaderStage::Vertex => self.vertex_bindings,
            ShaderStage::Fragment => self.fragment_bindings,
        }
    }
}

/// Builds a triangle-list, solid-fill, no-cull pipeline from a vertex and a
/// fragment shader. Both shaders are consumed.
pub fn provision_pipeline(
    device: &wgpu::Device,
    label: &str,
    vertex: StageShader,
    fragment: StageShader,
    layout: &VertexLayout,
    target_format: wgpu::TextureFormat,
) -> Result<Pipeline, ProvisionError> {
    expect_stage(&vertex, ShaderStage::Vertex)?;
    expect_stage(&fragment, ShaderStage::Fragment)?;
    let grouped = layout.grouped()?;

    let vertex_group = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(format!("{label} vertex bgl").as_str()),
        entries: &vertex.bindings.layout_entries(ShaderStage::Vertex),
    });
    let fragment_group = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(format!("{label} fragment bgl").as_str()),
        entries: &fragment.bindings.layout_entries(ShaderStage::Fragment),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(format!("{label} pipeline layout").as_str()),
        bind_group_layouts: &[&vertex_group, &fragment_group],
        immediate_size: 0,
    });

    let buffers: Vec<wgpu::VertexBufferLayout<'_>> = grouped
        .iter()
        .map(|(stride, attrs)| wgpu::VertexBufferLayout {
            array_stride: *stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: attrs,
        })
        .collect();

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &vertex.module,
            entry_point: Some(ENTRY_POINT),
            compilation_options: Default::default(),
            buffers: &buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: &fragment.module,
            entry_point: Some(ENTRY_POINT),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    log::debug!(
        "provisioned pipeline `{label}` ({} + {})",
        vertex.name,
        fragment.name
    );

    Ok(Pipeline {
        pipeline,
        vertex_group,
        fragment_group,
        vertex_bindings: vertex.bindings,
        fragment_bindings: fragment.bindings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::render::upload::tests::headless_device;
    use crate::render::vertex::Vertex;
    use crate::shader::{ShaderLoader, ShaderNames};

    #[test]
    fn bindings_follow_convention() {
        let b = StageBindings {
            samplers: 2,
            uniforms: 1,
        };
        assert_eq!(b.uniform_binding(0), 0);
        assert_eq!(b.texture_binding(0), 1);
        assert_eq!(b.sampler_binding(0), 2);
        assert_eq!(b.texture_binding(1), 3);
        assert_eq!(b.sampler_binding(1), 4);
    }

    #[test]
    fn layout_entries_are_dense_and_stage_scoped() {
        let b = StageBindings {
            samplers: 1,
            uniforms: 1,
        };
        let entries = b.layout_entries(ShaderStage::Fragment);
        let bindings: Vec<u32> = entries.iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2]);
        assert!(entries
            .iter()
            .all(|e| e.visibility == wgpu::ShaderStages::FRAGMENT));
        assert!(matches!(entries[0].ty, wgpu::BindingType::Buffer { .. }));
        assert!(matches!(entries[1].ty, wgpu::BindingType::Texture { .. }));
        assert!(matches!(entries[2].ty, wgpu::BindingType::Sampler(_)));

        assert!(StageBindings::default()
            .layout_entries(ShaderStage::Vertex)
            .is_empty());
    }

    #[test]
    fn stages_map_to_groups() {
        assert_eq!(ShaderStage::Vertex.group(), 0);
        assert_eq!(ShaderStage::Fragment.group(), 1);
    }

    #[test]
    fn vertex_layout_groups_by_slot() {
        let grouped = Vertex::layout().grouped().unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].0, Vertex::SIZE);
        let locations: Vec<u32> = grouped[0].1.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2]);

        assert!(VertexLayout::new().grouped().unwrap().is_empty());
    }

    #[test]
    fn vertex_layout_rejects_bad_slots() {
        let orphan = VertexLayout::new().buffer(0, 8).attribute(VertexAttr {
            slot: 1,
            location: 0,
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
        });
        assert_eq!(
            orphan.grouped().unwrap_err(),
            ProvisionError::UnknownVertexSlot {
                location: 0,
                slot: 1
            }
        );

        let gap = VertexLayout::new().buffer(1, 8);
        assert_eq!(
            gap.grouped().unwrap_err(),
            ProvisionError::VertexSlotGap { slot: 1 }
        );
    }

    #[test]
    fn pipelines_build_on_a_real_device() {
        let Some((device, _queue)) = headless_device() else {
            eprintln!("no GPU adapter; skipping");
            return;
        };
        let loader = ShaderLoader::embedded();
        let names = ShaderNames::wgsl();
        let format = wgpu::TextureFormat::Bgra8Unorm;

        let vs = StageShader::new(
            &device,
            &loader.load(&names.scene_vertex).unwrap(),
            ShaderStage::Vertex,
            StageBindings { samplers: 0, uniforms: 1 },
        );
        let fs = StageShader::new(
            &device,
            &loader.load(&names.scene_fragment).unwrap(),
            ShaderStage::Fragment,
            StageBindings { samplers: 1, uniforms: 0 },
        );
        let scene = provision_pipeline(&device, "scene", vs, fs, &Vertex::layout(), format).unwrap();
        assert_eq!(scene.bindings(ShaderStage::Vertex).uniforms, 1);

        let vs = StageShader::new(
            &device,
            &loader.load(&names.post_vertex).unwrap(),
            ShaderStage::Vertex,
            StageBindings::default(),
        );
        let fs = StageShader::new(
            &device,
            &loader.load(&names.post_fragment).unwrap(),
            ShaderStage::Fragment,
            StageBindings { samplers: 1, uniforms: 1 },
        );
        assert!(provision_pipeline(&device, "post", vs, fs, &VertexLayout::new(), format).is_ok());
    }

    #[test]
    fn swapped_stages_are_rejected() {
        let Some((device, _queue)) = headless_device() else {
            eprintln!("no GPU adapter; skipping");
            return;
        };
        let loader = ShaderLoader::embedded();
        let names = ShaderNames::wgsl();

        let vs = StageShader::new(
            &device,
            &loader.load(&names.post_vertex).unwrap(),
            ShaderStage::Vertex,
            StageBindings::default(),
        );
        let fs = StageShader::new(
            &device,
            &loader.load(&names.post_fragment).unwrap(),
            ShaderStage::Fragment,
            StageBindings { samplers: 1, uniforms: 1 },
        );

        let err = provision_pipeline(
            &device,
            "swapped",
            fs,
            vs,
            &VertexLayout::new(),
            wgpu::TextureFormat::Bgra8Unorm,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::StageMismatch {
                expected: ShaderStage::Vertex,
                found: ShaderStage::Fragment,
                ..
            }
        ));
    }
}
