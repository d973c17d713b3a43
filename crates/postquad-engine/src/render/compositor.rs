//! Two-pass frame composition.
//!
//! Pass 1 draws the frame's quads, textured with the checker, into the
//! offscreen target. Pass 2 samples that target full-screen into the
//! swapchain image through the distortion shader. Both passes go into one
//! command encoder.

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::shader::{
    provision_pipeline, Pipeline, ShaderLoader, ShaderStage, StageBindings, StageShader,
    VertexLayout,
};

use super::config::SceneConfig;
use super::offscreen::OffscreenTarget;
use super::texture::{point_sampler, SourceTexture};
use super::uniforms::{FrameUniforms, PostParams, Projection};
use super::upload::{UploadCapacity, UploadChannel};
use super::vertex::Vertex;

/// Vertices of the generated full-screen quad.
pub const FULLSCREEN_VERTICES: u32 = 6;

const CLEAR: wgpu::Color = wgpu::Color::BLACK;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassTarget {
    Offscreen,
    Swapchain,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PipelineKind {
    Scene,
    Post,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawKind {
    /// Indexed draw from the uploaded vertex/index buffers.
    Indexed { index_count: u32 },
    /// Non-indexed draw with no vertex buffers bound.
    Vertices { count: u32 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassPlan {
    pub label: &'static str,
    pub target: PassTarget,
    pub pipeline: PipelineKind,
    pub clear: wgpu::Color,
    pub draw: DrawKind,
}

/// What one frame records, in order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramePlan {
    pub passes: [PassPlan; 2],
}

impl FramePlan {
    pub fn new(index_count: u32) -> Self {
        Self {
            passes: [
                PassPlan {
                    label: "postquad scene pass",
                    target: PassTarget::Offscreen,
                    pipeline: PipelineKind::Scene,
                    clear: CLEAR,
                    draw: DrawKind::Indexed { index_count },
                },
                PassPlan {
                    label: "postquad post pass",
                    target: PassTarget::Swapchain,
                    pipeline: PipelineKind::Post,
                    clear: CLEAR,
                    draw: DrawKind::Vertices {
                        count: FULLSCREEN_VERTICES,
                    },
                },
            ],
        }
    }

    /// Index count of the scene draw.
    pub fn index_count(&self) -> u32 {
        self.passes
            .iter()
            .find_map(|p| match p.draw {
                DrawKind::Indexed { index_count } => Some(index_count),
                DrawKind::Vertices { .. } => None,
            })
            .unwrap_or(0)
    }
}

/// Bind groups of one pipeline, one per stage.
struct StageGroups {
    vertex: wgpu::BindGroup,
    fragment: wgpu::BindGroup,
}

/// GPU resources for the two passes.
///
/// Field order is drop order: bind groups, sampler, textures, uniform
/// buffers, the upload channel, then the pipelines.
pub struct Compositor {
    scene_groups: StageGroups,
    post_groups: StageGroups,

    _sampler: wgpu::Sampler,

    offscreen: OffscreenTarget,
    _source: SourceTexture,

    projection_ubo: wgpu::Buffer,
    post_ubo: wgpu::Buffer,

    uploads: UploadChannel,

    scene: Pipeline,
    post: Pipeline,
}

impl Compositor {
    /// Loads shaders, builds both pipelines and allocates every resource the
    /// frame needs.
    ///
    /// `size` is the drawable size in physical pixels at startup; the
    /// offscreen target keeps it for the program's lifetime.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        config: &SceneConfig,
    ) -> Result<Self> {
        config.validate()?;
        let loader = config.shader_loader();
        let names = &config.shader_names;

        let scene = build_pipeline(
            device,
            &loader,
            "postquad scene pipeline",
            (names.scene_vertex.as_str(), StageBindings { samplers: 0, uniforms: 1 }),
            (names.scene_fragment.as_str(), StageBindings { samplers: 1, uniforms: 0 }),
            &Vertex::layout(),
            surface_format,
        )?;
        let post = build_pipeline(
            device,
            &loader,
            "postquad post pipeline",
            (names.post_vertex.as_str(), StageBindings::default()),
            (names.post_fragment.as_str(), StageBindings { samplers: 1, uniforms: 1 }),
            &VertexLayout::new(),
            surface_format,
        )?;

        let uploads = UploadChannel::new(device, UploadCapacity::for_quads(config.max_quad_count));

        let projection_ubo = uniform_buffer(
            device,
            "postquad projection ubo",
            std::mem::size_of::<Projection>() as u64,
        );
        let post_ubo = uniform_buffer(
            device,
            "postquad post params ubo",
            std::mem::size_of::<PostParams>() as u64,
        );

        let source =
            SourceTexture::checker(device, queue).context("failed to upload source texture")?;
        let offscreen = OffscreenTarget::new(device, size, surface_format);
        let sampler = point_sampler(device);

        let scene_groups = StageGroups {
            vertex: bind_group(
                device,
                &scene,
                ShaderStage::Vertex,
                &[projection_ubo.as_entire_binding()],
                &[],
                &sampler,
            ),
            fragment: bind_group(
                device,
                &scene,
                ShaderStage::Fragment,
                &[],
                &[source.view()],
                &sampler,
            ),
        };
        let post_groups = StageGroups {
            vertex: bind_group(device, &post, ShaderStage::Vertex, &[], &[], &sampler),
            fragment: bind_group(
                device,
                &post,
                ShaderStage::Fragment,
                &[post_ubo.as_entire_binding()],
                &[offscreen.view()],
                &sampler,
            ),
        };

        log::info!(
            "compositor ready: offscreen {}x{} {:?}, up to {} quads",
            size.width,
            size.height,
            surface_format,
            config.max_quad_count
        );

        Ok(Self {
            scene_groups,
            post_groups,
            _sampler: sampler,
            offscreen,
            _source: source,
            projection_ubo,
            post_ubo,
            uploads,
            scene,
            post,
        })
    }

    #[inline]
    pub fn uploads_mut(&mut self) -> &mut UploadChannel {
        &mut self.uploads
    }

    /// Writes the frame uniforms and encodes every pass of `plan`.
    pub fn record(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        swapchain_view: &wgpu::TextureView,
        plan: &FramePlan,
        uniforms: &FrameUniforms,
    ) {
        queue.write_buffer(&self.projection_ubo, 0, bytemuck::bytes_of(&uniforms.projection));
        queue.write_buffer(&self.post_ubo, 0, bytemuck::bytes_of(&uniforms.post));

        for pass in &plan.passes {
            let view = match pass.target {
                PassTarget::Offscreen => self.offscreen.view(),
                PassTarget::Swapchain => swapchain_view,
            };
            let (pipeline, groups) = match pass.pipeline {
                PipelineKind::Scene => (&self.scene, &self.scene_groups),
                PipelineKind::Post => (&self.post, &self.post_groups),
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(pass.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(pass.clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(pipeline.raw());
            rpass.set_bind_group(ShaderStage::Vertex.group(), &groups.vertex, &[]);
            rpass.set_bind_group(ShaderStage::Fragment.group(), &groups.fragment, &[]);

            match pass.draw {
                DrawKind::Indexed { index_count } => {
                    if index_count == 0 {
                        continue;
                    }
                    rpass.set_vertex_buffer(0, self.uploads.vertex_buffer().slice(..));
                    rpass.set_index_buffer(
                        self.uploads.index_buffer().slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    rpass.draw_indexed(0..index_count, 0, 0..1);
                }
                DrawKind::Vertices { count } => {
                    rpass.draw(0..count, 0..1);
                }
            }
        }
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    loader: &ShaderLoader,
    label: &str,
    vertex: (&str, StageBindings),
    fragment: (&str, StageBindings),
    layout: &VertexLayout,
    format: wgpu::TextureFormat,
) -> Result<Pipeline> {
    let compile = |(name, bindings): (&str, StageBindings), stage: ShaderStage| -> Result<StageShader> {
        let blob = loader
            .load(name)
            .with_context(|| format!("failed to load shader `{name}`"))?;
        Ok(StageShader::new(device, &blob, stage, bindings))
    };

    let vs = compile(vertex, ShaderStage::Vertex)?;
    let fs = compile(fragment, ShaderStage::Fragment)?;
    provision_pipeline(device, label, vs, fs, layout, format)
        .with_context(|| format!("failed to build {label}"))
}

fn uniform_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Bind group for one stage, laid out by that stage's binding convention.
/// Every texture is paired with `sampler`.
fn bind_group(
    device: &wgpu::Device,
    pipeline: &Pipeline,
    stage: ShaderStage,
    uniforms: &[wgpu::BindingResource<'_>],
    textures: &[&wgpu::TextureView],
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let bindings = pipeline.bindings(stage);
    debug_assert_eq!(uniforms.len() as u32, bindings.uniforms);
    debug_assert_eq!(textures.len() as u32, bindings.samplers);

    let mut entries = Vec::with_capacity(uniforms.len() + 2 * textures.len());
    for (i, resource) in uniforms.iter().enumerate() {
        entries.push(wgpu::BindGroupEntry {
            binding: bindings.uniform_binding(i as u32),
            resource: resource.clone(),
        });
    }
    for (i, view) in textures.iter().enumerate() {
        entries.push(wgpu::BindGroupEntry {
            binding: bindings.texture_binding(i as u32),
            resource: wgpu::BindingResource::TextureView(view),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: bindings.sampler_binding(i as u32),
            resource: wgpu::BindingResource::Sampler(sampler),
        });
    }

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: None,
        layout: pipeline.group_layout(stage),
        entries: &entries,
    })
}
