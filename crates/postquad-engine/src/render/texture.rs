use anyhow::Result;

use super::upload::upload_texture;

/// 2x2 checker in BGRA order, row-major.
pub const CHECKER_TEXELS: [u32; 4] = [0xFF00_FF00, 0xFFFF_0000, 0xFFFF_0000, 0xFF00_FF00];

/// The texture sampled by the scene pass.
pub struct SourceTexture {
    view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

impl SourceTexture {
    /// Creates the 2x2 checker and uploads its texels.
    pub fn checker(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self> {
        Self::from_texels(device, queue, 2, 2, &CHECKER_TEXELS)
    }

    pub fn from_texels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        texels: &[u32],
    ) -> Result<Self> {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("postquad source texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Bgra8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        upload_texture(device, queue, &texture, width, height, texels)?;

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            view,
            _texture: texture,
        })
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// Nearest-neighbour sampler clamped to the edge.
pub fn point_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("postquad point sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
