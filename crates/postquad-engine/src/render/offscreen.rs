use winit::dpi::PhysicalSize;

/// Render target of the scene pass, sampled by the post pass.
///
/// Sized once at startup; window resizes do not reallocate it.
pub struct OffscreenTarget {
    view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, size: PhysicalSize<u32>, format: wgpu::TextureFormat) -> Self {
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("postquad offscreen target"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("offscreen target: {}x{} {:?}", size.width, size.height, format);

        Self {
            view,
            _texture: texture,
        }
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
