/// A frame in flight: the command encoder plus the acquired swapchain image.
///
/// Dropping a `GpuFrame` without passing it to [`Gpu::submit`](super::Gpu::submit)
/// discards everything recorded into the encoder and releases the image
/// unpresented.
pub struct GpuFrame {
    pub encoder: wgpu::CommandEncoder,
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}
