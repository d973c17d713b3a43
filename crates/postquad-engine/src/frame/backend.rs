use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::error::{FrameError, UploadError};
use crate::render::{Compositor, FramePlan, FrameUniforms, GeometryBatch, UploadReceipt};

/// GPU operations one frame goes through, in call order.
pub trait FrameBackend {
    /// An open frame: command encoder plus swapchain image.
    type Frame;

    /// Uploads this frame's geometry. Runs before the frame is opened.
    fn stage(&mut self, batch: &GeometryBatch) -> Result<UploadReceipt, UploadError>;

    /// Opens a frame. `Ok(None)` means no swapchain image was available; the
    /// frame's command encoder has already been discarded.
    fn acquire(&mut self) -> Result<Option<Self::Frame>, FrameError>;

    /// Encodes every pass of `plan` into the frame.
    fn record(&mut self, frame: &mut Self::Frame, plan: &FramePlan, uniforms: &FrameUniforms);

    /// Submits the frame's commands and presents its image.
    fn submit(&mut self, frame: Self::Frame);
}

/// `FrameBackend` over a window's `Gpu` and the `Compositor` built on it.
pub struct WgpuBackend<'a, 'w> {
    gpu: &'a mut Gpu<'w>,
    compositor: &'a mut Compositor,
}

impl<'a, 'w> WgpuBackend<'a, 'w> {
    pub fn new(gpu: &'a mut Gpu<'w>, compositor: &'a mut Compositor) -> Self {
        Self { gpu, compositor }
    }
}

impl FrameBackend for WgpuBackend<'_, '_> {
    type Frame = GpuFrame;

    fn stage(&mut self, batch: &GeometryBatch) -> Result<UploadReceipt, UploadError> {
        self.compositor.uploads_mut().stage(
            self.gpu.device(),
            self.gpu.queue(),
            batch.vertex_bytes(),
            batch.index_bytes(),
        )
    }

    fn acquire(&mut self) -> Result<Option<GpuFrame>, FrameError> {
        match self.gpu.begin_frame() {
            Ok(frame) => Ok(Some(frame)),
            Err(err) => match self.gpu.handle_surface_error(&err) {
                SurfaceErrorAction::Fatal => Err(FrameError::Surface(err)),
                action => {
                    log::debug!("no swapchain image ({err}); {action:?}");
                    Ok(None)
                }
            },
        }
    }

    fn record(&mut self, frame: &mut GpuFrame, plan: &FramePlan, uniforms: &FrameUniforms) {
        self.compositor.record(
            self.gpu.queue(),
            &mut frame.encoder,
            &frame.view,
            plan,
            uniforms,
        );
    }

    fn submit(&mut self, frame: GpuFrame) {
        self.gpu.submit(frame);
    }
}
