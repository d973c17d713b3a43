use crate::error::FrameError;
use crate::input::PointerState;
use crate::render::{
    FramePlan, FrameUniforms, GeometryBatch, PostEffect, PostParams, Projection, QuadGenerator,
    SceneConfig,
};
use crate::time::{Elapsed, FrameClock};

use super::FrameBackend;

/// What one tick did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickOutcome {
    /// Both passes were submitted and the image presented.
    Presented { index_count: u32 },
    /// No swapchain image; nothing was submitted. Retry on a later tick.
    Skipped,
    /// The window is minimized; the GPU was not touched.
    Idle,
}

/// Owns frame cadence: timing, geometry and the order of GPU calls.
#[derive(Debug)]
pub struct FrameDriver {
    generator: QuadGenerator,
    batch: GeometryBatch,

    clock: FrameClock,
    elapsed: Elapsed,

    projection: Projection,
    effect: PostEffect,

    minimized: bool,
}

impl FrameDriver {
    pub fn new(generator: QuadGenerator, projection: Projection, effect: PostEffect) -> Self {
        Self {
            generator,
            batch: GeometryBatch::new(),
            clock: FrameClock::new(),
            elapsed: Elapsed::default(),
            projection,
            effect,
            minimized: false,
        }
    }

    /// Driver for `config`, projecting a `width` x `height` logical viewport.
    pub fn from_config(config: &SceneConfig, width: f32, height: f32) -> Self {
        Self::new(
            config.generator(),
            Projection::orthographic(width, height),
            config.effect,
        )
    }

    #[inline]
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Enters or leaves the minimized state. Leaving it restarts the clock so
    /// the time spent minimized is not animated.
    pub fn set_minimized(&mut self, minimized: bool) {
        if self.minimized == minimized {
            return;
        }
        self.minimized = minimized;
        if minimized {
            log::debug!("window minimized; idling");
        } else {
            self.clock.reset();
            log::debug!("window restored");
        }
    }

    /// Animation time fed to the post pass, in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed.seconds()
    }

    /// Geometry of the most recent frame.
    #[inline]
    pub fn batch(&self) -> &GeometryBatch {
        &self.batch
    }

    /// Runs one frame, timed by the driver's monotonic clock.
    pub fn tick<B: FrameBackend>(
        &mut self,
        pointer: &PointerState,
        backend: &mut B,
    ) -> Result<TickOutcome, FrameError> {
        if self.minimized {
            return Ok(TickOutcome::Idle);
        }
        let time = self.clock.tick();
        self.advance(time.dt, pointer, backend)
    }

    /// Runs one frame `dt` seconds after the previous one.
    pub fn advance<B: FrameBackend>(
        &mut self,
        dt: f32,
        pointer: &PointerState,
        backend: &mut B,
    ) -> Result<TickOutcome, FrameError> {
        if self.minimized {
            return Ok(TickOutcome::Idle);
        }

        let time = self.elapsed.advance(dt);
        self.generator.generate_into(pointer, &mut self.batch);

        let receipt = backend.stage(&self.batch)?;
        assert_eq!(
            receipt.index_count,
            self.batch.index_count(),
            "uploaded index count disagrees with generated geometry"
        );

        let Some(mut frame) = backend.acquire()? else {
            log::debug!("frame skipped: no swapchain image");
            return Ok(TickOutcome::Skipped);
        };

        let plan = FramePlan::new(receipt.index_count);
        let uniforms = FrameUniforms {
            projection: self.projection,
            post: PostParams::new(time, self.effect),
        };

        backend.record(&mut frame, &plan, &uniforms);
        backend.submit(frame);

        Ok(TickOutcome::Presented {
            index_count: receipt.index_count,
        })
    }
}
