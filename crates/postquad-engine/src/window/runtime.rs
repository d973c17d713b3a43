use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};
use crate::frame::{FrameDriver, TickOutcome, WgpuBackend};
use crate::input::platform::winit::translate_window_event;
use crate::input::InputState;
use crate::render::{Compositor, SceneConfig};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// Tick spacing while nothing can be drawn (minimized window, or no
    /// swapchain image on the last attempt).
    pub idle_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "postquad".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            idle_interval: Duration::from_secs(1) / 60,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and runs the frame loop until the window closes.
    ///
    /// Startup failures (window, device, shaders, pipelines) and fatal frame
    /// errors are returned once the event loop has exited.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit, scene: SceneConfig) -> Result<()> {
        scene.validate().context("invalid scene configuration")?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// GPU objects tied to the window. The compositor is released before the
/// device it was created on.
struct WindowGpu<'w> {
    compositor: Compositor,
    gpu: Gpu<'w>,
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    driver: FrameDriver,

    window: Window,

    #[borrows(window)]
    #[covariant]
    render: WindowGpu<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    scene: SceneConfig,

    entry: Option<WindowEntry>,

    /// Earliest time the next tick may run; `None` means render continuously.
    resume_at: Option<Instant>,

    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, scene: SceneConfig) -> Self {
        Self {
            config,
            gpu_init,
            scene,
            entry: None,
            resume_at: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let logical: LogicalSize<f32> = window.inner_size().to_logical(window.scale_factor());
        let driver = FrameDriver::from_config(&self.scene, logical.width, logical.height);

        let gpu_init = self.gpu_init.clone();
        let scene = &self.scene;

        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            driver,
            window,
            render_builder: |w| init_window_gpu(w, gpu_init, scene),
        }
        .try_build()?;

        log::info!(
            "window ready: {}x{} logical",
            logical.width,
            logical.height
        );
        Ok(entry)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let result = entry.with_mut(|fields| {
            let pointer = fields.input_state.pointer();
            let WindowGpu { compositor, gpu } = fields.render;
            let mut backend = WgpuBackend::new(gpu, compositor);
            fields.driver.tick(&pointer, &mut backend)
        });

        match result {
            Ok(outcome) => {
                self.resume_at = next_resume(outcome, Instant::now(), self.config.idle_interval);
            }
            Err(err) => self.fail(event_loop, anyhow::Error::new(err).context("frame failed")),
        }
    }
}

fn init_window_gpu<'w>(
    window: &'w Window,
    init: GpuInit,
    scene: &SceneConfig,
) -> Result<WindowGpu<'w>> {
    let gpu = pollster::block_on(Gpu::new(window, init)).context("GPU initialization failed")?;
    let compositor = Compositor::new(
        gpu.device(),
        gpu.queue(),
        gpu.surface_format(),
        gpu.size(),
        scene,
    )?;
    Ok(WindowGpu { compositor, gpu })
}

/// When the loop may tick again after `outcome`.
fn next_resume(outcome: TickOutcome, now: Instant, idle: Duration) -> Option<Instant> {
    match outcome {
        TickOutcome::Presented { .. } => None,
        TickOutcome::Skipped | TickOutcome::Idle => Some(now + idle),
    }
}

fn is_zero_size(size: PhysicalSize<u32>) -> bool {
    size.width == 0 || size.height == 0
}

impl ApplicationHandler for AppState {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            self.resume_at = None;
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(e) => self.fail(event_loop, e.context("startup failed")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match self.resume_at {
            Some(deadline) if deadline > Instant::now() => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
            _ => {
                self.resume_at = None;
                event_loop.set_control_flow(ControlFlow::Wait);
                if let Some(entry) = &self.entry {
                    entry.with_window(|w| w.request_redraw());
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.window, &event) {
                fields.input_state.apply_event(&ev);
            }
        });

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                // Compositor and Gpu go before the window.
                self.entry = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Occluded(occluded) => {
                entry.with_driver_mut(|d| d.set_minimized(*occluded));
                if !*occluded {
                    self.resume_at = None;
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::Resized(new_size) => {
                let minimized = is_zero_size(*new_size);
                entry.with_render_mut(|r| r.gpu.resize(*new_size));
                entry.with_driver_mut(|d| d.set_minimized(minimized));
                if !minimized {
                    self.resume_at = None;
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_render_mut(|r| r.gpu.resize(new_size));
            }

            WindowEvent::RedrawRequested => {
                if self.resume_at.is_none() {
                    self.redraw(event_loop);
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_window_and_pacing() {
        let c = RuntimeConfig::default();
        assert_eq!(c.initial_size, LogicalSize::new(800.0, 600.0));
        assert_eq!(c.idle_interval, Duration::from_nanos(16_666_666));
    }

    #[test]
    fn only_presented_frames_render_continuously() {
        let now = Instant::now();
        let idle = Duration::from_millis(16);

        assert_eq!(next_resume(TickOutcome::Presented { index_count: 6 }, now, idle), None);
        assert_eq!(next_resume(TickOutcome::Skipped, now, idle), Some(now + idle));
        assert_eq!(next_resume(TickOutcome::Idle, now, idle), Some(now + idle));
    }

    #[test]
    fn zero_extent_counts_as_minimized() {
        assert!(is_zero_size(PhysicalSize::new(0, 600)));
        assert!(is_zero_size(PhysicalSize::new(800, 0)));
        assert!(!is_zero_size(PhysicalSize::new(1, 1)));
    }
}
