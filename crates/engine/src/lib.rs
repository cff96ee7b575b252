//! Renderer engine for Glowpane.
//!
//! The engine turns a declarative renderer descriptor (shader source plus a
//! typed parameter set) into a running frame loop over a `wgpu` surface:
//!
//! ```text
//!   host / glowpane CLI
//!          │ descriptor + EngineOptions + EngineContext
//!          ▼
//!   Engine::create ──▶ GpuState (device, pipeline, uniform buffer)
//!          │
//!   start()/tick() ──▶ FrameLoop ──▶ write_uniforms ─▶ GPU UBO ─▶ draw(0..3)
//!          ▲                │
//!          │                └─ TickScheduler::schedule (host vsync/timer)
//! ```
//!
//! The engine owns every GPU handle and the uniform scratch buffer
//! exclusively; the only state intentionally shared with the outside is the
//! live parameter set, which the host may mutate between ticks and which the
//! next frame reads with plain last-write-wins semantics. Host signals
//! (visibility, layout changes, tick cadence) arrive through the explicit
//! capabilities in [`EngineContext`] rather than ambient globals.

use std::time::Instant;

mod context;
mod descriptor;
mod error;
mod gpu;
mod params;
mod schedule;
mod types;

pub use context::{DisplayMetrics, EngineContext, LayoutChange};
pub use descriptor::{
    validate_layout, write_params_in_order, write_standard_fields, FrameContext,
    RendererDescriptor, STANDARD_FIELD_COUNT,
};
pub use error::EngineError;
pub use gpu::backing_geometry;
pub use params::ParamSet;
pub use schedule::{TickHandle, TickScheduler};
pub use types::{EngineOptions, PowerPreference, SurfaceGeometry};

// Per-frame faults surface through the tick result; re-exported so hosts can
// match on them without naming wgpu themselves.
pub use wgpu::SurfaceError;

use gpu::GpuState;
use schedule::{FrameLoop, FrameSink};

/// Bridges the frame loop onto the GPU state for one call. Split out so the
/// loop can borrow the GPU mutably while the descriptor, parameters, and
/// metrics stay shared.
struct EngineSink<'a> {
    gpu: &'a mut GpuState,
    descriptor: &'a dyn RendererDescriptor,
    params: &'a ParamSet,
    metrics: &'a dyn DisplayMetrics,
    max_dpr: f64,
}

impl FrameSink for EngineSink<'_> {
    fn configure(&mut self) {
        let geometry = backing_geometry(
            self.metrics.logical_size(),
            self.metrics.scale_factor(),
            self.max_dpr,
        );
        self.gpu.apply_geometry(geometry);
    }

    fn render(&mut self, time: f32) -> Result<(), SurfaceError> {
        self.gpu.render(time, self.descriptor, self.params)
    }
}

/// The controller handed back to callers: start/stop/destroy plus the live
/// parameter set the frame loop reads every tick.
pub struct Engine {
    gpu: GpuState,
    frame_loop: FrameLoop,
    descriptor: Box<dyn RendererDescriptor>,
    params: ParamSet,
    metrics: Box<dyn DisplayMetrics>,
    max_dpr: f64,
    destroyed: bool,
}

impl Engine {
    /// Brings up the GPU device, pipeline, and uniform buffer for the given
    /// descriptor and hands back the controller.
    ///
    /// This is the engine's only suspension point: adapter and device
    /// acquisition block on the backend (via pollster). Fails with
    /// [`EngineError::DescriptorContract`] before touching the GPU when the
    /// descriptor's uniform layout is inconsistent, and with the
    /// [`EngineError`] capability taxonomy when the host cannot provide a
    /// device or surface. The animate-or-still decision is made here, once,
    /// from `options.respect_reduced_motion` and `context.reduced_motion`.
    pub fn create<T>(
        target: &T,
        descriptor: Box<dyn RendererDescriptor>,
        overrides: &[(String, f32)],
        options: EngineOptions,
        context: EngineContext,
    ) -> Result<Self, EngineError>
    where
        T: raw_window_handle::HasDisplayHandle + raw_window_handle::HasWindowHandle,
    {
        validate_layout(descriptor.as_ref())?;

        let mut params = descriptor.default_params();
        params.apply_overrides(overrides);

        let initial = backing_geometry(
            context.metrics.logical_size(),
            context.metrics.scale_factor(),
            options.max_dpr,
        );
        let gpu = GpuState::new(
            target,
            descriptor.as_ref(),
            options.power_preference,
            initial,
        )?;

        let animate = !(options.respect_reduced_motion && context.reduced_motion);
        if !animate {
            tracing::info!(
                renderer = descriptor.id(),
                "reduced-motion preference honored; engine will render stills"
            );
        }
        let frame_loop = FrameLoop::new(
            context.scheduler,
            context.visibility,
            context.layout,
            animate,
        );

        tracing::info!(
            renderer = descriptor.id(),
            uniform_floats = descriptor.uniform_float_count(),
            width = initial.width,
            height = initial.height,
            dpr = initial.dpr,
            "engine created"
        );

        Ok(Self {
            gpu,
            frame_loop,
            descriptor,
            params,
            metrics: context.metrics,
            max_dpr: options.max_dpr,
            destroyed: false,
        })
    }

    /// Starts the frame loop (or renders one still frame under reduced
    /// motion). Idempotent while running; resets the logical clock so the
    /// next frame's timestamp restarts at zero. Calling `start` after
    /// [`destroy`](Self::destroy) is a caller error.
    pub fn start(&mut self) -> Result<(), SurfaceError> {
        debug_assert!(!self.destroyed, "start() after destroy() is a caller error");
        let mut sink = EngineSink {
            gpu: &mut self.gpu,
            descriptor: self.descriptor.as_ref(),
            params: &self.params,
            metrics: self.metrics.as_ref(),
            max_dpr: self.max_dpr,
        };
        self.frame_loop.start(&mut sink, Instant::now())
    }

    /// Cancels the next scheduled tick without touching GPU resources, so a
    /// later `start` resumes without re-acquiring the device.
    pub fn stop(&mut self) {
        self.frame_loop.stop();
    }

    /// Drives one tick; the host calls this when a tick scheduled through
    /// its [`TickScheduler`] fires. Stale ticks (after `stop`) are ignored.
    /// Surface faults propagate untouched and halt further scheduling.
    pub fn tick(&mut self) -> Result<(), SurfaceError> {
        let mut sink = EngineSink {
            gpu: &mut self.gpu,
            descriptor: self.descriptor.as_ref(),
            params: &self.params,
            metrics: self.metrics.as_ref(),
            max_dpr: self.max_dpr,
        };
        self.frame_loop.tick(&mut sink, Instant::now())
    }

    /// Stops the loop, detaches the host subscriptions, and releases the
    /// GPU uniform buffer. Safe to call after `stop`; a second `destroy` is
    /// a guarded no-op because double-releasing GPU resources is undefined
    /// behavior in the backing API.
    pub fn destroy(&mut self) {
        if self.destroyed {
            tracing::warn!("destroy() called twice; ignoring");
            return;
        }
        self.frame_loop.shutdown();
        self.gpu.release();
        self.destroyed = true;
        tracing::info!(renderer = self.descriptor.id(), "engine destroyed");
    }

    /// Whether a tick is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Identifier of the descriptor this engine was built for.
    pub fn renderer_id(&self) -> &'static str {
        self.descriptor.id()
    }

    /// Backing-buffer geometry currently applied to the surface.
    pub fn geometry(&self) -> SurfaceGeometry {
        self.gpu.geometry()
    }

    /// The live parameter set.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Mutable access to the live parameter set. Writes are picked up by the
    /// very next frame; no notification step is needed because the loop
    /// reads the set on every tick.
    pub fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }
}
