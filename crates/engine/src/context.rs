use crossbeam_channel::Receiver;

use crate::schedule::TickScheduler;

/// Ambient display geometry the surface configurator reads on demand.
///
/// Implementations are expected to be cheap to query; the engine calls them
/// once per configure, never per frame.
pub trait DisplayMetrics {
    /// Current layout size of the target surface in logical display units.
    fn logical_size(&self) -> (f64, f64);

    /// Platform pixel-ratio hint, before the engine clamps it.
    fn scale_factor(&self) -> f64;
}

/// Marker event announcing that the host's layout changed and previously
/// computed backing-buffer dimensions may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutChange;

/// Capabilities the engine needs from its host, passed once at construction.
///
/// The original design of this system leaned on ambient globals (a shared
/// visibility flag, a document-level resize observer). Here every external
/// signal is an explicit capability: the engine owns its receivers from
/// `create` until `destroy` and drains them on its own tick timeline, so a
/// notification sent between two ticks is observed before the next frame is
/// submitted.
pub struct EngineContext {
    /// Geometry source consulted by `configure()`.
    pub metrics: Box<dyn DisplayMetrics>,
    /// Tick source driving the frame loop.
    pub scheduler: Box<dyn TickScheduler>,
    /// Visibility notifications; `true` means the surface is visible.
    pub visibility: Receiver<bool>,
    /// Layout-change notifications from the host's root layout container.
    pub layout: Receiver<LayoutChange>,
    /// Whether the platform signals a reduced-motion preference. Sampled
    /// once; the animate-or-still decision does not adapt mid-session.
    pub reduced_motion: bool,
}

impl EngineContext {
    /// Builds a context with no event subscriptions and no reduced-motion
    /// signal. Callers replace the fields they can actually service.
    pub fn new(metrics: Box<dyn DisplayMetrics>, scheduler: Box<dyn TickScheduler>) -> Self {
        Self {
            metrics,
            scheduler,
            visibility: crossbeam_channel::never(),
            layout: crossbeam_channel::never(),
            reduced_motion: false,
        }
    }
}
