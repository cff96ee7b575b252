use std::time::Instant;

use crossbeam_channel::Receiver;

use crate::context::LayoutChange;

/// Identifier of a scheduled tick, used to cancel it before it fires.
pub type TickHandle = u64;

/// Cooperative tick source for the frame loop.
///
/// The engine never blocks between frames; it asks the scheduler for the
/// next tick and returns. What a tick actually is — a vsync callback, a
/// timer, an event-loop redraw request — is the host's business. A host
/// that cannot revoke an already-requested tick may treat `cancel` as a
/// no-op: the loop ignores ticks it no longer expects.
pub trait TickScheduler {
    /// Requests one future tick and returns its handle.
    fn schedule(&mut self) -> TickHandle;

    /// Revokes a previously scheduled tick, if the platform allows it.
    fn cancel(&mut self, handle: TickHandle);
}

/// Where rendered frames go. Implemented over the GPU state by the engine;
/// tests substitute a recorder.
pub(crate) trait FrameSink {
    /// Recomputes backing-buffer geometry and reconfigures the surface.
    fn configure(&mut self);

    /// Renders one frame at the given elapsed time in seconds.
    fn render(&mut self, time: f32) -> Result<(), wgpu::SurfaceError>;
}

/// The animation loop state machine: Stopped ⇄ Running.
///
/// One tick is pending at most; `start` while a tick is pending is a no-op,
/// which is what makes it idempotent. Visibility and layout notifications
/// are drained at the top of every tick, so a change observed between two
/// ticks always takes effect before the next submission and never
/// mid-frame.
pub(crate) struct FrameLoop {
    scheduler: Box<dyn TickScheduler>,
    visibility: Receiver<bool>,
    layout: Receiver<LayoutChange>,
    /// Animate-or-still decision, fixed at construction.
    animate: bool,
    origin: Instant,
    pending: Option<TickHandle>,
    visibility_paused: bool,
}

impl FrameLoop {
    pub(crate) fn new(
        scheduler: Box<dyn TickScheduler>,
        visibility: Receiver<bool>,
        layout: Receiver<LayoutChange>,
        animate: bool,
    ) -> Self {
        Self {
            scheduler,
            visibility,
            layout,
            animate,
            origin: Instant::now(),
            pending: None,
            visibility_paused: false,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Resets the clock origin, forces a configure, and either schedules the
    /// recurring tick or — when animation is disabled — renders exactly one
    /// frame at time zero.
    pub(crate) fn start(
        &mut self,
        sink: &mut dyn FrameSink,
        now: Instant,
    ) -> Result<(), wgpu::SurfaceError> {
        if self.pending.is_some() {
            tracing::debug!("start ignored; a tick is already scheduled");
            return Ok(());
        }

        self.origin = now;
        sink.configure();

        if self.animate {
            self.pending = Some(self.scheduler.schedule());
            Ok(())
        } else {
            tracing::info!("reduced motion active; rendering a single still frame");
            sink.render(0.0)
        }
    }

    /// Cancels the pending tick, if any. GPU resources stay alive so a
    /// subsequent `start` is cheap.
    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Drives one tick of the loop. Ticks that fire after `stop` are stale
    /// and ignored. A render failure propagates without rescheduling; the
    /// loop halts until the caller starts it again.
    pub(crate) fn tick(
        &mut self,
        sink: &mut dyn FrameSink,
        now: Instant,
    ) -> Result<(), wgpu::SurfaceError> {
        if self.pending.take().is_none() {
            tracing::trace!("stale tick ignored");
            return Ok(());
        }

        let mut layout_changed = false;
        while self.layout.try_recv().is_ok() {
            layout_changed = true;
        }
        if layout_changed {
            sink.configure();
        }

        while let Ok(visible) = self.visibility.try_recv() {
            self.visibility_paused = !visible;
        }

        if self.visibility_paused {
            // Keep the cadence so the next visibility flip is picked up
            // promptly, but submit nothing.
            self.pending = Some(self.scheduler.schedule());
            return Ok(());
        }

        let time = now.saturating_duration_since(self.origin).as_secs_f32();
        sink.render(time)?;
        self.pending = Some(self.scheduler.schedule());
        Ok(())
    }

    /// Detaches the event subscriptions. Called on destroy; any further
    /// notifications from the host fall on the floor.
    pub(crate) fn shutdown(&mut self) {
        self.stop();
        self.visibility = crossbeam_channel::never();
        self.layout = crossbeam_channel::never();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use crossbeam_channel::unbounded;

    use super::*;

    #[derive(Default)]
    struct SchedulerLog {
        scheduled: u64,
        cancelled: Vec<TickHandle>,
    }

    struct RecordingScheduler {
        log: Rc<RefCell<SchedulerLog>>,
    }

    impl TickScheduler for RecordingScheduler {
        fn schedule(&mut self) -> TickHandle {
            let mut log = self.log.borrow_mut();
            log.scheduled += 1;
            log.scheduled
        }

        fn cancel(&mut self, handle: TickHandle) {
            self.log.borrow_mut().cancelled.push(handle);
        }
    }

    #[derive(Debug, PartialEq)]
    enum SinkCall {
        Configure,
        Render(f32),
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<SinkCall>,
        fail_next_render: bool,
    }

    impl FrameSink for RecordingSink {
        fn configure(&mut self) {
            self.calls.push(SinkCall::Configure);
        }

        fn render(&mut self, time: f32) -> Result<(), wgpu::SurfaceError> {
            if self.fail_next_render {
                self.fail_next_render = false;
                return Err(wgpu::SurfaceError::Lost);
            }
            self.calls.push(SinkCall::Render(time));
            Ok(())
        }
    }

    fn harness(animate: bool) -> (FrameLoop, Rc<RefCell<SchedulerLog>>) {
        let log = Rc::new(RefCell::new(SchedulerLog::default()));
        let scheduler = RecordingScheduler { log: log.clone() };
        let frame_loop = FrameLoop::new(
            Box::new(scheduler),
            crossbeam_channel::never(),
            crossbeam_channel::never(),
            animate,
        );
        (frame_loop, log)
    }

    #[test]
    fn start_configures_then_schedules() {
        let (mut frame_loop, log) = harness(true);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();

        assert_eq!(sink.calls, vec![SinkCall::Configure]);
        assert_eq!(log.borrow().scheduled, 1);
        assert!(frame_loop.is_running());
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let (mut frame_loop, log) = harness(true);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();
        frame_loop.start(&mut sink, now + Duration::from_secs(1)).unwrap();

        assert_eq!(sink.calls, vec![SinkCall::Configure]);
        assert_eq!(log.borrow().scheduled, 1, "no duplicate scheduled loop");
    }

    #[test]
    fn tick_renders_elapsed_time_and_reschedules() {
        let (mut frame_loop, log) = harness(true);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();
        frame_loop
            .tick(&mut sink, now + Duration::from_millis(1500))
            .unwrap();

        assert_eq!(
            sink.calls,
            vec![SinkCall::Configure, SinkCall::Render(1.5)]
        );
        assert_eq!(log.borrow().scheduled, 2);
    }

    #[test]
    fn stop_then_start_resets_the_clock() {
        let (mut frame_loop, _log) = harness(true);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();
        frame_loop
            .tick(&mut sink, now + Duration::from_secs(5))
            .unwrap();
        frame_loop.stop();

        let later = now + Duration::from_secs(60);
        frame_loop.start(&mut sink, later).unwrap();
        frame_loop
            .tick(&mut sink, later + Duration::from_secs(2))
            .unwrap();

        assert_eq!(
            sink.calls,
            vec![
                SinkCall::Configure,
                SinkCall::Render(5.0),
                SinkCall::Configure,
                SinkCall::Render(2.0),
            ]
        );
    }

    #[test]
    fn stop_cancels_the_pending_tick_and_stale_ticks_are_ignored() {
        let (mut frame_loop, log) = harness(true);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();
        frame_loop.stop();

        assert_eq!(log.borrow().cancelled, vec![1]);
        assert!(!frame_loop.is_running());

        // The platform may deliver the callback anyway; nothing happens.
        frame_loop
            .tick(&mut sink, now + Duration::from_secs(1))
            .unwrap();
        assert_eq!(sink.calls, vec![SinkCall::Configure]);
        assert_eq!(log.borrow().scheduled, 1);
    }

    #[test]
    fn stop_when_stopped_is_a_no_op() {
        let (mut frame_loop, log) = harness(true);
        frame_loop.stop();
        assert!(log.borrow().cancelled.is_empty());
    }

    #[test]
    fn reduced_motion_renders_one_frame_per_start() {
        let (mut frame_loop, log) = harness(false);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();
        assert_eq!(
            sink.calls,
            vec![SinkCall::Configure, SinkCall::Render(0.0)]
        );
        assert_eq!(log.borrow().scheduled, 0);
        assert!(!frame_loop.is_running());

        frame_loop
            .start(&mut sink, now + Duration::from_secs(3))
            .unwrap();
        assert_eq!(
            sink.calls,
            vec![
                SinkCall::Configure,
                SinkCall::Render(0.0),
                SinkCall::Configure,
                SinkCall::Render(0.0),
            ]
        );
    }

    #[test]
    fn hidden_ticks_skip_rendering_but_keep_rescheduling() {
        let log = Rc::new(RefCell::new(SchedulerLog::default()));
        let (visibility_tx, visibility_rx) = unbounded();
        let mut frame_loop = FrameLoop::new(
            Box::new(RecordingScheduler { log: log.clone() }),
            visibility_rx,
            crossbeam_channel::never(),
            true,
        );
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();
        visibility_tx.send(false).unwrap();
        frame_loop
            .tick(&mut sink, now + Duration::from_secs(1))
            .unwrap();
        frame_loop
            .tick(&mut sink, now + Duration::from_secs(2))
            .unwrap();

        assert_eq!(sink.calls, vec![SinkCall::Configure]);
        assert_eq!(log.borrow().scheduled, 3, "cadence continues while hidden");

        visibility_tx.send(true).unwrap();
        frame_loop
            .tick(&mut sink, now + Duration::from_secs(3))
            .unwrap();
        assert_eq!(
            sink.calls,
            vec![SinkCall::Configure, SinkCall::Render(3.0)]
        );
    }

    #[test]
    fn layout_events_reconfigure_before_the_next_render() {
        let log = Rc::new(RefCell::new(SchedulerLog::default()));
        let (layout_tx, layout_rx) = unbounded();
        let mut frame_loop = FrameLoop::new(
            Box::new(RecordingScheduler { log: log.clone() }),
            crossbeam_channel::never(),
            layout_rx,
            true,
        );
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();
        layout_tx.send(LayoutChange).unwrap();
        layout_tx.send(LayoutChange).unwrap();
        frame_loop
            .tick(&mut sink, now + Duration::from_secs(1))
            .unwrap();

        // Coalesced into one configure, ordered ahead of the render.
        assert_eq!(
            sink.calls,
            vec![
                SinkCall::Configure,
                SinkCall::Configure,
                SinkCall::Render(1.0),
            ]
        );
    }

    #[test]
    fn render_failure_halts_scheduling() {
        let (mut frame_loop, log) = harness(true);
        let mut sink = RecordingSink {
            fail_next_render: true,
            ..RecordingSink::default()
        };
        let now = Instant::now();

        frame_loop.start(&mut sink, now).unwrap();
        let result = frame_loop.tick(&mut sink, now + Duration::from_secs(1));

        assert!(matches!(result, Err(wgpu::SurfaceError::Lost)));
        assert!(!frame_loop.is_running());
        assert_eq!(log.borrow().scheduled, 1, "failed tick does not reschedule");
    }
}
