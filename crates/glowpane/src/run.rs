use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Sender;
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use engine::{
    DisplayMetrics, Engine, EngineContext, EngineOptions, LayoutChange, SurfaceError, TickHandle,
    TickScheduler,
};
use renderers::RendererKind;

use crate::cli::{parse_override, parse_window_size, RunArgs};
use crate::preset::Preset;

const DEFAULT_WINDOW_SIZE: (u32, u32) = (1280, 720);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let preset = args
        .preset
        .as_deref()
        .map(|path| {
            Preset::load(path).with_context(|| format!("failed to load preset {}", path.display()))
        })
        .transpose()?;

    let kind = args
        .renderer
        .or_else(|| preset.as_ref().and_then(Preset::renderer_kind))
        .unwrap_or(RendererKind::Aurora);

    // Preset values first, CLI --set flags after so they win.
    let mut overrides = preset
        .as_ref()
        .map(Preset::overrides)
        .unwrap_or_default();
    for spec in &args.set {
        overrides.push(parse_override(spec)?);
    }

    let window_size = args
        .size
        .as_deref()
        .map(parse_window_size)
        .transpose()?
        .unwrap_or(DEFAULT_WINDOW_SIZE);

    let options = EngineOptions {
        power_preference: args.power_preference.to_engine(),
        respect_reduced_motion: !args.ignore_reduced_motion,
        max_dpr: args.max_dpr,
    };
    let reduced_motion = parse_reduced_motion(
        std::env::var("GLOWPANE_REDUCED_MOTION").ok().as_deref(),
    );

    tracing::info!(
        renderer = %kind,
        overrides = overrides.len(),
        reduced_motion,
        "bootstrapping glowpane"
    );

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window = WindowBuilder::new()
        .with_title(&args.title)
        .with_inner_size(PhysicalSize::new(window_size.0, window_size.1))
        .build(&event_loop)
        .context("failed to create window")?;
    let window = Arc::new(window);

    let (visibility_tx, visibility_rx) = crossbeam_channel::unbounded();
    let (layout_tx, layout_rx) = crossbeam_channel::unbounded();

    let mut context = EngineContext::new(
        Box::new(WindowMetrics {
            window: window.clone(),
        }),
        Box::new(RedrawScheduler {
            window: window.clone(),
            next_handle: 0,
        }),
    );
    context.visibility = visibility_rx;
    context.layout = layout_rx;
    context.reduced_motion = reduced_motion;

    let mut engine = Engine::create(
        window.as_ref(),
        kind.descriptor(),
        &overrides,
        options,
        context,
    )?;
    engine
        .start()
        .map_err(|err| anyhow!("failed to render the first frame: {err}"))?;

    let target_window = window.clone();
    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            if let Event::WindowEvent { window_id, event } = event {
                if window_id != target_window.id() {
                    return;
                }
                handle_window_event(
                    event,
                    &mut engine,
                    &visibility_tx,
                    &layout_tx,
                    elwt,
                );
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

fn handle_window_event(
    event: WindowEvent,
    engine: &mut Engine,
    visibility_tx: &Sender<bool>,
    layout_tx: &Sender<LayoutChange>,
    elwt: &EventLoopWindowTarget<()>,
) {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
            engine.destroy();
            elwt.exit();
        }
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    logical_key: Key::Named(NamedKey::Escape),
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } => {
            engine.destroy();
            elwt.exit();
        }
        WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
            let _ = layout_tx.send(LayoutChange);
        }
        WindowEvent::Occluded(occluded) => {
            let _ = visibility_tx.send(!occluded);
        }
        WindowEvent::RedrawRequested => match engine.tick() {
            Ok(()) => {}
            Err(SurfaceError::OutOfMemory) => {
                tracing::error!("surface out of memory; exiting");
                engine.destroy();
                elwt.exit();
            }
            Err(err) => {
                // The engine halts its loop on a surface fault; recover at
                // the app layer by reconfiguring and restarting the loop.
                tracing::warn!(error = %err, "surface error; restarting frame loop");
                let _ = layout_tx.send(LayoutChange);
                engine.stop();
                if let Err(err) = engine.start() {
                    tracing::error!(error = %err, "failed to recover from surface error");
                    engine.destroy();
                    elwt.exit();
                }
            }
        },
        _ => {}
    }
}

fn parse_reduced_motion(value: Option<&str>) -> bool {
    match value {
        Some(raw) => {
            let trimmed = raw.trim();
            trimmed == "1" || trimmed.eq_ignore_ascii_case("true")
        }
        None => false,
    }
}

/// Reads the window's current layout geometry for the surface configurator.
struct WindowMetrics {
    window: Arc<Window>,
}

impl DisplayMetrics for WindowMetrics {
    fn logical_size(&self) -> (f64, f64) {
        let logical = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        (logical.width, logical.height)
    }

    fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}

/// Maps the engine's tick requests onto winit redraws. Winit cannot revoke
/// a redraw once requested, so `cancel` only logs; the engine discards any
/// tick it no longer expects.
struct RedrawScheduler {
    window: Arc<Window>,
    next_handle: TickHandle,
}

impl TickScheduler for RedrawScheduler {
    fn schedule(&mut self) -> TickHandle {
        self.window.request_redraw();
        self.next_handle += 1;
        self.next_handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        tracing::trace!(handle, "redraw cannot be revoked; tick will be ignored");
    }
}
