use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuConfig};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "spincube".to_string(),
            initial_size: LogicalSize::new(800.0, 800.0),
        }
    }
}

/// Hosts one [`App`] in one window, redrawing continuously until the window
/// closes or the app asks to exit.
pub struct Runtime;

impl Runtime {
    /// Runs the event loop to completion.
    ///
    /// Returns the error that ended the run, if any: a failed context
    /// acquisition or an `Err` from [`App::on_init`].
    pub fn run<A>(config: RuntimeConfig, gpu_config: GpuConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create the event loop")?;
        let mut state = AppState::new(config, gpu_config, app);

        event_loop
            .run_app(&mut state)
            .context("event loop terminated with an error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_config: GpuConfig,
    app: A,

    entry: Option<WindowEntry>,
    started: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_config: GpuConfig, app: A) -> Self {
        Self {
            config,
            gpu_config,
            app,
            entry: None,
            started: false,
            fatal: None,
        }
    }

    /// Opens the window, acquires the context, and hands it to the app.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_config = self.gpu_config.clone();
        let built = WindowEntryTryBuilder {
            clock: FrameClock::new(),
            window,
            gpu_builder: |w: &Window| pollster::block_on(Gpu::new(w, gpu_config)),
        }
        .try_build();

        match built {
            Ok(entry) => {
                entry.with_gpu(|gpu| self.app.on_init(Some(gpu)))?;
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
                Ok(())
            }
            Err(acquire_err) => {
                log::error!("no rendering context: {acquire_err:#}");
                self.app.on_init(None)?;
                Err(acquire_err.context("rendering context unavailable"))
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.entry = None;
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;
        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (app, slot) = (&mut self.app, &mut self.entry);
        let Some(entry) = slot.as_mut() else {
            return;
        };

        if app.on_window_event(&event) == AppControl::Exit {
            *slot = None;
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                *slot = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
            }

            WindowEvent::RedrawRequested => {
                let control = entry.with_mut(|fields| {
                    let mut ctx = FrameCtx {
                        window: fields.window,
                        gpu: fields.gpu,
                        time: fields.clock.tick(),
                    };
                    app.on_frame(&mut ctx)
                });

                match control {
                    // Same role as requestAnimationFrame: schedule the next frame.
                    AppControl::Continue => entry.with_window(|w| w.request_redraw()),
                    AppControl::Exit => {
                        *slot = None;
                        event_loop.exit();
                    }
                }
            }

            _ => {}
        }
    }
}
