use anyhow::Result;
use winit::event::WindowEvent;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// What the runtime drives.
pub trait App {
    /// Called once after the window opens.
    ///
    /// `gpu` is `None` when no rendering context could be acquired. An error
    /// ends the run and is returned from [`Runtime::run`](crate::window::Runtime::run).
    fn on_init(&mut self, gpu: Option<&Gpu<'_>>) -> Result<()>;

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw. The runtime requests the next redraw afterwards.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
