//! Contract between the runtime loop and the program it hosts.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
