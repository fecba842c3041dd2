//! GPU context acquisition.
//!
//! Acquiring a [`Gpu`] is the one place a rendering context can be missing:
//! no adapter for the surface, no device, or no usable surface format. Callers
//! treat any failure from [`Gpu::new`] as "context unavailable".

mod config;
mod gpu;
mod surface;

pub use config::GpuConfig;
pub use gpu::{Gpu, GpuFrame};
pub use surface::SurfaceErrorAction;
