//! Window + runtime loop.
//!
//! Owns the `winit` event loop and the single window, and acquires the GPU
//! context for it.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
