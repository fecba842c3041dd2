//! The spinning cube.
//!
//! Lifecycle: [`CubeRenderer::initialize`] once, then [`CubeRenderer::frame`]
//! once per redraw with the same [`RotationState`]. The renderer has no
//! teardown; its buffers and program live as long as the process.

pub mod geometry;
mod renderer;
mod rotation;

pub use renderer::{CubeBindings, CubeError, CubeRenderer, FRAGMENT_SHADER, VERTEX_SHADER};
pub use rotation::{RotationState, ROTATION_STEP};

/// The cube driven through wgpu.
pub type GpuCubeRenderer = CubeRenderer<crate::render::GpuProgram, wgpu::Buffer>;
