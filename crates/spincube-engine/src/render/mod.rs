//! GPU rendering subsystem.
//!
//! Renderers talk to a [`GraphicsContext`] rather than to wgpu directly:
//! buffers, shader stages and programs are created through it, and program
//! names are resolved to numeric handles once after linking.
//! [`GpuContext`] is the wgpu-backed implementation.

mod context;
mod ctx;
mod gpu_context;
pub mod shader;

pub use context::GraphicsContext;
pub use ctx::{RenderCtx, RenderTarget};
pub use gpu_context::{GpuContext, GpuProgram, GpuShader};
pub use shader::{ShaderBuildError, ShaderStage};
