use std::ops::Range;

use super::shader::{ShaderBuildError, ShaderStage};

/// Device operations a renderer issues against a graphics context.
///
/// Modeled on the classic buffer / shader / program call sequence. Handles are
/// opaque to the caller; names are resolved to numeric locations once after
/// linking and reused every frame.
pub trait GraphicsContext {
    type Buffer;
    type Shader;
    type Program;

    /// Uploads `data` into a new immutable vertex buffer.
    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> Self::Buffer;

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, ShaderBuildError>;

    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<Self::Program, ShaderBuildError>;

    /// Location of a vertex input, or `None` if the program has no such input.
    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    /// Handle of a uniform, or `None` if the program has no such uniform.
    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    /// Feeds the attribute at `location` from `buffer`, `components` floats per
    /// vertex, tightly packed.
    fn bind_attribute(
        &mut self,
        program: &mut Self::Program,
        location: u32,
        buffer: &Self::Buffer,
        components: u32,
    );

    /// Writes a column-major 4x4 matrix.
    fn set_uniform_mat4(&mut self, program: &Self::Program, location: u32, value: &[f32; 16]);

    /// Draws `vertices` as a triangle list.
    fn draw_triangles(&mut self, program: &Self::Program, vertices: Range<u32>);
}
