use std::fmt;

use crate::render::{GraphicsContext, ShaderBuildError, ShaderStage};

use super::geometry::{COLORS, COMPONENTS, POSITIONS, VERTEX_COUNT};
use super::rotation::RotationState;

pub const VERTEX_SHADER: &str = include_str!("shaders/cube.vert.wgsl");
pub const FRAGMENT_SHADER: &str = include_str!("shaders/cube.frag.wgsl");

/// Why the cube could not be set up.
#[derive(Debug, Clone, PartialEq)]
pub enum CubeError {
    /// No graphics context was acquired.
    ContextUnavailable,
    Shader(ShaderBuildError),
    MissingAttribute(&'static str),
    MissingUniform(&'static str),
}

impl fmt::Display for CubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeError::ContextUnavailable => f.write_str("graphics context unavailable"),
            CubeError::Shader(_) => f.write_str("cube program could not be built"),
            CubeError::MissingAttribute(name) => {
                write!(f, "program has no vertex attribute `{name}`")
            }
            CubeError::MissingUniform(name) => write!(f, "program has no uniform `{name}`"),
        }
    }
}

impl std::error::Error for CubeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CubeError::Shader(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShaderBuildError> for CubeError {
    fn from(e: ShaderBuildError) -> Self {
        CubeError::Shader(e)
    }
}

/// Program handles resolved once after linking.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CubeBindings {
    pub position: u32,
    pub color: u32,
    pub rot: u32,
}

/// The spinning cube: two vertex buffers and one linked program.
///
/// Generic over the context's handle types so one renderer value can be driven
/// by a fresh context every frame. A value only exists after a successful
/// [`initialize`](Self::initialize).
pub struct CubeRenderer<P, B> {
    program: P,
    bindings: CubeBindings,
    // Kept alive for as long as the program reads from them.
    _positions: B,
    _colors: B,
}

impl<P, B> CubeRenderer<P, B> {
    /// Uploads the geometry and builds the program.
    ///
    /// `context` is `None` when no graphics context could be acquired; that
    /// fails with [`CubeError::ContextUnavailable`] before any device call.
    pub fn initialize<C>(context: Option<&mut C>) -> Result<Self, CubeError>
    where
        C: GraphicsContext<Program = P, Buffer = B>,
    {
        let ctx = context.ok_or(CubeError::ContextUnavailable)?;

        let positions = ctx.create_vertex_buffer("cube positions", &POSITIONS);
        let colors = ctx.create_vertex_buffer("cube colors", &COLORS);

        let vertex = ctx.compile_shader(ShaderStage::Vertex, VERTEX_SHADER)?;
        let fragment = ctx.compile_shader(ShaderStage::Fragment, FRAGMENT_SHADER)?;
        let mut program = ctx.link_program(&vertex, &fragment)?;

        let position = ctx
            .attribute_location(&program, "position")
            .ok_or(CubeError::MissingAttribute("position"))?;
        ctx.bind_attribute(&mut program, position, &positions, COMPONENTS);

        let color = ctx
            .attribute_location(&program, "color")
            .ok_or(CubeError::MissingAttribute("color"))?;
        ctx.bind_attribute(&mut program, color, &colors, COMPONENTS);

        let rot = ctx
            .uniform_location(&program, "rot")
            .ok_or(CubeError::MissingUniform("rot"))?;

        let bindings = CubeBindings {
            position,
            color,
            rot,
        };
        log::info!("cube initialized ({VERTEX_COUNT} vertices, {bindings:?})");

        Ok(Self {
            program,
            bindings,
            _positions: positions,
            _colors: colors,
        })
    }

    pub fn bindings(&self) -> CubeBindings {
        self.bindings
    }

    /// Advances `rotation`, uploads it to `rot` and draws the cube once.
    pub fn frame<C>(&mut self, ctx: &mut C, rotation: &mut RotationState)
    where
        C: GraphicsContext<Program = P, Buffer = B>,
    {
        rotation.advance();
        ctx.set_uniform_mat4(&self.program, self.bindings.rot, &rotation.to_cols_array());
        ctx.draw_triangles(&self.program, 0..VERTEX_COUNT);
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use super::*;
    use crate::render::shader::{self, CompiledShader, ProgramInterface};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        CreateBuffer { label: String, len: usize },
        Compile(ShaderStage),
        Link,
        BindAttribute { location: u32, buffer: usize, components: u32 },
        SetUniform { location: u32, value: [f32; 16] },
        Draw(Range<u32>),
    }

    /// Records every call; shaders go through the real naga compile/link.
    #[derive(Default)]
    struct RecordingContext {
        calls: Vec<Call>,
        buffers: Vec<Vec<f32>>,
        fragment_override: Option<&'static str>,
    }

    impl RecordingContext {
        fn draws(&self) -> Vec<Range<u32>> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Draw(r) => Some(r.clone()),
                    _ => None,
                })
                .collect()
        }

        fn last_uniform(&self) -> Option<[f32; 16]> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::SetUniform { value, .. } => Some(*value),
                _ => None,
            })
        }
    }

    impl GraphicsContext for RecordingContext {
        type Buffer = usize;
        type Shader = CompiledShader;
        type Program = ProgramInterface;

        fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> usize {
            self.calls.push(Call::CreateBuffer {
                label: label.to_string(),
                len: data.len(),
            });
            self.buffers.push(data.to_vec());
            self.buffers.len() - 1
        }

        fn compile_shader(
            &mut self,
            stage: ShaderStage,
            source: &str,
        ) -> Result<CompiledShader, ShaderBuildError> {
            self.calls.push(Call::Compile(stage));
            let source = match (stage, self.fragment_override) {
                (ShaderStage::Fragment, Some(src)) => src,
                _ => source,
            };
            shader::compile(stage, source)
        }

        fn link_program(
            &mut self,
            vertex: &CompiledShader,
            fragment: &CompiledShader,
        ) -> Result<ProgramInterface, ShaderBuildError> {
            self.calls.push(Call::Link);
            shader::link(vertex, fragment)
        }

        fn attribute_location(&self, program: &ProgramInterface, name: &str) -> Option<u32> {
            program.attribute_location(name)
        }

        fn uniform_location(&self, program: &ProgramInterface, name: &str) -> Option<u32> {
            program.uniform_location(name)
        }

        fn bind_attribute(
            &mut self,
            _program: &mut ProgramInterface,
            location: u32,
            buffer: &usize,
            components: u32,
        ) {
            self.calls.push(Call::BindAttribute {
                location,
                buffer: *buffer,
                components,
            });
        }

        fn set_uniform_mat4(&mut self, _program: &ProgramInterface, location: u32, value: &[f32; 16]) {
            self.calls.push(Call::SetUniform {
                location,
                value: *value,
            });
        }

        fn draw_triangles(&mut self, _program: &ProgramInterface, vertices: Range<u32>) {
            self.calls.push(Call::Draw(vertices));
        }
    }

    type TestRenderer = CubeRenderer<ProgramInterface, usize>;

    fn init(ctx: &mut RecordingContext) -> TestRenderer {
        CubeRenderer::initialize(Some(ctx)).expect("cube initializes")
    }

    #[test]
    fn missing_context_fails_before_any_call() {
        let result = TestRenderer::initialize(None::<&mut RecordingContext>);
        assert!(matches!(result, Err(CubeError::ContextUnavailable)));
    }

    #[test]
    fn initialize_runs_the_setup_sequence_in_order() {
        let mut ctx = RecordingContext::default();
        let cube = init(&mut ctx);

        assert_eq!(
            ctx.calls,
            vec![
                Call::CreateBuffer { label: "cube positions".into(), len: 54 },
                Call::CreateBuffer { label: "cube colors".into(), len: 54 },
                Call::Compile(ShaderStage::Vertex),
                Call::Compile(ShaderStage::Fragment),
                Call::Link,
                Call::BindAttribute { location: 0, buffer: 0, components: 3 },
                Call::BindAttribute { location: 1, buffer: 1, components: 3 },
            ]
        );
        assert_eq!(
            cube.bindings(),
            CubeBindings {
                position: 0,
                color: 1,
                rot: 0
            }
        );
    }

    #[test]
    fn uploaded_buffers_are_the_cube_data() {
        let mut ctx = RecordingContext::default();
        let _cube = init(&mut ctx);
        assert_eq!(ctx.buffers[0], POSITIONS.to_vec());
        assert_eq!(ctx.buffers[1], COLORS.to_vec());
    }

    #[test]
    fn embedded_shaders_expose_the_expected_names() {
        let vs = shader::compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
        let fs = shader::compile(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
        let iface = shader::link(&vs, &fs).unwrap();

        let names: Vec<_> = iface.inputs.iter().map(|i| (i.name.as_str(), i.location, i.format)).collect();
        assert_eq!(
            names,
            vec![
                ("position", 0, wgpu::VertexFormat::Float32x3),
                ("color", 1, wgpu::VertexFormat::Float32x3),
            ]
        );
        assert_eq!(iface.uniforms.len(), 1);
        assert_eq!(iface.uniforms[0].name, "rot");
        assert_eq!(iface.uniforms[0].size, 64);
    }

    #[test]
    fn each_frame_draws_once_over_all_vertices() {
        let mut ctx = RecordingContext::default();
        let mut cube = init(&mut ctx);
        let mut rotation = RotationState::new();
        ctx.calls.clear();

        cube.frame(&mut ctx, &mut rotation);
        assert_eq!(ctx.draws(), vec![0..18]);
        assert_eq!(ctx.calls.len(), 2);
        assert!(matches!(ctx.calls[0], Call::SetUniform { location: 0, .. }));

        for _ in 0..9 {
            cube.frame(&mut ctx, &mut rotation);
        }
        assert_eq!(ctx.draws().len(), 10);
        assert!(ctx.draws().iter().all(|r| *r == (0..18)));
    }

    #[test]
    fn uniform_tracks_the_rotation_state() {
        let mut ctx = RecordingContext::default();
        let mut cube = init(&mut ctx);
        let mut rotation = RotationState::new();

        let mut reference = RotationState::new();
        for _ in 0..25 {
            cube.frame(&mut ctx, &mut rotation);
            reference.advance();
        }

        assert_eq!(rotation.frames(), 25);
        assert_eq!(ctx.last_uniform(), Some(reference.to_cols_array()));
    }

    #[test]
    fn fragment_compile_error_stops_before_link() {
        let mut ctx = RecordingContext {
            fragment_override: Some("@fragment fn fs_main( {"),
            ..Default::default()
        };
        let err = match TestRenderer::initialize(Some(&mut ctx)) {
            Err(e) => e,
            Ok(_) => panic!("broken fragment shader must not initialize"),
        };

        match &err {
            CubeError::Shader(ShaderBuildError::Compile { stage, log }) => {
                assert_eq!(*stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!ctx.calls.contains(&Call::Link));
    }

    #[test]
    fn link_error_is_reported() {
        let mut ctx = RecordingContext {
            fragment_override: Some(
                "@fragment fn fs_main(@location(4) c: vec3<f32>) -> @location(0) vec4<f32> { return vec4<f32>(c, 1.0); }",
            ),
            ..Default::default()
        };
        let result = TestRenderer::initialize(Some(&mut ctx));
        assert!(matches!(result, Err(CubeError::Shader(ShaderBuildError::Link { .. }))));
    }

    #[test]
    fn errors_render_readably() {
        assert_eq!(CubeError::ContextUnavailable.to_string(), "graphics context unavailable");
        assert_eq!(
            CubeError::MissingUniform("rot").to_string(),
            "program has no uniform `rot`"
        );
    }
}
