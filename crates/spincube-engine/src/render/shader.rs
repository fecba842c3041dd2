//! CPU-side shader compile and link.
//!
//! WGSL stages are parsed and validated with `naga` before anything reaches
//! the device, so a bad shader fails with a readable log instead of a blank
//! frame. Linking checks the stage interface and reflects the names the
//! renderer looks up (`position`, `color`, `rot`) into numeric handles.

use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compile or link failure, with the diagnostic log.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderBuildError {
    Compile { stage: ShaderStage, log: String },
    Link { log: String },
}

impl ShaderBuildError {
    /// The diagnostic text.
    pub fn log(&self) -> &str {
        match self {
            ShaderBuildError::Compile { log, .. } | ShaderBuildError::Link { log } => log,
        }
    }

    fn compile(stage: ShaderStage, log: impl Into<String>) -> Self {
        ShaderBuildError::Compile {
            stage,
            log: log.into(),
        }
    }

    fn link(log: impl Into<String>) -> Self {
        ShaderBuildError::Link { log: log.into() }
    }
}

impl fmt::Display for ShaderBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderBuildError::Compile { stage, log } => {
                write!(f, "{stage} shader failed to compile:\n{log}")
            }
            ShaderBuildError::Link { log } => write!(f, "program failed to link: {log}"),
        }
    }
}

impl std::error::Error for ShaderBuildError {}

/// A validated single-stage shader unit.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub module: naga::Module,
}

/// A per-vertex input reflected from the vertex entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexInput {
    pub name: String,
    pub location: u32,
    pub format: wgpu::VertexFormat,
}

/// A uniform reflected from either stage.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSlot {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub size: u64,
    pub visibility: wgpu::ShaderStages,
}

/// Name tables of a linked program.
///
/// Attribute handles are shader `@location`s; uniform handles are indices
/// into `uniforms`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramInterface {
    pub inputs: Vec<VertexInput>,
    pub uniforms: Vec<UniformSlot>,
}

impl ProgramInterface {
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.inputs
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.location)
    }

    pub fn uniform_location(&self, name: &str) -> Option<u32> {
        self.uniforms
            .iter()
            .position(|u| u.name == name)
            .map(|i| i as u32)
    }

    pub fn input_at(&self, location: u32) -> Option<(usize, &VertexInput)> {
        self.inputs
            .iter()
            .enumerate()
            .find(|(_, i)| i.location == location)
    }
}

/// Parses and validates `source`, which must declare an entry point for `stage`.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledShader, ShaderBuildError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderBuildError::compile(stage, e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| ShaderBuildError::compile(stage, e.emit_to_string(source)))?;

    let mut entries = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == stage.to_naga());
    let entry = entries
        .next()
        .ok_or_else(|| ShaderBuildError::compile(stage, format!("no @{stage} entry point")))?;
    if entries.next().is_some() {
        return Err(ShaderBuildError::compile(
            stage,
            format!("more than one @{stage} entry point"),
        ));
    }
    let entry_point = entry.name.clone();

    Ok(CompiledShader {
        stage,
        entry_point,
        module,
    })
}

/// Checks that `vertex` feeds every input of `fragment` and reflects the
/// program's vertex inputs and uniforms.
pub fn link(
    vertex: &CompiledShader,
    fragment: &CompiledShader,
) -> Result<ProgramInterface, ShaderBuildError> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(ShaderBuildError::link("first unit is not a vertex shader"));
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err(ShaderBuildError::link("second unit is not a fragment shader"));
    }

    let vs_entry = entry_function(vertex)?;
    let fs_entry = entry_function(fragment)?;

    let outputs = match &vs_entry.result {
        Some(result) => located_values(&vertex.module, result.ty, result.binding.as_ref(), None),
        None => Vec::new(),
    };
    for arg in &fs_entry.arguments {
        let wanted = located_values(
            &fragment.module,
            arg.ty,
            arg.binding.as_ref(),
            arg.name.as_deref(),
        );
        for input in wanted {
            let Some(out) = outputs.iter().find(|o| o.location == input.location) else {
                return Err(ShaderBuildError::link(format!(
                    "fragment input `{}` at location {} is not written by the vertex stage",
                    input.name, input.location
                )));
            };
            if vertex.module.types[out.ty].inner != fragment.module.types[input.ty].inner {
                return Err(ShaderBuildError::link(format!(
                    "type mismatch at location {}: vertex `{}` vs fragment `{}`",
                    input.location, out.name, input.name
                )));
            }
        }
    }

    let mut inputs = Vec::new();
    for arg in &vs_entry.arguments {
        for value in located_values(&vertex.module, arg.ty, arg.binding.as_ref(), arg.name.as_deref()) {
            let format = vertex_format(&vertex.module.types[value.ty].inner).ok_or_else(|| {
                ShaderBuildError::link(format!(
                    "vertex input `{}` has a type that cannot be fed from a float buffer",
                    value.name
                ))
            })?;
            inputs.push(VertexInput {
                name: value.name,
                location: value.location,
                format,
            });
        }
    }
    inputs.sort_by_key(|i| i.location);

    let mut uniforms: Vec<UniformSlot> = Vec::new();
    for (unit, visibility) in [
        (vertex, wgpu::ShaderStages::VERTEX),
        (fragment, wgpu::ShaderStages::FRAGMENT),
    ] {
        if let Some(name) = unsupported_resource(&unit.module) {
            return Err(ShaderBuildError::link(format!(
                "{} resource `{name}` is not a uniform buffer; only uniforms can be bound",
                unit.stage
            )));
        }
        for slot in reflect_uniforms(&unit.module, visibility) {
            if let Some(other) = uniforms.iter().find(|u| {
                u.group == slot.group && u.binding == slot.binding && u.name != slot.name
            }) {
                return Err(ShaderBuildError::link(format!(
                    "uniforms `{}` and `{}` share @group({}) @binding({})",
                    other.name, slot.name, slot.group, slot.binding
                )));
            }
            match uniforms.iter_mut().find(|u| u.name == slot.name) {
                Some(existing) if existing.group == slot.group && existing.binding == slot.binding => {
                    existing.visibility |= slot.visibility;
                }
                Some(existing) => {
                    return Err(ShaderBuildError::link(format!(
                        "uniform `{}` bound at @group({}) @binding({}) and @group({}) @binding({})",
                        slot.name, existing.group, existing.binding, slot.group, slot.binding
                    )));
                }
                None => uniforms.push(slot),
            }
        }
    }

    Ok(ProgramInterface { inputs, uniforms })
}

fn entry_function(unit: &CompiledShader) -> Result<&naga::Function, ShaderBuildError> {
    unit.module
        .entry_points
        .iter()
        .find(|ep| ep.name == unit.entry_point)
        .map(|ep| &ep.function)
        .ok_or_else(|| {
            ShaderBuildError::link(format!("entry point `{}` is missing", unit.entry_point))
        })
}

struct LocatedValue {
    name: String,
    location: u32,
    ty: naga::Handle<naga::Type>,
}

/// Flattens an entry point argument or result into its `@location` values.
/// Struct members are visited one level deep; builtins are skipped.
fn located_values(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    name: Option<&str>,
) -> Vec<LocatedValue> {
    match binding {
        Some(naga::Binding::Location { location, .. }) => vec![LocatedValue {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            ty,
        }],
        Some(_) => Vec::new(),
        None => match &module.types[ty].inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|m| match m.binding {
                    Some(naga::Binding::Location { location, .. }) => Some(LocatedValue {
                        name: m.name.clone().unwrap_or_default(),
                        location,
                        ty: m.ty,
                    }),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
    }
}

fn vertex_format(inner: &naga::TypeInner) -> Option<wgpu::VertexFormat> {
    match *inner {
        naga::TypeInner::Scalar(naga::Scalar::F32) => Some(wgpu::VertexFormat::Float32),
        naga::TypeInner::Vector {
            size,
            scalar: naga::Scalar::F32,
        } => Some(match size {
            naga::VectorSize::Bi => wgpu::VertexFormat::Float32x2,
            naga::VectorSize::Tri => wgpu::VertexFormat::Float32x3,
            naga::VectorSize::Quad => wgpu::VertexFormat::Float32x4,
        }),
        _ => None,
    }
}

/// Name of the first bound global that is not in the uniform address space.
fn unsupported_resource(module: &naga::Module) -> Option<String> {
    module
        .global_variables
        .iter()
        .find(|(_, var)| var.binding.is_some() && var.space != naga::AddressSpace::Uniform)
        .map(|(_, var)| var.name.clone().unwrap_or_default())
}

fn reflect_uniforms(module: &naga::Module, visibility: wgpu::ShaderStages) -> Vec<UniformSlot> {
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let size = module.types[var.ty].inner.size(module.to_ctx());
            Some(UniformSlot {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                size: u64::from(size),
                visibility,
            })
        })
        .collect()
}
