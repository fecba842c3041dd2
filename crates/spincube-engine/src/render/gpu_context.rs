use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;

use wgpu::util::DeviceExt;

use super::context::GraphicsContext;
use super::ctx::{RenderCtx, RenderTarget};
use super::shader::{self, CompiledShader, ProgramInterface, ShaderBuildError, ShaderStage};

/// A compiled stage: the validated naga module plus its device-side module.
pub struct GpuShader {
    compiled: CompiledShader,
    module: wgpu::ShaderModule,
}

/// A linked program.
///
/// Besides the pipeline it owns one uniform buffer per reflected uniform and
/// remembers which vertex buffer feeds each input slot.
pub struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    interface: ProgramInterface,
    uniform_buffers: Vec<wgpu::Buffer>,
    bind_groups: Vec<wgpu::BindGroup>,
    vertex_buffers: Vec<Option<wgpu::Buffer>>,
}

/// [`GraphicsContext`] backed by wgpu.
///
/// Build one with [`GpuContext::new`] for setup work and with
/// [`GpuContext::with_target`] inside a frame; only the latter can draw.
pub struct GpuContext<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    target: Option<(&'a mut wgpu::CommandEncoder, &'a wgpu::TextureView)>,
}

impl<'a> GpuContext<'a> {
    pub fn new(ctx: &RenderCtx<'a>) -> Self {
        Self {
            device: ctx.device,
            queue: ctx.queue,
            surface_format: ctx.surface_format,
            target: None,
        }
    }

    pub fn with_target(ctx: &RenderCtx<'a>, target: &'a mut RenderTarget<'_>) -> Self {
        Self {
            target: Some((&mut *target.encoder, target.color_view)),
            ..Self::new(ctx)
        }
    }
}

impl GraphicsContext for GpuContext<'_> {
    type Buffer = wgpu::Buffer;
    type Shader = GpuShader;
    type Program = GpuProgram;

    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<GpuShader, ShaderBuildError> {
        let compiled = shader::compile(stage, source)?;
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "spincube vertex shader",
                    ShaderStage::Fragment => "spincube fragment shader",
                }),
                source: wgpu::ShaderSource::Naga(Cow::Owned(compiled.module.clone())),
            });
        Ok(GpuShader { compiled, module })
    }

    fn link_program(
        &mut self,
        vertex: &GpuShader,
        fragment: &GpuShader,
    ) -> Result<GpuProgram, ShaderBuildError> {
        let interface = shader::link(&vertex.compiled, &fragment.compiled)?;

        // Pipeline layouts need every group index up to the highest one used.
        let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, u) in interface.uniforms.iter().enumerate() {
            groups.entry(u.group).or_default().push(i);
        }
        let group_count = groups.keys().next_back().map_or(0, |g| g + 1);

        let uniform_buffers: Vec<wgpu::Buffer> = interface
            .uniforms
            .iter()
            .map(|u| {
                self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(u.name.as_str()),
                    size: u.size,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let mut layouts = Vec::with_capacity(group_count as usize);
        let mut bind_groups = Vec::with_capacity(group_count as usize);
        for group in 0..group_count {
            let members = groups.get(&group).map(Vec::as_slice).unwrap_or(&[]);

            let entries: Vec<wgpu::BindGroupLayoutEntry> = members
                .iter()
                .map(|&i| {
                    let u = &interface.uniforms[i];
                    wgpu::BindGroupLayoutEntry {
                        binding: u.binding,
                        visibility: u.visibility,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(u.size),
                        },
                        count: None,
                    }
                })
                .collect();
            let layout = self
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("spincube uniforms bgl"),
                    entries: &entries,
                });

            let bindings: Vec<wgpu::BindGroupEntry> = members
                .iter()
                .map(|&i| wgpu::BindGroupEntry {
                    binding: interface.uniforms[i].binding,
                    resource: uniform_buffers[i].as_entire_binding(),
                })
                .collect();
            bind_groups.push(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("spincube uniforms bind group"),
                layout: &layout,
                entries: &bindings,
            }));
            layouts.push(layout);
        }
        let layout_refs: Vec<&wgpu::BindGroupLayout> = layouts.iter().collect();

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("spincube pipeline layout"),
                bind_group_layouts: &layout_refs,
                immediate_size: 0,
            });

        // One tightly packed buffer per attribute, in location order.
        let attributes: Vec<[wgpu::VertexAttribute; 1]> = interface
            .inputs
            .iter()
            .map(|input| {
                [wgpu::VertexAttribute {
                    format: input.format,
                    offset: 0,
                    shader_location: input.location,
                }]
            })
            .collect();
        let buffer_layouts: Vec<wgpu::VertexBufferLayout<'_>> = interface
            .inputs
            .iter()
            .zip(&attributes)
            .map(|(input, attrs)| wgpu::VertexBufferLayout {
                array_stride: input.format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("spincube pipeline"),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(vertex.compiled.entry_point.as_str()),
                    compilation_options: Default::default(),
                    buffers: &buffer_layouts,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(fragment.compiled.entry_point.as_str()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                // No culling and no depth test: faces land in submission order.
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let slots = interface.inputs.len();
        Ok(GpuProgram {
            pipeline,
            interface,
            uniform_buffers,
            bind_groups,
            vertex_buffers: vec![None; slots],
        })
    }

    fn attribute_location(&self, program: &GpuProgram, name: &str) -> Option<u32> {
        program.interface.attribute_location(name)
    }

    fn uniform_location(&self, program: &GpuProgram, name: &str) -> Option<u32> {
        program.interface.uniform_location(name)
    }

    fn bind_attribute(
        &mut self,
        program: &mut GpuProgram,
        location: u32,
        buffer: &wgpu::Buffer,
        components: u32,
    ) {
        let Some((slot, input)) = program.interface.input_at(location) else {
            log::warn!("no vertex input at location {location}; binding ignored");
            return;
        };
        // Reflected inputs are all f32-based.
        if input.format.size() / 4 != u64::from(components) {
            log::warn!(
                "attribute `{}` expects {:?} but is bound with {components} components",
                input.name,
                input.format
            );
        }
        program.vertex_buffers[slot] = Some(buffer.clone());
    }

    fn set_uniform_mat4(&mut self, program: &GpuProgram, location: u32, value: &[f32; 16]) {
        let Some(buffer) = program.uniform_buffers.get(location as usize) else {
            log::warn!("no uniform with handle {location}; write ignored");
            return;
        };
        self.queue.write_buffer(buffer, 0, bytemuck::bytes_of(value));
    }

    fn draw_triangles(&mut self, program: &GpuProgram, vertices: Range<u32>) {
        let Some((encoder, view)) = self.target.as_mut() else {
            log::warn!("draw issued outside of a frame; skipped");
            return;
        };
        if let Some(slot) = program.vertex_buffers.iter().position(Option::is_none) {
            log::warn!(
                "vertex input `{}` has no buffer bound; draw skipped",
                program.interface.inputs[slot].name
            );
            return;
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("spincube pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: *view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&program.pipeline);
        for (group, bind_group) in program.bind_groups.iter().enumerate() {
            rpass.set_bind_group(group as u32, bind_group, &[]);
        }
        for (slot, buffer) in program.vertex_buffers.iter().flatten().enumerate() {
            rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
        rpass.draw(vertices, 0..1);
    }
}
