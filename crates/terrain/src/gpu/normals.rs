//! Normal visualization: expands generated normals into a line list on the
//! device and draws it with a per-kind color.

use wgpu::util::DeviceExt;

use crate::gpu::{dispatch_size, storage_entry, uniform_entry, GpuTerrain, DEPTH_FORMAT};
use crate::layout::NormalBufferSlot;
use crate::uniforms::{NormalKindUniforms, NormalType, NormalUniforms};

const SHADER: &str = include_str!("shaders/normal_lines.wgsl");

const LINE_GROUP: u32 = 64;
/// Bytes per line endpoint (vec4<f32> stride).
const ENDPOINT_STRIDE: u64 = 16;

/// Line-list visualization of the terrain's vertex or face normals.
///
/// The compute kernel is stateless per invocation: each anchor produces
/// exactly its two endpoints, so the pass is re-encoded whenever the terrain
/// regenerates or the kind selector changes, and never needs partial updates.
pub struct NormalLines {
    kind: NormalType,
    vertex_anchor_count: u32,
    face_anchor_count: u32,

    pub line_buffer: wgpu::Buffer,
    kind_buffer: wgpu::Buffer,
    normal_uniform_buffer: wgpu::Buffer,

    vertex_bind_group: wgpu::BindGroup,
    face_bind_group: wgpu::BindGroup,
    render_bind_group: wgpu::BindGroup,

    compute_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,
}

impl NormalLines {
    pub fn new(
        device: &wgpu::Device,
        terrain: &GpuTerrain,
        color_format: wgpu::TextureFormat,
        kind: NormalType,
        scale: f32,
    ) -> Self {
        let vertex_anchor_count = terrain.vertex_count();
        let face_anchor_count = terrain.face_count();
        let capacity = 2 * u64::from(vertex_anchor_count.max(face_anchor_count).max(1));

        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Normal Lines"),
            size: capacity * ENDPOINT_STRIDE,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let kind_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Normal Kind Uniforms"),
            contents: bytemuck::bytes_of(&NormalKindUniforms::new(kind, scale)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let normal_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Normal Color Uniforms"),
            contents: bytemuck::bytes_of(&NormalUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let compute = wgpu::ShaderStages::COMPUTE;
        let compute_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Normal Lines Compute"),
            entries: &[
                storage_entry(NormalBufferSlot::Points.binding(), compute, true),
                storage_entry(NormalBufferSlot::Normals.binding(), compute, true),
                storage_entry(NormalBufferSlot::Lines.binding(), compute, false),
                uniform_entry(NormalBufferSlot::Kind.binding(), compute),
            ],
        });

        // The host swaps anchor sources per kind: positions + vertex normals,
        // or face midpoints + face normals.
        let anchor_bind_group = |label, points: &wgpu::Buffer, normals: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &compute_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: NormalBufferSlot::Points.binding(),
                        resource: points.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: NormalBufferSlot::Normals.binding(),
                        resource: normals.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: NormalBufferSlot::Lines.binding(),
                        resource: line_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: NormalBufferSlot::Kind.binding(),
                        resource: kind_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let vertex_bind_group =
            anchor_bind_group("Vertex Normal Anchors", &terrain.positions, &terrain.normals);
        let face_bind_group = anchor_bind_group(
            "Face Normal Anchors",
            &terrain.face_midpoints,
            &terrain.face_normals,
        );

        let render_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Normal Lines Render"),
            entries: &[
                uniform_entry(
                    NormalBufferSlot::GeometryUniforms.binding(),
                    wgpu::ShaderStages::VERTEX,
                ),
                uniform_entry(
                    NormalBufferSlot::NormalUniforms.binding(),
                    wgpu::ShaderStages::FRAGMENT,
                ),
                uniform_entry(
                    NormalBufferSlot::Kind.binding(),
                    wgpu::ShaderStages::FRAGMENT,
                ),
            ],
        });
        let render_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Normal Lines Render"),
            layout: &render_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: NormalBufferSlot::GeometryUniforms.binding(),
                    resource: terrain.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: NormalBufferSlot::NormalUniforms.binding(),
                    resource: normal_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: NormalBufferSlot::Kind.binding(),
                    resource: kind_buffer.as_entire_binding(),
                },
            ],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Normal Lines Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let compute_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Normal Lines Compute Layout"),
                bind_group_layouts: &[&compute_layout],
                push_constant_ranges: &[],
            });
        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("update_normal_lines"),
            layout: Some(&compute_pipeline_layout),
            module: &module,
            entry_point: Some("update_normal_lines"),
            compilation_options: Default::default(),
            cache: None,
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Normal Lines Render Layout"),
                bind_group_layouts: &[&render_layout],
                push_constant_ranges: &[],
            });
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Normal Lines Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: ENDPOINT_STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            kind,
            vertex_anchor_count,
            face_anchor_count,
            line_buffer,
            kind_buffer,
            normal_uniform_buffer,
            vertex_bind_group,
            face_bind_group,
            render_bind_group,
            compute_pipeline,
            render_pipeline,
        }
    }

    pub fn kind(&self) -> NormalType {
        self.kind
    }

    fn anchor_count(&self) -> u32 {
        match self.kind {
            NormalType::Vertex => self.vertex_anchor_count,
            NormalType::Face => self.face_anchor_count,
        }
    }

    /// Select which normals to draw and how long the lines are. Rewrites the
    /// kind uniform whole.
    pub fn set_kind(&mut self, queue: &wgpu::Queue, kind: NormalType, scale: f32) {
        self.kind = kind;
        let uniforms = NormalKindUniforms::new(kind, scale);
        queue.write_buffer(&self.kind_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn set_colors(&self, queue: &wgpu::Queue, colors: &NormalUniforms) {
        queue.write_buffer(&self.normal_uniform_buffer, 0, bytemuck::bytes_of(colors));
    }

    /// Encode the line-expansion dispatch for the current kind.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let count = self.anchor_count();
        if count == 0 {
            return;
        }
        let bind_group = match self.kind {
            NormalType::Vertex => &self.vertex_bind_group,
            NormalType::Face => &self.face_bind_group,
        };
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Normal Lines"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.compute_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(dispatch_size(count, LINE_GROUP), 1, 1);
    }

    /// Draw the expanded line list. The render pass must carry a color target
    /// in this pipeline's format and a [`DEPTH_FORMAT`] depth attachment.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let count = self.anchor_count();
        if count == 0 {
            return;
        }
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, &self.render_bind_group, &[]);
        pass.set_vertex_buffer(0, self.line_buffer.slice(..));
        pass.draw(0..2 * count, 0..1);
    }
}
