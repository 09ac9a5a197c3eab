//! GPU-resident terrain generation: owns the generated mesh buffers and the
//! four compute pipelines that fill them from a height-field texture.

use glam::{UVec2, Vec2};
use wgpu::util::DeviceExt;

use crate::gpu::{dispatch_size, storage_entry, uniform_entry};
use crate::layout::{GeneratorBufferSlot, GeneratorTextureSlot};
use crate::mesh::TerrainMesh;
use crate::uniforms::Uniforms;

const GENERATE_SHADER: &str = include_str!("shaders/terrain_generate.wgsl");
const NORMALS_SHADER: &str = include_str!("shaders/terrain_normals.wgsl");

/// Workgroup edge for the 2D per-vertex and per-cell kernels.
const TILE: u32 = 8;
/// Workgroup size for the 1D per-face kernel.
const FACE_GROUP: u32 = 64;

/// The generated terrain on the device.
///
/// Six storage buffers hold the mesh (positions, texcoords, indexes, vertex
/// normals, face normals, face midpoints); four compute dispatches regenerate
/// them whole whenever the height field or the terrain parameters change.
/// Each kernel runs in its own compute pass, so later kernels always see the
/// completed writes of earlier ones.
pub struct GpuTerrain {
    dimensions: Vec2,
    segments: UVec2,
    vertex_count: u32,
    face_count: u32,

    pub positions: wgpu::Buffer,
    pub texcoords: wgpu::Buffer,
    pub indexes: wgpu::Buffer,
    pub normals: wgpu::Buffer,
    pub face_normals: wgpu::Buffer,
    pub face_midpoints: wgpu::Buffer,
    pub uniform_buffer: wgpu::Buffer,

    buffer_bind_group: wgpu::BindGroup,
    height_layout: wgpu::BindGroupLayout,
    height_bind_group: wgpu::BindGroup,

    heights_pipeline: wgpu::ComputePipeline,
    indexes_pipeline: wgpu::ComputePipeline,
    face_normals_pipeline: wgpu::ComputePipeline,
    vertex_normals_pipeline: wgpu::ComputePipeline,
}

impl GpuTerrain {
    pub fn new(
        device: &wgpu::Device,
        dimensions: Vec2,
        segments: UVec2,
        height_field: &wgpu::TextureView,
    ) -> Self {
        let mesh = TerrainMesh::new(dimensions, segments);
        let vertex_count = mesh.vertex_count() as u32;
        let face_count = mesh.face_count() as u32;

        let mesh_usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::VERTEX
            | wgpu::BufferUsages::COPY_SRC;

        let positions = init_buffer(device, "Terrain Positions", &mesh.positions, mesh_usage);
        let texcoords = init_buffer(device, "Terrain Texcoords", &mesh.texcoords, mesh_usage);
        let indexes = init_buffer(
            device,
            "Terrain Indexes",
            &mesh.indices,
            wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::INDEX
                | wgpu::BufferUsages::COPY_SRC,
        );
        let normals = init_buffer(device, "Terrain Normals", &mesh.vertex_normals, mesh_usage);
        let face_normals = init_buffer(
            device,
            "Terrain Face Normals",
            &mesh.face_normals,
            mesh_usage,
        );
        let face_midpoints = init_buffer(
            device,
            "Terrain Face Midpoints",
            &mesh.face_midpoints,
            mesh_usage,
        );

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Uniforms"),
            contents: bytemuck::bytes_of(&Uniforms::new(dimensions, segments)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let compute = wgpu::ShaderStages::COMPUTE;
        let buffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Terrain Generator Buffers"),
            entries: &[
                storage_entry(GeneratorBufferSlot::MeshPositions.binding(), compute, false),
                storage_entry(GeneratorBufferSlot::TexCoords.binding(), compute, false),
                storage_entry(GeneratorBufferSlot::Indexes.binding(), compute, false),
                storage_entry(GeneratorBufferSlot::Normals.binding(), compute, false),
                storage_entry(GeneratorBufferSlot::FaceNormals.binding(), compute, false),
                storage_entry(GeneratorBufferSlot::FaceMidpoints.binding(), compute, false),
                uniform_entry(GeneratorBufferSlot::Uniforms.binding(), compute),
            ],
        });
        let buffer_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Terrain Generator Buffers"),
            layout: &buffer_layout,
            entries: &[
                buffer_entry(GeneratorBufferSlot::MeshPositions, &positions),
                buffer_entry(GeneratorBufferSlot::TexCoords, &texcoords),
                buffer_entry(GeneratorBufferSlot::Indexes, &indexes),
                buffer_entry(GeneratorBufferSlot::Normals, &normals),
                buffer_entry(GeneratorBufferSlot::FaceNormals, &face_normals),
                buffer_entry(GeneratorBufferSlot::FaceMidpoints, &face_midpoints),
                buffer_entry(GeneratorBufferSlot::Uniforms, &uniform_buffer),
            ],
        });

        let height_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Terrain Height Field"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: GeneratorTextureSlot::In.binding(),
                visibility: compute,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });
        let height_bind_group = create_height_bind_group(device, &height_layout, height_field);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Terrain Generator Layout"),
            bind_group_layouts: &[&buffer_layout, &height_layout],
            push_constant_ranges: &[],
        });

        let generate_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Generate Shader"),
            source: wgpu::ShaderSource::Wgsl(GENERATE_SHADER.into()),
        });
        let normals_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Normals Shader"),
            source: wgpu::ShaderSource::Wgsl(NORMALS_SHADER.into()),
        });

        let pipeline = |module: &wgpu::ShaderModule, entry: &'static str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(entry),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        Self {
            dimensions,
            segments,
            vertex_count,
            face_count,
            positions,
            texcoords,
            indexes,
            normals,
            face_normals,
            face_midpoints,
            uniform_buffer,
            buffer_bind_group,
            height_layout,
            height_bind_group,
            heights_pipeline: pipeline(&generate_module, "update_heights"),
            indexes_pipeline: pipeline(&generate_module, "update_indexes"),
            face_normals_pipeline: pipeline(&normals_module, "update_face_normals"),
            vertex_normals_pipeline: pipeline(&normals_module, "update_vertex_normals"),
        }
    }

    pub fn dimensions(&self) -> Vec2 {
        self.dimensions
    }

    pub fn segments(&self) -> UVec2 {
        self.segments
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    pub fn index_count(&self) -> u32 {
        3 * self.face_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Point the generation pass at a different height-field texture.
    pub fn set_height_field(&mut self, device: &wgpu::Device, height_field: &wgpu::TextureView) {
        self.height_bind_group = create_height_bind_group(device, &self.height_layout, height_field);
    }

    /// Upload a complete uniform snapshot. The terrain fields are forced to
    /// this instance's parameters so the device never sees a mixed record.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &Uniforms) {
        let mut snapshot = *uniforms;
        snapshot.terrain_dimensions = self.dimensions.to_array();
        snapshot.terrain_segments = self.segments.to_array();
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&snapshot));
    }

    /// Encode the full regeneration: heights, indexes, face normals, vertex
    /// normals. One pass per kernel; pass boundaries are the barriers between
    /// producer and consumer. Zero segments encode nothing.
    pub fn encode_generate(&self, encoder: &mut wgpu::CommandEncoder) {
        if self.is_empty() {
            log::debug!("terrain is empty; skipping generation dispatches");
            return;
        }

        let vertex_groups = (
            dispatch_size(self.segments.x + 1, TILE),
            dispatch_size(self.segments.y + 1, TILE),
        );
        let cell_groups = (
            dispatch_size(self.segments.x, TILE),
            dispatch_size(self.segments.y, TILE),
        );

        self.run_pass(encoder, "Terrain Heights", &self.heights_pipeline, |pass| {
            pass.dispatch_workgroups(vertex_groups.0, vertex_groups.1, 1);
        });
        self.run_pass(encoder, "Terrain Indexes", &self.indexes_pipeline, |pass| {
            pass.dispatch_workgroups(cell_groups.0, cell_groups.1, 1);
        });
        self.run_pass(
            encoder,
            "Terrain Face Normals",
            &self.face_normals_pipeline,
            |pass| {
                pass.dispatch_workgroups(dispatch_size(self.face_count, FACE_GROUP), 1, 1);
            },
        );
        self.run_pass(
            encoder,
            "Terrain Vertex Normals",
            &self.vertex_normals_pipeline,
            |pass| {
                pass.dispatch_workgroups(vertex_groups.0, vertex_groups.1, 1);
            },
        );
    }

    fn run_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::ComputePipeline,
        dispatch: impl FnOnce(&mut wgpu::ComputePass),
    ) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(label),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.buffer_bind_group, &[]);
        pass.set_bind_group(1, &self.height_bind_group, &[]);
        dispatch(&mut pass);
    }
}

/// Initialize a storage buffer from host data, with a one-element zeroed
/// floor so empty meshes still yield bindable buffers.
fn init_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    contents: &[T],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    let zeroed = [T::zeroed()];
    let contents = if contents.is_empty() {
        bytemuck::cast_slice(&zeroed)
    } else {
        bytemuck::cast_slice(contents)
    };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage,
    })
}

fn buffer_entry(slot: GeneratorBufferSlot, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding: slot.binding(),
        resource: buffer.as_entire_binding(),
    }
}

fn create_height_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    height_field: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Terrain Height Field"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: GeneratorTextureSlot::In.binding(),
            resource: wgpu::BindingResource::TextureView(height_field),
        }],
    })
}
