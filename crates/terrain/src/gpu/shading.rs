//! Blinn-Phong shading of the generated terrain, plus the CPU reference
//! evaluator the lighting tests run against.

use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::error::TerrainError;
use crate::gpu::{uniform_entry, GpuTerrain, DEPTH_FORMAT};
use crate::layout::{RenderBufferSlot, TextureSlot, VertexAttribute};
use crate::uniforms::{Light, Material, MAX_LIGHTS, MAX_MATERIALS};

const SHADER: &str = include_str!("shaders/terrain_shade.wgsl");

/// Constant ambient factor applied to the textured diffuse color. Matches the
/// `AMBIENT_TERM` constant in the fragment shader.
pub const AMBIENT_TERM: f32 = 0.05;

/// Vec4-stride position/normal buffers, fetched as `Float32x3`.
const VEC4_STRIDE: u64 = 16;
const TEXCOORD_STRIDE: u64 = 8;

/// The terrain render pipeline: vertex fetch from the generated buffers,
/// per-fragment multi-light Blinn-Phong with a color texture.
pub struct ShadingPipeline {
    pipeline: wgpu::RenderPipeline,
    scene_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    lights_buffer: wgpu::Buffer,
    materials_buffer: wgpu::Buffer,
}

impl ShadingPipeline {
    pub fn new(
        device: &wgpu::Device,
        terrain: &GpuTerrain,
        color_format: wgpu::TextureFormat,
        color_texture: &wgpu::TextureView,
    ) -> Self {
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shading Lights"),
            contents: bytemuck::cast_slice(&[Light::disabled(); MAX_LIGHTS]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let materials_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shading Materials"),
            contents: bytemuck::cast_slice(
                &[Material::new(Vec3::ONE, Vec3::ZERO, 1.0); MAX_MATERIALS],
            ),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shading Scene"),
            entries: &[
                uniform_entry(
                    RenderBufferSlot::Uniforms.binding(),
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                ),
                uniform_entry(
                    RenderBufferSlot::Lights.binding(),
                    wgpu::ShaderStages::FRAGMENT,
                ),
                uniform_entry(
                    RenderBufferSlot::Materials.binding(),
                    wgpu::ShaderStages::FRAGMENT,
                ),
            ],
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shading Scene"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: RenderBufferSlot::Uniforms.binding(),
                    resource: terrain.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: RenderBufferSlot::Lights.binding(),
                    resource: lights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: RenderBufferSlot::Materials.binding(),
                    resource: materials_buffer.as_entire_binding(),
                },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shading Texture"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: TextureSlot::Color.binding(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: TextureSlot::ColorSampler.binding(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shading Color Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shading Texture"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TextureSlot::Color.binding(),
                    resource: wgpu::BindingResource::TextureView(color_texture),
                },
                wgpu::BindGroupEntry {
                    binding: TextureSlot::ColorSampler.binding(),
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shading Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Terrain Shading Layout"),
            bind_group_layouts: &[&scene_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: VEC4_STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: VertexAttribute::Position.location(),
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: VEC4_STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: VertexAttribute::Normal.location(),
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: TEXCOORD_STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: VertexAttribute::TexCoord.location(),
                }],
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Terrain Shading Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_terrain"),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_terrain"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
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
            pipeline,
            scene_bind_group,
            texture_bind_group,
            lights_buffer,
            materials_buffer,
        }
    }

    /// Upload the full lights array. Unused slots are padded with disabled
    /// lights so the device always sees all [`MAX_LIGHTS`] entries.
    pub fn write_lights(&self, queue: &wgpu::Queue, lights: &[Light]) -> Result<(), TerrainError> {
        if lights.len() > MAX_LIGHTS {
            return Err(TerrainError::TooManyLights {
                capacity: MAX_LIGHTS,
                actual: lights.len(),
            });
        }
        let mut frame = [Light::disabled(); MAX_LIGHTS];
        frame[..lights.len()].copy_from_slice(lights);
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&frame));
        Ok(())
    }

    /// Upload the materials array. The terrain surface samples entry 0.
    pub fn write_materials(
        &self,
        queue: &wgpu::Queue,
        materials: &[Material],
    ) -> Result<(), TerrainError> {
        if materials.len() > MAX_MATERIALS {
            return Err(TerrainError::TooManyMaterials {
                capacity: MAX_MATERIALS,
                actual: materials.len(),
            });
        }
        let mut frame = [Material::new(Vec3::ONE, Vec3::ZERO, 1.0); MAX_MATERIALS];
        frame[..materials.len()].copy_from_slice(materials);
        queue.write_buffer(&self.materials_buffer, 0, bytemuck::cast_slice(&frame));
        Ok(())
    }

    /// Draw the terrain. The pass must carry a color target in this
    /// pipeline's format and a [`DEPTH_FORMAT`] depth attachment.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, terrain: &GpuTerrain) {
        if terrain.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.scene_bind_group, &[]);
        pass.set_bind_group(1, &self.texture_bind_group, &[]);
        pass.set_vertex_buffer(
            RenderBufferSlot::MeshPositions.binding(),
            terrain.positions.slice(..),
        );
        pass.set_vertex_buffer(RenderBufferSlot::Normals.binding(), terrain.normals.slice(..));
        pass.set_vertex_buffer(
            RenderBufferSlot::MeshGenerics.binding(),
            terrain.texcoords.slice(..),
        );
        pass.set_index_buffer(terrain.indexes.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..terrain.index_count(), 0, 0..1);
    }
}

/// CPU mirror of the fragment shader's lighting math, in eye space.
///
/// `eye_normal` may be non-unit (it passes through the normal matrix on the
/// device); zero-length normals shade ambient-only. Disabled lights are
/// skipped outright.
pub fn evaluate_lighting(
    eye_position: Vec3,
    eye_normal: Vec3,
    base_color: Vec3,
    lights: &[Light],
    material: &Material,
) -> Vec3 {
    let base_color = base_color * Vec3::from_array(material.diffuse_color);

    let normal_length = eye_normal.length();
    if normal_length < 1e-6 {
        return base_color * AMBIENT_TERM;
    }
    let n = eye_normal / normal_length;
    let v = (-eye_position).normalize_or_zero();

    let mut color = base_color * AMBIENT_TERM;
    for light in lights {
        if !light.is_enabled() {
            continue;
        }
        let light_color = Vec3::from_array(light.color);
        let position = light.position;
        let l = if position[3] == 0.0 {
            Vec3::new(position[0], position[1], position[2]).normalize_or_zero()
        } else {
            (Vec3::new(position[0], position[1], position[2]) - eye_position).normalize_or_zero()
        };
        let h = (l + v).normalize_or_zero();
        let diffuse = n.dot(l).max(0.0) * light_color * base_color;
        let specular = n.dot(h).max(0.0).powf(material.specular_exponent)
            * light_color
            * Vec3::from_array(material.specular_color);
        color += diffuse + specular;
    }

    color.clamp(Vec3::ZERO, Vec3::ONE)
}
