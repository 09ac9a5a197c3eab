//! Pluggable height-field sources feeding the generation pass.
//!
//! Each source owns an `r32float` texture the terrain displaces from. GPU
//! kernels ([`ZeroKernel`], [`RandomKernel`]) fill theirs with a compute
//! dispatch; [`DiamondSquare`] renders on the host and uploads.

mod diamond_square;

pub use diamond_square::{DiamondSquare, GridBox, GridSize, Point};

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use crate::gpu::{create_height_texture, dispatch_size};
use crate::layout::{GeneratorBufferSlot, GeneratorTextureSlot};
use crate::random::Prng;
use crate::uniforms::RandomUniforms;

const KERNEL_SHADER: &str = include_str!("../gpu/shaders/height_kernels.wgsl");

/// Edge length of the kernel-generated height textures.
pub const KERNEL_TEXTURE_SIZE: u32 = 512;

const TILE: u32 = 8;

/// A producer of the height-field texture consumed by terrain generation.
pub trait HeightMapSource {
    fn name(&self) -> &'static str;

    /// The texture the generation pass should read.
    fn out_texture(&self) -> &wgpu::Texture;
    fn out_view(&self) -> &wgpu::TextureView;

    /// Host-side work before encoding: refresh uniforms or upload CPU data.
    fn prepare(&mut self, queue: &wgpu::Queue);

    /// Encode the device-side work, if any.
    fn encode(&self, encoder: &mut wgpu::CommandEncoder);
}

/// Shared plumbing for compute-shader height sources: a pair of textures
/// (input and output sides, for sources that chain passes), the pipeline, and
/// the random-array binding.
struct Kernel {
    pipeline: wgpu::ComputePipeline,
    textures: [wgpu::Texture; 2],
    out_view: wgpu::TextureView,
    randoms_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    label: &'static str,
}

impl Kernel {
    fn new(device: &wgpu::Device, label: &'static str, entry: &'static str, randoms: &wgpu::Buffer) -> Self {
        let textures = [
            create_height_texture(device, KERNEL_TEXTURE_SIZE, KERNEL_TEXTURE_SIZE, label),
            create_height_texture(device, KERNEL_TEXTURE_SIZE, KERNEL_TEXTURE_SIZE, label),
        ];
        let in_view = textures[GeneratorTextureSlot::In.binding() as usize]
            .create_view(&wgpu::TextureViewDescriptor::default());
        let out_view = textures[GeneratorTextureSlot::Out.binding() as usize]
            .create_view(&wgpu::TextureViewDescriptor::default());

        let randoms_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[crate::gpu::storage_entry(
                GeneratorBufferSlot::Randoms.binding(),
                wgpu::ShaderStages::COMPUTE,
                true,
            )],
        });
        let randoms_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &randoms_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: GeneratorBufferSlot::Randoms.binding(),
                resource: randoms.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: GeneratorTextureSlot::In.binding(),
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: GeneratorTextureSlot::Out.binding(),
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::R32Float,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: GeneratorTextureSlot::In.binding(),
                    resource: wgpu::BindingResource::TextureView(&in_view),
                },
                wgpu::BindGroupEntry {
                    binding: GeneratorTextureSlot::Out.binding(),
                    resource: wgpu::BindingResource::TextureView(&out_view),
                },
            ],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Height Kernels Shader"),
            source: wgpu::ShaderSource::Wgsl(KERNEL_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&randoms_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(entry),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some(entry),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            pipeline,
            textures,
            out_view,
            randoms_bind_group,
            texture_bind_group,
            label,
        }
    }

    fn out_texture(&self) -> &wgpu::Texture {
        &self.textures[GeneratorTextureSlot::Out.binding() as usize]
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(self.label),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.randoms_bind_group, &[]);
        pass.set_bind_group(1, &self.texture_bind_group, &[]);
        let groups = dispatch_size(KERNEL_TEXTURE_SIZE, TILE);
        pass.dispatch_workgroups(groups, groups, 1);
    }
}

/// Writes zero to every texel: flat terrain.
pub struct ZeroKernel {
    kernel: Kernel,
}

impl ZeroKernel {
    pub fn new(device: &wgpu::Device) -> Self {
        let randoms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Zero Kernel Randoms"),
            contents: bytemuck::bytes_of(&RandomUniforms::zeroed()),
            usage: wgpu::BufferUsages::STORAGE,
        });
        Self {
            kernel: Kernel::new(device, "Zero Height Kernel", "zero_kernel", &randoms),
        }
    }
}

impl HeightMapSource for ZeroKernel {
    fn name(&self) -> &'static str {
        "Zero"
    }

    fn out_texture(&self) -> &wgpu::Texture {
        self.kernel.out_texture()
    }

    fn out_view(&self) -> &wgpu::TextureView {
        &self.kernel.out_view
    }

    fn prepare(&mut self, _queue: &wgpu::Queue) {}

    fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        self.kernel.encode(encoder);
    }
}

/// Hashes each texel index with the host-refreshed random array: independent
/// per-texel heights, rerolled every prepare.
pub struct RandomKernel {
    kernel: Kernel,
    randoms_buffer: wgpu::Buffer,
    randoms: RandomUniforms,
    prng: Prng,
}

impl RandomKernel {
    pub fn new(device: &wgpu::Device, seed: u32) -> Self {
        let randoms_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Random Kernel Randoms"),
            contents: bytemuck::bytes_of(&RandomUniforms::zeroed()),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            kernel: Kernel::new(device, "Random Height Kernel", "random_kernel", &randoms_buffer),
            randoms_buffer,
            randoms: RandomUniforms::zeroed(),
            prng: Prng::new(seed),
        }
    }
}

impl HeightMapSource for RandomKernel {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn out_texture(&self) -> &wgpu::Texture {
        self.kernel.out_texture()
    }

    fn out_view(&self) -> &wgpu::TextureView {
        &self.kernel.out_view
    }

    fn prepare(&mut self, queue: &wgpu::Queue) {
        self.randoms.refresh(&mut self.prng);
        queue.write_buffer(&self.randoms_buffer, 0, bytemuck::bytes_of(&self.randoms));
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        self.kernel.encode(encoder);
    }
}
