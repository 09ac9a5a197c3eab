//! GPU-resident procedural terrain pipeline.
//!
//! A fixed sequence of compute and render passes over a height field:
//! 1. A pluggable height-field source ([`algorithms`]) fills an `r32float`
//!    texture, either on the GPU (zero/random kernels) or on the CPU
//!    (diamond-square), seeded through the deterministic [`random::Prng`].
//! 2. The terrain generator ([`gpu::GpuTerrain`]) displaces a grid mesh from
//!    that texture and derives per-face and per-vertex normals in separate
//!    dispatches.
//! 3. Downstream passes consume the generated buffers: a normal-line
//!    visualization ([`gpu::NormalLines`]) and a Blinn-Phong shading pass
//!    ([`gpu::ShadingPipeline`]).
//!
//! The binding slots ([`layout`]) and uniform records ([`uniforms`]) are the
//! binary contract between host and device; every buffer and `@binding`
//! number on the WGSL side comes from those definitions.

pub mod algorithms;
pub mod error;
pub mod gpu;
pub mod heightmap;
pub mod layout;
pub mod math;
pub mod mesh;
pub mod random;
pub mod uniforms;

pub use algorithms::{DiamondSquare, HeightMapSource, RandomKernel, ZeroKernel};
pub use error::TerrainError;
pub use gpu::{GpuContext, GpuTerrain, NormalLines, ShadingPipeline};
pub use heightmap::HeightMap;
pub use mesh::TerrainMesh;
pub use random::{Algorithm, Prng};
pub use uniforms::{
    Light, Material, NormalKindUniforms, NormalType, NormalUniforms, RandomUniforms, Uniforms,
    MAX_LIGHTS, MAX_MATERIALS, RANDOM_UNIFORM_COUNT,
};
