//! Per-pass uniform records exchanged between host and device.
//!
//! These are the binary contract: field order, padding, and the tightly
//! packed tail of [`Uniforms`] must match the WGSL struct declarations
//! byte-for-byte. All records are rewritten whole each frame (or on terrain
//! parameter change); nothing is partially updated.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, UVec2, Vec2, Vec3};

use crate::error::TerrainError;
use crate::math;
use crate::random::Prng;

/// Number of entries in the random array consumed by the generation kernels.
/// Host and device agree on this constant; the WGSL side declares
/// `array<u32, 41>`.
pub const RANDOM_UNIFORM_COUNT: usize = 41;

/// Fixed capacity of the per-frame lights array.
pub const MAX_LIGHTS: usize = 8;

/// Fixed capacity of the materials array. The terrain surface uses entry 0.
pub const MAX_MATERIALS: usize = 4;

/// Geometry uniforms shared by the generation, normal, and shading passes.
///
/// The normal matrix is the inverse-transpose of the model-view's upper 3x3
/// and is only ever written through [`Uniforms::set_model_view`]. The two
/// terrain fields at the tail are tightly packed (offsets 176 and 184): the
/// device declares them `vec2<f32>` / `vec2<u32>` directly after the
/// `mat3x3<f32>`, with no vec4 rounding.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub projection_matrix: [[f32; 4]; 4],
    pub model_view_matrix: [[f32; 4]; 4],
    /// Three 16-byte columns; a `mat3x3<f32>` on the device.
    pub normal_matrix: [[f32; 4]; 3],
    pub terrain_dimensions: [f32; 2],
    pub terrain_segments: [u32; 2],
}

impl Uniforms {
    pub fn new(dimensions: Vec2, segments: UVec2) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.set_projection(Mat4::IDENTITY);
        uniforms.set_model_view(Mat4::IDENTITY);
        uniforms.terrain_dimensions = dimensions.to_array();
        uniforms.terrain_segments = segments.to_array();
        uniforms
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection_matrix = projection.to_cols_array_2d();
    }

    /// Set the model-view matrix and rederive the normal matrix. The normal
    /// matrix is never independently mutable.
    pub fn set_model_view(&mut self, model_view: Mat4) {
        self.model_view_matrix = model_view.to_cols_array_2d();
        self.normal_matrix = math::normal_matrix_columns(model_view);
    }
}

/// A single light source. `position.w == 1` for point lights, `0` for
/// directional lights. Disabled lights occupy their slot but contribute
/// nothing; the fragment shader skips them.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Light {
    pub enabled: u32,
    pub _pad0: [u32; 3],
    pub position: [f32; 4],
    pub color: [f32; 3],
    pub _pad1: f32,
}

impl Light {
    pub fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            enabled: 1,
            _pad0: [0; 3],
            position: [position.x, position.y, position.z, 1.0],
            color: color.to_array(),
            _pad1: 0.0,
        }
    }

    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            enabled: 1,
            _pad0: [0; 3],
            position: [direction.x, direction.y, direction.z, 0.0],
            color: color.to_array(),
            _pad1: 0.0,
        }
    }

    pub fn disabled() -> Self {
        Self::zeroed()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != 0
    }
}

/// Blinn-Phong material parameters for one surface.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Material {
    pub diffuse_color: [f32; 3],
    pub _pad0: f32,
    pub specular_color: [f32; 3],
    pub specular_exponent: f32,
}

impl Material {
    pub fn new(diffuse: Vec3, specular: Vec3, specular_exponent: f32) -> Self {
        Self {
            diffuse_color: diffuse.to_array(),
            _pad0: 0.0,
            specular_color: specular.to_array(),
            specular_exponent,
        }
    }
}

/// Which set of generated normals the visualization pass draws.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NormalType {
    Vertex = 1,
    Face = 2,
}

impl TryFrom<u32> for NormalType {
    type Error = TerrainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(NormalType::Vertex),
            2 => Ok(NormalType::Face),
            other => Err(TerrainError::InvalidNormalType(other)),
        }
    }
}

/// Display colors for the normal visualization pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct NormalUniforms {
    pub vertex_normal_color: [f32; 3],
    pub _pad0: f32,
    pub face_normal_color: [f32; 3],
    pub _pad1: f32,
}

impl Default for NormalUniforms {
    fn default() -> Self {
        Self {
            vertex_normal_color: [1.0, 0.0, 0.0],
            _pad0: 0.0,
            face_normal_color: [0.0, 1.0, 1.0],
            _pad1: 0.0,
        }
    }
}

/// Selector and line length for the normal visualization pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct NormalKindUniforms {
    pub kind: u32,
    pub scale: f32,
    pub _pad: [u32; 2],
}

impl NormalKindUniforms {
    pub fn new(kind: NormalType, scale: f32) -> Self {
        Self {
            kind: kind as u32,
            scale,
            _pad: [0; 2],
        }
    }
}

/// The random array consumed by the random height kernel, refreshed from a
/// [`Prng`] before each generation pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RandomUniforms {
    pub randoms: [u32; RANDOM_UNIFORM_COUNT],
}

impl RandomUniforms {
    pub fn refresh(&mut self, prng: &mut Prng) {
        prng.refill(&mut self.randoms);
    }
}
