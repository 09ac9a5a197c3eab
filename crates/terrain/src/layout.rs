//! Binding slot contract shared by the host and the WGSL shaders.
//!
//! Three pipeline stages, each with its own numbering space. The numeric
//! values are the wire contract: they are the `@binding` indices (and vertex
//! buffer/attribute slots) the shaders declare, so they are stable within a
//! pipeline version and never reused for a different role.

/// Render-pass buffer slots (vertex buffers 0..=3, bind group 0 bindings 4..=6).
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderBufferSlot {
    MeshPositions = 0,
    Normals = 1,
    MeshGenerics = 2,
    FaceNormals = 3,
    Uniforms = 4,
    Lights = 5,
    Materials = 6,
}

/// Vertex-fetch attribute locations for the shading pass.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VertexAttribute {
    Position = 0,
    Normal = 1,
    TexCoord = 2,
}

/// Texture bindings for the shading pass. The color texture's sampler sits at
/// the next binding; wgpu binds samplers explicitly where Metal did not.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    Color = 0,
    ColorSampler = 1,
}

/// Generation-pass buffer slots (bind group 0 of the generator pipelines).
///
/// `Randoms` is its own storage binding: the 41-entry u32 array cannot live in
/// the uniform address space without breaking its stride contract.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeneratorBufferSlot {
    MeshPositions = 0,
    TexCoords = 1,
    Indexes = 2,
    Normals = 3,
    FaceNormals = 4,
    FaceMidpoints = 5,
    Uniforms = 6,
    Randoms = 7,
}

/// Generation-pass texture slots (bind group 1): the height-field input and
/// the output side of double-buffered kernels.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeneratorTextureSlot {
    In = 0,
    Out = 1,
}

/// Normal-visualization-pass buffer slots.
///
/// The host binds either (positions, vertex normals) or (face midpoints,
/// face normals) at `Points`/`Normals`, per the kind selector; the compute
/// kernel writes the line-list geometry at `Lines`.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NormalBufferSlot {
    Points = 0,
    Normals = 1,
    Lines = 2,
    GeometryUniforms = 3,
    NormalUniforms = 4,
    Kind = 5,
}

impl RenderBufferSlot {
    pub const fn binding(self) -> u32 {
        self as u32
    }
}

impl VertexAttribute {
    pub const fn location(self) -> u32 {
        self as u32
    }
}

impl TextureSlot {
    pub const fn binding(self) -> u32 {
        self as u32
    }
}

impl GeneratorBufferSlot {
    pub const fn binding(self) -> u32 {
        self as u32
    }
}

impl GeneratorTextureSlot {
    pub const fn binding(self) -> u32 {
        self as u32
    }
}

impl NormalBufferSlot {
    pub const fn binding(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_contiguous_per_stage() {
        assert_eq!(RenderBufferSlot::MeshPositions.binding(), 0);
        assert_eq!(RenderBufferSlot::Materials.binding(), 6);
        assert_eq!(GeneratorBufferSlot::MeshPositions.binding(), 0);
        assert_eq!(GeneratorBufferSlot::Randoms.binding(), 7);
        assert_eq!(NormalBufferSlot::Points.binding(), 0);
        assert_eq!(NormalBufferSlot::Kind.binding(), 5);
    }

    #[test]
    fn vertex_buffers_match_attribute_sources() {
        // The shading pass fetches position/normal/texcoord from the first
        // three render buffer slots, in that order.
        assert_eq!(
            RenderBufferSlot::MeshPositions.binding(),
            VertexAttribute::Position.location()
        );
        assert_eq!(
            RenderBufferSlot::Normals.binding(),
            VertexAttribute::Normal.location()
        );
        assert_eq!(
            RenderBufferSlot::MeshGenerics.binding(),
            VertexAttribute::TexCoord.location()
        );
    }
}
