//! Grid mesh construction and the CPU reference for the generation kernels.
//!
//! The GPU passes in [`crate::gpu::GpuTerrain`] produce exactly the data this
//! module computes: centered grid positions displaced by a height field,
//! normalized texcoords, a fixed-diagonal triangle index buffer, per-face
//! normals and midpoints, and area-weighted per-vertex normals. The CPU
//! version seeds the initial buffer contents and anchors the tests.
//!
//! Positions and normals are stored as `[f32; 4]` records (16-byte stride):
//! WGSL storage arrays of `vec3<f32>` have 16-byte stride, so the host mirrors
//! that rather than packing to 12 bytes.

use glam::{UVec2, Vec2, Vec3};

use crate::heightmap::HeightMap;

/// Squared-length threshold below which a normal is treated as degenerate and
/// left as the zero sentinel instead of being normalized.
pub const DEGENERATE_NORMAL_EPS: f32 = 1e-12;

/// Vertices for `segments` grid cells per axis; zero if either axis is zero.
pub fn vertex_count(segments: UVec2) -> usize {
    if segments.x == 0 || segments.y == 0 {
        0
    } else {
        ((segments.x + 1) * (segments.y + 1)) as usize
    }
}

/// Two triangles per grid cell.
pub fn face_count(segments: UVec2) -> usize {
    (2 * segments.x * segments.y) as usize
}

#[derive(Clone, Debug)]
pub struct TerrainMesh {
    dimensions: Vec2,
    segments: UVec2,
    pub positions: Vec<[f32; 4]>,
    pub texcoords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub vertex_normals: Vec<[f32; 4]>,
    pub face_normals: Vec<[f32; 4]>,
    pub face_midpoints: Vec<[f32; 4]>,
}

impl TerrainMesh {
    /// Build a flat plane centered on the origin, spanning `dimensions` in
    /// X/Z, with +Y normals. Zero segments in either axis produce an empty
    /// mesh; that is a defined result, not an error.
    pub fn new(dimensions: Vec2, segments: UVec2) -> Self {
        let vertex_count = vertex_count(segments);
        let face_count = face_count(segments);

        let mut positions = Vec::with_capacity(vertex_count);
        let mut texcoords = Vec::with_capacity(vertex_count);
        let mut indices = Vec::with_capacity(face_count * 3);

        if vertex_count > 0 {
            let (sx, sy) = (segments.x, segments.y);
            let row = sx + 1;
            for vy in 0..=sy {
                for vx in 0..=sx {
                    let u = vx as f32 / sx as f32;
                    let v = vy as f32 / sy as f32;
                    positions.push([
                        (u - 0.5) * dimensions.x,
                        0.0,
                        (v - 0.5) * dimensions.y,
                        1.0,
                    ]);
                    texcoords.push([u, v]);
                }
            }
            // Fixed diagonal split, counter-clockwise seen from +Y.
            for cy in 0..sy {
                for cx in 0..sx {
                    let i = cy * row + cx;
                    indices.extend_from_slice(&[i, i + row, i + 1]);
                    indices.extend_from_slice(&[i + 1, i + row, i + row + 1]);
                }
            }
        }

        let mut mesh = Self {
            dimensions,
            segments,
            positions,
            texcoords,
            indices,
            vertex_normals: vec![[0.0, 1.0, 0.0, 0.0]; vertex_count],
            face_normals: vec![[0.0, 1.0, 0.0, 0.0]; face_count],
            face_midpoints: vec![[0.0; 4]; face_count],
        };
        mesh.recompute_normals();
        mesh
    }

    pub fn dimensions(&self) -> Vec2 {
        self.dimensions
    }

    pub fn segments(&self) -> UVec2 {
        self.segments
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Displace vertex heights from the height field and rederive all
    /// normals. This is the CPU mirror of the `update_heights`,
    /// `update_face_normals`, and `update_vertex_normals` kernels.
    pub fn displace(&mut self, height_map: &HeightMap) {
        for (position, texcoord) in self.positions.iter_mut().zip(&self.texcoords) {
            position[1] = height_map.sample(texcoord[0], texcoord[1]);
        }
        self.recompute_normals();
    }

    /// Recompute face normals/midpoints and area-weighted vertex normals.
    ///
    /// Faces contribute their raw edge cross product (magnitude twice the
    /// triangle area) to each of their vertices; the accumulator is then
    /// normalized, with degenerate sums left as the zero sentinel.
    pub fn recompute_normals(&mut self) {
        let mut accumulators = vec![Vec3::ZERO; self.positions.len()];

        for face in 0..self.face_count() {
            let [i0, i1, i2] = [
                self.indices[3 * face] as usize,
                self.indices[3 * face + 1] as usize,
                self.indices[3 * face + 2] as usize,
            ];
            let p0 = Vec3::from_slice(&self.positions[i0][..3]);
            let p1 = Vec3::from_slice(&self.positions[i1][..3]);
            let p2 = Vec3::from_slice(&self.positions[i2][..3]);

            let cross = (p1 - p0).cross(p2 - p0);
            let normal = safe_normalize(cross);
            let midpoint = (p0 + p1 + p2) / 3.0;
            self.face_normals[face] = [normal.x, normal.y, normal.z, 0.0];
            self.face_midpoints[face] = [midpoint.x, midpoint.y, midpoint.z, 1.0];

            accumulators[i0] += cross;
            accumulators[i1] += cross;
            accumulators[i2] += cross;
        }

        for (normal, accumulator) in self.vertex_normals.iter_mut().zip(&accumulators) {
            let n = safe_normalize(*accumulator);
            *normal = [n.x, n.y, n.z, 0.0];
        }
    }
}

/// Normalize, or return the zero vector for degenerate input. Never NaN.
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq < DEGENERATE_NORMAL_EPS {
        Vec3::ZERO
    } else {
        v / len_sq.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_formulas() {
        assert_eq!(vertex_count(UVec2::new(4, 4)), 25);
        assert_eq!(face_count(UVec2::new(4, 4)), 32);
        assert_eq!(vertex_count(UVec2::new(1, 1)), 4);
        assert_eq!(face_count(UVec2::new(1, 1)), 2);
        assert_eq!(vertex_count(UVec2::new(0, 5)), 0);
        assert_eq!(vertex_count(UVec2::new(5, 0)), 0);
    }

    #[test]
    fn zero_segments_build_an_empty_mesh() {
        let mesh = TerrainMesh::new(Vec2::new(10.0, 10.0), UVec2::new(0, 0));
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn flat_mesh_has_canonical_up_normals() {
        let mesh = TerrainMesh::new(Vec2::new(10.0, 10.0), UVec2::new(4, 4));
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.face_count(), 32);
        for n in mesh.face_normals.iter().chain(&mesh.vertex_normals) {
            assert!((n[0], n[1], n[2]) == (0.0, 1.0, 0.0), "normal {n:?} is not +Y");
        }
    }

    #[test]
    fn degenerate_geometry_yields_zero_sentinels_not_nan() {
        // Zero dimensions collapse every triangle to a point.
        let mesh = TerrainMesh::new(Vec2::ZERO, UVec2::new(2, 2));
        for n in mesh.face_normals.iter().chain(&mesh.vertex_normals) {
            assert_eq!(&n[..3], &[0.0, 0.0, 0.0]);
            assert!(n.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn indices_are_in_bounds_with_consistent_winding() {
        let mesh = TerrainMesh::new(Vec2::new(8.0, 6.0), UVec2::new(3, 5));
        let max = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
        // Every face normal points up on a flat mesh, which pins the winding.
        for n in &mesh.face_normals {
            assert!(n[1] > 0.99);
        }
    }

    #[test]
    fn displacement_follows_height_field_and_renormalizes() {
        let map = crate::heightmap::HeightMap::from_fn(5, 5, |x, _| x as f32);
        let mut mesh = TerrainMesh::new(Vec2::new(4.0, 4.0), UVec2::new(4, 4));
        mesh.displace(&map);
        // Heights ramp along +X, so normals tilt toward -X but stay unit.
        for n in &mesh.vertex_normals {
            let v = Vec3::from_slice(&n[..3]);
            assert!((v.length() - 1.0).abs() < 1e-5);
            assert!(v.x < 0.0);
            assert!(v.y > 0.0);
        }
    }

    #[test]
    fn texcoords_span_the_unit_square() {
        let mesh = TerrainMesh::new(Vec2::new(10.0, 10.0), UVec2::new(4, 4));
        assert_eq!(mesh.texcoords.first(), Some(&[0.0, 0.0]));
        assert_eq!(mesh.texcoords.last(), Some(&[1.0, 1.0]));
    }
}
