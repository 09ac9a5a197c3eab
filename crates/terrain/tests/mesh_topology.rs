//! End-to-end checks of the CPU mesh reference: the same data the generation
//! kernels produce, computed on the host.

use glam::{UVec2, Vec2, Vec3};
use terrain::{HeightMap, TerrainMesh};

#[test]
fn flat_ten_by_ten_with_four_segments() {
    // dims (10, 10), segments (4, 4), flat height field.
    let mut mesh = TerrainMesh::new(Vec2::new(10.0, 10.0), UVec2::new(4, 4));
    mesh.displace(&HeightMap::flat(16, 16, 0.0));

    assert_eq!(mesh.vertex_count(), 25);
    assert_eq!(mesh.face_count(), 32);
    assert_eq!(mesh.indices.len(), 96);

    for n in mesh.vertex_normals.iter().chain(&mesh.face_normals) {
        assert_eq!(&n[..3], &[0.0, 1.0, 0.0]);
    }

    // Corners of the centered grid.
    assert_eq!(&mesh.positions[0][..3], &[-5.0, 0.0, -5.0]);
    assert_eq!(&mesh.positions[24][..3], &[5.0, 0.0, 5.0]);
}

#[test]
fn displacement_lifts_vertices_to_sampled_heights() {
    let map = HeightMap::from_fn(5, 5, |x, y| (x + y) as f32);
    let mut mesh = TerrainMesh::new(Vec2::new(4.0, 4.0), UVec2::new(4, 4));
    mesh.displace(&map);

    for (position, texcoord) in mesh.positions.iter().zip(&mesh.texcoords) {
        assert_eq!(position[1], map.sample(texcoord[0], texcoord[1]));
    }
}

#[test]
fn vertex_normals_are_area_weighted() {
    // A single raised vertex in an otherwise flat grid: its normal stays +Y
    // by symmetry, while neighbors tilt toward it.
    let map = HeightMap::from_fn(5, 5, |x, y| if x == 2 && y == 2 { 1.0 } else { 0.0 });
    let mut mesh = TerrainMesh::new(Vec2::new(4.0, 4.0), UVec2::new(4, 4));
    mesh.displace(&map);

    let center = 2 * 5 + 2;
    let center_normal = Vec3::from_slice(&mesh.vertex_normals[center][..3]);
    assert!(center_normal.y > 0.99, "peak normal should stay up");

    let west = 2 * 5 + 1;
    let west_normal = Vec3::from_slice(&mesh.vertex_normals[west][..3]);
    assert!(west_normal.x < 0.0, "west neighbor tilts away from the peak");
    assert!((west_normal.length() - 1.0).abs() < 1e-5);
}

#[test]
fn midpoints_are_face_centroids() {
    let mesh = TerrainMesh::new(Vec2::new(6.0, 6.0), UVec2::new(3, 3));
    for face in 0..mesh.face_count() {
        let centroid: Vec3 = (0..3)
            .map(|k| {
                let i = mesh.indices[3 * face + k] as usize;
                Vec3::from_slice(&mesh.positions[i][..3])
            })
            .sum::<Vec3>()
            / 3.0;
        let stored = Vec3::from_slice(&mesh.face_midpoints[face][..3]);
        assert!((centroid - stored).length() < 1e-6);
    }
}
