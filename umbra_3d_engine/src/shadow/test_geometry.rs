//! Meshes and a naive edge list builder for shadow unit tests.

use glam::Vec3;
use rustc_hash::FxHashMap;
use crate::error::Result;
use super::edge_data::{Edge, EdgeData, EdgeGroup, EdgeListBuilder, ShadowMesh, SubMeshGeometry, Triangle};

/// Pairs triangles sharing a vertex index pair. Unpaired edges are degenerate.
pub struct SharedEdgeBuilder;

impl EdgeListBuilder for SharedEdgeBuilder {
    fn build(&self, mesh: &ShadowMesh) -> Result<EdgeData> {
        let mut triangles = Vec::new();
        let mut groups = Vec::new();

        for (vertex_set, submesh) in mesh.submeshes.iter().enumerate() {
            let triangle_start = triangles.len();
            let mut edges: Vec<Edge> = Vec::new();
            let mut open: FxHashMap<(u32, u32), usize> = FxHashMap::default();

            for chunk in submesh.indices.chunks_exact(3) {
                let tri_index = triangles.len();
                triangles.push(Triangle { vertex_set, vert_index: [chunk[0], chunk[1], chunk[2]] });

                for (a, b) in [(chunk[0], chunk[1]), (chunk[1], chunk[2]), (chunk[2], chunk[0])] {
                    let key = (a.min(b), a.max(b));
                    match open.remove(&key) {
                        Some(edge_index) => {
                            edges[edge_index].tri_index[1] = tri_index;
                            edges[edge_index].degenerate = false;
                        }
                        None => {
                            open.insert(key, edges.len());
                            edges.push(Edge { tri_index: [tri_index, 0], vert_index: [a, b], degenerate: true });
                        }
                    }
                }
            }

            groups.push(EdgeGroup {
                vertex_set,
                triangle_start,
                triangle_count: triangles.len() - triangle_start,
                edges,
            });
        }

        EdgeData::new(triangles, groups, mesh)
    }
}

/// Closed cube, outward counter-clockwise faces. Vertex bits: x, y, z.
pub fn cube_mesh(center: Vec3, half: f32) -> ShadowMesh {
    let positions = (0..8)
        .map(|i| {
            let sign = |bit: u32| if i & bit != 0 { half } else { -half };
            center + Vec3::new(sign(1), sign(2), sign(4))
        })
        .collect();
    let indices = vec![
        0, 4, 6, 0, 6, 2, // -X
        1, 3, 7, 1, 7, 5, // +X
        0, 1, 5, 0, 5, 4, // -Y
        2, 6, 7, 2, 7, 3, // +Y
        0, 2, 3, 0, 3, 1, // -Z
        4, 5, 7, 4, 7, 6, // +Z
    ];
    ShadowMesh::new(vec![SubMeshGeometry { positions, indices }])
}

/// Single upward-facing quad in the XZ plane (four open edges).
pub fn quad_mesh(half: f32) -> ShadowMesh {
    let positions = vec![
        Vec3::new(-half, 0.0, half),
        Vec3::new(half, 0.0, half),
        Vec3::new(half, 0.0, -half),
        Vec3::new(-half, 0.0, -half),
    ];
    ShadowMesh::new(vec![SubMeshGeometry { positions, indices: vec![0, 1, 2, 0, 2, 3] }])
}
