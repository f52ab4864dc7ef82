/// Edge lists - the silhouette source for shadow volumes.
///
/// Building an edge list (welding vertices, pairing triangles across
/// edges) is left to an `EdgeListBuilder` supplied by the application.
/// This module only stores the result and classifies triangles against a
/// light.

use glam::{Vec3, Vec4};
use crate::engine_bail;
use crate::error::Result;

const SOURCE: &str = "umbra3d::EdgeData";

/// Geometry of one vertex set (submesh) of a shadow caster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubMeshGeometry {
    pub positions: Vec<Vec3>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<u32>,
}

/// Object-space geometry a caster extrudes shadow volumes from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowMesh {
    pub submeshes: Vec<SubMeshGeometry>,
}

impl ShadowMesh {
    pub fn new(submeshes: Vec<SubMeshGeometry>) -> Self {
        Self { submeshes }
    }

    pub fn vertex_count(&self, vertex_set: usize) -> usize {
        self.submeshes.get(vertex_set).map_or(0, |s| s.positions.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Submesh the vertex indices refer to
    pub vertex_set: usize,
    pub vert_index: [u32; 3],
}

/// Edge shared by up to two triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Triangles on each side. The second is meaningless when degenerate.
    pub tri_index: [usize; 2],
    /// Vertex indices, wound as in the first triangle
    pub vert_index: [u32; 2],
    /// Open edge with a single triangle
    pub degenerate: bool,
}

/// Edges of one vertex set.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGroup {
    pub vertex_set: usize,
    /// Range of triangles in `EdgeData::triangles` belonging to this group
    pub triangle_start: usize,
    pub triangle_count: usize,
    pub edges: Vec<Edge>,
}

/// Triangles, face planes and edge groups of a caster.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub triangles: Vec<Triangle>,
    /// Unnormalized face plane per triangle: `(n, -n·v0)`
    pub face_normals: Vec<Vec4>,
    pub edge_groups: Vec<EdgeGroup>,
    /// No degenerate edges anywhere
    pub is_closed: bool,
}

/// Geometry collaborator producing edge lists from meshes.
pub trait EdgeListBuilder {
    fn build(&self, mesh: &ShadowMesh) -> Result<EdgeData>;
}

impl EdgeData {
    /// Assemble edge data and compute face planes from the mesh.
    pub fn new(triangles: Vec<Triangle>, edge_groups: Vec<EdgeGroup>, mesh: &ShadowMesh) -> Result<Self> {
        let is_closed = edge_groups.iter().all(|g| g.edges.iter().all(|e| !e.degenerate));
        let mut data = Self {
            face_normals: vec![Vec4::ZERO; triangles.len()],
            triangles,
            edge_groups,
            is_closed,
        };
        data.validate(mesh)?;
        for vertex_set in 0..mesh.submeshes.len() {
            data.update_face_normals(vertex_set, &mesh.submeshes[vertex_set].positions);
        }
        Ok(data)
    }

    fn validate(&self, mesh: &ShadowMesh) -> Result<()> {
        for (i, tri) in self.triangles.iter().enumerate() {
            let count = mesh.vertex_count(tri.vertex_set);
            if tri.vert_index.iter().any(|&v| v as usize >= count) {
                engine_bail!(SOURCE, Configuration,
                    "Triangle {} indexes past the {} vertices of vertex set {}",
                    i, count, tri.vertex_set);
            }
        }
        for group in &self.edge_groups {
            if group.triangle_start + group.triangle_count > self.triangles.len() {
                engine_bail!(SOURCE, Configuration,
                    "Edge group for vertex set {} covers missing triangles", group.vertex_set);
            }
            let count = mesh.vertex_count(group.vertex_set);
            for edge in &group.edges {
                if edge.vert_index.iter().any(|&v| v as usize >= count) {
                    engine_bail!(SOURCE, Configuration,
                        "Edge ({}, {}) indexes past the {} vertices of vertex set {}",
                        edge.vert_index[0], edge.vert_index[1], count, group.vertex_set);
                }
                let second_ok = edge.degenerate || edge.tri_index[1] < self.triangles.len();
                if edge.tri_index[0] >= self.triangles.len() || !second_ok {
                    engine_bail!(SOURCE, Configuration,
                        "Edge ({}, {}) references a missing triangle",
                        edge.vert_index[0], edge.vert_index[1]);
                }
            }
        }
        Ok(())
    }

    /// Recompute the face planes of one vertex set (after deformation).
    pub fn update_face_normals(&mut self, vertex_set: usize, positions: &[Vec3]) {
        for (tri, normal) in self.triangles.iter().zip(self.face_normals.iter_mut()) {
            if tri.vertex_set != vertex_set {
                continue;
            }
            let [Some(&a), Some(&b), Some(&c)] = tri.vert_index.map(|i| positions.get(i as usize)) else {
                continue;
            };
            let n = (b - a).cross(c - a);
            *normal = n.extend(-n.dot(a));
        }
    }

    /// Per-triangle light facing for a homogeneous object-space light
    /// position (`w = 0` for directional lights).
    pub fn light_facing(&self, light_position: Vec4) -> Vec<bool> {
        self.face_normals
            .iter()
            .map(|n| n.dot(light_position) > 0.0)
            .collect()
    }
}

#[cfg(test)]
#[path = "edge_data_tests.rs"]
mod tests;
