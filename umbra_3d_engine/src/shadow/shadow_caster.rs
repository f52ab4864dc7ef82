/// Shadow casters and the shadow volume renderables they produce.
///
/// A renderable owns a doubled position buffer: the first half holds the
/// original vertices (w = 1), the second half their extruded copies. With
/// hardware extrusion the copies keep w = 0 and the vertex program pushes
/// them away from the light; with software extrusion they are rewritten on
/// the CPU for every light.

use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};
use crate::error::Result;
use crate::graphics_device::ShadowVolumeDraw;
use crate::math::{AABB, Sphere};
use crate::scene::Light;
use super::edge_data::EdgeData;

bitflags! {
    /// Parts of a shadow volume to generate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShadowRenderableFlags: u32 {
        /// Close the volume at the caster (zfail only)
        const INCLUDE_LIGHT_CAP   = 1 << 0;
        /// Close the volume at the extruded end
        const INCLUDE_DARK_CAP    = 1 << 1;
        /// Extruded vertices lie at infinity (hardware extrusion only)
        const EXTRUDE_TO_INFINITY = 1 << 2;
    }
}

/// Light cap rendered on its own, addressing only the original vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightCap {
    indices: Vec<u32>,
}

impl LightCap {
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// Shadow volume geometry for one vertex set of a caster.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowRenderable {
    vertex_set: usize,
    original_vertex_count: usize,
    positions: Vec<Vec4>,
    indices: Vec<u32>,
    light_cap: Option<LightCap>,
    visible: bool,
}

impl ShadowRenderable {
    /// Duplicate `positions` into a doubled buffer.
    pub fn new(vertex_set: usize, positions: &[Vec3], separate_light_cap: bool) -> Self {
        let mut doubled = Vec::with_capacity(positions.len() * 2);
        doubled.extend(positions.iter().map(|p| p.extend(1.0)));
        doubled.extend(positions.iter().map(|p| p.extend(0.0)));
        Self {
            vertex_set,
            original_vertex_count: positions.len(),
            positions: doubled,
            indices: Vec::new(),
            light_cap: separate_light_cap.then(LightCap::default),
            visible: true,
        }
    }

    pub fn vertex_set(&self) -> usize {
        self.vertex_set
    }

    pub fn original_vertex_count(&self) -> usize {
        self.original_vertex_count
    }

    pub fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    /// Position buffer as raw bytes for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn is_light_cap_separate(&self) -> bool {
        self.light_cap.is_some()
    }

    pub fn light_cap(&self) -> Option<&LightCap> {
        self.light_cap.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Draw descriptor for the volume itself.
    pub fn volume_draw(&self, world: Mat4, light_position: Vec4, extrusion_distance: f32) -> ShadowVolumeDraw<'_> {
        ShadowVolumeDraw {
            world,
            positions: &self.positions,
            indices: &self.indices,
            vertex_count: self.positions.len(),
            light_cap: false,
            light_position,
            extrusion_distance,
        }
    }

    /// Draw descriptor for the separate light cap, if any.
    pub fn light_cap_draw(&self, world: Mat4, light_position: Vec4, extrusion_distance: f32) -> Option<ShadowVolumeDraw<'_>> {
        self.light_cap.as_ref().map(|cap| ShadowVolumeDraw {
            world,
            positions: &self.positions[..self.original_vertex_count],
            indices: &cap.indices,
            vertex_count: self.original_vertex_count,
            light_cap: true,
            light_position,
            extrusion_distance,
        })
    }

    /// Move the extruded half away from an object-space light.
    pub fn extrude(&mut self, light_position: Vec4, extrusion_distance: f32) {
        let (originals, extruded) = self.positions.split_at_mut(self.original_vertex_count);
        extrude_vertices(originals, extruded, light_position, extrusion_distance);
    }
}

/// How a caster should build its volumes for one light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowVolumeParams {
    pub flags: ShadowRenderableFlags,
    /// Rewrite extruded vertices on the CPU instead of in a vertex program
    pub software_extrusion: bool,
    pub extrusion_distance: f32,
}

/// An object able to cast stencil shadows.
pub trait ShadowCaster {
    fn casts_shadows(&self) -> bool;

    fn is_visible(&self) -> bool;

    fn world_bounding_box(&self) -> AABB;

    fn world_bounding_sphere(&self) -> Sphere {
        Sphere::from_aabb(&self.world_bounding_box())
    }

    fn world_transform(&self) -> Mat4;

    fn has_edge_list(&self) -> bool;

    /// World box of the light cap (the caster itself).
    fn light_cap_bounds(&self) -> AABB {
        self.world_bounding_box()
    }

    /// World box of the dark cap: the light cap pushed away from the light.
    fn dark_cap_bounds(&self, light: &Light, extrusion_distance: f32) -> AABB {
        extrude_bounds(&self.light_cap_bounds(), light.as_4d_vector(), extrusion_distance)
    }

    /// Extrusion distance for a point or spot light: what remains of the
    /// light's range past the caster, never negative.
    fn point_extrusion_distance(&self, light: &Light) -> f32 {
        let position = self.world_transform().transform_point3(Vec3::ZERO);
        (light.range() - position.distance(light.derived_position())).max(0.0)
    }

    /// Build (or rebuild) the shadow volumes of this caster for `light`.
    ///
    /// Fails with a state error when the edge list was never prepared.
    fn shadow_volume_renderables(&mut self, light: &Light, params: &ShadowVolumeParams) -> Result<&[ShadowRenderable]>;
}

/// Write `originals` extruded away from `light_position` into `extruded`.
pub fn extrude_vertices(originals: &[Vec4], extruded: &mut [Vec4], light_position: Vec4, extrusion_distance: f32) {
    if light_position.w == 0.0 {
        let offset = (-light_position.truncate()).normalize_or_zero() * extrusion_distance;
        for (dst, src) in extruded.iter_mut().zip(originals) {
            *dst = (src.truncate() + offset).extend(1.0);
        }
    } else {
        let light = light_position.truncate();
        for (dst, src) in extruded.iter_mut().zip(originals) {
            let p = src.truncate();
            let offset = (p - light).normalize_or_zero() * extrusion_distance;
            *dst = (p + offset).extend(1.0);
        }
    }
}

/// Grow a box by its extrusion away from a homogeneous light position.
pub fn extrude_bounds(aabb: &AABB, light_position: Vec4, extrusion_distance: f32) -> AABB {
    if aabb.is_null() || aabb.is_infinite() {
        return *aabb;
    }

    let mut result = *aabb;
    if light_position.w == 0.0 {
        let offset = (-light_position.truncate()).normalize_or_zero() * extrusion_distance;
        result.merge(&aabb.translated(offset));
    } else {
        let light = light_position.truncate();
        for corner in aabb.corners() {
            let offset = (corner - light).normalize_or_zero() * extrusion_distance;
            result.merge_point(corner + offset);
        }
    }
    result
}

/// Fill the index buffers of `renderables` (one per edge group).
///
/// Silhouette edges become extruded quads, wound so their front faces
/// point out of the volume. Directional lights extruded to infinity meet
/// at a single point, so each edge only needs one triangle.
pub fn generate_shadow_volume(
    edge_data: &EdgeData,
    light_facing: &[bool],
    directional: bool,
    flags: ShadowRenderableFlags,
    renderables: &mut [ShadowRenderable],
) {
    let single_triangle = directional && flags.contains(ShadowRenderableFlags::EXTRUDE_TO_INFINITY);
    let facing = |tri: usize| light_facing.get(tri).copied().unwrap_or(false);

    for (group, renderable) in edge_data.edge_groups.iter().zip(renderables.iter_mut()) {
        let oc = renderable.original_vertex_count as u32;
        let indices = &mut renderable.indices;
        indices.clear();

        for edge in &group.edges {
            let lf1 = facing(edge.tri_index[0]);
            let silhouette = if edge.degenerate {
                lf1
            } else {
                lf1 != facing(edge.tri_index[1])
            };
            if !silhouette {
                continue;
            }

            let [mut v0, mut v1] = edge.vert_index;
            if !lf1 {
                std::mem::swap(&mut v0, &mut v1);
            }
            indices.extend_from_slice(&[v1, v0, v0 + oc]);
            if !single_triangle {
                indices.extend_from_slice(&[v0 + oc, v1 + oc, v1]);
            }
        }

        let light_cap = flags.contains(ShadowRenderableFlags::INCLUDE_LIGHT_CAP);
        let dark_cap = flags.contains(ShadowRenderableFlags::INCLUDE_DARK_CAP);
        if let Some(cap) = renderable.light_cap.as_mut() {
            cap.indices.clear();
        }
        if !light_cap && !dark_cap {
            continue;
        }

        let range = group.triangle_start..group.triangle_start + group.triangle_count;
        for tri_index in range {
            if !facing(tri_index) {
                continue;
            }
            let Some(tri) = edge_data.triangles.get(tri_index) else {
                continue;
            };
            let [v0, v1, v2] = tri.vert_index;
            if light_cap {
                match renderable.light_cap.as_mut() {
                    Some(cap) => cap.indices.extend_from_slice(&[v0, v1, v2]),
                    None => renderable.indices.extend_from_slice(&[v0, v1, v2]),
                }
            }
            if dark_cap {
                renderable.indices.extend_from_slice(&[v1 + oc, v0 + oc, v2 + oc]);
            }
        }
    }
}

#[cfg(test)]
#[path = "shadow_caster_tests.rs"]
mod tests;
