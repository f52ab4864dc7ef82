/// SceneObject - a renderable, shadow-casting object placed in the scene.
///
/// The object's world transform comes from its node (or is set directly
/// when detached). Material detail is reduced to what the renderer needs
/// for ordering: a list of passes, each with a sort key and an
/// illumination category.

use glam::Mat4;
use slotmap::new_key_type;
use crate::engine_bail;
use crate::error::Result;
use crate::math::AABB;
use crate::node::{NodeGraph, NodeKey};
use crate::shadow::{
    generate_shadow_volume, EdgeData, EdgeListBuilder, ShadowCaster, ShadowMesh, ShadowRenderable,
    ShadowVolumeParams,
};
use super::light::Light;

const SOURCE: &str = "umbra3d::SceneObject";

new_key_type! {
    /// Stable key for an object in a `Scene`.
    pub struct ObjectKey;
}

/// Illumination category of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Ambient and emissive contribution, no lights
    Ambient,
    /// Diffuse/specular contribution of one light at a time
    PerLight,
    /// Textures applied over the lit result
    Decal,
}

/// A material pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPass {
    /// Sort key (usually the pipeline/material id) used to batch solids
    pub sort_key: u32,
    pub kind: PassKind,
}

impl ObjectPass {
    pub fn new(sort_key: u32, kind: PassKind) -> Self {
        Self { sort_key, kind }
    }
}

/// A renderable object.
#[derive(Debug, Clone)]
pub struct SceneObject {
    name: String,
    node: Option<NodeKey>,
    local_aabb: AABB,
    world_transform: Mat4,
    world_aabb: AABB,

    visible: bool,
    casts_shadows: bool,
    receives_shadows: bool,
    transparent: bool,
    passes: Vec<ObjectPass>,

    shadow_mesh: Option<ShadowMesh>,
    edge_data: Option<EdgeData>,
    shadow_renderables: Vec<ShadowRenderable>,
}

impl SceneObject {
    /// Visible, shadow casting and receiving object with an ambient and a
    /// per-light pass.
    pub fn new(name: impl Into<String>, local_aabb: AABB) -> Self {
        Self {
            name: name.into(),
            node: None,
            local_aabb,
            world_transform: Mat4::IDENTITY,
            world_aabb: local_aabb,
            visible: true,
            casts_shadows: true,
            receives_shadows: true,
            transparent: false,
            passes: vec![
                ObjectPass::new(0, PassKind::Ambient),
                ObjectPass::new(0, PassKind::PerLight),
            ],
            shadow_mesh: None,
            edge_data: None,
            shadow_renderables: Vec::new(),
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> Option<NodeKey> {
        self.node
    }

    /// Bounding box in object space.
    pub fn local_bounding_box(&self) -> &AABB {
        &self.local_aabb
    }

    pub fn receives_shadows(&self) -> bool {
        self.receives_shadows
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn passes(&self) -> &[ObjectPass] {
        &self.passes
    }

    pub fn shadow_mesh(&self) -> Option<&ShadowMesh> {
        self.shadow_mesh.as_ref()
    }

    pub fn edge_data(&self) -> Option<&EdgeData> {
        self.edge_data.as_ref()
    }

    // ===== SETTERS =====

    pub fn attach_to_node(&mut self, node: Option<NodeKey>) {
        self.node = node;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_casts_shadows(&mut self, casts: bool) {
        self.casts_shadows = casts;
    }

    pub fn set_receives_shadows(&mut self, receives: bool) {
        self.receives_shadows = receives;
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    pub fn set_passes(&mut self, passes: Vec<ObjectPass>) {
        self.passes = passes;
    }

    pub fn set_local_bounding_box(&mut self, aabb: AABB) {
        self.local_aabb = aabb;
        self.world_aabb = aabb.transformed(&self.world_transform);
    }

    /// Set the world transform directly (detached objects).
    pub fn set_world_transform(&mut self, transform: Mat4) {
        self.world_transform = transform;
        self.world_aabb = self.local_aabb.transformed(&transform);
    }

    /// Pull the world transform from the attached node.
    ///
    /// Returns true when the transform changed.
    pub fn sync_with_node(&mut self, graph: &mut NodeGraph) -> Result<bool> {
        let Some(key) = self.node else {
            return Ok(false);
        };
        let transform = graph.full_transform(key)?;
        if transform == self.world_transform {
            return Ok(false);
        }
        self.set_world_transform(transform);
        Ok(true)
    }

    // ===== SHADOW GEOMETRY =====

    /// Replace the caster geometry. Any prepared edge list is dropped.
    pub fn set_shadow_mesh(&mut self, mesh: ShadowMesh) {
        self.shadow_mesh = Some(mesh);
        self.edge_data = None;
        self.shadow_renderables.clear();
    }

    /// Build the edge list used for shadow volumes.
    pub fn prepare_edge_list(&mut self, builder: &dyn EdgeListBuilder) -> Result<()> {
        let Some(mesh) = self.shadow_mesh.as_ref() else {
            engine_bail!(SOURCE, State, "Object '{}' has no shadow mesh to build an edge list from", self.name);
        };
        self.edge_data = Some(builder.build(mesh)?);
        self.shadow_renderables.clear();
        Ok(())
    }

    /// Show or hide the shadow volume of one vertex set.
    pub fn set_vertex_set_shadow_visible(&mut self, vertex_set: usize, visible: bool) {
        for renderable in &mut self.shadow_renderables {
            if renderable.vertex_set() == vertex_set {
                renderable.set_visible(visible);
            }
        }
    }

    /// Shadow renderables from the last `shadow_volume_renderables` call.
    pub fn last_shadow_renderables(&self) -> &[ShadowRenderable] {
        &self.shadow_renderables
    }
}

impl ShadowCaster for SceneObject {
    fn casts_shadows(&self) -> bool {
        self.casts_shadows
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn world_bounding_box(&self) -> AABB {
        self.world_aabb
    }

    fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    fn has_edge_list(&self) -> bool {
        self.edge_data.is_some()
    }

    fn shadow_volume_renderables(&mut self, light: &Light, params: &ShadowVolumeParams) -> Result<&[ShadowRenderable]> {
        let (Some(edge_data), Some(mesh)) = (self.edge_data.as_ref(), self.shadow_mesh.as_ref()) else {
            engine_bail!(SOURCE, State,
                "Shadow volumes requested for '{}' before its edge list was built", self.name);
        };

        // Hardware extrusion renders the light cap on its own
        let separate_light_cap = !params.software_extrusion;
        let stale = self.shadow_renderables.len() != edge_data.edge_groups.len()
            || self.shadow_renderables.iter().any(|r| r.is_light_cap_separate() != separate_light_cap);
        if stale {
            self.shadow_renderables = edge_data
                .edge_groups
                .iter()
                .map(|group| {
                    let positions = mesh
                        .submeshes
                        .get(group.vertex_set)
                        .map_or(&[][..], |s| s.positions.as_slice());
                    ShadowRenderable::new(group.vertex_set, positions, separate_light_cap)
                })
                .collect();
        }

        let object_light = self.world_transform.inverse() * light.as_4d_vector();
        let light_facing = edge_data.light_facing(object_light);
        generate_shadow_volume(
            edge_data,
            &light_facing,
            light.is_directional(),
            params.flags,
            &mut self.shadow_renderables,
        );

        if params.software_extrusion {
            for renderable in &mut self.shadow_renderables {
                renderable.extrude(object_light, params.extrusion_distance);
            }
        }

        Ok(&self.shadow_renderables)
    }
}

#[cfg(test)]
#[path = "scene_object_tests.rs"]
mod tests;
