/// Scene - objects, lights and the transform graph they hang from.
///
/// Objects and lights live in SlotMaps for O(1) insert/remove with stable
/// keys. World boxes are mirrored in a `SceneIndex` (an octree by default)
/// that `Scene::update` keeps in sync.
///
/// Per-frame caches (lights affecting a frustum, per-object light lists)
/// are tagged with the frame counter and die when it changes. Light poses
/// must not be mutated mid-frame without calling `next_frame`.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use glam::Mat4;
use crate::camera::{Camera, FrustumPlanes, RenderView};
use crate::engine_bail;
use crate::error::Result;
use crate::math::{AABB, Sphere};
use crate::node::NodeGraph;
use crate::shadow::ShadowCaster;
use super::light::{Light, LightKey};
use super::octree_scene_index::OctreeSceneIndex;
use super::scene_index::SceneIndex;
use super::scene_object::{ObjectKey, SceneObject};

const SOURCE: &str = "umbra3d::Scene";

/// Lights found by the last frustum query of the current frame.
struct AffectingLights {
    frame: u64,
    planes: FrustumPlanes,
    lights: Vec<LightKey>,
}

/// A scene: transform graph, objects, lights and a spatial index.
pub struct Scene {
    graph: NodeGraph,
    objects: SlotMap<ObjectKey, SceneObject>,
    lights: SlotMap<LightKey, Light>,
    index: Box<dyn SceneIndex>,
    /// Objects whose world box changed since the last index sync
    dirty_objects: FxHashSet<ObjectKey>,
    frame: u64,
    affecting_lights: Option<AffectingLights>,
    object_lights: FxHashMap<ObjectKey, (u64, Vec<LightKey>)>,
}

impl Scene {
    /// Create an empty scene indexed by a static octree.
    ///
    /// # Arguments
    ///
    /// * `world_bounds` - Box covered by the octree (objects outside it still work)
    /// * `octree_depth` - Octree depth, 4 to 6 suits most scenes
    pub fn new(world_bounds: AABB, octree_depth: u32) -> Self {
        Self::with_index(Box::new(OctreeSceneIndex::new(world_bounds, octree_depth)))
    }

    /// Create an empty scene using a custom spatial index.
    pub fn with_index(index: Box<dyn SceneIndex>) -> Self {
        Self {
            graph: NodeGraph::new(),
            objects: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            index,
            dirty_objects: FxHashSet::default(),
            frame: 0,
            affecting_lights: None,
            object_lights: FxHashMap::default(),
        }
    }

    // ===== GRAPH =====

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    pub fn index(&self) -> &dyn SceneIndex {
        self.index.as_ref()
    }

    // ===== FRAME COUNTER =====

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Start a new frame, invalidating every per-frame cache.
    pub fn next_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    // ===== OBJECTS =====

    /// Add an object. Its current world box is indexed immediately.
    pub fn create_object(&mut self, object: SceneObject) -> ObjectKey {
        let world_aabb = object.world_bounding_box();
        let key = self.objects.insert(object);
        self.index.insert(key, &world_aabb);
        key
    }

    /// Remove an object and return it.
    pub fn remove_object(&mut self, key: ObjectKey) -> Result<SceneObject> {
        let Some(object) = self.objects.remove(key) else {
            engine_bail!(SOURCE, Configuration, "Unknown object key {:?}", key);
        };
        self.index.remove(key);
        self.dirty_objects.remove(&key);
        self.object_lights.remove(&key);
        Ok(object)
    }

    pub fn object(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    /// Mutable access. The object is re-indexed at the next `update`.
    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        let object = self.objects.get_mut(key)?;
        self.dirty_objects.insert(key);
        Some(object)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectKey, &SceneObject)> {
        self.objects.iter()
    }

    pub(crate) fn objects_mut(&mut self) -> impl Iterator<Item = (ObjectKey, &mut SceneObject)> {
        self.objects.iter_mut()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Set the world transform of a detached object.
    pub fn set_object_transform(&mut self, key: ObjectKey, transform: Mat4) -> Result<()> {
        let Some(object) = self.objects.get_mut(key) else {
            engine_bail!(SOURCE, Configuration, "Unknown object key {:?}", key);
        };
        object.set_world_transform(transform);
        self.dirty_objects.insert(key);
        Ok(())
    }

    // ===== LIGHTS =====

    pub fn create_light(&mut self, light: Light) -> LightKey {
        self.lights.insert(light)
    }

    pub fn remove_light(&mut self, key: LightKey) -> Result<Light> {
        let Some(light) = self.lights.remove(key) else {
            engine_bail!(SOURCE, Configuration, "Unknown light key {:?}", key);
        };
        self.affecting_lights = None;
        self.object_lights.clear();
        Ok(light)
    }

    pub fn light(&self, key: LightKey) -> Option<&Light> {
        self.lights.get(key)
    }

    pub fn light_mut(&mut self, key: LightKey) -> Option<&mut Light> {
        self.lights.get_mut(key)
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightKey, &Light)> {
        self.lights.iter()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    // ===== UPDATE =====

    /// Refresh the graph, pull node transforms into objects and lights,
    /// and re-index every object whose world box changed.
    pub fn update(&mut self) -> Result<()> {
        self.graph.update_root()?;

        for (key, object) in self.objects.iter_mut() {
            if object.sync_with_node(&mut self.graph)? {
                self.dirty_objects.insert(key);
            }
        }
        for (_, light) in self.lights.iter_mut() {
            light.sync_with_node(&mut self.graph)?;
        }

        for key in self.dirty_objects.drain() {
            if let Some(object) = self.objects.get(key) {
                let world_aabb = object.world_bounding_box();
                self.index.update(key, &world_aabb);
            }
        }
        Ok(())
    }

    // ===== QUERIES =====

    /// Cull the scene against the camera.
    ///
    /// Syncs the camera with its node first. Hidden objects are dropped.
    pub fn frustum_cull(&mut self, camera: &mut Camera) -> Result<RenderView> {
        camera.sync_with_node(&mut self.graph)?;
        let planes = camera.frustum_mut().culling_planes();

        let mut candidates = Vec::new();
        self.index.query_frustum(&planes, &mut candidates);

        let mut bounds = AABB::NULL;
        let visible: Vec<ObjectKey> = candidates
            .into_iter()
            .filter(|&key| {
                self.objects.get(key).is_some_and(|object| {
                    let visible = object.is_visible();
                    if visible {
                        bounds.merge(&object.world_bounding_box());
                    }
                    visible
                })
            })
            .collect();

        Ok(RenderView::new(camera, visible, bounds))
    }

    /// Objects whose world box intersects `aabb`.
    pub fn query_aabb(&self, aabb: &AABB) -> Vec<ObjectKey> {
        let mut results = Vec::new();
        self.index.query_aabb(aabb, &mut results);
        results
    }

    /// Objects whose world box intersects `sphere`.
    pub fn query_sphere(&self, sphere: &Sphere) -> Vec<ObjectKey> {
        let mut results = Vec::new();
        self.index.query_sphere(sphere, &mut results);
        results
    }

    /// Lights that can influence what `planes` see: every directional
    /// light, and point/spot lights whose range sphere is visible.
    ///
    /// Cached for the current frame and these exact planes.
    pub fn find_lights_affecting_frustum(&mut self, planes: &FrustumPlanes) -> &[LightKey] {
        let cached = self
            .affecting_lights
            .as_ref()
            .is_some_and(|c| c.frame == self.frame && c.planes == *planes);
        if !cached {
            let lights = self
                .lights
                .iter()
                .filter(|(_, light)| match light.bounding_sphere() {
                    None => true,
                    Some(sphere) => planes.classify_sphere(&sphere).is_visible(),
                })
                .map(|(key, _)| key)
                .collect();
            // Object lists were built against the previous light set
            self.object_lights.clear();
            self.affecting_lights = Some(AffectingLights { frame: self.frame, planes: *planes, lights });
        }
        self.affecting_lights.as_ref().map_or(&[][..], |c| c.lights.as_slice())
    }

    /// Lights of the last `find_lights_affecting_frustum` result reaching
    /// an object, directional lights first, then nearest first.
    ///
    /// Cached per object for the current frame.
    pub fn lights_for_object(&mut self, key: ObjectKey) -> Result<&[LightKey]> {
        let Some(object) = self.objects.get(key) else {
            engine_bail!(SOURCE, State, "Light list requested for unknown object {:?}", key);
        };

        let fresh = self.object_lights.get(&key).is_some_and(|(frame, _)| *frame == self.frame);
        if !fresh {
            let world_aabb = object.world_bounding_box();
            let center = world_aabb.center();
            let candidates = self
                .affecting_lights
                .as_ref()
                .filter(|c| c.frame == self.frame)
                .map_or(&[][..], |c| c.lights.as_slice());

            let mut reaching: Vec<(f32, LightKey)> = candidates
                .iter()
                .filter_map(|&light_key| {
                    let light = self.lights.get(light_key)?;
                    match light.bounding_sphere() {
                        None => Some((0.0, light_key)),
                        Some(sphere) if world_aabb.intersects_sphere(&sphere) => {
                            Some((sphere.center.distance_squared(center), light_key))
                        }
                        Some(_) => None,
                    }
                })
                .collect();
            reaching.sort_by(|a, b| a.0.total_cmp(&b.0));

            self.object_lights
                .insert(key, (self.frame, reaching.into_iter().map(|(_, k)| k).collect()));
        }

        Ok(self.object_lights.get(&key).map_or(&[][..], |(_, lights)| lights.as_slice()))
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
