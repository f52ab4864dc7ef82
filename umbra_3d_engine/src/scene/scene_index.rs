/// Spatial acceleration structures for scene queries.
///
/// A SceneIndex stores scene objects by their world-space AABB so that
/// camera culling, light culling and shadow caster searches do not have
/// to test every object.
///
/// The scene owns its index and keeps it in sync during `Scene::update`.

use crate::camera::FrustumPlanes;
use crate::math::{AABB, Sphere};
use super::scene_object::ObjectKey;

/// Spatial index over scene objects.
pub trait SceneIndex: Send + Sync {
    /// Insert an object with its world-space AABB.
    fn insert(&mut self, key: ObjectKey, world_aabb: &AABB);

    /// Remove an object from the index. Unknown keys are ignored.
    fn remove(&mut self, key: ObjectKey);

    /// Move an object after its world AABB changed.
    fn update(&mut self, key: ObjectKey, world_aabb: &AABB);

    /// Append every object whose world AABB is at least partly inside
    /// the planes.
    fn query_frustum(&self, planes: &FrustumPlanes, results: &mut Vec<ObjectKey>);

    /// Append every object whose world AABB intersects `aabb`.
    fn query_aabb(&self, aabb: &AABB, results: &mut Vec<ObjectKey>);

    /// Append every object whose world AABB intersects `sphere`.
    fn query_sphere(&self, sphere: &Sphere, results: &mut Vec<ObjectKey>);

    /// Number of indexed objects.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all objects from the index.
    fn clear(&mut self);
}
