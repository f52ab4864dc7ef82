//! Scene management module
//!
//! Provides the scene (objects, lights, transform graph), scene objects
//! and lights, and the spatial index used for culling and shadow caster
//! queries.

mod light;
mod octree_scene_index;
mod scene;
mod scene_index;
mod scene_object;

pub use light::{Light, LightKey, LightType};
pub use octree_scene_index::OctreeSceneIndex;
pub use scene::Scene;
pub use scene_index::SceneIndex;
pub use scene_object::{ObjectKey, ObjectPass, PassKind, SceneObject};
