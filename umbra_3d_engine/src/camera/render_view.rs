/// RenderView - result of frustum culling.
///
/// Created by `Scene::frustum_cull()`. Contains a snapshot of the camera
/// state at culling time and the keys of the visible objects.
///
/// Ephemeral: lives for one frame. No Arc, no Mutex.
/// Shareable: the same RenderView feeds the ambient, per-light and
/// transparent passes of a frame.

use glam::{Mat4, Vec3};
use crate::graphics_device::Viewport;
use crate::math::AABB;
use crate::scene::ObjectKey;
use super::camera::Camera;
use super::frustum::FrustumPlanes;

/// Result of frustum culling. Lives for one frame.
#[derive(Debug, Clone)]
pub struct RenderView {
    view: Mat4,
    projection: Mat4,
    planes: FrustumPlanes,
    eye_position: Vec3,
    direction: Vec3,
    viewport: Viewport,
    visible_objects: Vec<ObjectKey>,
    visible_bounds: AABB,
}

impl RenderView {
    /// Snapshot the camera (refreshing it) and wrap the visible keys.
    pub(crate) fn new(camera: &mut Camera, visible_objects: Vec<ObjectKey>, visible_bounds: AABB) -> Self {
        let viewport = *camera.viewport();
        let frustum = camera.frustum_mut();
        Self {
            view: frustum.view_matrix(),
            projection: frustum.projection_matrix(),
            planes: frustum.culling_planes(),
            eye_position: frustum.derived_eye_position(),
            direction: frustum.direction(),
            viewport,
            visible_objects,
            visible_bounds,
        }
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// Clip planes at culling time.
    pub fn planes(&self) -> &FrustumPlanes {
        &self.planes
    }

    pub fn eye_position(&self) -> Vec3 {
        self.eye_position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Keys of visible objects in the Scene.
    pub fn visible_objects(&self) -> &[ObjectKey] {
        &self.visible_objects
    }

    pub fn visible_count(&self) -> usize {
        self.visible_objects.len()
    }

    /// Union of the visible objects' world boxes (null when nothing is visible).
    pub fn visible_bounds(&self) -> &AABB {
        &self.visible_bounds
    }
}

#[cfg(test)]
#[path = "render_view_tests.rs"]
mod tests;
