/// Camera - a frustum bound to a viewport and optionally to a scene node.
///
/// The frustum owns projection and view derivation. The camera adds the
/// output rectangle (viewport + scissor) and an optional node whose derived
/// pose drives the frustum each frame.
///
/// Cameras are owned and driven by the caller, not by the Scene.

use glam::{Quat, Vec3};
use crate::error::Result;
use crate::graphics_device::{Rect2D, Viewport};
use crate::math::Sphere;
use crate::node::{NodeGraph, NodeKey};
use super::frustum::{Frustum, NdcRect};

/// Camera rendering a scene into a viewport.
#[derive(Debug, Clone)]
pub struct Camera {
    name: String,
    frustum: Frustum,
    viewport: Viewport,
    scissor: Option<Rect2D>,
    node: Option<NodeKey>,
}

impl Camera {
    /// Create a camera. The frustum aspect ratio follows the viewport.
    pub fn new(name: impl Into<String>, mut frustum: Frustum, viewport: Viewport) -> Self {
        frustum.set_aspect_ratio(viewport.aspect_ratio());
        Self {
            name: name.into(),
            frustum,
            viewport,
            scissor: None,
            node: None,
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn frustum_mut(&mut self) -> &mut Frustum {
        &mut self.frustum
    }

    /// Viewport dimensions and depth range.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Scissor rectangle, if set.
    pub fn scissor(&self) -> Option<&Rect2D> {
        self.scissor.as_ref()
    }

    /// Effective scissor: explicit scissor or viewport bounds as Rect2D.
    pub fn effective_scissor(&self) -> Rect2D {
        self.scissor.unwrap_or(Rect2D {
            x: self.viewport.x as i32,
            y: self.viewport.y as i32,
            width: self.viewport.width as u32,
            height: self.viewport.height as u32,
        })
    }

    /// Node driving the pose, if attached.
    pub fn node(&self) -> Option<NodeKey> {
        self.node
    }

    // ===== SETTERS =====

    /// Set the viewport. The frustum aspect ratio follows.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.frustum.set_aspect_ratio(viewport.aspect_ratio());
    }

    /// Set the scissor rectangle. `None` means same as viewport.
    pub fn set_scissor(&mut self, scissor: Option<Rect2D>) {
        self.scissor = scissor;
    }

    pub fn attach_to_node(&mut self, node: Option<NodeKey>) {
        self.node = node;
    }

    pub fn set_pose(&mut self, position: Vec3, orientation: Quat) {
        self.frustum.set_pose(position, orientation);
    }

    /// Copy the attached node's derived pose into the frustum.
    ///
    /// The view is only invalidated when the pose actually changed.
    pub fn sync_with_node(&mut self, graph: &mut NodeGraph) -> Result<()> {
        if let Some(key) = self.node {
            let position = graph.derived_position(key)?;
            let orientation = graph.derived_orientation(key)?;
            self.frustum.set_pose(position, orientation);
        }
        Ok(())
    }

    /// Pixel rectangle covered by a world sphere, used as a scissor for
    /// per-light passes. `None` when the sphere covers the whole viewport.
    pub fn sphere_scissor(&mut self, sphere: &Sphere) -> Option<Rect2D> {
        let NdcRect { left, top, right, bottom } = self.frustum.project_sphere(sphere)?;
        let vp = self.viewport;

        let x0 = (vp.x + (left + 1.0) * 0.5 * vp.width).round() as i32;
        let x1 = (vp.x + (right + 1.0) * 0.5 * vp.width).round() as i32;
        let y0 = (vp.y + (-top + 1.0) * 0.5 * vp.height).round() as i32;
        let y1 = (vp.y + (-bottom + 1.0) * 0.5 * vp.height).round() as i32;

        Some(Rect2D {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0) as u32,
            height: (y1 - y0).max(0) as u32,
        })
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
