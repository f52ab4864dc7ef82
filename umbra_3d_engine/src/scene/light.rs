/// Light - a scene light and the clip volumes used to find shadow casters.
///
/// A light either carries its own world pose or follows a node. Position
/// and direction are given in the node's space and converted to world
/// space by `sync_with_node`.

use glam::{Vec3, Vec4};
use slotmap::new_key_type;
use crate::camera::{Frustum, FrustumPlane};
use crate::error::Result;
use crate::graphics_device::Color;
use crate::math::{Plane, PlaneBoundedVolume, PlaneSide, Sphere};
use crate::node::{NodeGraph, NodeKey};

new_key_type! {
    /// Stable key for a light in a `Scene`.
    pub struct LightKey;
}

/// Distance below which the light is considered to lie in the near plane
const NEAR_PLANE_THRESHOLD: f32 = 1e-6;

/// Light type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Parallel rays along a direction (sun)
    Directional,
    /// Omnidirectional from a position
    Point,
    /// Cone from a position along a direction
    Spot,
}

/// A light source.
#[derive(Debug, Clone)]
pub struct Light {
    name: String,
    light_type: LightType,
    node: Option<NodeKey>,

    position: Vec3,
    direction: Vec3,
    derived_position: Vec3,
    derived_direction: Vec3,

    diffuse: Color,
    range: f32,
    spot_inner: f32,
    spot_outer: f32,
    spot_falloff: f32,

    casts_shadows: bool,
    shadow_far_distance: Option<f32>,
}

impl Light {
    /// Light at the origin pointing down -Z, white, range 100000.
    pub fn new(name: impl Into<String>, light_type: LightType) -> Self {
        Self {
            name: name.into(),
            light_type,
            node: None,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            derived_position: Vec3::ZERO,
            derived_direction: Vec3::NEG_Z,
            diffuse: Color::ONE,
            range: 100000.0,
            spot_inner: 30f32.to_radians(),
            spot_outer: 40f32.to_radians(),
            spot_falloff: 1.0,
            casts_shadows: true,
            shadow_far_distance: None,
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    pub fn is_directional(&self) -> bool {
        self.light_type == LightType::Directional
    }

    /// Position relative to the attached node (world position when detached).
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn derived_position(&self) -> Vec3 {
        self.derived_position
    }

    pub fn derived_direction(&self) -> Vec3 {
        self.derived_direction
    }

    pub fn diffuse(&self) -> Color {
        self.diffuse
    }

    /// Attenuation range (ignored by directional lights).
    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn spot_inner_angle(&self) -> f32 {
        self.spot_inner
    }

    pub fn spot_outer_angle(&self) -> f32 {
        self.spot_outer
    }

    pub fn spot_falloff(&self) -> f32 {
        self.spot_falloff
    }

    pub fn casts_shadows(&self) -> bool {
        self.casts_shadows
    }

    pub fn shadow_far_distance(&self) -> Option<f32> {
        self.shadow_far_distance
    }

    pub fn node(&self) -> Option<NodeKey> {
        self.node
    }

    // ===== SETTERS =====

    pub fn set_light_type(&mut self, light_type: LightType) {
        self.light_type = light_type;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        if self.node.is_none() {
            self.derived_position = position;
        }
    }

    /// Set the direction. A zero vector is ignored.
    pub fn set_direction(&mut self, direction: Vec3) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };
        self.direction = direction;
        if self.node.is_none() {
            self.derived_direction = direction;
        }
    }

    pub fn set_diffuse(&mut self, colour: Color) {
        self.diffuse = colour;
    }

    pub fn set_range(&mut self, range: f32) {
        self.range = range.max(0.0);
    }

    /// Cone angles in radians and the falloff exponent between them.
    pub fn set_spotlight_range(&mut self, inner: f32, outer: f32, falloff: f32) {
        self.spot_inner = inner;
        self.spot_outer = outer;
        self.spot_falloff = falloff;
    }

    pub fn set_casts_shadows(&mut self, casts: bool) {
        self.casts_shadows = casts;
    }

    /// Override the scene-wide shadow far distance for this light.
    pub fn set_shadow_far_distance(&mut self, distance: Option<f32>) {
        self.shadow_far_distance = distance;
    }

    /// Squared shadow far distance, falling back to the scene-wide value.
    /// Zero means unlimited.
    pub fn shadow_far_distance_squared(&self, global: f32) -> f32 {
        let distance = self.shadow_far_distance.unwrap_or(global);
        distance * distance
    }

    pub fn attach_to_node(&mut self, node: Option<NodeKey>) {
        self.node = node;
        if node.is_none() {
            self.derived_position = self.position;
            self.derived_direction = self.direction;
        }
    }

    /// Recompute the world position and direction from the attached node.
    pub fn sync_with_node(&mut self, graph: &mut NodeGraph) -> Result<()> {
        if let Some(key) = self.node {
            let transform = graph.full_transform(key)?;
            let orientation = graph.derived_orientation(key)?;
            self.derived_position = transform.transform_point3(self.position);
            self.derived_direction = (orientation * self.direction).normalize_or_zero();
        }
        Ok(())
    }

    // ===== SHADOW GEOMETRY =====

    /// Homogeneous form: `(-direction, 0)` for directional lights,
    /// `(position, 1)` otherwise.
    pub fn as_4d_vector(&self) -> Vec4 {
        match self.light_type {
            LightType::Directional => (-self.derived_direction).extend(0.0),
            _ => self.derived_position.extend(1.0),
        }
    }

    /// Sphere of influence. `None` for directional lights.
    pub fn bounding_sphere(&self) -> Option<Sphere> {
        match self.light_type {
            LightType::Directional => None,
            _ => Some(Sphere::new(self.derived_position, self.range)),
        }
    }

    /// Volume between the camera's near plane and the light.
    ///
    /// A caster whose box intersects this volume can cast a shadow volume
    /// that crosses the near plane, which forces zfail stencil counting.
    pub fn near_clip_volume(&self, frustum: &mut Frustum) -> PlaneBoundedVolume {
        let mut volume = PlaneBoundedVolume::new(PlaneSide::Negative);

        let near = frustum.near();
        let light = self.as_4d_vector();
        let light3 = light.truncate();
        let view = frustum.view_matrix();
        let eye_light = view * light;
        let d = eye_light.dot(Vec4::new(0.0, 0.0, -1.0, -near));

        if d.abs() <= NEAR_PLANE_THRESHOLD {
            // Light in the near plane: degenerate volume, caps always needed
            volume.planes.push(Plane::new(Vec3::Z, near));
            volume.planes.push(Plane::new(Vec3::NEG_Z, -near));
            return volume;
        }

        let behind = d < 0.0;
        // Reflection mirrors the corners and reverses their winding
        let flip = behind != frustum.is_reflected();
        let corners = frustum.world_corners();
        for i in 0..4 {
            let prev = if i > 0 { i - 1 } else { 3 };
            let to_light = light3 - corners[i] * light.w;
            let mut normal = (corners[i] - corners[prev]).cross(to_light).normalize_or_zero();
            if flip {
                normal = -normal;
            }
            volume.planes.push(Plane::from_normal_and_point(normal, corners[i]));
        }

        let eye = frustum.derived_eye_position();
        let forward = frustum.plane(FrustumPlane::Near).normal;
        let normal = if behind { -forward } else { forward };
        volume.planes.push(Plane::from_normal_and_point(normal, eye));

        // Parallel to the near plane through the light, so nothing behind
        // the light is picked up
        if self.light_type != LightType::Directional {
            volume.planes.push(Plane::from_normal_and_point(-normal, light3));
        }

        volume
    }

    /// Volumes between each frustum face the light lies behind and the light.
    ///
    /// Pyramids for point and spot lights, open prisms for directional
    /// lights. Objects outside the frustum can only shadow it through one
    /// of these.
    pub fn frustum_clip_volumes(&self, frustum: &mut Frustum) -> Vec<PlaneBoundedVolume> {
        let light = self.as_4d_vector();
        let light3 = light.truncate();
        let corners = frustum.world_corners();
        let infinite = frustum.is_infinite_far();
        let reflected = frustum.is_reflected();

        let mut volumes = Vec::new();
        for which in FrustumPlane::ALL {
            if infinite && which == FrustumPlane::Far {
                continue;
            }

            let plane = frustum.plane(which);
            // Planes face inward: keep faces the light is behind
            if plane.as_vec4().dot(light) >= -NEAR_PLANE_THRESHOLD {
                continue;
            }

            // Clockwise seen from outside so the side normals face in
            let face = match which {
                FrustumPlane::Near => [3, 2, 1, 0],
                FrustumPlane::Far => [7, 6, 5, 4],
                FrustumPlane::Left => [2, 6, 5, 1],
                FrustumPlane::Right => [7, 3, 0, 4],
                FrustumPlane::Top => [0, 1, 5, 4],
                FrustumPlane::Bottom => [7, 6, 2, 3],
            };
            let verts = face.map(|i| corners[i]);

            let mut volume = PlaneBoundedVolume::new(PlaneSide::Negative);
            for i in 0..4 {
                let prev = if i > 0 { i - 1 } else { 3 };
                let to_light = light3 - verts[i] * light.w;
                let mut normal = (verts[i] - verts[prev]).cross(to_light).normalize_or_zero();
                if reflected {
                    normal = -normal;
                }
                volume.planes.push(Plane::from_normal_and_point(normal, verts[i]));
            }

            volume.planes.push(plane.flipped());

            if self.light_type != LightType::Directional {
                volume.planes.push(Plane::from_normal_and_point(plane.normal, light3));
            }

            volumes.push(volume);
        }
        volumes
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
