/// Axis-aligned boxes and spheres.
///
/// An AABB is *null* when it encloses nothing (`min > max` on any axis)
/// and *infinite* when it spans all of space. Both states survive
/// merging and transformation.

use glam::{Mat4, Vec3};
use super::plane::{Plane, PlaneSide};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Box enclosing nothing. Merging a point into it yields that point.
    pub const NULL: AABB = AABB {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Box spanning all of space.
    pub const INFINITE: AABB = AABB {
        min: Vec3::splat(f32::NEG_INFINITY),
        max: Vec3::splat(f32::INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::NULL;
        for p in points {
            aabb.merge_point(p);
        }
        aabb
    }

    pub fn is_null(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn is_infinite(&self) -> bool {
        self.min == Vec3::splat(f32::NEG_INFINITY) && self.max == Vec3::splat(f32::INFINITY)
    }

    /// Compute the center point of this AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_size(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The 8 corners. Bit 0 selects max x, bit 1 max y, bit 2 max z.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
        }
        corners
    }

    pub fn merge_point(&mut self, point: Vec3) {
        if self.is_infinite() {
            return;
        }
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn merge(&mut self, other: &AABB) {
        if other.is_null() || self.is_infinite() {
            return;
        }
        if other.is_infinite() {
            *self = AABB::INFINITE;
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn translated(&self, offset: Vec3) -> AABB {
        if self.is_null() || self.is_infinite() {
            return *self;
        }
        AABB { min: self.min + offset, max: self.max + offset }
    }

    /// Transform this local-space AABB by a matrix, returning a new AABB.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the AABB extents
    /// for an exact (tight) result without transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        if self.is_null() || self.is_infinite() {
            return *self;
        }

        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Test if this AABB fully contains another AABB.
    pub fn contains(&self, other: &AABB) -> bool {
        if other.is_null() || self.is_infinite() {
            return true;
        }
        if self.is_null() {
            return false;
        }
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Test if this AABB intersects (overlaps) another AABB.
    ///
    /// Returns `true` if the two AABBs overlap or touch.
    pub fn intersects(&self, other: &AABB) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        sphere.intersects_aabb(self)
    }

    /// Side of the box relative to a plane.
    pub fn side_of_plane(&self, plane: &Plane) -> PlaneSide {
        if self.is_null() {
            return PlaneSide::None;
        }
        if self.is_infinite() {
            return PlaneSide::Both;
        }
        plane.side_of_box(self.center(), self.half_size())
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere enclosing a box (center + half diagonal).
    pub fn from_aabb(aabb: &AABB) -> Self {
        if aabb.is_null() {
            return Self { center: Vec3::ZERO, radius: 0.0 };
        }
        Self { center: aabb.center(), radius: aabb.half_size().length() }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }

    pub fn intersects_sphere(&self, other: &Sphere) -> bool {
        let r = self.radius + other.radius;
        self.center.distance_squared(other.center) <= r * r
    }

    /// Arvo's closest-point test.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if aabb.is_null() {
            return false;
        }
        if aabb.is_infinite() {
            return true;
        }
        let closest = self.center.clamp(aabb.min, aabb.max);
        closest.distance_squared(self.center) <= self.radius * self.radius
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
