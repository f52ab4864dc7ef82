/// Plane - infinite plane in `n · p + d = 0` form.
///
/// Used as frustum clip planes, oblique near-clip and reflection planes,
/// and as the faces of plane-bounded shadow clip volumes.

use glam::{Mat4, Vec3, Vec4};

/// Which side of a plane a primitive lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// No side (null primitive)
    None,
    /// Entirely on the side the normal points to
    Positive,
    /// Entirely on the opposite side
    Negative,
    /// Straddles the plane
    Both,
}

/// A plane with a (usually unit) normal and signed distance term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self { normal: Vec3::ZERO, d: 0.0 }
    }
}

impl Plane {
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Plane with the given normal passing through `point`.
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        Self { normal, d: -normal.dot(point) }
    }

    /// Plane through three points, counter-clockwise winding gives the normal.
    ///
    /// A degenerate triangle yields a zero normal.
    pub fn from_points(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        Self::from_normal_and_point(normal, p0)
    }

    /// Build from `(a, b, c, d)`.
    pub fn from_vec4(v: Vec4) -> Self {
        Self { normal: v.truncate(), d: v.w }
    }

    pub fn as_vec4(&self) -> Vec4 {
        self.normal.extend(self.d)
    }

    /// Signed distance (scaled by the normal length).
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Side of a point. Points exactly on the plane report `None`.
    pub fn side_of_point(&self, point: Vec3) -> PlaneSide {
        let dist = self.distance(point);
        if dist < 0.0 {
            PlaneSide::Negative
        } else if dist > 0.0 {
            PlaneSide::Positive
        } else {
            PlaneSide::None
        }
    }

    /// Side of a box given by its center and half extents.
    pub fn side_of_box(&self, center: Vec3, half_size: Vec3) -> PlaneSide {
        let dist = self.distance(center);
        let max_abs_dist = (self.normal * half_size).abs().element_sum();

        if dist < -max_abs_dist {
            PlaneSide::Negative
        } else if dist > max_abs_dist {
            PlaneSide::Positive
        } else {
            PlaneSide::Both
        }
    }

    /// Divide normal and distance by the normal length.
    ///
    /// Returns the previous normal length. A zero-length normal is left
    /// untouched and treated as already normalized.
    pub fn normalize(&mut self) -> f32 {
        let len = self.normal.length();
        if len > 0.0 {
            let inv = 1.0 / len;
            self.normal *= inv;
            self.d *= inv;
        }
        len
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Same plane facing the other way.
    pub fn flipped(&self) -> Self {
        Self { normal: -self.normal, d: -self.d }
    }

    /// Transform the plane by a point transform `m`.
    ///
    /// Planes transform with the inverse transpose of the point matrix.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let v = m.inverse().transpose() * self.as_vec4();
        Self::from_vec4(v)
    }

    /// Orthogonal projection of a point onto the plane (unit normal assumed).
    pub fn project_point(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.distance(point)
    }
}

#[cfg(test)]
#[path = "plane_tests.rs"]
mod tests;
