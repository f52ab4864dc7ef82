/// PlaneBoundedVolume - convex region described by a set of planes.
///
/// Lights build these between the camera near plane (or frustum faces)
/// and their own position to find casters whose shadow can reach the view.

use super::bounds::{AABB, Sphere};
use super::plane::{Plane, PlaneSide};

#[derive(Debug, Clone, PartialEq)]
pub struct PlaneBoundedVolume {
    pub planes: Vec<Plane>,
    /// Side of each plane considered outside the volume.
    pub outside: PlaneSide,
}

impl Default for PlaneBoundedVolume {
    fn default() -> Self {
        Self::new(PlaneSide::Negative)
    }
}

impl PlaneBoundedVolume {
    pub fn new(outside: PlaneSide) -> Self {
        Self { planes: Vec::new(), outside }
    }

    pub fn with_planes(planes: Vec<Plane>) -> Self {
        Self { planes, outside: PlaneSide::Negative }
    }

    /// False only when the box lies fully outside at least one plane.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if aabb.is_null() {
            return false;
        }
        if aabb.is_infinite() {
            return true;
        }
        let center = aabb.center();
        let half_size = aabb.half_size();
        self.planes
            .iter()
            .all(|plane| plane.side_of_box(center, half_size) != self.outside)
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.planes.iter().all(|plane| {
            let d = plane.distance(sphere.center);
            match self.outside {
                PlaneSide::Negative => d >= -sphere.radius,
                _ => d <= sphere.radius,
            }
        })
    }
}
