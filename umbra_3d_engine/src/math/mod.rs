//! Geometric primitives shared by the scene graph, frustum and shadow code.
//!
//! Planes follow the `n · p + d = 0` convention. The positive side of a
//! plane is the side its normal points to.

mod bounds;
mod plane;
mod plane_bounded_volume;

pub use bounds::{AABB, Sphere};
pub use plane::{Plane, PlaneSide};
pub use plane_bounded_volume::PlaneBoundedVolume;
