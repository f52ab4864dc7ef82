//! Camera module - frustum, camera and render view.
//!
//! Cameras belong to the caller. The scene culls against them and the
//! renderer drives them for a frame, but neither keeps one between frames
//! except the shadow cameras a renderer owns.

mod camera;
mod frustum;
mod render_view;

pub use camera::Camera;
pub use frustum::{
    CullResult, DerivedPlaneProvider, Frustum, FrustumPlane, FrustumPlanes, FrustumTest,
    NdcRect, PlaneBinding, ProjectionType, INFINITE_FAR_PLANE_DISTANCE,
};
pub use render_view::RenderView;
