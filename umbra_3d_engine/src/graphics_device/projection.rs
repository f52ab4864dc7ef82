/// Projection conventions of the graphics device.
///
/// Two flavours of every projection are produced:
/// - *standard*: canonical right-handed matrix (camera looks down -Z,
///   clip-space depth in [-1, 1]). Plane extraction always works on this one.
/// - *native*: what the device actually consumes. Equal to the standard
///   matrix for a [-1, 1] depth range, remapped for a [0, 1] depth range.
///
/// A far distance of 0 builds an infinite far plane.

use glam::{Mat4, Vec4};
use crate::math::Plane;

/// Keeps an infinite projection slightly inside the far clip boundary
pub const INFINITE_FAR_PLANE_ADJUST: f32 = 0.00001;

/// Clip-space depth range expected by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthRange {
    /// Direct3D / Vulkan / Metal / wgpu convention
    ZeroToOne,
    /// OpenGL convention
    MinusOneToOne,
}

/// Builds projection, oblique and reflection matrices for a device.
///
/// Only `depth_range` is required; every matrix is derived from the
/// standard right-handed form and converted when the device differs.
pub trait ProjectionBuilder {
    /// Depth range of the native projection
    fn depth_range(&self) -> DepthRange;

    /// Perspective projection from the near-plane window.
    ///
    /// # Arguments
    ///
    /// * `left`, `right`, `bottom`, `top` - Near-plane window in view space
    /// * `near` - Near distance (> 0)
    /// * `far` - Far distance, 0 for an infinite far plane
    /// * `standard` - Build the standard matrix instead of the native one
    fn perspective(
        &self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
        standard: bool,
    ) -> Mat4 {
        let inv_w = 1.0 / (right - left);
        let inv_h = 1.0 / (top - bottom);

        let a = 2.0 * near * inv_w;
        let b = 2.0 * near * inv_h;
        let c = (right + left) * inv_w;
        let d = (top + bottom) * inv_h;

        let (q, qn) = if far == 0.0 {
            (
                INFINITE_FAR_PLANE_ADJUST - 1.0,
                near * (INFINITE_FAR_PLANE_ADJUST - 2.0),
            )
        } else {
            let inv_d = 1.0 / (far - near);
            (-(far + near) * inv_d, -2.0 * far * near * inv_d)
        };

        let std = Mat4::from_cols(
            Vec4::new(a, 0.0, 0.0, 0.0),
            Vec4::new(0.0, b, 0.0, 0.0),
            Vec4::new(c, d, q, -1.0),
            Vec4::new(0.0, 0.0, qn, 0.0),
        );

        if standard { std } else { self.to_native(&std) }
    }

    /// Orthographic projection from the view window.
    fn orthographic(
        &self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
        standard: bool,
    ) -> Mat4 {
        let inv_w = 1.0 / (right - left);
        let inv_h = 1.0 / (top - bottom);

        let (q, qn) = if far == 0.0 {
            (
                -INFINITE_FAR_PLANE_ADJUST / near,
                -INFINITE_FAR_PLANE_ADJUST - 1.0,
            )
        } else {
            let inv_d = 1.0 / (far - near);
            (-2.0 * inv_d, -(far + near) * inv_d)
        };

        let std = Mat4::from_cols(
            Vec4::new(2.0 * inv_w, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * inv_h, 0.0, 0.0),
            Vec4::new(0.0, 0.0, q, 0.0),
            Vec4::new(-(right + left) * inv_w, -(top + bottom) * inv_h, qn, 1.0),
        );

        if standard { std } else { self.to_native(&std) }
    }

    /// Convert a standard matrix to the native depth range.
    fn to_native(&self, standard: &Mat4) -> Mat4 {
        match self.depth_range() {
            DepthRange::MinusOneToOne => *standard,
            DepthRange::ZeroToOne => {
                // z' = 0.5 * z + 0.5 * w
                let remap = Mat4::from_cols(
                    Vec4::X,
                    Vec4::Y,
                    Vec4::new(0.0, 0.0, 0.5, 0.0),
                    Vec4::new(0.0, 0.0, 0.5, 1.0),
                );
                remap * *standard
            }
        }
    }

    /// Convert a native matrix back to the standard depth range.
    fn to_standard(&self, native: &Mat4) -> Mat4 {
        match self.depth_range() {
            DepthRange::MinusOneToOne => *native,
            DepthRange::ZeroToOne => {
                // z = 2 * z' - w
                let remap = Mat4::from_cols(
                    Vec4::X,
                    Vec4::Y,
                    Vec4::new(0.0, 0.0, 2.0, 0.0),
                    Vec4::new(0.0, 0.0, -1.0, 1.0),
                );
                remap * *native
            }
        }
    }

    /// Replace the near clip plane of a perspective projection with an
    /// arbitrary view-space plane (Lengyel's oblique frustum).
    ///
    /// The plane's positive side is kept. `standard` tells whether `matrix`
    /// is the standard or the native flavour.
    fn apply_oblique_depth_projection(&self, matrix: &mut Mat4, plane: &Plane, standard: bool) {
        let mut m = if standard { *matrix } else { self.to_standard(matrix) };

        let p = plane.as_vec4();
        let q = Vec4::new(
            (p.x.signum() + m.z_axis.x) / m.x_axis.x,
            (p.y.signum() + m.z_axis.y) / m.y_axis.y,
            -1.0,
            (1.0 + m.z_axis.z) / m.w_axis.z,
        );
        let denom = p.dot(q);
        if denom.abs() <= f32::EPSILON {
            return;
        }
        let c = p * (2.0 / denom);

        // Third row becomes c - fourth row, fourth row is (0, 0, -1, 0)
        m.x_axis.z = c.x;
        m.y_axis.z = c.y;
        m.z_axis.z = c.z + 1.0;
        m.w_axis.z = c.w;

        *matrix = if standard { m } else { self.to_native(&m) };
    }

    /// Matrix mirroring space about `plane` (unit normal expected).
    fn reflection_matrix(&self, plane: &Plane) -> Mat4 {
        let n = plane.normal;
        let d = plane.d;
        Mat4::from_cols(
            Vec4::new(1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y, -2.0 * n.x * n.z, 0.0),
            Vec4::new(-2.0 * n.y * n.x, 1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z, 0.0),
            Vec4::new(-2.0 * n.z * n.x, -2.0 * n.z * n.y, 1.0 - 2.0 * n.z * n.z, 0.0),
            Vec4::new(-2.0 * d * n.x, -2.0 * d * n.y, -2.0 * d * n.z, 1.0),
        )
    }
}

impl ProjectionBuilder for DepthRange {
    fn depth_range(&self) -> DepthRange {
        *self
    }
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
