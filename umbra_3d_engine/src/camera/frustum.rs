/// Frustum - projection, view and six clipping planes derived from a pose.
///
/// Two independent dirty flags drive the lazy refresh:
/// - *shape* (FOV, aspect, near/far, projection type, oblique plane)
/// - *pose* (position, orientation, reflection)
///
/// A pose refresh always re-derives the projection too, because the
/// oblique near plane lives in view space and plane extraction needs the
/// standard projection. Every plane normal points inward and is unit
/// length after a refresh.
///
/// A far distance of 0 means an infinite far plane: the Far plane is
/// skipped by every visibility test, and bounding computations use
/// `INFINITE_FAR_PLANE_DISTANCE` instead.

use std::sync::Arc;
use glam::{Mat4, Quat, Vec3, Vec4};
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{DepthRange, ProjectionBuilder};
use crate::math::{AABB, Plane, PlaneSide, Sphere};

const SOURCE: &str = "umbra3d::Frustum";

/// Stand-in distance for an infinite far plane in bounding-volume math
pub const INFINITE_FAR_PLANE_DISTANCE: f32 = 100000.0;

/// Projection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// Named frustum planes, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
    Near = 4,
    Far = 5,
}

impl FrustumPlane {
    /// All planes in test order
    pub const ALL: [FrustumPlane; 6] = [
        FrustumPlane::Left,
        FrustumPlane::Right,
        FrustumPlane::Top,
        FrustumPlane::Bottom,
        FrustumPlane::Near,
        FrustumPlane::Far,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Outcome of a visibility classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullResult {
    /// At least partly inside every tested plane
    Visible,
    /// Entirely on the negative side of this plane (first one found)
    Culled(FrustumPlane),
    /// Null bounds, never visible
    Empty,
}

impl CullResult {
    pub fn is_visible(self) -> bool {
        matches!(self, CullResult::Visible)
    }

    /// Plane that culled the primitive, if any.
    pub fn culled_by(self) -> Option<FrustumPlane> {
        match self {
            CullResult::Culled(plane) => Some(plane),
            _ => None,
        }
    }
}

/// Result of a 3-way frustum/AABB classification.
///
/// Used by spatial acceleration structures (OctreeSceneIndex) for
/// hierarchical culling:
/// - `Outside` → skip the entire subtree
/// - `Inside` → collect all objects without further testing
/// - `Partial` → test individual objects and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    Outside,
    Inside,
    Partial,
}

/// Supplies a world-space plane that may change between frames
/// (a water surface, a moving mirror, ...).
pub trait DerivedPlaneProvider: Send + Sync {
    fn derived_plane(&self) -> Plane;
}

/// Oblique near-clip or reflection plane source.
#[derive(Clone)]
pub enum PlaneBinding {
    /// Plane given once
    Fixed(Plane),
    /// Plane re-sampled at every refresh
    Linked(Arc<dyn DerivedPlaneProvider>),
}

impl PlaneBinding {
    pub fn current(&self) -> Plane {
        match self {
            PlaneBinding::Fixed(plane) => *plane,
            PlaneBinding::Linked(provider) => provider.derived_plane(),
        }
    }
}

impl std::fmt::Debug for PlaneBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaneBinding::Fixed(plane) => f.debug_tuple("Fixed").field(plane).finish(),
            PlaneBinding::Linked(provider) => {
                f.debug_tuple("Linked").field(&provider.derived_plane()).finish()
            }
        }
    }
}

/// Snapshot of the six clip planes, cheap to copy into culling code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumPlanes {
    pub planes: [Plane; 6],
    /// Far plane is not tested (infinite far distance)
    pub infinite_far: bool,
}

impl FrustumPlanes {
    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which.index()]
    }

    fn tested(&self) -> impl Iterator<Item = (FrustumPlane, &Plane)> {
        let skip_far = self.infinite_far;
        FrustumPlane::ALL
            .iter()
            .copied()
            .filter(move |p| !(skip_far && *p == FrustumPlane::Far))
            .map(move |p| (p, &self.planes[p.index()]))
    }

    /// Box is culled by the first plane that has all 8 corners on its negative side.
    pub fn classify_aabb(&self, aabb: &AABB) -> CullResult {
        if aabb.is_null() {
            return CullResult::Empty;
        }
        if aabb.is_infinite() {
            return CullResult::Visible;
        }
        let center = aabb.center();
        let half_size = aabb.half_size();
        for (which, plane) in self.tested() {
            if plane.side_of_box(center, half_size) == PlaneSide::Negative {
                return CullResult::Culled(which);
            }
        }
        CullResult::Visible
    }

    pub fn classify_sphere(&self, sphere: &Sphere) -> CullResult {
        for (which, plane) in self.tested() {
            if plane.distance(sphere.center) < -sphere.radius {
                return CullResult::Culled(which);
            }
        }
        CullResult::Visible
    }

    pub fn classify_point(&self, point: Vec3) -> CullResult {
        for (which, plane) in self.tested() {
            if plane.side_of_point(point) == PlaneSide::Negative {
                return CullResult::Culled(which);
            }
        }
        CullResult::Visible
    }

    /// 3-way test for hierarchical structures.
    pub fn test_aabb(&self, aabb: &AABB) -> FrustumTest {
        if aabb.is_null() {
            return FrustumTest::Outside;
        }
        if aabb.is_infinite() {
            return FrustumTest::Partial;
        }
        let center = aabb.center();
        let half_size = aabb.half_size();
        let mut all_inside = true;
        for (_, plane) in self.tested() {
            match plane.side_of_box(center, half_size) {
                PlaneSide::Negative => return FrustumTest::Outside,
                PlaneSide::Both => all_inside = false,
                _ => {}
            }
        }
        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }
}

/// Near-plane rectangle in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdcRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl NdcRect {
    pub const FULL: NdcRect = NdcRect { left: -1.0, top: 1.0, right: 1.0, bottom: -1.0 };
}

/// View frustum with lazily derived matrices and planes.
#[derive(Clone)]
pub struct Frustum {
    projection_type: ProjectionType,
    fov_y: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
    ortho_height: Option<f32>,

    position: Vec3,
    orientation: Quat,

    builder: Arc<dyn ProjectionBuilder + Send + Sync>,

    reflection: Option<PlaneBinding>,
    reflection_plane: Plane,
    reflection_matrix: Mat4,
    oblique: Option<PlaneBinding>,
    oblique_plane: Plane,

    // Derived
    window: Vec4,
    projection: Mat4,
    standard_projection: Mat4,
    view: Mat4,
    planes: [Plane; 6],
    world_corners: [Vec3; 8],

    shape_dirty: bool,
    pose_dirty: bool,
}

impl std::fmt::Debug for Frustum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frustum")
            .field("projection_type", &self.projection_type)
            .field("fov_y", &self.fov_y)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("near", &self.near)
            .field("far", &self.far)
            .field("position", &self.position)
            .field("orientation", &self.orientation)
            .field("reflection", &self.reflection)
            .field("oblique", &self.oblique)
            .finish()
    }
}

impl Default for Frustum {
    fn default() -> Self {
        Self::new()
    }
}

impl Frustum {
    /// Perspective frustum: 45° FOV, aspect 4:3, near 100, far 100000,
    /// at the origin looking down -Z.
    pub fn new() -> Self {
        Self {
            projection_type: ProjectionType::Perspective,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 4.0 / 3.0,
            near: 100.0,
            far: 100000.0,
            ortho_height: None,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            builder: Arc::new(DepthRange::MinusOneToOne),
            reflection: None,
            reflection_plane: Plane::default(),
            reflection_matrix: Mat4::IDENTITY,
            oblique: None,
            oblique_plane: Plane::default(),
            window: Vec4::ZERO,
            projection: Mat4::IDENTITY,
            standard_projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            planes: [Plane::default(); 6],
            world_corners: [Vec3::ZERO; 8],
            shape_dirty: true,
            pose_dirty: true,
        }
    }

    /// Perspective frustum with explicit parameters.
    pub fn perspective(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Result<Self> {
        let mut frustum = Self::new();
        frustum.set_fov_y(fov_y);
        frustum.set_aspect_ratio(aspect_ratio);
        frustum.set_near(near)?;
        frustum.set_far(far)?;
        Ok(frustum)
    }

    // ===== SHAPE =====

    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        self.projection_type = projection_type;
        self.invalidate_shape();
    }

    /// Vertical field of view in radians.
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn set_fov_y(&mut self, fov_y: f32) {
        self.fov_y = fov_y;
        self.invalidate_shape();
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.invalidate_shape();
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    /// Set the near distance. Must be strictly positive.
    pub fn set_near(&mut self, near: f32) -> Result<()> {
        if !(near > 0.0) {
            engine_bail!(SOURCE, Configuration, "Near clip distance must be greater than zero, got {}", near);
        }
        self.near = near;
        self.invalidate_shape();
        Ok(())
    }

    /// Far distance, 0 for an infinite far plane.
    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn is_infinite_far(&self) -> bool {
        self.far == 0.0
    }

    /// Set the far distance. 0 selects an infinite far plane.
    pub fn set_far(&mut self, far: f32) -> Result<()> {
        if far < 0.0 || far.is_nan() {
            engine_bail!(SOURCE, Configuration, "Far clip distance must be >= 0, got {}", far);
        }
        self.far = far;
        self.invalidate_shape();
        Ok(())
    }

    /// Height of the orthographic view window.
    ///
    /// Defaults to the height of the perspective window at the near plane.
    pub fn ortho_window_height(&self) -> f32 {
        self.ortho_height
            .unwrap_or_else(|| 2.0 * self.near * (self.fov_y * 0.5).tan())
    }

    pub fn set_ortho_window_height(&mut self, height: f32) {
        self.ortho_height = Some(height);
        self.invalidate_shape();
    }

    pub fn set_projection_builder(&mut self, builder: Arc<dyn ProjectionBuilder + Send + Sync>) {
        self.builder = builder;
        self.invalidate_shape();
    }

    pub fn projection_builder(&self) -> &Arc<dyn ProjectionBuilder + Send + Sync> {
        &self.builder
    }

    // ===== POSE =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// World-space view direction (-Z of the orientation).
    pub fn direction(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Set world position and orientation. Unchanged values leave the view clean.
    pub fn set_pose(&mut self, position: Vec3, orientation: Quat) {
        let orientation = orientation.normalize();
        if position != self.position || orientation != self.orientation {
            self.position = position;
            self.orientation = orientation;
            self.invalidate_pose();
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.set_pose(position, self.orientation);
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.set_pose(self.position, orientation);
    }

    /// Orient so that the view direction points at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        let orientation = Quat::from_rotation_arc(Vec3::NEG_Z, dir);
        self.set_orientation(orientation);
    }

    // ===== REFLECTION / OBLIQUE =====

    pub fn enable_reflection(&mut self, binding: PlaneBinding) {
        self.reflection_plane = binding.current();
        self.reflection_matrix = self.builder.reflection_matrix(&self.reflection_plane);
        self.reflection = Some(binding);
        self.invalidate_pose();
    }

    pub fn disable_reflection(&mut self) {
        self.reflection = None;
        self.reflection_matrix = Mat4::IDENTITY;
        self.invalidate_pose();
    }

    pub fn is_reflected(&self) -> bool {
        self.reflection.is_some()
    }

    /// Reflection matrix, identity when not reflecting.
    pub fn reflection_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.reflection_matrix
    }

    /// Clip the near plane to a world-space plane (positive side kept).
    pub fn enable_custom_near_clip_plane(&mut self, binding: PlaneBinding) {
        self.oblique_plane = binding.current();
        self.oblique = Some(binding);
        self.invalidate_shape();
    }

    pub fn disable_custom_near_clip_plane(&mut self) {
        self.oblique = None;
        self.invalidate_shape();
    }

    pub fn is_custom_near_clip_plane_enabled(&self) -> bool {
        self.oblique.is_some()
    }

    // ===== DIRTY STATE =====

    pub fn is_shape_dirty(&self) -> bool {
        self.shape_dirty
    }

    pub fn is_pose_dirty(&self) -> bool {
        self.pose_dirty
    }

    fn invalidate_shape(&mut self) {
        self.shape_dirty = true;
    }

    fn invalidate_pose(&mut self) {
        self.pose_dirty = true;
    }

    /// Re-sample linked planes and mark the matching state dirty on change.
    fn sample_bindings(&mut self) {
        if let Some(PlaneBinding::Linked(provider)) = &self.reflection {
            let plane = provider.derived_plane();
            if plane != self.reflection_plane {
                self.reflection_plane = plane;
                self.reflection_matrix = self.builder.reflection_matrix(&plane);
                self.pose_dirty = true;
            }
        }
        if let Some(PlaneBinding::Linked(provider)) = &self.oblique {
            let plane = provider.derived_plane();
            if plane != self.oblique_plane {
                self.oblique_plane = plane;
                self.shape_dirty = true;
            }
        }
    }

    // ===== REFRESH =====

    /// Bring every derived value up to date.
    pub fn refresh(&mut self) {
        self.sample_bindings();
        if !self.shape_dirty && !self.pose_dirty {
            return;
        }
        if self.pose_dirty {
            self.update_view();
        }
        self.update_projection();
        self.update_planes();
        self.update_world_corners();
        self.shape_dirty = false;
        self.pose_dirty = false;
    }

    fn update_view(&mut self) {
        let rotation_t = Mat4::from_quat(self.orientation.conjugate());
        let mut view = rotation_t * Mat4::from_translation(-self.position);
        if self.reflection.is_some() {
            view = view * self.reflection_matrix;
        }
        self.view = view;
    }

    fn compute_window(&self) -> Vec4 {
        let (half_w, half_h) = match self.projection_type {
            ProjectionType::Perspective => {
                let half_h = (self.fov_y * 0.5).tan() * self.near;
                (half_h * self.aspect_ratio, half_h)
            }
            ProjectionType::Orthographic => {
                let half_h = self.ortho_window_height() * 0.5;
                (half_h * self.aspect_ratio, half_h)
            }
        };
        // left, right, bottom, top
        Vec4::new(-half_w, half_w, -half_h, half_h)
    }

    fn update_projection(&mut self) {
        let w = self.compute_window();
        self.window = w;

        let (mut standard, mut native) = match self.projection_type {
            ProjectionType::Perspective => (
                self.builder.perspective(w.x, w.y, w.z, w.w, self.near, self.far, true),
                self.builder.perspective(w.x, w.y, w.z, w.w, self.near, self.far, false),
            ),
            ProjectionType::Orthographic => (
                self.builder.orthographic(w.x, w.y, w.z, w.w, self.near, self.far, true),
                self.builder.orthographic(w.x, w.y, w.z, w.w, self.near, self.far, false),
            ),
        };

        if self.oblique.is_some() && self.projection_type == ProjectionType::Perspective {
            let view_plane = self.oblique_plane.transformed(&self.view).normalized();
            self.builder.apply_oblique_depth_projection(&mut standard, &view_plane, true);
            self.builder.apply_oblique_depth_projection(&mut native, &view_plane, false);
        }

        self.standard_projection = standard;
        self.projection = native;
    }

    fn update_planes(&mut self) {
        let combo = self.standard_projection * self.view;
        let r0 = combo.row(0);
        let r1 = combo.row(1);
        let r3 = combo.row(3);

        let mut planes = [Plane::default(); 6];
        planes[FrustumPlane::Left.index()] = Plane::from_vec4(r3 + r0);
        planes[FrustumPlane::Right.index()] = Plane::from_vec4(r3 - r0);
        planes[FrustumPlane::Top.index()] = Plane::from_vec4(r3 - r1);
        planes[FrustumPlane::Bottom.index()] = Plane::from_vec4(r3 + r1);

        // Near/far from eye position and direction, not from the combined
        // matrix, which loses precision at grazing angles.
        let eye_to_world = self.view.inverse();
        let eye = eye_to_world.transform_point3(Vec3::ZERO);
        let forward = eye_to_world.transform_vector3(Vec3::NEG_Z).normalize_or_zero();

        planes[FrustumPlane::Near.index()] = if self.oblique.is_some() {
            self.oblique_plane
        } else {
            Plane::new(forward, -(forward.dot(eye) + self.near))
        };
        let far = if self.far == 0.0 { INFINITE_FAR_PLANE_DISTANCE } else { self.far };
        planes[FrustumPlane::Far.index()] = Plane::new(-forward, forward.dot(eye) + far);

        for plane in &mut planes {
            plane.normalize();
        }
        self.planes = planes;
    }

    fn update_world_corners(&mut self) {
        let eye_to_world = self.view.inverse();
        let w = self.window;
        let (left, right, bottom, top) = (w.x, w.y, w.z, w.w);

        let far = if self.far == 0.0 { INFINITE_FAR_PLANE_DISTANCE } else { self.far };
        let ratio = match self.projection_type {
            ProjectionType::Perspective => far / self.near,
            ProjectionType::Orthographic => 1.0,
        };
        let n = self.near;

        let view_corners = [
            Vec3::new(right, top, -n),
            Vec3::new(left, top, -n),
            Vec3::new(left, bottom, -n),
            Vec3::new(right, bottom, -n),
            Vec3::new(right * ratio, top * ratio, -far),
            Vec3::new(left * ratio, top * ratio, -far),
            Vec3::new(left * ratio, bottom * ratio, -far),
            Vec3::new(right * ratio, bottom * ratio, -far),
        ];
        for (world, local) in self.world_corners.iter_mut().zip(view_corners.iter()) {
            *world = eye_to_world.transform_point3(*local);
        }
    }

    // ===== DERIVED ACCESSORS =====

    /// Device projection matrix.
    pub fn projection_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.projection
    }

    /// Canonical right-handed [-1, 1] projection matrix.
    pub fn standard_projection_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.standard_projection
    }

    pub fn view_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.view
    }

    pub fn view_projection_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.projection * self.view
    }

    /// Eye position as seen by the view matrix (mirrored when reflecting).
    pub fn derived_eye_position(&mut self) -> Vec3 {
        self.refresh();
        self.view.inverse().transform_point3(Vec3::ZERO)
    }

    pub fn plane(&mut self, which: FrustumPlane) -> Plane {
        self.refresh();
        self.planes[which.index()]
    }

    /// Snapshot of the clip planes for culling code.
    pub fn culling_planes(&mut self) -> FrustumPlanes {
        self.refresh();
        FrustumPlanes { planes: self.planes, infinite_far: self.far == 0.0 }
    }

    /// Corners 0-3 on the near plane, 4-7 on the far plane, each set
    /// ordered top-right, top-left, bottom-left, bottom-right.
    pub fn world_corners(&mut self) -> [Vec3; 8] {
        self.refresh();
        self.world_corners
    }

    /// World-space box around the frustum volume.
    pub fn world_bounding_box(&mut self) -> AABB {
        AABB::from_points(self.world_corners())
    }

    /// View-space box around the frustum volume.
    pub fn local_bounding_box(&mut self) -> AABB {
        self.refresh();
        let w = self.window;
        let far = if self.far == 0.0 { INFINITE_FAR_PLANE_DISTANCE } else { self.far };
        match self.projection_type {
            ProjectionType::Perspective => {
                let ratio = far / self.near;
                AABB::new(
                    Vec3::new(w.x * ratio, w.z * ratio, -far),
                    Vec3::new(w.y * ratio, w.w * ratio, 0.0),
                )
            }
            ProjectionType::Orthographic => AABB::new(
                Vec3::new(w.x, w.z, -far),
                Vec3::new(w.y, w.w, -self.near),
            ),
        }
    }

    // ===== VISIBILITY =====

    pub fn classify_aabb(&mut self, aabb: &AABB) -> CullResult {
        self.culling_planes().classify_aabb(aabb)
    }

    pub fn classify_sphere(&mut self, sphere: &Sphere) -> CullResult {
        self.culling_planes().classify_sphere(sphere)
    }

    pub fn classify_point(&mut self, point: Vec3) -> CullResult {
        self.culling_planes().classify_point(point)
    }

    pub fn is_aabb_visible(&mut self, aabb: &AABB) -> bool {
        self.classify_aabb(aabb).is_visible()
    }

    pub fn is_sphere_visible(&mut self, sphere: &Sphere) -> bool {
        self.classify_sphere(sphere).is_visible()
    }

    pub fn is_point_visible(&mut self, point: Vec3) -> bool {
        self.classify_point(point).is_visible()
    }

    /// Project a world sphere onto the near plane.
    ///
    /// Returns the clamped NDC rectangle when it is a strict sub-rectangle
    /// of the screen. Returns `None` when the sphere covers the whole near
    /// plane (camera inside the sphere), lies behind the camera, or its
    /// projection spans the full screen anyway.
    pub fn project_sphere(&mut self, sphere: &Sphere) -> Option<NdcRect> {
        self.refresh();
        let eye = self.view.transform_point3(sphere.center);
        if eye.z >= 0.0 {
            return None;
        }

        let r = sphere.radius;
        if eye.length_squared() <= r * r {
            return None;
        }

        let clip = self.standard_projection * eye.extend(1.0);
        let (cx, cy) = if clip.w.abs() > f32::EPSILON {
            (clip.x / clip.w, clip.y / clip.w)
        } else {
            (clip.x, clip.y)
        };

        let (sx, sy) = match self.projection_type {
            ProjectionType::Perspective => (
                self.standard_projection.x_axis.x * r / -eye.z,
                self.standard_projection.y_axis.y * r / -eye.z,
            ),
            ProjectionType::Orthographic => (
                self.standard_projection.x_axis.x * r,
                self.standard_projection.y_axis.y * r,
            ),
        };

        let rect = NdcRect {
            left: (cx - sx).max(-1.0),
            right: (cx + sx).min(1.0),
            top: (cy + sy).min(1.0),
            bottom: (cy - sy).max(-1.0),
        };
        if rect == NdcRect::FULL { None } else { Some(rect) }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
