/// Shadow texture cameras.
///
/// Texture shadows render the casters of each light from the light's
/// point of view into a square texture, which receivers then sample. This
/// module places those light cameras; the passes themselves are driven by
/// the scene renderer.
///
/// Placement per light type:
/// - directional: orthographic, centred a little ahead of the viewer and
///   backed off along the light direction, snapped to whole texels
/// - spot: perspective from the light along its direction, FOV from the
///   outer cone angle
/// - point: perspective from the light, 120° wide, facing the way the
///   viewer faces

use std::f32::consts::PI;
use std::sync::Arc;
use glam::{Mat3, Quat, Vec3};
use crate::camera::{Camera, Frustum, ProjectionType};
use crate::engine_debug;
use crate::error::Result;
use crate::graphics_device::{ProjectionBuilder, Viewport};
use crate::scene::{Light, LightType};
use super::settings::ShadowSettings;

const SOURCE: &str = "umbra3d::TextureShadows";

/// Spot cone widening applied to the shadow camera FOV
const SPOT_FOV_SCALE: f32 = 1.2;
const POINT_FOV: f32 = 2.0 * PI / 3.0;

/// Distances derived from the settings and the viewing camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowTextureLayout {
    /// Depth covered by directional shadow textures
    pub distance: f32,
    /// How far ahead of the viewer directional shadow cameras are centred
    pub offset: f32,
    /// Receiver distance where shadows start fading out
    pub fade_start: f32,
    /// Receiver distance where shadows are gone
    pub fade_end: f32,
}

impl ShadowTextureLayout {
    pub fn new(settings: &ShadowSettings, camera_near: f32) -> Self {
        let distance = settings.shadow_camera_distance(camera_near);
        let offset = distance * settings.texture_offset;
        let end = distance + offset;
        let layout = Self {
            distance,
            offset,
            fade_start: end * settings.texture_fade_start,
            fade_end: end * settings.texture_fade_end,
        };
        engine_debug!(SOURCE, "Shadow textures: {} x {}px, distance {}, offset {}, fade {}..{}",
            settings.texture_count, settings.texture_size, layout.distance, layout.offset,
            layout.fade_start, layout.fade_end);
        layout
    }
}

/// Camera rendering shadow texture `index`.
pub fn create_shadow_camera(
    index: usize,
    settings: &ShadowSettings,
    builder: Arc<dyn ProjectionBuilder + Send + Sync>,
) -> Result<Camera> {
    let mut frustum = Frustum::new();
    frustum.set_projection_builder(builder);
    // Shadow cameras are bounded by their near plane and light placement
    frustum.set_far(0.0)?;
    let size = settings.texture_size as f32;
    Ok(Camera::new(format!("umbra3d::ShadowCamera{}", index), frustum, Viewport::new(size, size)))
}

/// Orientation whose +Z axis is `back` (the camera looks down -Z).
fn orientation_facing_away_from(back: Vec3) -> Quat {
    let mut up = Vec3::Y;
    if back.dot(up).abs() >= 1.0 - 1e-4 {
        up = Vec3::Z;
    }
    let left = back.cross(up).normalize();
    let up = back.cross(left).normalize();
    Quat::from_mat3(&Mat3::from_cols(left, up, back))
}

/// Place `shadow_camera` to render the shadow texture of `light` as seen by `viewer`.
pub fn configure_shadow_camera(
    shadow_camera: &mut Camera,
    viewer: &mut Camera,
    light: &Light,
    layout: &ShadowTextureLayout,
    settings: &ShadowSettings,
) -> Result<()> {
    let size = settings.texture_size as f32;
    if shadow_camera.viewport().width != size {
        shadow_camera.set_viewport(Viewport::new(size, size));
    }

    let viewer_near = viewer.frustum().near();
    let viewer_position = viewer.frustum_mut().derived_eye_position();
    let viewer_direction = viewer.frustum().direction();

    let frustum = shadow_camera.frustum_mut();
    frustum.set_aspect_ratio(1.0);

    match light.light_type() {
        LightType::Directional => {
            frustum.set_projection_type(ProjectionType::Orthographic);
            frustum.set_fov_y(PI / 2.0);
            frustum.set_near(layout.distance)?;
            frustum.set_ortho_window_height(layout.distance * 2.0);

            let target = viewer_position + viewer_direction * layout.offset;
            let mut position = target - light.derived_direction() * settings.directional_light_extrusion_distance;
            let back = (position - target).normalize_or_zero();
            if back == Vec3::ZERO {
                return Ok(());
            }

            // Moving in whole texels keeps the shadow edges from swimming
            let texel = layout.distance * 20.0 / size;
            position -= position % texel;
            frustum.set_pose(position, orientation_facing_away_from(back));
        }
        LightType::Spot => {
            frustum.set_projection_type(ProjectionType::Perspective);
            frustum.set_fov_y((light.spot_outer_angle() * SPOT_FOV_SCALE).clamp(0.01, PI * 0.9));
            frustum.set_near(viewer_near)?;
            frustum.set_position(light.derived_position());
            frustum.look_at(light.derived_position() + light.derived_direction());
        }
        LightType::Point => {
            frustum.set_projection_type(ProjectionType::Perspective);
            frustum.set_fov_y(POINT_FOV);
            frustum.set_near(viewer_near)?;
            frustum.set_position(light.derived_position());
            frustum.look_at(light.derived_position() + viewer_direction);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "texture_shadows_tests.rs"]
mod tests;
