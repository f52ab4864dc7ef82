/// Shadow caster discovery for one light.
///
/// Directional lights query the box spanned by the camera frustum and its
/// extrusion back towards the light. Point and spot lights query their
/// range sphere, and are skipped entirely when the camera cannot see it.
///
/// Candidates must cast shadows, be visible and lie within the shadow far
/// distance. A candidate inside the camera frustum is always kept. One
/// outside it is kept only when the light is outside the frustum (always
/// true for directional lights) and the candidate touches one of the
/// volumes between the frustum faces and the light.

use glam::Vec3;
use crate::camera::Camera;
use crate::math::{AABB, PlaneBoundedVolume};
use crate::scene::{Light, ObjectKey, Scene};
use super::settings::ShadowSettings;
use super::shadow_caster::ShadowCaster;

/// Box enclosing the frustum corners and the same corners pushed
/// `extrusion_distance` towards a directional light.
pub fn directional_caster_bounds(corners: &[Vec3; 8], light_direction: Vec3, extrusion_distance: f32) -> AABB {
    let extrude = light_direction * -extrusion_distance;
    AABB::from_points(corners.iter().flat_map(|&c| [c, c + extrude]))
}

/// Collect the shadow casters of `light` seen from `camera` into `casters`.
///
/// `casters` is cleared first. The caller owns the buffer so nested or
/// concurrent passes never share scratch state.
pub fn find_shadow_casters(
    scene: &Scene,
    light: &Light,
    camera: &mut Camera,
    settings: &ShadowSettings,
    casters: &mut Vec<ObjectKey>,
) {
    casters.clear();
    let frustum = camera.frustum_mut();

    let (candidates, light_in_frustum) = match light.bounding_sphere() {
        None => {
            let bounds = directional_caster_bounds(
                &frustum.world_corners(),
                light.derived_direction(),
                settings.directional_light_extrusion_distance,
            );
            (scene.query_aabb(&bounds), false)
        }
        Some(sphere) => {
            if !frustum.is_sphere_visible(&sphere) {
                return;
            }
            (scene.query_sphere(&sphere), frustum.is_point_visible(light.derived_position()))
        }
    };
    if candidates.is_empty() {
        return;
    }

    // Only worth building when the light sits outside the frustum
    let clip_volumes: Vec<PlaneBoundedVolume> = if light_in_frustum {
        Vec::new()
    } else {
        light.frustum_clip_volumes(frustum)
    };

    let eye = frustum.derived_eye_position();
    let far_distance_squared = light.shadow_far_distance_squared(settings.far_distance);

    for key in candidates {
        let Some(object) = scene.object(key) else {
            continue;
        };
        if !object.casts_shadows() || !object.is_visible() {
            continue;
        }

        if far_distance_squared > 0.0 {
            let position = object.world_transform().w_axis.truncate();
            let radius = object.world_bounding_sphere().radius;
            if position.distance_squared(eye) - radius * radius > far_distance_squared {
                continue;
            }
        }

        let world_aabb = object.world_bounding_box();
        if frustum.is_aabb_visible(&world_aabb) {
            casters.push(key);
            continue;
        }

        if !light_in_frustum && clip_volumes.iter().any(|v| v.intersects_aabb(&world_aabb)) {
            casters.push(key);
        }
    }
}

#[cfg(test)]
#[path = "caster_query_tests.rs"]
mod tests;
