/// Tests for Scene
///
/// These tests validate object and light lifecycle, index maintenance
/// during update, frustum culling and the per-frame light caches.

use super::*;
use crate::camera::Frustum;
use crate::error::Error;
use crate::graphics_device::Viewport;
use crate::scene::LightType;
use glam::Vec3;

// ============================================================================
// Helper Functions
// ============================================================================

fn create_scene() -> Scene {
    Scene::new(AABB::new(Vec3::splat(-200.0), Vec3::splat(200.0)), 3)
}

fn unit_object(name: &str, center: Vec3) -> SceneObject {
    let mut object = SceneObject::new(name, AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
    object.set_world_transform(Mat4::from_translation(center));
    object
}

/// Camera at the origin looking down -Z, 90° FOV, near 1, far 100.
fn create_camera() -> Camera {
    let frustum = Frustum::perspective(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 100.0).unwrap();
    Camera::new("main", frustum, Viewport::new(100.0, 100.0))
}

fn point_light(name: &str, position: Vec3, range: f32) -> Light {
    let mut light = Light::new(name, LightType::Point);
    light.set_position(position);
    light.set_range(range);
    light
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn test_create_object_indexes_world_box() {
    let mut scene = create_scene();
    let key = scene.create_object(unit_object("a", Vec3::new(10.0, 0.0, 0.0)));

    assert_eq!(scene.object_count(), 1);
    assert_eq!(scene.index().len(), 1);
    assert_eq!(scene.query_aabb(&AABB::new(Vec3::splat(8.0), Vec3::new(12.0, 1.0, 1.0))), vec![key]);
    assert!(scene.query_aabb(&AABB::new(Vec3::splat(-5.0), Vec3::splat(-4.0))).is_empty());
}

#[test]
fn test_remove_object() {
    let mut scene = create_scene();
    let key = scene.create_object(unit_object("a", Vec3::ZERO));

    let removed = scene.remove_object(key).unwrap();
    assert_eq!(removed.name(), "a");
    assert_eq!(scene.object_count(), 0);
    assert!(scene.index().is_empty());
    assert!(scene.object(key).is_none());
}

#[test]
fn test_remove_unknown_object_fails() {
    let mut scene = create_scene();
    let key = scene.create_object(unit_object("a", Vec3::ZERO));
    scene.remove_object(key).unwrap();

    assert!(matches!(scene.remove_object(key), Err(Error::Configuration(_))));
    assert!(scene.set_object_transform(key, Mat4::IDENTITY).is_err());
}

#[test]
fn test_update_reindexes_moved_object() {
    let mut scene = create_scene();
    let key = scene.create_object(unit_object("a", Vec3::ZERO));

    scene.set_object_transform(key, Mat4::from_translation(Vec3::new(50.0, 0.0, 0.0))).unwrap();
    scene.update().unwrap();

    let sphere = Sphere::new(Vec3::new(50.0, 0.0, 0.0), 2.0);
    assert_eq!(scene.query_sphere(&sphere), vec![key]);
    assert!(scene.query_sphere(&Sphere::new(Vec3::ZERO, 0.5)).is_empty());
}

#[test]
fn test_update_follows_object_node() {
    let mut scene = create_scene();
    let graph = scene.graph_mut();
    let node = graph.create_child(graph.root(), "mover").unwrap();

    let mut object = unit_object("a", Vec3::ZERO);
    object.attach_to_node(Some(node));
    let key = scene.create_object(object);

    scene.graph_mut().set_position(node, Vec3::new(0.0, 30.0, 0.0)).unwrap();
    scene.update().unwrap();

    let center = scene.object(key).unwrap().world_bounding_box().center();
    assert!(center.abs_diff_eq(Vec3::new(0.0, 30.0, 0.0), 1e-5));
    assert_eq!(scene.query_sphere(&Sphere::new(Vec3::new(0.0, 30.0, 0.0), 1.0)), vec![key]);
}

// ============================================================================
// Culling
// ============================================================================

#[test]
fn test_frustum_cull_keeps_visible_objects() {
    let mut scene = create_scene();
    let front = scene.create_object(unit_object("front", Vec3::new(0.0, 0.0, -10.0)));
    scene.create_object(unit_object("behind", Vec3::new(0.0, 0.0, 10.0)));
    let hidden = scene.create_object(unit_object("hidden", Vec3::new(0.0, 0.0, -20.0)));
    scene.object_mut(hidden).unwrap().set_visible(false);
    scene.update().unwrap();

    let mut camera = create_camera();
    let view = scene.frustum_cull(&mut camera).unwrap();

    assert_eq!(view.visible_objects(), &[front]);
    assert!(view.visible_bounds().center().abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
}

#[test]
fn test_frustum_cull_empty_scene() {
    let mut scene = create_scene();
    let mut camera = create_camera();
    let view = scene.frustum_cull(&mut camera).unwrap();

    assert_eq!(view.visible_count(), 0);
    assert!(view.visible_bounds().is_null());
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn test_lights_affecting_frustum() {
    let mut scene = create_scene();
    let sun = scene.create_light(Light::new("sun", LightType::Directional));
    let near = scene.create_light(point_light("near", Vec3::new(0.0, 0.0, -20.0), 5.0));
    scene.create_light(point_light("far", Vec3::new(500.0, 0.0, 0.0), 10.0));

    let mut camera = create_camera();
    let planes = camera.frustum_mut().culling_planes();
    let mut lights = scene.find_lights_affecting_frustum(&planes).to_vec();
    lights.sort();

    let mut expected = vec![sun, near];
    expected.sort();
    assert_eq!(lights, expected);
}

#[test]
fn test_light_cache_lives_for_one_frame() {
    let mut scene = create_scene();
    let lamp = scene.create_light(point_light("lamp", Vec3::new(0.0, 0.0, -20.0), 5.0));

    let mut camera = create_camera();
    let planes = camera.frustum_mut().culling_planes();
    assert_eq!(scene.find_lights_affecting_frustum(&planes), &[lamp]);

    // Moving the light mid-frame is not seen until the counter changes
    scene.light_mut(lamp).unwrap().set_position(Vec3::new(500.0, 0.0, 0.0));
    assert_eq!(scene.find_lights_affecting_frustum(&planes), &[lamp]);

    scene.next_frame();
    assert!(scene.find_lights_affecting_frustum(&planes).is_empty());
}

#[test]
fn test_object_lights_sorted_by_distance() {
    let mut scene = create_scene();
    let key = scene.create_object(unit_object("a", Vec3::new(0.0, 0.0, -10.0)));
    let sun = scene.create_light(Light::new("sun", LightType::Directional));
    let far = scene.create_light(point_light("far", Vec3::new(0.0, 0.0, -30.0), 50.0));
    let close = scene.create_light(point_light("close", Vec3::new(0.0, 3.0, -10.0), 5.0));
    scene.create_light(point_light("out_of_reach", Vec3::new(0.0, 0.0, -60.0), 5.0));

    let mut camera = create_camera();
    let planes = camera.frustum_mut().culling_planes();
    scene.find_lights_affecting_frustum(&planes);

    assert_eq!(scene.lights_for_object(key).unwrap(), &[sun, close, far]);
}

#[test]
fn test_object_lights_unknown_object() {
    let mut scene = create_scene();
    let key = scene.create_object(unit_object("a", Vec3::ZERO));
    scene.remove_object(key).unwrap();

    assert!(matches!(scene.lights_for_object(key), Err(Error::State(_))));
}

#[test]
fn test_remove_light() {
    let mut scene = create_scene();
    let key = scene.create_light(Light::new("sun", LightType::Directional));

    assert_eq!(scene.remove_light(key).unwrap().name(), "sun");
    assert_eq!(scene.light_count(), 0);
    assert!(scene.remove_light(key).is_err());
}
