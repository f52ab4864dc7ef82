use std::f32::consts::FRAC_PI_2;
use glam::{Mat4, Vec3};
use crate::camera::{Camera, Frustum};
use crate::graphics_device::Viewport;
use crate::math::AABB;
use crate::scene::{ObjectPass, SceneObject};
use super::*;

fn create_scene() -> Scene {
    Scene::new(AABB::new(Vec3::splat(-500.0), Vec3::splat(500.0)), 3)
}

fn create_camera() -> Camera {
    let frustum = Frustum::perspective(FRAC_PI_2, 1.0, 1.0, 100.0).unwrap();
    Camera::new("main", frustum, Viewport::new(100.0, 100.0))
}

fn add_object(scene: &mut Scene, z: f32, passes: Vec<ObjectPass>, transparent: bool) -> ObjectKey {
    let mut object = SceneObject::new("object", AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
    object.set_world_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, z)));
    object.set_passes(passes);
    object.set_transparent(transparent);
    scene.create_object(object)
}

fn build(scene: &mut Scene) -> RenderQueue {
    scene.update().unwrap();
    let mut camera = create_camera();
    let view = scene.frustum_cull(&mut camera).unwrap();
    RenderQueue::build(scene, &view)
}

fn entry(scene: &mut Scene, sort_key: u32) -> QueuedPass {
    let object = add_object(scene, -10.0, Vec::new(), false);
    QueuedPass {
        object,
        pass: 0,
        sort_key,
        kind: PassKind::Ambient,
        world: Mat4::IDENTITY,
        casts_shadows: true,
        receives_shadows: true,
    }
}

// ============================================================================
// Solids
// ============================================================================

#[test]
fn test_solids_sorted_by_key() {
    let mut scene = create_scene();
    let mut queue = RenderQueue::new();
    for key in [7, 3, 0x8000_0000, 3, 1] {
        let e = entry(&mut scene, key);
        queue.add_solid(e);
    }

    queue.sort();

    let keys: Vec<u32> = queue.solids().iter().map(|e| e.sort_key).collect();
    assert_eq!(keys, vec![1, 3, 3, 7, 0x8000_0000]);
}

#[test]
fn test_equal_keys_keep_submission_order() {
    let mut scene = create_scene();
    let mut queue = RenderQueue::new();
    let first = entry(&mut scene, 5);
    let second = entry(&mut scene, 5);
    let low = entry(&mut scene, 2);
    queue.add_solid(first);
    queue.add_solid(second);
    queue.add_solid(low);

    queue.sort();

    let objects: Vec<ObjectKey> = queue.solids().iter().map(|e| e.object).collect();
    assert_eq!(objects, vec![low.object, first.object, second.object]);
}

#[test]
fn test_build_queues_visible_passes() {
    let mut scene = create_scene();
    let visible = add_object(
        &mut scene,
        -10.0,
        vec![ObjectPass::new(2, PassKind::Ambient), ObjectPass::new(1, PassKind::PerLight)],
        false,
    );
    add_object(&mut scene, 10.0, vec![ObjectPass::new(0, PassKind::Ambient)], false);

    let queue = build(&mut scene);

    assert_eq!(queue.solid_count(), 2);
    assert_eq!(queue.transparent_count(), 0);
    assert!(queue.solids().iter().all(|e| e.object == visible));
    assert_eq!(queue.solids()[0].kind, PassKind::PerLight);
    assert_eq!(queue.solids()[0].pass, 1);
    assert_eq!(queue.solids_of_kind(PassKind::Ambient).count(), 1);
}

// ============================================================================
// Transparents
// ============================================================================

#[test]
fn test_transparents_back_to_front() {
    let mut scene = create_scene();
    let passes = || vec![ObjectPass::new(0, PassKind::Ambient), ObjectPass::new(0, PassKind::PerLight)];
    let near = add_object(&mut scene, -5.0, passes(), true);
    let far = add_object(&mut scene, -50.0, passes(), true);
    let middle = add_object(&mut scene, -20.0, passes(), true);

    let queue = build(&mut scene);

    let order: Vec<(ObjectKey, usize)> = queue.transparents().map(|e| (e.object, e.pass)).collect();
    assert_eq!(
        order,
        vec![(far, 0), (far, 1), (middle, 0), (middle, 1), (near, 0), (near, 1)]
    );
    assert_eq!(queue.solid_count(), 0);
}

#[test]
fn test_clear() {
    let mut scene = create_scene();
    add_object(&mut scene, -10.0, vec![ObjectPass::new(0, PassKind::Ambient)], false);
    let mut queue = build(&mut scene);
    assert!(!queue.is_empty());

    queue.clear();
    assert!(queue.is_empty());
}
