use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use glam::{Mat4, Quat, Vec3};
use crate::error::Error;
use super::*;

fn approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

/// root → A → B → C, updated once
fn chain() -> (NodeGraph, NodeKey, NodeKey, NodeKey) {
    let mut graph = NodeGraph::new();
    let a = graph.create_child(graph.root(), "A").unwrap();
    let b = graph.create_child(a, "B").unwrap();
    let c = graph.create_child(b, "C").unwrap();
    graph.update_root().unwrap();
    (graph, a, b, c)
}

fn counting_listener(counter: &Arc<AtomicUsize>) -> NodeListener {
    let counter = counter.clone();
    Box::new(move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

// ============================================================================
// Hierarchy edits
// ============================================================================

#[test]
fn test_create_child_links_parent() {
    let (graph, a, b, c) = chain();
    assert_eq!(graph.parent(b), Some(a));
    assert_eq!(graph.child(b, "C"), Some(c));
    assert_eq!(graph.node(a).unwrap().child_count(), 1);
    assert_eq!(graph.len(), 4);
}

#[test]
fn test_self_parenting_rejected() {
    let mut graph = NodeGraph::new();
    let a = graph.create_node("A");
    let result = graph.add_child(a, a);
    assert!(matches!(result, Err(Error::Configuration(_))));
    assert_eq!(graph.parent(a), None);
    assert_eq!(graph.node(a).unwrap().child_count(), 0);
}

#[test]
fn test_duplicate_sibling_name_rejected_without_mutation() {
    let mut graph = NodeGraph::new();
    let root = graph.root();
    graph.create_child(root, "Twin").unwrap();
    let other = graph.create_node("Twin");

    let result = graph.add_child(root, other);
    assert!(matches!(result, Err(Error::Configuration(_))));
    assert_eq!(graph.node(root).unwrap().child_count(), 1);
    assert_eq!(graph.parent(other), None);

    assert!(matches!(graph.create_child(root, "Twin"), Err(Error::Configuration(_))));
    assert_eq!(graph.len(), 3);
}

#[test]
fn test_cycle_rejected() {
    let (mut graph, a, _, c) = chain();
    graph.detach(a).unwrap();
    let result = graph.add_child(c, a);
    assert!(matches!(result, Err(Error::Configuration(_))));
    assert_eq!(graph.parent(a), None);
}

#[test]
fn test_already_attached_child_rejected() {
    let (mut graph, a, b, c) = chain();
    let result = graph.add_child(a, c);
    assert!(matches!(result, Err(Error::Configuration(_))));
    assert_eq!(graph.parent(c), Some(b));
}

#[test]
fn test_remove_child_detaches() {
    let (mut graph, a, b, _) = chain();
    let removed = graph.remove_child(a, "B").unwrap();
    assert_eq!(removed, b);
    assert_eq!(graph.parent(b), None);
    assert_eq!(graph.child(a, "B"), None);
    assert!(graph.contains(b));

    assert!(matches!(graph.remove_child(a, "B"), Err(Error::Configuration(_))));
}

#[test]
fn test_remove_all_children() {
    let mut graph = NodeGraph::new();
    let root = graph.root();
    let x = graph.create_child(root, "X").unwrap();
    let y = graph.create_child(root, "Y").unwrap();
    graph.remove_all_children(root).unwrap();
    assert_eq!(graph.children(root).count(), 0);
    assert_eq!(graph.parent(x), None);
    assert_eq!(graph.parent(y), None);
}

#[test]
fn test_destroy_node_is_recursive() {
    let (mut graph, a, b, c) = chain();
    graph.destroy_node(b).unwrap();
    assert!(!graph.contains(b));
    assert!(!graph.contains(c));
    assert!(graph.contains(a));
    assert_eq!(graph.child(a, "B"), None);
}

#[test]
fn test_destroy_root_rejected() {
    let mut graph = NodeGraph::new();
    let root = graph.root();
    assert!(matches!(graph.destroy_node(root), Err(Error::Configuration(_))));
}

#[test]
fn test_unknown_key_is_state_error() {
    let (mut graph, _, b, _) = chain();
    graph.destroy_node(b).unwrap();
    assert!(matches!(graph.set_position(b, Vec3::ONE), Err(Error::State(_))));
    assert!(matches!(graph.derived_position(b), Err(Error::State(_))));
}

// ============================================================================
// Derived transform
// ============================================================================

#[test]
fn test_composition_with_inherited_scale() {
    let mut graph = NodeGraph::new();
    let a = graph.create_child(graph.root(), "A").unwrap();
    let b = graph.create_child(a, "B").unwrap();
    let c = graph.create_child(b, "C").unwrap();
    graph.set_position(b, Vec3::new(10.0, 0.0, 0.0)).unwrap();
    graph.set_position(c, Vec3::new(0.0, 5.0, 0.0)).unwrap();
    graph.update_root().unwrap();

    graph.set_scale(a, Vec3::splat(2.0)).unwrap();
    graph.update_root().unwrap();

    assert!(approx_eq(graph.derived_position(c).unwrap(), Vec3::new(20.0, 10.0, 0.0)));
    assert!(approx_eq(graph.derived_scale(c).unwrap(), Vec3::splat(2.0)));
}

#[test]
fn test_inherit_scale_disabled() {
    let (mut graph, a, b, _) = chain();
    graph.set_scale(a, Vec3::splat(3.0)).unwrap();
    graph.set_inherit_scale(b, false).unwrap();
    graph.set_position(b, Vec3::X).unwrap();
    graph.update_root().unwrap();

    assert!(approx_eq(graph.derived_scale(b).unwrap(), Vec3::ONE));
    // Position is still scaled by the parent
    assert!(approx_eq(graph.derived_position(b).unwrap(), Vec3::new(3.0, 0.0, 0.0)));
}

#[test]
fn test_parent_rotation_moves_child() {
    let (mut graph, a, b, _) = chain();
    graph.set_position(b, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    graph.set_orientation(a, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)).unwrap();
    graph.update_root().unwrap();
    assert!(approx_eq(graph.derived_position(b).unwrap(), Vec3::new(0.0, 1.0, 0.0)));
}

#[test]
fn test_lazy_read_without_update() {
    let (mut graph, a, b, _) = chain();
    graph.set_position(a, Vec3::new(0.0, 0.0, -4.0)).unwrap();
    graph.set_position(b, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    // No update() call: the stale node refreshes itself from its parent chain
    assert!(approx_eq(graph.derived_position(b).unwrap(), Vec3::new(1.0, 0.0, -4.0)));
    assert!(!graph.node(a).unwrap().needs_parent_update());
}

#[test]
fn test_derived_reads_are_idempotent() {
    let (mut graph, a, _, c) = chain();
    let counter = Arc::new(AtomicUsize::new(0));
    graph.set_listener(c, Some(counting_listener(&counter))).unwrap();
    graph.set_position(a, Vec3::new(1.0, 2.0, 3.0)).unwrap();
    graph.update_root().unwrap();
    let after_update = counter.load(Ordering::SeqCst);
    assert_eq!(after_update, 1);

    let first = graph.derived_position(c).unwrap();
    let second = graph.derived_position(c).unwrap();
    assert_eq!(first, second);
    assert_eq!(counter.load(Ordering::SeqCst), after_update);
}

#[test]
fn test_listener_receives_derived_values() {
    let (mut graph, a, _, _) = chain();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    graph.set_listener(a, Some(Box::new(move |pos, _, scale| {
        sink.lock().unwrap().push((pos, scale));
    }))).unwrap();

    graph.set_position(a, Vec3::new(5.0, 0.0, 0.0)).unwrap();
    graph.update_root().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], (Vec3::new(5.0, 0.0, 0.0), Vec3::ONE));
}

#[test]
fn test_full_transform_order_scale_rotate_translate() {
    let (mut graph, a, _, _) = chain();
    let rotation = Quat::from_rotation_y(0.3);
    graph.set_scale(a, Vec3::new(2.0, 1.0, 1.0)).unwrap();
    graph.set_orientation(a, rotation).unwrap();
    graph.set_position(a, Vec3::new(0.0, 1.0, 0.0)).unwrap();

    let m = graph.full_transform(a).unwrap();
    let expected = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0))
        * Mat4::from_quat(rotation)
        * Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
    assert!(m.abs_diff_eq(expected, 1e-5));
    assert!(m.abs_diff_eq(graph.relative_transform(a).unwrap(), 1e-5));
}

#[test]
fn test_set_derived_position_round_trip() {
    let (mut graph, a, b, _) = chain();
    graph.set_scale(a, Vec3::splat(2.0)).unwrap();
    graph.set_orientation(a, Quat::from_rotation_y(1.0)).unwrap();
    graph.set_position(a, Vec3::new(3.0, 0.0, 0.0)).unwrap();

    let target = Vec3::new(-4.0, 2.0, 7.0);
    graph.set_derived_position(b, target).unwrap();
    assert!(approx_eq(graph.derived_position(b).unwrap(), target));
}

#[test]
fn test_set_derived_orientation() {
    let (mut graph, a, b, _) = chain();
    graph.set_orientation(a, Quat::from_rotation_x(0.5)).unwrap();
    let target = Quat::from_rotation_z(1.2);
    graph.set_derived_orientation(b, target).unwrap();
    let derived = graph.derived_orientation(b).unwrap();
    assert!(derived.abs_diff_eq(target, 1e-5) || derived.abs_diff_eq(-target, 1e-5));
}

#[test]
fn test_orientation_is_normalized() {
    let (mut graph, a, _, _) = chain();
    graph.set_orientation(a, Quat::from_xyzw(0.0, 0.0, 0.0, 3.0)).unwrap();
    assert!((graph.node(a).unwrap().orientation().length() - 1.0).abs() < 1e-6);
}

// ============================================================================
// Relative transforms
// ============================================================================

#[test]
fn test_translate_spaces() {
    let (mut graph, a, b, _) = chain();
    graph.set_orientation(a, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)).unwrap();
    graph.set_orientation(b, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)).unwrap();

    graph.translate(b, Vec3::X, TransformSpace::Parent).unwrap();
    assert!(approx_eq(graph.node(b).unwrap().position(), Vec3::X));

    graph.set_position(b, Vec3::ZERO).unwrap();
    graph.translate(b, Vec3::X, TransformSpace::Local).unwrap();
    assert!(approx_eq(graph.node(b).unwrap().position(), Vec3::new(0.0, 0.0, -1.0)));

    graph.set_position(b, Vec3::ZERO).unwrap();
    graph.translate(b, Vec3::X, TransformSpace::World).unwrap();
    assert!(approx_eq(graph.derived_position(b).unwrap(), Vec3::X));
}

#[test]
fn test_yaw_world_space() {
    let (mut graph, a, b, _) = chain();
    graph.set_orientation(a, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)).unwrap();
    graph.yaw(b, std::f32::consts::FRAC_PI_2, TransformSpace::World).unwrap();
    let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)
        * Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
    let derived = graph.derived_orientation(b).unwrap();
    assert!(derived.abs_diff_eq(expected, 1e-5) || derived.abs_diff_eq(-expected, 1e-5));
}

// ============================================================================
// Change propagation
// ============================================================================

#[test]
fn test_mark_dirty_twice_registers_once() {
    let (mut graph, a, b, _) = chain();
    assert!(!graph.node(b).unwrap().is_parent_notified());

    graph.set_position(b, Vec3::X).unwrap();
    graph.set_position(b, Vec3::Y).unwrap();
    graph.need_update(b, false).unwrap();

    let pending: Vec<NodeKey> = graph.node(a).unwrap().pending_children().collect();
    assert_eq!(pending, vec![b]);
    assert!(graph.node(b).unwrap().is_parent_notified());
    let root_pending: Vec<NodeKey> = graph.node(graph.root()).unwrap().pending_children().collect();
    assert_eq!(root_pending, vec![a]);
}

#[test]
fn test_update_clears_pending_state() {
    let (mut graph, a, b, _) = chain();
    graph.set_position(b, Vec3::X).unwrap();
    graph.update_root().unwrap();

    assert_eq!(graph.node(a).unwrap().pending_children().count(), 0);
    assert!(!graph.node(b).unwrap().is_parent_notified());
    assert!(!graph.node(b).unwrap().needs_parent_update());
    assert!(!graph.node(b).unwrap().needs_child_update());
}

#[test]
fn test_selective_update_skips_clean_siblings() {
    let mut graph = NodeGraph::new();
    let root = graph.root();
    let left = graph.create_child(root, "Left").unwrap();
    let right = graph.create_child(root, "Right").unwrap();
    graph.update_root().unwrap();

    let counter = Arc::new(AtomicUsize::new(0));
    graph.set_listener(right, Some(counting_listener(&counter))).unwrap();

    graph.set_position(left, Vec3::X).unwrap();
    graph.update_root().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    graph.set_position(root, Vec3::Y).unwrap();
    graph.update_root().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_update_propagates_when_empty() {
    let (mut graph, a, b, _) = chain();
    graph.need_update(b, false).unwrap();
    assert!(graph.node(a).unwrap().is_parent_notified());

    graph.cancel_update(a, b);
    assert_eq!(graph.node(a).unwrap().pending_children().count(), 0);
    assert!(!graph.node(a).unwrap().is_parent_notified());
    assert_eq!(graph.node(graph.root()).unwrap().pending_children().count(), 0);
}

#[test]
fn test_cancel_update_keeps_registration_with_other_pending() {
    let mut graph = NodeGraph::new();
    let a = graph.create_child(graph.root(), "A").unwrap();
    let x = graph.create_child(a, "X").unwrap();
    let y = graph.create_child(a, "Y").unwrap();
    graph.update_root().unwrap();

    graph.need_update(x, false).unwrap();
    graph.need_update(y, false).unwrap();
    graph.cancel_update(a, x);

    let pending: Vec<NodeKey> = graph.node(a).unwrap().pending_children().collect();
    assert_eq!(pending, vec![y]);
    assert!(graph.node(a).unwrap().is_parent_notified());
}

#[test]
fn test_queued_updates() {
    let (mut graph, a, b, _) = chain();
    graph.queue_need_update(b);
    graph.queue_need_update(b);
    assert_eq!(graph.node(a).unwrap().pending_children().count(), 0);

    graph.process_queued_updates();
    assert_eq!(graph.node(a).unwrap().pending_children().count(), 1);
    assert!(graph.node(b).unwrap().needs_parent_update());
}

// ============================================================================
// Initial state / animation blending
// ============================================================================

#[test]
fn test_weighted_transform_blends() {
    let (mut graph, a, _, _) = chain();
    graph.set_initial_state(a).unwrap();

    graph.weighted_transform(a, 1.0, Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE).unwrap();
    assert!(approx_eq(graph.node(a).unwrap().position(), Vec3::new(10.0, 0.0, 0.0)));

    graph.weighted_transform(a, 1.0, Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY, Vec3::splat(3.0)).unwrap();
    assert!(approx_eq(graph.node(a).unwrap().position(), Vec3::new(5.0, 5.0, 0.0)));
    assert!(approx_eq(graph.node(a).unwrap().scale(), Vec3::splat(2.0)));
}

#[test]
fn test_reset_to_initial_state() {
    let (mut graph, a, _, _) = chain();
    graph.set_position(a, Vec3::new(1.0, 1.0, 1.0)).unwrap();
    graph.set_initial_state(a).unwrap();
    graph.weighted_transform(a, 1.0, Vec3::new(4.0, 0.0, 0.0), Quat::from_rotation_y(1.0), Vec3::ONE).unwrap();

    graph.reset_to_initial_state(a).unwrap();
    let node = graph.node(a).unwrap();
    assert_eq!(node.position(), Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(node.orientation(), Quat::IDENTITY);
    assert_eq!(node.initial_position(), Vec3::new(1.0, 1.0, 1.0));

    // Accumulated weight was cleared: next blend starts fresh
    graph.weighted_transform(a, 0.5, Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE).unwrap();
    assert!(approx_eq(graph.node(a).unwrap().position(), Vec3::new(3.0, 1.0, 1.0)));
}
