/// TransformNode - local transform, derived transform caches and dirty state.
///
/// The node itself holds data only. All operations that need to look at
/// the parent or children go through `NodeGraph`.

use glam::{Mat4, Quat, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::new_key_type;
use super::node_graph::NodeListener;

new_key_type! {
    /// Stable key for a node in a `NodeGraph`
    pub struct NodeKey;
}

/// Space in which a relative translation or rotation is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpace {
    /// Node's own axes
    Local,
    /// Parent's axes
    Parent,
    /// World axes
    World,
}

/// A node of the transform hierarchy.
pub struct TransformNode {
    pub(super) name: String,
    pub(super) parent: Option<NodeKey>,
    /// Children by name (unique among siblings)
    pub(super) children: FxHashMap<String, NodeKey>,
    /// Children that asked for an update since the last `update`
    pub(super) children_to_update: FxHashSet<NodeKey>,

    pub(super) need_parent_update: bool,
    pub(super) need_child_update: bool,
    pub(super) parent_notified: bool,
    pub(super) need_transform_update: bool,
    pub(super) need_relative_transform_update: bool,

    pub(super) position: Vec3,
    pub(super) orientation: Quat,
    pub(super) scale: Vec3,
    pub(super) inherit_orientation: bool,
    pub(super) inherit_scale: bool,

    pub(super) derived_position: Vec3,
    pub(super) derived_orientation: Quat,
    pub(super) derived_scale: Vec3,
    pub(super) cached_transform: Mat4,
    pub(super) cached_relative_transform: Mat4,

    // Animation baseline
    pub(super) initial_position: Vec3,
    pub(super) initial_orientation: Quat,
    pub(super) initial_scale: Vec3,
    pub(super) translation_from_initial: Vec3,
    pub(super) rotation_from_initial: Quat,
    pub(super) scale_from_initial: Vec3,
    pub(super) accum_anim_weight: f32,

    pub(super) listener: Option<NodeListener>,
}

impl TransformNode {
    pub(super) fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: FxHashMap::default(),
            children_to_update: FxHashSet::default(),
            need_parent_update: true,
            need_child_update: false,
            parent_notified: false,
            need_transform_update: true,
            need_relative_transform_update: true,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
            inherit_orientation: true,
            inherit_scale: true,
            derived_position: Vec3::ZERO,
            derived_orientation: Quat::IDENTITY,
            derived_scale: Vec3::ONE,
            cached_transform: Mat4::IDENTITY,
            cached_relative_transform: Mat4::IDENTITY,
            initial_position: Vec3::ZERO,
            initial_orientation: Quat::IDENTITY,
            initial_scale: Vec3::ONE,
            translation_from_initial: Vec3::ZERO,
            rotation_from_initial: Quat::IDENTITY,
            scale_from_initial: Vec3::ONE,
            accum_anim_weight: 0.0,
            listener: None,
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Local position relative to the parent.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local orientation relative to the parent.
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Local scale.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn inherit_orientation(&self) -> bool {
        self.inherit_orientation
    }

    pub fn inherit_scale(&self) -> bool {
        self.inherit_scale
    }

    pub fn initial_position(&self) -> Vec3 {
        self.initial_position
    }

    pub fn initial_orientation(&self) -> Quat {
        self.initial_orientation
    }

    pub fn initial_scale(&self) -> Vec3 {
        self.initial_scale
    }

    /// True until the derived state has been recomputed from the parent.
    pub fn needs_parent_update(&self) -> bool {
        self.need_parent_update
    }

    /// True when every child must be refreshed on the next `update`.
    pub fn needs_child_update(&self) -> bool {
        self.need_child_update
    }

    /// True once this node registered itself with its parent this cycle.
    pub fn is_parent_notified(&self) -> bool {
        self.parent_notified
    }

    /// Children currently waiting for a selective update.
    pub fn pending_children(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.children_to_update.iter().copied()
    }

    // ===== INTERNAL =====

    /// Local TRS matrix: scale, then rotate, then translate.
    pub(super) fn make_transform(position: Vec3, orientation: Quat, scale: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(scale, orientation, position)
    }
}
