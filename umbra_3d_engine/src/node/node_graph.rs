/// NodeGraph - arena owning every TransformNode of a scene.
///
/// Change propagation follows a notify-once protocol:
/// - `need_update` flags the node dirty and, unless it already did so this
///   cycle, registers it in the parent's pending set (which recursively
///   registers the parent with the grandparent).
/// - `cancel_update` undoes a registration and propagates upward only when
///   the parent's pending set becomes empty.
/// - `update` is the single recursive refresh entry point, called once per
///   frame on the root.

use glam::{Mat4, Quat, Vec3};
use slotmap::SlotMap;
use crate::error::Result;
use crate::engine_bail;
use crate::engine_err;
use super::transform_node::{NodeKey, TransformNode, TransformSpace};

/// Callback fired with (derived position, derived orientation, derived scale)
/// each time a node's derived transform is actually recomputed.
pub type NodeListener = Box<dyn FnMut(Vec3, Quat, Vec3) + Send + Sync>;

const SOURCE: &str = "umbra3d::NodeGraph";

/// Arena of transform nodes with a single root.
pub struct NodeGraph {
    nodes: SlotMap<NodeKey, TransformNode>,
    root: NodeKey,
    /// Nodes whose `need_update(true)` is deferred to `process_queued_updates`
    queued_updates: Vec<NodeKey>,
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeGraph {
    /// Create a graph containing only the root node.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(TransformNode::new("root".to_string()));
        Self { nodes, root, queued_updates: Vec::new() }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Read access to a node.
    pub fn node(&self, key: NodeKey) -> Option<&TransformNode> {
        self.nodes.get(key)
    }

    fn get(&self, key: NodeKey) -> Result<&TransformNode> {
        match self.nodes.get(key) {
            Some(node) => Ok(node),
            None => Err(engine_err!(SOURCE, State, "Unknown node key {:?}", key)),
        }
    }

    fn get_mut(&mut self, key: NodeKey) -> Result<&mut TransformNode> {
        match self.nodes.get_mut(key) {
            Some(node) => Ok(node),
            None => Err(engine_err!(SOURCE, State, "Unknown node key {:?}", key)),
        }
    }

    // ===== HIERARCHY =====

    /// Create a detached node. Attach it with `add_child`.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeKey {
        self.nodes.insert(TransformNode::new(name.into()))
    }

    /// Create a node and attach it under `parent`.
    ///
    /// # Errors
    ///
    /// `Configuration` if `parent` already has a child with this name,
    /// `State` if `parent` is unknown. Nothing is created on failure.
    pub fn create_child(&mut self, parent: NodeKey, name: impl Into<String>) -> Result<NodeKey> {
        let name = name.into();
        if self.get(parent)?.children.contains_key(&name) {
            engine_bail!(SOURCE, Configuration,
                "Node '{}' already has a child named '{}'", self.nodes[parent].name, name);
        }
        let child = self.create_node(name);
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Attach a detached node under `parent`.
    ///
    /// # Errors
    ///
    /// `Configuration` when the edit is invalid: the child is the parent
    /// itself or one of its ancestors, the child is already attached
    /// somewhere, or a sibling already uses the child's name. The graph is
    /// left untouched on error.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        let parent_node = self.get(parent)?;
        let child_node = self.get(child)?;

        if parent == child {
            engine_bail!(SOURCE, Configuration, "Node '{}' cannot be its own child", child_node.name);
        }
        if let Some(current) = child_node.parent {
            engine_bail!(SOURCE, Configuration,
                "Node '{}' is already a child of '{}'", child_node.name, self.nodes[current].name);
        }
        if parent_node.children.contains_key(&child_node.name) {
            engine_bail!(SOURCE, Configuration,
                "Node '{}' already has a child named '{}'", parent_node.name, child_node.name);
        }
        if self.is_ancestor(child, parent) {
            engine_bail!(SOURCE, Configuration,
                "Adding '{}' under '{}' would create a cycle", child_node.name, parent_node.name);
        }

        let name = child_node.name.clone();
        self.nodes[parent].children.insert(name, child);
        self.notify_of_new_parent(child, Some(parent));
        Ok(())
    }

    /// Detach the child called `name` from `parent` and return it.
    ///
    /// The detached node stays alive in the arena.
    pub fn remove_child(&mut self, parent: NodeKey, name: &str) -> Result<NodeKey> {
        let found = self.get(parent)?.children.get(name).copied();
        let child = match found {
            Some(child) => child,
            None => engine_bail!(SOURCE, Configuration,
                "Node '{}' has no child named '{}'", self.nodes[parent].name, name),
        };
        self.detach_internal(parent, child);
        Ok(child)
    }

    /// Detach a node from its parent, if it has one.
    pub fn detach(&mut self, child: NodeKey) -> Result<()> {
        if let Some(parent) = self.get(child)?.parent {
            self.detach_internal(parent, child);
        }
        Ok(())
    }

    /// Detach every child of `parent`.
    pub fn remove_all_children(&mut self, parent: NodeKey) -> Result<()> {
        let children: Vec<NodeKey> = self.get(parent)?.children.values().copied().collect();
        for child in children {
            self.detach_internal(parent, child);
        }
        Ok(())
    }

    /// Destroy a node and, recursively, all its descendants.
    ///
    /// # Errors
    ///
    /// The root cannot be destroyed.
    pub fn destroy_node(&mut self, key: NodeKey) -> Result<()> {
        if key == self.root {
            engine_bail!(SOURCE, Configuration, "The root node cannot be destroyed");
        }
        self.detach(key)?;

        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children.into_values());
            }
        }
        let nodes = &self.nodes;
        self.queued_updates.retain(|k| nodes.contains_key(*k));
        Ok(())
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.parent)
    }

    pub fn child(&self, parent: NodeKey, name: &str) -> Option<NodeKey> {
        self.nodes.get(parent).and_then(|n| n.children.get(name).copied())
    }

    pub fn children(&self, parent: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes
            .get(parent)
            .into_iter()
            .flat_map(|n| n.children.values().copied())
    }

    /// True if `ancestor` is `node` or appears on its parent chain.
    fn is_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.nodes.get(key).and_then(|n| n.parent);
        }
        false
    }

    fn detach_internal(&mut self, parent: NodeKey, child: NodeKey) {
        self.cancel_update(parent, child);
        if let Some(name) = self.nodes.get(child).map(|n| n.name.clone()) {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.remove(&name);
            }
        }
        self.notify_of_new_parent(child, None);
    }

    fn notify_of_new_parent(&mut self, child: NodeKey, parent: Option<NodeKey>) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = parent;
            node.parent_notified = false;
        }
        self.mark_dirty(child, false);
    }

    // ===== LOCAL TRANSFORM =====

    pub fn set_position(&mut self, key: NodeKey, position: Vec3) -> Result<()> {
        self.get_mut(key)?.position = position;
        self.mark_dirty(key, false);
        Ok(())
    }

    /// Set the local orientation. The quaternion is normalized.
    pub fn set_orientation(&mut self, key: NodeKey, orientation: Quat) -> Result<()> {
        self.get_mut(key)?.orientation = orientation.normalize();
        self.mark_dirty(key, false);
        Ok(())
    }

    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) -> Result<()> {
        self.get_mut(key)?.scale = scale;
        self.mark_dirty(key, false);
        Ok(())
    }

    /// Multiply the local scale.
    pub fn scale_by(&mut self, key: NodeKey, factor: Vec3) -> Result<()> {
        self.get_mut(key)?.scale *= factor;
        self.mark_dirty(key, false);
        Ok(())
    }

    pub fn set_inherit_orientation(&mut self, key: NodeKey, inherit: bool) -> Result<()> {
        self.get_mut(key)?.inherit_orientation = inherit;
        self.mark_dirty(key, false);
        Ok(())
    }

    pub fn set_inherit_scale(&mut self, key: NodeKey, inherit: bool) -> Result<()> {
        self.get_mut(key)?.inherit_scale = inherit;
        self.mark_dirty(key, false);
        Ok(())
    }

    /// Move the node by `delta` expressed in `space`.
    pub fn translate(&mut self, key: NodeKey, delta: Vec3, space: TransformSpace) -> Result<()> {
        let (orientation, parent) = {
            let node = self.get(key)?;
            (node.orientation, node.parent)
        };
        let offset = match space {
            TransformSpace::Local => orientation * delta,
            TransformSpace::Parent => delta,
            TransformSpace::World => match parent {
                Some(parent) => {
                    let (_, parent_orientation, parent_scale) = self.derived_state(parent)?;
                    (parent_orientation.inverse() * delta) / parent_scale
                }
                None => delta,
            },
        };
        self.get_mut(key)?.position += offset;
        self.mark_dirty(key, false);
        Ok(())
    }

    /// Rotate the node by `rotation` expressed in `space`.
    pub fn rotate(&mut self, key: NodeKey, rotation: Quat, space: TransformSpace) -> Result<()> {
        let q = rotation.normalize();
        let current = self.get(key)?.orientation;
        let orientation = match space {
            TransformSpace::Local => current * q,
            TransformSpace::Parent => q * current,
            TransformSpace::World => {
                let (_, derived, _) = self.derived_state(key)?;
                current * derived.inverse() * q * derived
            }
        };
        self.get_mut(key)?.orientation = orientation.normalize();
        self.mark_dirty(key, false);
        Ok(())
    }

    /// Rotate around the Y axis.
    pub fn yaw(&mut self, key: NodeKey, radians: f32, space: TransformSpace) -> Result<()> {
        self.rotate(key, Quat::from_rotation_y(radians), space)
    }

    /// Rotate around the X axis.
    pub fn pitch(&mut self, key: NodeKey, radians: f32, space: TransformSpace) -> Result<()> {
        self.rotate(key, Quat::from_rotation_x(radians), space)
    }

    /// Rotate around the Z axis.
    pub fn roll(&mut self, key: NodeKey, radians: f32, space: TransformSpace) -> Result<()> {
        self.rotate(key, Quat::from_rotation_z(radians), space)
    }

    // ===== DERIVED TRANSFORM =====

    /// World position, recomputed if stale.
    pub fn derived_position(&mut self, key: NodeKey) -> Result<Vec3> {
        Ok(self.derived_state(key)?.0)
    }

    /// World orientation, recomputed if stale.
    pub fn derived_orientation(&mut self, key: NodeKey) -> Result<Quat> {
        Ok(self.derived_state(key)?.1)
    }

    /// World scale, recomputed if stale.
    pub fn derived_scale(&mut self, key: NodeKey) -> Result<Vec3> {
        Ok(self.derived_state(key)?.2)
    }

    /// World matrix (scale → rotate → translate), cached.
    pub fn full_transform(&mut self, key: NodeKey) -> Result<Mat4> {
        let (position, orientation, scale) = self.derived_state(key)?;
        let node = self.get_mut(key)?;
        if node.need_transform_update {
            node.cached_transform = TransformNode::make_transform(position, orientation, scale);
            node.need_transform_update = false;
        }
        Ok(node.cached_transform)
    }

    /// Local matrix relative to the parent, cached.
    pub fn relative_transform(&mut self, key: NodeKey) -> Result<Mat4> {
        let node = self.get_mut(key)?;
        if node.need_relative_transform_update {
            node.cached_relative_transform =
                TransformNode::make_transform(node.position, node.orientation, node.scale);
            node.need_relative_transform_update = false;
        }
        Ok(node.cached_relative_transform)
    }

    /// Place the node at a world position.
    pub fn set_derived_position(&mut self, key: NodeKey, position: Vec3) -> Result<()> {
        let parent = self.get(key)?.parent;
        let local = match parent {
            Some(parent) => {
                let (p_pos, p_ori, p_scale) = self.derived_state(parent)?;
                (p_ori.inverse() * (position - p_pos)) / p_scale
            }
            None => position,
        };
        self.set_position(key, local)
    }

    /// Orient the node in world space.
    pub fn set_derived_orientation(&mut self, key: NodeKey, orientation: Quat) -> Result<()> {
        let (parent, inherit) = {
            let node = self.get(key)?;
            (node.parent, node.inherit_orientation)
        };
        let local = match parent {
            Some(parent) if inherit => {
                let (_, p_ori, _) = self.derived_state(parent)?;
                p_ori.inverse() * orientation
            }
            _ => orientation,
        };
        self.set_orientation(key, local)
    }

    /// Scale the node in world space.
    pub fn set_derived_scale(&mut self, key: NodeKey, scale: Vec3) -> Result<()> {
        let (parent, inherit) = {
            let node = self.get(key)?;
            (node.parent, node.inherit_scale)
        };
        let local = match parent {
            Some(parent) if inherit => {
                let (_, _, p_scale) = self.derived_state(parent)?;
                scale / p_scale
            }
            _ => scale,
        };
        self.set_scale(key, local)
    }

    /// Derived (position, orientation, scale), refreshing from the parent
    /// chain when the node is marked stale.
    fn derived_state(&mut self, key: NodeKey) -> Result<(Vec3, Quat, Vec3)> {
        if self.get(key)?.need_parent_update {
            self.update_from_parent(key)?;
        }
        let node = &self.nodes[key];
        Ok((node.derived_position, node.derived_orientation, node.derived_scale))
    }

    /// Recompute derived state from the parent's derived state.
    fn update_from_parent(&mut self, key: NodeKey) -> Result<()> {
        let parent = self.get(key)?.parent;
        let parent_state = match parent {
            Some(parent) => Some(self.derived_state(parent)?),
            None => None,
        };

        let node = &mut self.nodes[key];
        match parent_state {
            Some((p_pos, p_ori, p_scale)) => {
                node.derived_orientation = if node.inherit_orientation {
                    p_ori * node.orientation
                } else {
                    node.orientation
                };
                node.derived_scale = if node.inherit_scale {
                    p_scale * node.scale
                } else {
                    node.scale
                };
                node.derived_position = p_ori * (p_scale * node.position) + p_pos;
            }
            None => {
                node.derived_orientation = node.orientation;
                node.derived_position = node.position;
                node.derived_scale = node.scale;
            }
        }

        node.need_parent_update = false;
        node.need_transform_update = true;
        node.need_relative_transform_update = true;

        let (pos, ori, scale) = (node.derived_position, node.derived_orientation, node.derived_scale);
        if let Some(listener) = node.listener.as_mut() {
            listener(pos, ori, scale);
        }
        Ok(())
    }

    /// Install (or clear) the per-node recompute callback.
    pub fn set_listener(&mut self, key: NodeKey, listener: Option<NodeListener>) -> Result<()> {
        self.get_mut(key)?.listener = listener;
        Ok(())
    }

    // ===== CHANGE PROPAGATION =====

    /// Mark the node and its subtree as needing an update.
    ///
    /// With `force_parent_update` the parent is notified again even if it
    /// already was this cycle.
    pub fn need_update(&mut self, key: NodeKey, force_parent_update: bool) -> Result<()> {
        self.get(key)?;
        self.mark_dirty(key, force_parent_update);
        Ok(())
    }

    fn mark_dirty(&mut self, key: NodeKey, force_parent_update: bool) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.need_parent_update = true;
        node.need_child_update = true;
        node.need_transform_update = true;
        node.need_relative_transform_update = true;

        let notify = match node.parent {
            Some(parent) if !node.parent_notified || force_parent_update => Some(parent),
            _ => None,
        };
        node.children_to_update.clear();

        if let Some(parent) = notify {
            self.request_update(parent, key, force_parent_update);
            self.nodes[key].parent_notified = true;
        }
    }

    /// Register `child` in `parent`'s pending set.
    pub fn request_update(&mut self, parent: NodeKey, child: NodeKey, force_parent_update: bool) {
        let Some(node) = self.nodes.get_mut(parent) else {
            return;
        };
        // Every child is refreshed anyway
        if node.need_child_update {
            return;
        }
        node.children_to_update.insert(child);

        let notify = match node.parent {
            Some(grand_parent) if !node.parent_notified || force_parent_update => Some(grand_parent),
            _ => None,
        };
        if let Some(grand_parent) = notify {
            self.request_update(grand_parent, parent, force_parent_update);
            self.nodes[parent].parent_notified = true;
        }
    }

    /// Withdraw `child` from `parent`'s pending set.
    pub fn cancel_update(&mut self, parent: NodeKey, child: NodeKey) {
        let Some(node) = self.nodes.get_mut(parent) else {
            return;
        };
        node.children_to_update.remove(&child);

        if node.children_to_update.is_empty() && !node.need_child_update {
            if let Some(grand_parent) = node.parent {
                self.cancel_update(grand_parent, parent);
                self.nodes[parent].parent_notified = false;
            }
        }
    }

    /// Defer a forced `need_update` until `process_queued_updates`.
    pub fn queue_need_update(&mut self, key: NodeKey) {
        if !self.queued_updates.contains(&key) {
            self.queued_updates.push(key);
        }
    }

    /// Apply every deferred `need_update`.
    pub fn process_queued_updates(&mut self) {
        for key in std::mem::take(&mut self.queued_updates) {
            self.mark_dirty(key, true);
        }
    }

    /// Recursive refresh entry point.
    ///
    /// # Arguments
    ///
    /// * `update_children` - Visit children even if nothing is flagged
    /// * `parent_changed` - The parent's derived transform changed
    pub fn update(&mut self, key: NodeKey, update_children: bool, parent_changed: bool) -> Result<()> {
        let node = self.get_mut(key)?;
        node.parent_notified = false;

        if !update_children && !node.need_parent_update && !node.need_child_update && !parent_changed {
            return Ok(());
        }

        if node.need_parent_update || parent_changed {
            self.update_from_parent(key)?;
        }

        let node = &mut self.nodes[key];
        if node.need_child_update || parent_changed {
            let children: Vec<NodeKey> = node.children.values().copied().collect();
            node.children_to_update.clear();
            for child in children {
                self.update(child, true, true)?;
            }
        } else {
            let pending: Vec<NodeKey> = node.children_to_update.drain().collect();
            for child in pending {
                self.update(child, true, false)?;
            }
        }

        self.nodes[key].need_child_update = false;
        Ok(())
    }

    /// Refresh the whole graph from the root.
    pub fn update_root(&mut self) -> Result<()> {
        self.update(self.root, true, false)
    }

    // ===== INITIAL STATE / ANIMATION =====

    /// Record the current local transform as the animation baseline.
    pub fn set_initial_state(&mut self, key: NodeKey) -> Result<()> {
        let node = self.get_mut(key)?;
        node.initial_position = node.position;
        node.initial_orientation = node.orientation;
        node.initial_scale = node.scale;
        Ok(())
    }

    /// Restore the baseline and clear accumulated animation.
    pub fn reset_to_initial_state(&mut self, key: NodeKey) -> Result<()> {
        let node = self.get_mut(key)?;
        node.position = node.initial_position;
        node.orientation = node.initial_orientation;
        node.scale = node.initial_scale;
        node.accum_anim_weight = 0.0;
        node.translation_from_initial = Vec3::ZERO;
        node.rotation_from_initial = Quat::IDENTITY;
        node.scale_from_initial = Vec3::ONE;
        self.mark_dirty(key, false);
        Ok(())
    }

    /// Blend an animation contribution relative to the baseline.
    ///
    /// Successive calls within one reset cycle are averaged by weight.
    pub fn weighted_transform(
        &mut self,
        key: NodeKey,
        weight: f32,
        translate: Vec3,
        rotate: Quat,
        scale: Vec3,
    ) -> Result<()> {
        let node = self.get_mut(key)?;
        if node.accum_anim_weight == 0.0 {
            node.rotation_from_initial = rotate;
            node.translation_from_initial = translate;
            node.scale_from_initial = scale;
            node.accum_anim_weight = weight;
        } else {
            let factor = weight / (node.accum_anim_weight + weight);
            node.translation_from_initial += (translate - node.translation_from_initial) * factor;
            node.rotation_from_initial = node.rotation_from_initial.slerp(rotate, factor);
            let scale_diff = (scale - Vec3::ONE) * factor;
            node.scale_from_initial *= scale_diff + Vec3::ONE;
            node.accum_anim_weight += weight;
        }

        node.orientation = (node.initial_orientation * node.rotation_from_initial).normalize();
        node.position = node.initial_position + node.translation_from_initial;
        node.scale = node.initial_scale * node.scale_from_initial;
        self.mark_dirty(key, false);
        Ok(())
    }
}

#[cfg(test)]
#[path = "node_graph_tests.rs"]
mod tests;
