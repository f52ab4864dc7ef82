/// OctreeSceneIndex - static octree over scene objects.
///
/// Each object lives in exactly one node: the deepest node whose box
/// fully contains the object's world AABB. Objects straddling a child
/// boundary stay in the parent, so queries never return duplicates.
///
/// The tree is allocated once at construction with a fixed `max_depth`
/// and laid out depth-first in a flat array.

use rustc_hash::FxHashMap;
use glam::Vec3;
use crate::camera::{FrustumPlanes, FrustumTest};
use crate::math::{AABB, Sphere};
use super::scene_index::SceneIndex;
use super::scene_object::ObjectKey;

/// Index of the root node in the flat node array.
const ROOT: usize = 0;

struct OctreeNode {
    aabb: AABB,
    /// Index of the first child (0 = leaf)
    first_child: usize,
    objects: Vec<ObjectKey>,
}

/// Static octree spatial index.
pub struct OctreeSceneIndex {
    nodes: Vec<OctreeNode>,
    max_depth: u32,
    /// Object key → (node index, world AABB)
    locations: FxHashMap<ObjectKey, (usize, AABB)>,
    /// subtree_sizes[d] = node count of a subtree of depth d
    subtree_sizes: Vec<usize>,
}

impl OctreeSceneIndex {
    /// Create a static octree over `world_aabb`.
    ///
    /// # Arguments
    ///
    /// * `world_aabb` - Box enclosing the scene. Objects outside it are kept at the root.
    /// * `max_depth` - Tree depth (root = 0). Total nodes = (8^(d+1) - 1) / 7.
    pub fn new(world_aabb: AABB, max_depth: u32) -> Self {
        let total = Self::node_count(max_depth);
        let mut nodes = Vec::with_capacity(total);
        Self::build(&mut nodes, &world_aabb, 0, max_depth);
        debug_assert_eq!(nodes.len(), total);

        Self {
            nodes,
            max_depth,
            locations: FxHashMap::default(),
            subtree_sizes: (0..=max_depth).map(Self::node_count).collect(),
        }
    }

    /// Box covered by the root node.
    pub fn bounds(&self) -> &AABB {
        &self.nodes[ROOT].aabb
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn node_count(depth: u32) -> usize {
        (0..=depth).map(|level| 8usize.pow(level)).sum()
    }

    fn build(nodes: &mut Vec<OctreeNode>, aabb: &AABB, depth: u32, max_depth: u32) {
        let index = nodes.len();
        nodes.push(OctreeNode { aabb: *aabb, first_child: 0, objects: Vec::new() });
        if depth >= max_depth {
            return;
        }

        let center = aabb.center();
        nodes[index].first_child = nodes.len();
        for octant in 0..8u8 {
            Self::build(nodes, &Self::octant_aabb(aabb, center, octant), depth + 1, max_depth);
        }
    }

    /// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low half).
    fn octant_aabb(parent: &AABB, center: Vec3, octant: u8) -> AABB {
        let pick = |bit: u8, low: f32, high: f32| if octant & bit == 0 { low } else { high };
        AABB {
            min: Vec3::new(
                pick(1, parent.min.x, center.x),
                pick(2, parent.min.y, center.y),
                pick(4, parent.min.z, center.z),
            ),
            max: Vec3::new(
                pick(1, center.x, parent.max.x),
                pick(2, center.y, parent.max.y),
                pick(4, center.z, parent.max.z),
            ),
        }
    }

    fn point_octant(center: Vec3, point: Vec3) -> u8 {
        (point.x >= center.x) as u8
            | (((point.y >= center.y) as u8) << 1)
            | (((point.z >= center.z) as u8) << 2)
    }

    fn child_index(&self, first_child: usize, octant: u8, depth: u32) -> usize {
        first_child + octant as usize * self.subtree_sizes[(self.max_depth - depth - 1) as usize]
    }

    /// Deepest node fully containing `aabb`, or the root for boxes
    /// sticking out of the tree.
    fn target_node(&self, aabb: &AABB) -> usize {
        if !self.nodes[ROOT].aabb.contains(aabb) {
            return ROOT;
        }

        let mut index = ROOT;
        let mut depth = 0;
        while depth < self.max_depth {
            let node = &self.nodes[index];
            if node.first_child == 0 {
                break;
            }
            let center = node.aabb.center();
            let octant = Self::point_octant(center, aabb.min);
            if octant != Self::point_octant(center, aabb.max) {
                break;
            }
            index = self.child_index(node.first_child, octant, depth);
            depth += 1;
        }
        index
    }

    fn children(&self, index: usize, depth: u32) -> impl Iterator<Item = usize> + '_ {
        let first_child = self.nodes[index].first_child;
        let has_children = depth < self.max_depth && first_child != 0;
        (0..8u8)
            .filter(move |_| has_children)
            .map(move |octant| self.child_index(first_child, octant, depth))
    }

    fn collect_all(&self, index: usize, depth: u32, results: &mut Vec<ObjectKey>) {
        results.extend_from_slice(&self.nodes[index].objects);
        for child in self.children(index, depth) {
            self.collect_all(child, depth + 1, results);
        }
    }

    /// 3-way hierarchical frustum query.
    ///
    /// `Outside` skips the subtree, `Inside` collects it untested and
    /// `Partial` tests the node's objects and recurses.
    fn query_planes(
        &self,
        index: usize,
        depth: u32,
        planes: &FrustumPlanes,
        results: &mut Vec<ObjectKey>,
    ) {
        match planes.test_aabb(&self.nodes[index].aabb) {
            FrustumTest::Outside => {}
            FrustumTest::Inside => self.collect_all(index, depth, results),
            FrustumTest::Partial => {
                for &key in &self.nodes[index].objects {
                    if let Some((_, aabb)) = self.locations.get(&key) {
                        if planes.classify_aabb(aabb).is_visible() {
                            results.push(key);
                        }
                    }
                }
                for child in self.children(index, depth) {
                    self.query_planes(child, depth + 1, planes, results);
                }
            }
        }
    }

    /// Generic overlap query: `overlaps` decides for node and object boxes alike.
    fn query_overlap<F>(&self, index: usize, depth: u32, overlaps: &F, results: &mut Vec<ObjectKey>)
    where
        F: Fn(&AABB) -> bool,
    {
        // Root keeps out-of-bounds objects, never skip it
        if index != ROOT && !overlaps(&self.nodes[index].aabb) {
            return;
        }
        for &key in &self.nodes[index].objects {
            if let Some((_, aabb)) = self.locations.get(&key) {
                if overlaps(aabb) {
                    results.push(key);
                }
            }
        }
        for child in self.children(index, depth) {
            self.query_overlap(child, depth + 1, overlaps, results);
        }
    }
}

impl SceneIndex for OctreeSceneIndex {
    fn insert(&mut self, key: ObjectKey, world_aabb: &AABB) {
        self.remove(key);
        let target = self.target_node(world_aabb);
        self.nodes[target].objects.push(key);
        self.locations.insert(key, (target, *world_aabb));
    }

    fn remove(&mut self, key: ObjectKey) {
        if let Some((index, _)) = self.locations.remove(&key) {
            let objects = &mut self.nodes[index].objects;
            if let Some(pos) = objects.iter().position(|&k| k == key) {
                objects.swap_remove(pos);
            }
        }
    }

    fn update(&mut self, key: ObjectKey, world_aabb: &AABB) {
        let target = self.target_node(world_aabb);
        if let Some(entry) = self.locations.get_mut(&key) {
            if entry.0 == target {
                entry.1 = *world_aabb;
                return;
            }
        }
        self.remove(key);
        self.nodes[target].objects.push(key);
        self.locations.insert(key, (target, *world_aabb));
    }

    fn query_frustum(&self, planes: &FrustumPlanes, results: &mut Vec<ObjectKey>) {
        // The root also holds objects sticking out of the tree: always test them
        for &key in &self.nodes[ROOT].objects {
            if let Some((_, aabb)) = self.locations.get(&key) {
                if planes.classify_aabb(aabb).is_visible() {
                    results.push(key);
                }
            }
        }
        if planes.test_aabb(&self.nodes[ROOT].aabb) == FrustumTest::Outside {
            return;
        }
        for child in self.children(ROOT, 0) {
            self.query_planes(child, 1, planes, results);
        }
    }

    fn query_aabb(&self, aabb: &AABB, results: &mut Vec<ObjectKey>) {
        self.query_overlap(ROOT, 0, &|candidate: &AABB| candidate.intersects(aabb), results);
    }

    fn query_sphere(&self, sphere: &Sphere, results: &mut Vec<ObjectKey>) {
        self.query_overlap(ROOT, 0, &|candidate: &AABB| candidate.intersects_sphere(sphere), results);
    }

    fn len(&self) -> usize {
        self.locations.len()
    }

    fn clear(&mut self) {
        for node in &mut self.nodes {
            node.objects.clear();
        }
        self.locations.clear();
    }
}

#[cfg(test)]
#[path = "octree_scene_index_tests.rs"]
mod tests;
