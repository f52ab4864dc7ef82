//! Hierarchical transform graph.
//!
//! Nodes live in a `NodeGraph` arena and reference each other by
//! `NodeKey`. A parent owns its children (a child set keyed by name); a
//! child only records the key of its parent.
//!
//! Derived (world) state is recomputed lazily. Mutations mark the node
//! dirty and register it once per update cycle in its parent's pending
//! set, so `NodeGraph::update` only walks the branches that changed.

mod node_graph;
mod transform_node;

pub use node_graph::{NodeGraph, NodeListener};
pub use transform_node::{NodeKey, TransformNode, TransformSpace};
