// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Insertion-ordered flat node map.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::types::{Node, NodeId};

/// Flat map from [`NodeId`] to [`Node`].
///
/// Iteration follows insertion order, which fixes sibling order in the trees
/// built from the map. Replacing an existing node keeps its position.
#[derive(Clone, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<Node>", into = "Vec<Node>")
)]
pub struct NodeMap {
    nodes: Vec<Node>,
    slots: HashMap<NodeId, usize>,
}

impl NodeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the map holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if a node with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Look up a node.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.slots.get(id).map(|&slot| &self.nodes[slot])
    }

    /// Look up a node mutably.
    ///
    /// Changing the node's `id` through this reference corrupts the map.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        let slot = *self.slots.get(id)?;
        Some(&mut self.nodes[slot])
    }

    /// Insert or replace a node. Returns the replaced node, if any.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        if let Some(&slot) = self.slots.get(&node.id) {
            return Some(core::mem::replace(&mut self.nodes[slot], node));
        }
        self.slots.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        None
    }

    /// Remove a node, preserving the order of the others.
    pub fn remove(&mut self, id: &str) -> Option<Node> {
        let slot = self.slots.remove(id)?;
        let node = self.nodes.remove(slot);
        for later in &self.nodes[slot..] {
            if let Some(s) = self.slots.get_mut(&later.id) {
                *s -= 1;
            }
        }
        Some(node)
    }

    /// Remove every node whose id is in `ids`. Returns the removed nodes in map order.
    pub fn remove_all(&mut self, ids: &[NodeId]) -> Vec<Node> {
        let doomed: hashbrown::HashSet<&str> = ids.iter().map(NodeId::as_str).collect();
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.drain(..) {
            if doomed.contains(node.id.as_str()) {
                removed.push(node);
            } else {
                kept.push(node);
            }
        }
        self.nodes = kept;
        self.reindex();
        removed
    }

    /// Iterate nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// Iterate ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.nodes.iter().map(|n| &n.id)
    }

    fn reindex(&mut self) {
        self.slots.clear();
        for (slot, node) in self.nodes.iter().enumerate() {
            self.slots.insert(node.id.clone(), slot);
        }
    }
}

impl FromIterator<Node> for NodeMap {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut map = Self::new();
        for node in iter {
            map.insert(node);
        }
        map
    }
}

impl From<Vec<Node>> for NodeMap {
    fn from(nodes: Vec<Node>) -> Self {
        nodes.into_iter().collect()
    }
}

impl From<NodeMap> for Vec<Node> {
    fn from(map: NodeMap) -> Self {
        map.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RootId;
    use alloc::vec;

    fn node(id: &str) -> Node {
        Node::instance(id, RootId::Template)
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let map: NodeMap = ["c", "a", "b"].into_iter().map(node).collect();
        let ids: Vec<_> = map.ids().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut map: NodeMap = ["a", "b", "c"].into_iter().map(node).collect();
        let mut b = node("b");
        b.label = "renamed".into();
        assert!(map.insert(b).is_some());
        let ids: Vec<_> = map.ids().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(map.get("b").map(|n| n.label.as_str()), Some("renamed"));
    }

    #[test]
    fn remove_shifts_later_slots() {
        let mut map: NodeMap = ["a", "b", "c", "d"].into_iter().map(node).collect();
        assert!(map.remove("b").is_some());
        assert!(map.remove("b").is_none());
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("c").map(|n| n.id.as_str()), Some("c"));
        assert_eq!(map.get("d").map(|n| n.id.as_str()), Some("d"));
        let removed = map.remove_all(&[NodeId::new("a"), NodeId::new("d")]);
        assert_eq!(removed.len(), 2);
        assert!(map.contains("c"));
        assert_eq!(map.get("c").map(|n| n.id.as_str()), Some("c"));
    }
}
