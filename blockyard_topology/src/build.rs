// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topology builder: flat node map in, forest and index out.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::forest::{Forest, Root, TreeIndex, TreeNode};
use crate::index::{Index, IndexEntry, RootEntry};
use crate::map::NodeMap;
use crate::types::{NodeId, NodeKind, RootId};

/// Structural violations found while building or mutating the topology.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// The parent chain of `id` loops back onto itself.
    #[error("parent chain of `{id}` forms a cycle")]
    Cycle {
        /// A node on the cycle.
        id: NodeId,
    },
    /// `id` names an instance as its parent.
    #[error("`{id}` cannot be a child of instance `{parent}`")]
    ParentNotGroup {
        /// The child.
        id: NodeId,
        /// The offending parent.
        parent: NodeId,
    },
    /// A node with `id` already exists.
    #[error("node `{id}` already exists")]
    DuplicateId {
        /// The duplicated id.
        id: NodeId,
    },
    /// Placing `id` would exceed [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("`{id}` would sit at depth {depth}, deeper than allowed")]
    DepthExceeded {
        /// The node being placed.
        id: NodeId,
        /// The depth it would reach.
        depth: usize,
    },
}

/// Tree and index derived from one node map.
///
/// Immutable snapshot; rebuild after any change to parents, roots, tags, or the node set.
#[derive(Clone, Debug, Default)]
pub struct Support {
    /// Roots and weighted tree nodes.
    pub forest: Forest,
    /// Ancestor/descendant lookups.
    pub index: Index,
}

/// Build the forest and index for `nodes`.
///
/// Every district in `districts` gets a root even when empty, followed by the
/// template root. Roots referenced by nodes but not listed are created on demand.
///
/// Nodes whose parent is missing from the map are attached directly under their
/// declared root. A node whose parent belongs to another root follows its parent.
/// Depth is not checked here; callers keep chains within [`MAX_DEPTH`](crate::MAX_DEPTH).
pub fn build_support<'a>(
    nodes: &NodeMap,
    districts: impl IntoIterator<Item = &'a str>,
) -> Result<Support, TopologyError> {
    let mut builder = Builder::new(nodes);
    for name in districts {
        builder.ensure_root(&RootId::district(name));
    }
    builder.ensure_root(&RootId::Template);
    for id in nodes.ids() {
        builder.place(id)?;
    }
    let support = builder.finish();
    log::debug!(
        "rebuilt topology: {} nodes, {} roots",
        support.forest.len(),
        support.forest.roots().len()
    );
    Ok(support)
}

struct Pending {
    tree_node: TreeIndex,
    kind: NodeKind,
    root: RootId,
    ancestors: Vec<NodeId>,
    // Direct children only; flattened once every node is placed.
    children: Vec<NodeId>,
}

struct Builder<'a> {
    nodes: &'a NodeMap,
    forest: Forest,
    root_slots: HashMap<RootId, usize>,
    root_children: Vec<Vec<NodeId>>,
    pending: HashMap<NodeId, Pending>,
    in_progress: HashSet<NodeId>,
}

impl<'a> Builder<'a> {
    fn new(nodes: &'a NodeMap) -> Self {
        Self {
            nodes,
            forest: Forest::default(),
            root_slots: HashMap::new(),
            root_children: Vec::new(),
            pending: HashMap::with_capacity(nodes.len()),
            in_progress: HashSet::new(),
        }
    }

    fn ensure_root(&mut self, id: &RootId) -> usize {
        if let Some(&slot) = self.root_slots.get(id) {
            return slot;
        }
        let slot = self.forest.roots.len();
        self.forest.roots.push(Root::for_id(id));
        self.root_children.push(Vec::new());
        self.root_slots.insert(id.clone(), slot);
        slot
    }

    /// Place `id` after its whole parent chain.
    fn place(&mut self, id: &NodeId) -> Result<(), TopologyError> {
        if self.pending.contains_key(id) {
            return Ok(());
        }
        if !self.in_progress.insert(id.clone()) {
            return Err(TopologyError::Cycle { id: id.clone() });
        }
        let nodes = self.nodes;
        let Some(node) = nodes.get(id.as_str()) else {
            self.in_progress.remove(id);
            return Ok(());
        };

        let parent = match &node.parent {
            Some(p) if nodes.contains(p.as_str()) => {
                self.place(p)?;
                Some(p)
            }
            Some(p) => {
                log::warn!("`{id}` references missing parent `{p}`; attaching under its root");
                None
            }
            None => None,
        };

        let tree_node = self.forest.push(TreeNode {
            id: id.clone(),
            kind: node.kind,
            children: Vec::new(),
            weight: 0,
        });

        let (root, ancestors) = match parent {
            Some(p) => {
                let parent_entry = self
                    .pending
                    .get_mut(p)
                    .expect("parent is placed before its children");
                if parent_entry.kind != NodeKind::Group {
                    return Err(TopologyError::ParentNotGroup {
                        id: id.clone(),
                        parent: p.clone(),
                    });
                }
                parent_entry.children.push(id.clone());
                let parent_tree = parent_entry.tree_node;
                let mut ancestors = Vec::with_capacity(parent_entry.ancestors.len() + 1);
                ancestors.push(p.clone());
                ancestors.extend(parent_entry.ancestors.iter().cloned());
                let root = parent_entry.root.clone();
                self.forest.nodes[parent_tree.idx()].children.push(tree_node);
                (root, ancestors)
            }
            None => {
                let slot = self.ensure_root(&node.root);
                self.forest.roots[slot].attach(node.tag, tree_node);
                self.root_children[slot].push(id.clone());
                (node.root.clone(), Vec::new())
            }
        };

        self.pending.insert(
            id.clone(),
            Pending {
                tree_node,
                kind: node.kind,
                root,
                ancestors,
                children: Vec::new(),
            },
        );
        self.in_progress.remove(id);
        Ok(())
    }

    fn finish(mut self) -> Support {
        let mut descendants: HashMap<NodeId, Vec<NodeId>> = HashMap::with_capacity(self.pending.len());
        let ids: Vec<NodeId> = self.nodes.ids().cloned().collect();
        for id in &ids {
            flatten(id, &self.pending, &mut descendants);
        }

        let mut index = Index::default();
        for (slot, children) in self.root_children.iter().enumerate() {
            let mut all = Vec::new();
            for child in children {
                all.push(child.clone());
                if let Some(d) = descendants.get(child) {
                    all.extend(d.iter().cloned());
                }
            }
            index
                .roots
                .insert(self.forest.roots[slot].id(), RootEntry { descendant_ids: all });
        }
        for (id, pending) in self.pending {
            let descendant_ids = descendants.remove(&id).unwrap_or_default();
            index.entries.insert(
                id,
                IndexEntry {
                    tree_node: pending.tree_node,
                    kind: pending.kind,
                    root: pending.root,
                    ancestor_ids: pending.ancestors,
                    descendant_ids,
                },
            );
        }

        let mut memo: Vec<Option<u64>> = alloc::vec![None; self.forest.nodes.len()];
        for i in 0..self.forest.nodes.len() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "TreeIndex uses 32-bit indices by design."
            )]
            weigh(TreeIndex(i as u32), &self.forest, self.nodes, &mut memo);
        }
        for (node, weight) in self.forest.nodes.iter_mut().zip(memo) {
            node.weight = weight.unwrap_or(0);
        }

        Support {
            forest: self.forest,
            index,
        }
    }
}

/// Materialize the flattened descendant list of `id`, children lists first.
fn flatten(
    id: &NodeId,
    pending: &HashMap<NodeId, Pending>,
    out: &mut HashMap<NodeId, Vec<NodeId>>,
) {
    if out.contains_key(id) {
        return;
    }
    let Some(entry) = pending.get(id) else {
        return;
    };
    let mut list = Vec::new();
    for child in &entry.children {
        flatten(child, pending, out);
        list.push(child.clone());
        if let Some(d) = out.get(child) {
            list.extend(d.iter().cloned());
        }
    }
    out.insert(id.clone(), list);
}

/// Leaf-instance count of a subtree, memoized per tree node.
///
/// Saturates at `u64::MAX` for nested patterns too large to count.
fn weigh(index: TreeIndex, forest: &Forest, nodes: &NodeMap, memo: &mut [Option<u64>]) -> u64 {
    if let Some(w) = memo[index.idx()] {
        return w;
    }
    let tree_node = forest.node(index);
    let multiplier = nodes
        .get(tree_node.id.as_str())
        .map_or(1, |n| n.multiplier());
    let weight = match tree_node.kind {
        NodeKind::Instance => multiplier,
        NodeKind::Group => {
            let children = tree_node
                .children
                .iter()
                .fold(0_u64, |acc, &c| acc.saturating_add(weigh(c, forest, nodes, memo)));
            children.saturating_mul(multiplier)
        }
    };
    memo[index.idx()] = Some(weight);
    weight
}
