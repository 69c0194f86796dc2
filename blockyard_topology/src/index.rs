// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ancestor/descendant index and the read-only queries built on it.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::forest::TreeIndex;
use crate::map::NodeMap;
use crate::types::{NodeId, NodeKind, RootId, Tag};

/// Per-node index entry.
#[derive(Clone, Debug)]
pub struct IndexEntry {
    /// Tree node mirroring this node.
    pub tree_node: TreeIndex,
    /// Group or instance.
    pub kind: NodeKind,
    /// Root the node was attached under.
    pub root: RootId,
    /// Ancestors, nearest first, root excluded.
    pub ancestor_ids: Vec<NodeId>,
    /// All transitive children (groups and instances), depth-first pre-order.
    pub descendant_ids: Vec<NodeId>,
}

/// Index entry for a root.
#[derive(Clone, Debug, Default)]
pub struct RootEntry {
    /// Every node under the root, depth-first pre-order.
    pub descendant_ids: Vec<NodeId>,
}

/// Ancestor/descendant lookups for every node and root of a built forest.
#[derive(Clone, Debug, Default)]
pub struct Index {
    pub(crate) entries: HashMap<NodeId, IndexEntry>,
    pub(crate) roots: HashMap<RootId, RootEntry>,
}

/// Aggregate counts over the instances under a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupSummary {
    /// Instances tagged [`Tag::Create`].
    pub additions: usize,
    /// Instances tagged [`Tag::Update`].
    pub updates: usize,
    /// Instances tagged [`Tag::Delete`].
    pub deletions: usize,
    /// Instances carrying advisory errors.
    pub errors: usize,
}

impl Index {
    /// Entry for a node, if indexed.
    pub fn entry(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    /// Entry for a root, if materialized.
    pub fn root_entry(&self, id: &RootId) -> Option<&RootEntry> {
        self.roots.get(id)
    }

    /// Number of indexed nodes (roots excluded).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no nodes are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ancestors of `id`, nearest first. Empty for unknown ids.
    pub fn ancestors_of(&self, id: &str) -> &[NodeId] {
        self.entries
            .get(id)
            .map(|e| e.ancestor_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Transitive descendants of `id`. Empty for instances and unknown ids.
    pub fn descendants_of(&self, id: &str) -> &[NodeId] {
        self.entries
            .get(id)
            .map(|e| e.descendant_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Number of nodes on the chain from the root to `id`, `id` included.
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.entries.get(id).map(|e| e.ancestor_ids.len() + 1)
    }

    /// Expand a selection to instance ids.
    ///
    /// Selected groups contribute their descendant instances; selected instances
    /// contribute themselves. Order follows the selection, duplicates are dropped,
    /// and unknown ids are skipped.
    pub fn flatten_selection_to_instances<'a>(
        &self,
        selected: impl IntoIterator<Item = &'a NodeId>,
    ) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for id in selected {
            let Some(entry) = self.entries.get(id) else {
                continue;
            };
            match entry.kind {
                NodeKind::Instance => {
                    if seen.insert(id.clone()) {
                        out.push(id.clone());
                    }
                }
                NodeKind::Group => {
                    for d in &entry.descendant_ids {
                        let is_instance = self
                            .entries
                            .get(d)
                            .is_some_and(|e| e.kind == NodeKind::Instance);
                        if is_instance && seen.insert(d.clone()) {
                            out.push(d.clone());
                        }
                    }
                }
            }
        }
        out
    }

    /// Ids whose cached resolutions are stale after `mutated` change.
    ///
    /// The union of the mutated ids, all their ancestors, and the descendants of
    /// every mutated group. Unknown ids are kept as-is so removed nodes can be purged.
    pub fn invalidation_set<'a>(&self, mutated: impl IntoIterator<Item = &'a NodeId>) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |id: &NodeId| {
            if seen.insert(id.clone()) {
                out.push(id.clone());
            }
        };
        for id in mutated {
            push(id);
            let Some(entry) = self.entries.get(id) else {
                continue;
            };
            entry.ancestor_ids.iter().for_each(&mut push);
            if entry.kind == NodeKind::Group {
                entry.descendant_ids.iter().for_each(&mut push);
            }
        }
        out
    }

    /// Count the instances at or under `id` by tag.
    ///
    /// `has_errors` reports whether an instance carries advisory errors.
    pub fn summarize(
        &self,
        nodes: &NodeMap,
        id: &str,
        has_errors: impl Fn(&NodeId) -> bool,
    ) -> GroupSummary {
        let mut summary = GroupSummary::default();
        let Some(entry) = self.entries.get(id) else {
            return summary;
        };
        let own = nodes.get(id).map(|n| &n.id);
        let candidates = own
            .filter(|_| entry.kind == NodeKind::Instance)
            .into_iter()
            .chain(entry.descendant_ids.iter());
        for candidate in candidates {
            let Some(node) = nodes.get(candidate.as_str()) else {
                continue;
            };
            if node.is_group() {
                continue;
            }
            match node.tag {
                Tag::Create => summary.additions += 1,
                Tag::Update => summary.updates += 1,
                Tag::Delete => summary.deletions += 1,
            }
            if has_errors(candidate) {
                summary.errors += 1;
            }
        }
        summary
    }
}
