// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform resolution: tree nodes in, district-normalized instance transforms out.

use alloc::vec::Vec;

use blockyard_topology::{Node, NodeId, NodeKind, NodeMap, Support, Tag, TreeIndex};
use glam::Vec3;

use crate::cache::ResolutionCache;
use crate::district::District;
use crate::instance::InstancedMeshTransform;
use crate::pattern::{self, PatternCopy};
use crate::transform::Placement;

/// Failures while resolving; they mean the node map and its [`Support`] are out of sync.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A tree node refers to an id missing from the node map.
    #[error("node `{id}` is in the tree but not in the node map")]
    MissingNode {
        /// The missing id.
        id: NodeId,
    },
    /// A node in the map was never placed in the tree.
    #[error("node `{id}` has no tree node; rebuild the topology")]
    MissingTreeNode {
        /// The unplaced id.
        id: NodeId,
    },
}

/// Knobs for a [`Resolver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Shift create-tagged instances from a center origin to the baked bottom origin.
    pub z_origin_offset: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            z_origin_offset: true,
        }
    }
}

/// One node (or clone) placed in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedNode {
    /// Node id, or a synthetic clone id.
    pub id: NodeId,
    /// Authored source of a virtual node.
    pub origin_id: Option<NodeId>,
    /// Generated by a pattern, directly or through an ancestor.
    pub is_virtual: bool,
    /// Group or instance.
    pub kind: NodeKind,
    /// Edit bucket of the authored node.
    pub tag: Tag,
    /// World placement.
    pub placement: Placement,
}

/// Resolves tree nodes of one [`Support`] snapshot against a target district.
///
/// A resolver borrows everything it reads; the [`ResolutionCache`] is passed to
/// each call so one cache can outlive many snapshots.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    support: &'a Support,
    nodes: &'a NodeMap,
    district: &'a District,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with default options.
    pub fn new(support: &'a Support, nodes: &'a NodeMap, district: &'a District) -> Self {
        Self {
            support,
            nodes,
            district,
            options: ResolveOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Target district.
    pub fn district(&self) -> &'a District {
        self.district
    }

    /// Resolve root-level tree nodes into normalized instance transforms.
    ///
    /// Every instance reachable from `roots` is emitted, pattern clones included,
    /// in depth-first order. Subtrees already in `cache` are reused.
    pub fn resolve(
        &self,
        roots: &[TreeIndex],
        cache: &mut ResolutionCache,
    ) -> Result<Vec<InstancedMeshTransform>, ResolveError> {
        let mut out = Vec::new();
        for &root in roots {
            out.extend(self.resolve_cached(root, None, &[], cache)?);
        }
        log::debug!(
            "resolved {} transforms for `{}` ({} cache hits, {} misses)",
            out.len(),
            self.district.name,
            cache.hits(),
            cache.misses()
        );
        Ok(out)
    }

    /// Resolve one authored node in place, beneath its authored ancestors.
    ///
    /// Ancestors are resolved without their pattern clones, so the result covers
    /// the node's own subtree exactly once.
    pub fn resolve_node(
        &self,
        id: &NodeId,
        cache: &mut ResolutionCache,
    ) -> Result<Vec<InstancedMeshTransform>, ResolveError> {
        let Some(entry) = self.support.index.entry(id.as_str()) else {
            return Err(if self.nodes.contains(id.as_str()) {
                ResolveError::MissingTreeNode { id: id.clone() }
            } else {
                ResolveError::MissingNode { id: id.clone() }
            });
        };
        let mut parent = None;
        let mut chain = Vec::with_capacity(entry.ancestor_ids.len());
        for ancestor in entry.ancestor_ids.iter().rev() {
            let node = self.node(ancestor)?;
            let resolved = Self::place(node, pattern::original(node), parent.as_ref());
            chain.push(resolved.id.clone());
            parent = Some(resolved);
        }
        self.resolve_cached(entry.tree_node, parent.as_ref(), &chain, cache)
    }

    /// Resolve root-level tree nodes into world space, without the cache.
    ///
    /// Returns every instance (clones included) with its world placement, before
    /// any origin offset or district normalization.
    pub fn resolve_world(&self, roots: &[TreeIndex]) -> Result<Vec<ResolvedNode>, ResolveError> {
        let mut out = Vec::new();
        for &root in roots {
            self.walk_world(root, None, &mut out)?;
        }
        Ok(out)
    }

    fn resolve_cached(
        &self,
        index: TreeIndex,
        parent: Option<&ResolvedNode>,
        chain: &[NodeId],
        cache: &mut ResolutionCache,
    ) -> Result<Vec<InstancedMeshTransform>, ResolveError> {
        let tree = self.support.forest.node(index);
        cache.get_or_compute(&tree.id, chain, |cache| {
            let node = self.node(&tree.id)?;
            let mut out = Vec::new();
            for copy in pattern::expand(node) {
                let resolved = Self::place(node, copy, parent);
                match tree.kind {
                    NodeKind::Instance => out.push(self.emit(&resolved)),
                    NodeKind::Group => {
                        let mut child_chain = chain.to_vec();
                        child_chain.push(resolved.id.clone());
                        for &child in &tree.children {
                            out.extend(self.resolve_cached(child, Some(&resolved), &child_chain, cache)?);
                        }
                    }
                }
            }
            Ok(out)
        })
    }

    fn walk_world(
        &self,
        index: TreeIndex,
        parent: Option<&ResolvedNode>,
        out: &mut Vec<ResolvedNode>,
    ) -> Result<(), ResolveError> {
        let tree = self.support.forest.node(index);
        let node = self.node(&tree.id)?;
        for copy in pattern::expand(node) {
            let resolved = Self::place(node, copy, parent);
            match tree.kind {
                NodeKind::Instance => out.push(resolved),
                NodeKind::Group => {
                    for &child in &tree.children {
                        self.walk_world(child, Some(&resolved), out)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn node(&self, id: &NodeId) -> Result<&'a Node, ResolveError> {
        self.nodes
            .get(id.as_str())
            .ok_or_else(|| ResolveError::MissingNode { id: id.clone() })
    }

    /// Parent application, hidden override, and clone tagging.
    fn place(node: &Node, copy: PatternCopy, parent: Option<&ResolvedNode>) -> ResolvedNode {
        let base = parent.map_or(Placement::IDENTITY, |p| p.placement);
        let mut placement = base.child(&copy.local, copy.mirror);
        if node.hidden {
            placement.scale = Vec3::ZERO;
        }
        let inherited = parent.is_some_and(|p| p.is_virtual);
        let origin_id = match copy.origin_id {
            Some(origin) => Some(origin),
            None if inherited => Some(copy.id.clone()),
            None => None,
        };
        ResolvedNode {
            id: copy.id,
            origin_id,
            is_virtual: copy.is_virtual || inherited,
            kind: node.kind,
            tag: node.tag,
            placement,
        }
    }

    /// Origin offset and district normalization for an instance.
    fn emit(&self, resolved: &ResolvedNode) -> InstancedMeshTransform {
        if self.options.z_origin_offset && resolved.tag == Tag::Create {
            let mut shifted = resolved.clone();
            let placement = &mut shifted.placement;
            placement.position += placement.orientation * Vec3::new(0.0, 0.0, placement.scale.z / 2.0);
            return self.district.normalize(&shifted);
        }
        self.district.normalize(resolved)
    }
}
