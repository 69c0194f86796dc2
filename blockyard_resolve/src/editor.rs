// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Editor session: owns the node map and keeps tree, index, and cache in step with it.

use alloc::string::String;
use alloc::vec::Vec;

use blockyard_topology::{
    Forest, GroupSummary, MAX_DEPTH, Node, NodeId, NodeKind, NodeMap, RootId, Support, Tag, TopologyError,
    TreeIndex, build_support,
};

use crate::advisory::{Advisories, Advisory};
use crate::cache::ResolutionCache;
use crate::changes::Changes;
use crate::district::District;
use crate::instance::InstancedMeshTransform;
use crate::resolver::{ResolveError, ResolveOptions, Resolver};

/// Errors returned by [`Editor`] operations. The node map is unchanged when one is returned.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EditError {
    /// The mutation would break the tree.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// Resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// No node with this id.
    #[error("no node `{id}`")]
    UnknownNode {
        /// The requested id.
        id: NodeId,
    },
    /// No district with this name.
    #[error("no district `{name}`")]
    UnknownDistrict {
        /// The requested name.
        name: String,
    },
    /// The baked array has no real entry at `index`.
    #[error("baked index {index} is out of range")]
    BakedIndexOutOfRange {
        /// The requested index.
        index: usize,
    },
    /// An edit closure changed the node's id.
    #[error("edits cannot change the id of `{id}`")]
    IdChanged {
        /// The original id.
        id: NodeId,
    },
}

/// Normalized transforms for one frame, grouped the way the renderer draws them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderBuckets {
    /// Create-tagged instances of the current district.
    pub additions: Vec<InstancedMeshTransform>,
    /// Update-tagged instances of the current district.
    pub updates: Vec<InstancedMeshTransform>,
    /// Delete-tagged instances of the current district.
    pub deletions: Vec<InstancedMeshTransform>,
    /// Create-tagged instances of other districts, in current-district space.
    pub previews: Vec<InstancedMeshTransform>,
}

impl RenderBuckets {
    /// Total number of transforms across all buckets.
    pub fn len(&self) -> usize {
        self.additions.len() + self.updates.len() + self.deletions.len() + self.previews.len()
    }

    /// True if every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single-writer editing session over a node map and its districts.
///
/// Every mutating method runs the whole "mutate, rebuild, invalidate" step
/// before returning, so reads never observe a stale tree or cache.
#[derive(Clone, Debug)]
pub struct Editor {
    nodes: NodeMap,
    districts: Vec<District>,
    current: usize,
    support: Support,
    cache: ResolutionCache,
    advisories: Advisories,
    options: ResolveOptions,
}

impl Editor {
    /// Start a session targeting the district named `current`.
    pub fn new(nodes: NodeMap, districts: Vec<District>, current: &str) -> Result<Self, EditError> {
        let current = slot_of(&districts, current)?;
        let support = build_support(&nodes, districts.iter().map(|d| d.name.as_str()))?;
        Ok(Self {
            nodes,
            districts,
            current,
            support,
            cache: ResolutionCache::new(),
            advisories: Advisories::new(),
            options: ResolveOptions::default(),
        })
    }

    /// Replace the resolve options. Clears the cache.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self.cache.clear();
        self
    }

    /// The node map.
    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    /// Look up a node.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The current tree and index.
    pub fn support(&self) -> &Support {
        &self.support
    }

    /// The resolution cache.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// All districts.
    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    /// The district resolutions are normalized against.
    pub fn current_district(&self) -> &District {
        &self.districts[self.current]
    }

    /// Target another district. Cached transforms are dropped.
    pub fn set_current_district(&mut self, name: &str) -> Result<(), EditError> {
        let slot = slot_of(&self.districts, name)?;
        if slot != self.current {
            log::debug!("switching to district `{name}`");
            self.current = slot;
            self.cache.clear();
            self.advisories.clear();
        }
        Ok(())
    }

    /// Add a node.
    pub fn insert(&mut self, node: Node) -> Result<(), EditError> {
        if self.nodes.contains(node.id.as_str()) {
            return Err(TopologyError::DuplicateId { id: node.id }.into());
        }
        self.check_depth(&node.id, node.parent.as_ref(), 0)?;
        let id = node.id.clone();
        let before = self.nodes.clone();
        self.nodes.insert(node);
        self.rebuild_or_restore(before)?;
        self.invalidate(self.support.index.invalidation_set([&id]));
        log::debug!("inserted `{id}`");
        Ok(())
    }

    /// Remove a node and all of its descendants. Returns the removed ids in map order.
    pub fn remove(&mut self, id: &str) -> Result<Vec<NodeId>, EditError> {
        let Some(node) = self.nodes.get(id) else {
            return Err(EditError::UnknownNode { id: id.into() });
        };
        let id = node.id.clone();
        let stale = self.support.index.invalidation_set([&id]);
        let mut doomed = Vec::from(self.support.index.descendants_of(id.as_str()));
        doomed.push(id.clone());

        let before = self.nodes.clone();
        let removed: Vec<NodeId> = self
            .nodes
            .remove_all(&doomed)
            .into_iter()
            .map(|n| n.id)
            .collect();
        self.rebuild_or_restore(before)?;
        self.invalidate(stale);
        log::debug!("removed `{id}` and {} descendants", removed.len() - 1);
        Ok(removed)
    }

    /// Move `id` under `parent` (or directly under `root` when `parent` is `None`).
    ///
    /// Descendants follow the node into its new root.
    pub fn reparent(&mut self, id: &str, parent: Option<NodeId>, root: RootId) -> Result<(), EditError> {
        let Some(node) = self.nodes.get(id) else {
            return Err(EditError::UnknownNode { id: id.into() });
        };
        let id = node.id.clone();
        let root = match &parent {
            Some(p) => self.check_parent(&id, p)?,
            None => root,
        };
        self.check_depth(&id, parent.as_ref(), self.subtree_height(&id))?;

        let stale = self.support.index.invalidation_set([&id]);
        let before = self.nodes.clone();
        let descendants = Vec::from(self.support.index.descendants_of(id.as_str()));
        for d in &descendants {
            if let Some(n) = self.nodes.get_mut(d.as_str()) {
                n.root = root.clone();
            }
        }
        if let Some(n) = self.nodes.get_mut(id.as_str()) {
            n.parent = parent;
            n.root = root;
        }
        self.rebuild_or_restore(before)?;
        self.invalidate(stale);
        self.invalidate(self.support.index.invalidation_set([&id]));
        log::debug!("reparented `{id}`");
        Ok(())
    }

    /// Apply `f` to the node `id` and return what it changed.
    ///
    /// Tree-shaping changes rebuild the topology; anything beyond a label edit
    /// invalidates cached resolutions through the node.
    pub fn edit(&mut self, id: &str, f: impl FnOnce(&mut Node)) -> Result<Changes, EditError> {
        let Some(before) = self.nodes.get(id) else {
            return Err(EditError::UnknownNode { id: id.into() });
        };
        let mut after = before.clone();
        f(&mut after);
        if after.id != before.id {
            return Err(EditError::IdChanged {
                id: before.id.clone(),
            });
        }
        let changes = Changes::between(before, &after);
        let id = after.id.clone();
        if changes.contains(Changes::PARENT) {
            if let Some(p) = &after.parent {
                self.check_parent(&id, p)?;
            }
            self.check_depth(&id, after.parent.as_ref(), self.subtree_height(&id))?;
        }

        let stale = if changes.needs_invalidation() {
            self.support.index.invalidation_set([&id])
        } else {
            Vec::new()
        };
        if changes.needs_rebuild() {
            let snapshot = self.nodes.clone();
            self.nodes.insert(after);
            self.rebuild_or_restore(snapshot)?;
            self.invalidate(self.support.index.invalidation_set([&id]));
        } else {
            self.nodes.insert(after);
        }
        self.invalidate(stale);
        log::debug!("edited `{id}`: {changes:?}");
        Ok(changes)
    }

    /// Create an update-tagged instance seeded from baked entry `index` of `district`.
    pub fn adopt_baked(&mut self, district: &str, index: usize, id: impl Into<NodeId>) -> Result<(), EditError> {
        let slot = slot_of(&self.districts, district)?;
        let source = &self.districts[slot];
        let baked_index = i32::try_from(index).map_err(|_| EditError::BakedIndexOutOfRange { index })?;
        let local = source
            .decode_baked(index)
            .ok_or(EditError::BakedIndexOutOfRange { index })?;
        let mut node = Node::instance(id, source.root_id())
            .with_tag(Tag::Update)
            .with_position(local.position)
            .with_rotation(local.rotation)
            .with_scale(local.scale);
        node.index_in_district = baked_index;
        self.insert(node)
    }

    /// Resolve the `tag` bucket of `root` against the current district.
    ///
    /// An unknown root resolves to nothing.
    pub fn resolve(&mut self, root: &RootId, tag: Tag) -> Result<Vec<InstancedMeshTransform>, EditError> {
        let resolver = Resolver::new(&self.support, &self.nodes, &self.districts[self.current])
            .with_options(self.options);
        Ok(resolver.resolve(bucket(&self.support.forest, root, tag), &mut self.cache)?)
    }

    /// Resolve one authored node and its subtree in place.
    pub fn resolve_node(&mut self, id: &str) -> Result<Vec<InstancedMeshTransform>, EditError> {
        let resolver = Resolver::new(&self.support, &self.nodes, &self.districts[self.current])
            .with_options(self.options);
        Ok(resolver.resolve_node(&NodeId::new(id), &mut self.cache)?)
    }

    /// Resolve every bucket the renderer draws and refresh advisories.
    pub fn render_buckets(&mut self) -> Result<RenderBuckets, EditError> {
        let district = &self.districts[self.current];
        let resolver = Resolver::new(&self.support, &self.nodes, district).with_options(self.options);
        let forest = &self.support.forest;

        let own = district.root_id();
        let mut buckets = RenderBuckets {
            additions: resolver.resolve(bucket(forest, &own, Tag::Create), &mut self.cache)?,
            updates: resolver.resolve(bucket(forest, &own, Tag::Update), &mut self.cache)?,
            deletions: resolver.resolve(bucket(forest, &own, Tag::Delete), &mut self.cache)?,
            previews: Vec::new(),
        };
        for other in self.districts.iter().filter(|d| d.name != district.name) {
            let previews = resolver.resolve(bucket(forest, &other.root_id(), Tag::Create), &mut self.cache)?;
            buckets.previews.extend(previews);
        }

        self.advisories.clear();
        for transform in buckets.additions.iter().chain(&buckets.updates) {
            self.advisories.record(transform);
        }
        Ok(buckets)
    }

    /// Advisories recorded for `id` by the last [`render_buckets`](Self::render_buckets).
    pub fn advisories(&self, id: &str) -> &[Advisory] {
        self.advisories.get(id)
    }

    /// Instance counts by tag and advisory state at or under `id`.
    pub fn summary(&self, id: &str) -> GroupSummary {
        self.support
            .index
            .summarize(&self.nodes, id, |n| self.advisories.has_errors(n))
    }

    /// Instance ids covered by a selection; groups expand to their instances.
    pub fn selection(&self, selected: &[NodeId]) -> Vec<NodeId> {
        self.support.index.flatten_selection_to_instances(selected)
    }

    /// Validate `parent` for `id` and return the root `id` will live under.
    fn check_parent(&self, id: &NodeId, parent: &NodeId) -> Result<RootId, EditError> {
        let Some(p) = self.nodes.get(parent.as_str()) else {
            return Err(EditError::UnknownNode { id: parent.clone() });
        };
        if p.kind != NodeKind::Group {
            return Err(TopologyError::ParentNotGroup {
                id: id.clone(),
                parent: parent.clone(),
            }
            .into());
        }
        if parent == id || self.support.index.descendants_of(id.as_str()).contains(parent) {
            return Err(TopologyError::Cycle { id: id.clone() }.into());
        }
        Ok(self
            .support
            .index
            .entry(parent.as_str())
            .map_or_else(|| p.root.clone(), |e| e.root.clone()))
    }

    /// Reject placements that push the deepest node of the subtree past [`MAX_DEPTH`].
    fn check_depth(&self, id: &NodeId, parent: Option<&NodeId>, height: usize) -> Result<(), EditError> {
        let parent_depth = parent
            .and_then(|p| self.support.index.depth_of(p.as_str()))
            .unwrap_or(0);
        let depth = parent_depth + 1 + height;
        if depth > MAX_DEPTH {
            return Err(TopologyError::DepthExceeded {
                id: id.clone(),
                depth,
            }
            .into());
        }
        Ok(())
    }

    /// Levels below `id` in its current subtree.
    fn subtree_height(&self, id: &NodeId) -> usize {
        let index = &self.support.index;
        let Some(own) = index.depth_of(id.as_str()) else {
            return 0;
        };
        index
            .descendants_of(id.as_str())
            .iter()
            .filter_map(|d| index.depth_of(d.as_str()))
            .max()
            .map_or(0, |deepest| deepest - own)
    }

    fn rebuild_or_restore(&mut self, before: NodeMap) -> Result<(), EditError> {
        let names = self.districts.iter().map(|d| d.name.as_str());
        match build_support(&self.nodes, names) {
            Ok(support) => {
                self.support = support;
                Ok(())
            }
            Err(err) => {
                log::debug!("rolling back: {err}");
                self.nodes = before;
                Err(err.into())
            }
        }
    }

    fn invalidate(&mut self, stale: Vec<NodeId>) {
        self.cache.invalidate(&stale);
    }
}

fn bucket<'f>(forest: &'f Forest, root: &RootId, tag: Tag) -> &'f [TreeIndex] {
    forest.root(root).map_or(&[], |r| r.bucket(tag))
}

fn slot_of(districts: &[District], name: &str) -> Result<usize, EditError> {
    districts
        .iter()
        .position(|d| d.name == name)
        .ok_or_else(|| EditError::UnknownDistrict { name: name.into() })
}
