// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized resolutions keyed by node and resolved ancestor chain.

use alloc::vec::Vec;

use blockyard_topology::NodeId;
use hashbrown::HashMap;

use crate::instance::InstancedMeshTransform;

/// Cache of resolved instance transforms.
///
/// An entry is keyed by a node id plus the ids of its resolved ancestor chain,
/// root first, clone ids included. The same node resolved under two pattern
/// branches therefore has two entries. Entries are grouped by node id so that
/// [`invalidate`](Self::invalidate) only touches the named nodes.
///
/// Cached transforms are normalized against one district; a cache must not be
/// shared between resolvers targeting different districts or options.
#[derive(Clone, Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<NodeId, HashMap<Vec<NodeId>, Vec<InstancedMeshTransform>>>,
    hits: u64,
    misses: u64,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached transforms for `node` under `chain`, without touching the counters.
    pub fn get(&self, node: &NodeId, chain: &[NodeId]) -> Option<&[InstancedMeshTransform]> {
        self.entries
            .get(node)
            .and_then(|by_chain| by_chain.get(chain))
            .map(Vec::as_slice)
    }

    /// Store transforms for `node` under `chain`, replacing any previous entry.
    pub fn insert(&mut self, node: NodeId, chain: Vec<NodeId>, transforms: Vec<InstancedMeshTransform>) {
        self.entries.entry(node).or_default().insert(chain, transforms);
    }

    /// Return the cached transforms for `node` under `chain`, computing and storing
    /// them on a miss.
    ///
    /// `compute` receives the cache so nested resolutions can reuse it. Errors are
    /// returned as-is and nothing is stored.
    pub fn get_or_compute<E>(
        &mut self,
        node: &NodeId,
        chain: &[NodeId],
        compute: impl FnOnce(&mut Self) -> Result<Vec<InstancedMeshTransform>, E>,
    ) -> Result<Vec<InstancedMeshTransform>, E> {
        if let Some(hit) = self.get(node, chain) {
            let hit = hit.to_vec();
            self.hits += 1;
            log::trace!("cache hit: `{node}` under {} ancestors", chain.len());
            return Ok(hit);
        }
        self.misses += 1;
        log::trace!("cache miss: `{node}` under {} ancestors", chain.len());
        let computed = compute(self)?;
        self.insert(node.clone(), chain.to_vec(), computed.clone());
        Ok(computed)
    }

    /// Drop every entry whose key node is in `ids`. Returns the number of entries removed.
    ///
    /// Pass an invalidation set from
    /// [`Index::invalidation_set`](blockyard_topology::Index::invalidation_set) so
    /// ancestors and group descendants of a mutated node are dropped too.
    pub fn invalidate<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) -> usize {
        let removed: usize = ids
            .into_iter()
            .filter_map(|id| self.entries.remove(id))
            .map(|by_chain| by_chain.len())
            .sum();
        if removed > 0 {
            log::debug!("invalidated {removed} cached resolutions");
        }
        removed
    }

    /// Drop everything and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Number of (node, chain) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any entry is keyed by `node`.
    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.entries.contains_key(node)
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ids(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|n| NodeId::new(n)).collect()
    }

    fn marker(id: &str) -> Vec<InstancedMeshTransform> {
        vec![InstancedMeshTransform {
            id: NodeId::new(id),
            ..InstancedMeshTransform::degenerate()
        }]
    }

    #[test]
    fn second_lookup_hits() {
        let mut cache = ResolutionCache::new();
        let node = NodeId::new("lamp");
        let chain = ids(&["row"]);
        let mut calls = 0;
        for _ in 0..2 {
            let out: Result<_, ()> = cache.get_or_compute(&node, &chain, |_| {
                calls += 1;
                Ok(marker("lamp"))
            });
            assert_eq!(out.unwrap(), marker("lamp"));
        }
        assert_eq!(calls, 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn chains_keep_clone_branches_apart() {
        let mut cache = ResolutionCache::new();
        let lamp = NodeId::new("lamp");
        cache.insert(lamp.clone(), ids(&["row"]), marker("a"));
        cache.insert(lamp.clone(), ids(&["row--0"]), marker("b"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&lamp, &ids(&["row--0"])).unwrap()[0].id.as_str(), "b");
        assert!(cache.get(&lamp, &[]).is_none());
    }

    #[test]
    fn errors_are_not_stored() {
        let mut cache = ResolutionCache::new();
        let node = NodeId::new("lamp");
        let out = cache.get_or_compute(&node, &[], |_| Err("boom"));
        assert_eq!(out, Err("boom"));
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_only_touches_named_nodes() {
        let mut cache = ResolutionCache::new();
        cache.insert(NodeId::new("row"), Vec::new(), marker("row"));
        cache.insert(NodeId::new("lamp"), ids(&["row"]), marker("lamp"));
        cache.insert(NodeId::new("lamp"), ids(&["row--0"]), marker("lamp"));
        cache.insert(NodeId::new("bench"), ids(&["row"]), marker("bench"));

        let removed = cache.invalidate(&ids(&["lamp", "ghost"]));
        assert_eq!(removed, 2);
        assert!(cache.contains_node(&NodeId::new("row")));
        assert!(cache.contains_node(&NodeId::new("bench")));
        assert!(!cache.contains_node(&NodeId::new("lamp")));
    }

    #[test]
    fn nested_compute_reuses_the_cache() {
        let mut cache = ResolutionCache::new();
        let row = NodeId::new("row");
        let lamp = NodeId::new("lamp");
        let out: Result<_, ()> = cache.get_or_compute(&row, &[], |cache| {
            cache.get_or_compute(&lamp, core::slice::from_ref(&row), |_| Ok(marker("lamp")))
        });
        assert_eq!(out.unwrap(), marker("lamp"));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 0);
    }
}
