// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blockyard Topology: the placement node model and its tree/index builder.
//!
//! Placement nodes describe blocks (instances) and containers (groups) placed in
//! bounded districts of a static map, plus a template area for reusable definitions.
//!
//! - Keep nodes in a flat, insertion-ordered [`NodeMap`].
//! - Rebuild a [`Support`] snapshot with [`build_support`] whenever parents, roots,
//!   tags, or the node set change.
//! - Query ancestors, descendants, selections, and invalidation sets through the [`Index`].
//!
//! The builder is a pure function of the node map. It owns no state beyond its
//! output, never mutates its input, and is deterministic: sibling order follows
//! map order.
//!
//! ## Roots
//!
//! Each known district has a [`Root::District`] partitioning its direct children
//! into `create`, `update`, and `delete` buckets by [`Tag`]. The single
//! [`Root::Template`] keeps a flat child list.
//!
//! ## Weights
//!
//! Every [`TreeNode`] carries the number of leaf instances its subtree yields once
//! patterns are expanded: an instance weighs `1 + clones`, a group weighs the sum of
//! its children times `1 + clones`.
//!
//! # Example
//!
//! ```rust
//! use blockyard_topology::{build_support, Node, NodeId, NodeMap, Pattern, RootId};
//! use glam::Vec3;
//!
//! let watson = RootId::district("watson");
//! let nodes = NodeMap::from(vec![
//!     Node::group("row", watson.clone()).with_pattern(Pattern::repeat(2, Vec3::X)),
//!     Node::instance("pillar", watson.clone()).with_parent("row"),
//!     Node::instance("lamp", watson.clone()).with_parent("row"),
//! ]);
//!
//! let support = build_support(&nodes, ["watson"]).unwrap();
//! let row = support.index.entry("row").unwrap();
//! assert_eq!(support.forest.node(row.tree_node).weight, 6);
//! assert_eq!(support.index.ancestors_of("lamp"), &[NodeId::new("row")]);
//!
//! // Selecting the group highlights both instances.
//! let selected = support.index.flatten_selection_to_instances([&NodeId::new("row")]);
//! assert_eq!(selected.len(), 2);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod build;
pub mod forest;
pub mod index;
pub mod map;
pub mod types;

pub use build::{Support, TopologyError, build_support};
pub use forest::{Forest, Root, TreeIndex, TreeNode};
pub use index::{GroupSummary, Index, IndexEntry, RootEntry};
pub use map::NodeMap;
pub use types::{MAX_DEPTH, MirrorPlane, Node, NodeId, NodeKind, Pattern, RootId, Tag};

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use glam::Vec3;

    const FIXTURE: &str = r#"[
        {
            "id": "plaza",
            "type": "group",
            "label": "Plaza",
            "root": { "District": "watson" },
            "position": [100.0, 0.0, 0.0],
            "rotation": [0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0],
            "pattern": {
                "count": 1,
                "position": [0.0, 50.0, 0.0],
                "rotation": [0.0, 0.0, 0.0],
                "scale": [0.0, 0.0, 0.0]
            }
        },
        {
            "id": "bench",
            "type": "instance",
            "parent": "plaza",
            "root": { "District": "watson" },
            "tag": "create",
            "position": [1.0, 2.0, 0.0],
            "rotation": [0.0, 0.0, 1.5],
            "scale": [2.0, 1.0, 1.0],
            "mirror": "XZ"
        },
        {
            "id": "kiosk",
            "type": "instance",
            "root": { "District": "watson" },
            "tag": "update",
            "indexInDistrict": 17,
            "position": [0.0, 0.0, 0.0],
            "rotation": [0.0, 0.0, 0.0],
            "scale": [4.0, 4.0, 4.0]
        }
    ]"#;

    #[test]
    fn node_map_loads_from_json() {
        let nodes: NodeMap = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(nodes.len(), 3);

        let bench = nodes.get("bench").unwrap();
        assert_eq!(bench.parent, Some(NodeId::new("plaza")));
        assert_eq!(bench.mirror, Some(MirrorPlane::Xz));
        assert_eq!(bench.index_in_district, -1, "missing index means a new node");
        assert_eq!(nodes.get("kiosk").unwrap().index_in_district, 17);
        assert_eq!(nodes.get("kiosk").unwrap().tag, Tag::Update);

        let plaza = nodes.get("plaza").unwrap();
        let pattern = plaza.pattern.as_ref().unwrap();
        assert_eq!(pattern.position, Vec3::new(0.0, 50.0, 0.0));
        assert_eq!(pattern.mirror, None);

        let support = build_support(&nodes, ["watson"]).unwrap();
        assert_eq!(support.forest.root_weight(&RootId::district("watson")), 3);
    }

    #[test]
    fn node_map_round_trips_in_order() {
        let nodes: NodeMap = serde_json::from_str(FIXTURE).unwrap();
        let text = serde_json::to_string(&nodes).unwrap();
        let again: NodeMap = serde_json::from_str(&text).unwrap();
        let ids: Vec<_> = again.ids().map(NodeId::as_str).collect();
        assert_eq!(ids, ["plaza", "bench", "kiosk"]);
    }
}
