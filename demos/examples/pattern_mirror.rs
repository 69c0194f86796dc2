// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Patterns and mirrors.
//!
//! A colonnade repeated along X, mirrored across the XZ plane, with one hidden
//! column. Prints the world placements and the weight bookkeeping.
//!
//! Run:
//! - `cargo run -p blockyard_demos --example pattern_mirror`

use blockyard_resolve::{District, Resolver};
use blockyard_topology::{MirrorPlane, Node, NodeMap, Pattern, RootId, Tag, build_support};
use glam::Vec3;

fn main() {
    let watson = RootId::district("watson");
    let nodes = NodeMap::from(vec![
        Node::group("colonnade", watson.clone())
            .with_position(Vec3::new(0.0, 8.0, 0.0))
            .with_pattern(Pattern::mirrored(MirrorPlane::Xz)),
        Node::instance("column", watson.clone())
            .with_parent("colonnade")
            .with_scale(Vec3::new(1.0, 1.0, 5.0))
            .with_pattern(Pattern::repeat(3, Vec3::new(4.0, 0.0, 0.0))),
        Node::instance("plinth", watson.clone())
            .with_parent("colonnade")
            .with_position(Vec3::new(-2.0, 0.0, 0.0))
            .with_hidden(true),
    ]);

    let support = build_support(&nodes, ["watson"]).unwrap();
    let colonnade = support.index.entry("colonnade").unwrap();
    println!(
        "colonnade weight: {} (children {:?})",
        support.forest.node(colonnade.tree_node).weight,
        support.index.descendants_of("colonnade")
    );

    let district = District::new("watson", Vec3::splat(-50.0), Vec3::splat(100.0), 1.0);
    let resolver = Resolver::new(&support, &nodes, &district);
    let roots = support.forest.root(&watson).unwrap().bucket(Tag::Create);
    let placed = resolver.resolve_world(roots).unwrap();
    for r in &placed {
        println!(
            "{:>12} virtual={:<5} origin={:<8} position {:?} scale {:?}",
            r.id.as_str(),
            r.is_virtual,
            r.origin_id.as_ref().map_or("-", |o| o.as_str()),
            r.placement.position,
            r.placement.scale,
        );
    }
    assert_eq!(placed.len() as u64, support.forest.root_weight(&watson));
}
