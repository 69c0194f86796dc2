// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement basics.
//!
//! Build a small plaza, resolve it into world space, move a bench between
//! groups, and watch which cached resolutions survive.
//!
//! Run:
//! - `cargo run -p blockyard_demos --example placement_basics`

use blockyard_resolve::{District, Editor, ResolveOptions};
use blockyard_topology::{Node, NodeId, NodeMap, RootId, Tag};
use glam::Vec3;

fn main() {
    let watson = RootId::district("watson");
    let nodes = NodeMap::from(vec![
        Node::group("north", watson.clone()).with_position(Vec3::new(20.0, 60.0, 0.0)),
        Node::group("south", watson.clone())
            .with_position(Vec3::new(20.0, 20.0, 0.0))
            .with_rotation(Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2)),
        Node::instance("bench", watson.clone())
            .with_parent("north")
            .with_position(Vec3::new(4.0, 0.0, 0.0))
            .with_scale(Vec3::new(3.0, 1.0, 1.0)),
        Node::instance("lamp", watson.clone())
            .with_parent("north")
            .with_position(Vec3::new(0.0, 4.0, 0.0))
            .with_scale(Vec3::new(0.5, 0.5, 6.0)),
    ]);
    let district = District::new("watson", Vec3::ZERO, Vec3::splat(100.0), 1.0);
    let mut editor = Editor::new(nodes, vec![district], "watson")
        .unwrap()
        .with_options(ResolveOptions {
            z_origin_offset: false,
        });

    let frame = editor.resolve(&watson, Tag::Create).unwrap();
    for t in &frame {
        println!("{:>6}: position {:?} scale {:?}", t.id, t.position, t.scale);
    }
    println!("cached entries after first pass: {}", editor.cache().len());

    // Move the bench under the rotated south group.
    editor
        .reparent("bench", Some(NodeId::new("south")), watson.clone())
        .unwrap();
    let lamp_chain = [NodeId::new("north")];
    assert!(
        editor.cache().get(&NodeId::new("lamp"), &lamp_chain).is_some(),
        "the lamp's cached resolution survives the move"
    );

    let misses = editor.cache().misses();
    let frame = editor.resolve(&watson, Tag::Create).unwrap();
    let bench = frame.iter().find(|t| t.id.as_str() == "bench").unwrap();
    println!("bench after reparent: position {:?}", bench.position);
    println!(
        "recomputed {} subtrees, reused {}",
        editor.cache().misses() - misses,
        editor.cache().hits()
    );
    println!("ancestors of bench: {:?}", editor.support().index.ancestors_of("bench"));
}
