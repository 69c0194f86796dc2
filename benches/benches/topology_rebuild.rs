// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use blockyard_topology::{Node, NodeId, NodeMap, Pattern, RootId, build_support};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec3;

/// `blocks` groups nested `depth` deep, each innermost group holding `leaves` instances.
fn gen_nested(blocks: usize, depth: usize, leaves: usize) -> NodeMap {
    let root = RootId::district("watson");
    let mut nodes = NodeMap::new();
    for b in 0..blocks {
        let mut parent: Option<NodeId> = None;
        for d in 0..depth {
            let id = format!("b{b}-g{d}");
            let mut group = Node::group(id.as_str(), root.clone()).with_position(Vec3::new(1.0, 0.0, 0.0));
            group.parent = parent.take();
            nodes.insert(group);
            parent = Some(NodeId::new(&id));
        }
        for l in 0..leaves {
            let mut leaf = Node::instance(format!("b{b}-i{l}"), root.clone());
            leaf.parent = parent.clone();
            nodes.insert(leaf);
        }
    }
    nodes
}

/// Children listed before their parents, forcing the builder to recurse up the chain.
fn gen_reversed(n: usize) -> NodeMap {
    let root = RootId::district("watson");
    let mut nodes: Vec<Node> = Vec::with_capacity(n);
    for i in 0..n {
        let id = format!("n{i}");
        let node = if i + 1 == n {
            Node::group(id, root.clone()).with_pattern(Pattern::repeat(2, Vec3::X))
        } else {
            Node::group(id, root.clone()).with_parent(format!("n{}", i + 1))
        };
        nodes.push(node);
    }
    NodeMap::from(nodes)
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    for &(blocks, depth, leaves) in &[(16, 4, 16), (64, 8, 16), (256, 4, 32)] {
        let nodes = gen_nested(blocks, depth, leaves);
        group.throughput(Throughput::Elements(nodes.len() as u64));
        group.bench_function(format!("nested_b{blocks}_d{depth}_l{leaves}"), |b| {
            b.iter(|| {
                let support = build_support(black_box(&nodes), ["watson"]).unwrap();
                black_box(support.forest.len());
            });
        });
    }

    let reversed = gen_reversed(30);
    group.bench_function("reversed_chain_30", |b| {
        b.iter(|| black_box(build_support(&reversed, ["watson"]).unwrap()));
    });
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let nodes = gen_nested(64, 8, 16);
    let support = build_support(&nodes, ["watson"]).unwrap();
    let selection: Vec<NodeId> = (0..64).map(|b| NodeId::new(&format!("b{b}-g0"))).collect();

    group.bench_function("flatten_selection_64_blocks", |b| {
        b.iter(|| black_box(support.index.flatten_selection_to_instances(&selection)));
    });
    group.bench_function("invalidation_set_leaf", |b| {
        let leaf = [NodeId::new("b10-i3")];
        b.iter(|| black_box(support.index.invalidation_set(&leaf)));
    });
    group.bench_function("rebuild_after_insert", |b| {
        b.iter_batched(
            || {
                let mut nodes = nodes.clone();
                nodes.insert(Node::instance("late", RootId::district("watson")).with_parent("b3-g7"));
                nodes
            },
            |nodes| black_box(build_support(&nodes, ["watson"]).unwrap()),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_queries);
criterion_main!(benches);
