// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use blockyard_resolve::{District, Editor, ResolutionCache, Resolver};
use blockyard_topology::{MirrorPlane, Node, NodeMap, Pattern, RootId, Tag, build_support};
use core::f32::consts::TAU;
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec3;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
}

fn district() -> District {
    District::new("watson", Vec3::ZERO, Vec3::splat(1000.0), 0.5)
}

/// Patterned streets of lamps and benches scattered over the district.
fn gen_streets(streets: usize, per_street: usize, repeat: u32) -> NodeMap {
    let root = RootId::district("watson");
    let mut rng = Rng::new(0xB10C_4A2D_0000_0001);
    let mut nodes = NodeMap::new();
    for s in 0..streets {
        let street = format!("street{s}");
        let mut group = Node::group(street.as_str(), root.clone())
            .with_position(Vec3::new(rng.next_f32() * 900.0, rng.next_f32() * 900.0, 0.0))
            .with_rotation(Vec3::new(0.0, 0.0, rng.next_f32() * TAU))
            .with_pattern(Pattern::repeat(repeat, Vec3::new(12.0, 0.0, 0.0)));
        if s % 4 == 0 {
            group = group.with_mirror(MirrorPlane::Xz);
        }
        nodes.insert(group);
        for i in 0..per_street {
            let mut leaf = Node::instance(format!("{street}-block{i}"), root.clone())
                .with_parent(street.as_str())
                .with_position(Vec3::new(i as f32 * 2.0, 3.0, 0.0))
                .with_scale(Vec3::new(1.0, 1.0, 4.0));
            if i % 7 == 0 {
                leaf = leaf.with_tag(Tag::Update);
            }
            nodes.insert(leaf);
        }
    }
    nodes
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let district = district();
    for &(streets, per_street, repeat) in &[(32, 8, 3), (128, 16, 3), (64, 16, 15)] {
        let nodes = gen_streets(streets, per_street, repeat);
        let support = build_support(&nodes, ["watson"]).unwrap();
        let roots = support
            .forest
            .root(&district.root_id())
            .unwrap()
            .bucket(Tag::Create)
            .to_vec();
        let resolver = Resolver::new(&support, &nodes, &district);
        group.throughput(Throughput::Elements(support.forest.root_weight(&district.root_id())));

        group.bench_function(format!("cold_s{streets}_p{per_street}_r{repeat}"), |b| {
            b.iter(|| {
                let mut cache = ResolutionCache::new();
                black_box(resolver.resolve(&roots, &mut cache).unwrap())
            });
        });

        let mut warm = ResolutionCache::new();
        resolver.resolve(&roots, &mut warm).unwrap();
        group.bench_function(format!("warm_s{streets}_p{per_street}_r{repeat}"), |b| {
            b.iter(|| black_box(resolver.resolve(&roots, &mut warm).unwrap()));
        });

        group.bench_function(format!("world_s{streets}_p{per_street}_r{repeat}"), |b| {
            b.iter(|| black_box(resolver.resolve_world(&roots).unwrap()));
        });
    }
    group.finish();
}

fn bench_edit_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit_cycle");
    let nodes = gen_streets(128, 16, 3);

    // Move one block, then redraw: only its street is recomputed.
    group.bench_function("move_leaf_and_render", |b| {
        b.iter_batched(
            || {
                let mut editor = Editor::new(nodes.clone(), vec![district()], "watson").unwrap();
                editor.render_buckets().unwrap();
                editor
            },
            |mut editor| {
                editor
                    .edit("street7-block3", |n| n.position.y += 1.0)
                    .unwrap();
                black_box(editor.render_buckets().unwrap())
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("reparent_and_render", |b| {
        b.iter_batched(
            || {
                let mut editor = Editor::new(nodes.clone(), vec![district()], "watson").unwrap();
                editor.render_buckets().unwrap();
                editor
            },
            |mut editor| {
                editor
                    .reparent("street7-block3", Some("street9".into()), RootId::district("watson"))
                    .unwrap();
                black_box(editor.render_buckets().unwrap())
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_edit_cycle);
criterion_main!(benches);
