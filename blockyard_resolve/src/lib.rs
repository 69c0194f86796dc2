// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blockyard Resolve: world transforms for placement trees, normalized per district.
//!
//! Given a [`Support`](blockyard_topology::Support) snapshot from `blockyard_topology`,
//! this crate composes every node's local transform through its ancestors, expands
//! pattern clones, and converts the instances into the normalized space of a
//! target [`District`].
//!
//! ## Resolution
//!
//! For each node the [`Resolver`] applies, in order:
//! - parenting: the local position is reflected by the parent's mirror plane,
//!   stretched by the parent scale, rotated, and offset; the Euler rotation is
//!   reflected the same way and composed onto the parent orientation;
//! - the hidden override, which zeroes the scale of the node and its subtree;
//! - clone tagging, which marks everything under a pattern clone as virtual.
//!
//! Create-tagged instances are then shifted half their height along their local
//! up axis, so their origin matches the bottom-origin convention of baked data,
//! and normalized against the district bounds.
//!
//! ## Caching
//!
//! A [`ResolutionCache`] memoizes each subtree under its resolved ancestor chain.
//! It is not coherent on its own: after a mutation, drop the ids returned by
//! [`Index::invalidation_set`](blockyard_topology::Index::invalidation_set).
//! The [`Editor`] does this for you, together with rebuilding the topology.
//!
//! # Example
//!
//! ```rust
//! use blockyard_resolve::{District, Editor, ResolveOptions};
//! use blockyard_topology::{Node, NodeId, NodeMap, Pattern, RootId};
//! use glam::{Vec3, Vec4};
//!
//! let watson = RootId::district("watson");
//! let nodes = NodeMap::from(vec![
//!     Node::group("row", watson.clone()).with_position(Vec3::new(10.0, 0.0, 0.0)),
//!     Node::instance("lamp", watson.clone())
//!         .with_parent("row")
//!         .with_pattern(Pattern::repeat(2, Vec3::new(0.0, 5.0, 0.0))),
//! ]);
//! let district = District::new("watson", Vec3::ZERO, Vec3::splat(100.0), 1.0);
//!
//! let mut editor = Editor::new(nodes, vec![district], "watson")
//!     .unwrap()
//!     .with_options(ResolveOptions { z_origin_offset: false });
//! let frame = editor.render_buckets().unwrap();
//! assert_eq!(frame.additions.len(), 3);
//! assert_eq!(frame.additions[2].id, NodeId::new("lamp--1"));
//! assert_eq!(frame.additions[2].position, Vec4::new(0.1, 0.1, 0.0, 1.0));
//!
//! // Moving the row invalidates everything under it.
//! editor.edit("row", |row| row.position.x = 20.0).unwrap();
//! let frame = editor.render_buckets().unwrap();
//! assert_eq!(frame.additions[0].position.x, 0.2);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod advisory;
pub mod cache;
pub mod changes;
pub mod district;
pub mod editor;
pub mod instance;
pub mod pattern;
pub mod resolver;
pub mod transform;

pub use advisory::{Advisories, Advisory, Axis};
pub use cache::ResolutionCache;
pub use changes::Changes;
pub use district::District;
pub use editor::{EditError, Editor, RenderBuckets};
pub use instance::{InstancedMeshTransform, pad_to_capacity};
pub use pattern::PatternCopy;
pub use resolver::{ResolveError, ResolveOptions, ResolvedNode, Resolver};
pub use transform::{LocalTransform, Placement};
