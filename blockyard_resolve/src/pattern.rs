// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pattern expansion: one authored node into its original plus virtual copies.

use alloc::vec::Vec;

use blockyard_topology::{MirrorPlane, Node, NodeId};

use crate::transform::LocalTransform;

/// One copy of an authored node, before parenting.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternCopy {
    /// Node id, or the synthetic clone id.
    pub id: NodeId,
    /// Authored source of a clone.
    pub origin_id: Option<NodeId>,
    /// Generated by a pattern rather than authored.
    pub is_virtual: bool,
    /// Local transform, pattern offsets applied.
    pub local: LocalTransform,
    /// Plane that reflects this copy's children.
    pub mirror: Option<MirrorPlane>,
}

/// The authored copy of `node`, pattern ignored.
pub fn original(node: &Node) -> PatternCopy {
    PatternCopy {
        id: node.id.clone(),
        origin_id: None,
        is_virtual: false,
        local: LocalTransform::of(node),
        mirror: node.mirror,
    }
}

/// Expand `node` into the original followed by its pattern clones.
///
/// A repetition of `count = N` appends `N` clones `"<id>--<i>"` whose local
/// position, rotation, and scale are offset by `delta * (i + 1)`. A mirror
/// pattern appends the single clone `"<id>--X"` carrying the pattern's plane.
pub fn expand(node: &Node) -> Vec<PatternCopy> {
    let authored = original(node);
    let local = authored.local;
    let Some(pattern) = &node.pattern else {
        return alloc::vec![authored];
    };

    if let Some(plane) = pattern.mirror {
        let reflected = PatternCopy {
            id: node.id.mirror_clone(),
            origin_id: Some(node.id.clone()),
            is_virtual: true,
            local,
            mirror: Some(plane),
        };
        return alloc::vec![authored, reflected];
    }

    let mut out = Vec::with_capacity(1 + pattern.count as usize);
    out.push(authored);
    for step in 0..pattern.count {
        #[allow(
            clippy::cast_precision_loss,
            reason = "pattern counts are far below f32 integer precision."
        )]
        let k = (step + 1) as f32;
        out.push(PatternCopy {
            id: node.id.pattern_clone(step),
            origin_id: Some(node.id.clone()),
            is_virtual: true,
            local: LocalTransform {
                position: local.position + pattern.position * k,
                rotation: local.rotation + pattern.rotation * k,
                scale: local.scale + pattern.scale * k,
            },
            mirror: node.mirror,
        });
    }
    out
}
