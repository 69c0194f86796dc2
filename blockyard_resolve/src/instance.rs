// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! District-normalized instance transforms, the renderer-facing output.

use alloc::vec::Vec;

use blockyard_topology::NodeId;
use glam::{Quat, Vec3, Vec4};

/// A resolved instance, ready for an instanced-draw buffer.
///
/// Position and scale `xyz` are normalized against the target district;
/// `orientation` is a unit quaternion stored `(x, y, z, w)`.
/// `position.w` is always `1` for real entries. `scale.w` marks a "real box":
/// `1` when the world scale is neither unit nor zero, else `0`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct InstancedMeshTransform {
    /// Node id, or a synthetic clone id.
    pub id: NodeId,
    /// Authored node a virtual entry traces back to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub origin_id: Option<NodeId>,
    /// Generated by a pattern.
    #[cfg_attr(feature = "serde", serde(rename = "virtual", default))]
    pub is_virtual: bool,
    /// Normalized position, `w = 1`.
    pub position: Vec4,
    /// Orientation quaternion.
    pub orientation: Vec4,
    /// Normalized scale, `w` is the real-box marker.
    pub scale: Vec4,
}

impl InstancedMeshTransform {
    /// The padding entry: empty id, every component zero.
    pub fn degenerate() -> Self {
        Self {
            id: NodeId::new(""),
            origin_id: None,
            is_virtual: false,
            position: Vec4::ZERO,
            orientation: Vec4::ZERO,
            scale: Vec4::ZERO,
        }
    }

    /// True unless this is a padding entry.
    pub fn is_real(&self) -> bool {
        !self.id.as_str().is_empty()
    }

    /// The authored node this entry came from.
    pub fn source_id(&self) -> &NodeId {
        self.origin_id.as_ref().unwrap_or(&self.id)
    }

    /// Orientation as a quaternion.
    pub fn quat(&self) -> Quat {
        Quat::from_vec4(self.orientation)
    }

    /// True if the normalized scale marks a real box.
    pub fn is_box(&self) -> bool {
        self.scale.w == 1.0
    }
}

impl Default for InstancedMeshTransform {
    fn default() -> Self {
        Self::degenerate()
    }
}

/// The real-box marker for a world scale.
pub(crate) fn box_marker(scale: Vec3) -> f32 {
    if scale == Vec3::ONE || scale == Vec3::ZERO {
        0.0
    } else {
        1.0
    }
}

/// Resize `transforms` to exactly `capacity` entries.
///
/// Missing slots are filled with [`InstancedMeshTransform::degenerate`];
/// entries beyond `capacity` are dropped.
pub fn pad_to_capacity(transforms: &mut Vec<InstancedMeshTransform>, capacity: usize) {
    if transforms.len() > capacity {
        log::debug!(
            "dropping {} transforms beyond buffer capacity {capacity}",
            transforms.len() - capacity
        );
    }
    transforms.resize_with(capacity, InstancedMeshTransform::degenerate);
}
