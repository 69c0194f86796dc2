// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! District bounds and the conversion between world and district-normalized space.

use alloc::string::String;
use alloc::vec::Vec;

use blockyard_topology::RootId;
use glam::{Quat, Vec3, Vec4};

use crate::instance::{InstancedMeshTransform, box_marker};
use crate::resolver::ResolvedNode;
use crate::transform::{LocalTransform, quat_to_euler};

/// A bounded region of the map acting as a root.
///
/// `size` components and `cube_size` are expected to be positive.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct District {
    /// District name, matching [`RootId::District`].
    pub name: String,
    /// Minimum corner of the bounding box, world space.
    pub origin: Vec3,
    /// Bounding box extents.
    pub size: Vec3,
    /// Edge length of the unit block.
    pub cube_size: f32,
    /// Decoded baked transforms, addressed by `Node::index_in_district`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub baked: Vec<InstancedMeshTransform>,
}

impl District {
    /// A district with no baked data.
    pub fn new(name: &str, origin: Vec3, size: Vec3, cube_size: f32) -> Self {
        Self {
            name: String::from(name),
            origin,
            size,
            cube_size,
            baked: Vec::new(),
        }
    }

    /// Replace the baked transform array.
    pub fn with_baked(mut self, baked: Vec<InstancedMeshTransform>) -> Self {
        self.baked = baked;
        self
    }

    /// Root id of this district.
    pub fn root_id(&self) -> RootId {
        RootId::district(&self.name)
    }

    /// Normalize a resolved instance into this district's space.
    pub fn normalize(&self, resolved: &ResolvedNode) -> InstancedMeshTransform {
        let placement = &resolved.placement;
        let position = (placement.position - self.origin) / self.size;
        let scale = placement.scale / (2.0 * self.cube_size);
        InstancedMeshTransform {
            id: resolved.id.clone(),
            origin_id: resolved.origin_id.clone(),
            is_virtual: resolved.is_virtual,
            position: position.extend(1.0),
            orientation: Vec4::from(placement.orientation),
            scale: scale.extend(box_marker(placement.scale)),
        }
    }

    /// Invert the normalization of baked entry `index`.
    ///
    /// Returns world position, Euler rotation, and world scale, or `None` for an
    /// out-of-range index or a padding entry.
    pub fn decode_baked(&self, index: usize) -> Option<LocalTransform> {
        let entry = self.baked.get(index).filter(|e| e.is_real())?;
        let orientation = Quat::from_vec4(entry.orientation).normalize();
        Some(LocalTransform {
            position: entry.position.truncate() * self.size + self.origin,
            rotation: quat_to_euler(orientation),
            scale: entry.scale.truncate() * (2.0 * self.cube_size),
        })
    }
}
