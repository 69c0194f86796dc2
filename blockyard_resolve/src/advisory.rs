// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Non-fatal validation of resolved instances against their district.

use alloc::vec::Vec;
use core::fmt;

use blockyard_topology::NodeId;
use hashbrown::HashMap;

use crate::instance::InstancedMeshTransform;

/// A coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// X.
    X,
    /// Y.
    Y,
    /// Z.
    Z,
}

impl Axis {
    const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        })
    }
}

/// A problem with a resolved instance that the editor surfaces without blocking it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Advisory {
    /// The instance sits outside the district bounds.
    #[error("position is outside the district along {axis}")]
    PositionOutOfBounds {
        /// Offending axis.
        axis: Axis,
    },
    /// The instance is larger than the district encodes.
    #[error("scale is out of range along {axis}")]
    ScaleOutOfRange {
        /// Offending axis.
        axis: Axis,
    },
}

/// Check one normalized transform. Padding entries never yield advisories.
pub fn check(transform: &InstancedMeshTransform) -> Vec<Advisory> {
    if !transform.is_real() {
        return Vec::new();
    }
    let position = transform.position.truncate().to_array();
    let scale = transform.scale.truncate().to_array();
    let in_unit = |v: f32| (0.0..=1.0).contains(&v);
    let mut out = Vec::new();
    for (i, axis) in Axis::ALL.into_iter().enumerate() {
        if !in_unit(position[i]) {
            out.push(Advisory::PositionOutOfBounds { axis });
        }
    }
    for (i, axis) in Axis::ALL.into_iter().enumerate() {
        if !in_unit(scale[i]) {
            out.push(Advisory::ScaleOutOfRange { axis });
        }
    }
    out
}

/// Advisories attached to authored nodes.
///
/// Clone transforms report against their source node.
#[derive(Clone, Debug, Default)]
pub struct Advisories {
    by_node: HashMap<NodeId, Vec<Advisory>>,
}

impl Advisories {
    /// No advisories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `transform` and attach any findings to its source node.
    pub fn record(&mut self, transform: &InstancedMeshTransform) {
        let found = check(transform);
        if found.is_empty() {
            return;
        }
        let list = self.by_node.entry(transform.source_id().clone()).or_default();
        for advisory in found {
            if !list.contains(&advisory) {
                list.push(advisory);
            }
        }
    }

    /// Advisories for `id`.
    pub fn get(&self, id: &str) -> &[Advisory] {
        self.by_node.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `id` has any advisory.
    pub fn has_errors(&self, id: &NodeId) -> bool {
        self.by_node.contains_key(id)
    }

    /// Number of nodes with advisories.
    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    /// True if no node has advisories.
    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.by_node.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn at(position: Vec4, scale: Vec4) -> InstancedMeshTransform {
        InstancedMeshTransform {
            id: NodeId::new("kiosk"),
            origin_id: None,
            is_virtual: false,
            position,
            orientation: Vec4::W,
            scale,
        }
    }

    #[test]
    fn inside_bounds_is_clean() {
        let t = at(Vec4::new(0.0, 0.5, 1.0, 1.0), Vec4::new(0.1, 0.1, 0.1, 1.0));
        assert!(check(&t).is_empty());
    }

    #[test]
    fn reports_each_offending_axis() {
        let t = at(Vec4::new(-0.1, 0.5, 1.2, 1.0), Vec4::new(0.1, 3.0, 0.1, 1.0));
        assert_eq!(
            check(&t),
            [
                Advisory::PositionOutOfBounds { axis: Axis::X },
                Advisory::PositionOutOfBounds { axis: Axis::Z },
                Advisory::ScaleOutOfRange { axis: Axis::Y },
            ]
        );
    }

    #[test]
    fn padding_is_ignored() {
        assert!(check(&InstancedMeshTransform::degenerate()).is_empty());
    }

    #[test]
    fn clones_report_against_their_source() {
        let mut advisories = Advisories::new();
        let mut clone = at(Vec4::new(2.0, 0.5, 0.5, 1.0), Vec4::ZERO);
        clone.id = NodeId::new("kiosk--3");
        clone.origin_id = Some(NodeId::new("kiosk"));
        advisories.record(&clone);
        advisories.record(&clone);
        assert_eq!(
            advisories.get("kiosk"),
            [Advisory::PositionOutOfBounds { axis: Axis::X }]
        );
        assert!(advisories.get("kiosk--3").is_empty());
        assert!(advisories.has_errors(&NodeId::new("kiosk")));
        assert_eq!(advisories.len(), 1);
    }
}
