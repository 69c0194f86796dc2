// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local and resolved transforms, and the parent composition rule.

use blockyard_topology::{MirrorPlane, Node};
use glam::{EulerRot, Quat, Vec3};

/// Convert an XYZ Euler triple (radians) to a quaternion.
pub fn euler_to_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

/// Convert a quaternion to an XYZ Euler triple (radians).
pub fn quat_to_euler(orientation: Quat) -> Vec3 {
    let (x, y, z) = orientation.to_euler(EulerRot::XYZ);
    Vec3::new(x, y, z)
}

/// Sign factors for an optional mirror plane.
pub fn mirror_signs(plane: Option<MirrorPlane>) -> Vec3 {
    plane.map_or(Vec3::ONE, MirrorPlane::signs)
}

/// Position, Euler rotation, and scale relative to a parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    /// Position in parent space.
    pub position: Vec3,
    /// Euler XYZ rotation in radians.
    pub rotation: Vec3,
    /// Non-uniform scale.
    pub scale: Vec3,
}

impl LocalTransform {
    /// No translation, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// The local transform authored on `node`.
    pub fn of(node: &Node) -> Self {
        Self {
            position: node.position,
            rotation: node.rotation,
            scale: node.scale,
        }
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A transform resolved into world space.
///
/// `mirror` is the node's own plane; it reflects the local transforms of the
/// node's children, not the node itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub orientation: Quat,
    /// World scale.
    pub scale: Vec3,
    /// Plane applied to children.
    pub mirror: Option<MirrorPlane>,
}

impl Placement {
    /// The placement of a root: origin, no rotation, unit scale, no mirror.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
        scale: Vec3::ONE,
        mirror: None,
    };

    /// Place a child with `local` transform and own mirror plane under `self`.
    ///
    /// The child's local position and rotation are reflected by this placement's
    /// plane, the position is then scaled by the parent scale, rotated by the
    /// parent orientation, and offset by the parent position. Rotation mirroring
    /// negates Euler components rather than reflecting the rotation matrix; baked
    /// district data depends on that rule.
    pub fn child(&self, local: &LocalTransform, mirror: Option<MirrorPlane>) -> Self {
        let signs = mirror_signs(self.mirror);
        let offset = local.position * signs * self.scale;
        Self {
            position: self.orientation * offset + self.position,
            orientation: self.orientation * euler_to_quat(local.rotation * signs),
            scale: local.scale * self.scale,
            mirror,
        }
    }

    /// Euler XYZ rotation of the orientation.
    pub fn rotation(&self) -> Vec3 {
        quat_to_euler(self.orientation)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn at(position: Vec3) -> LocalTransform {
        LocalTransform {
            position,
            ..LocalTransform::IDENTITY
        }
    }

    #[test]
    fn root_child_keeps_local_transform() {
        let local = LocalTransform {
            position: Vec3::new(3.0, 4.0, 5.0),
            rotation: Vec3::new(0.0, 0.0, 0.5),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let placed = Placement::IDENTITY.child(&local, None);
        assert_eq!(placed.position, local.position);
        assert_eq!(placed.scale, local.scale);
        assert!(placed.rotation().abs_diff_eq(local.rotation, EPS));
    }

    #[test]
    fn parent_scale_stretches_child_offset_before_rotation() {
        let parent = Placement {
            position: Vec3::new(10.0, 0.0, 0.0),
            orientation: euler_to_quat(Vec3::new(0.0, 0.0, FRAC_PI_2)),
            scale: Vec3::new(2.0, 1.0, 1.0),
            mirror: None,
        };
        let child = parent.child(&at(Vec3::new(1.0, 0.0, 0.0)), None);
        // (1,0,0) scaled to (2,0,0), rotated 90 degrees about Z to (0,2,0).
        assert!(child.position.abs_diff_eq(Vec3::new(10.0, 2.0, 0.0), EPS));
        assert_eq!(child.scale, Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn mirror_xz_negates_only_y() {
        let parent = Placement {
            mirror: Some(MirrorPlane::Xz),
            ..Placement::IDENTITY
        };
        let local = LocalTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.1, 0.2, 0.3),
            scale: Vec3::ONE,
        };
        let placed = parent.child(&local, None);
        assert_eq!(placed.position, Vec3::new(1.0, -2.0, 3.0));
        assert!(placed.rotation().abs_diff_eq(Vec3::new(0.1, -0.2, 0.3), EPS));
        assert_eq!(placed.mirror, None);
    }

    #[test]
    fn own_plane_reflects_children_only() {
        let group = Placement::IDENTITY.child(&at(Vec3::new(0.0, 0.0, 4.0)), Some(MirrorPlane::Xy));
        assert_eq!(group.position, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(group.mirror, Some(MirrorPlane::Xy));
        let child = group.child(&at(Vec3::new(1.0, 1.0, 1.0)), None);
        assert!(child.position.abs_diff_eq(Vec3::new(1.0, 1.0, 3.0), EPS));
        // Grandchildren are not reflected again.
        let grandchild = child.child(&at(Vec3::new(0.0, 0.0, 1.0)), None);
        assert!(grandchild.position.abs_diff_eq(Vec3::new(1.0, 1.0, 4.0), EPS));
    }

    #[test]
    fn euler_round_trip() {
        let rotation = Vec3::new(0.3, -0.2, 1.1);
        assert!(quat_to_euler(euler_to_quat(rotation)).abs_diff_eq(rotation, EPS));
    }
}
