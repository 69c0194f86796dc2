// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for placement nodes: identifiers, roots, tags, and pattern/mirror descriptors.

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;

use glam::Vec3;

/// Maximum number of nodes on a parent chain, root excluded.
///
/// The topology builder does not enforce this; mutation call sites do.
pub const MAX_DEPTH: usize = 32;

/// Identifier for a placement node.
///
/// Ids are stable for the lifetime of a node and unique within a [`NodeMap`](crate::NodeMap).
/// Cloning is cheap (reference counted).
///
/// Pattern clones created during resolution get synthetic ids derived from their
/// source: `"<id>--<i>"` for the `i`-th repetition and `"<id>--X"` for a mirror copy.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create an id from a string.
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the `step`-th clone generated by a repetition pattern.
    pub fn pattern_clone(&self, step: u32) -> Self {
        Self(Arc::from(format!("{}--{}", self.0, step)))
    }

    /// Id of the reflected clone generated by a mirror pattern.
    pub fn mirror_clone(&self) -> Self {
        Self(Arc::from(format!("{}--X", self.0)))
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:?})", &*self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Identifier of a root: a named district or the shared template area.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RootId {
    /// A district root, by district name.
    District(String),
    /// The template root holding reusable node definitions.
    Template,
}

impl RootId {
    /// Convenience constructor for a district root.
    pub fn district(name: &str) -> Self {
        Self::District(String::from(name))
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::District(name) => write!(f, "district `{name}`"),
            Self::Template => f.write_str("template root"),
        }
    }
}

/// Whether a node groups other nodes or places a single block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum NodeKind {
    /// A container; may have children.
    Group,
    /// A placed block; never has children.
    #[default]
    Instance,
}

/// Edit bucket a node belongs to within its district.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Tag {
    /// Newly authored blocks.
    #[default]
    Create,
    /// Overrides of blocks already present in the baked district data.
    Update,
    /// Removals of baked blocks.
    Delete,
}

/// Reflection plane.
///
/// Mirroring negates the component along the plane normal, for positions and
/// Euler rotations alike: `XY` negates Z, `XZ` negates Y, `YZ` negates X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MirrorPlane {
    /// Plane spanned by X and Y (normal Z).
    #[cfg_attr(feature = "serde", serde(rename = "XY"))]
    Xy,
    /// Plane spanned by X and Z (normal Y).
    #[cfg_attr(feature = "serde", serde(rename = "XZ"))]
    Xz,
    /// Plane spanned by Y and Z (normal X).
    #[cfg_attr(feature = "serde", serde(rename = "YZ"))]
    Yz,
}

impl MirrorPlane {
    /// Per-axis sign factors applied by this plane.
    pub const fn signs(self) -> Vec3 {
        match self {
            Self::Xy => Vec3::new(1.0, 1.0, -1.0),
            Self::Xz => Vec3::new(1.0, -1.0, 1.0),
            Self::Yz => Vec3::new(-1.0, 1.0, 1.0),
        }
    }

    /// Reflect `v` across this plane.
    pub fn reflect(self, v: Vec3) -> Vec3 {
        v * self.signs()
    }
}

/// Repetition descriptor.
///
/// Without a mirror plane, a pattern yields `count` extra copies whose local
/// transforms are offset by the deltas cumulatively (`delta * (i + 1)`).
/// With a mirror plane, it yields exactly one reflected copy and `count` is ignored.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern {
    /// Number of extra copies.
    pub count: u32,
    /// Per-step position delta.
    pub position: Vec3,
    /// Per-step rotation delta (Euler XYZ, radians).
    pub rotation: Vec3,
    /// Per-step scale delta.
    pub scale: Vec3,
    /// Reflection plane; switches the pattern to a single mirrored copy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mirror: Option<MirrorPlane>,
}

impl Pattern {
    /// A repetition of `count` copies stepping by `position`.
    pub fn repeat(count: u32, position: Vec3) -> Self {
        Self {
            count,
            position,
            ..Default::default()
        }
    }

    /// A single mirrored copy across `plane`.
    pub fn mirrored(plane: MirrorPlane) -> Self {
        Self {
            mirror: Some(plane),
            ..Default::default()
        }
    }

    /// Number of virtual copies this pattern generates.
    pub fn clone_count(&self) -> u32 {
        if self.mirror.is_some() { 1 } else { self.count }
    }
}

/// A placement node.
///
/// Transforms are local to the parent (or to the root when `parent` is `None`).
/// Rotation is an XYZ Euler triple in radians.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Node {
    /// Stable unique id.
    pub id: NodeId,
    /// Group or instance.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: NodeKind,
    /// Display label.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
    /// Edit bucket.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tag: Tag,
    /// Parent node; `None` places the node directly under its root.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<NodeId>,
    /// Root (district or template) the node belongs to.
    pub root: RootId,
    /// Slot in the district's baked transform array, `-1` for new nodes.
    #[cfg_attr(feature = "serde", serde(default = "no_baked_index"))]
    pub index_in_district: i32,
    /// Hidden nodes keep their slot but resolve with zero scale.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hidden: bool,
    /// Local position.
    pub position: Vec3,
    /// Local rotation (Euler XYZ, radians).
    pub rotation: Vec3,
    /// Local scale.
    pub scale: Vec3,
    /// Reflection applied to this node's local transform and inherited by its subtree.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mirror: Option<MirrorPlane>,
    /// Optional repetition descriptor.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pattern: Option<Pattern>,
}

#[cfg(feature = "serde")]
fn no_baked_index() -> i32 {
    -1
}

impl Node {
    /// A new node with identity local transform.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, root: RootId) -> Self {
        Self {
            id: id.into(),
            kind,
            label: String::new(),
            tag: Tag::Create,
            parent: None,
            root,
            index_in_district: -1,
            hidden: false,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            mirror: None,
            pattern: None,
        }
    }

    /// A new group node.
    pub fn group(id: impl Into<NodeId>, root: RootId) -> Self {
        Self::new(id, NodeKind::Group, root)
    }

    /// A new instance node.
    pub fn instance(id: impl Into<NodeId>, root: RootId) -> Self {
        Self::new(id, NodeKind::Instance, root)
    }

    /// Set the parent.
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    /// Set the local position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the local rotation.
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the local scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set the mirror plane.
    pub fn with_mirror(mut self, mirror: MirrorPlane) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Set the pattern.
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Set the hidden flag.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Whether this node may have children.
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    /// `1 + clones`: how many resolved copies this node produces.
    pub fn multiplier(&self) -> u64 {
        1 + u64::from(self.pattern.as_ref().map_or(0, Pattern::clone_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_ids_follow_source() {
        let id = NodeId::new("wall");
        assert_eq!(id.pattern_clone(0).as_str(), "wall--0");
        assert_eq!(id.pattern_clone(7).as_str(), "wall--7");
        assert_eq!(id.mirror_clone().as_str(), "wall--X");
    }

    #[test]
    fn mirror_negates_normal_component() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(MirrorPlane::Xz.reflect(v), Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(MirrorPlane::Xy.reflect(v), Vec3::new(1.0, 2.0, -3.0));
        assert_eq!(MirrorPlane::Yz.reflect(v), Vec3::new(-1.0, 2.0, 3.0));
    }

    #[test]
    fn multiplier_counts_clones() {
        let root = RootId::district("watson");
        let plain = Node::instance("a", root.clone());
        assert_eq!(plain.multiplier(), 1);
        let repeated = plain.clone().with_pattern(Pattern::repeat(4, Vec3::X));
        assert_eq!(repeated.multiplier(), 5);
        let mut mirrored = Pattern::mirrored(MirrorPlane::Xy);
        mirrored.count = 9;
        let mirrored = Node::instance("b", root).with_pattern(mirrored);
        assert_eq!(mirrored.multiplier(), 2, "mirror patterns ignore count");
    }
}
