// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classification of node edits.

use blockyard_topology::Node;

bitflags::bitflags! {
    /// Which parts of a node an edit touched.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Changes: u16 {
        /// Display label.
        const LABEL       = 1 << 0;
        /// Local position, rotation, or scale.
        const TRANSFORM   = 1 << 1;
        /// Pattern descriptor.
        const PATTERN     = 1 << 2;
        /// Own mirror plane.
        const MIRROR      = 1 << 3;
        /// Hidden flag.
        const HIDDEN      = 1 << 4;
        /// Parent node.
        const PARENT      = 1 << 5;
        /// Root district or template.
        const ROOT        = 1 << 6;
        /// Edit bucket.
        const TAG         = 1 << 7;
        /// Group or instance.
        const KIND        = 1 << 8;
        /// Baked slot index.
        const BAKED_INDEX = 1 << 9;
    }
}

impl Changes {
    /// Edits that reshape the tree.
    pub const TOPOLOGY: Self = Self::PARENT.union(Self::ROOT).union(Self::TAG).union(Self::KIND);

    /// Diff two versions of the same node.
    pub fn between(before: &Node, after: &Node) -> Self {
        let mut changes = Self::empty();
        changes.set(Self::LABEL, before.label != after.label);
        changes.set(
            Self::TRANSFORM,
            before.position != after.position
                || before.rotation != after.rotation
                || before.scale != after.scale,
        );
        changes.set(Self::PATTERN, before.pattern != after.pattern);
        changes.set(Self::MIRROR, before.mirror != after.mirror);
        changes.set(Self::HIDDEN, before.hidden != after.hidden);
        changes.set(Self::PARENT, before.parent != after.parent);
        changes.set(Self::ROOT, before.root != after.root);
        changes.set(Self::TAG, before.tag != after.tag);
        changes.set(Self::KIND, before.kind != after.kind);
        changes.set(Self::BAKED_INDEX, before.index_in_district != after.index_in_district);
        changes
    }

    /// True if the tree and index must be rebuilt.
    pub fn needs_rebuild(self) -> bool {
        self.intersects(Self::TOPOLOGY)
    }

    /// True if cached resolutions through the node are stale.
    pub fn needs_invalidation(self) -> bool {
        !self.difference(Self::LABEL).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockyard_topology::{MirrorPlane, RootId, Tag};
    use glam::Vec3;

    fn lamp() -> Node {
        Node::instance("lamp", RootId::district("watson"))
    }

    #[test]
    fn label_only_is_cosmetic() {
        let mut after = lamp();
        after.label = "Street lamp".into();
        let changes = Changes::between(&lamp(), &after);
        assert_eq!(changes, Changes::LABEL);
        assert!(!changes.needs_rebuild());
        assert!(!changes.needs_invalidation());
    }

    #[test]
    fn local_edits_invalidate_without_rebuild() {
        let after = lamp()
            .with_position(Vec3::X)
            .with_mirror(MirrorPlane::Xy)
            .with_hidden(true);
        let changes = Changes::between(&lamp(), &after);
        assert_eq!(changes, Changes::TRANSFORM | Changes::MIRROR | Changes::HIDDEN);
        assert!(!changes.needs_rebuild());
        assert!(changes.needs_invalidation());
    }

    #[test]
    fn tag_and_parent_rebuild() {
        let after = lamp().with_tag(Tag::Delete).with_parent("row");
        let changes = Changes::between(&lamp(), &after);
        assert!(changes.contains(Changes::TAG | Changes::PARENT));
        assert!(changes.needs_rebuild());
    }

    #[test]
    fn identical_nodes_have_no_changes() {
        assert!(Changes::between(&lamp(), &lamp()).is_empty());
    }
}
