// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree snapshot produced by the topology builder: roots and weighted tree nodes.

use alloc::string::String;
use alloc::vec::Vec;

use crate::types::{NodeId, NodeKind, RootId, Tag};

/// Position of a [`TreeNode`] in a [`Forest`].
///
/// Only meaningful for the forest that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TreeIndex(pub(crate) u32);

impl TreeIndex {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Lightweight mirror of a node inside the tree.
#[derive(Clone, Debug)]
pub struct TreeNode {
    /// Id of the mirrored node.
    pub id: NodeId,
    /// Group or instance.
    pub kind: NodeKind,
    /// Children in map order.
    pub children: Vec<TreeIndex>,
    /// Number of leaf instances this subtree yields once patterns are expanded.
    pub weight: u64,
}

/// A root of the forest.
#[derive(Clone, Debug)]
pub enum Root {
    /// A district root partitioning its direct children by [`Tag`].
    District {
        /// District name.
        name: String,
        /// Children tagged [`Tag::Create`].
        create: Vec<TreeIndex>,
        /// Children tagged [`Tag::Update`].
        update: Vec<TreeIndex>,
        /// Children tagged [`Tag::Delete`].
        delete: Vec<TreeIndex>,
    },
    /// The template root: a flat holding area.
    Template {
        /// Children in map order.
        children: Vec<TreeIndex>,
    },
}

impl Root {
    pub(crate) fn for_id(id: &RootId) -> Self {
        match id {
            RootId::District(name) => Self::District {
                name: name.clone(),
                create: Vec::new(),
                update: Vec::new(),
                delete: Vec::new(),
            },
            RootId::Template => Self::Template {
                children: Vec::new(),
            },
        }
    }

    /// Identifier of this root.
    pub fn id(&self) -> RootId {
        match self {
            Self::District { name, .. } => RootId::District(name.clone()),
            Self::Template { .. } => RootId::Template,
        }
    }

    /// Direct children in the bucket for `tag`.
    ///
    /// The template root has no buckets; it returns all children for [`Tag::Create`]
    /// and nothing otherwise.
    pub fn bucket(&self, tag: Tag) -> &[TreeIndex] {
        match (self, tag) {
            (Self::District { create, .. }, Tag::Create) => create,
            (Self::District { update, .. }, Tag::Update) => update,
            (Self::District { delete, .. }, Tag::Delete) => delete,
            (Self::Template { children }, Tag::Create) => children,
            (Self::Template { .. }, _) => &[],
        }
    }

    /// All direct children, bucket by bucket.
    pub fn children(&self) -> impl Iterator<Item = TreeIndex> + '_ {
        [Tag::Create, Tag::Update, Tag::Delete]
            .into_iter()
            .flat_map(|tag| self.bucket(tag).iter().copied())
    }

    pub(crate) fn attach(&mut self, tag: Tag, child: TreeIndex) {
        match self {
            Self::District {
                create,
                update,
                delete,
                ..
            } => match tag {
                Tag::Create => create.push(child),
                Tag::Update => update.push(child),
                Tag::Delete => delete.push(child),
            },
            Self::Template { children } => children.push(child),
        }
    }
}

/// Arena of tree nodes plus the roots that own them.
#[derive(Clone, Debug, Default)]
pub struct Forest {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) roots: Vec<Root>,
}

impl Forest {
    /// Access a tree node.
    ///
    /// Panics if `index` came from another forest and is out of range.
    pub fn node(&self, index: TreeIndex) -> &TreeNode {
        &self.nodes[index.idx()]
    }

    /// Number of tree nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no nodes were placed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All roots: known districts first, in the order given to the builder, then the template root.
    pub fn roots(&self) -> &[Root] {
        &self.roots
    }

    /// Look up a root.
    pub fn root(&self, id: &RootId) -> Option<&Root> {
        self.roots.iter().find(|r| r.id() == *id)
    }

    /// Sum of the weights of a root's direct children, saturating.
    pub fn root_weight(&self, id: &RootId) -> u64 {
        self.root(id)
            .map(|r| {
                r.children()
                    .fold(0_u64, |acc, c| acc.saturating_add(self.node(c).weight))
            })
            .unwrap_or(0)
    }

    pub(crate) fn push(&mut self, node: TreeNode) -> TreeIndex {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "TreeIndex uses 32-bit indices by design."
        )]
        let index = TreeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        index
    }
}
