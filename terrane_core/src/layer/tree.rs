// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-viewer layer trees mirroring the collection tree.

use alloc::vec::Vec;

use crate::collection::{CollectionTree, NodeId, NodeKind, ObjectId};

/// Per-layer-node boolean flags.
///
/// `flags_evaluated` on the node caches the effective value after
/// [`LayerTree::evaluate_flags`] combined these down the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerFlags {
    /// Whether the mirrored collection is shown in this viewer.
    pub visible: bool,
    /// Whether its members can be selected in this viewer.
    pub selectable: bool,
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self {
            visible: true,
            selectable: true,
        }
    }
}

/// One mirror node in a layer tree.
///
/// Holds a non-owning lookup key into the collection tree plus viewer-local
/// state. Children are exclusively owned and mirror the collection node's
/// children (except for group references, which stay flat).
#[derive(Clone, Debug)]
pub struct LayerNode {
    pub(crate) collection: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) flags: LayerFlags,
    pub(crate) flags_evaluated: LayerFlags,
    pub(crate) children: Vec<LayerNode>,
}

impl LayerNode {
    /// Builds a default-flag mirror of `collection` and its whole subtree.
    pub(crate) fn mirror(tree: &CollectionTree, collection: NodeId) -> Self {
        Self {
            collection,
            kind: tree.kind(collection),
            flags: LayerFlags::default(),
            flags_evaluated: LayerFlags::default(),
            children: tree
                .children(collection)
                .map(|c| Self::mirror(tree, c))
                .collect(),
        }
    }

    /// The mirrored collection node.
    #[must_use]
    pub fn collection(&self) -> NodeId {
        self.collection
    }

    /// Whether this mirror was retagged as a group reference.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Viewer-local flags.
    #[must_use]
    pub fn flags(&self) -> LayerFlags {
        self.flags
    }

    /// Sets the viewer-local flags.
    ///
    /// The evaluated cache is refreshed by the next
    /// [`LayerTree::evaluate_flags`] pass.
    pub fn set_flags(&mut self, flags: LayerFlags) {
        self.flags = flags;
    }

    /// Effective flags from the last [`LayerTree::evaluate_flags`] pass.
    #[must_use]
    pub fn flags_evaluated(&self) -> LayerFlags {
        self.flags_evaluated
    }

    /// The owned child mirrors, in order.
    #[must_use]
    pub fn children(&self) -> &[LayerNode] {
        &self.children
    }

    fn evaluate(&mut self, inherited: LayerFlags) {
        self.flags_evaluated = LayerFlags {
            visible: inherited.visible && self.flags.visible,
            selectable: inherited.selectable && self.flags.selectable,
        };
        for child in &mut self.children {
            child.evaluate(self.flags_evaluated);
        }
    }
}

/// One viewer's structural mirror of a collection tree.
///
/// Top-level entries are *links*: the same collection may be linked at the
/// top level of several layer trees, but never twice within one tree's top
/// level. Below the top level the structure strictly mirrors the collection
/// tree, so a collection node has at most one mirror per subtree.
#[derive(Clone, Debug, Default)]
pub struct LayerTree {
    pub(crate) roots: Vec<LayerNode>,
    pub(crate) active: Option<NodeId>,
    pub(crate) revision: u64,
}

impl LayerTree {
    /// Creates an empty layer tree with no links.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The top-level links, in order.
    #[must_use]
    pub fn roots(&self) -> &[LayerNode] {
        &self.roots
    }

    /// This viewer's active collection marker.
    #[must_use]
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Sets the active collection marker.
    pub fn set_active(&mut self, node: Option<NodeId>) {
        self.active = node;
    }

    /// A counter bumped on every synchronization callback, so viewer-side
    /// caches (selection state, draw lists) know when to invalidate.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the first mirror of `collection`, pre-order.
    #[must_use]
    pub fn find(&self, collection: NodeId) -> Option<&LayerNode> {
        fn rec(nodes: &[LayerNode], target: NodeId) -> Option<&LayerNode> {
            for n in nodes {
                if n.collection == target {
                    return Some(n);
                }
                if let Some(found) = rec(&n.children, target) {
                    return Some(found);
                }
            }
            None
        }
        rec(&self.roots, collection)
    }

    /// Returns the first mirror of `collection` mutably, pre-order.
    #[must_use]
    pub fn find_mut(&mut self, collection: NodeId) -> Option<&mut LayerNode> {
        fn rec(nodes: &mut [LayerNode], target: NodeId) -> Option<&mut LayerNode> {
            for n in nodes {
                if n.collection == target {
                    return Some(n);
                }
                if let Some(found) = rec(&mut n.children, target) {
                    return Some(found);
                }
            }
            None
        }
        rec(&mut self.roots, collection)
    }

    /// Links `collection` at the top level, mirroring its whole subtree with
    /// default flags. Returns the link's position, or `None` if the
    /// collection is already linked at this tree's top level.
    pub(crate) fn link(&mut self, tree: &CollectionTree, collection: NodeId) -> Option<usize> {
        if self.roots.iter().any(|r| r.collection == collection) {
            return None;
        }
        self.roots.push(LayerNode::mirror(tree, collection));
        self.revision += 1;
        Some(self.roots.len() - 1)
    }

    /// Removes the top-level link at `index`.
    pub(crate) fn unlink(&mut self, index: usize) -> bool {
        if index >= self.roots.len() {
            return false;
        }
        self.roots.remove(index);
        self.revision += 1;
        true
    }

    /// Viewer bookkeeping hook: `object` was linked under `node`.
    pub(crate) fn on_member_linked(&mut self, _node: NodeId, _object: ObjectId) {
        self.revision += 1;
    }

    /// Viewer bookkeeping hook: `object` was unlinked from `node`.
    pub(crate) fn on_member_unlinked(&mut self, _node: NodeId, _object: ObjectId) {
        self.revision += 1;
    }

    /// Recomputes every node's evaluated-flag cache top-down: effective
    /// visibility/selectability is the AND of the node's own flags with its
    /// ancestors'.
    pub fn evaluate_flags(&mut self) {
        for root in &mut self.roots {
            root.evaluate(LayerFlags::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_child() -> (CollectionTree, NodeId) {
        let mut t = CollectionTree::new("Master Collection");
        let a = t.add(None, NodeKind::Normal, Some("A"));
        (t, a)
    }

    #[test]
    fn link_mirrors_the_subtree() {
        let (mut t, a) = tree_with_child();
        let b = t.add(Some(a), NodeKind::Normal, Some("B"));
        let mut lt = LayerTree::new();
        assert_eq!(lt.link(&t, t.master()), Some(0));

        let root = &lt.roots()[0];
        assert_eq!(root.collection(), t.master());
        assert_eq!(root.children()[0].collection(), a);
        assert_eq!(root.children()[0].children()[0].collection(), b);
    }

    #[test]
    fn double_link_at_top_level_is_rejected() {
        let (t, a) = tree_with_child();
        let mut lt = LayerTree::new();
        assert!(lt.link(&t, a).is_some());
        assert!(lt.link(&t, a).is_none(), "same collection twice in one top level");

        // The same collection may be linked into a second tree.
        let mut other = LayerTree::new();
        assert!(other.link(&t, a).is_some());
    }

    #[test]
    fn evaluate_flags_combines_down_the_tree() {
        let (mut t, a) = tree_with_child();
        let b = t.add(Some(a), NodeKind::Normal, Some("B"));
        let mut lt = LayerTree::new();
        let _ = lt.link(&t, t.master());

        lt.find_mut(a)
            .expect("mirror of A")
            .set_flags(LayerFlags {
                visible: false,
                selectable: true,
            });
        lt.evaluate_flags();

        let eb = lt.find(b).expect("mirror of B").flags_evaluated();
        assert!(!eb.visible, "hidden ancestor hides the subtree");
        assert!(eb.selectable);
    }
}
