// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronization of layer trees with the collection tree.
//!
//! The collection tree is ground truth; these passes re-derive the affected
//! layer regions after a structural edit. Mirrors that survive a resync keep
//! their viewer-local flags, fresh mirrors get defaults, and mirrors of
//! removed nodes are dropped so a layer node never outlives its collection
//! node.

use alloc::vec::Vec;
use core::mem;

use crate::collection::{CollectionTree, NodeId, NodeKind};

use super::tree::{LayerNode, LayerTree};

/// Calls `f` on every mirror of `target` in `nodes`.
///
/// The same collection can be linked several times at the top level (for
/// example directly and nested under a master link), so the top-level scan
/// always runs to completion. Below the top level the structure mirrors the
/// collection tree, so each subtree holds at most one match and the descent
/// stops at the first.
fn for_each_mirror(nodes: &mut [LayerNode], target: NodeId, f: &mut dyn FnMut(&mut LayerNode)) {
    fn below(nodes: &mut [LayerNode], target: NodeId, f: &mut dyn FnMut(&mut LayerNode)) -> bool {
        for n in nodes {
            if n.collection == target {
                f(n);
                return true;
            }
            if below(&mut n.children, target, f) {
                return true;
            }
        }
        false
    }
    for n in nodes {
        if n.collection == target {
            f(n);
        } else {
            below(&mut n.children, target, f);
        }
    }
}

/// Mirrors a freshly created collection node under every mirror of its
/// parent. The new node has no children yet, so no recursion is needed.
pub(crate) fn mirror_new_node(
    trees: &mut [LayerTree],
    tree: &CollectionTree,
    parent: NodeId,
    node: NodeId,
) {
    for lt in trees {
        let mut touched = false;
        for_each_mirror(&mut lt.roots, parent, &mut |mirror| {
            mirror.children.push(LayerNode::mirror(tree, node));
            touched = true;
        });
        if touched {
            lt.revision += 1;
        }
    }
}

/// Rebuilds the layer region below every mirror of `root` from the
/// collection tree.
///
/// Children are re-derived in collection order: a child whose mirror already
/// exists is kept (flags and deeper preserved state intact) and resynced
/// recursively, a child with no mirror gets a fresh default-flag one, and
/// leftover mirrors of no-longer-present children are discarded.
pub(crate) fn resync(trees: &mut [LayerTree], tree: &CollectionTree, root: NodeId) {
    fn rebuild(tree: &CollectionTree, mirror: &mut LayerNode) {
        // Group references stay flat regardless of what the proxy node's
        // collection once contained.
        if mirror.kind == NodeKind::GroupRef {
            mirror.children.clear();
            return;
        }
        let mut old: Vec<Option<LayerNode>> =
            mem::take(&mut mirror.children).into_iter().map(Some).collect();
        for child in tree.children(mirror.collection) {
            let kept = old
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|n| n.collection == child))
                .and_then(Option::take);
            match kept {
                Some(mut n) => {
                    rebuild(tree, &mut n);
                    mirror.children.push(n);
                }
                None => mirror.children.push(LayerNode::mirror(tree, child)),
            }
        }
    }
    for lt in trees {
        let mut touched = false;
        for_each_mirror(&mut lt.roots, root, &mut |mirror| {
            rebuild(tree, mirror);
            touched = true;
        });
        if touched {
            lt.revision += 1;
        }
    }
}

/// Drops every layer node (and its subtree) whose collection is in `freed`,
/// in every tree. Resets each tree's active marker, since it may have pointed
/// into a removed region.
pub(crate) fn cascade_removed(trees: &mut [LayerTree], freed: &[NodeId]) {
    fn prune(nodes: &mut Vec<LayerNode>, freed: &[NodeId]) {
        nodes.retain_mut(|n| {
            if freed.contains(&n.collection) {
                return false;
            }
            prune(&mut n.children, freed);
            true
        });
    }
    if freed.is_empty() {
        return;
    }
    for lt in trees {
        prune(&mut lt.roots, freed);
        lt.active = None;
        lt.revision += 1;
    }
}

/// Retags every mirror of `target` as a group reference and drops its
/// children. Used when a collection node is converted into a group proxy.
pub(crate) fn convert_to_group_links(trees: &mut [LayerTree], target: NodeId) {
    for lt in trees {
        let mut touched = false;
        for_each_mirror(&mut lt.roots, target, &mut |mirror| {
            mirror.kind = NodeKind::GroupRef;
            mirror.children.clear();
            touched = true;
        });
        if touched {
            lt.revision += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::collection::CollectionTree;
    use crate::layer::LayerFlags;

    fn mirrors_of(lt: &LayerTree, target: NodeId) -> usize {
        fn rec(nodes: &[LayerNode], target: NodeId, count: &mut usize) {
            for n in nodes {
                if n.collection == target {
                    *count += 1;
                }
                rec(&n.children, target, count);
            }
        }
        let mut count = 0;
        rec(lt.roots(), target, &mut count);
        count
    }

    #[test]
    fn new_node_appears_under_every_parent_mirror() {
        let mut t = CollectionTree::new("Master Collection");
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let mut lt = LayerTree::new();
        // Master linked and A linked directly: two mirrors of A.
        let _ = lt.link(&t, t.master());
        let _ = lt.link(&t, a);

        let b = t.add(Some(a), NodeKind::Normal, Some("B"));
        let mut trees = vec![lt];
        mirror_new_node(&mut trees, &t, a, b);
        assert_eq!(mirrors_of(&trees[0], b), 2);
    }

    #[test]
    fn resync_preserves_flags_of_kept_mirrors() {
        let mut t = CollectionTree::new("Master Collection");
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(Some(a), NodeKind::Normal, Some("B"));
        let mut lt = LayerTree::new();
        let _ = lt.link(&t, t.master());
        lt.find_mut(b).expect("mirror of B").set_flags(LayerFlags {
            visible: false,
            selectable: false,
        });

        // A gains a sibling for B; B's mirror must survive with its flags.
        let c = t.add(Some(a), NodeKind::Normal, Some("C"));
        let mut trees = vec![lt];
        resync(&mut trees, &t, a);

        let lt = &trees[0];
        assert_eq!(mirrors_of(lt, c), 1);
        let flags = lt.find(b).expect("mirror of B").flags();
        assert!(!flags.visible && !flags.selectable);
    }

    #[test]
    fn resync_discards_mirrors_of_departed_children() {
        let mut t = CollectionTree::new("Master Collection");
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(None, NodeKind::Normal, Some("B"));
        let c = t.add(Some(a), NodeKind::Normal, Some("C"));
        let mut lt = LayerTree::new();
        let _ = lt.link(&t, t.master());

        // C moves from A to B in the collection tree; both regions resync.
        t.move_into(b, c).expect("valid move");
        let mut trees = vec![lt];
        resync(&mut trees, &t, a);
        resync(&mut trees, &t, b);

        let lt = &trees[0];
        assert_eq!(mirrors_of(lt, c), 1);
        let b_mirror = lt.find(b).expect("mirror of B");
        assert_eq!(b_mirror.children()[0].collection(), c);
        assert!(lt.find(a).expect("mirror of A").children().is_empty());
    }

    #[test]
    fn removal_cascades_into_nested_mirrors() {
        let mut t = CollectionTree::new("Master Collection");
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(Some(a), NodeKind::Normal, Some("B"));
        let mut lt = LayerTree::new();
        let _ = lt.link(&t, t.master());
        let _ = lt.link(&t, b);
        lt.set_active(Some(b));

        let freed = t
            .remove(a, false, &mut crate::host::NullHost)
            .expect("not the master");
        let mut trees = vec![lt];
        cascade_removed(&mut trees, &freed);

        let lt = &trees[0];
        assert_eq!(mirrors_of(lt, a), 0);
        assert_eq!(mirrors_of(lt, b), 0, "direct link to B is gone too");
        assert_eq!(lt.active(), None);
    }

    #[test]
    fn conversion_retags_all_mirrors_and_flattens_them() {
        let mut t = CollectionTree::new("Master Collection");
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let _b = t.add(Some(a), NodeKind::Normal, Some("B"));
        let mut lt = LayerTree::new();
        let _ = lt.link(&t, t.master());
        let _ = lt.link(&t, a);

        let mut trees = vec![lt];
        convert_to_group_links(&mut trees, a);

        let lt = &trees[0];
        let nested = &lt.roots()[0].children()[0];
        let direct = &lt.roots()[1];
        for mirror in [nested, direct] {
            assert_eq!(mirror.kind(), NodeKind::GroupRef);
            assert!(mirror.children().is_empty());
        }
    }
}
