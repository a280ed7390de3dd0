// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal: child, node, and distinct-member iterators.
//!
//! The node and member walks are lazy, single-pass, forward-only sequences
//! driven by an explicit traversal stack. Holding them borrows the tree, so
//! structural mutation during iteration is ruled out at compile time, and
//! the seen-set of the member walk is released when the iterator drops no
//! matter how early the caller stops.

use alloc::vec::Vec;

use hashbrown::HashSet;

use super::id::{NodeId, ObjectId};
use super::store::CollectionTree;

/// An iterator over the direct children of a node, in list order.
///
/// Created by [`CollectionTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a CollectionTree,
    parent: u32,
    cursor: usize,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a CollectionTree, parent: u32) -> Self {
        Self {
            tree,
            parent,
            cursor: 0,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = *self.tree.slots[self.parent as usize]
            .children
            .get(self.cursor)?;
        self.cursor += 1;
        Some(self.tree.id_at(idx))
    }
}

/// A pre-order iterator over a subtree: each node before its children,
/// children in list order.
///
/// Created by [`CollectionTree::nodes`] or [`CollectionTree::nodes_under`].
#[derive(Debug)]
pub struct Nodes<'a> {
    tree: &'a CollectionTree,
    stack: Vec<u32>,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(tree: &'a CollectionTree, root: u32) -> Self {
        Self {
            tree,
            stack: alloc::vec![root],
        }
    }
}

impl Iterator for Nodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.stack.pop()?;
        // Reversed so the first child is popped first.
        self.stack
            .extend(self.tree.slots[idx as usize].children.iter().rev());
        Some(self.tree.id_at(idx))
    }
}

/// An iterator over the distinct member objects of a subtree.
///
/// Wraps [`Nodes`]: for each node in pre-order, yields its members in list
/// order, skipping any object already yielded. The total count equals the
/// number of distinct reachable objects, not the number of link entries.
///
/// Created by [`CollectionTree::members_all`] or
/// [`CollectionTree::members_under`].
#[derive(Debug)]
pub struct Members<'a> {
    nodes: Nodes<'a>,
    current: Option<u32>,
    cursor: usize,
    seen: HashSet<ObjectId>,
}

impl<'a> Members<'a> {
    pub(crate) fn new(nodes: Nodes<'a>) -> Self {
        Self {
            nodes,
            current: None,
            cursor: 0,
            seen: HashSet::new(),
        }
    }
}

impl Iterator for Members<'_> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<ObjectId> {
        loop {
            if let Some(idx) = self.current {
                let members = &self.nodes.tree.slots[idx as usize].members;
                while let Some(&object) = members.get(self.cursor) {
                    self.cursor += 1;
                    if self.seen.insert(object) {
                        return Some(object);
                    }
                }
            }
            self.current = Some(self.nodes.next()?.idx);
            self.cursor = 0;
        }
    }
}
