// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-based collection tree storage with allocation, topology, naming,
//! membership, and deep-copy operations.
//!
//! Mutating operations are crate-private: callers go through
//! [`Hierarchy`](crate::hierarchy::Hierarchy), which pairs every structural
//! change with the matching layer-tree synchronization before returning.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::id::{GroupId, INVALID, NodeId, ObjectId};
use super::traverse::{Children, Members, Nodes};
use crate::host::UsageHost;

/// Maximum length of a node name, in bytes.
///
/// Longer names are truncated (on a `char` boundary) before uniquing.
pub const MAX_NAME: usize = 64;

/// Name given to nodes created without an explicit name, and the fallback
/// base for empty names.
pub const DEFAULT_NAME: &str = "Collection";

/// What a collection node is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An ordinary grouping node.
    #[default]
    Normal,
    /// An empty proxy referencing a reusable [`Group`](crate::group::Group);
    /// carries the group's id in the node's group binding.
    GroupRef,
    /// A node inside a group's private subtree.
    GroupInternal,
}

/// Payload of one node slot.
///
/// Unlike the member and filter lists, `children` holds slot indices: child
/// nodes are exclusively owned by the tree and live in their own slots.
#[derive(Clone, Debug, Default)]
pub(crate) struct Slot {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) group: Option<GroupId>,
    pub(crate) members: Vec<ObjectId>,
    pub(crate) filtered: Vec<ObjectId>,
    pub(crate) children: Vec<u32>,
    pub(crate) parent: u32,
}

/// Arena storage for one owner's collection tree.
///
/// Nodes are addressed by [`NodeId`] handles. Removed nodes are recycled via
/// a free list, and generation counters prevent stale handle access. The
/// slot created at construction is the *master* node: it is never removed,
/// never moved, and anchors the name-uniqueness scope.
#[derive(Clone, Debug)]
pub struct CollectionTree {
    pub(crate) slots: Vec<Slot>,
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) master: u32,
}

impl CollectionTree {
    /// Creates a tree containing only a master node with the given name.
    #[must_use]
    pub(crate) fn new(master_name: &str) -> Self {
        let master = Slot {
            name: master_name.to_string(),
            ..Slot::default()
        };
        Self {
            slots: alloc::vec![Slot {
                parent: INVALID,
                ..master
            }],
            generation: alloc::vec![0],
            free_list: Vec::new(),
            master: 0,
        }
    }

    // -- Handles --

    /// Returns the master node's handle.
    #[must_use]
    pub fn master(&self) -> NodeId {
        self.id_at(self.master)
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx as usize) < self.slots.len()
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            (id.idx as usize) < self.slots.len()
                && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if (id.idx as usize) < self.slots.len() {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    // -- Read API --

    /// Returns the node's name.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.validate(id);
        &self.slots[id.idx as usize].name
    }

    /// Returns the node's kind.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.slots[id.idx as usize].kind
    }

    /// Returns the group a [`GroupRef`](NodeKind::GroupRef) node proxies.
    #[must_use]
    pub fn group(&self, id: NodeId) -> Option<GroupId> {
        self.validate(id);
        self.slots[id.idx as usize].group
    }

    /// Returns the node's directly owned member references, in order.
    #[must_use]
    pub fn members(&self, id: NodeId) -> &[ObjectId] {
        self.validate(id);
        &self.slots[id.idx as usize].members
    }

    /// Returns the node's derived/filtered member references, in order.
    ///
    /// These are an evaluation collaborator's cache: the tree stores, copies,
    /// and frees the list but never edits it on member removal.
    #[must_use]
    pub fn filtered(&self, id: NodeId) -> &[ObjectId] {
        self.validate(id);
        &self.slots[id.idx as usize].filtered
    }

    /// Returns whether `object` is a direct member of `id`.
    #[must_use]
    pub fn has_member(&self, id: NodeId, object: ObjectId) -> bool {
        self.validate(id);
        self.slots[id.idx as usize].members.contains(&object)
    }

    /// Returns the parent of a node, or `None` for the master.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.slots[id.idx as usize].parent;
        if p == INVALID { None } else { Some(self.id_at(p)) }
    }

    /// Returns an iterator over the direct children of a node, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, id.idx)
    }

    /// Returns a lazy pre-order iterator over every node in the tree,
    /// starting at the master.
    #[must_use]
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self, self.master)
    }

    /// Returns a lazy pre-order iterator over `root` and its descendants.
    #[must_use]
    pub fn nodes_under(&self, root: NodeId) -> Nodes<'_> {
        self.validate(root);
        Nodes::new(self, root.idx)
    }

    /// Returns an iterator over every distinct member object in the tree, in
    /// first-encounter order (pre-order over nodes, list order within one).
    ///
    /// An object linked under several nodes is yielded exactly once.
    #[must_use]
    pub fn members_all(&self) -> Members<'_> {
        Members::new(self.nodes())
    }

    /// Like [`members_all`](Self::members_all), restricted to the subtree
    /// rooted at `root`.
    #[must_use]
    pub fn members_under(&self, root: NodeId) -> Members<'_> {
        Members::new(self.nodes_under(root))
    }

    /// Returns whether `node` is a proper descendant of `of`.
    #[must_use]
    pub fn is_descendant(&self, node: NodeId, of: NodeId) -> bool {
        self.validate(node);
        self.validate(of);
        let mut p = self.slots[node.idx as usize].parent;
        while p != INVALID {
            if p == of.idx {
                return true;
            }
            p = self.slots[p as usize].parent;
        }
        false
    }

    // -- Allocation --

    fn alloc_slot(&mut self) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was already bumped on free.
            self.slots[idx as usize] = Slot {
                parent: INVALID,
                ..Slot::default()
            };
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).expect("collection tree slot overflow");
            self.slots.push(Slot {
                parent: INVALID,
                ..Slot::default()
            });
            self.generation.push(0);
            idx
        }
    }

    // -- Topology mutation (crate-private, driven by `Hierarchy`) --

    /// Creates a node under `parent` (or the master), with a unique name.
    pub(crate) fn add(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        name: Option<&str>,
    ) -> NodeId {
        if let Some(p) = parent {
            self.validate(p);
        }
        let p = parent.map_or(self.master, |p| p.idx);

        let idx = self.alloc_slot();
        self.slots[idx as usize].kind = kind;
        self.slots[idx as usize].parent = p;
        self.slots[p as usize].children.push(idx);

        let id = self.id_at(idx);
        self.rename(id, name.unwrap_or(DEFAULT_NAME));
        id
    }

    /// Unlinks `idx` from its parent's child list.
    fn detach(&mut self, idx: u32) {
        let p = self.slots[idx as usize].parent;
        assert!(p != INVALID, "node has no parent");
        let pos = self.slots[p as usize]
            .children
            .iter()
            .position(|&c| c == idx);
        // A missing entry means the tree was mutated behind the API's back.
        let pos = pos.expect("parent's child list does not contain the node");
        self.slots[p as usize].children.remove(pos);
        self.slots[idx as usize].parent = INVALID;
    }

    /// Releases the contents of `idx`: member usage counts, both member
    /// lists, and the whole child subtree. The slot itself stays allocated.
    fn free_contents(
        &mut self,
        idx: u32,
        counts_usage: bool,
        usage: &mut dyn UsageHost,
        freed: &mut Vec<NodeId>,
    ) {
        if counts_usage {
            for i in 0..self.slots[idx as usize].members.len() {
                usage.decref_usage(self.slots[idx as usize].members[i]);
            }
            for i in 0..self.slots[idx as usize].filtered.len() {
                usage.decref_usage(self.slots[idx as usize].filtered[i]);
            }
        }
        self.slots[idx as usize].members.clear();
        self.slots[idx as usize].filtered.clear();
        self.slots[idx as usize].group = None;

        let children = core::mem::take(&mut self.slots[idx as usize].children);
        for c in children {
            self.free_node(c, counts_usage, usage, freed);
        }
    }

    /// Releases `idx` entirely and recycles its slot.
    fn free_node(
        &mut self,
        idx: u32,
        counts_usage: bool,
        usage: &mut dyn UsageHost,
        freed: &mut Vec<NodeId>,
    ) {
        freed.push(self.id_at(idx));
        self.free_contents(idx, counts_usage, usage, freed);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.slots[idx as usize].name.clear();
        self.slots[idx as usize].parent = INVALID;
        self.free_list.push(idx);
    }

    /// Removes `node` and its subtree. Fails on the master.
    ///
    /// Returns the handles of every freed node (pre-order) so the caller can
    /// cascade the removal into the attached layer trees.
    pub(crate) fn remove(
        &mut self,
        node: NodeId,
        counts_usage: bool,
        usage: &mut dyn UsageHost,
    ) -> Option<Vec<NodeId>> {
        self.validate(node);
        if node.idx == self.master {
            return None;
        }
        self.detach(node.idx);
        let mut freed = Vec::new();
        self.free_node(node.idx, counts_usage, usage, &mut freed);
        Some(freed)
    }

    /// Releases the master's contents without touching layer trees.
    ///
    /// Only for tearing down the whole owner (or group-conversion cleanup),
    /// where the layer trees are discarded or rebuilt wholesale anyway.
    pub(crate) fn clear_master(
        &mut self,
        counts_usage: bool,
        usage: &mut dyn UsageHost,
    ) -> Vec<NodeId> {
        let mut freed = Vec::new();
        self.free_contents(self.master, counts_usage, usage, &mut freed);
        freed
    }

    /// Releases the contents of `node` (members, filtered list, child
    /// subtree) while keeping the node itself alive. Used when a node is
    /// hollowed out into a group-reference proxy.
    pub(crate) fn clear_node(
        &mut self,
        node: NodeId,
        counts_usage: bool,
        usage: &mut dyn UsageHost,
    ) -> Vec<NodeId> {
        self.validate(node);
        let mut freed = Vec::new();
        self.free_contents(node.idx, counts_usage, usage, &mut freed);
        freed
    }

    // -- Naming --

    /// Renames `node`, truncating to [`MAX_NAME`] and resolving collisions
    /// with a deterministic `.NNN` suffix.
    ///
    /// Uniqueness is scoped to the whole tree below the master (the node
    /// itself excluded), matching sibling-and-descendant uniqueness.
    pub(crate) fn rename(&mut self, node: NodeId, name: &str) {
        self.validate(node);
        let mut name = truncate_name(if name.is_empty() { DEFAULT_NAME } else { name });

        if self.name_in_use(&name, node.idx) {
            let base = strip_numeric_suffix(&name);
            for i in 1u32.. {
                let candidate = numbered_name(base, i);
                if !self.name_in_use(&candidate, node.idx) {
                    name = candidate;
                    break;
                }
            }
        }
        self.slots[node.idx as usize].name = name;
    }

    /// Returns whether any node below the master other than `exclude` is
    /// named `name`. Case-sensitive.
    fn name_in_use(&self, name: &str, exclude: u32) -> bool {
        let mut stack: Vec<u32> = self.slots[self.master as usize].children.clone();
        while let Some(idx) = stack.pop() {
            if idx != exclude && self.slots[idx as usize].name == name {
                return true;
            }
            stack.extend_from_slice(&self.slots[idx as usize].children);
        }
        false
    }

    // -- Membership (crate-private, driven by `Hierarchy`) --

    /// Appends `object` to the node's member list. No-op returning `false`
    /// if the object is already a member.
    pub(crate) fn add_member(
        &mut self,
        node: NodeId,
        object: ObjectId,
        counts_usage: bool,
        usage: &mut dyn UsageHost,
    ) -> bool {
        self.validate(node);
        if self.slots[node.idx as usize].members.contains(&object) {
            return false;
        }
        self.slots[node.idx as usize].members.push(object);
        if counts_usage {
            usage.incref_usage(object);
        }
        true
    }

    /// Detaches `object` from the node's member list. Returns `false` if it
    /// was not a member.
    pub(crate) fn remove_member(
        &mut self,
        node: NodeId,
        object: ObjectId,
        release: bool,
        counts_usage: bool,
        usage: &mut dyn UsageHost,
    ) -> bool {
        self.validate(node);
        let members = &mut self.slots[node.idx as usize].members;
        let Some(pos) = members.iter().position(|&m| m == object) else {
            return false;
        };
        members.remove(pos);

        if release {
            usage.release_if_unused(object);
        } else if counts_usage {
            usage.decref_usage(object);
        }
        true
    }

    /// Replaces the node's derived/filtered list with the evaluation
    /// collaborator's latest result. With a usage-counting owner, counts
    /// move from the replaced entries to the new ones.
    pub(crate) fn set_filtered(
        &mut self,
        node: NodeId,
        entries: Vec<ObjectId>,
        counts_usage: bool,
        usage: &mut dyn UsageHost,
    ) {
        self.validate(node);
        if counts_usage {
            for &e in &entries {
                usage.incref_usage(e);
            }
            for i in 0..self.slots[node.idx as usize].filtered.len() {
                usage.decref_usage(self.slots[node.idx as usize].filtered[i]);
            }
        }
        self.slots[node.idx as usize].filtered = entries;
    }

    // -- Structural moves (crate-private, driven by `Hierarchy`) --
    //
    // Each returns the (old parent, new parent) pair on success so the
    // caller can resync the affected layer regions, or `None` when the
    // operation is rejected (master endpoint, no-op position, would create
    // a cycle). Rejection leaves the tree untouched.

    /// Would moving `src` relative to `dst` create a cycle?
    fn move_makes_cycle(&self, dst: NodeId, src: NodeId) -> bool {
        dst.idx == src.idx || self.is_descendant(dst, src)
    }

    pub(crate) fn move_above(&mut self, dst: NodeId, src: NodeId) -> Option<(NodeId, NodeId)> {
        self.validate(dst);
        self.validate(src);
        if src.idx == self.master || dst.idx == self.master {
            return None;
        }
        if self.move_makes_cycle(dst, src) {
            return None;
        }

        let dst_parent = self.slots[dst.idx as usize].parent;
        let dst_pos = self.child_position(dst_parent, dst.idx);
        // Already directly above the destination.
        if dst_pos > 0 && self.slots[dst_parent as usize].children[dst_pos - 1] == src.idx {
            return None;
        }

        let old_parent = self.id_at(self.slots[src.idx as usize].parent);
        self.detach(src.idx);
        let pos = self.child_position(dst_parent, dst.idx);
        self.slots[dst_parent as usize].children.insert(pos, src.idx);
        self.slots[src.idx as usize].parent = dst_parent;
        Some((old_parent, self.id_at(dst_parent)))
    }

    pub(crate) fn move_below(&mut self, dst: NodeId, src: NodeId) -> Option<(NodeId, NodeId)> {
        self.validate(dst);
        self.validate(src);
        if src.idx == self.master || dst.idx == self.master {
            return None;
        }
        if self.move_makes_cycle(dst, src) {
            return None;
        }

        let dst_parent = self.slots[dst.idx as usize].parent;
        let dst_pos = self.child_position(dst_parent, dst.idx);
        // Already directly below the destination.
        if self.slots[dst_parent as usize].children.get(dst_pos + 1) == Some(&src.idx) {
            return None;
        }

        let old_parent = self.id_at(self.slots[src.idx as usize].parent);
        self.detach(src.idx);
        let pos = self.child_position(dst_parent, dst.idx);
        self.slots[dst_parent as usize]
            .children
            .insert(pos + 1, src.idx);
        self.slots[src.idx as usize].parent = dst_parent;
        Some((old_parent, self.id_at(dst_parent)))
    }

    pub(crate) fn move_into(&mut self, dst: NodeId, src: NodeId) -> Option<(NodeId, NodeId)> {
        self.validate(dst);
        self.validate(src);
        // The destination may be the master (a move to top level); the
        // source may not.
        if src.idx == self.master {
            return None;
        }
        if self.move_makes_cycle(dst, src) {
            return None;
        }
        // Already the last child of the destination.
        if self.slots[dst.idx as usize].children.last() == Some(&src.idx) {
            return None;
        }

        let old_parent = self.id_at(self.slots[src.idx as usize].parent);
        self.detach(src.idx);
        self.slots[dst.idx as usize].children.push(src.idx);
        self.slots[src.idx as usize].parent = dst.idx;
        Some((old_parent, dst))
    }

    fn child_position(&self, parent: u32, child: u32) -> usize {
        self.slots[parent as usize]
            .children
            .iter()
            .position(|&c| c == child)
            .expect("parent's child list does not contain the node")
    }

    // -- Deep copy --

    /// Copies `src`'s member lists, filtered lists, and full child subtree
    /// from `src_tree` into `dst` in this tree. Node structure is duplicated;
    /// objects are not. With a usage host supplied, every copied owned-object
    /// reference gains a usage count; with `None` the copy is
    /// ownership-transfer free.
    pub(crate) fn copy_data_from(
        &mut self,
        dst: NodeId,
        src_tree: &Self,
        src: NodeId,
        mut usage: Option<&mut (dyn UsageHost + '_)>,
    ) {
        self.validate(dst);
        src_tree.validate(src);
        self.copy_rec(dst.idx, src_tree, src.idx, usage.as_deref_mut());
    }

    fn copy_rec(
        &mut self,
        dst: u32,
        src_tree: &Self,
        src: u32,
        mut usage: Option<&mut (dyn UsageHost + '_)>,
    ) {
        let src_slot = &src_tree.slots[src as usize];
        for &m in &src_slot.members {
            self.slots[dst as usize].members.push(m);
            if let Some(u) = usage.as_deref_mut() {
                u.incref_usage(m);
            }
        }
        for &m in &src_slot.filtered {
            self.slots[dst as usize].filtered.push(m);
            if let Some(u) = usage.as_deref_mut() {
                u.incref_usage(m);
            }
        }

        for i in 0..src_tree.slots[src as usize].children.len() {
            let src_child = src_tree.slots[src as usize].children[i];
            let child = self.alloc_slot();
            {
                let src_slot = &src_tree.slots[src_child as usize];
                let slot = &mut self.slots[child as usize];
                slot.name = src_slot.name.clone();
                slot.kind = src_slot.kind;
                slot.group = src_slot.group;
                slot.parent = dst;
            }
            self.slots[dst as usize].children.push(child);
            self.copy_rec(child, src_tree, src_child, usage.as_deref_mut());
        }
    }

    /// Sets the kind of `root` and every descendant. Nodes already bound to
    /// a group keep their reference kind; a copied proxy stays a proxy.
    pub(crate) fn retag_subtree(&mut self, root: NodeId, kind: NodeKind) {
        self.validate(root);
        let mut stack = alloc::vec![root.idx];
        while let Some(idx) = stack.pop() {
            if self.slots[idx as usize].group.is_none() {
                self.slots[idx as usize].kind = kind;
            }
            stack.extend_from_slice(&self.slots[idx as usize].children);
        }
    }

    /// Binds a [`GroupRef`](NodeKind::GroupRef) node to its group.
    pub(crate) fn bind_group(&mut self, node: NodeId, group: GroupId) {
        self.validate(node);
        assert!(
            self.slots[node.idx as usize].kind == NodeKind::GroupRef,
            "group binding requires a GroupRef node"
        );
        self.slots[node.idx as usize].group = Some(group);
    }

    /// Structural equality of two subtrees: names, kinds, member and
    /// filtered lists, and child ordering. Ignores slot identity.
    #[cfg(test)]
    pub(crate) fn subtree_eq(&self, node: NodeId, other: &Self, other_node: NodeId) -> bool {
        let a = &self.slots[node.idx as usize];
        let b = &other.slots[other_node.idx as usize];
        a.name == b.name
            && a.kind == b.kind
            && a.members == b.members
            && a.filtered == b.filtered
            && a.children.len() == b.children.len()
            && a.children.iter().zip(&b.children).all(|(&ca, &cb)| {
                self.subtree_eq(self.id_at(ca), other, other.id_at(cb))
            })
    }
}

/// Truncates `name` to [`MAX_NAME`] bytes on a `char` boundary.
fn truncate_name(name: &str) -> String {
    if name.len() <= MAX_NAME {
        return name.to_string();
    }
    let mut end = MAX_NAME;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// Strips a trailing `.NNN` numeric suffix, if any, so repeated renames do
/// not stack suffixes.
fn strip_numeric_suffix(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, digits))
            if !base.is_empty() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}

/// Formats `base.NNN`, shortening `base` as needed to fit [`MAX_NAME`].
fn numbered_name(base: &str, i: u32) -> String {
    let suffix = format!(".{i:03}");
    let room = MAX_NAME - suffix.len();
    let mut end = base.len().min(room);
    while !base.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &base[..end], suffix)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::host::NullHost;

    fn tree() -> CollectionTree {
        CollectionTree::new("Master Collection")
    }

    #[test]
    fn master_exists_and_is_protected() {
        let mut t = tree();
        let master = t.master();
        assert!(t.is_alive(master));
        assert_eq!(t.name(master), "Master Collection");
        assert!(
            t.remove(master, true, &mut NullHost).is_none(),
            "master must not be removable"
        );
        assert!(t.is_alive(master));
    }

    #[test]
    fn add_defaults_and_attaches_under_master() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, None);
        assert_eq!(t.name(a), "Collection");
        assert_eq!(t.parent(a), Some(t.master()));
        let kids: Vec<_> = t.children(t.master()).collect();
        assert_eq!(kids, alloc::vec![a]);
    }

    #[test]
    fn colliding_names_get_deterministic_suffixes() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("Rocks"));
        let b = t.add(None, NodeKind::Normal, Some("Rocks"));
        let c = t.add(None, NodeKind::Normal, Some("Rocks"));
        assert_eq!(t.name(a), "Rocks");
        assert_eq!(t.name(b), "Rocks.001");
        assert_eq!(t.name(c), "Rocks.002");
    }

    #[test]
    fn uniqueness_spans_the_whole_tree_not_just_siblings() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("Props"));
        let nested = t.add(Some(a), NodeKind::Normal, Some("Props"));
        assert_eq!(t.name(nested), "Props.001");
    }

    #[test]
    fn rename_strips_existing_suffix_before_numbering() {
        let mut t = tree();
        let _a = t.add(None, NodeKind::Normal, Some("Set.001"));
        let b = t.add(None, NodeKind::Normal, Some("Set.001"));
        assert_eq!(t.name(b), "Set.002");
    }

    #[test]
    fn rename_truncates_to_name_capacity() {
        let mut t = tree();
        let long: alloc::string::String = core::iter::repeat_n('x', 200).collect();
        let a = t.add(None, NodeKind::Normal, Some(&long));
        assert_eq!(t.name(a).len(), MAX_NAME);
    }

    #[test]
    fn empty_name_falls_back_to_default() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some(""));
        assert_eq!(t.name(a), DEFAULT_NAME);
    }

    #[test]
    fn add_member_is_idempotent() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, None);
        let ob = ObjectId(7);
        assert!(t.add_member(a, ob, false, &mut NullHost));
        assert!(!t.add_member(a, ob, false, &mut NullHost), "duplicate add must be rejected");
        assert_eq!(t.members(a).len(), 1);
    }

    #[test]
    fn remove_member_absent_fails() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, None);
        assert!(!t.remove_member(a, ObjectId(1), false, false, &mut NullHost));
    }

    #[test]
    fn remove_recycles_slots_and_stales_handles() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, None);
        let freed = t.remove(a, true, &mut NullHost).expect("removable");
        assert_eq!(freed, alloc::vec![a]);
        assert!(!t.is_alive(a));

        let b = t.add(None, NodeKind::Normal, None);
        assert_eq!(a.index(), b.index(), "slot should be recycled");
        assert_ne!(a.generation(), b.generation());
    }

    #[test]
    fn remove_reports_every_freed_descendant() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(Some(a), NodeKind::Normal, Some("B"));
        let c = t.add(Some(b), NodeKind::Normal, Some("C"));
        let freed = t.remove(a, true, &mut NullHost).expect("removable");
        assert_eq!(freed, alloc::vec![a, b, c]);
        assert!(!t.is_alive(b) && !t.is_alive(c));
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn stale_handle_panics_on_access() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, None);
        t.remove(a, true, &mut NullHost);
        let _ = t.name(a);
    }

    #[test]
    fn move_into_descendant_is_rejected_and_harmless() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(Some(a), NodeKind::Normal, Some("B"));
        let before: Vec<_> = t.nodes().collect();
        assert!(t.move_into(b, a).is_none(), "cycle must be rejected");
        assert!(t.move_into(a, a).is_none(), "self-move must be rejected");
        let after: Vec<_> = t.nodes().collect();
        assert_eq!(before, after, "rejected move must leave the tree unchanged");
    }

    #[test]
    fn move_above_and_below_reorder_siblings() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(None, NodeKind::Normal, Some("B"));
        let c = t.add(None, NodeKind::Normal, Some("C"));

        assert!(t.move_above(a, c).is_some());
        let kids: Vec<_> = t.children(t.master()).collect();
        assert_eq!(kids, alloc::vec![c, a, b]);

        assert!(t.move_below(b, c).is_some());
        let kids: Vec<_> = t.children(t.master()).collect();
        assert_eq!(kids, alloc::vec![a, b, c]);
    }

    #[test]
    fn move_in_place_is_a_rejected_noop() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(None, NodeKind::Normal, Some("B"));
        // `a` is already directly above `b`, and `b` already last in master.
        assert!(t.move_above(b, a).is_none());
        assert!(t.move_below(a, b).is_none());
        assert!(t.move_into(t.master(), b).is_none());
    }

    #[test]
    fn move_rejects_master_endpoints() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let m = t.master();
        assert!(t.move_above(a, m).is_none());
        assert!(t.move_below(m, a).is_none());
        assert!(t.move_into(a, m).is_none());
    }

    #[test]
    fn move_into_master_relocates_to_top_level() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(Some(a), NodeKind::Normal, Some("B"));
        assert!(t.move_into(t.master(), b).is_some());
        assert_eq!(t.parent(b), Some(t.master()));
        assert_eq!(t.children(a).count(), 0);
    }

    #[test]
    fn copy_round_trips_structurally() {
        let mut src = tree();
        let a = src.add(None, NodeKind::Normal, Some("A"));
        let b = src.add(Some(a), NodeKind::Normal, Some("B"));
        src.add_member(a, ObjectId(1), false, &mut NullHost);
        src.add_member(b, ObjectId(2), false, &mut NullHost);
        src.add_member(b, ObjectId(1), false, &mut NullHost);

        let mut dst = CollectionTree::new("Group Master");
        let dst_root = dst.add(None, NodeKind::Normal, Some("A"));
        dst.copy_data_from(dst_root, &src, a, None);

        assert!(
            dst.subtree_eq(dst_root, &src, a),
            "copied subtree must match the source structurally"
        );
    }

    #[test]
    fn copy_with_accounting_counts_every_copied_reference() {
        #[derive(Default)]
        struct Count {
            increfs: Vec<ObjectId>,
        }
        impl UsageHost for Count {
            fn incref_usage(&mut self, object: ObjectId) {
                self.increfs.push(object);
            }
            fn decref_usage(&mut self, _object: ObjectId) {}
            fn release_if_unused(&mut self, _object: ObjectId) {}
        }

        let mut src = tree();
        let a = src.add(None, NodeKind::Normal, Some("A"));
        let b = src.add(Some(a), NodeKind::Normal, Some("B"));
        src.add_member(a, ObjectId(1), false, &mut NullHost);
        src.set_filtered(a, alloc::vec![ObjectId(3)], false, &mut NullHost);
        src.add_member(b, ObjectId(2), false, &mut NullHost);

        let mut dst = tree();
        let dst_root = dst.add(None, NodeKind::Normal, Some("A"));
        let mut host = Count::default();
        dst.copy_data_from(dst_root, &src, a, Some(&mut host));

        // One count per copied reference: members and filtered entries,
        // node by node in copy order.
        assert_eq!(
            host.increfs,
            alloc::vec![ObjectId(1), ObjectId(3), ObjectId(2)]
        );
        assert_eq!(dst.filtered(dst_root), src.filtered(a));
    }

    #[test]
    fn nodes_iterates_pre_order() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let a1 = t.add(Some(a), NodeKind::Normal, Some("A1"));
        let b = t.add(None, NodeKind::Normal, Some("B"));
        let order: Vec<_> = t.nodes().collect();
        assert_eq!(order, alloc::vec![t.master(), a, a1, b]);
    }

    #[test]
    fn members_deduplicate_across_nodes() {
        let mut t = tree();
        let a = t.add(None, NodeKind::Normal, Some("A"));
        let b = t.add(None, NodeKind::Normal, Some("B"));
        let (o1, o2) = (ObjectId(1), ObjectId(2));
        t.add_member(a, o1, false, &mut NullHost);
        t.add_member(b, o1, false, &mut NullHost);
        t.add_member(b, o2, false, &mut NullHost);

        let seen: Vec<_> = t.members_all().collect();
        assert_eq!(seen, alloc::vec![o1, o2], "O1 once (from A), then O2");
    }

    #[test]
    fn members_counts_distinct_objects_not_links() {
        let mut t = tree();
        let x = ObjectId(42);
        for name in ["A", "B", "C"] {
            let n = t.add(None, NodeKind::Normal, Some(name));
            t.add_member(n, x, false, &mut NullHost);
        }
        assert_eq!(t.members_all().count(), 1);
    }
}
