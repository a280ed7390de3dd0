// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutating entry points: a collection tree plus its layer trees.
//!
//! [`Hierarchy`] pairs one canonical [`CollectionTree`] with any number of
//! [`LayerTree`]s and keeps them synchronized through every structural edit.
//! All mutation goes through here; the tree types only expose reads, so the
//! mirror invariants cannot be broken from outside.

use alloc::vec::Vec;

use crate::collection::{CollectionTree, NodeId, NodeKind, ObjectId};
use crate::host::{SimulationHost, UsageHost};
use crate::layer::{self, LayerTree};
use crate::trace::{
    MemberLinkedEvent, MemberUnlinkedEvent, NodeAddedEvent, NodeRemovedEvent, ResyncEvent, Tracer,
};

/// A collection tree with its synchronized per-viewer layer trees.
///
/// Two ownership profiles exist. A *document* hierarchy counts object usage:
/// member links participate in the host's liveness accounting. A *group*
/// hierarchy (built by [`create_group`]) holds its members weakly and does
/// no accounting.
///
/// [`create_group`]: Hierarchy::create_group
#[derive(Debug)]
pub struct Hierarchy {
    pub(crate) counts_usage: bool,
    pub(crate) collections: CollectionTree,
    pub(crate) layer_trees: Vec<LayerTree>,
    pub(crate) tracer: Tracer,
}

impl Hierarchy {
    /// Creates a document hierarchy: usage-counted members, one layer tree
    /// with the master collection linked.
    #[must_use]
    pub fn new_document() -> Self {
        let collections = CollectionTree::new("Master Collection");
        let mut tree = LayerTree::new();
        let _ = tree.link(&collections, collections.master());
        Self {
            counts_usage: true,
            collections,
            layer_trees: alloc::vec![tree],
            tracer: Tracer::disabled(),
        }
    }

    /// Creates an empty group-owned hierarchy: weak members, one layer tree
    /// with nothing linked yet.
    pub(crate) fn new_group_owner() -> Self {
        Self {
            counts_usage: false,
            collections: CollectionTree::new("Master Collection"),
            layer_trees: alloc::vec![LayerTree::new()],
            tracer: Tracer::disabled(),
        }
    }

    /// Attaches a tracer. Structural edits report to it from now on.
    pub fn set_tracer(&mut self, tracer: Tracer) {
        self.tracer = tracer;
    }

    /// Whether member links participate in the host's usage accounting.
    #[must_use]
    pub fn counts_usage(&self) -> bool {
        self.counts_usage
    }

    /// The canonical collection tree (read access).
    #[must_use]
    pub fn collections(&self) -> &CollectionTree {
        &self.collections
    }

    /// The master collection's handle.
    #[must_use]
    pub fn master(&self) -> NodeId {
        self.collections.master()
    }

    /// The layer trees, in creation order.
    #[must_use]
    pub fn layer_trees(&self) -> &[LayerTree] {
        &self.layer_trees
    }

    /// Mutable access to one layer tree, for viewer-local state: flags, the
    /// active marker, flag evaluation.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn layer_tree_mut(&mut self, index: usize) -> &mut LayerTree {
        &mut self.layer_trees[index]
    }

    /// Adds a new layer tree with the master collection linked, returning
    /// its index.
    pub fn add_layer_tree(&mut self) -> usize {
        let mut tree = LayerTree::new();
        let _ = tree.link(&self.collections, self.collections.master());
        self.layer_trees.push(tree);
        self.layer_trees.len() - 1
    }

    /// Links `node` at the top level of layer tree `tree`, mirroring its
    /// subtree with default flags. Returns the link's position, or `None` if
    /// the collection is already linked at that tree's top level.
    ///
    /// # Panics
    ///
    /// Panics on a stale `node` or an out-of-range `tree`.
    pub fn link_collection(&mut self, tree: usize, node: NodeId) -> Option<usize> {
        self.collections.validate(node);
        self.layer_trees[tree].link(&self.collections, node)
    }

    /// Removes the top-level link at `index` from layer tree `tree`.
    ///
    /// # Panics
    ///
    /// Panics if `tree` is out of range.
    pub fn unlink_collection(&mut self, tree: usize, index: usize) -> bool {
        self.layer_trees[tree].unlink(index)
    }

    // -- Node lifecycle --

    /// Creates a collection node under `parent` (or the master), mirrors it
    /// under every layer mirror of the parent, and returns its handle.
    ///
    /// `name` defaults and deduplicates per [`CollectionTree`] naming rules.
    ///
    /// # Panics
    ///
    /// Panics on a stale `parent`.
    pub fn add(&mut self, parent: Option<NodeId>, kind: NodeKind, name: Option<&str>) -> NodeId {
        let node = self.collections.add(parent, kind, name);
        let parent = parent.unwrap_or_else(|| self.collections.master());
        layer::mirror_new_node(&mut self.layer_trees, &self.collections, parent, node);
        self.tracer.node_added(&NodeAddedEvent { node, parent });
        node
    }

    /// Removes `node` and its whole subtree, cascading into every layer
    /// tree. Returns `false` for the master, which cannot be removed.
    ///
    /// Handles to removed nodes become stale. Every layer tree's active
    /// marker is reset.
    ///
    /// # Panics
    ///
    /// Panics on a stale `node`.
    pub fn remove(&mut self, node: NodeId, usage: &mut dyn UsageHost) -> bool {
        let Some(freed) = self.collections.remove(node, self.counts_usage, usage) else {
            return false;
        };
        layer::cascade_removed(&mut self.layer_trees, &freed);
        for node in freed {
            self.tracer.node_removed(&NodeRemovedEvent { node });
        }
        true
    }

    /// Renames `node`, truncating and deduplicating per [`CollectionTree`]
    /// naming rules.
    ///
    /// # Panics
    ///
    /// Panics on a stale `node`.
    pub fn rename(&mut self, node: NodeId, name: &str) {
        self.collections.rename(node, name);
    }

    /// Releases the master's contents: every other node is freed, member
    /// usage counts are returned, and the layer mirrors of the freed region
    /// are pruned. For tearing the owner down.
    pub fn clear_master(&mut self, usage: &mut dyn UsageHost) {
        let freed = self.collections.clear_master(self.counts_usage, usage);
        layer::cascade_removed(&mut self.layer_trees, &freed);
        for node in freed {
            self.tracer.node_removed(&NodeRemovedEvent { node });
        }
    }

    // -- Membership --

    /// Links `object` into `node`'s member list. Returns `false` (with no
    /// notification) if it is already a member.
    ///
    /// # Panics
    ///
    /// Panics on a stale `node`.
    pub fn add_member(&mut self, node: NodeId, object: ObjectId, usage: &mut dyn UsageHost) -> bool {
        if !self
            .collections
            .add_member(node, object, self.counts_usage, usage)
        {
            return false;
        }
        for tree in &mut self.layer_trees {
            tree.on_member_linked(node, object);
        }
        self.tracer.member_linked(&MemberLinkedEvent { node, object });
        true
    }

    /// Links `dst_object` into every node that holds `src_object`.
    pub fn add_member_from(
        &mut self,
        src_object: ObjectId,
        dst_object: ObjectId,
        usage: &mut dyn UsageHost,
    ) {
        let holders: Vec<NodeId> = self
            .collections
            .nodes()
            .filter(|&n| self.collections.has_member(n, src_object))
            .collect();
        for node in holders {
            self.add_member(node, dst_object, usage);
        }
    }

    /// Unlinks `object` from `node`'s member list. Returns `false` (with no
    /// notification) if it was not a member.
    ///
    /// With `release` set, the host is asked to free the object outright if
    /// nothing else uses it, instead of the usual usage decrement.
    ///
    /// # Panics
    ///
    /// Panics on a stale `node`.
    pub fn remove_member(
        &mut self,
        node: NodeId,
        object: ObjectId,
        release: bool,
        usage: &mut dyn UsageHost,
    ) -> bool {
        if !self
            .collections
            .remove_member(node, object, release, self.counts_usage, usage)
        {
            return false;
        }
        for tree in &mut self.layer_trees {
            tree.on_member_unlinked(node, object);
        }
        self.tracer
            .member_unlinked(&MemberUnlinkedEvent { node, object });
        true
    }

    /// Moves `object`'s membership from `src` to `dst`: a link into `dst`
    /// followed by an unlink from `src`. Each half is a no-op if already
    /// satisfied, so the object never transiently disappears.
    ///
    /// # Panics
    ///
    /// Panics on a stale `dst` or `src`.
    pub fn move_member(
        &mut self,
        dst: NodeId,
        src: NodeId,
        object: ObjectId,
        usage: &mut dyn UsageHost,
    ) {
        self.add_member(dst, object, usage);
        self.remove_member(src, object, false, usage);
    }

    /// Unlinks `object` from every node of the hierarchy. Returns whether
    /// any removal occurred.
    ///
    /// For a document owner the simulation host is told to drop its
    /// back-reference first, before any membership changes.
    pub fn remove_member_everywhere(
        &mut self,
        object: ObjectId,
        release: bool,
        usage: &mut dyn UsageHost,
        simulation: &mut dyn SimulationHost,
    ) -> bool {
        if self.counts_usage {
            simulation.detach_rigid_body(object);
        }
        let holders: Vec<NodeId> = self
            .collections
            .nodes()
            .filter(|&n| self.collections.has_member(n, object))
            .collect();
        let mut removed = false;
        for node in holders {
            removed |= self.remove_member(node, object, release, usage);
        }
        removed
    }

    /// Replaces `node`'s derived/filtered member list.
    ///
    /// The list's contents are the evaluation collaborator's concern; this
    /// core stores, copies, and frees them but never recomputes them. For a
    /// document owner the usage counts move from the replaced entries to
    /// the new ones.
    ///
    /// # Panics
    ///
    /// Panics on a stale `node`.
    pub fn set_filtered(
        &mut self,
        node: NodeId,
        entries: Vec<ObjectId>,
        usage: &mut dyn UsageHost,
    ) {
        self.collections
            .set_filtered(node, entries, self.counts_usage, usage);
    }

    // -- Structural moves --

    fn after_move(&mut self, regions: (NodeId, NodeId)) -> bool {
        let (old_parent, new_parent) = regions;
        layer::resync(&mut self.layer_trees, &self.collections, old_parent);
        self.tracer.resync(&ResyncEvent { root: old_parent });
        if new_parent != old_parent {
            layer::resync(&mut self.layer_trees, &self.collections, new_parent);
            self.tracer.resync(&ResyncEvent { root: new_parent });
        }
        true
    }

    /// Moves `src` to sit immediately before `dst` in `dst`'s parent's child
    /// list. Returns `false` when rejected: either endpoint is the master,
    /// the move would create a cycle, or `src` is already in position.
    ///
    /// # Panics
    ///
    /// Panics on a stale `dst` or `src`.
    pub fn move_above(&mut self, dst: NodeId, src: NodeId) -> bool {
        match self.collections.move_above(dst, src) {
            Some(regions) => self.after_move(regions),
            None => false,
        }
    }

    /// Moves `src` to sit immediately after `dst` in `dst`'s parent's child
    /// list. Rejections as for [`move_above`](Hierarchy::move_above).
    ///
    /// # Panics
    ///
    /// Panics on a stale `dst` or `src`.
    pub fn move_below(&mut self, dst: NodeId, src: NodeId) -> bool {
        match self.collections.move_below(dst, src) {
            Some(regions) => self.after_move(regions),
            None => false,
        }
    }

    /// Reparents `src` to be `dst`'s last child. The destination may be the
    /// master (a move to the top level); the source may not, and the move
    /// must not create a cycle or be a no-op.
    ///
    /// # Panics
    ///
    /// Panics on a stale `dst` or `src`.
    pub fn move_into(&mut self, dst: NodeId, src: NodeId) -> bool {
        match self.collections.move_into(dst, src) {
            Some(regions) => self.after_move(regions),
            None => false,
        }
    }
}
