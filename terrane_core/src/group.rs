// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Groups: reusable subtrees promoted out of a document.
//!
//! A group owns a private hierarchy whose nodes are tagged
//! [`GroupInternal`](NodeKind::GroupInternal) and whose members are held
//! weakly (no usage accounting). The document keeps a hollowed-out
//! [`GroupRef`](NodeKind::GroupRef) proxy node where the source subtree used
//! to be, bound to the group by id.

use alloc::string::{String, ToString};

use crate::collection::{GroupId, NodeId, NodeKind};
use crate::hierarchy::Hierarchy;
use crate::host::UsageHost;
use crate::layer;
use crate::trace::{GroupCreatedEvent, NodeRemovedEvent};

/// A reusable subtree with its own hierarchy, produced by
/// [`Hierarchy::create_group`].
///
/// The group's id is allocated by the host, which owns the group registry;
/// proxy nodes refer back to it through that id alone.
#[derive(Debug)]
pub struct Group {
    id: GroupId,
    name: String,
    hierarchy: Hierarchy,
}

impl Group {
    /// The host-allocated id proxy nodes are bound to.
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// The group's name, taken from the source node.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group's private hierarchy (weak members, one layer tree).
    #[must_use]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Mutable access to the group's hierarchy.
    #[must_use]
    pub fn hierarchy_mut(&mut self) -> &mut Hierarchy {
        &mut self.hierarchy
    }

    /// The content root: the single child of the group's master that carries
    /// the copied subtree.
    #[must_use]
    pub fn root(&self) -> NodeId {
        let collections = self.hierarchy.collections();
        collections
            .children(collections.master())
            .next()
            .expect("a group always has its content root")
    }
}

impl Hierarchy {
    /// Promotes the subtree at `src` into a new [`Group`], leaving a bound
    /// group-reference proxy in its place.
    ///
    /// `tree` names the layer tree whose mirror of `src` supplies the new
    /// group's viewer flags. `id` is the host-allocated group id.
    ///
    /// The subtree's structure and member links are copied into the group's
    /// private hierarchy (weakly, without usage counts), every copied node is
    /// tagged group-internal, and the content root is linked into the
    /// group's layer tree carrying the source mirror's flags. Back in this
    /// hierarchy, `src` is hollowed out: its children are freed, its member
    /// usage counts returned to the host, its kind flipped to a group
    /// reference bound to `id`, and every layer mirror of it retagged and
    /// flattened. When descendants are freed, each layer tree's active
    /// marker resets, as for [`remove`](Hierarchy::remove).
    ///
    /// Returns `None`, changing nothing, when:
    ///
    /// - this hierarchy is not a document (groups cannot nest this way),
    /// - `src` is the master or already a group node of either kind,
    /// - layer tree `tree` has no mirror of `src`,
    /// - any layer tree links a proper descendant of `src` at its top level
    ///   (the link would dangle once the subtree is freed).
    ///
    /// # Panics
    ///
    /// Panics on a stale `src` or an out-of-range `tree`.
    pub fn create_group(
        &mut self,
        tree: usize,
        src: NodeId,
        id: GroupId,
        usage: &mut dyn UsageHost,
    ) -> Option<Group> {
        if !self.counts_usage {
            return None;
        }
        self.collections.validate(src);
        if src == self.collections.master() || self.collections.kind(src) != NodeKind::Normal {
            return None;
        }
        let src_mirror = self.layer_trees[tree].find(src)?;
        let src_flags = src_mirror.flags();
        let src_evaluated = src_mirror.flags_evaluated();
        for lt in &self.layer_trees {
            for root in lt.roots() {
                if root.collection() != src && self.collections.is_descendant(root.collection(), src)
                {
                    return None;
                }
            }
        }

        // Build the group: copy the subtree under a fresh content root, tag
        // everything group-internal, and link the root with the source
        // mirror's flags.
        let name = self.collections.name(src).to_string();
        let mut hierarchy = Hierarchy::new_group_owner();
        let root = hierarchy.add(None, NodeKind::GroupInternal, Some(&name));
        hierarchy
            .collections
            .copy_data_from(root, &self.collections, src, None);
        let group_master = hierarchy.collections.master();
        hierarchy
            .collections
            .retag_subtree(group_master, NodeKind::GroupInternal);
        let pos = hierarchy
            .link_collection(0, root)
            .expect("fresh layer tree has no links");
        let link = &mut hierarchy.layer_trees[0].roots[pos];
        link.flags = src_flags;
        link.flags_evaluated = src_evaluated;

        // Convert this hierarchy's side: retag the mirrors, then hollow the
        // source node into a bound proxy.
        layer::convert_to_group_links(&mut self.layer_trees, src);
        let freed = self.collections.clear_node(src, self.counts_usage, usage);
        self.collections.retag_subtree(src, NodeKind::GroupRef);
        self.collections.bind_group(src, id);
        layer::cascade_removed(&mut self.layer_trees, &freed);
        for node in freed {
            self.tracer.node_removed(&NodeRemovedEvent { node });
        }
        self.tracer
            .group_created(&GroupCreatedEvent { group: id, source: src });

        Some(Group {
            id,
            name,
            hierarchy,
        })
    }
}
