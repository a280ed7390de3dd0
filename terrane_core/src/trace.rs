// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for structural edits.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! mutating entry points call at each structural change. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//! Each event fires exactly once per change, synchronously, before the
//! mutating call returns.
//!
//! [`Tracer`] wraps an optional owned sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.

use crate::collection::{GroupId, NodeId, ObjectId};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a collection node is created and mirrored.
#[derive(Clone, Copy, Debug)]
pub struct NodeAddedEvent {
    /// The new node.
    pub node: NodeId,
    /// The parent it was attached under.
    pub parent: NodeId,
}

/// Emitted after a collection subtree is removed, once per freed node.
#[derive(Clone, Copy, Debug)]
pub struct NodeRemovedEvent {
    /// The freed node (handle already stale).
    pub node: NodeId,
}

/// Emitted after an object is linked into a node's member list.
#[derive(Clone, Copy, Debug)]
pub struct MemberLinkedEvent {
    /// The node that gained the member.
    pub node: NodeId,
    /// The linked object.
    pub object: ObjectId,
}

/// Emitted after an object is unlinked from a node's member list.
#[derive(Clone, Copy, Debug)]
pub struct MemberUnlinkedEvent {
    /// The node that lost the member.
    pub node: NodeId,
    /// The unlinked object.
    pub object: ObjectId,
}

/// Emitted after the layer regions mirroring a node were rebuilt.
#[derive(Clone, Copy, Debug)]
pub struct ResyncEvent {
    /// Root of the re-derived region.
    pub root: NodeId,
}

/// Emitted after a collection subtree was promoted into a group.
#[derive(Clone, Copy, Debug)]
pub struct GroupCreatedEvent {
    /// The new group's id.
    pub group: GroupId,
    /// The source node, now an empty group-reference proxy.
    pub source: NodeId,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from structural edits.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a node is added.
    fn on_node_added(&mut self, e: &NodeAddedEvent) {
        _ = e;
    }

    /// Called for each node freed by a removal.
    fn on_node_removed(&mut self, e: &NodeRemovedEvent) {
        _ = e;
    }

    /// Called when a member is linked.
    fn on_member_linked(&mut self, e: &MemberLinkedEvent) {
        _ = e;
    }

    /// Called when a member is unlinked.
    fn on_member_unlinked(&mut self, e: &MemberUnlinkedEvent) {
        _ = e;
    }

    /// Called after a layer resync of the region below `root`.
    fn on_resync(&mut self, e: &ResyncEvent) {
        _ = e;
    }

    /// Called after a group conversion.
    fn on_group_created(&mut self, e: &GroupCreatedEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional owned [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<alloc::boxed::Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer with no sink attached.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Creates a tracer dispatching to `sink`.
    #[cfg(feature = "trace")]
    #[must_use]
    pub fn new(sink: alloc::boxed::Box<dyn TraceSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// See [`TraceSink::on_node_added`].
    #[inline]
    pub fn node_added(&mut self, e: &NodeAddedEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_node_added(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// See [`TraceSink::on_node_removed`].
    #[inline]
    pub fn node_removed(&mut self, e: &NodeRemovedEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_node_removed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// See [`TraceSink::on_member_linked`].
    #[inline]
    pub fn member_linked(&mut self, e: &MemberLinkedEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_member_linked(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// See [`TraceSink::on_member_unlinked`].
    #[inline]
    pub fn member_unlinked(&mut self, e: &MemberUnlinkedEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_member_unlinked(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// See [`TraceSink::on_resync`].
    #[inline]
    pub fn resync(&mut self, e: &ResyncEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_resync(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// See [`TraceSink::on_group_created`].
    #[inline]
    pub fn group_created(&mut self, e: &GroupCreatedEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_group_created(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        linked: Rc<RefCell<Vec<(NodeId, ObjectId)>>>,
    }

    impl TraceSink for Recorder {
        fn on_member_linked(&mut self, e: &MemberLinkedEvent) {
            self.linked.borrow_mut().push((e.node, e.object));
        }
    }

    #[test]
    fn member_link_fires_exactly_once() {
        use crate::collection::NodeKind;
        use crate::hierarchy::Hierarchy;
        use crate::host::NullHost;

        let linked = Rc::new(RefCell::new(Vec::new()));
        let mut h = Hierarchy::new_document();
        h.set_tracer(Tracer::new(Box::new(Recorder {
            linked: linked.clone(),
        })));

        let a = h.add(None, NodeKind::Normal, Some("A"));
        let ob = ObjectId(5);
        assert!(h.add_member(a, ob, &mut NullHost));
        // The rejected duplicate must not notify again.
        assert!(!h.add_member(a, ob, &mut NullHost));
        assert_eq!(&*linked.borrow(), &[(a, ob)]);
    }
}
