// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer trees: per-viewer mirrors of a collection tree.
//!
//! Each viewer (a render layer, an editor pane) holds a [`LayerTree`] whose
//! top level is a list of *links* into the collection tree and whose deeper
//! structure mirrors the linked subtrees node for node. Layer nodes carry
//! viewer-local state (visibility and selectability flags, plus a cached
//! evaluated combination of them) keyed to collection nodes by [`NodeId`],
//! never by ownership.
//!
//! The collection tree is ground truth. Structural edits are mirrored
//! incrementally where cheap (node creation, member notifications) and by
//! re-deriving the affected region where not (moves); removal cascades so a
//! layer node never outlives its collection node.
//!
//! [`NodeId`]: crate::collection::NodeId

mod sync;
mod tree;

pub(crate) use sync::{cascade_removed, convert_to_group_links, mirror_new_node, resync};
pub use tree::{LayerFlags, LayerNode, LayerTree};
