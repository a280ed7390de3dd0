// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collection trees with synchronized per-viewer layer trees.
//!
//! `terrane_core` provides the structural data model of a scene description:
//! a canonical tree of named collection nodes holding weak object references,
//! mirrored into any number of per-viewer layer trees that carry local
//! visibility state. It is `no_std` compatible (with `alloc`) and uses
//! arena storage with generational index handles, so removed-node handles
//! fail fast instead of dangling.
//!
//! # Architecture
//!
//! All mutation flows through one entry point that keeps the two tree kinds
//! synchronized:
//!
//! ```text
//!   Hierarchy::{add, remove, move_*, add_member, ...}
//!       │
//!       ├──► CollectionTree        (ground truth: names, members, children)
//!       │
//!       ├──► LayerTree mirrors     (incremental mirror / region resync /
//!       │                           removal cascade)
//!       │
//!       └──► UsageHost + Tracer    (ownership accounting, instrumentation)
//! ```
//!
//! **[`collection`]** — The canonical [`CollectionTree`]: arena store,
//! generational [`NodeId`] handles, tree-wide unique naming, structural
//! moves with cycle rejection, and lazy pre-order traversal including a
//! distinct-member walk.
//!
//! **[`layer`]** — Per-viewer [`LayerTree`] mirrors with visibility and
//! selectability flags, top-down flag evaluation, and the synchronization
//! passes that keep mirrors consistent with the collection tree.
//!
//! **[`hierarchy`]** — [`Hierarchy`], the mutating surface pairing one
//! collection tree with its layer trees. Documents count object usage;
//! groups hold members weakly.
//!
//! **[`group`]** — [`Group`] conversion: promoting a document subtree into a
//! reusable group, leaving a bound group-reference proxy behind.
//!
//! **[`host`]** — The [`UsageHost`](host::UsageHost) and
//! [`SimulationHost`](host::SimulationHost) seams through which the owning
//! object model observes membership changes.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! structural-edit instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod collection;
pub mod group;
pub mod hierarchy;
pub mod host;
pub mod layer;
pub mod trace;

pub use collection::{CollectionTree, GroupId, NodeId, NodeKind, ObjectId};
pub use group::Group;
pub use hierarchy::Hierarchy;
pub use layer::{LayerFlags, LayerNode, LayerTree};
