// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collection tree data model.
//!
//! A *collection node* is a named grouping unit in an owner's canonical
//! tree. Each node has:
//!
//! - An identity ([`NodeId`]) — a generational handle that becomes stale when
//!   the node is removed, preventing use-after-free bugs at the API level.
//! - A name, unique across the whole tree below the owner's master node.
//! - A [`NodeKind`] tag distinguishing ordinary nodes from a group's private
//!   subtree and from group-reference proxies.
//! - An ordered list of weak member references ([`ObjectId`]), plus a
//!   derived/filtered list owned by an external evaluation collaborator.
//! - An ordered list of exclusively owned child nodes.
//!
//! The master node is created with the tree and can never be removed or
//! moved; every other node is created by an explicit add and destroyed by an
//! explicit remove. Structural invariants (acyclicity, name uniqueness,
//! duplicate-free member lists) are enforced by the operations themselves;
//! stale handles fail fast.

mod id;
mod store;
mod traverse;

pub use id::{GroupId, INVALID, NodeId, ObjectId};
pub use store::{CollectionTree, DEFAULT_NAME, MAX_NAME, NodeKind};
pub use traverse::{Children, Members, Nodes};
