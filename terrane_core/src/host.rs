// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contracts with the host object model.
//!
//! The tree stores only weak references to scene objects; the host owns the
//! objects and their liveness accounting. Every membership mutation reports
//! its ownership effect through [`UsageHost`], synchronously, before the
//! mutating call returns. [`SimulationHost`] is told to drop its own
//! back-reference to an object before that object is swept out of all of a
//! document's collections.
//!
//! Both traits are seams for test doubles as much as for production hosts;
//! [`NullHost`] implements both as no-ops for owners that do no accounting.

use crate::collection::ObjectId;

/// Object-lifetime collaborator.
pub trait UsageHost {
    /// A collection gained a counted reference to `object`.
    fn incref_usage(&mut self, object: ObjectId);

    /// A collection dropped a counted reference to `object`.
    fn decref_usage(&mut self, object: ObjectId);

    /// A caller asked for `object` to be freed outright if nothing else
    /// uses it.
    fn release_if_unused(&mut self, object: ObjectId);
}

/// Physics/simulation collaborator.
pub trait SimulationHost {
    /// Called before `object` is removed from every collection of a
    /// document, so the simulation can drop its back-reference first.
    fn detach_rigid_body(&mut self, object: ObjectId);
}

/// A host that ignores all notifications.
///
/// Group-internal edits do no usage accounting, and tests that only care
/// about structure use this too.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl UsageHost for NullHost {
    fn incref_usage(&mut self, _object: ObjectId) {}
    fn decref_usage(&mut self, _object: ObjectId) {}
    fn release_if_unused(&mut self, _object: ObjectId) {}
}

impl SimulationHost for NullHost {
    fn detach_rigid_body(&mut self, _object: ObjectId) {}
}
