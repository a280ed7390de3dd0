// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, tree dumps, and JSON export for terrane diagnostics.
//!
//! This crate provides development and post-mortem tooling on top of
//! [`terrane_core`]:
//!
//! - [`pretty::PrettyPrintSink`] — a [`TraceSink`](terrane_core::trace::TraceSink)
//!   with human-readable one-line-per-event output.
//! - [`dump`] — indented text dumps of collection and layer trees.
//! - [`json`] — JSON snapshots of both tree kinds, for diffing across edits.

pub mod dump;
pub mod json;
pub mod pretty;
