// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! structural-edit event to a [`Write`](std::io::Write) destination
//! (default: stderr).

use std::io::Write;

use terrane_core::trace::{
    GroupCreatedEvent, MemberLinkedEvent, MemberUnlinkedEvent, NodeAddedEvent, NodeRemovedEvent,
    ResyncEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_node_added(&mut self, e: &NodeAddedEvent) {
        let _ = writeln!(self.writer, "[node:add] node={:?} parent={:?}", e.node, e.parent);
    }

    fn on_node_removed(&mut self, e: &NodeRemovedEvent) {
        let _ = writeln!(self.writer, "[node:remove] node={:?}", e.node);
    }

    fn on_member_linked(&mut self, e: &MemberLinkedEvent) {
        let _ = writeln!(
            self.writer,
            "[member:link] node={:?} object={:?}",
            e.node, e.object,
        );
    }

    fn on_member_unlinked(&mut self, e: &MemberUnlinkedEvent) {
        let _ = writeln!(
            self.writer,
            "[member:unlink] node={:?} object={:?}",
            e.node, e.object,
        );
    }

    fn on_resync(&mut self, e: &ResyncEvent) {
        let _ = writeln!(self.writer, "[resync] root={:?}", e.root);
    }

    fn on_group_created(&mut self, e: &GroupCreatedEvent) {
        let _ = writeln!(
            self.writer,
            "[group:create] group={:?} source={:?}",
            e.group, e.source,
        );
    }
}

#[cfg(test)]
mod tests {
    use terrane_core::host::NullHost;
    use terrane_core::trace::Tracer;
    use terrane_core::{Hierarchy, NodeKind, ObjectId};

    use super::*;

    #[test]
    fn edits_print_one_line_each() {
        // Route the sink's output through a shared buffer so the hierarchy
        // can own the sink while the test reads what it wrote.
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct Shared(Arc<Mutex<Vec<u8>>>);
        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().write(buf)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Shared(Arc::new(Mutex::new(Vec::new())));
        let mut h = Hierarchy::new_document();
        h.set_tracer(Tracer::new(Box::new(PrettyPrintSink::with_writer(
            buffer.clone(),
        ))));

        let a = h.add(None, NodeKind::Normal, Some("A"));
        h.add_member(a, ObjectId(1), &mut NullHost);
        h.remove(a, &mut NullHost);

        let bytes = buffer.0.lock().unwrap().clone();
        let output = String::from_utf8(bytes).unwrap();
        assert!(output.contains("[node:add]"), "got: {output}");
        assert!(output.contains("[member:link]"), "got: {output}");
        assert!(output.contains("[node:remove]"), "got: {output}");
    }
}
