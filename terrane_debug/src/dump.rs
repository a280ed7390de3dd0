// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text dumps of collection and layer trees.
//!
//! One node per line, two spaces of indent per depth level. Meant for test
//! failure output and interactive debugging, not for parsing.

use std::fmt::Write as _;

use terrane_core::{CollectionTree, LayerNode, LayerTree, NodeId, NodeKind};

fn kind_suffix(tree: &CollectionTree, node: NodeId) -> String {
    match tree.kind(node) {
        NodeKind::Normal => String::new(),
        NodeKind::GroupInternal => " (internal)".to_string(),
        NodeKind::GroupRef => match tree.group(node) {
            Some(g) => format!(" -> {g:?}"),
            None => " -> <unbound>".to_string(),
        },
    }
}

/// Renders the whole collection tree, master first.
#[must_use]
pub fn collection_tree(tree: &CollectionTree) -> String {
    fn rec(tree: &CollectionTree, node: NodeId, depth: usize, out: &mut String) {
        let members = tree.members(node).len();
        let _ = write!(out, "{:indent$}{}", "", tree.name(node), indent = depth * 2);
        if members > 0 {
            let _ = write!(out, " ({members} members)");
        }
        out.push_str(&kind_suffix(tree, node));
        out.push('\n');
        for child in tree.children(node) {
            rec(tree, child, depth + 1, out);
        }
    }
    let mut out = String::new();
    rec(tree, tree.master(), 0, &mut out);
    out
}

/// Renders one layer tree, resolving names through the collection tree.
///
/// Each line shows the mirrored collection's name and the node's local
/// flags: `v` for visible and `s` for selectable, `-` where cleared.
#[must_use]
pub fn layer_tree(layer: &LayerTree, tree: &CollectionTree) -> String {
    fn rec(node: &LayerNode, tree: &CollectionTree, depth: usize, out: &mut String) {
        let flags = node.flags();
        let _ = writeln!(
            out,
            "{:indent$}{} [{}{}]{}",
            "",
            tree.name(node.collection()),
            if flags.visible { 'v' } else { '-' },
            if flags.selectable { 's' } else { '-' },
            kind_suffix(tree, node.collection()),
            indent = depth * 2,
        );
        for child in node.children() {
            rec(child, tree, depth + 1, out);
        }
    }
    let mut out = String::new();
    for root in layer.roots() {
        rec(root, tree, 0, &mut out);
    }
    out
}
