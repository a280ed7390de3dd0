// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshots of collection and layer trees.
//!
//! The output is a plain structural snapshot (names, kinds, members, flags)
//! with no handle indices, so two snapshots of equal trees compare equal
//! even when slot allocation differs. Useful for golden tests and for
//! diffing a hierarchy across an edit.

use serde_json::{Value, json};
use terrane_core::{CollectionTree, LayerNode, LayerTree, NodeId, NodeKind};

fn kind_str(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Normal => "normal",
        NodeKind::GroupInternal => "group-internal",
        NodeKind::GroupRef => "group-ref",
    }
}

/// Snapshots the whole collection tree, master first.
#[must_use]
pub fn collection_tree(tree: &CollectionTree) -> Value {
    fn rec(tree: &CollectionTree, node: NodeId) -> Value {
        let mut value = json!({
            "name": tree.name(node),
            "kind": kind_str(tree.kind(node)),
            "members": tree.members(node).iter().map(|m| m.0).collect::<Vec<_>>(),
            "children": tree.children(node).map(|c| rec(tree, c)).collect::<Vec<_>>(),
        });
        if let Some(group) = tree.group(node) {
            value["group"] = json!(group.0);
        }
        value
    }
    rec(tree, tree.master())
}

/// Snapshots one layer tree, resolving names through the collection tree.
#[must_use]
pub fn layer_tree(layer: &LayerTree, tree: &CollectionTree) -> Value {
    fn rec(node: &LayerNode, tree: &CollectionTree) -> Value {
        json!({
            "name": tree.name(node.collection()),
            "kind": kind_str(node.kind()),
            "visible": node.flags().visible,
            "selectable": node.flags().selectable,
            "children": node.children().iter().map(|c| rec(c, tree)).collect::<Vec<_>>(),
        })
    }
    json!(layer.roots().iter().map(|r| rec(r, tree)).collect::<Vec<_>>())
}
