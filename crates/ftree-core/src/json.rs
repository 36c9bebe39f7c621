//! Additive JSON view over a tree's canonical listing. Does not participate
//! in [`crate::tree::FileTree::serialize`]'s contract — this is purely a
//! convenience the CLI opts into with `--format json`.

use serde::Serialize;

use crate::node::Node;
use crate::tree::FileTree;

#[derive(Serialize)]
struct Entry {
    path: String,
    kind: &'static str,
    size: usize,
}

/// Renders the tree's canonical pre-order listing as a JSON array of
/// `{path, kind, size}` records. Returns `"[]"` for an empty or
/// uninitialized tree.
pub fn to_json(tree: &FileTree) -> serde_json::Result<String> {
    let entries: Vec<Entry> = match tree.root() {
        None => Vec::new(),
        Some(root) => crate::traversal::preorder(root).iter().map(to_entry).collect(),
    };
    serde_json::to_string_pretty(&entries)
}

fn to_entry(node: &Node) -> Entry {
    Entry {
        path: node.path_str(),
        kind: if node.is_file() { "file" } else { "directory" },
        size: node.len(),
    }
}
