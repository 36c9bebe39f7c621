use crate::node::Node;

/// Walks the subtree rooted at `root` in canonical order: the node itself,
/// then all file children (ascending path order, recursively), then all
/// directory children (ascending path order, recursively).
///
/// A directory's children are already kept sorted by path, so splitting
/// them into "files first" / "directories second" preserves sortedness
/// within each group — this is the same two-pass-over-one-sorted-array
/// trick the original tree's pre-order walk uses.
///
/// Both [`crate::tree::FileTree::serialize`] and
/// [`crate::validator::validate`]'s duplicate-path scan are built on this
/// single traversal so they can never disagree about what "canonical order"
/// means.
pub fn preorder(root: &Node) -> Vec<Node> {
    let mut out = Vec::new();
    visit(root, &mut out);
    out
}

fn visit(node: &Node, out: &mut Vec<Node>) {
    out.push(node.clone());

    let children = node.children();
    for child in children.iter().filter(|c| c.is_file()) {
        visit(child, out);
    }
    for child in children.iter().filter(|c| !c.is_file()) {
        visit(child, out);
    }
}
