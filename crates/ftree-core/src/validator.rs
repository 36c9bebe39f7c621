use std::collections::HashSet;

use crate::node::Node;
use crate::tree::FileTree;

/// A single structural defect found by [`validate`]. Carries the offending
/// path so a caller (the CLI's `validate` subcommand, a test) can report
/// something more useful than a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `count()` did not match the number of nodes actually reachable from
    /// the root.
    CountMismatch { reported: usize, actual: usize },
    /// A node's path is not exactly one component deeper than its parent's.
    DepthMismatch { path: String },
    /// A node's path does not share its parent's path as a proper prefix.
    NotAChild { path: String, parent: String },
    /// Two nodes in the tree share the same path.
    DuplicatePath { path: String },
    /// A directory's children are not in strictly ascending path order.
    SiblingsOutOfOrder { parent: String },
}

/// Walks the whole tree and reports every structural defect found, mirroring
/// the original checker's strategy: count nodes independently of the
/// reported count, scan for duplicates, then re-walk checking parent/child
/// and sibling-order invariants at every level.
///
/// An empty `Vec` means the tree is structurally sound. `validate` never
/// panics and never mutates the tree — it is safe to run on every CLI
/// invocation's `validate` subcommand.
pub fn validate(tree: &FileTree) -> Vec<Violation> {
    let mut violations = Vec::new();

    let Some(root) = tree.root() else {
        if tree.node_count() != 0 {
            violations.push(Violation::CountMismatch {
                reported: tree.node_count(),
                actual: 0,
            });
        }
        return violations;
    };

    let nodes = crate::traversal::preorder(root);

    if nodes.len() != tree.node_count() {
        violations.push(Violation::CountMismatch {
            reported: tree.node_count(),
            actual: nodes.len(),
        });
    }

    let mut seen = HashSet::with_capacity(nodes.len());
    for node in &nodes {
        let path = node.path_str();
        if !seen.insert(path.clone()) {
            violations.push(Violation::DuplicatePath { path });
        }
    }

    for node in &nodes {
        check_node(node, &mut violations);
    }

    violations
}

fn check_node(node: &Node, violations: &mut Vec<Violation>) {
    if let Some(parent) = node.parent() {
        let parent_path = parent.path();
        let child_path = node.path();

        if child_path.depth() != parent_path.depth() + 1 {
            let path = child_path.as_str().to_string();
            drop(child_path);
            drop(parent_path);
            violations.push(Violation::DepthMismatch { path });
        } else if child_path.shared_prefix_depth(&parent_path) != parent_path.depth() {
            let path = child_path.as_str().to_string();
            let parent = parent_path.as_str().to_string();
            drop(child_path);
            drop(parent_path);
            violations.push(Violation::NotAChild { path, parent });
        }
    }

    let children = node.children();
    for window in children.windows(2) {
        if window[0].path_str() >= window[1].path_str() {
            violations.push(Violation::SiblingsOutOfOrder {
                parent: node.path_str(),
            });
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> FileTree {
        let mut t = FileTree::new();
        t.initialize().unwrap();
        t
    }

    #[test]
    fn empty_tree_is_valid() {
        let t = fresh();
        assert!(validate(&t).is_empty());
    }

    #[test]
    fn well_formed_tree_is_valid() {
        let mut t = fresh();
        t.insert_directory("a/b/c").unwrap();
        t.insert_file("a/b/f", Vec::new()).unwrap();
        assert!(validate(&t).is_empty());
    }

    #[test]
    fn count_stays_consistent_through_insert_and_remove() {
        let mut t = fresh();
        t.insert_directory("a/b").unwrap();
        t.insert_directory("a/b/c").unwrap();
        t.remove_directory("a/b/c").unwrap();
        assert!(validate(&t).is_empty());
    }

    #[test]
    fn reports_sound_tree_across_many_siblings() {
        let mut t = fresh();
        for name in ["z", "a", "m", "b"] {
            t.insert_directory(&format!("root/{name}")).unwrap();
        }
        assert!(validate(&t).is_empty());
    }
}
