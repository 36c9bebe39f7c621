use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use crate::error::{FtError, FtResult};
use crate::path::Path;

/// Directory or file payload. Files have no children; directories have no
/// contents — both facts are enforced structurally by this enum rather than
/// by runtime checks.
#[derive(Debug)]
enum Kind {
    Directory { children: Vec<Node> },
    File { contents: Vec<u8> },
}

#[derive(Debug)]
struct Inner {
    path: Path,
    parent: Option<Weak<RefCell<Inner>>>,
    kind: Kind,
}

/// A node in the tree: a cheaply-cloneable handle (`Rc`) around a directory
/// or file record. Cloning a `Node` clones the handle, not the subtree.
///
/// The parent edge is a non-owning [`Weak`] reference — only a node's parent
/// (or the tree engine, for the root) owns it via a strong [`Rc`]. This is
/// the Rust realization of spec.md §9's "weak references" option: parent
/// pointers can never keep a freed subtree alive, and a node is only ever
/// reachable from its owner.
#[derive(Clone, Debug)]
pub struct Node(Rc<RefCell<Inner>>);

impl Node {
    /// Creates a new root directory node with no parent. Only the tree
    /// engine calls this, and only when it is about to install the result
    /// as `root`.
    pub(crate) fn new_root_dir(path: Path) -> FtResult<Node> {
        if path.depth() != 1 {
            return Err(FtError::NoSuchPath(path.as_str().to_string()));
        }
        Ok(Node(Rc::new(RefCell::new(Inner {
            path,
            parent: None,
            kind: Kind::Directory {
                children: Vec::new(),
            },
        }))))
    }

    /// Creates a new root file node with no parent — always rejected, since
    /// a bare file can never be the root (spec.md §4.3, CONFLICTING_PATH).
    pub(crate) fn new_root_file(path: Path) -> FtResult<Node> {
        let _ = path;
        Err(FtError::ConflictingPath(
            "a file cannot be the root of the tree".to_string(),
        ))
    }

    /// Creates a new node under `parent`, splicing it into the parent's
    /// sorted child list. Validates, in order: parent-is-a-file,
    /// parent-is-an-ancestor, depth-is-parent-plus-one, not-already-present.
    pub(crate) fn new_child(
        path: Path,
        parent: &Node,
        is_file: bool,
        contents: Vec<u8>,
    ) -> FtResult<Node> {
        {
            let parent_inner = parent.0.borrow();
            if matches!(parent_inner.kind, Kind::File { .. }) {
                return Err(FtError::NotADirectory(parent_inner.path.as_str().to_string()));
            }

            let parent_depth = parent_inner.path.depth();
            let shared = path.shared_prefix_depth(&parent_inner.path);
            if shared < parent_depth {
                return Err(FtError::ConflictingPath(path.as_str().to_string()));
            }
            if path.depth() != parent_depth + 1 {
                return Err(FtError::NoSuchPath(path.as_str().to_string()));
            }
        }

        let index = match parent.has_child(path.as_str()) {
            (true, _) => return Err(FtError::AlreadyInTree(path.as_str().to_string())),
            (false, index) => index,
        };

        let kind = if is_file {
            Kind::File { contents }
        } else {
            Kind::Directory {
                children: Vec::new(),
            }
        };

        let child = Node(Rc::new(RefCell::new(Inner {
            path,
            parent: Some(Rc::downgrade(&parent.0)),
            kind,
        })));

        let mut parent_inner = parent.0.borrow_mut();
        if let Kind::Directory { children } = &mut parent_inner.kind {
            children.insert(index, child.clone());
        }

        Ok(child)
    }

    /// Unlinks this node from its parent (if any) and returns the total
    /// number of nodes this subtree contained (self + every descendant).
    /// Dropping the returned count's worth of `Rc`s is what actually frees
    /// the memory; this method's job is purely to sever the links so that
    /// happens deterministically rather than whenever the caller's last
    /// handle goes out of scope.
    pub(crate) fn detach_and_count(&self) -> usize {
        if let Some(parent) = self.parent() {
            let self_path = self.path_str();
            let mut parent_inner = parent.0.borrow_mut();
            if let Kind::Directory { children } = &mut parent_inner.kind {
                if let Ok(index) = children.binary_search_by(|c| c.path_cmp_str(&self_path)) {
                    children.remove(index);
                }
            }
        }
        self.free_subtree()
    }

    /// Recursively counts and detaches every descendant, breaking child
    /// links along the way. Used both by [`Node::detach_and_count`] and by
    /// the tree engine's `destroy`, which frees the root without needing to
    /// unlink it from a parent it doesn't have.
    pub(crate) fn free_subtree(&self) -> usize {
        let mut count = 1;
        let children = {
            let mut inner = self.0.borrow_mut();
            if let Kind::Directory { children } = &mut inner.kind {
                std::mem::take(children)
            } else {
                Vec::new()
            }
        };
        for child in &children {
            count += child.free_subtree();
        }
        count
    }

    /// Binary-searches this directory's children for `path_str`. Returns
    /// `(true, index)` on a hit, `(false, insertion_point)` on a miss —
    /// callers that are about to insert reuse the insertion point directly.
    pub fn has_child(&self, path_str: &str) -> (bool, usize) {
        let inner = self.0.borrow();
        match &inner.kind {
            Kind::File { .. } => (false, 0),
            Kind::Directory { children } => {
                match children.binary_search_by(|c| c.path_cmp_str(path_str)) {
                    Ok(index) => (true, index),
                    Err(index) => (false, index),
                }
            }
        }
    }

    fn path_cmp_str(&self, other: &str) -> std::cmp::Ordering {
        self.0.borrow().path.compare_str(other)
    }

    pub fn num_children(&self) -> usize {
        match &self.0.borrow().kind {
            Kind::File { .. } => 0,
            Kind::Directory { children } => children.len(),
        }
    }

    pub fn child(&self, index: usize) -> FtResult<Node> {
        match &self.0.borrow().kind {
            Kind::File { .. } => Err(FtError::NoSuchPath(self.path_str())),
            Kind::Directory { children } => children
                .get(index)
                .cloned()
                .ok_or_else(|| FtError::NoSuchPath(self.path_str())),
        }
    }

    /// All children, already sorted by path (the invariant the tree engine
    /// maintains on every insert/remove).
    pub fn children(&self) -> Vec<Node> {
        match &self.0.borrow().kind {
            Kind::File { .. } => Vec::new(),
            Kind::Directory { children } => children.clone(),
        }
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.as_ref().and_then(|w| w.upgrade()).map(Node)
    }

    pub fn path(&self) -> Ref<'_, Path> {
        Ref::map(self.0.borrow(), |inner| &inner.path)
    }

    pub fn path_str(&self) -> String {
        self.0.borrow().path.as_str().to_string()
    }

    pub fn is_file(&self) -> bool {
        matches!(self.0.borrow().kind, Kind::File { .. })
    }

    /// A clone of the file's contents, or `None` for a directory.
    pub fn contents(&self) -> Option<Vec<u8>> {
        match &self.0.borrow().kind {
            Kind::File { contents } => Some(contents.clone()),
            Kind::Directory { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        match &self.0.borrow().kind {
            Kind::File { contents } => contents.len(),
            Kind::Directory { .. } => 0,
        }
    }

    /// Overwrites a file's contents, dropping the previous buffer. Fails
    /// with [`FtError::NotAFile`] on a directory.
    pub fn set_contents(&self, new_contents: Vec<u8>) -> FtResult<()> {
        let mut inner = self.0.borrow_mut();
        match &mut inner.kind {
            Kind::Directory { .. } => Err(FtError::NotAFile(inner.path.as_str().to_string())),
            Kind::File { contents } => {
                *contents = new_contents;
                Ok(())
            }
        }
    }

    /// Swaps in `new_contents` and returns the previous buffer to the
    /// caller without dropping it — the ownership-transfer point described
    /// in spec.md §4.3 and §9. Fails with [`FtError::NotAFile`] on a
    /// directory.
    pub fn replace_contents(&self, new_contents: Vec<u8>) -> FtResult<Vec<u8>> {
        let mut inner = self.0.borrow_mut();
        match &mut inner.kind {
            Kind::Directory { .. } => Err(FtError::NotAFile(inner.path.as_str().to_string())),
            Kind::File { contents } => Ok(std::mem::replace(contents, new_contents)),
        }
    }
}
