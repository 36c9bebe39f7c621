use crate::error::{FtError, FtResult};
use crate::node::Node;
use crate::path::Path;
use crate::traversal::preorder;

/// Result of [`FileTree::stat`]: whether the path names a file, and (for
/// files only) its length in bytes. `size` is `0` and meaningless for a
/// directory, per spec §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub is_file: bool,
    pub size: usize,
}

/// The tree engine: three state variables (`initialized`, `root`, `count`)
/// and the public operations that mutate or query them. Every public
/// operation funnels through [`FileTree::traverse_to_furthest`] and
/// [`FileTree::find_exact`].
///
/// Modeled as an explicit value type rather than process-wide statics
/// (spec.md §9's "recommended for testability" option) — nothing here
/// prevents running several independent `FileTree`s side by side, which is
/// what the test suite does.
#[derive(Default)]
pub struct FileTree {
    initialized: bool,
    root: Option<Node>,
    count: usize,
}

impl FileTree {
    pub fn new() -> Self {
        FileTree::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn node_count(&self) -> usize {
        self.count
    }

    pub fn initialize(&mut self) -> FtResult<()> {
        if self.initialized {
            return Err(FtError::Initialization);
        }
        self.initialized = true;
        self.root = None;
        self.count = 0;
        Ok(())
    }

    pub fn destroy(&mut self) -> FtResult<()> {
        if !self.initialized {
            return Err(FtError::Initialization);
        }
        if let Some(root) = self.root.take() {
            self.count -= root.free_subtree();
        }
        self.initialized = false;
        Ok(())
    }

    /// Returns the deepest node in the tree whose path is a prefix of
    /// `path`, or `None` if the tree is empty. Fails with
    /// [`FtError::ConflictingPath`] if the root's path isn't even a
    /// one-component prefix of `path`.
    fn traverse_to_furthest(&self, path: &Path) -> FtResult<Option<Node>> {
        let root = match &self.root {
            None => return Ok(None),
            Some(root) => root,
        };

        let first = path.prefix(1)?;
        if *root.path() != first {
            return Err(FtError::ConflictingPath(path.as_str().to_string()));
        }

        let mut current = root.clone();
        for depth in 2..=path.depth() {
            let prefix = path.prefix(depth)?;
            let (found, index) = current.has_child(prefix.as_str());
            if !found {
                break;
            }
            current = current.child(index)?;
        }
        Ok(Some(current))
    }

    /// Finds the node at exactly `path_str`, or fails with
    /// [`FtError::NoSuchPath`].
    fn find_exact(&self, path_str: &str) -> FtResult<Node> {
        if !self.initialized {
            return Err(FtError::Initialization);
        }
        let path = Path::new(path_str)?;
        let furthest = self.traverse_to_furthest(&path)?;
        match furthest {
            Some(node) if *node.path() == path => Ok(node),
            _ => Err(FtError::NoSuchPath(path_str.to_string())),
        }
    }

    /// Builds every missing directory level along `path`, returning the
    /// first newly-created node (for atomic rollback) and the total number
    /// of nodes created.
    fn build_missing_dirs(
        &self,
        path: &Path,
        start: &Option<Node>,
        up_to_depth: usize,
    ) -> FtResult<(Option<Node>, Vec<Node>, usize)> {
        let mut first_new: Option<Node> = None;
        let mut created = Vec::new();
        let mut current = start.clone();
        let mut index = match &current {
            None => 1,
            Some(node) => node.path().depth() + 1,
        };

        while index <= up_to_depth {
            let prefix = match path.prefix(index) {
                Ok(p) => p,
                Err(e) => {
                    self.rollback(&first_new);
                    return Err(e);
                }
            };

            let new_node = match &current {
                None => match Node::new_root_dir(prefix) {
                    Ok(n) => n,
                    Err(e) => {
                        self.rollback(&first_new);
                        return Err(e);
                    }
                },
                Some(parent) => match Node::new_child(prefix, parent, false, Vec::new()) {
                    Ok(n) => n,
                    Err(e) => {
                        self.rollback(&first_new);
                        return Err(e);
                    }
                },
            };

            created.push(new_node.clone());
            if first_new.is_none() {
                first_new = Some(new_node.clone());
            }
            current = Some(new_node);
            index += 1;
        }

        let created_count = created.len();
        Ok((current, created, created_count))
    }

    /// Cascades the recursive destructor over a partially-built insert so a
    /// mid-way allocation failure leaves the tree exactly as it was before
    /// the call (spec.md §4.3, "compound-insert atomicity").
    fn rollback(&self, first_new: &Option<Node>) {
        if let Some(node) = first_new {
            node.free_subtree();
        }
    }

    pub fn insert_directory(&mut self, path_str: &str) -> FtResult<()> {
        if !self.initialized {
            return Err(FtError::Initialization);
        }
        let path = Path::new(path_str)?;
        let furthest = self.traverse_to_furthest(&path)?;

        if let Some(node) = &furthest {
            if node.path().depth() == path.depth() && *node.path() == path {
                return Err(FtError::AlreadyInTree(path_str.to_string()));
            }
        }

        let (_, created, new_nodes) = self.build_missing_dirs(&path, &furthest, path.depth())?;

        if self.root.is_none() {
            self.root = created.first().cloned();
        }
        self.count += new_nodes;
        Ok(())
    }

    pub fn insert_file(&mut self, path_str: &str, contents: Vec<u8>) -> FtResult<()> {
        if !self.initialized {
            return Err(FtError::Initialization);
        }
        let path = Path::new(path_str)?;
        if path.depth() < 2 {
            return Err(FtError::ConflictingPath(path_str.to_string()));
        }

        let furthest = self.traverse_to_furthest(&path)?;

        // `furthest` is `None` only when the tree is empty — in that case
        // every directory level up to `path.depth() - 1` still needs to be
        // built from scratch, starting with a fresh root directory.
        if let Some(node) = &furthest {
            if node.path().depth() == path.depth() && *node.path() == path {
                return Err(FtError::AlreadyInTree(path_str.to_string()));
            }
        }

        let (parent, created, mut new_nodes) =
            self.build_missing_dirs(&path, &furthest, path.depth() - 1)?;
        let parent = parent.expect("build_missing_dirs always returns Some for depth >= 2");

        let file = match Node::new_child(path.clone(), &parent, true, contents) {
            Ok(n) => n,
            Err(e) => {
                self.rollback(&created.first().cloned());
                return Err(e);
            }
        };
        new_nodes += 1;

        if self.root.is_none() {
            self.root = created.first().cloned().or_else(|| Some(file.clone()));
        }
        self.count += new_nodes;
        Ok(())
    }

    pub fn remove_directory(&mut self, path_str: &str) -> FtResult<()> {
        let node = self.find_exact(path_str)?;
        if node.is_file() {
            return Err(FtError::NotADirectory(path_str.to_string()));
        }
        self.remove_node(&node);
        Ok(())
    }

    pub fn remove_file(&mut self, path_str: &str) -> FtResult<()> {
        let node = self.find_exact(path_str)?;
        if !node.is_file() {
            return Err(FtError::NotAFile(path_str.to_string()));
        }
        self.remove_node(&node);
        Ok(())
    }

    fn remove_node(&mut self, node: &Node) {
        let freed = node.detach_and_count();
        self.count -= freed;
        if self.count == 0 {
            self.root = None;
        }
    }

    pub fn contains_dir(&self, path_str: &str) -> bool {
        self.find_exact(path_str).map(|n| !n.is_file()).unwrap_or(false)
    }

    pub fn contains_file(&self, path_str: &str) -> bool {
        self.find_exact(path_str).map(|n| n.is_file()).unwrap_or(false)
    }

    /// A clone of a file's contents, or `None` on any error (bad path,
    /// missing path, or the path names a directory).
    pub fn read_file_contents(&self, path_str: &str) -> Option<Vec<u8>> {
        let node = self.find_exact(path_str).ok()?;
        node.contents()
    }

    /// Deep-copies `new_contents` into the file at `path_str`, returning the
    /// old buffer to the caller — who now owns it — or `None` on any error.
    pub fn replace_file_contents(&mut self, path_str: &str, new_contents: Vec<u8>) -> Option<Vec<u8>> {
        let node = self.find_exact(path_str).ok()?;
        node.replace_contents(new_contents).ok()
    }

    pub fn stat(&self, path_str: &str) -> FtResult<Stat> {
        let node = self.find_exact(path_str)?;
        let is_file = node.is_file();
        let size = if is_file { node.len() } else { 0 };
        Ok(Stat { is_file, size })
    }

    /// Newline-separated pathnames in canonical order (spec.md §4.4).
    /// Empty when the tree has no root.
    pub fn serialize(&self) -> FtResult<String> {
        if !self.initialized {
            return Err(FtError::Initialization);
        }
        let Some(root) = &self.root else {
            return Ok(String::new());
        };
        let mut out = String::new();
        for node in preorder(root) {
            out.push_str(node.path().as_str());
            out.push('\n');
        }
        Ok(out)
    }

    /// The root node, for callers (the validator, the CLI tree printer)
    /// that need direct read access to the structure.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
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
    fn scenario_1_insert_directory_creates_missing_levels() {
        let mut t = fresh();
        t.insert_directory("a/b/c").unwrap();
        assert_eq!(t.node_count(), 3);
        assert_eq!(t.serialize().unwrap(), "a\na/b\na/b/c\n");
    }

    #[test]
    fn scenario_2_insert_file_orders_files_before_dirs() {
        let mut t = fresh();
        t.insert_directory("a/b/c").unwrap();
        t.insert_file("a/b/f", b"hi".to_vec()).unwrap();
        assert_eq!(t.node_count(), 4);
        let st = t.stat("a/b/f").unwrap();
        assert_eq!(st, Stat { is_file: true, size: 2 });
        let st_dir = t.stat("a/b").unwrap();
        assert!(!st_dir.is_file);
        assert_eq!(t.serialize().unwrap(), "a\na/b\na/b/f\na/b/c\n");
    }

    #[test]
    fn scenario_3_duplicate_inserts_fail_without_mutating_state() {
        let mut t = fresh();
        t.insert_directory("a/b/c").unwrap();
        t.insert_file("a/b/f", b"hi".to_vec()).unwrap();
        let before = t.serialize().unwrap();

        assert!(matches!(
            t.insert_directory("a/b/c"),
            Err(FtError::AlreadyInTree(_))
        ));
        assert!(matches!(
            t.insert_file("a/b", b"x".to_vec()),
            Err(FtError::AlreadyInTree(_))
        ));
        assert_eq!(t.serialize().unwrap(), before);
    }

    #[test]
    fn scenario_4_remove_directory_collapses_to_remaining_root() {
        let mut t = fresh();
        t.insert_directory("a/b/c").unwrap();
        t.insert_file("a/b/f", b"hi".to_vec()).unwrap();
        t.remove_directory("a/b").unwrap();
        assert_eq!(t.node_count(), 1);
        assert_eq!(t.serialize().unwrap(), "a\n");
    }

    #[test]
    fn scenario_5_file_cannot_be_root_and_bad_path_rejected() {
        let mut t = fresh();
        assert!(matches!(
            t.insert_file("x", Vec::new()),
            Err(FtError::ConflictingPath(_))
        ));
        assert!(matches!(t.insert_directory(""), Err(FtError::BadPath(_))));
    }

    #[test]
    fn scenario_6_second_root_conflicts_until_destroy_reinit() {
        let mut t = fresh();
        t.insert_directory("a").unwrap();
        assert!(matches!(
            t.insert_directory("b"),
            Err(FtError::ConflictingPath(_))
        ));
        t.destroy().unwrap();
        t.initialize().unwrap();
        t.insert_directory("b").unwrap();
        assert_eq!(t.serialize().unwrap(), "b\n");
    }

    #[test]
    fn operations_before_initialize_fail() {
        let mut t = FileTree::new();
        assert!(matches!(
            t.insert_directory("a"),
            Err(FtError::Initialization)
        ));
        assert!(matches!(t.destroy(), Err(FtError::Initialization)));
        assert!(!t.contains_dir("a"));
    }

    #[test]
    fn double_initialize_fails() {
        let mut t = fresh();
        assert!(matches!(t.initialize(), Err(FtError::Initialization)));
    }

    #[test]
    fn replace_round_trip_returns_old_buffer_exactly_once() {
        let mut t = fresh();
        t.insert_file("a/f", b"old".to_vec()).unwrap();
        let old = t.replace_file_contents("a/f", b"new-bytes".to_vec()).unwrap();
        assert_eq!(old, b"old");
        assert_eq!(t.read_file_contents("a/f").unwrap(), b"new-bytes");
        assert_eq!(t.stat("a/f").unwrap().size, 9);
    }

    #[test]
    fn contains_queries_never_mutate_state() {
        let mut t = fresh();
        t.insert_directory("a/b").unwrap();
        let before = t.node_count();
        for _ in 0..5 {
            assert!(t.contains_dir("a/b"));
            assert!(!t.contains_file("a/b"));
            assert!(!t.contains_dir("nope"));
        }
        assert_eq!(t.node_count(), before);
    }

    #[test]
    fn insert_then_remove_returns_to_equivalent_state() {
        let mut t = fresh();
        t.insert_directory("a").unwrap();
        let baseline = t.serialize().unwrap();
        let baseline_count = t.node_count();

        t.insert_directory("a/x/y/z").unwrap();
        t.remove_directory("a/x").unwrap();

        assert_eq!(t.serialize().unwrap(), baseline);
        assert_eq!(t.node_count(), baseline_count);
    }

    #[test]
    fn serialization_is_deterministic_for_equal_states() {
        let mut t1 = fresh();
        let mut t2 = fresh();
        for p in ["a", "a/b", "a/c", "a/b/d"] {
            t1.insert_directory(p).unwrap();
            t2.insert_directory(p).unwrap();
        }
        assert_eq!(t1.serialize().unwrap(), t2.serialize().unwrap());
    }

    #[test]
    fn remove_wrong_kind_reports_type_mismatch() {
        let mut t = fresh();
        t.insert_file("a/f", Vec::new()).unwrap();
        assert!(matches!(
            t.remove_directory("a/f"),
            Err(FtError::NotADirectory(_))
        ));
        assert!(matches!(t.remove_file("a"), Err(FtError::NotAFile(_))));
    }

    #[test]
    fn insert_file_requires_depth_at_least_two() {
        let mut t = fresh();
        assert!(matches!(
            t.insert_file("onlyone", Vec::new()),
            Err(FtError::ConflictingPath(_))
        ));
    }
}
