//! NamespaceTree - the unlocked directory tree backed by a node arena.
//!
//! All structural state lives here. Locking is the job of
//! [`Namespace`](super::Namespace); holding a `&NamespaceTree` means the
//! caller is inside a read scope, `&mut` means a write scope.

use std::slice;

use super::node::{FileMeta, Node};
use super::path;
use crate::error::{MetaIndexError, Result};
use crate::index::{ExactField, RangeField};
use crate::storage::{Slab, SlabIndex};
use crate::types::{NodeId, NodeInfo};

#[derive(Debug)]
pub struct NamespaceTree {
    nodes: Slab<Node>,
    root: SlabIndex,
}

impl NamespaceTree {
    /// Creates a tree holding only `root`, which must be a directory.
    pub(crate) fn new(root: Node) -> Self {
        debug_assert!(root.is_dir(), "namespace root must be a directory");
        let mut nodes = Slab::new();
        let root = nodes.insert(root);
        Self { nodes, root }
    }

    #[inline]
    pub fn root(&self) -> SlabIndex {
        self.root
    }

    /// Number of nodes, the root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    #[inline]
    pub fn node(&self, index: SlabIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Containing directory of `node`; `None` for the root.
    pub fn parent_of(&self, node: &Node) -> Option<&Node> {
        node.parent().and_then(|parent| self.nodes.get(parent))
    }

    /// Finds a direct child of `dir` by exact name, scanning in insertion
    /// order.
    pub fn find_child(&self, dir: SlabIndex, name: &str) -> Option<SlabIndex> {
        self.nodes.get(dir)?.children().iter().copied().find(|&child| {
            self.nodes
                .get(child)
                .is_some_and(|node| node.name() == name)
        })
    }

    /// Resolves `path` to a node handle. Any missing segment, a file used as
    /// an intermediate segment, or a malformed path yields `None`.
    pub fn resolve(&self, path: &str) -> Option<SlabIndex> {
        let segments = path::segments(path).ok()?;
        let mut current = self.root;
        for segment in segments {
            current = self.find_child(current, segment)?;
        }
        Some(current)
    }

    pub fn get_node(&self, path: &str) -> Option<&Node> {
        self.resolve(path).and_then(|index| self.nodes.get(index))
    }

    pub fn get_directory(&self, path: &str) -> Option<&Node> {
        self.get_node(path).filter(|node| node.is_dir())
    }

    /// Resolves every segment but the last to a directory, returning it with
    /// the final name.
    pub(crate) fn resolve_parent<'p>(&self, path: &'p str) -> Result<(SlabIndex, &'p str)> {
        let (parents, name) = path::split_parent(path)?;
        let mut current = self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let prefix = || format!("/{}", parents[..=depth].join("/"));
            let child = self
                .find_child(current, segment)
                .ok_or_else(|| MetaIndexError::PathNotFound(prefix()))?;
            if !self.nodes[child].is_dir() {
                return Err(MetaIndexError::NotADirectory(prefix()));
            }
            current = child;
        }
        Ok((current, name))
    }

    /// Names of the children of the directory at `path`, in insertion order.
    pub fn list_files(&self, path: &str) -> Option<Vec<String>> {
        let dir = self.get_directory(path)?;
        Some(
            dir.children()
                .iter()
                .filter_map(|&child| self.nodes.get(child))
                .map(|node| node.name().to_string())
                .collect(),
        )
    }

    /// Snapshot of the node at `path`.
    pub fn node_info(&self, path: &str) -> Option<NodeInfo> {
        let node = self.get_node(path)?;
        let attrs = node.attributes();
        Some(NodeInfo {
            id: node.id(),
            name: attrs.name.clone(),
            file_type: node.file_type(),
            owner: attrs.owner.clone(),
            permission: attrs.permission.mode(),
            creation_time: attrs.creation_time,
            modification_time: attrs.modification_time,
            parent: self.parent_of(node).map(|parent| parent.name().to_string()),
            file: node.file_details(),
        })
    }

    /// Depth-first walk over every file in the tree, visiting children in
    /// insertion order.
    pub fn files(&self) -> FileWalk<'_> {
        self.files_under(self.root)
    }

    /// Depth-first walk over the files at or below `start`.
    pub fn files_under(&self, start: SlabIndex) -> FileWalk<'_> {
        let mut walk = FileWalk {
            nodes: &self.nodes,
            stack: Vec::new(),
            pending: None,
        };
        if let Some(node) = self.nodes.get(start) {
            if node.is_file() {
                walk.pending = Some(node);
            } else {
                walk.stack.push(node.children().iter());
            }
        }
        walk
    }

    /// Ids of files whose `field` equals `value`, found by full traversal.
    pub fn search(&self, field: ExactField, value: &str) -> Vec<NodeId> {
        self.files()
            .filter_map(Node::indexed_file)
            .filter(|file| file.exact_value(field) == value)
            .map(|file| file.id)
            .collect()
    }

    /// Ids of files whose `field` lies in `[min, max]`, found by full
    /// traversal.
    pub fn search_range(&self, field: RangeField, min: i64, max: i64) -> Vec<NodeId> {
        self.files()
            .filter_map(Node::indexed_file)
            .filter(|file| (min..=max).contains(&file.range_value(field)))
            .map(|file| file.id)
            .collect()
    }

    /// Links `node` under `parent`, returning its handle.
    ///
    /// The caller has already checked that `parent` is a directory without a
    /// child of the same name.
    pub(crate) fn attach(&mut self, parent: SlabIndex, mut node: Node) -> SlabIndex {
        node.set_parent(parent);
        let index = self.nodes.insert(node);
        let linked = self.nodes[parent].push_child(index);
        debug_assert!(linked, "attach target must be a directory");
        index
    }

    /// Unlinks `index` from its parent and frees it with all descendants.
    /// Returns the number of nodes freed; the root is never detached.
    pub(crate) fn detach(&mut self, index: SlabIndex) -> usize {
        if index == self.root {
            return 0;
        }
        let Some(parent) = self.nodes.get(index).and_then(Node::parent) else {
            return 0;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.remove_child(index);
        }

        let mut freed = 0;
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.try_remove(current) {
                stack.extend(node.children().iter().copied());
                freed += 1;
            }
        }
        freed
    }

    pub(crate) fn file_mut(&mut self, index: SlabIndex) -> Option<&mut FileMeta> {
        self.nodes.get_mut(index)?.as_file_mut()
    }
}

/// Depth-first iterator over file nodes.
pub struct FileWalk<'a> {
    nodes: &'a Slab<Node>,
    stack: Vec<slice::Iter<'a, SlabIndex>>,
    /// Set when the walk starts at a file.
    pending: Option<&'a Node>,
}

impl<'a> Iterator for FileWalk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(node) = self.pending.take() {
            return Some(node);
        }
        loop {
            let top = self.stack.last_mut()?;
            let Some(&child) = top.next() else {
                self.stack.pop();
                continue;
            };
            let Some(node) = self.nodes.get(child) else {
                continue;
            };
            if node.is_file() {
                return Some(node);
            }
            self.stack.push(node.children().iter());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::node::{NodeAttributes, Permission};
    use thin_vec::ThinVec;

    fn attrs(name: &str, owner: &str, time: i64) -> NodeAttributes {
        NodeAttributes {
            name: name.to_string(),
            owner: owner.to_string(),
            permission: Permission::DIR_DEFAULT,
            creation_time: time,
            modification_time: time,
        }
    }

    fn dir(id: u64, name: &str) -> Node {
        Node::directory(NodeId::new(id), attrs(name, "root", 0))
    }

    fn file(id: u64, name: &str, ext: &str, size: u64) -> Node {
        let meta = FileMeta {
            logical_name: name.to_string(),
            extension: ext.to_string(),
            size,
            blocks: ThinVec::new(),
        };
        Node::file(NodeId::new(id), attrs(name, "u1", id as i64 * 10), meta)
    }

    /// `/` ─ src/ ─ main.rs, lib.rs
    ///     ─ readme.md
    ///     ─ docs/ ─ guide.md
    fn sample() -> (NamespaceTree, [SlabIndex; 6]) {
        let mut tree = NamespaceTree::new(dir(1, "/"));
        let root = tree.root();
        let src = tree.attach(root, dir(2, "src"));
        let main = tree.attach(src, file(3, "main.rs", "rs", 100));
        let lib = tree.attach(src, file(4, "lib.rs", "rs", 2000));
        let readme = tree.attach(root, file(5, "readme.md", "md", 50));
        let docs = tree.attach(root, dir(6, "docs"));
        tree.attach(docs, file(7, "guide.md", "md", 700));
        (tree, [root, src, main, lib, readme, docs])
    }

    #[test]
    fn resolve_walks_segments() {
        let (tree, [root, src, main, ..]) = sample();
        assert_eq!(tree.resolve("/"), Some(root));
        assert_eq!(tree.resolve("/src"), Some(src));
        assert_eq!(tree.resolve("/src/main.rs"), Some(main));
        assert_eq!(tree.resolve("/src/missing.rs"), None);
        assert_eq!(tree.resolve("/src/main.rs/deeper"), None);
        assert_eq!(tree.resolve("src"), None);
    }

    #[test]
    fn get_directory_rejects_files() {
        let (tree, _) = sample();
        assert!(tree.get_directory("/src").is_some());
        assert!(tree.get_directory("/readme.md").is_none());
        assert!(tree.get_node("/readme.md").is_some());
    }

    #[test]
    fn resolve_parent_reports_failures() {
        let (tree, [_, src, ..]) = sample();
        assert_eq!(tree.resolve_parent("/src/new.rs").unwrap(), (src, "new.rs"));
        assert!(matches!(
            tree.resolve_parent("/nope/new.rs"),
            Err(MetaIndexError::PathNotFound(p)) if p == "/nope"
        ));
        assert!(matches!(
            tree.resolve_parent("/readme.md/new.rs"),
            Err(MetaIndexError::NotADirectory(p)) if p == "/readme.md"
        ));
        assert!(matches!(
            tree.resolve_parent("/"),
            Err(MetaIndexError::InvalidPath(_))
        ));
    }

    #[test]
    fn parent_links() {
        let (tree, [root, src, main, ..]) = sample();
        let main_node = tree.node(main).unwrap();
        assert_eq!(main_node.parent(), Some(src));
        assert_eq!(tree.parent_of(main_node).unwrap().name(), "src");
        assert!(tree.parent_of(tree.node(root).unwrap()).is_none());
    }

    #[test]
    fn files_are_visited_depth_first_in_insertion_order() {
        let (tree, [_, src, ..]) = sample();
        let names: Vec<_> = tree.files().map(Node::name).collect();
        assert_eq!(names, vec!["main.rs", "lib.rs", "readme.md", "guide.md"]);

        let under_src: Vec<_> = tree.files_under(src).map(Node::name).collect();
        assert_eq!(under_src, vec!["main.rs", "lib.rs"]);
    }

    #[test]
    fn traversal_search_matches_fields() {
        let (tree, _) = sample();
        let ids = |raw: &[u64]| raw.iter().copied().map(NodeId::new).collect::<Vec<_>>();

        assert_eq!(tree.search(ExactField::Extension, "md"), ids(&[5, 7]));
        assert_eq!(tree.search(ExactField::Owner, "u1").len(), 4);
        assert!(tree.search(ExactField::Owner, "root").is_empty());

        assert_eq!(tree.search_range(RangeField::Size, 50, 700), ids(&[3, 5, 7]));
        assert_eq!(tree.search_range(RangeField::Creation, 40, 50), ids(&[4, 5]));
        assert!(tree.search_range(RangeField::Modification, 100, 0).is_empty());
    }

    #[test]
    fn list_files_keeps_insertion_order() {
        let (tree, _) = sample();
        assert_eq!(
            tree.list_files("/").unwrap(),
            vec!["src".to_string(), "readme.md".to_string(), "docs".to_string()]
        );
        assert!(tree.list_files("/readme.md").is_none());
    }

    #[test]
    fn detach_frees_subtree() {
        let (mut tree, [root, src, ..]) = sample();
        assert_eq!(tree.len(), 7);

        assert_eq!(tree.detach(src), 3);
        assert_eq!(tree.len(), 4);
        assert!(tree.resolve("/src").is_none());
        assert!(tree.resolve("/src/main.rs").is_none());
        assert_eq!(tree.list_files("/").unwrap(), vec!["readme.md", "docs"]);

        assert_eq!(tree.detach(root), 0);
    }

    #[test]
    fn node_info_snapshot() {
        let (tree, _) = sample();
        let info = tree.node_info("/docs/guide.md").unwrap();
        assert_eq!(info.id, NodeId::new(7));
        assert_eq!(info.parent.as_deref(), Some("docs"));
        assert_eq!(info.file.as_ref().unwrap().extension, "md");

        let root = tree.node_info("/").unwrap();
        assert_eq!(root.parent, None);
        assert!(root.file.is_none());
    }
}
