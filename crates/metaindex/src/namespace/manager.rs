//! Namespace - the locked coordinator over the tree and its metadata index.
//!
//! Lock order is fixed: the tree lock is always taken first and the index
//! lock, when needed, strictly inside it. Mutations that touch the index go
//! through `WriteScope`, which owns the tree write guard, so an index update
//! cannot happen outside a tree write scope.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ids::IdAllocator;
use super::node::{FileUpdate, NewFile, Node, NodeAttributes, Permission};
use super::path;
use super::tree::NamespaceTree;
use crate::config::NamespaceConfig;
use crate::error::{MetaIndexError, Result};
use crate::index::{ExactField, MetadataIndex, RangeField};
use crate::storage::SlabIndex;
use crate::types::{InsertTiming, NodeId, NodeInfo};

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Tree write guard paired with the attached index.
struct WriteScope<'a> {
    tree: RwLockWriteGuard<'a, NamespaceTree>,
    index: &'a MetadataIndex,
}

impl WriteScope<'_> {
    /// Resolves the parent of `path` and checks the final name is free.
    fn vacant_slot<'p>(&self, path: &'p str) -> Result<(SlabIndex, &'p str)> {
        let (parent, name) = self.tree.resolve_parent(path)?;
        if self.tree.find_child(parent, name).is_some() {
            return Err(MetaIndexError::NameCollision(path.to_string()));
        }
        Ok((parent, name))
    }

    fn index_file(&self, at: SlabIndex) {
        if let Some(file) = self.tree.node(at).and_then(Node::indexed_file) {
            self.index.add_file(&file);
        }
    }

    /// Removes the index entries of every file at or below `at`.
    fn unindex(&self, at: SlabIndex) -> Result<()> {
        for file in self.tree.files_under(at).filter_map(Node::indexed_file) {
            self.index.remove_file(&file)?;
        }
        Ok(())
    }
}

/// An in-memory directory tree kept in sync with a [`MetadataIndex`].
///
/// # Example
///
/// ```
/// use metaindex::{ExactField, Namespace, NewFile, Permission, RangeField};
///
/// let ns = Namespace::new();
/// ns.create_directory("/a", "u1", Permission::DIR_DEFAULT)?;
/// let id = ns.create_file("/a/doc.txt", NewFile::new("u1", "doc", "txt", 500))?;
///
/// assert_eq!(ns.search_in_tree(ExactField::Extension, "txt"), vec![id]);
/// assert_eq!(ns.index().search_by_range(RangeField::Size, 0, 1000)?, vec![id]);
/// # Ok::<(), metaindex::MetaIndexError>(())
/// ```
#[derive(Debug)]
pub struct Namespace {
    tree: RwLock<NamespaceTree>,
    index: Arc<MetadataIndex>,
    ids: IdAllocator,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespace {
    /// Creates an empty namespace with a fresh index and default settings.
    pub fn new() -> Self {
        Self::with_index(Arc::new(MetadataIndex::new()))
    }

    pub fn with_index(index: Arc<MetadataIndex>) -> Self {
        Self::with_config(NamespaceConfig::default(), index)
    }

    pub fn with_config(config: NamespaceConfig, index: Arc<MetadataIndex>) -> Self {
        let ids = IdAllocator::new();
        let now = now_millis();
        let root = Node::directory(
            ids.allocate(),
            NodeAttributes {
                name: "/".to_string(),
                owner: config.root_owner,
                permission: Permission::from_mode(config.root_permission),
                creation_time: now,
                modification_time: now,
            },
        );
        Self {
            tree: RwLock::new(NamespaceTree::new(root)),
            index,
            ids,
        }
    }

    /// The index kept in sync with this tree.
    pub fn index(&self) -> &Arc<MetadataIndex> {
        &self.index
    }

    /// Takes the tree reader lock for a multi-step read.
    pub fn read(&self) -> RwLockReadGuard<'_, NamespaceTree> {
        self.tree.read()
    }

    fn write(&self) -> WriteScope<'_> {
        WriteScope {
            tree: self.tree.write(),
            index: &self.index,
        }
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    pub fn create_directory(
        &self,
        path: &str,
        owner: impl Into<String>,
        permission: Permission,
    ) -> Result<NodeId> {
        let mut scope = self.write();
        let (parent, name) = scope.vacant_slot(path)?;

        let id = self.ids.allocate();
        let now = now_millis();
        let node = Node::directory(
            id,
            NodeAttributes {
                name: name.to_string(),
                owner: owner.into(),
                permission,
                creation_time: now,
                modification_time: now,
            },
        );
        scope.tree.attach(parent, node);
        log::debug!("created directory {path} ({id})");
        Ok(id)
    }

    /// Links a new file under an existing directory and indexes it in the same
    /// write scope.
    pub fn create_file(&self, path: &str, file: NewFile) -> Result<NodeId> {
        self.insert_file(path, file, true, None)
    }

    /// [`create_file`](Self::create_file), recording how long the tree link
    /// and the index update each took.
    pub fn create_file_timed(
        &self,
        path: &str,
        file: NewFile,
        timing: &mut InsertTiming,
    ) -> Result<NodeId> {
        self.insert_file(path, file, true, Some(timing))
    }

    /// Links a new file without indexing it. The index stays behind the tree
    /// until [`rebuild_index`](Self::rebuild_index) runs.
    pub fn create_file_unindexed(&self, path: &str, file: NewFile) -> Result<NodeId> {
        self.insert_file(path, file, false, None)
    }

    fn insert_file(
        &self,
        path: &str,
        file: NewFile,
        indexed: bool,
        timing: Option<&mut InsertTiming>,
    ) -> Result<NodeId> {
        let started = Instant::now();
        let mut scope = self.write();
        let (parent, name) = scope.vacant_slot(path)?;

        let id = self.ids.allocate();
        let now = now_millis();
        let attrs = NodeAttributes {
            name: name.to_string(),
            owner: file.owner,
            permission: file.permission,
            creation_time: file.creation_time.unwrap_or(now),
            modification_time: file.modification_time.unwrap_or(now),
        };
        let meta = FileUpdate {
            logical_name: file.logical_name,
            extension: file.extension,
            size: file.size,
            blocks: file.blocks,
        };
        let at = scope.tree.attach(parent, Node::file(id, attrs, meta.into()));

        let linked = Instant::now();
        if indexed {
            scope.index_file(at);
        }
        if let Some(timing) = timing {
            timing.tree = linked.duration_since(started);
            timing.index = linked.elapsed();
        }
        log::debug!("created file {path} ({id})");
        Ok(id)
    }

    /// Removes the node at `path` with everything beneath it, dropping the
    /// index entries of every removed file first.
    ///
    /// A missing node or missing ancestor yields `Ok(false)`. The root cannot
    /// be deleted.
    ///
    /// # Errors
    ///
    /// A corruption error from the index aborts the delete with the tree
    /// unchanged. The index may be partly updated at that point: entries of
    /// files visited before the faulty posting list are already gone.
    pub fn delete_node(&self, path: &str) -> Result<bool> {
        let mut scope = self.write();
        let (parent, name) = match scope.tree.resolve_parent(path) {
            Ok(found) => found,
            Err(MetaIndexError::PathNotFound(_) | MetaIndexError::NotADirectory(_)) => {
                return Ok(false)
            }
            Err(err) => return Err(err),
        };
        let Some(target) = scope.tree.find_child(parent, name) else {
            return Ok(false);
        };

        scope.unindex(target)?;
        let freed = scope.tree.detach(target);
        log::debug!("removed {path} ({freed} nodes)");
        Ok(true)
    }

    /// Replaces the content metadata of the file at `path`, moving its index
    /// entries from the old values to the new ones in one write scope.
    ///
    /// Owner, permission and timestamps are left untouched.
    ///
    /// # Errors
    ///
    /// A corruption error from the index leaves the file in the tree with its
    /// old metadata, but the index may be partly updated: fields removed
    /// before the faulty posting list no longer list the file.
    pub fn update_file(&self, path: &str, update: FileUpdate) -> Result<NodeId> {
        path::segments(path)?;
        let mut scope = self.write();
        let at = scope
            .tree
            .resolve(path)
            .ok_or_else(|| MetaIndexError::PathNotFound(path.to_string()))?;
        let node = scope
            .tree
            .node(at)
            .ok_or_else(|| MetaIndexError::PathNotFound(path.to_string()))?;
        if !node.is_file() {
            log::warn!("update rejected, {path} is not a file");
            return Err(MetaIndexError::NotAFile(path.to_string()));
        }
        let id = node.id();

        scope.unindex(at)?;
        if let Some(meta) = scope.tree.file_mut(at) {
            *meta = update.into();
        }
        scope.index_file(at);
        log::debug!("updated file {path} ({id})");
        Ok(id)
    }

    /// Borrows the node at `path`. The tree reader lock is held until the
    /// guard is dropped.
    pub fn get_node(&self, path: &str) -> Option<MappedRwLockReadGuard<'_, Node>> {
        RwLockReadGuard::try_map(self.tree.read(), |tree| tree.get_node(path)).ok()
    }

    pub fn get_directory(&self, path: &str) -> Option<MappedRwLockReadGuard<'_, Node>> {
        RwLockReadGuard::try_map(self.tree.read(), |tree| tree.get_directory(path)).ok()
    }

    pub fn node_info(&self, path: &str) -> Option<NodeInfo> {
        self.tree.read().node_info(path)
    }

    pub fn list_files(&self, path: &str) -> Option<Vec<String>> {
        self.tree.read().list_files(path)
    }

    /// Exact-match search by full traversal, bypassing the index.
    pub fn search_in_tree(&self, field: ExactField, value: &str) -> Vec<NodeId> {
        self.tree.read().search(field, value)
    }

    /// Inclusive range search by full traversal, bypassing the index.
    pub fn search_in_tree_range(&self, field: RangeField, min: i64, max: i64) -> Vec<NodeId> {
        self.tree.read().search_range(field, min, max)
    }

    /// [`search_in_tree`](Self::search_in_tree) keyed by tag; unknown tags
    /// match nothing.
    pub fn search_in_tree_tagged(&self, tag: &str, value: &str) -> Vec<NodeId> {
        ExactField::from_tag(tag)
            .map(|field| self.search_in_tree(field, value))
            .unwrap_or_default()
    }

    pub fn search_in_tree_range_tagged(&self, tag: &str, min: i64, max: i64) -> Vec<NodeId> {
        RangeField::from_tag(tag)
            .map(|field| self.search_in_tree_range(field, min, max))
            .unwrap_or_default()
    }

    /// Adds every file in the tree to `index`, returning how many were added.
    ///
    /// Runs under the tree reader lock, so concurrent mutations wait until the
    /// rebuild is done. `index` is expected to be fresh: files already present
    /// in it are recorded a second time.
    pub fn rebuild_index(&self, index: &MetadataIndex) -> usize {
        let tree = self.tree.read();
        let mut added = 0;
        for file in tree.files().filter_map(Node::indexed_file) {
            index.add_file(&file);
            added += 1;
        }
        log::debug!("rebuilt index with {added} files");
        added
    }
}
