//! Namespace node model.
//!
//! Every node carries an id, a parent handle and the shared attributes
//! (name, owner, permission, timestamps). Directories add an ordered child
//! list; files add their content metadata.

use bitflags::bitflags;
use thin_vec::ThinVec;

use crate::index::IndexedFile;
use crate::storage::SlabIndex;
use crate::types::{FileDetails, FileType, NodeId};

bitflags! {
    /// POSIX-style mode bits. Stored on every node, never enforced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permission: u32 {
        const SETUID = 0o4000;
        const SETGID = 0o2000;
        const STICKY = 0o1000;
        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXEC = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const OTHER_READ = 0o004;
        const OTHER_WRITE = 0o002;
        const OTHER_EXEC = 0o001;
    }
}

impl Permission {
    /// Default mode of a new file (`rw-r--r--`).
    pub const FILE_DEFAULT: Self = Self::from_bits_retain(0o644);
    /// Default mode of a new directory (`rwxr-xr-x`).
    pub const DIR_DEFAULT: Self = Self::from_bits_retain(0o755);

    /// Wraps raw mode bits, keeping any bit the flags do not name.
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self::from_bits_retain(mode)
    }

    #[inline]
    pub const fn mode(self) -> u32 {
        self.bits()
    }
}

/// Attributes shared by files and directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttributes {
    /// Single path segment, unique among siblings.
    pub name: String,
    pub owner: String,
    pub permission: Permission,
    /// Milliseconds since the Unix epoch.
    pub creation_time: i64,
    /// Milliseconds since the Unix epoch. Set at construction only.
    pub modification_time: i64,
}

/// Content metadata of a file. Blocks are opaque identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub logical_name: String,
    pub extension: String,
    pub size: u64,
    pub blocks: ThinVec<String>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Children in insertion order.
    Directory(ThinVec<SlabIndex>),
    File(FileMeta),
}

/// A node stored in the namespace arena.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    /// Containing directory; `None` only for the root.
    parent: Option<SlabIndex>,
    attrs: NodeAttributes,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn directory(id: NodeId, attrs: NodeAttributes) -> Self {
        Self {
            id,
            parent: None,
            attrs,
            kind: NodeKind::Directory(ThinVec::new()),
        }
    }

    pub(crate) fn file(id: NodeId, attrs: NodeAttributes, meta: FileMeta) -> Self {
        Self {
            id,
            parent: None,
            attrs,
            kind: NodeKind::File(meta),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<SlabIndex> {
        self.parent
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.attrs.name
    }

    #[inline]
    pub fn owner(&self) -> &str {
        &self.attrs.owner
    }

    #[inline]
    pub fn attributes(&self) -> &NodeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn file_type(&self) -> FileType {
        match self.kind {
            NodeKind::Directory(_) => FileType::Directory,
            NodeKind::File(_) => FileType::File,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File(_))
    }

    pub fn as_file(&self) -> Option<&FileMeta> {
        match &self.kind {
            NodeKind::File(meta) => Some(meta),
            NodeKind::Directory(_) => None,
        }
    }

    /// Child handles in insertion order; empty for files.
    pub fn children(&self) -> &[SlabIndex] {
        match &self.kind {
            NodeKind::Directory(children) => children.as_slice(),
            NodeKind::File(_) => &[],
        }
    }

    /// The attributes the metadata index keys on; `None` for directories.
    pub fn indexed_file(&self) -> Option<IndexedFile<'_>> {
        let meta = self.as_file()?;
        Some(IndexedFile {
            id: self.id,
            extension: &meta.extension,
            owner: &self.attrs.owner,
            size: meta.size,
            creation_time: self.attrs.creation_time,
            modification_time: self.attrs.modification_time,
        })
    }

    pub(crate) fn file_details(&self) -> Option<FileDetails> {
        self.as_file().map(|meta| FileDetails {
            logical_name: meta.logical_name.clone(),
            extension: meta.extension.clone(),
            size: meta.size,
            blocks: meta.blocks.iter().cloned().collect(),
        })
    }

    pub(crate) fn set_parent(&mut self, parent: SlabIndex) {
        self.parent = Some(parent);
    }

    pub(crate) fn as_file_mut(&mut self) -> Option<&mut FileMeta> {
        match &mut self.kind {
            NodeKind::File(meta) => Some(meta),
            NodeKind::Directory(_) => None,
        }
    }

    pub(crate) fn push_child(&mut self, child: SlabIndex) -> bool {
        match &mut self.kind {
            NodeKind::Directory(children) => {
                children.push(child);
                true
            }
            NodeKind::File(_) => false,
        }
    }

    /// Removes a child handle, returning true if it was present.
    pub(crate) fn remove_child(&mut self, child: SlabIndex) -> bool {
        let NodeKind::Directory(children) = &mut self.kind else {
            return false;
        };
        match children.iter().position(|&c| c == child) {
            Some(pos) => {
                children.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Attributes of a file to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub owner: String,
    pub permission: Permission,
    pub logical_name: String,
    pub extension: String,
    pub size: u64,
    pub blocks: Vec<String>,
    /// Defaults to the time of insertion.
    pub creation_time: Option<i64>,
    /// Defaults to the time of insertion.
    pub modification_time: Option<i64>,
}

impl NewFile {
    pub fn new(
        owner: impl Into<String>,
        logical_name: impl Into<String>,
        extension: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            owner: owner.into(),
            permission: Permission::FILE_DEFAULT,
            logical_name: logical_name.into(),
            extension: extension.into(),
            size,
            blocks: Vec::new(),
            creation_time: None,
            modification_time: None,
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_blocks<I, S>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocks = blocks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_times(mut self, creation_time: i64, modification_time: i64) -> Self {
        self.creation_time = Some(creation_time);
        self.modification_time = Some(modification_time);
        self
    }
}

/// Replacement content metadata for an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    pub logical_name: String,
    pub extension: String,
    pub size: u64,
    pub blocks: Vec<String>,
}

impl FileUpdate {
    pub fn new(logical_name: impl Into<String>, extension: impl Into<String>, size: u64) -> Self {
        Self {
            logical_name: logical_name.into(),
            extension: extension.into(),
            size,
            blocks: Vec::new(),
        }
    }

    pub fn with_blocks<I, S>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocks = blocks.into_iter().map(Into::into).collect();
        self
    }
}

impl From<FileUpdate> for FileMeta {
    fn from(update: FileUpdate) -> Self {
        Self {
            logical_name: update.logical_name,
            extension: update.extension,
            size: update.size,
            blocks: update.blocks.into_iter().collect(),
        }
    }
}
