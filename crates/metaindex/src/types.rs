//! Public value types shared by the namespace and the metadata index.
//!
//! These are owned snapshots: they are produced while a lock is held and
//! stay valid after it is released.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Process-unique identifier of a namespace node.
///
/// Ids are opaque: they are handed out by an atomic counter and carry no
/// ordering meaning beyond uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// File-only part of a [`NodeInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetails {
    pub logical_name: String,
    pub extension: String,
    pub size: u64,
    pub blocks: Vec<String>,
}

/// Snapshot of a node's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub file_type: FileType,
    pub owner: String,
    /// Mode bits as stored; never enforced.
    pub permission: u32,
    /// Milliseconds since the Unix epoch.
    pub creation_time: i64,
    /// Milliseconds since the Unix epoch.
    pub modification_time: i64,
    /// Name of the containing directory; `None` for the root.
    pub parent: Option<String>,
    /// Present for files only.
    pub file: Option<FileDetails>,
}

/// Bounds and population of one range shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardInfo {
    pub start: i64,
    pub end: i64,
    /// Number of distinct values held by the shard.
    pub entries: usize,
}

impl fmt::Display for ShardInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range shard [{}, {}], size: {}",
            self.start, self.end, self.entries
        )
    }
}

/// Time spent in each phase of an indexed file insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertTiming {
    /// Linking the file into its parent directory.
    pub tree: Duration,
    /// Updating the metadata index.
    pub index: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_serializes_as_number() {
        let json = serde_json::to_string(&NodeId::new(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(NodeId::new(42).to_string(), "42");
    }

    #[test]
    fn shard_info_display() {
        let info = ShardInfo {
            start: 0,
            end: 1000,
            entries: 12,
        };
        assert_eq!(info.to_string(), "Range shard [0, 1000], size: 12");
    }

    #[test]
    fn file_type_serializes_lowercase() {
        let json = serde_json::to_string(&FileType::Directory).unwrap();
        assert_eq!(json, "\"directory\"");
        assert_eq!(FileType::File.as_str(), "file");
    }
}
