//! In-memory file-system metadata namespace with secondary indexes.
//!
//! This crate provides:
//! - A directory tree of attributed files and directories behind one
//!   reader/writer lock
//! - Exact-match indexes on extension and owner
//! - Range-sharded indexes on size and timestamps, with shard split and merge
//! - Varint-encoded posting lists
//!
//! Tree mutations that affect indexed attributes update the index inside the
//! same tree write scope, so the two never disagree once a mutation returns.

pub mod config;
pub mod error;
pub mod index;
pub mod namespace;
pub mod storage;
pub mod types;

// Re-export main types
pub use config::{IndexConfig, NamespaceConfig};
pub use error::{MetaIndexError, Result};
pub use index::{ExactField, IndexedFile, MetadataIndex, RangeField};
pub use namespace::{FileUpdate, Namespace, NewFile, Permission};
pub use types::{FileDetails, FileType, InsertTiming, NodeId, NodeInfo, ShardInfo};
