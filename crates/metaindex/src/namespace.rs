//! In-memory directory tree.
//!
//! ## Module Structure
//!
//! - `node` - Node model, permission bits and file builders
//! - `ids` - Atomic node id allocator
//! - `path` - Absolute path parsing
//! - `tree` - `NamespaceTree`, the unlocked arena-backed tree
//! - `manager` - `Namespace`, the locked coordinator that keeps the index in sync

mod ids;
mod manager;
mod node;
mod path;
mod tree;

pub use ids::IdAllocator;
pub use manager::Namespace;
pub use node::{FileMeta, FileUpdate, NewFile, Node, NodeAttributes, NodeKind, Permission};
pub use tree::{FileWalk, NamespaceTree};
