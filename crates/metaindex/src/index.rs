//! Secondary metadata indexes.
//!
//! ## Module Structure
//!
//! - `field` - Closed sets of indexed fields (`ExactField`, `RangeField`)
//! - `exact` - Value to posting list maps for exact-match lookups
//! - `shard` - A single numeric interval with its posting lists
//! - `range` - Per-field shard sequences with split and merge maintenance
//! - `facade` - `MetadataIndex`, the locked entry point used by the namespace

mod exact;
mod facade;
mod field;
mod range;
mod shard;

pub use exact::ExactIndex;
pub use facade::{IndexedFile, MetadataIndex};
pub use field::{ExactField, RangeField};
pub use range::{RangeIndex, ShardChange, ShardedRange};
pub use shard::RangeShard;
