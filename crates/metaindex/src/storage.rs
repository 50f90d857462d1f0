//! Storage primitives for the namespace and its indexes.
//!
//! - Varint codec for node ids
//! - Posting lists built on that codec
//! - Free-list arena owning the namespace nodes

mod posting;
mod slab;
pub mod varint;

pub use posting::PostingList;
pub use slab::{Slab, SlabIndex};
