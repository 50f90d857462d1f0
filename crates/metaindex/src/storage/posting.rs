//! Varint-encoded posting lists.

use crate::error::Result;
use crate::types::NodeId;

use super::varint::{self, VarintIter};

/// The node ids associated with one index key, stored as consecutive varints.
///
/// Appends are O(1) on the byte buffer. Removal decodes the whole list,
/// drops the first matching id and re-encodes the remainder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    bytes: Vec<u8>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list holding a single id.
    pub fn with_single(id: NodeId) -> Self {
        let mut list = Self::new();
        list.push(id);
        list
    }

    /// Encodes `ids` in order.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut list = Self::new();
        for id in ids {
            list.push(id);
        }
        list
    }

    /// Appends `id` without checking for duplicates.
    #[inline]
    pub fn push(&mut self, id: NodeId) {
        varint::encode_into(&mut self.bytes, id.get());
    }

    /// Appends every id of `other`, preserving its order.
    pub fn append(&mut self, other: &PostingList) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// Iterates over the decoded ids.
    pub fn iter(&self) -> impl Iterator<Item = Result<NodeId>> + '_ {
        VarintIter::new(&self.bytes).map(|item| item.map(NodeId::new))
    }

    /// Decodes the full list.
    pub fn decode(&self) -> Result<Vec<NodeId>> {
        self.iter().collect()
    }

    /// Decodes the full list onto the end of `out`.
    pub fn decode_into(&self, out: &mut Vec<NodeId>) -> Result<()> {
        for id in self.iter() {
            out.push(id?);
        }
        Ok(())
    }

    /// Removes the first occurrence of `id`, returning whether it was present.
    ///
    /// The buffer is left untouched if the list fails to decode.
    pub fn remove(&mut self, id: NodeId) -> Result<bool> {
        let mut ids = self.decode()?;
        let Some(pos) = ids.iter().position(|&existing| existing == id) else {
            return Ok(false);
        };
        ids.remove(pos);
        *self = Self::from_ids(ids);
        Ok(true)
    }

    /// Returns true when no ids are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl FromIterator<NodeId> for PostingList {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn push_and_decode_preserve_order() {
        let list: PostingList = ids(&[3, 1, 500, 2]).into_iter().collect();
        assert_eq!(list.decode().unwrap(), ids(&[3, 1, 500, 2]));
        // 3, 1, 2 take one byte each, 500 takes two.
        assert_eq!(list.bytes.len(), 5);
    }

    #[test]
    fn remove_drops_first_occurrence_only() {
        let mut list = PostingList::from_ids(ids(&[7, 8, 7]));
        assert!(list.remove(NodeId::new(7)).unwrap());
        assert_eq!(list.decode().unwrap(), ids(&[8, 7]));

        assert!(!list.remove(NodeId::new(99)).unwrap());
        assert_eq!(list.decode().unwrap(), ids(&[8, 7]));
    }

    #[test]
    fn removing_last_id_empties_list() {
        let mut list = PostingList::with_single(NodeId::new(1));
        assert!(list.remove(NodeId::new(1)).unwrap());
        assert!(list.is_empty());
        assert!(list.decode().unwrap().is_empty());
    }

    #[test]
    fn append_concatenates() {
        let mut left = PostingList::from_ids(ids(&[1, 2]));
        let right = PostingList::from_ids(ids(&[300]));
        left.append(&right);
        assert_eq!(left.decode().unwrap(), ids(&[1, 2, 300]));
    }

    #[test]
    fn corrupted_list_is_not_modified_by_remove() {
        let mut list = PostingList {
            bytes: vec![0x01, 0x80],
        };
        assert!(list.remove(NodeId::new(1)).is_err());
        assert_eq!(list.bytes, vec![0x01, 0x80]);
    }
}
