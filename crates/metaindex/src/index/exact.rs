//! Exact-match inverted index: field → value → posting list.

use fnv::FnvHashMap;

use super::field::ExactField;
use crate::error::Result;
use crate::storage::PostingList;
use crate::types::NodeId;

type ValueMap = FnvHashMap<String, PostingList>;

/// One value map per [`ExactField`], all present from construction.
#[derive(Debug, Default)]
pub struct ExactIndex {
    fields: [ValueMap; ExactField::ALL.len()],
}

impl ExactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to the posting list of `(field, value)`.
    pub fn add(&mut self, field: ExactField, value: &str, id: NodeId) {
        let values = &mut self.fields[field.slot()];
        match values.get_mut(value) {
            Some(list) => list.push(id),
            None => {
                values.insert(value.to_string(), PostingList::with_single(id));
            }
        }
    }

    /// Removes the first occurrence of `id` under `(field, value)`.
    ///
    /// A value whose list becomes empty is dropped from the map, so a
    /// removed value is indistinguishable from one never added.
    pub fn remove(&mut self, field: ExactField, value: &str, id: NodeId) -> Result<bool> {
        let values = &mut self.fields[field.slot()];
        let Some(list) = values.get_mut(value) else {
            return Ok(false);
        };
        let removed = list.remove(id)?;
        if list.is_empty() {
            values.remove(value);
        }
        Ok(removed)
    }

    /// Decodes the ids stored under `(field, value)`; empty if absent.
    pub fn lookup(&self, field: ExactField, value: &str) -> Result<Vec<NodeId>> {
        match self.fields[field.slot()].get(value) {
            Some(list) => list.decode(),
            None => Ok(Vec::new()),
        }
    }

    /// Number of distinct values recorded for `field`.
    pub fn value_count(&self, field: ExactField) -> usize {
        self.fields[field.slot()].len()
    }
}
