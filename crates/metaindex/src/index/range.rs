//! Range-sharded index.
//!
//! Each numeric field owns a sequence of [`RangeShard`]s created on demand.
//! Maintenance happens at exactly two points:
//!
//! - **Split**: after an insert pushes a shard's entry count above the
//!   threshold, the shard is bisected and the upper half is appended to the
//!   sequence. The sequence is not re-sorted.
//! - **Merge pass**: after an insert finds no containing shard, a new shard
//!   `[value, value + threshold]` is appended, the sequence is sorted by
//!   `start`, and adjacent or overlapping shards are coalesced.
//!
//! Removal only edits posting lists; it never deletes or rebalances shards.
//! Shard lookup is a linear scan for the first containing shard.

use super::field::RangeField;
use super::shard::RangeShard;
use crate::config::IndexConfig;
use crate::error::Result;
use crate::types::{NodeId, ShardInfo};

/// What an insert did to the shard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardChange {
    /// The value landed in an existing shard.
    Inserted,
    /// The containing shard exceeded the threshold and was bisected.
    Split,
    /// A new shard was created and the merge pass ran.
    Created,
}

/// The shard sequence of one numeric field.
#[derive(Debug, Clone)]
pub struct ShardedRange {
    shards: Vec<RangeShard>,
    threshold: usize,
    span: i64,
}

impl ShardedRange {
    /// A zero threshold is treated as one, so a split always has at least two
    /// distinct values to separate.
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            shards: Vec::new(),
            threshold: config.shard_threshold.max(1),
            span: config.shard_span(),
        }
    }

    pub fn shards(&self) -> &[RangeShard] {
        &self.shards
    }

    /// Total number of distinct values across shards.
    pub fn entry_count(&self) -> usize {
        self.shards.iter().map(RangeShard::len).sum()
    }

    pub fn add(&mut self, value: i64, id: NodeId) -> ShardChange {
        if let Some(pos) = self.position_of(value) {
            let shard = &mut self.shards[pos];
            shard.insert(value, id);
            if shard.len() > self.threshold {
                let upper = shard.split();
                self.shards.push(upper);
                return ShardChange::Split;
            }
            return ShardChange::Inserted;
        }

        let mut shard = RangeShard::new(value, value.saturating_add(self.span));
        shard.insert(value, id);
        self.shards.push(shard);
        self.merge_pass();
        ShardChange::Created
    }

    /// Removes `id` from the first shard containing `value`.
    pub fn remove(&mut self, value: i64, id: NodeId) -> Result<bool> {
        match self.position_of(value) {
            Some(pos) => self.shards[pos].remove(value, id),
            None => Ok(false),
        }
    }

    /// Collects the ids of every value in `[min, max]` across all overlapping
    /// shards. Results are concatenated in shard order without de-duplication.
    pub fn query(&self, min: i64, max: i64) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for shard in self.shards.iter().filter(|shard| shard.overlaps(min, max)) {
            shard.collect_range(min, max, &mut out)?;
        }
        Ok(out)
    }

    pub fn infos(&self) -> Vec<ShardInfo> {
        self.shards.iter().map(RangeShard::info).collect()
    }

    fn position_of(&self, value: i64) -> Option<usize> {
        self.shards.iter().position(|shard| shard.contains(value))
    }

    /// Sorts shards by start and coalesces every run whose members touch or
    /// overlap (`acc.end + 1 >= next.start`).
    fn merge_pass(&mut self) {
        let mut shards = std::mem::take(&mut self.shards);
        shards.sort_by_key(RangeShard::start);

        let before = shards.len();
        let mut merged: Vec<RangeShard> = Vec::with_capacity(before);
        for shard in shards {
            match merged.last_mut() {
                Some(acc) if acc.end().saturating_add(1) >= shard.start() => acc.absorb(shard),
                _ => merged.push(shard),
            }
        }

        if merged.len() != before {
            log::debug!("merge pass coalesced {} shards into {}", before, merged.len());
        }
        self.shards = merged;
    }
}

/// Shard sequences for every [`RangeField`].
#[derive(Debug, Clone)]
pub struct RangeIndex {
    fields: [ShardedRange; RangeField::ALL.len()],
}

impl RangeIndex {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            fields: RangeField::ALL.map(|_| ShardedRange::new(config)),
        }
    }

    pub fn add(&mut self, field: RangeField, value: i64, id: NodeId) {
        let shards = &mut self.fields[field.slot()];
        match shards.add(value, id) {
            ShardChange::Inserted => {}
            ShardChange::Split => log::debug!(
                "split {} shard at value {}; {} shards",
                field,
                value,
                shards.shards().len()
            ),
            ShardChange::Created => log::debug!(
                "new {} shard for value {}; {} shards after merge",
                field,
                value,
                shards.shards().len()
            ),
        }
    }

    pub fn remove(&mut self, field: RangeField, value: i64, id: NodeId) -> Result<bool> {
        self.fields[field.slot()].remove(value, id)
    }

    pub fn query(&self, field: RangeField, min: i64, max: i64) -> Result<Vec<NodeId>> {
        self.fields[field.slot()].query(min, max)
    }

    pub fn field(&self, field: RangeField) -> &ShardedRange {
        &self.fields[field.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw)
    }

    fn bounds(range: &ShardedRange) -> Vec<(i64, i64)> {
        range.shards().iter().map(|s| (s.start(), s.end())).collect()
    }

    fn range() -> ShardedRange {
        ShardedRange::new(&IndexConfig::default())
    }

    #[test]
    fn zero_threshold_never_inverts_shards() {
        let mut range = ShardedRange::new(&IndexConfig { shard_threshold: 0 });
        for n in 0..5 {
            range.add(7, id(n));
        }
        assert_eq!(bounds(&range), vec![(7, 7)]);
        assert_eq!(range.query(7, 7).unwrap().len(), 5);

        range.add(8, id(9));
        for shard in range.shards() {
            assert!(shard.start() <= shard.end());
        }
    }

    #[test]
    fn first_value_creates_threshold_wide_shard() {
        let mut range = range();
        assert_eq!(range.add(100, id(1)), ShardChange::Created);
        assert_eq!(bounds(&range), vec![(100, 1100)]);
        assert_eq!(range.add(1100, id(2)), ShardChange::Inserted);
        assert_eq!(bounds(&range), vec![(100, 1100)]);
    }

    #[test]
    fn exceeding_threshold_splits_once() {
        let mut range = range();
        for value in 0..=999 {
            range.add(value, id(value as u64));
        }
        assert_eq!(range.shards().len(), 1);
        assert_eq!(range.entry_count(), 1000);

        assert_eq!(range.add(1000, id(1000)), ShardChange::Split);
        assert_eq!(bounds(&range), vec![(0, 500), (501, 1000)]);
        assert_eq!(range.entry_count(), 1001);
        assert_eq!(range.query(0, 1000).unwrap().len(), 1001);
    }

    #[test]
    fn adjacent_new_shard_is_coalesced() {
        let mut range = range();
        range.add(0, id(1));
        assert_eq!(bounds(&range), vec![(0, 1000)]);

        range.add(1001, id(2));
        assert_eq!(bounds(&range), vec![(0, 2001)]);
        assert_eq!(range.query(0, 2001).unwrap(), vec![id(1), id(2)]);
    }

    #[test]
    fn distant_shards_stay_separate_and_sorted() {
        let mut range = range();
        range.add(5000, id(1));
        range.add(0, id(2));
        assert_eq!(bounds(&range), vec![(0, 1000), (5000, 6000)]);
    }

    #[test]
    fn overlapping_new_shard_absorbs_following_shard() {
        let mut range = range();
        range.add(2000, id(1));
        range.add(1500, id(2));
        assert_eq!(bounds(&range), vec![(1500, 3000)]);
        assert_eq!(range.query(1500, 1500).unwrap(), vec![id(2)]);
        assert_eq!(range.query(2000, 2000).unwrap(), vec![id(1)]);
    }

    #[test]
    fn split_does_not_resort() {
        let config = IndexConfig { shard_threshold: 4 };
        let mut range = ShardedRange::new(&config);
        range.add(100, id(1));
        range.add(0, id(2));
        assert_eq!(bounds(&range), vec![(0, 4), (100, 104)]);

        for (n, value) in [1, 2, 3, 4].into_iter().enumerate() {
            range.add(value, id(10 + n as u64));
        }
        // [0, 4] split into [0, 2] and [3, 4]; the upper half is appended.
        assert_eq!(bounds(&range), vec![(0, 2), (100, 104), (3, 4)]);
        assert_eq!(range.query(0, 4).unwrap().len(), 5);
    }

    #[test]
    fn remove_keeps_emptied_shards() {
        let mut range = range();
        range.add(10, id(1));
        assert!(range.remove(10, id(1)).unwrap());
        assert_eq!(range.shards().len(), 1);
        assert_eq!(range.entry_count(), 0);
        assert!(range.query(0, 100).unwrap().is_empty());

        assert!(!range.remove(-50, id(1)).unwrap());
    }

    #[test]
    fn query_outside_all_shards_is_empty() {
        let mut range = range();
        range.add(500, id(1));
        assert!(range.query(501, 1000).unwrap().is_empty());
        assert!(range.query(-10, 499).unwrap().is_empty());
        assert_eq!(range.query(0, 1000).unwrap(), vec![id(1)]);
    }

    #[test]
    fn shard_bounds_saturate_at_i64_max() {
        let mut range = range();
        range.add(i64::MAX - 10, id(1));
        assert_eq!(bounds(&range), vec![(i64::MAX - 10, i64::MAX)]);
        range.add(i64::MAX, id(2));
        assert_eq!(range.query(i64::MAX, i64::MAX).unwrap(), vec![id(2)]);
    }

    #[test]
    fn range_index_keeps_fields_apart() {
        let mut index = RangeIndex::new(&IndexConfig::default());
        index.add(RangeField::Size, 10, id(1));
        index.add(RangeField::Creation, 10, id(2));

        assert_eq!(index.query(RangeField::Size, 0, 20).unwrap(), vec![id(1)]);
        assert_eq!(index.query(RangeField::Creation, 0, 20).unwrap(), vec![id(2)]);
        assert!(index.query(RangeField::Modification, 0, 20).unwrap().is_empty());
        assert!(index.field(RangeField::Modification).shards().is_empty());
    }
}
