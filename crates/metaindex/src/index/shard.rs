//! A single range shard: an inclusive numeric interval and the posting lists
//! of the values that fall inside it.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::storage::PostingList;
use crate::types::{NodeId, ShardInfo};

#[derive(Debug, Clone)]
pub struct RangeShard {
    start: i64,
    end: i64,
    /// Keys always satisfy `start <= key <= end`.
    entries: BTreeMap<i64, PostingList>,
}

impl RangeShard {
    pub fn new(start: i64, end: i64) -> Self {
        debug_assert!(start <= end, "shard bounds out of order: [{start}, {end}]");
        Self {
            start,
            end,
            entries: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Number of distinct values held.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.start <= value && value <= self.end
    }

    /// True when `[min, max]` intersects this shard's interval.
    #[inline]
    pub fn overlaps(&self, min: i64, max: i64) -> bool {
        min <= self.end && max >= self.start
    }

    pub fn insert(&mut self, value: i64, id: NodeId) {
        debug_assert!(self.contains(value));
        self.entries.entry(value).or_default().push(id);
    }

    /// Removes `id` from the list stored under `value`, deleting the value's
    /// entry once its list is empty.
    pub fn remove(&mut self, value: i64, id: NodeId) -> Result<bool> {
        let Some(list) = self.entries.get_mut(&value) else {
            return Ok(false);
        };
        let removed = list.remove(id)?;
        if list.is_empty() {
            self.entries.remove(&value);
        }
        Ok(removed)
    }

    /// Decodes every id stored under a value in `[min, max]` onto `out`.
    pub fn collect_range(&self, min: i64, max: i64, out: &mut Vec<NodeId>) -> Result<()> {
        if min > max {
            return Ok(());
        }
        for list in self.entries.range(min..=max).map(|(_, list)| list) {
            list.decode_into(out)?;
        }
        Ok(())
    }

    /// Bisects the numeric interval at its midpoint.
    ///
    /// This shard keeps `[start, mid]`; the returned shard takes
    /// `[mid + 1, end]` together with every value above `mid`. The cut is by
    /// range, not by entry count, so either half may end up empty.
    pub fn split(&mut self) -> RangeShard {
        let mid = midpoint(self.start, self.end);
        let upper_entries = match mid.checked_add(1) {
            Some(upper_start) => self.entries.split_off(&upper_start),
            None => BTreeMap::new(),
        };
        let upper = RangeShard {
            start: mid.saturating_add(1),
            end: self.end,
            entries: upper_entries,
        };
        self.end = mid;
        upper
    }

    /// Moves every entry of `other` into this shard and extends the upper
    /// bound to cover it.
    pub fn absorb(&mut self, other: RangeShard) {
        for (value, list) in other.entries {
            match self.entries.get_mut(&value) {
                Some(existing) => existing.append(&list),
                None => {
                    self.entries.insert(value, list);
                }
            }
        }
        self.end = self.end.max(other.end);
    }

    pub fn info(&self) -> ShardInfo {
        ShardInfo {
            start: self.start,
            end: self.end,
            entries: self.entries.len(),
        }
    }
}

/// `(start + end) / 2` rounded toward negative infinity, without
/// overflowing. Flooring keeps `mid < end` whenever `start < end`.
fn midpoint(start: i64, end: i64) -> i64 {
    (i128::from(start) + i128::from(end)).div_euclid(2) as i64
}
