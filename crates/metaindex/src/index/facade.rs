//! MetadataIndex - the locked facade over the exact-match and range indexes.

use parking_lot::RwLock;

use super::exact::ExactIndex;
use super::field::{ExactField, RangeField};
use super::range::RangeIndex;
use crate::config::IndexConfig;
use crate::error::Result;
use crate::types::{NodeId, ShardInfo};

/// The denormalized attributes of a file that the index keys on.
///
/// Removal must be called with the same values that were used at insertion,
/// so callers capture this before mutating a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedFile<'a> {
    pub id: NodeId,
    pub extension: &'a str,
    pub owner: &'a str,
    pub size: u64,
    pub creation_time: i64,
    pub modification_time: i64,
}

impl IndexedFile<'_> {
    /// Numeric key of `field`. Sizes beyond `i64::MAX` are clamped.
    pub fn range_value(&self, field: RangeField) -> i64 {
        match field {
            RangeField::Size => i64::try_from(self.size).unwrap_or(i64::MAX),
            RangeField::Creation => self.creation_time,
            RangeField::Modification => self.modification_time,
        }
    }

    /// String key of `field`.
    pub fn exact_value(&self, field: ExactField) -> &str {
        match field {
            ExactField::Extension => self.extension,
            ExactField::Owner => self.owner,
        }
    }
}

#[derive(Debug)]
struct IndexMaps {
    exact: ExactIndex,
    ranged: RangeIndex,
}

/// Secondary indexes over file metadata, guarded by their own reader/writer
/// lock.
///
/// When driven by a [`Namespace`](crate::Namespace), this lock is always
/// taken while the tree's writer lock is held, never the other way round.
#[derive(Debug)]
pub struct MetadataIndex {
    maps: RwLock<IndexMaps>,
    config: IndexConfig,
}

impl Default for MetadataIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataIndex {
    pub fn new() -> Self {
        Self::build(IndexConfig::default())
    }

    /// Creates an index with custom tunables, rejecting a config that fails
    /// [`IndexConfig::validate`].
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: IndexConfig) -> Self {
        Self {
            maps: RwLock::new(IndexMaps {
                exact: ExactIndex::new(),
                ranged: RangeIndex::new(&config),
            }),
            config,
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Records `file` under every exact and range field.
    pub fn add_file(&self, file: &IndexedFile<'_>) {
        let mut maps = self.maps.write();
        for field in ExactField::ALL {
            maps.exact.add(field, file.exact_value(field), file.id);
        }
        for field in RangeField::ALL {
            maps.ranged.add(field, file.range_value(field), file.id);
        }
    }

    /// Removes `file` from every exact and range field.
    ///
    /// Fails only when a posting list no longer decodes; fields visited
    /// before the fault have already been updated.
    pub fn remove_file(&self, file: &IndexedFile<'_>) -> Result<()> {
        let mut maps = self.maps.write();
        for field in ExactField::ALL {
            maps.exact.remove(field, file.exact_value(field), file.id)?;
        }
        for field in RangeField::ALL {
            maps.ranged.remove(field, file.range_value(field), file.id)?;
        }
        Ok(())
    }

    /// Ids of files whose `field` equals `value`.
    pub fn search(&self, field: ExactField, value: &str) -> Result<Vec<NodeId>> {
        self.maps.read().exact.lookup(field, value)
    }

    /// Ids of files whose `field` lies in `[min, max]`.
    pub fn search_by_range(&self, field: RangeField, min: i64, max: i64) -> Result<Vec<NodeId>> {
        self.maps.read().ranged.query(field, min, max)
    }

    /// [`search`](Self::search) keyed by tag; unknown tags match nothing.
    pub fn search_tagged(&self, tag: &str, value: &str) -> Result<Vec<NodeId>> {
        match ExactField::from_tag(tag) {
            Some(field) => self.search(field, value),
            None => Ok(Vec::new()),
        }
    }

    /// [`search_by_range`](Self::search_by_range) keyed by tag; unknown tags
    /// match nothing.
    pub fn search_range_tagged(&self, tag: &str, min: i64, max: i64) -> Result<Vec<NodeId>> {
        match RangeField::from_tag(tag) {
            Some(field) => self.search_by_range(field, min, max),
            None => Ok(Vec::new()),
        }
    }

    /// Number of distinct values recorded for an exact field.
    pub fn value_count(&self, field: ExactField) -> usize {
        self.maps.read().exact.value_count(field)
    }

    /// Current shard layout of `field`, in sequence order.
    pub fn range_shards(&self, field: RangeField) -> Vec<ShardInfo> {
        self.maps.read().ranged.field(field).infos()
    }

    /// Logs the shard layout of `field`.
    pub fn print_range_shards(&self, field: RangeField) {
        let shards = self.range_shards(field);
        log::info!("range shards for {}: {}", field, shards.len());
        for shard in shards {
            log::info!("{}", shard);
        }
    }
}
