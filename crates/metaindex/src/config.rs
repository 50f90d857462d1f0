//! Tunables for the namespace and its metadata index.
//!
//! Both structs deserialize from partial documents: any field left out keeps
//! its default, so a harness only has to spell out what it changes.

use serde::{Deserialize, Serialize};

use crate::error::{MetaIndexError, Result};

/// Number of distinct values a range shard holds before it is split, and the
/// span of a freshly created shard.
pub const DEFAULT_SHARD_THRESHOLD: usize = 1000;

/// Owner recorded on the root directory.
pub const DEFAULT_ROOT_OWNER: &str = "root";

/// Mode bits recorded on the root directory.
pub const DEFAULT_ROOT_PERMISSION: u32 = 0o755;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// A shard splits once its entry count exceeds this value. A shard
    /// created for an uncovered value spans `[value, value + shard_threshold]`.
    pub shard_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            shard_threshold: DEFAULT_SHARD_THRESHOLD,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shard_threshold == 0 {
            return Err(MetaIndexError::InvalidConfig(
                "shard_threshold must be greater than zero".to_string(),
            ));
        }
        if i64::try_from(self.shard_threshold).is_err() {
            return Err(MetaIndexError::InvalidConfig(format!(
                "shard_threshold {} does not fit in a shard bound",
                self.shard_threshold
            )));
        }
        Ok(())
    }

    /// The threshold as a shard-bound offset.
    pub(crate) fn shard_span(&self) -> i64 {
        i64::try_from(self.shard_threshold).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub root_owner: String,
    pub root_permission: u32,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            root_owner: DEFAULT_ROOT_OWNER.to_string(),
            root_permission: DEFAULT_ROOT_PERMISSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = IndexConfig::default();
        assert_eq!(config.shard_threshold, 1000);
        assert_eq!(config.shard_span(), 1000);
        assert!(config.validate().is_ok());

        let ns = NamespaceConfig::default();
        assert_eq!(ns.root_owner, "root");
        assert_eq!(ns.root_permission, 0o755);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let ns: NamespaceConfig = serde_json::from_str(r#"{"root_owner":"admin"}"#).unwrap();
        assert_eq!(ns.root_owner, "admin");
        assert_eq!(ns.root_permission, DEFAULT_ROOT_PERMISSION);

        let config: IndexConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, IndexConfig::default());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = IndexConfig { shard_threshold: 0 };
        assert!(matches!(
            config.validate(),
            Err(MetaIndexError::InvalidConfig(_))
        ));
    }
}
