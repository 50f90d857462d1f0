#[derive(Debug, thiserror::Error)]
pub enum MetaIndexError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Name already exists: {0}")]
    NameCollision(String),

    #[error("Truncated varint at offset {offset} (buffer length {len})")]
    TruncatedVarint { offset: usize, len: usize },

    #[error("Varint at offset {offset} does not fit in 64 bits")]
    VarintOverflow { offset: usize },

    #[error("Unknown index field: {0}")]
    UnknownField(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl MetaIndexError {
    /// Returns true for faults that mean a posting list no longer decodes.
    ///
    /// These are the only errors that indicate corrupted index state; all
    /// others describe a request that could not be applied to the tree.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::TruncatedVarint { .. } | Self::VarintOverflow { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MetaIndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_errors_are_corruption() {
        assert!(MetaIndexError::TruncatedVarint { offset: 3, len: 3 }.is_corruption());
        assert!(MetaIndexError::VarintOverflow { offset: 0 }.is_corruption());
        assert!(!MetaIndexError::PathNotFound("/a".to_string()).is_corruption());
        assert!(!MetaIndexError::NameCollision("/a".to_string()).is_corruption());
    }

    #[test]
    fn error_messages_name_the_path() {
        let err = MetaIndexError::NotAFile("/docs".to_string());
        assert_eq!(err.to_string(), "Not a file: /docs");
    }
}
