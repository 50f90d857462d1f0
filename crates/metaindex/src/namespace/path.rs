//! Slash-delimited absolute paths.
//!
//! A path must start with `/`. Trailing slashes are ignored, so `/` names
//! the root and `/a/` names `a`. Empty interior segments (`/a//b`) are
//! rejected. `.` and `..` have no special meaning.

use crate::error::{MetaIndexError, Result};

/// Splits `path` into its segments below the root.
pub(crate) fn segments(path: &str) -> Result<Vec<&str>> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| MetaIndexError::InvalidPath(path.to_string()))?;
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let parts: Vec<&str> = rest.split('/').collect();
    if parts.iter().any(|segment| segment.is_empty()) {
        return Err(MetaIndexError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

/// Splits `path` into its parent segments and final name.
///
/// The root has no final name and is rejected.
pub(crate) fn split_parent(path: &str) -> Result<(Vec<&str>, &str)> {
    let mut parts = segments(path)?;
    let name = parts
        .pop()
        .ok_or_else(|| MetaIndexError::InvalidPath(path.to_string()))?;
    Ok((parts, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_segments() {
        assert!(segments("/").unwrap().is_empty());
        assert!(segments("///").unwrap().is_empty());
    }

    #[test]
    fn nested_segments() {
        assert_eq!(segments("/a/b/c.txt").unwrap(), vec!["a", "b", "c.txt"]);
        assert_eq!(segments("/a/b/").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn relative_and_empty_segments_are_invalid() {
        assert!(matches!(segments("a/b"), Err(MetaIndexError::InvalidPath(_))));
        assert!(matches!(segments(""), Err(MetaIndexError::InvalidPath(_))));
        assert!(matches!(segments("/a//b"), Err(MetaIndexError::InvalidPath(_))));
    }

    #[test]
    fn split_parent_separates_name() {
        let (parents, name) = split_parent("/a/b/doc.txt").unwrap();
        assert_eq!(parents, vec!["a", "b"]);
        assert_eq!(name, "doc.txt");

        let (parents, name) = split_parent("/top").unwrap();
        assert!(parents.is_empty());
        assert_eq!(name, "top");

        assert!(split_parent("/").is_err());
    }
}
