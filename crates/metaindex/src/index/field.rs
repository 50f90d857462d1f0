//! Indexed metadata fields.
//!
//! Each index kind has a closed set of fields, so a lookup is a total match
//! over the enum. The string tags are only parsed at the API edge.

use std::fmt;
use std::str::FromStr;

use crate::error::MetaIndexError;

/// Fields answered by exact-match lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExactField {
    Extension,
    Owner,
}

impl ExactField {
    pub const ALL: [Self; 2] = [Self::Extension, Self::Owner];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extension => "ext",
            Self::Owner => "owner",
        }
    }

    /// Parses a tag, returning `None` for anything unrecognised.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ext" => Some(Self::Extension),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// Numeric fields answered by range lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeField {
    Size,
    Creation,
    Modification,
}

impl RangeField {
    pub const ALL: [Self; 3] = [Self::Size, Self::Creation, Self::Modification];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Creation => "creation",
            Self::Modification => "mod",
        }
    }

    /// Parses a tag, returning `None` for anything unrecognised.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "size" => Some(Self::Size),
            "creation" => Some(Self::Creation),
            "mod" => Some(Self::Modification),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ExactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExactField {
    type Err = MetaIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| MetaIndexError::UnknownField(s.to_string()))
    }
}

impl FromStr for RangeField {
    type Err = MetaIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| MetaIndexError::UnknownField(s.to_string()))
    }
}
