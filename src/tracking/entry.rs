//! A single tracked file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One file tracked inside a [`Directory`](super::Directory).
///
/// `path` is relative to the directory root and uses `/` as separator on
/// every platform. It is the entry's identity; two entries of the same
/// directory never share a path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    /// Path relative to the owning directory.
    pub path: String,
    /// User tags. Order is not meaningful and duplicates collapse.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// User score, `0` when unrated.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rating: u8,
    /// Known to the project but absent from the last scan.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub missing: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(rating: &u8) -> bool {
    *rating == 0
}

impl Entry {
    /// A present, untagged, unrated entry.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Builder-style tag assignment.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style rating assignment.
    #[must_use]
    pub const fn with_rating(mut self, rating: u8) -> Self {
        self.rating = rating;
        self
    }

    /// Copy every mutable field of `other` into `self`, keeping the path.
    pub fn subsume(&mut self, other: &Self) {
        self.tags.clone_from(&other.tags);
        self.rating = other.rating;
        self.missing = other.missing;
    }

    /// Whether the entry carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
