//! Error types surfaced by the treesource core.
//!
//! Every user-facing failure is a value. Stale identifiers are reported when
//! an edit is requested; once an action sits on the history stack, replaying
//! it against a target that no longer holds the referenced directory or entry
//! is a silent no-op instead of an error.

use crate::tracking::scanner::SyncReport;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Every failure the library reports to its caller.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A directory with the same path is already tracked by the project.
    #[error("directory '{}' already exists", path.display())]
    DirectoryExists {
        /// Path that was requested.
        path: PathBuf,
    },

    /// No directory with this identifier is tracked.
    #[error("directory {uuid} is not part of the project")]
    MissingDirectory {
        /// Identifier that failed to resolve.
        uuid: Uuid,
    },

    /// The directory exists but holds no entry with this path.
    #[error("entry '{path}' does not exist in directory {directory}")]
    MissingEntry {
        /// Owning directory.
        directory: Uuid,
        /// Relative entry path that failed to resolve.
        path: String,
    },

    /// An entry with this path is already tracked in the directory.
    #[error("entry '{path}' already exists in directory {directory}")]
    EntryExists {
        /// Owning directory.
        directory: Uuid,
        /// Relative entry path.
        path: String,
    },

    /// No session view with this identifier exists.
    #[error("view {uuid} does not exist")]
    MissingView {
        /// Identifier that failed to resolve.
        uuid: Uuid,
    },

    /// One or more subtrees could not be read while scanning.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The operation would discard edits that were never saved.
    #[error("project has unsaved changes")]
    UnsavedChanges,

    /// A project operation was requested while no project is open.
    #[error("no project is loaded")]
    NoProject,

    /// Reading or writing a project, session or config file failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded as TOML.
    #[error("failed to encode {what}: {source}")]
    Serialize {
        /// What was being encoded (project, session, ...).
        what: &'static str,
        /// Underlying failure.
        #[source]
        source: toml::ser::Error,
    },

    /// A file did not contain valid TOML for the expected structure.
    #[error("failed to decode {what}: {source}")]
    Deserialize {
        /// What was being decoded (project, session, ...).
        what: &'static str,
        /// Underlying failure.
        #[source]
        source: toml::de::Error,
    },
}

impl TreeError {
    /// Wrap an I/O failure with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Aggregate of every subtree that could not be read during one scan.
///
/// A scan never stops at the first unreadable directory; siblings are still
/// walked and whatever was reconciled stays applied. `partial` records what
/// the walk managed to do.
#[derive(Debug)]
pub struct SyncError {
    /// Root of the scanned directory.
    pub root: PathBuf,
    /// One failure per unreadable path.
    pub failures: Vec<walkdir::Error>,
    /// Reconciliation that did happen despite the failures.
    pub partial: SyncReport,
}

impl SyncError {
    /// Number of subtrees that failed to read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to read {} path(s) under '{}'",
            self.failures.len(),
            self.root.display()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SyncError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_exists_message() {
        let err = TreeError::DirectoryExists {
            path: PathBuf::from("/srv/photos"),
        };
        assert_eq!(err.to_string(), "directory '/srv/photos' already exists");
    }

    #[test]
    fn test_sync_error_lists_every_failure() {
        let err = SyncError {
            root: PathBuf::from("/nowhere"),
            failures: Vec::new(),
            partial: SyncReport::default(),
        };
        assert!(err.is_empty());
        assert!(err.to_string().starts_with("failed to read 0 path(s)"));

        let wrapped: TreeError = err.into();
        assert!(matches!(wrapped, TreeError::Sync(_)));
    }
}
