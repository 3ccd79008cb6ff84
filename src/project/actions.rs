//! Reversible edits of a [`Project`].
//!
//! The set of edits is closed: [`ProjectAction`] lists every one of them.
//! Directory insertion and removal are reversed by index; entry edits locate
//! their directory by identifier. When an action is replayed against a project
//! that no longer holds the directory or entry it refers to, it does nothing.

use crate::error::{Result, TreeError};
use crate::events;
use crate::history::Action;
use crate::project::Project;
use crate::tracking::{Directory, Entry};
use tracing::debug;
use uuid::Uuid;

/// A reversible edit of a [`Project`].
#[derive(Debug, Clone)]
pub enum ProjectAction {
    /// Insert a snapshot of `directory` at `index`.
    AddDirectory {
        /// Snapshot inserted on every apply.
        directory: Directory,
        /// Insertion position.
        index: usize,
    },
    /// Remove the directory `directory.uuid`; unapply restores the snapshot
    /// at `index`.
    RemoveDirectory {
        /// Snapshot captured when the action was created.
        directory: Directory,
        /// Position the directory had when the action was created.
        index: usize,
    },
    /// Placeholder for a rescan. Scanning cannot be reversed, so this carries
    /// no state and does nothing.
    SyncDirectory {
        /// Directory that was scanned.
        uuid: Uuid,
    },
    /// Start tracking `entry` in `directory`.
    AddEntry {
        /// Owning directory.
        directory: Uuid,
        /// Entry appended on apply.
        entry: Entry,
        /// Whether the last apply actually appended.
        added: bool,
    },
    /// Overwrite tags, rating and missing flag of the entry at `entry.path`.
    UpdateEntry {
        /// Owning directory.
        directory: Uuid,
        /// New field values; `path` selects the entry.
        entry: Entry,
        /// Entry state captured by the last apply.
        previous: Option<Entry>,
    },
    /// Stop tracking the entry at `path`.
    RemoveEntry {
        /// Owning directory.
        directory: Uuid,
        /// Relative path of the entry.
        path: String,
        /// Removed entry and its position, captured by the last apply.
        removed: Option<(usize, Entry)>,
    },
    /// Several actions undone and redone as one.
    Grouped(Vec<ProjectAction>),
}

impl ProjectAction {
    /// Insert `directory` at `index`.
    #[must_use]
    pub const fn add_directory(directory: Directory, index: usize) -> Self {
        Self::AddDirectory { directory, index }
    }

    /// Remove `directory`, restoring it at `index` on unapply.
    #[must_use]
    pub const fn remove_directory(directory: Directory, index: usize) -> Self {
        Self::RemoveDirectory { directory, index }
    }

    /// Track `entry` in `directory`.
    #[must_use]
    pub const fn add_entry(directory: Uuid, entry: Entry) -> Self {
        Self::AddEntry {
            directory,
            entry,
            added: false,
        }
    }

    /// Overwrite the entry at `entry.path` in `directory`.
    #[must_use]
    pub const fn update_entry(directory: Uuid, entry: Entry) -> Self {
        Self::UpdateEntry {
            directory,
            entry,
            previous: None,
        }
    }

    /// Stop tracking `path` in `directory`.
    #[must_use]
    pub fn remove_entry(directory: Uuid, path: impl Into<String>) -> Self {
        Self::RemoveEntry {
            directory,
            path: path.into(),
            removed: None,
        }
    }

    /// Treat `actions` as one undo step.
    #[must_use]
    pub const fn grouped(actions: Vec<Self>) -> Self {
        Self::Grouped(actions)
    }
}

impl Action<Project> for ProjectAction {
    fn apply(&mut self, project: &mut Project) {
        match self {
            Self::AddDirectory { directory, index } => {
                debug!(uuid = %directory.uuid, index = *index, "apply add directory");
                project.insert_directory(*index, directory.clone());
            }
            Self::RemoveDirectory { directory, .. } => {
                debug!(uuid = %directory.uuid, "apply remove directory");
                project.remove_directory(directory.uuid);
            }
            Self::SyncDirectory { uuid } => {
                debug!(%uuid, "apply sync directory");
            }
            Self::AddEntry {
                directory,
                entry,
                added,
            } => {
                debug!(%directory, path = %entry.path, "apply add entry");
                *added = false;
                let Some(dir) = project.directory_mut(*directory) else {
                    debug!(%directory, "Directory gone, nothing to add to");
                    return;
                };
                if dir.entry(&entry.path).is_some() {
                    return;
                }
                dir.entries.push(entry.clone());
                dir.emit_entry(events::ENTRY_ADDED, entry);
                *added = true;
            }
            Self::UpdateEntry {
                directory,
                entry,
                previous,
            } => {
                debug!(%directory, path = %entry.path, "apply update entry");
                *previous = None;
                let Some(dir) = project.directory_mut(*directory) else {
                    debug!(%directory, "Directory gone, nothing to update");
                    return;
                };
                let Some(live) = dir.entry_mut(&entry.path) else {
                    return;
                };
                *previous = Some(live.clone());
                live.subsume(entry);
                let updated = live.clone();
                dir.emit_entry(events::ENTRY_UPDATED, &updated);
            }
            Self::RemoveEntry {
                directory,
                path,
                removed,
            } => {
                debug!(%directory, %path, "apply remove entry");
                *removed = None;
                let Some(dir) = project.directory_mut(*directory) else {
                    debug!(%directory, "Directory gone, nothing to remove");
                    return;
                };
                if let Some((index, entry)) = dir.remove_entry(path) {
                    dir.emit_entry(events::ENTRY_REMOVED, &entry);
                    *removed = Some((index, entry));
                }
            }
            Self::Grouped(actions) => {
                for action in actions.iter_mut() {
                    action.apply(project);
                }
            }
        }
    }

    fn unapply(&mut self, project: &mut Project) {
        match self {
            Self::AddDirectory { directory, index } => {
                debug!(uuid = %directory.uuid, index = *index, "unapply add directory");
                project.remove_directory_at(*index, directory.uuid);
            }
            Self::RemoveDirectory { directory, index } => {
                debug!(uuid = %directory.uuid, index = *index, "unapply remove directory");
                project.insert_directory(*index, directory.clone());
            }
            Self::SyncDirectory { uuid } => {
                debug!(%uuid, "unapply sync directory");
            }
            Self::AddEntry {
                directory,
                entry,
                added,
            } => {
                debug!(%directory, path = %entry.path, "unapply add entry");
                if !*added {
                    return;
                }
                let Some(dir) = project.directory_mut(*directory) else {
                    return;
                };
                if let Some((_, removed)) = dir.remove_entry(&entry.path) {
                    dir.emit_entry(events::ENTRY_REMOVED, &removed);
                }
            }
            Self::UpdateEntry {
                directory,
                entry,
                previous,
            } => {
                debug!(%directory, path = %entry.path, "unapply update entry");
                let Some(previous) = previous.as_ref() else {
                    return;
                };
                let Some(dir) = project.directory_mut(*directory) else {
                    return;
                };
                let Some(live) = dir.entry_mut(&entry.path) else {
                    return;
                };
                live.subsume(previous);
                let restored = live.clone();
                dir.emit_entry(events::ENTRY_UPDATED, &restored);
            }
            Self::RemoveEntry {
                directory,
                path,
                removed,
            } => {
                debug!(%directory, %path, "unapply remove entry");
                let Some((index, entry)) = removed.as_ref() else {
                    return;
                };
                let Some(dir) = project.directory_mut(*directory) else {
                    return;
                };
                dir.insert_entry(*index, entry.clone());
                dir.emit_entry(events::ENTRY_ADDED, entry);
            }
            Self::Grouped(actions) => {
                for action in actions.iter_mut().rev() {
                    action.unapply(project);
                }
            }
        }
    }
}

impl Project {
    /// Validate and build an action appending `directory`.
    ///
    /// # Errors
    ///
    /// [`TreeError::DirectoryExists`] if its path is already tracked.
    pub fn add_directory_action(&self, directory: Directory) -> Result<ProjectAction> {
        if self.directory_by_path(&directory.path).is_some() {
            return Err(TreeError::DirectoryExists {
                path: directory.path,
            });
        }
        Ok(ProjectAction::add_directory(
            directory,
            self.directories().len(),
        ))
    }

    /// Validate and build an action removing directory `uuid`.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingDirectory`] if `uuid` is unknown.
    pub fn remove_directory_action(&self, uuid: Uuid) -> Result<ProjectAction> {
        let index = self
            .index_of(uuid)
            .ok_or(TreeError::MissingDirectory { uuid })?;
        Ok(ProjectAction::remove_directory(
            self.directories()[index].clone(),
            index,
        ))
    }

    /// Validate and build an action tracking `path` in directory `uuid`.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingDirectory`] if `uuid` is unknown,
    /// [`TreeError::EntryExists`] if `path` is already tracked.
    pub fn add_entry_action(&self, uuid: Uuid, path: &str) -> Result<ProjectAction> {
        let dir = self
            .directory(uuid)
            .ok_or(TreeError::MissingDirectory { uuid })?;
        if dir.entry(path).is_some() {
            return Err(TreeError::EntryExists {
                directory: uuid,
                path: path.to_string(),
            });
        }
        Ok(ProjectAction::add_entry(uuid, Entry::new(path)))
    }

    /// Validate and build an action overwriting the entry at `entry.path`.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingDirectory`] or [`TreeError::MissingEntry`] if the
    /// target cannot be resolved.
    pub fn update_entry_action(&self, uuid: Uuid, entry: Entry) -> Result<ProjectAction> {
        self.existing_entry(uuid, &entry.path)?;
        Ok(ProjectAction::update_entry(uuid, entry))
    }

    /// Validate and build an action removing the entry at `path`.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingDirectory`] or [`TreeError::MissingEntry`] if the
    /// target cannot be resolved.
    pub fn remove_entry_action(&self, uuid: Uuid, path: &str) -> Result<ProjectAction> {
        self.existing_entry(uuid, path)?;
        Ok(ProjectAction::remove_entry(uuid, path))
    }

    /// The entry at `path` in directory `uuid`.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingDirectory`] or [`TreeError::MissingEntry`].
    pub fn existing_entry(&self, uuid: Uuid, path: &str) -> Result<&Entry> {
        self.directory(uuid)
            .ok_or(TreeError::MissingDirectory { uuid })?
            .entry(path)
            .ok_or_else(|| TreeError::MissingEntry {
                directory: uuid,
                path: path.to_string(),
            })
    }
}
