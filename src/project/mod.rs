//! The project aggregate: an ordered set of tracked directories.
//!
//! A [`Project`] is the target of a [`History`](crate::history::History) of
//! [`ProjectAction`]s. Structural edits are requested through the
//! `*_action` constructors (see [`actions`]), which validate the request and
//! capture what the action needs to reverse itself; the caller then pushes the
//! action onto the history. The only mutation that bypasses the history is
//! [`Project::sync_directory`], because reconciling with the filesystem cannot
//! be reversed.
//!
//! Every directory event is re-broadcast on the project's own bus. Since a
//! directory inserted by an action is always a fresh clone with an empty bus,
//! insertion goes through a single rehook step that wires the forwarding up
//! again before replaying the directory's entries.

pub mod actions;
pub mod store;

pub use actions::ProjectAction;

use crate::error::{Result, SyncError, TreeError};
use crate::events::{self, Event, EventBus};
use crate::tracking::{Directory, SyncReport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Directory bus events and the project bus names they are re-broadcast as.
const FORWARDED: [(&str, &str); 8] = [
    (events::SYNC_STARTED, events::DIRECTORY_SYNC),
    (events::SYNC_FINISHED, events::DIRECTORY_SYNCED),
    (events::ENTRY, events::ENTRY),
    (events::ENTRY_ADDED, events::ENTRY_ADD),
    (events::ENTRY_MISSING, events::ENTRY_MISSING),
    (events::ENTRY_FOUND, events::ENTRY_FOUND),
    (events::ENTRY_UPDATED, events::ENTRY_UPDATE),
    (events::ENTRY_REMOVED, events::ENTRY_REMOVE),
];

/// A treesource project.
#[derive(Debug, Serialize, Deserialize)]
pub struct Project {
    /// Display title.
    pub title: String,
    /// Location of the project file. Set on load, never persisted.
    #[serde(skip)]
    pub path: PathBuf,
    /// Source directories, in user-visible order.
    #[serde(default)]
    directories: Vec<Directory>,
    /// Set when a scan changed entries outside of the history.
    #[serde(skip)]
    changed: bool,
    #[serde(skip)]
    events: EventBus,
}

impl Project {
    /// An empty project stored at `path`, titled after the file stem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = title_from_path(&path);
        Self {
            title,
            path,
            directories: Vec::new(),
            changed: false,
            events: EventBus::new(),
        }
    }

    /// Directories in order.
    #[must_use]
    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    /// Directory with the given identifier.
    #[must_use]
    pub fn directory(&self, uuid: Uuid) -> Option<&Directory> {
        self.directories.iter().find(|d| d.uuid == uuid)
    }

    /// Directory tracking exactly `path`.
    #[must_use]
    pub fn directory_by_path(&self, path: &Path) -> Option<&Directory> {
        self.directories.iter().find(|d| d.path == path)
    }

    /// Position of the directory with the given identifier.
    #[must_use]
    pub fn index_of(&self, uuid: Uuid) -> Option<usize> {
        self.directories.iter().position(|d| d.uuid == uuid)
    }

    pub(crate) fn directory_mut(&mut self, uuid: Uuid) -> Option<&mut Directory> {
        self.directories.iter_mut().find(|d| d.uuid == uuid)
    }

    /// Whether a scan changed entries since the last save.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.changed
    }

    pub(crate) const fn mark_clean(&mut self) {
        self.changed = false;
    }

    /// The project bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a handler on the project bus.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.on(name, handler);
    }

    /// Emit on the project bus.
    pub fn emit(&self, name: &str, event: &Event) {
        self.events.emit(name, event);
    }

    /// Insert `directory` at `index` (clamped to the end), announce it, hook
    /// its bus and replay its entries.
    pub(crate) fn insert_directory(&mut self, index: usize, directory: Directory) {
        let index = index.min(self.directories.len());
        self.directories.insert(index, directory);
        self.announce(index);
    }

    /// Remove the directory at `index` if it is `uuid`.
    pub(crate) fn remove_directory_at(&mut self, index: usize, uuid: Uuid) -> Option<Directory> {
        if self.directories.get(index).is_none_or(|d| d.uuid != uuid) {
            debug!(%uuid, index, "Directory not at expected index");
            return None;
        }
        let removed = self.directories.remove(index);
        self.emit(events::DIRECTORY_REMOVE, &Event::DirectoryRemoved { uuid });
        Some(removed)
    }

    /// Remove the directory with `uuid`, wherever it is.
    pub(crate) fn remove_directory(&mut self, uuid: Uuid) -> Option<Directory> {
        let index = self.index_of(uuid)?;
        self.remove_directory_at(index, uuid)
    }

    /// Emit `directory-add`, rehook and replay entries for the directory at
    /// `index`.
    fn announce(&self, index: usize) {
        let directory = &self.directories[index];
        self.emit(events::DIRECTORY_ADD, &Event::Directory(directory.info()));
        self.hook_directory(directory);
        directory.emit_all_entries();
    }

    /// Forward every directory event to the project bus.
    fn hook_directory(&self, directory: &Directory) {
        for (from, to) in FORWARDED {
            let bus = self.events.share();
            directory.on(from, move |event| bus.emit(to, event));
        }
    }

    /// Announce and hook every directory of a freshly loaded project, scanning
    /// those marked `sync_on_load`.
    ///
    /// Scan failures do not stop the remaining directories; they are returned
    /// together. Must run only once per loaded project.
    pub(crate) fn init_directories(&mut self) -> Vec<SyncError> {
        let mut failures = Vec::new();
        for index in 0..self.directories.len() {
            let directory = &self.directories[index];
            self.emit(events::DIRECTORY_ADD, &Event::Directory(directory.info()));
            self.hook_directory(directory);

            if directory.sync_on_load {
                let result = self.directories[index].sync_entries();
                match self.note_sync(result) {
                    Ok(report) => debug!(index, ?report, "Directory synchronized on load"),
                    Err(err) => failures.push(err),
                }
            }
            self.directories[index].emit_all_entries();
        }
        failures
    }

    /// Reconcile one directory with the filesystem.
    ///
    /// This is not an undoable edit; a scan that changes entries marks the
    /// project as changed instead.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingDirectory`] if `uuid` is unknown, [`TreeError::Sync`]
    /// if parts of the tree could not be read.
    pub fn sync_directory(&mut self, uuid: Uuid) -> Result<SyncReport> {
        let directory = self
            .directory_mut(uuid)
            .ok_or(TreeError::MissingDirectory { uuid })?;
        let result = directory.sync_entries();
        Ok(self.note_sync(result)?)
    }

    fn note_sync(
        &mut self,
        result: std::result::Result<SyncReport, SyncError>,
    ) -> std::result::Result<SyncReport, SyncError> {
        match &result {
            Ok(report) => self.changed |= report.changed(),
            Err(err) => self.changed |= err.partial.changed(),
        }
        result
    }
}

/// File stem of `path`, or the whole file name when there is no stem.
fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
