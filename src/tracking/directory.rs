//! A tracked source root and its entries.

use crate::events::{self, DirectoryInfo, Event, EventBus};
use crate::tracking::Entry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A source directory whose files are tracked as [`Entry`] values.
///
/// Entries keep discovery order. Cloning a directory yields a detached
/// snapshot: entries are copied but the clone starts with an empty
/// [`EventBus`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Directory {
    /// Assigned once when the directory is first added, never reused.
    pub uuid: Uuid,
    /// Root on disk.
    pub path: PathBuf,
    /// Skip files and directories whose name starts with `.` while scanning.
    #[serde(default)]
    pub ignore_dot: bool,
    /// Scan as soon as the project is loaded.
    #[serde(default)]
    pub sync_on_load: bool,
    #[serde(default)]
    pub(crate) entries: Vec<Entry>,
    #[serde(skip)]
    events: EventBus,
}

impl Clone for Directory {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            path: self.path.clone(),
            ignore_dot: self.ignore_dot,
            sync_on_load: self.sync_on_load,
            entries: self.entries.clone(),
            events: EventBus::new(),
        }
    }
}

impl PartialEq for Directory {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.path == other.path
            && self.ignore_dot == other.ignore_dot
            && self.sync_on_load == other.sync_on_load
            && self.entries == other.entries
    }
}

impl Directory {
    /// A new, never-scanned directory with a fresh identifier.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ignore_dot: bool, sync_on_load: bool) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            path: path.into(),
            ignore_dot,
            sync_on_load,
            entries: Vec::new(),
            events: EventBus::new(),
        }
    }

    /// Builder-style entry list, for directories restored from elsewhere.
    /// Later entries with an already used path are dropped.
    #[must_use]
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = Entry>) -> Self {
        for entry in entries {
            if self.entry(&entry.path).is_none() {
                self.entries.push(entry);
            }
        }
        self
    }

    /// Entries in discovery order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entry with the given relative path.
    #[must_use]
    pub fn entry(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub(crate) fn entry_mut(&mut self, path: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.path == path)
    }

    /// Insert at `index`, appending when `index` is past the end.
    pub(crate) fn insert_entry(&mut self, index: usize, entry: Entry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    /// Remove the entry with `path`, returning where it was.
    pub(crate) fn remove_entry(&mut self, path: &str) -> Option<(usize, Entry)> {
        let index = self.entries.iter().position(|e| e.path == path)?;
        Some((index, self.entries.remove(index)))
    }

    /// Entries currently flagged as missing.
    pub fn missing_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.missing)
    }

    /// Description sent with `directory-add`.
    #[must_use]
    pub fn info(&self) -> DirectoryInfo {
        DirectoryInfo {
            uuid: self.uuid,
            path: self.path.clone(),
            ignore_dot: self.ignore_dot,
            sync_on_load: self.sync_on_load,
        }
    }

    /// This directory's bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a handler on this directory's bus.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.on(name, handler);
    }

    /// Emit on this directory's bus.
    pub fn emit(&self, name: &str, event: &Event) {
        self.events.emit(name, event);
    }

    /// Emit an entry event carrying this directory's identifier.
    pub(crate) fn emit_entry(&self, name: &str, entry: &Entry) {
        self.emit(
            name,
            &Event::Entry {
                directory: self.uuid,
                entry: entry.clone(),
            },
        );
    }

    /// Broadcast every entry as an `entry` event.
    pub fn emit_all_entries(&self) {
        for entry in &self.entries {
            self.emit_entry(events::ENTRY, entry);
        }
    }
}
