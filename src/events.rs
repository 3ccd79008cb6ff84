//! Named-event bus and the payloads carried on it.
//!
//! Every [`Directory`](crate::tracking::Directory), [`Project`](crate::project::Project)
//! and [`Session`](crate::session::Session) owns one [`EventBus`]. Handlers are
//! registered per event name and run synchronously, in registration order,
//! for every `emit` of that name. There is no unsubscribe: a handler lives as
//! long as the bus it was registered on.
//!
//! Buses are never copied when their owner is cloned. A cloned directory starts
//! with an empty bus and its owner has to hook it up again.

use crate::session::views::{DirectoryView, TagsView};
use crate::tracking::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

// Directory bus.

/// A directory scan is about to walk the tree.
pub const SYNC_STARTED: &str = "sync-started";
/// A directory scan completed, with or without failures.
pub const SYNC_FINISHED: &str = "sync-finished";
/// Broadcast of an existing entry so late observers see current state.
pub const ENTRY: &str = "entry";
/// A new entry was appended to the directory.
pub const ENTRY_ADDED: &str = "entry-added";
/// An entry was not found on disk during the last scan.
pub const ENTRY_MISSING: &str = "entry-missing";
/// A previously missing entry reappeared on disk.
pub const ENTRY_FOUND: &str = "entry-found";
/// Tags, rating or missing flag of an entry changed.
pub const ENTRY_UPDATED: &str = "entry-updated";
/// An entry was removed from the directory.
pub const ENTRY_REMOVED: &str = "entry-removed";

// Project bus.

/// A directory was inserted into the project.
pub const DIRECTORY_ADD: &str = "directory-add";
/// A directory was removed from the project.
pub const DIRECTORY_REMOVE: &str = "directory-remove";
/// Re-broadcast of [`SYNC_STARTED`].
pub const DIRECTORY_SYNC: &str = "directory-sync";
/// Re-broadcast of [`SYNC_FINISHED`].
pub const DIRECTORY_SYNCED: &str = "directory-synced";
/// Re-broadcast of [`ENTRY_ADDED`].
pub const ENTRY_ADD: &str = "entry-add";
/// Re-broadcast of [`ENTRY_UPDATED`].
pub const ENTRY_UPDATE: &str = "entry-update";
/// Re-broadcast of [`ENTRY_REMOVED`].
pub const ENTRY_REMOVE: &str = "entry-remove";
/// History position, save state or title changed.
pub const PROJECT_CHANGE: &str = "project-change";

// Session bus.

/// A directory view was opened.
pub const VIEW_DIRECTORY_ADD: &str = "view-directory-add";
/// A directory view was closed.
pub const VIEW_DIRECTORY_REMOVE: &str = "view-directory-remove";
/// A directory view changed its working sub-path.
pub const VIEW_DIRECTORY_NAVIGATE: &str = "view-directory-navigate";
/// A tags view was opened.
pub const VIEW_TAGS_ADD: &str = "view-tags-add";
/// A tags view was closed.
pub const VIEW_TAGS_REMOVE: &str = "view-tags-remove";
/// The selected view changed.
pub const VIEW_SELECT: &str = "view-select";
/// The file selection inside a view changed.
pub const VIEW_SELECT_FILES: &str = "view-select-files";

/// Payload delivered to every handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Event {
    /// A directory entered the project.
    Directory(DirectoryInfo),
    /// A directory left the project.
    DirectoryRemoved {
        /// Directory identifier.
        uuid: Uuid,
    },
    /// A scan started.
    SyncStarted {
        /// Directory identifier.
        uuid: Uuid,
        /// Scanned root.
        path: PathBuf,
    },
    /// A scan finished. `error` is the rendered aggregate failure, if any.
    SyncFinished {
        /// Directory identifier.
        uuid: Uuid,
        /// Scanned root.
        path: PathBuf,
        /// Rendered [`SyncError`](crate::error::SyncError), `None` on success.
        error: Option<String>,
    },
    /// Something happened to one entry.
    Entry {
        /// Owning directory.
        directory: Uuid,
        /// Entry state after the change.
        entry: Entry,
    },
    /// Project-level status after a history transition or save.
    Project(ProjectStatus),
    /// A directory view was opened or closed.
    DirectoryView(DirectoryView),
    /// A tags view was opened or closed.
    TagsView(TagsView),
    /// A directory view moved to a new working sub-path.
    Navigate {
        /// View identifier.
        uuid: Uuid,
        /// New working sub-path, empty for the root.
        wd: String,
    },
    /// The selected view changed.
    Select {
        /// Selected view, `None` when nothing is selected.
        uuid: Option<Uuid>,
    },
    /// The file selection of a view changed.
    SelectFiles {
        /// View identifier.
        uuid: Uuid,
        /// Selected relative paths.
        selected: Vec<String>,
        /// Focused relative path.
        focused: String,
    },
}

/// Public description of a directory, as sent with [`DIRECTORY_ADD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryInfo {
    /// Stable identifier.
    pub uuid: Uuid,
    /// Root on disk.
    pub path: PathBuf,
    /// Whether dotfiles are skipped while scanning.
    pub ignore_dot: bool,
    /// Whether the directory is scanned when the project loads.
    pub sync_on_load: bool,
}

/// Payload of [`PROJECT_CHANGE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStatus {
    /// Project title.
    pub title: String,
    /// Project file location.
    pub path: PathBuf,
    /// Whether there are edits not yet written to disk.
    pub unsaved: bool,
    /// Whether `undo` would do anything.
    pub undoable: bool,
    /// Whether `redo` would do anything.
    pub redoable: bool,
}

/// Callback registered on a bus.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Registry of handlers keyed by event name.
///
/// The registry lives behind an `Arc` so a handler on one bus can forward into
/// another; use [`EventBus::share`] to obtain such a forwarding handle.
#[derive(Default)]
pub struct EventBus {
    handlers: Arc<DashMap<String, Vec<Handler>>>,
}

impl EventBus {
    /// Create a bus with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Another handle onto the same handler registry.
    #[must_use]
    pub fn share(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
        }
    }

    /// Register `handler` for `name`. It runs after every handler already
    /// registered for that name.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Call every handler registered for `name` with `event`.
    ///
    /// The handler list is snapshotted before delivery, so handlers may
    /// register further handlers (or emit) without deadlocking. Those new
    /// handlers only see later emits.
    pub fn emit(&self, name: &str, event: &Event) {
        let handlers = match self.handlers.get(name) {
            Some(list) => list.value().clone(),
            None => return,
        };
        for handler in &handlers {
            handler(event);
        }
    }

    /// Number of handlers registered for `name`.
    #[must_use]
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, |list| list.len())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn removed(n: u128) -> Event {
        Event::DirectoryRemoved {
            uuid: Uuid::from_u128(n),
        }
    }

    #[test]
    fn test_emit_runs_handlers_in_registration_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            bus.on(DIRECTORY_REMOVE, move |_| seen.lock().unwrap().push(tag));
        }

        bus.emit(DIRECTORY_REMOVE, &removed(1));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_emit_only_reaches_matching_name() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));
        {
            let count = Arc::clone(&count);
            bus.on(DIRECTORY_ADD, move |_| *count.lock().unwrap() += 1);
        }

        bus.emit(DIRECTORY_REMOVE, &removed(1));
        assert_eq!(*count.lock().unwrap(), 0);
        assert_eq!(bus.handler_count(DIRECTORY_ADD), 1);
        assert_eq!(bus.handler_count(DIRECTORY_REMOVE), 0);
    }

    #[test]
    fn test_shared_handle_sees_same_handlers() {
        let bus = EventBus::new();
        let forward = bus.share();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            bus.on(DIRECTORY_REMOVE, move |e| seen.lock().unwrap().push(e.clone()));
        }

        forward.emit(DIRECTORY_REMOVE, &removed(7));
        assert_eq!(*seen.lock().unwrap(), vec![removed(7)]);
    }

    #[test]
    fn test_handler_registered_during_emit_sees_later_emits_only() {
        let bus = Arc::new(EventBus::new());
        let late = Arc::new(Mutex::new(0));
        {
            let inner = bus.share();
            let late = Arc::clone(&late);
            bus.on(DIRECTORY_REMOVE, move |_| {
                let late = Arc::clone(&late);
                inner.on(DIRECTORY_REMOVE, move |_| *late.lock().unwrap() += 1);
            });
        }

        bus.emit(DIRECTORY_REMOVE, &removed(1));
        assert_eq!(*late.lock().unwrap(), 0);
        bus.emit(DIRECTORY_REMOVE, &removed(2));
        assert_eq!(*late.lock().unwrap(), 1);
    }

    #[test]
    fn test_fresh_bus_has_no_handlers() {
        let bus = EventBus::new();
        bus.on(ENTRY, |_| {});
        let other = EventBus::new();
        assert_eq!(other.handler_count(ENTRY), 0);
    }
}
