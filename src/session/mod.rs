//! Per-user browsing state that lives next to, not inside, a project.
//!
//! A [`Session`] remembers which project was open and which views were
//! showing it: [`DirectoryView`]s browsing one directory and [`TagsView`]s
//! filtering entries by tag. Session edits are not undoable. Each of them
//! emits on the session bus and schedules a debounced write through the
//! [`saver`], so a burst of edits costs a single write.
//!
//! Session files are TOML documents named `<name>.toml` inside
//! [`sessions_dir`].

pub mod saver;
pub mod views;

pub use saver::DebouncedSaver;
pub use views::{DirectoryView, TagsView};

use crate::error::{Result, TreeError};
use crate::events::{self, Event, EventBus};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

/// Everything a session persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected: Option<Uuid>,
    #[serde(default)]
    directories: Vec<DirectoryView>,
    #[serde(default)]
    tags: Vec<TagsView>,
}

/// Open views and the project they belong to.
#[derive(Debug)]
pub struct Session {
    name: String,
    path: PathBuf,
    state: SessionState,
    events: EventBus,
    saver: DebouncedSaver,
}

/// Default location of session files: `<config_dir>/treesource/sessions`.
#[must_use]
pub fn sessions_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("treesource").join("sessions"))
}

impl Session {
    /// Open session `name` in `dir`, creating an empty one if none exists.
    ///
    /// # Errors
    ///
    /// [`TreeError::Io`] if the file cannot be created or read,
    /// [`TreeError::Deserialize`] if it is not a session.
    pub fn ensure(dir: &Path, name: &str, delay: Duration) -> Result<Self> {
        let path = dir.join(format!("{name}.toml"));
        if !path.exists() {
            fs::create_dir_all(dir).map_err(|e| TreeError::io(dir, e))?;
            fs::write(&path, marshal(&SessionState::default())?)
                .map_err(|e| TreeError::io(&path, e))?;
            debug!(path = %path.display(), "Created empty session");
        }
        Self::load(&path, delay)
    }

    /// Open the session stored at `path`.
    ///
    /// # Errors
    ///
    /// [`TreeError::Io`] if the file cannot be read or the writer thread
    /// cannot start, [`TreeError::Deserialize`] if it is not a session.
    pub fn load(path: &Path, delay: Duration) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| TreeError::io(path, e))?;
        let state: SessionState =
            toml::from_str(&String::from_utf8_lossy(&bytes)).map_err(|source| {
                TreeError::Deserialize {
                    what: "session",
                    source,
                }
            })?;
        let saver = DebouncedSaver::spawn(path, delay).map_err(|e| TreeError::io(path, e))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            path: path.to_path_buf(),
            state,
            events: EventBus::new(),
            saver,
        })
    }

    /// Session name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The session bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a handler on the session bus.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.on(name, handler);
    }

    /// Project that was open when the session was last saved.
    #[must_use]
    pub fn project(&self) -> Option<&Path> {
        self.state.project.as_deref()
    }

    /// Remember `project` as the open project.
    pub fn set_project(&mut self, project: Option<PathBuf>) {
        if self.state.project != project {
            self.state.project = project;
            self.pending_save();
        }
    }

    /// Open directory views.
    #[must_use]
    pub fn directory_views(&self) -> &[DirectoryView] {
        &self.state.directories
    }

    /// Open tags views.
    #[must_use]
    pub fn tags_views(&self) -> &[TagsView] {
        &self.state.tags
    }

    /// Directory view with the given identifier.
    #[must_use]
    pub fn directory_view(&self, uuid: Uuid) -> Option<&DirectoryView> {
        self.state.directories.iter().find(|v| v.uuid == uuid)
    }

    /// Tags view with the given identifier.
    #[must_use]
    pub fn tags_view(&self, uuid: Uuid) -> Option<&TagsView> {
        self.state.tags.iter().find(|v| v.uuid == uuid)
    }

    /// Selected view, if any.
    #[must_use]
    pub const fn selected_view(&self) -> Option<Uuid> {
        self.state.selected
    }

    /// Open a view at the root of project directory `directory`.
    pub fn add_directory_view(&mut self, directory: Uuid) -> Uuid {
        let view = DirectoryView::new(directory);
        let uuid = view.uuid;
        self.events
            .emit(events::VIEW_DIRECTORY_ADD, &Event::DirectoryView(view.clone()));
        self.state.directories.push(view);
        self.pending_save();
        uuid
    }

    /// Open a view listing entries tagged with every one of `tags`.
    pub fn add_tags_view(&mut self, tags: Vec<String>) -> Uuid {
        let view = TagsView::new(tags);
        let uuid = view.uuid;
        self.events
            .emit(events::VIEW_TAGS_ADD, &Event::TagsView(view.clone()));
        self.state.tags.push(view);
        self.pending_save();
        uuid
    }

    /// Close the view `uuid`, deselecting it if it was selected.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingView`] if no view has this identifier.
    pub fn remove_view(&mut self, uuid: Uuid) -> Result<()> {
        if let Some(index) = self.state.directories.iter().position(|v| v.uuid == uuid) {
            let view = self.state.directories.remove(index);
            self.events
                .emit(events::VIEW_DIRECTORY_REMOVE, &Event::DirectoryView(view));
        } else if let Some(index) = self.state.tags.iter().position(|v| v.uuid == uuid) {
            let view = self.state.tags.remove(index);
            self.events
                .emit(events::VIEW_TAGS_REMOVE, &Event::TagsView(view));
        } else {
            return Err(TreeError::MissingView { uuid });
        }

        if self.state.selected == Some(uuid) {
            self.state.selected = None;
            self.events
                .emit(events::VIEW_SELECT, &Event::Select { uuid: None });
        }
        self.pending_save();
        Ok(())
    }

    /// Move directory view `uuid` to a new working sub-path and return it.
    ///
    /// See [`DirectoryView::navigate`] for how `target` is resolved.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingView`] if `uuid` is not a directory view.
    pub fn navigate(&mut self, uuid: Uuid, target: &str) -> Result<String> {
        let view = self
            .state
            .directories
            .iter_mut()
            .find(|v| v.uuid == uuid)
            .ok_or(TreeError::MissingView { uuid })?;
        view.navigate(target);
        let wd = view.wd.clone();
        self.events.emit(
            events::VIEW_DIRECTORY_NAVIGATE,
            &Event::Navigate {
                uuid,
                wd: wd.clone(),
            },
        );
        self.pending_save();
        Ok(wd)
    }

    /// Select view `uuid`, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingView`] if `uuid` names no view.
    pub fn select_view(&mut self, uuid: Option<Uuid>) -> Result<()> {
        if let Some(uuid) = uuid
            && !self.has_view(uuid)
        {
            return Err(TreeError::MissingView { uuid });
        }
        self.state.selected = uuid;
        self.events.emit(events::VIEW_SELECT, &Event::Select { uuid });
        self.pending_save();
        Ok(())
    }

    /// Replace the file selection of view `uuid`.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingView`] if `uuid` names no view.
    pub fn select_files(&mut self, uuid: Uuid, selected: Vec<String>, focused: String) -> Result<()> {
        let (slot, focus) = if let Some(view) =
            self.state.directories.iter_mut().find(|v| v.uuid == uuid)
        {
            (&mut view.selected, &mut view.focused)
        } else if let Some(view) = self.state.tags.iter_mut().find(|v| v.uuid == uuid) {
            (&mut view.selected, &mut view.focused)
        } else {
            return Err(TreeError::MissingView { uuid });
        };
        slot.clone_from(&selected);
        focus.clone_from(&focused);

        self.events.emit(
            events::VIEW_SELECT_FILES,
            &Event::SelectFiles {
                uuid,
                selected,
                focused,
            },
        );
        self.pending_save();
        Ok(())
    }

    /// Re-emit every open view followed by the current selection, so a late
    /// observer can rebuild its state.
    pub fn refresh(&self) {
        for view in &self.state.directories {
            self.events
                .emit(events::VIEW_DIRECTORY_ADD, &Event::DirectoryView(view.clone()));
        }
        for view in &self.state.tags {
            self.events
                .emit(events::VIEW_TAGS_ADD, &Event::TagsView(view.clone()));
        }
        self.events.emit(
            events::VIEW_SELECT,
            &Event::Select {
                uuid: self.state.selected,
            },
        );
    }

    /// Schedule a background write of the current state.
    pub fn pending_save(&self) {
        match marshal(&self.state) {
            Ok(bytes) => self.saver.request(bytes),
            Err(err) => error!(session = %self.name, error = %err, "Cannot encode session"),
        }
    }

    /// Write the current state and wait for it to reach the disk.
    pub fn flush(&self) {
        self.pending_save();
        self.saver.flush();
    }

    fn has_view(&self, uuid: Uuid) -> bool {
        self.directory_view(uuid).is_some() || self.tags_view(uuid).is_some()
    }
}

fn marshal(state: &SessionState) -> Result<Vec<u8>> {
    toml::to_string_pretty(state)
        .map(String::into_bytes)
        .map_err(|source| TreeError::Serialize {
            what: "session",
            source,
        })
}
