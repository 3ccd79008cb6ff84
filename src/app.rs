//! Host-facing facade over a project, its history and the user session.
//!
//! [`App`] owns at most one open project, wrapped in a [`History`] so that
//! every structural edit can be undone. Hosts subscribe once on the app bus
//! with [`App::on`]; every project bus event of the currently open project is
//! forwarded there, and `project-change` is emitted after each history
//! transition, save or rescan.

use crate::config::Config;
use crate::error::{Result, SyncError, TreeError};
use crate::events::{self, Event, EventBus, ProjectStatus};
use crate::history::History;
use crate::project::{Project, ProjectAction, store};
use crate::session::Session;
use crate::tracking::{Directory, Entry, SyncReport};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span, warn};
use uuid::Uuid;

/// History of a project.
pub type ProjectHistory = History<Project, ProjectAction>;

/// Project bus events re-broadcast on the app bus.
const PROJECT_EVENTS: [&str; 11] = [
    events::DIRECTORY_ADD,
    events::DIRECTORY_REMOVE,
    events::DIRECTORY_SYNC,
    events::DIRECTORY_SYNCED,
    events::ENTRY,
    events::ENTRY_ADD,
    events::ENTRY_MISSING,
    events::ENTRY_FOUND,
    events::ENTRY_UPDATE,
    events::ENTRY_REMOVE,
    events::PROJECT_CHANGE,
];

/// The running application state.
#[derive(Debug)]
pub struct App {
    config: Config,
    history: Option<ProjectHistory>,
    session: Option<Session>,
    events: EventBus,
}

impl App {
    /// An app with no project and no session.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            history: None,
            session: None,
            events: EventBus::new(),
        }
    }

    /// Settings the app was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The app bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a handler on the app bus. It keeps receiving events across
    /// project loads.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.on(name, handler);
    }

    /// The open project.
    #[must_use]
    pub fn project(&self) -> Option<&Project> {
        self.history.as_ref().map(History::target)
    }

    /// History of the open project.
    #[must_use]
    pub const fn history(&self) -> Option<&ProjectHistory> {
        self.history.as_ref()
    }

    /// The open session.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The open session, for view edits.
    pub const fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    // Project lifecycle.

    /// Create a project at `path`, optionally tracking `directory`, and save
    /// it right away. The addition of `directory` is not undoable.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnsavedChanges`] if the open project has unsaved edits and
    /// `force` is false, or any error from adding the directory or saving.
    pub fn new_project(&mut self, path: &Path, directory: Option<&Path>, force: bool) -> Result<()> {
        let path = absolute(path)?;
        self.close_if_open(force)?;
        info!(path = %path.display(), "Creating project");

        self.install(Project::new(&path));
        if let Some(directory) = directory {
            let (ignore_dot, sync_on_load) = self.directory_defaults();
            self.add_directory(directory, ignore_dot, sync_on_load)?;
        }
        if let Some(history) = self.history.as_mut() {
            history.reset();
        }
        self.save_project(true)?;
        self.remember_project(Some(path));
        Ok(())
    }

    /// Open the project stored at `path` and initialize it.
    ///
    /// Returns the scan failures of directories synchronized on load; they do
    /// not prevent the project from opening.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnsavedChanges`] if the open project has unsaved edits and
    /// `force` is false, or a load error.
    pub fn load_project(&mut self, path: &Path, force: bool) -> Result<Vec<SyncError>> {
        let path = absolute(path)?;
        let project = store::load(&path)?;
        self.close_if_open(force)?;
        info!(path = %path.display(), title = %project.title, "Loaded project");

        self.install(project);
        let failures = self.init_project()?;
        self.remember_project(Some(path));
        Ok(failures)
    }

    /// Announce every directory of the freshly installed project, scan those
    /// flagged `sync_on_load` and broadcast all entries. Runs once per load;
    /// a second run would hook every directory twice.
    fn init_project(&mut self) -> Result<Vec<SyncError>> {
        let history = self.history.as_mut().ok_or(TreeError::NoProject)?;
        let failures = history.target_mut().init_directories();
        for failure in &failures {
            warn!(root = %failure.root.display(), failures = failure.len(), "Scan on load incomplete");
        }
        self.emit_change();
        Ok(failures)
    }

    /// Write the open project if it has unsaved edits, or always with `force`.
    ///
    /// Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`] if no project is open, or a write error.
    pub fn save_project(&mut self, force: bool) -> Result<bool> {
        let unsaved = self.unsaved();
        let history = self.history.as_mut().ok_or(TreeError::NoProject)?;
        if !unsaved && !force {
            debug!("Project already saved");
            return Ok(false);
        }
        store::save(history.target())?;
        history.mark_saved();
        history.target_mut().mark_clean();
        self.emit_change();
        Ok(true)
    }

    /// Close the open project.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`] if no project is open,
    /// [`TreeError::UnsavedChanges`] if it has unsaved edits and `force` is
    /// false.
    pub fn close_project(&mut self, force: bool) -> Result<()> {
        if self.history.is_none() {
            return Err(TreeError::NoProject);
        }
        if self.unsaved() && !force {
            return Err(TreeError::UnsavedChanges);
        }
        if let Some(history) = self.history.take() {
            info!(title = %history.target().title, "Closed project");
        }
        self.remember_project(None);
        Ok(())
    }

    /// Whether the open project differs from its file.
    #[must_use]
    pub fn unsaved(&self) -> bool {
        self.history
            .as_ref()
            .is_some_and(|h| h.unsaved() || h.target().changed())
    }

    /// Whether `undo` would do anything.
    #[must_use]
    pub fn undoable(&self) -> bool {
        self.history.as_ref().is_some_and(History::undoable)
    }

    /// Whether `redo` would do anything.
    #[must_use]
    pub fn redoable(&self) -> bool {
        self.history.as_ref().is_some_and(History::redoable)
    }

    /// Snapshot of the open project's state.
    #[must_use]
    pub fn status(&self) -> Option<ProjectStatus> {
        let history = self.history.as_ref()?;
        let project = history.target();
        Some(ProjectStatus {
            title: project.title.clone(),
            path: project.path.clone(),
            unsaved: self.unsaved(),
            undoable: history.undoable(),
            redoable: history.redoable(),
        })
    }

    // Directory edits.

    /// Track the directory at `path`, scanning it first.
    ///
    /// Scan failures do not stop the addition; they are reported with a
    /// `directory-synced` event once the directory is part of the project.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`] if no project is open,
    /// [`TreeError::DirectoryExists`] if `path` is already tracked.
    pub fn add_directory(&mut self, path: &Path, ignore_dot: bool, sync_on_load: bool) -> Result<Uuid> {
        let path = absolute(path)?;
        let project = self.project().ok_or(TreeError::NoProject)?;
        if project.directory_by_path(&path).is_some() {
            return Err(TreeError::DirectoryExists { path });
        }

        let span = span!(Level::DEBUG, "add_directory", path = %path.display());
        let _guard = span.enter();

        let mut directory = Directory::new(&path, ignore_dot, sync_on_load);
        let uuid = directory.uuid;
        let scan = directory.sync_entries();
        let action = project.add_directory_action(directory)?;
        self.push(action)?;

        if let Err(err) = scan {
            warn!(%uuid, failures = err.len(), "Initial scan incomplete");
            if let Some(project) = self.project() {
                project.emit(
                    events::DIRECTORY_SYNCED,
                    &Event::SyncFinished {
                        uuid,
                        path,
                        error: Some(err.to_string()),
                    },
                );
            }
        }
        Ok(uuid)
    }

    /// Stop tracking directory `uuid`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`] or [`TreeError::MissingDirectory`].
    pub fn remove_directory(&mut self, uuid: Uuid) -> Result<()> {
        let action = self.require()?.remove_directory_action(uuid)?;
        self.push(action)
    }

    /// Rescan directory `uuid`. Not undoable.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`], [`TreeError::MissingDirectory`] or
    /// [`TreeError::Sync`] if parts of the tree were unreadable.
    pub fn sync_directory(&mut self, uuid: Uuid) -> Result<SyncReport> {
        let history = self.history.as_mut().ok_or(TreeError::NoProject)?;
        let result = history.target_mut().sync_directory(uuid);
        self.emit_change();
        result
    }

    /// Directory whose identifier, identifier prefix or path matches `query`.
    #[must_use]
    pub fn find_directory(&self, query: &str) -> Option<Uuid> {
        let project = self.project()?;
        if let Ok(uuid) = Uuid::parse_str(query) {
            return project.directory(uuid).map(|d| d.uuid);
        }
        let as_path = absolute(Path::new(query)).ok();
        let mut prefixed = project
            .directories()
            .iter()
            .filter(|d| d.uuid.to_string().starts_with(query));
        project
            .directories()
            .iter()
            .find(|d| Some(&d.path) == as_path.as_ref())
            .or_else(|| match (prefixed.next(), prefixed.next()) {
                (Some(only), None) if !query.is_empty() => Some(only),
                _ => None,
            })
            .map(|d| d.uuid)
    }

    // Entry edits.

    /// Track `path` in directory `uuid` without waiting for a scan.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`], [`TreeError::MissingDirectory`] or
    /// [`TreeError::EntryExists`].
    pub fn add_entry(&mut self, uuid: Uuid, path: &str) -> Result<()> {
        let action = self.require()?.add_entry_action(uuid, path)?;
        self.push(action)
    }

    /// Overwrite tags, rating and missing flag of the entry at `entry.path`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`], [`TreeError::MissingDirectory`] or
    /// [`TreeError::MissingEntry`].
    pub fn update_entry(&mut self, uuid: Uuid, entry: Entry) -> Result<()> {
        let action = self.require()?.update_entry_action(uuid, entry)?;
        self.push(action)
    }

    /// Add `tags` to the entry at `path`.
    ///
    /// # Errors
    ///
    /// See [`App::update_entry`].
    pub fn tag(&mut self, uuid: Uuid, path: &str, tags: &[String]) -> Result<()> {
        let mut entry = self.require()?.existing_entry(uuid, path)?.clone();
        entry.tags.extend(tags.iter().cloned());
        self.update_entry(uuid, entry)
    }

    /// Remove `tags` from the entry at `path`.
    ///
    /// # Errors
    ///
    /// See [`App::update_entry`].
    pub fn untag(&mut self, uuid: Uuid, path: &str, tags: &[String]) -> Result<()> {
        let mut entry = self.require()?.existing_entry(uuid, path)?.clone();
        entry.tags.retain(|t| !tags.contains(t));
        self.update_entry(uuid, entry)
    }

    /// Set the rating of the entry at `path`.
    ///
    /// # Errors
    ///
    /// See [`App::update_entry`].
    pub fn rate(&mut self, uuid: Uuid, path: &str, rating: u8) -> Result<()> {
        let entry = self.require()?.existing_entry(uuid, path)?.clone();
        self.update_entry(uuid, entry.with_rating(rating))
    }

    /// Stop tracking the entry at `path`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`], [`TreeError::MissingDirectory`] or
    /// [`TreeError::MissingEntry`].
    pub fn remove_entry(&mut self, uuid: Uuid, path: &str) -> Result<()> {
        let action = self.require()?.remove_entry_action(uuid, path)?;
        self.push(action)
    }

    /// Push an already built action, such as a [`ProjectAction::Grouped`].
    ///
    /// No validation happens here; references the project cannot resolve are
    /// skipped when the action is applied.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`] if no project is open.
    pub fn apply_action(&mut self, action: ProjectAction) -> Result<()> {
        self.push(action)
    }

    // History.

    /// Reverse the latest edit.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`] if no project is open.
    pub fn undo(&mut self) -> Result<()> {
        self.history.as_mut().ok_or(TreeError::NoProject)?.undo();
        self.emit_change();
        Ok(())
    }

    /// Re-apply the latest undone edit.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoProject`] if no project is open.
    pub fn redo(&mut self) -> Result<()> {
        self.history.as_mut().ok_or(TreeError::NoProject)?.redo();
        self.emit_change();
        Ok(())
    }

    // Session.

    /// Open the session named in the config inside `dir`, creating it if
    /// needed.
    ///
    /// # Errors
    ///
    /// Any session load error.
    pub fn open_session(&mut self, dir: &Path) -> Result<()> {
        let session = Session::ensure(dir, &self.config.core.session, self.config.save_delay())?;
        debug!(session = session.name(), "Session opened");
        self.session = Some(session);
        Ok(())
    }

    /// Reopen the project the session remembers, if there is one on disk.
    ///
    /// Returns `None` when there was nothing to restore.
    ///
    /// # Errors
    ///
    /// Any error from [`App::load_project`].
    pub fn restore_session(&mut self) -> Result<Option<Vec<SyncError>>> {
        let Some(path) = self
            .session
            .as_ref()
            .and_then(|s| s.project().map(Path::to_path_buf))
        else {
            return Ok(None);
        };
        if !path.exists() {
            warn!(path = %path.display(), "Session project no longer exists");
            self.remember_project(None);
            return Ok(None);
        }
        self.load_project(&path, false).map(Some)
    }

    // Internals.

    fn require(&self) -> Result<&Project> {
        self.project().ok_or(TreeError::NoProject)
    }

    fn push(&mut self, action: ProjectAction) -> Result<()> {
        self.history
            .as_mut()
            .ok_or(TreeError::NoProject)?
            .push_and_apply(action);
        self.emit_change();
        Ok(())
    }

    fn install(&mut self, project: Project) {
        for name in PROJECT_EVENTS {
            let bus = self.events.share();
            project.on(name, move |event| bus.emit(name, event));
        }
        self.history = Some(History::new(project));
    }

    fn close_if_open(&mut self, force: bool) -> Result<()> {
        if self.history.is_some() {
            self.close_project(force)?;
        }
        Ok(())
    }

    fn emit_change(&self) {
        if let (Some(status), Some(project)) = (self.status(), self.project()) {
            project.emit(events::PROJECT_CHANGE, &Event::Project(status));
        }
    }

    fn remember_project(&mut self, path: Option<PathBuf>) {
        if let Some(session) = self.session.as_mut() {
            session.set_project(path);
        }
    }

    const fn directory_defaults(&self) -> (bool, bool) {
        (self.config.tracking.ignore_dot, self.config.tracking.sync_on_load)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| TreeError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/sub")).unwrap();
        fs::write(temp.path().join("src/a.txt"), "a").unwrap();
        fs::write(temp.path().join("src/sub/b.txt"), "b").unwrap();
        temp
    }

    #[test]
    fn test_edits_require_a_project() {
        let mut app = App::new(Config::default());
        assert!(matches!(app.undo(), Err(TreeError::NoProject)));
        assert!(matches!(app.close_project(false), Err(TreeError::NoProject)));
        assert!(matches!(
            app.add_directory(Path::new("/tmp"), true, false),
            Err(TreeError::NoProject)
        ));
        assert!(!app.unsaved());
    }

    #[test]
    fn test_new_project_is_saved_with_first_directory() {
        let temp = tree();
        let file = temp.path().join("demo.toml");
        let mut app = App::new(Config::default());

        app.new_project(&file, Some(&temp.path().join("src")), false)
            .unwrap();
        assert!(file.exists());
        assert!(!app.unsaved());
        assert!(!app.undoable());

        let project = app.project().unwrap();
        assert_eq!(project.title, "demo");
        assert_eq!(project.directories()[0].entries().len(), 2);
    }

    #[test]
    fn test_close_guards_unsaved_edits() {
        let temp = tree();
        let mut app = App::new(Config::default());
        app.new_project(&temp.path().join("p.toml"), None, false)
            .unwrap();

        app.add_directory(&temp.path().join("src"), true, false)
            .unwrap();
        assert!(app.unsaved());
        assert!(matches!(app.close_project(false), Err(TreeError::UnsavedChanges)));

        app.undo().unwrap();
        assert!(!app.unsaved());
        app.close_project(false).unwrap();
        assert!(app.project().is_none());
    }

    #[test]
    fn test_project_change_follows_history() {
        let temp = tree();
        let mut app = App::new(Config::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            app.on(events::PROJECT_CHANGE, move |e| {
                if let Event::Project(status) = e {
                    seen.lock().unwrap().push((status.unsaved, status.undoable, status.redoable));
                }
            });
        }
        app.new_project(&temp.path().join("p.toml"), None, false)
            .unwrap();
        seen.lock().unwrap().clear();

        let uuid = app
            .add_directory(&temp.path().join("src"), true, false)
            .unwrap();
        app.undo().unwrap();
        app.redo().unwrap();
        app.save_project(false).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (true, true, false),
                (false, false, true),
                (true, true, false),
                (false, true, false),
            ]
        );
        assert_eq!(app.find_directory(&uuid.to_string()), Some(uuid));
        assert_eq!(app.find_directory(&uuid.to_string()[..8]), Some(uuid));
    }

    #[test]
    fn test_rescan_marks_project_unsaved() {
        let temp = tree();
        let mut app = App::new(Config::default());
        app.new_project(&temp.path().join("p.toml"), Some(&temp.path().join("src")), false)
            .unwrap();
        let uuid = app.project().unwrap().directories()[0].uuid;

        fs::write(temp.path().join("src/c.txt"), "c").unwrap();
        let report = app.sync_directory(uuid).unwrap();
        assert_eq!(report.added, 1);
        assert!(app.unsaved());
        assert!(!app.undoable());

        assert!(app.save_project(false).unwrap());
        assert!(!app.unsaved());
        assert!(!app.save_project(false).unwrap());
    }

    #[test]
    fn test_tag_untag_rate() {
        let temp = tree();
        let mut app = App::new(Config::default());
        app.new_project(&temp.path().join("p.toml"), Some(&temp.path().join("src")), false)
            .unwrap();
        let uuid = app.project().unwrap().directories()[0].uuid;

        app.tag(uuid, "a.txt", &["red".into(), "blue".into()]).unwrap();
        app.untag(uuid, "a.txt", &["red".into()]).unwrap();
        app.rate(uuid, "a.txt", 4).unwrap();

        let entry = app.project().unwrap().existing_entry(uuid, "a.txt").unwrap();
        assert!(entry.has_tag("blue") && !entry.has_tag("red"));
        assert_eq!(entry.rating, 4);

        app.undo().unwrap();
        app.undo().unwrap();
        let entry = app.project().unwrap().existing_entry(uuid, "a.txt").unwrap();
        assert!(entry.has_tag("red"));
        assert_eq!(entry.rating, 0);
    }

    #[test]
    fn test_failed_load_keeps_current_project() {
        let temp = tree();
        let mut app = App::new(Config::default());
        app.open_session(&temp.path().join("sessions")).unwrap();
        let file = temp.path().join("p.toml");
        app.new_project(&file, Some(&temp.path().join("src")), false)
            .unwrap();
        let uuid = app.project().unwrap().directories()[0].uuid;
        app.tag(uuid, "a.txt", &["pending".into()]).unwrap();

        fs::write(temp.path().join("broken.toml"), "title = [").unwrap();
        for target in ["does-not-exist.toml", "broken.toml"] {
            assert!(app.load_project(&temp.path().join(target), true).is_err());

            let project = app.project().expect("project still open");
            assert_eq!(project.path, file);
            assert!(project.existing_entry(uuid, "a.txt").unwrap().has_tag("pending"));
            assert!(app.unsaved());
            assert_eq!(app.session().unwrap().project(), Some(file.as_path()));
        }
    }

    #[test]
    fn test_reloading_does_not_duplicate_forwarded_events() {
        let temp = tree();
        let file = temp.path().join("p.toml");
        let mut app = App::new(Config::default());
        app.new_project(&file, Some(&temp.path().join("src")), false)
            .unwrap();
        app.load_project(&file, false).unwrap();
        app.load_project(&file, false).unwrap();

        let count = Arc::new(Mutex::new(0));
        {
            let count = Arc::clone(&count);
            app.on(events::DIRECTORY_SYNCED, move |_| *count.lock().unwrap() += 1);
        }
        let uuid = app.project().unwrap().directories()[0].uuid;
        app.sync_directory(uuid).unwrap();
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
