#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use treesource::app::App;
use treesource::config::Config;
use treesource::events::Event;
use uuid::Uuid;

/// A scratch area holding a source tree and a project file location
pub struct TestProject {
    pub temp_dir: TempDir,
    pub app: App,
}

impl TestProject {
    /// Create a fresh project at `<tmp>/project.toml` with nothing tracked
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let mut app = App::new(Config::default());
        app.new_project(&temp_dir.path().join("project.toml"), None, false)?;
        Ok(Self { temp_dir, app })
    }

    /// Get the temporary directory path
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn project_file(&self) -> PathBuf {
        self.path().join("project.toml")
    }

    /// Create `files` (relative, `/`-separated) under `<tmp>/<name>`
    pub fn tree(&self, name: &str, files: &[&str]) -> Result<PathBuf> {
        let root = self.path().join(name);
        fs::create_dir_all(&root)?;
        for file in files {
            let path = root.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, file.as_bytes())?;
        }
        Ok(root)
    }

    /// Track `<tmp>/<name>` after creating `files` in it
    pub fn add_tree(&mut self, name: &str, files: &[&str]) -> Result<Uuid> {
        let root = self.tree(name, files)?;
        Ok(self.app.add_directory(&root, true, false)?)
    }

    /// Entry paths of directory `uuid` in order
    pub fn paths(&self, uuid: Uuid) -> Vec<String> {
        self.app
            .project()
            .and_then(|p| p.directory(uuid))
            .map(|d| d.entries().iter().map(|e| e.path.clone()).collect())
            .unwrap_or_default()
    }

    pub fn directory_count(&self) -> usize {
        self.app.project().map_or(0, |p| p.directories().len())
    }
}

/// Collects `(name, event)` for every emit of the given names
pub fn record(app: &App, names: &[&'static str]) -> Arc<Mutex<Vec<(&'static str, Event)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for &name in names {
        let seen = Arc::clone(&seen);
        app.on(name, move |event| seen.lock().unwrap().push((name, event.clone())));
    }
    seen
}
