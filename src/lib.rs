#![warn(missing_docs)]
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Treesource - Tagged File Tracking Across Source Directories
//!
//! Treesource keeps a *project*: an ordered set of source directories on disk,
//! each with the list of files found inside it. Files can be tagged and rated;
//! that metadata survives files disappearing from disk and coming back, since a
//! rescan only flags entries as missing and never drops them.
//!
//! ## Architecture
//!
//! - [`events`]: named-event buses every layer reports through
//! - [`tracking`]: directories, entries and the filesystem synchronizer
//! - [`history`]: generic undo/redo over reversible actions
//! - [`project`]: the project aggregate, its actions and its file format
//! - [`session`]: open views and debounced session persistence
//! - [`app`]: the facade a host (CLI, GUI) drives
//! - [`config`], [`cli`], [`commands`], [`output`], [`utils`]: the command-line host
//!
//! ## Example Usage
//!
//! ```no_run
//! use treesource::app::App;
//! use treesource::config::Config;
//! use std::path::Path;
//!
//! # fn main() -> treesource::error::Result<()> {
//! let mut app = App::new(Config::default());
//! app.new_project(Path::new("photos.toml"), Some(Path::new("/srv/photos")), false)?;
//!
//! let uuid = app.project().map(|p| p.directories()[0].uuid).unwrap_or_default();
//! app.tag(uuid, "2024/cat.jpg", &["cat".to_string()])?;
//! app.undo()?;
//! app.save_project(false)?;
//! # Ok(())
//! # }
//! ```

/// Host-facing facade: project lifecycle, undoable edits, session restore.
pub mod app;

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations behind the CLI and the interactive shell.
pub mod commands;

/// Configuration loading and key access.
pub mod config;

/// Error taxonomy.
pub mod error;

/// Named-event buses and event payloads.
pub mod events;

/// Undo/redo engine.
pub mod history;

/// Output formatting and styling.
pub mod output;

/// Project aggregate, actions and storage.
pub mod project;

/// Views and session persistence.
pub mod session;

/// Tracked directories, entries and filesystem synchronization.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the treesource binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a CLI invocation needs before it can build an [`app::App`].
///
/// # Examples
///
/// ```no_run
/// use treesource::TreesourceContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Default locations
/// let ctx = TreesourceContext::new()?;
///
/// // Explicit locations (for testing)
/// let ctx = TreesourceContext::new_explicit(
///     "/tmp/ts/config.toml".into(),
///     "/tmp/ts/sessions".into(),
/// )?;
/// let app = ctx.open_app(true)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TreesourceContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Directory holding session files.
    pub sessions_dir: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl TreesourceContext {
    /// Load the configuration from its default location.
    ///
    /// `TREESOURCE_CONFIG_PATH` and `TREESOURCE_SESSIONS_DIR` override the
    /// locations under the user config directory.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or if the
    /// configuration file cannot be read or created.
    pub fn new() -> Result<Self> {
        let config_path =
            config::Config::default_path().context("Could not find config directory")?;
        let sessions_dir = if let Ok(path) = std::env::var("TREESOURCE_SESSIONS_DIR") {
            PathBuf::from(path)
        } else {
            session::sessions_dir().context("Could not find config directory")?
        };
        Self::new_explicit(config_path, sessions_dir)
    }

    /// Load the configuration from explicit locations.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(config_path: PathBuf, sessions_dir: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path)?;
        Ok(Self {
            config_path,
            sessions_dir,
            config,
        })
    }

    /// Build an app with the configured session open, reopening the project
    /// that session remembers when `restore` is set.
    ///
    /// # Errors
    /// Returns an error if the session cannot be opened or the remembered
    /// project cannot be loaded.
    pub fn open_app(&self, restore: bool) -> Result<app::App> {
        let mut app = app::App::new(self.config.clone());
        app.open_session(&self.sessions_dir)
            .with_context(|| format!("Failed to open session in {}", self.sessions_dir.display()))?;
        if restore && let Some(failures) = app.restore_session()? {
            for failure in failures {
                output::warning(&failure.to_string());
            }
        }
        Ok(app)
    }
}
