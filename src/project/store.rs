//! Project files on disk.
//!
//! A project is stored as a single TOML document. Only the title and the
//! directories (with their entries) are persisted; the file location and the
//! event buses belong to the running process.

use crate::error::{Result, TreeError};
use crate::project::Project;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Encode `project` as a TOML document.
///
/// # Errors
///
/// [`TreeError::Serialize`] if encoding fails.
pub fn marshal(project: &Project) -> Result<Vec<u8>> {
    let text = toml::to_string_pretty(project).map_err(|source| TreeError::Serialize {
        what: "project",
        source,
    })?;
    Ok(text.into_bytes())
}

/// Decode a project previously produced by [`marshal`], recording `path` as
/// its location.
///
/// # Errors
///
/// [`TreeError::Deserialize`] if `bytes` is not a valid project document.
pub fn unmarshal(bytes: &[u8], path: &Path) -> Result<Project> {
    let text = String::from_utf8_lossy(bytes);
    let mut project: Project = toml::from_str(&text).map_err(|source| TreeError::Deserialize {
        what: "project",
        source,
    })?;
    project.path = path.to_path_buf();
    Ok(project)
}

/// Write `project` to its own path, creating parent directories as needed.
///
/// # Errors
///
/// [`TreeError::Io`] if the file cannot be written.
pub fn save(project: &Project) -> Result<()> {
    let bytes = marshal(project)?;
    if let Some(parent) = project.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TreeError::io(parent, e))?;
    }
    fs::write(&project.path, bytes).map_err(|e| TreeError::io(&project.path, e))?;
    debug!(path = %project.path.display(), "Project written");
    Ok(())
}

/// Read the project stored at `path`.
///
/// # Errors
///
/// [`TreeError::Io`] if the file cannot be read, [`TreeError::Deserialize`]
/// if it is not a project.
pub fn load(path: &Path) -> Result<Project> {
    let bytes = fs::read(path).map_err(|e| TreeError::io(path, e))?;
    unmarshal(&bytes, path)
}
