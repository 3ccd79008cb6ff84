use crate::app::App;
use crate::output;
use crate::utils::expand_tilde;
use anyhow::{Context, Result};
use std::path::Path;

/// Execute new command to create and open a project file
///
/// # Errors
///
/// Returns an error if:
/// - The current project has unsaved changes and `force` is not set
/// - The first directory cannot be added
/// - The project file cannot be written
pub fn new(app: &mut App, file: &Path, directory: Option<&Path>, force: bool) -> Result<()> {
    if file.exists() && !force {
        anyhow::bail!(
            "{} already exists; use 'treesource open' or --force",
            file.display()
        );
    }
    let directory = directory
        .map(|d| expand_tilde(&d.to_string_lossy()))
        .transpose()?;
    app.new_project(file, directory.as_deref(), force)
        .with_context(|| format!("Failed to create project {}", file.display()))?;

    if let Some(project) = app.project() {
        output::success(&format!(
            "Created project '{}' at {}",
            project.title,
            project.path.display()
        ));
    }
    Ok(())
}

/// Execute open command to make a project file current
///
/// # Errors
///
/// Returns an error if:
/// - The current project has unsaved changes and `force` is not set
/// - The file cannot be read or is not a project
pub fn open(app: &mut App, file: &Path, force: bool) -> Result<()> {
    let failures = app
        .load_project(file, force)
        .with_context(|| format!("Failed to open project {}", file.display()))?;
    for failure in failures {
        output::warning(&failure.to_string());
    }
    if let Some(project) = app.project() {
        output::success(&format!(
            "Opened project '{}' ({} directories)",
            project.title,
            project.directories().len()
        ));
    }
    Ok(())
}

/// Execute close command to forget the current project
///
/// # Errors
///
/// Returns an error if no project is open or it has unsaved changes and
/// `force` is not set.
pub fn close(app: &mut App, force: bool) -> Result<()> {
    let title = app.project().map(|p| p.title.clone()).unwrap_or_default();
    app.close_project(force)?;
    output::info(&format!("Closed project '{title}'"));
    Ok(())
}
