pub mod config;
pub mod project;
pub mod shell;

use crate::app::App;
use crate::cli::EditCommand;
use crate::error::TreeError;
use crate::output;
use crate::utils::expand_tilde;
use anyhow::{Context, Result};
use std::io::Write;
use uuid::Uuid;

/// Execute one project edit or listing
///
/// Listings are written to `out`; confirmations go through [`output`].
///
/// # Errors
///
/// Returns an error if:
/// - No project is open
/// - A directory argument matches no tracked directory
/// - The edit is rejected (already tracked, missing entry, ...)
pub fn execute_edit(app: &mut App, command: EditCommand, out: &mut impl Write) -> Result<()> {
    match command {
        EditCommand::Add {
            path,
            include_dot,
            no_sync_on_load,
        } => {
            let path = expand_tilde(&path.to_string_lossy())?;
            let tracking = &app.config().tracking;
            let ignore_dot = tracking.ignore_dot && !include_dot;
            let sync_on_load = tracking.sync_on_load && !no_sync_on_load;
            let uuid = app.add_directory(&path, ignore_dot, sync_on_load)?;
            let count = app
                .project()
                .and_then(|p| p.directory(uuid))
                .map_or(0, |d| d.entries().len());
            output::action("Added", &format!("{} ({count} entries)", path.display()));
        }
        EditCommand::Remove { directory } => {
            let uuid = resolve(app, &directory)?;
            app.remove_directory(uuid)?;
            output::action("Removed", &directory);
        }
        EditCommand::Sync { directory } => {
            let targets = match directory {
                Some(query) => vec![resolve(app, &query)?],
                None => app
                    .project()
                    .map(|p| p.directories().iter().map(|d| d.uuid).collect())
                    .unwrap_or_default(),
            };
            if app.project().is_none() {
                return Err(TreeError::NoProject.into());
            }
            for uuid in targets {
                sync_one(app, uuid)?;
            }
        }
        EditCommand::List {
            directory,
            tag,
            missing,
        } => list(app, directory.as_deref(), tag.as_deref(), missing, out)?,
        EditCommand::Tag {
            directory,
            path,
            tags,
            remove,
        } => {
            let uuid = resolve(app, &directory)?;
            if remove {
                app.untag(uuid, &path, &tags)?;
                output::action("Untagged", &format!("{path}: {}", tags.join(", ")));
            } else {
                app.tag(uuid, &path, &tags)?;
                output::action("Tagged", &format!("{path}: {}", tags.join(", ")));
            }
        }
        EditCommand::Rate {
            directory,
            path,
            rating,
        } => {
            let uuid = resolve(app, &directory)?;
            app.rate(uuid, &path, rating)?;
            output::action("Rated", &format!("{path}: {rating}"));
        }
        EditCommand::Track { directory, path } => {
            let uuid = resolve(app, &directory)?;
            app.add_entry(uuid, &path)?;
            output::action("Tracking", &path);
        }
        EditCommand::Forget { directory, path } => {
            let uuid = resolve(app, &directory)?;
            app.remove_entry(uuid, &path)?;
            output::action("Forgot", &path);
        }
    }
    Ok(())
}

/// Resolve a directory argument to its identifier
fn resolve(app: &App, query: &str) -> Result<Uuid> {
    if app.project().is_none() {
        return Err(TreeError::NoProject.into());
    }
    let lookup = expand_tilde(query)
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| query.to_string());
    app.find_directory(&lookup)
        .or_else(|| app.find_directory(query))
        .with_context(|| format!("No tracked directory matches '{query}'"))
}

fn sync_one(app: &mut App, uuid: Uuid) -> Result<()> {
    match app.sync_directory(uuid) {
        Ok(report) => {
            output::action(
                "Synced",
                &format!(
                    "{uuid}: {} added, {} found, {} missing",
                    report.added, report.found, report.missing
                ),
            );
            Ok(())
        }
        Err(TreeError::Sync(err)) => {
            output::warning(&err.to_string());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn list(
    app: &App,
    directory: Option<&str>,
    tag: Option<&str>,
    missing: bool,
    out: &mut impl Write,
) -> Result<()> {
    let project = app.project().ok_or(TreeError::NoProject)?;
    let Some(query) = directory else {
        for dir in project.directories() {
            writeln!(out, "{}", output::directory_line(dir))?;
        }
        return Ok(());
    };

    let uuid = resolve(app, query)?;
    let dir = project
        .directory(uuid)
        .ok_or(TreeError::MissingDirectory { uuid })?;
    writeln!(out, "{}", output::directory_line(dir))?;
    for entry in dir.entries() {
        if tag.is_some_and(|t| !entry.has_tag(t)) || (missing && !entry.missing) {
            continue;
        }
        writeln!(out, "{}", output::entry_line(entry))?;
    }
    Ok(())
}
