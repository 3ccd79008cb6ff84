//! Terminal output for the treesource CLI.
//!
//! Library code logs through `tracing`; only the binary prints. Messages go
//! to stderr so listings on stdout stay pipeable:
//! - dimmed colors for routine messages
//! - bold colors for warnings and errors
//! - verbosity control (quiet, normal, verbose)

use crate::events::ProjectStatus;
use crate::tracking::{Directory, Entry};
use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.green());
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a git-style action message with dimmed verb and normal message.
pub fn action(verb: &str, message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", verb.dimmed().bold(), message);
}

/// One-line summary of a tracked directory: short id, path, entry counts.
#[must_use]
pub fn directory_line(directory: &Directory) -> String {
    let id = directory.uuid.simple().to_string();
    let missing = directory.missing_entries().count();
    let mut line = format!(
        "{} {} ({} entries",
        id[..8].yellow(),
        directory.path.display(),
        directory.entries().len()
    );
    if missing > 0 {
        line.push_str(&format!(", {}", format!("{missing} missing").red()));
    }
    line.push(')');
    line
}

/// One-line rendering of an entry: path, rating as stars, tags.
#[must_use]
pub fn entry_line(entry: &Entry) -> String {
    let path = if entry.missing {
        entry.path.red().strikethrough().to_string()
    } else {
        entry.path.clone()
    };
    let mut line = format!("  {path}");
    if entry.rating > 0 {
        line.push(' ');
        line.push_str(&"*".repeat(usize::from(entry.rating)).yellow().to_string());
    }
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        line.push_str(&format!(" [{}]", tags.join(", ").cyan()));
    }
    line
}

/// Status line shown by the shell.
#[must_use]
pub fn status_line(status: &ProjectStatus) -> String {
    let state = if status.unsaved {
        "modified".yellow()
    } else {
        "saved".green()
    };
    format!(
        "{} ({}) undo:{} redo:{}",
        status.title.bold(),
        state,
        if status.undoable { "yes" } else { "no" },
        if status.redoable { "yes" } else { "no" },
    )
}
