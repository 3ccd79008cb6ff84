//! Command-line interface definitions for treesource.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary, the interactive shell and
//! build tools (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we allow
//! missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for treesource.
#[derive(Parser)]
#[command(
    name = "treesource",
    version = crate::VERSION,
    about = "Track, tag and rate files across source directories",
    long_about = "Keeps a project of source directories in sync with the filesystem. \
                  Tags and ratings survive files disappearing and reappearing."
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Project file to use instead of the one the session remembers
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a project file and make it the current project
    New {
        /// Project file to create
        file: PathBuf,

        /// First directory to track
        directory: Option<PathBuf>,

        /// Discard unsaved changes of the current project
        #[arg(short, long)]
        force: bool,
    },

    /// Make an existing project file the current project
    Open {
        /// Project file to open
        file: PathBuf,

        /// Discard unsaved changes of the current project
        #[arg(short, long)]
        force: bool,
    },

    /// Forget the current project
    Close {
        /// Close even with unsaved changes
        #[arg(short, long)]
        force: bool,
    },

    #[command(flatten)]
    Edit(EditCommand),

    /// Start an interactive shell with undo and redo
    Shell,

    /// Get and set configuration options
    Config {
        /// Configuration key
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Commands that edit or inspect the open project.
///
/// `DIRECTORY` accepts a directory path, its identifier, or an identifier
/// prefix as printed by `list`.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Track a directory
    Add {
        /// Directory to track
        path: PathBuf,

        /// Also track dotfiles and dot-directories
        #[arg(long)]
        include_dot: bool,

        /// Do not rescan the directory whenever the project is opened
        #[arg(long)]
        no_sync_on_load: bool,
    },

    /// Stop tracking a directory
    Remove {
        /// Directory to drop
        directory: String,
    },

    /// Rescan directories for new, missing and returning files
    Sync {
        /// Directory to rescan (all when omitted)
        directory: Option<String>,
    },

    /// List directories, or the entries of one directory
    List {
        /// Directory whose entries to list
        directory: Option<String>,

        /// Only entries carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only entries flagged missing
        #[arg(short, long)]
        missing: bool,
    },

    /// Add or remove tags on an entry
    Tag {
        directory: String,

        /// Entry path relative to the directory
        path: String,

        #[arg(required = true)]
        tags: Vec<String>,

        /// Remove the tags instead of adding them
        #[arg(short, long)]
        remove: bool,
    },

    /// Rate an entry from 0 (unrated) to 5
    Rate {
        directory: String,

        /// Entry path relative to the directory
        path: String,

        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        rating: u8,
    },

    /// Track a path the last scan has not seen
    Track {
        directory: String,

        /// Entry path relative to the directory
        path: String,
    },

    /// Stop tracking one entry
    Forget {
        directory: String,

        /// Entry path relative to the directory
        path: String,
    },
}

/// A line typed into the interactive shell.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Commands understood by the interactive shell.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    #[command(flatten)]
    Edit(EditCommand),

    /// Reverse the latest edit
    Undo,

    /// Re-apply the latest undone edit
    Redo,

    /// Write the project file
    Save {
        /// Write even when nothing changed
        #[arg(short, long)]
        force: bool,
    },

    /// Show title, save state and history position
    Status,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit {
        /// Leave even with unsaved changes
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
        ShellLine::command().debug_assert();
    }

    #[test]
    fn test_shell_line_parses_edits() {
        let line = ShellLine::try_parse_from(["tag", "photos", "a.jpg", "cat", "red"]).unwrap();
        assert_eq!(
            line.command,
            ShellCommand::Edit(EditCommand::Tag {
                directory: "photos".into(),
                path: "a.jpg".into(),
                tags: vec!["cat".into(), "red".into()],
                remove: false,
            })
        );
        assert_eq!(
            ShellLine::try_parse_from(["exit"]).unwrap().command,
            ShellCommand::Quit { force: false }
        );
        assert!(ShellLine::try_parse_from(["rate", "d", "p", "9"]).is_err());
    }
}
