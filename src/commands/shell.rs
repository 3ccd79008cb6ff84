//! Interactive shell over the open project.
//!
//! Unlike one-shot commands, edits made in the shell are kept in memory until
//! `save`, so they can be undone and redone freely.

use crate::app::App;
use crate::cli::{ShellCommand, ShellLine};
use crate::commands::execute_edit;
use crate::output;
use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};

const PROMPT: &str = "treesource> ";

/// What the loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the shell until `quit` or end of input
///
/// Errors from individual lines are reported and the shell keeps going.
///
/// # Errors
///
/// Returns an error only if `input` or `out` fail.
pub fn run(app: &mut App, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        if execute_line(app, &line, out)? == Flow::Quit {
            return Ok(());
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    writeln!(out)?;
    if app.unsaved() {
        output::warning("Leaving with unsaved changes");
    }
    Ok(())
}

fn execute_line(app: &mut App, line: &str, out: &mut impl Write) -> Result<Flow> {
    let words = match shell_words::split(line) {
        Ok(words) if words.is_empty() => return Ok(Flow::Continue),
        Ok(words) => words,
        Err(e) => {
            output::error(&format!("Cannot parse line: {e}"));
            return Ok(Flow::Continue);
        }
    };
    let command = match ShellLine::try_parse_from(words) {
        Ok(line) => line.command,
        Err(e) => {
            write!(out, "{e}")?;
            return Ok(Flow::Continue);
        }
    };

    let result = match command {
        ShellCommand::Edit(edit) => execute_edit(app, edit, out),
        ShellCommand::Undo => app.undo().map_err(Into::into),
        ShellCommand::Redo => app.redo().map_err(Into::into),
        ShellCommand::Save { force } => match app.save_project(force) {
            Ok(true) => {
                output::success("Saved");
                Ok(())
            }
            Ok(false) => {
                output::info("Nothing to save");
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        ShellCommand::Status => {
            match app.status() {
                Some(status) => writeln!(out, "{}", output::status_line(&status))?,
                None => writeln!(out, "no project")?,
            }
            Ok(())
        }
        ShellCommand::Quit { force } => {
            if app.unsaved() && !force {
                output::warning("Unsaved changes; 'save' first or 'quit --force'");
                return Ok(Flow::Continue);
            }
            return Ok(Flow::Quit);
        }
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn app_with_tree() -> (App, TempDir) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/a.txt"), "a").unwrap();
        let mut app = App::new(Config::default());
        app.new_project(&temp.path().join("p.toml"), Some(&temp.path().join("src")), false)
            .unwrap();
        (app, temp)
    }

    fn run_script(app: &mut App, script: &str) -> String {
        let mut out = Vec::new();
        run(app, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_undo_redo_across_lines() {
        colored::control::set_override(false);
        let (mut app, temp) = app_with_tree();
        let dir = temp.path().join("src");
        let script = format!(
            "tag {d} a.txt red\nrate {d} a.txt 2\nundo\nstatus\n",
            d = dir.display()
        );

        let out = run_script(&mut app, &script);
        let uuid = app.project().unwrap().directories()[0].uuid;
        let entry = app.project().unwrap().existing_entry(uuid, "a.txt").unwrap();
        assert!(entry.has_tag("red"));
        assert_eq!(entry.rating, 0);
        assert!(out.contains("undo:yes redo:yes"));
    }

    #[test]
    fn test_quit_refuses_unsaved_changes() {
        let (mut app, temp) = app_with_tree();
        let dir = temp.path().join("src");

        let mut out = Vec::new();
        let line = format!("forget {} a.txt", dir.display());
        assert_eq!(execute_line(&mut app, &line, &mut out).unwrap(), Flow::Continue);
        assert_eq!(execute_line(&mut app, "quit", &mut out).unwrap(), Flow::Continue);
        assert_eq!(execute_line(&mut app, "save", &mut out).unwrap(), Flow::Continue);
        assert_eq!(execute_line(&mut app, "quit", &mut out).unwrap(), Flow::Quit);
    }

    #[test]
    fn test_bad_lines_do_not_stop_the_shell() {
        let (mut app, _temp) = app_with_tree();
        let out = run_script(&mut app, "\nbogus\ntag 'unclosed\nrate nowhere a.txt 1\nquit\n");
        assert!(out.contains("bogus"));
        assert!(!app.unsaved());
    }
}
