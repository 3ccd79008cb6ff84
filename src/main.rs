use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use std::io;
use std::process;
use tracing_subscriber::prelude::*;
use treesource::cli::{Cli, Commands};
use treesource::events::{self, Event};
use treesource::output::{self, Verbosity};
use treesource::{TreesourceContext, commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

/// Initialize tracing on stderr, filtered by `TREESOURCE_LOG`
fn init_tracing(verbose: bool) {
    let default = if verbose { "treesource=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("TREESOURCE_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    output::set_verbosity(if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    match &cli.command {
        Commands::Completion { shell } => {
            print_completions(*shell, &mut Cli::command());
            return Ok(());
        }
        Commands::Config { key, value, list } => {
            let mut ctx = TreesourceContext::new()?;
            return commands::config::execute(&mut ctx, key.as_deref(), value.as_deref(), *list);
        }
        _ => {}
    }

    let ctx = TreesourceContext::new()?;
    let restore = cli.project.is_none()
        && !matches!(cli.command, Commands::New { .. } | Commands::Open { .. });
    let mut app = ctx.open_app(restore)?;
    app.on(events::DIRECTORY_SYNCED, |event| {
        if let Event::SyncFinished {
            error: Some(error), ..
        } = event
        {
            output::warning(error);
        }
    });
    if let Some(project) = &cli.project {
        commands::project::open(&mut app, project, false)?;
    }

    match cli.command {
        Commands::New {
            file,
            directory,
            force,
        } => commands::project::new(&mut app, &file, directory.as_deref(), force)?,
        Commands::Open { file, force } => commands::project::open(&mut app, &file, force)?,
        Commands::Close { force } => commands::project::close(&mut app, force)?,
        Commands::Edit(edit) => {
            commands::execute_edit(&mut app, edit, &mut io::stdout().lock())?;
            // Nothing can undo a one-shot edit later; write it now.
            if app.unsaved() {
                app.save_project(false)?;
            }
        }
        Commands::Shell => {
            commands::shell::run(&mut app, io::stdin().lock(), &mut io::stdout().lock())?;
        }
        Commands::Config { .. } | Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
