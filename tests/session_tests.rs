use anyhow::Result;
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use treesource::TreesourceContext;
use treesource::config::Config;
use treesource::session::Session;

fn context(temp: &TempDir) -> Result<TreesourceContext> {
    let config_path = temp.path().join("config/config.toml");
    let mut config = Config::default();
    config.set("core.save_delay_ms", "20")?;
    config.save(&config_path)?;
    TreesourceContext::new_explicit(config_path, temp.path().join("sessions"))
}

#[test]
fn test_session_restores_last_project() -> Result<()> {
    let temp = TempDir::new()?;
    let ctx = context(&temp)?;
    fs::create_dir_all(temp.path().join("src"))?;
    fs::write(temp.path().join("src/a.txt"), "a")?;
    let file = temp.path().join("work.toml");

    {
        let mut app = ctx.open_app(true)?;
        assert!(app.project().is_none());
        app.new_project(&file, Some(&temp.path().join("src")), false)?;
    }

    let app = ctx.open_app(true)?;
    let project = app.project().expect("project restored");
    assert_eq!(project.title, "work");
    assert_eq!(project.directories().len(), 1);
    Ok(())
}

#[test]
fn test_closing_forgets_project() -> Result<()> {
    let temp = TempDir::new()?;
    let ctx = context(&temp)?;
    let file = temp.path().join("p.toml");

    {
        let mut app = ctx.open_app(true)?;
        app.new_project(&file, None, false)?;
        app.close_project(false)?;
    }

    let app = ctx.open_app(true)?;
    assert!(app.project().is_none());
    Ok(())
}

#[test]
fn test_vanished_project_is_not_restored() -> Result<()> {
    let temp = TempDir::new()?;
    let ctx = context(&temp)?;
    let file = temp.path().join("gone.toml");

    {
        let mut app = ctx.open_app(true)?;
        app.new_project(&file, None, false)?;
    }
    fs::remove_file(&file)?;

    let app = ctx.open_app(true)?;
    assert!(app.project().is_none());
    assert!(app.session().unwrap().project().is_none());
    Ok(())
}

#[test]
fn test_burst_of_edits_settles_on_latest_state() -> Result<()> {
    let temp = TempDir::new()?;
    let dir = temp.path().join("sessions");
    let directory = uuid::Uuid::new_v4();

    let view = {
        let mut session = Session::ensure(&dir, "burst", Duration::from_millis(30))?;
        let view = session.add_directory_view(directory);
        for step in ["a", "b", "c", "d"] {
            session.navigate(view, step)?;
        }
        session.navigate(view, "/final")?;
        view
    };

    let session = Session::ensure(&dir, "burst", Duration::from_millis(30))?;
    assert_eq!(session.directory_view(view).unwrap().wd, "final");
    Ok(())
}

#[test]
#[serial]
fn test_default_context_honours_environment() -> Result<()> {
    let temp = TempDir::new()?;
    let config_path = temp.path().join("custom.toml");
    let sessions = temp.path().join("my-sessions");

    // SAFETY: serialized with every other test touching the environment.
    unsafe {
        std::env::set_var("TREESOURCE_CONFIG_PATH", &config_path);
        std::env::set_var("TREESOURCE_SESSIONS_DIR", &sessions);
    }
    let ctx = TreesourceContext::new();
    unsafe {
        std::env::remove_var("TREESOURCE_CONFIG_PATH");
        std::env::remove_var("TREESOURCE_SESSIONS_DIR");
    }

    let ctx = ctx?;
    assert_eq!(ctx.config_path, config_path);
    assert_eq!(ctx.sessions_dir, sessions);
    assert!(config_path.exists());
    Ok(())
}
