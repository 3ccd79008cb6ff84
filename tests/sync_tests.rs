mod common;

use anyhow::Result;
use common::{TestProject, record};
use rstest::rstest;
use std::fs;
use treesource::events::{self, Event};
use treesource::tracking::Directory;

#[rstest]
#[case::dotfiles_hidden(true, vec!["a.txt", "docs/readme.md"])]
#[case::dotfiles_tracked(false, vec![".env", ".git/HEAD", "a.txt", "docs/readme.md"])]
fn test_first_scan_respects_ignore_dot(
    #[case] ignore_dot: bool,
    #[case] expected: Vec<&str>,
) -> Result<()> {
    let t = TestProject::new()?;
    let root = t.tree("src", &["a.txt", "docs/readme.md", ".env", ".git/HEAD"])?;

    let mut dir = Directory::new(&root, ignore_dot, false);
    let report = dir.sync_entries()?;

    let paths: Vec<&str> = dir.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, expected);
    assert_eq!(report.added, expected.len());
    Ok(())
}

#[rstest]
#[case::nothing_changed(&[], &[], 0, 0, 0)]
#[case::one_new_file(&["c.txt"], &[], 1, 0, 0)]
#[case::one_deleted(&[], &["a.txt"], 0, 0, 1)]
#[case::replaced(&["c.txt"], &["b.txt"], 1, 0, 1)]
fn test_rescan_reports_changes(
    #[case] create: &[&str],
    #[case] delete: &[&str],
    #[case] added: usize,
    #[case] found: usize,
    #[case] missing: usize,
) -> Result<()> {
    let mut t = TestProject::new()?;
    let uuid = t.add_tree("src", &["a.txt", "b.txt"])?;
    t.app.save_project(false)?;
    let root = t.path().join("src");
    for file in create {
        fs::write(root.join(file), "new")?;
    }
    for file in delete {
        fs::remove_file(root.join(file))?;
    }

    let report = t.app.sync_directory(uuid)?;
    assert_eq!((report.added, report.found, report.missing), (added, found, missing));
    assert_eq!(t.app.unsaved(), report.changed());
    Ok(())
}

#[test]
fn test_missing_entries_keep_tags_and_come_back() -> Result<()> {
    let mut t = TestProject::new()?;
    let uuid = t.add_tree("src", &["a.txt"])?;
    t.app.tag(uuid, "a.txt", &["keep".to_string()])?;
    let file = t.path().join("src/a.txt");

    fs::remove_file(&file)?;
    t.app.sync_directory(uuid)?;
    let entry = t.app.project().unwrap().existing_entry(uuid, "a.txt")?;
    assert!(entry.missing);
    assert!(entry.has_tag("keep"));

    fs::write(&file, "back")?;
    let report = t.app.sync_directory(uuid)?;
    assert_eq!(report.found, 1);
    let entry = t.app.project().unwrap().existing_entry(uuid, "a.txt")?;
    assert!(!entry.missing);
    assert!(entry.has_tag("keep"));
    assert_eq!(t.paths(uuid), vec!["a.txt"]);
    Ok(())
}

#[test]
fn test_sync_event_order_on_project_bus() -> Result<()> {
    let mut t = TestProject::new()?;
    let uuid = t.add_tree("src", &["a.txt", "b.txt"])?;
    let root = t.path().join("src");
    fs::remove_file(root.join("a.txt"))?;
    fs::write(root.join("c.txt"), "c")?;

    let seen = record(
        &t.app,
        &[
            events::DIRECTORY_SYNC,
            events::ENTRY_ADD,
            events::ENTRY_MISSING,
            events::DIRECTORY_SYNCED,
        ],
    );
    t.app.sync_directory(uuid)?;

    let names: Vec<_> = seen.lock().unwrap().iter().map(|(n, _)| *n).collect();
    assert_eq!(
        names,
        vec![
            events::DIRECTORY_SYNC,
            events::ENTRY_ADD,
            events::ENTRY_MISSING,
            events::DIRECTORY_SYNCED,
        ]
    );
    Ok(())
}

#[test]
fn test_sync_is_not_undoable() -> Result<()> {
    let mut t = TestProject::new()?;
    let uuid = t.add_tree("src", &["a.txt"])?;
    t.app.save_project(false)?;
    let before = t.app.history().unwrap().pos();

    fs::write(t.path().join("src/z.txt"), "z")?;
    t.app.sync_directory(uuid)?;
    assert_eq!(t.app.history().unwrap().pos(), before);

    t.app.undo()?;
    assert_eq!(t.directory_count(), 0);
    // Redo reinserts the snapshot taken when the directory was added.
    t.app.redo()?;
    assert_eq!(t.paths(uuid), vec!["a.txt"]);
    Ok(())
}

#[test]
fn test_sync_finished_carries_no_error_on_success() -> Result<()> {
    let mut t = TestProject::new()?;
    let uuid = t.add_tree("src", &["a.txt"])?;
    let seen = record(&t.app, &[events::DIRECTORY_SYNCED]);

    t.app.sync_directory(uuid)?;
    let seen = seen.lock().unwrap();
    assert!(matches!(
        &seen[0].1,
        Event::SyncFinished { error: None, uuid: u, .. } if *u == uuid
    ));
    Ok(())
}
