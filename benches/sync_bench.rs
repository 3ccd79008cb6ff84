use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::tempdir;
use treesource::history::History;
use treesource::project::Project;
use treesource::tracking::{Directory, Entry};

fn create_tree(root: &Path, dirs: usize, files_per_dir: usize) {
    for d in 0..dirs {
        let dir = root.join(format!("dir_{d}"));
        fs::create_dir_all(&dir).unwrap();
        for f in 0..files_per_dir {
            fs::write(dir.join(format!("file_{f}.txt")), "x").unwrap();
        }
    }
}

fn benchmark_first_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_scan");

    for dirs in &[10, 50, 100] {
        let temp = tempdir().unwrap();
        create_tree(temp.path(), *dirs, 20);

        group.bench_with_input(BenchmarkId::from_parameter(dirs * 20), dirs, |b, _| {
            b.iter(|| {
                let mut directory = Directory::new(temp.path(), true, false);
                black_box(directory.sync_entries().unwrap())
            });
        });
    }

    group.finish();
}

fn benchmark_rescan(c: &mut Criterion) {
    let temp = tempdir().unwrap();
    create_tree(temp.path(), 50, 20);
    let mut directory = Directory::new(temp.path(), true, false);
    directory.sync_entries().unwrap();

    // Half the tree vanishes: every rescan walks the missing bookkeeping.
    for d in 0..25 {
        fs::remove_dir_all(temp.path().join(format!("dir_{d}"))).unwrap();
    }

    c.bench_function("rescan_1000_entries_half_missing", |b| {
        b.iter(|| black_box(directory.sync_entries().unwrap()));
    });
}

fn benchmark_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");

    for count in &[100, 1000] {
        group.bench_with_input(BenchmarkId::new("tag_then_undo_all", count), count, |b, &count| {
            b.iter(|| {
                let directory = Directory::new("/bench", true, false)
                    .with_entries((0..count).map(|i| Entry::new(format!("file_{i}"))));
                let uuid = directory.uuid;
                let mut history = History::new(Project::new("bench.toml"));
                let action = history.target().add_directory_action(directory).unwrap();
                history.push_and_apply(action);

                for i in 0..count {
                    let entry = Entry::new(format!("file_{i}")).with_tags(["bench"]);
                    let action = history.target().update_entry_action(uuid, entry).unwrap();
                    history.push_and_apply(action);
                }
                while history.undoable() {
                    history.undo();
                }
                black_box(history.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_first_scan, benchmark_rescan, benchmark_history);
criterion_main!(benches);
