//! Reconciles a directory's entries with what is on disk.
//!
//! A scan walks the directory tree depth-first (siblings in file-name order)
//! and matches every non-directory file against the in-memory entries purely
//! by relative path:
//!
//! - an unknown path becomes a new entry (`entry-added`),
//! - a known path that was flagged missing is cleared (`entry-found`),
//! - a known entry that was not seen is flagged missing (`entry-missing`).
//!
//! Entries are never deleted by a scan. Unreadable subtrees are collected into
//! a [`SyncError`] while the walk carries on with their siblings; whatever was
//! reconciled before and after a failure stays applied.

use crate::error::SyncError;
use crate::events::{self, Event};
use crate::tracking::{Directory, Entry};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{Level, info, span, warn};
use walkdir::{DirEntry, WalkDir};

/// What a single scan changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files seen on disk.
    pub scanned: usize,
    /// New entries created.
    pub added: usize,
    /// Missing entries that reappeared.
    pub found: usize,
    /// Entries newly flagged as missing.
    pub missing: usize,
    /// Files left alone because their path is not valid UTF-8.
    pub skipped: usize,
}

impl SyncReport {
    /// Whether the scan modified any entry.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.added + self.found + self.missing > 0
    }
}

impl Directory {
    /// Walk the directory on disk and reconcile its entries.
    ///
    /// Emits `sync-started`, then `entry-added` / `entry-found` as files are
    /// walked, then `entry-missing` for every entry newly flagged, then
    /// `sync-finished` whether or not the walk hit errors. Running it twice
    /// without touching the disk in between emits no entry events the second
    /// time.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] listing every path that could not be read. The
    /// reconciliation described by [`SyncError::partial`] has still been
    /// applied.
    pub fn sync_entries(&mut self) -> Result<SyncReport, SyncError> {
        let span = span!(Level::DEBUG, "sync_entries", directory = %self.uuid);
        let _guard = span.enter();

        self.emit(
            events::SYNC_STARTED,
            &Event::SyncStarted {
                uuid: self.uuid,
                path: self.path.clone(),
            },
        );

        let mut known: HashMap<String, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.path.clone(), i))
            .collect();
        let mut unmatched: HashSet<String> = known.keys().cloned().collect();
        let mut report = SyncReport::default();
        let mut failures = Vec::new();

        let ignore_dot = self.ignore_dot;
        let walker = WalkDir::new(&self.path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !(ignore_dot && is_hidden(e)));

        for item in walker {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable path");
                    failures.push(err);
                    continue;
                }
            };
            if item.file_type().is_dir() {
                continue;
            }
            let Some(relative) = relative_path(&self.path, item.path()) else {
                if item.depth() > 0 {
                    warn!(path = %item.path().display(), "Skipping path that is not valid UTF-8");
                    report.skipped += 1;
                }
                continue;
            };
            report.scanned += 1;

            if let Some(&index) = known.get(&relative) {
                if unmatched.remove(&relative) && self.entries[index].missing {
                    self.entries[index].missing = false;
                    report.found += 1;
                    self.emit_entry(events::ENTRY_FOUND, &self.entries[index]);
                }
            } else {
                self.entries.push(Entry::new(relative.clone()));
                let index = self.entries.len() - 1;
                known.insert(relative, index);
                report.added += 1;
                self.emit_entry(events::ENTRY_ADDED, &self.entries[index]);
            }
        }

        let vanished: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.missing && unmatched.contains(&e.path))
            .map(|(i, _)| i)
            .collect();
        for index in vanished {
            self.entries[index].missing = true;
            report.missing += 1;
            self.emit_entry(events::ENTRY_MISSING, &self.entries[index]);
        }

        info!(
            scanned = report.scanned,
            added = report.added,
            found = report.found,
            missing = report.missing,
            skipped = report.skipped,
            failures = failures.len(),
            "Directory synchronized"
        );

        let result = if failures.is_empty() {
            Ok(report)
        } else {
            Err(SyncError {
                root: self.path.clone(),
                failures,
                partial: report,
            })
        };

        self.emit(
            events::SYNC_FINISHED,
            &Event::SyncFinished {
                uuid: self.uuid,
                path: self.path.clone(),
                error: result.as_ref().err().map(ToString::to_string),
            },
        );

        result
    }
}

/// Whether a walked item (not the root itself) is a dotfile or dot-directory.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// `path` relative to `root`, `/`-separated. `None` for the root itself and
/// for paths that are not valid UTF-8, which would otherwise collide once
/// their invalid bytes were replaced.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
