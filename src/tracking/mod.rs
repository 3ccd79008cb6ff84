//! Tracked directories and the files inside them.
//!
//! A [`Directory`] is a source root on disk. Its [`Entry`] values record the
//! files the project knows about, in the order they were discovered, together
//! with user tags and ratings. [`Directory::sync_entries`] reconciles that list
//! with the filesystem without ever dropping an entry the user may have tagged.
//!
//! # Usage
//!
//! ```no_run
//! use treesource::tracking::Directory;
//!
//! let mut photos = Directory::new("/srv/photos", true, true);
//! photos.on(treesource::events::ENTRY_ADDED, |event| println!("{event:?}"));
//! let report = photos.sync_entries()?;
//! println!("{} new files", report.added);
//! # Ok::<(), treesource::error::SyncError>(())
//! ```

pub mod directory;
pub mod entry;
pub mod scanner;

pub use directory::Directory;
pub use entry::Entry;
pub use scanner::SyncReport;
