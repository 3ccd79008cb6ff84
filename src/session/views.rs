//! Views a session keeps open.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A browser over one project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryView {
    /// View identifier.
    pub uuid: Uuid,
    /// Project directory being browsed.
    pub directory: Uuid,
    /// Working sub-path, `/`-separated, empty for the directory root.
    #[serde(default)]
    pub wd: String,
    /// Selected entry paths.
    #[serde(default)]
    pub selected: Vec<String>,
    /// Entry path with keyboard focus.
    #[serde(default)]
    pub focused: String,
}

impl DirectoryView {
    /// A view at the root of `directory`.
    #[must_use]
    pub fn new(directory: Uuid) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            directory,
            wd: String::new(),
            selected: Vec::new(),
            focused: String::new(),
        }
    }

    /// Move the working sub-path.
    ///
    /// `..` goes to the parent, `/` to the root, a path starting with `/` is
    /// taken from the root and anything else is relative to the current
    /// working sub-path.
    pub fn navigate(&mut self, target: &str) {
        self.wd = resolve(&self.wd, target);
    }
}

/// A filtered listing of entries carrying some tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsView {
    /// View identifier.
    pub uuid: Uuid,
    /// Tags an entry must carry to be listed.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Selected entry paths.
    #[serde(default)]
    pub selected: Vec<String>,
    /// Entry path with keyboard focus.
    #[serde(default)]
    pub focused: String,
}

impl TagsView {
    /// A view filtering on `tags`.
    #[must_use]
    pub fn new(tags: Vec<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            tags,
            selected: Vec::new(),
            focused: String::new(),
        }
    }
}

fn resolve(wd: &str, target: &str) -> String {
    match target {
        ".." => wd
            .rsplit_once('/')
            .map(|(parent, _)| parent.to_string())
            .unwrap_or_default(),
        "/" => String::new(),
        _ => {
            let joined = match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None if wd.is_empty() => target.to_string(),
                None => format!("{wd}/{target}"),
            };
            normalize(&joined)
        }
    }
}

/// Collapse `.`, `..` and empty components.
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    parts.join("/")
}
