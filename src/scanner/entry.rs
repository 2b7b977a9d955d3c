use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

// ─── Core types ───────────────────────────────────────────────────────────────

/// What a profile entry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// `*.sbd` directory holding a folder's subfolders
    Container,
    /// `*.msf` folder index file
    Index,
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Container => write!(f, "container"),
            EntryKind::Index => write!(f, "index"),
            EntryKind::Other => write!(f, "other"),
        }
    }
}

/// A file system object inside a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl Entry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Two or more entries of one kind sharing a base name in one directory
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateSet {
    pub parent: PathBuf,
    pub base_name: String,
    pub kind: EntryKind,
    /// Traversal order
    pub members: Vec<Entry>,
}

impl DuplicateSet {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Name markers that identify containers and index files
#[derive(Debug, Clone)]
pub struct Markers {
    pub container: String,
    pub index: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            container: ".sbd".to_string(),
            index: ".msf".to_string(),
        }
    }
}

impl Markers {
    /// Classify a name: returns its kind and base name, or `None` if it
    /// carries neither marker. The base name is everything before the last
    /// marker occurrence, so `Foo.msf`, `Foo.msf.bak` and `Foo.msf~` all map
    /// to `Foo`, while the index of a folder called `Foo.msf` maps to `Foo.msf`.
    pub fn classify(&self, name: &OsStr, is_dir: bool) -> Option<(EntryKind, String)> {
        let name = name.to_string_lossy();
        let (kind, marker) = if is_dir {
            (EntryKind::Container, self.container.as_str())
        } else {
            (EntryKind::Index, self.index.as_str())
        };
        let pos = name.rfind(marker)?;
        if pos == 0 {
            return None;
        }
        Some((kind, name[..pos].to_string()))
    }

    /// Whether a directory is a container by its own name
    pub fn is_container(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| self.classify(n, true).is_some())
            .unwrap_or(false)
    }
}
