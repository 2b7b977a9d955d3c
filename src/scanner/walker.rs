use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::entry::{DuplicateSet, Entry, EntryKind, Markers};
use super::listing::list_dir;
use crate::common::errors::AuditError;

/// Options for a duplicate scan
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub markers: Markers,
    /// Substrings of paths whose subtrees are skipped
    pub exclude: Vec<String>,
}

type DirWalk = Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>;

/// Lazily walks a profile tree and yields duplicate sets directory by
/// directory.
///
/// Only entries of the same directory are compared: a `Foo.msf` in
/// `Inbox.sbd` and another in `Inbox.sbd/Archive.sbd` are different folders.
/// The walk is sorted by file name, so an unchanged tree always yields the
/// same sets with members in the same order. The iterator is single pass.
pub struct DuplicateScanner {
    root: PathBuf,
    dirs: DirWalk,
    markers: Markers,
    pending: VecDeque<DuplicateSet>,
    warnings: Vec<AuditError>,
    reported: HashSet<PathBuf>,
    dirs_visited: usize,
}

impl DuplicateScanner {
    pub fn new(root: &Path, options: ScanOptions) -> Result<Self, AuditError> {
        if !root.is_dir() {
            return Err(AuditError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let exclude = options.exclude;
        let base = root.to_path_buf();
        let dirs = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                if !e.file_type().is_dir() {
                    return false;
                }
                if e.depth() == 0 {
                    return true;
                }
                // Only the part below the root counts, wherever the profile lives
                let relative = e.path().strip_prefix(&base).unwrap_or(e.path());
                let relative = relative.to_string_lossy();
                !exclude.iter().any(|p| relative.contains(p.as_str()))
            });

        Ok(Self {
            root: root.to_path_buf(),
            dirs: Box::new(dirs),
            markers: options.markers,
            pending: VecDeque::new(),
            warnings: Vec::new(),
            reported: HashSet::new(),
            dirs_visited: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directories and entries skipped so far
    pub fn warnings(&self) -> &[AuditError] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<AuditError> {
        self.warnings
    }

    pub fn dirs_visited(&self) -> usize {
        self.dirs_visited
    }

    fn skip_dir(&mut self, path: PathBuf, source: std::io::Error) {
        if !self.reported.insert(path.clone()) {
            return;
        }
        warn!("skipping unreadable directory {}: {}", path.display(), source);
        self.warnings
            .push(AuditError::UnreadableDirectory { path, source });
    }

    /// Group the marked entries of one directory
    fn scan_dir(&mut self, dir: &Path) {
        let listing = match list_dir(dir) {
            Ok(listing) => listing,
            Err(e) => {
                self.skip_dir(dir.to_path_buf(), e);
                return;
            }
        };
        for warning in listing.warnings {
            match warning {
                AuditError::UnreadableDirectory { path, source } => self.skip_dir(path, source),
                other => {
                    warn!("{}", other);
                    self.warnings.push(other);
                }
            }
        }

        let mut groups: BTreeMap<(EntryKind, String), Vec<Entry>> = BTreeMap::new();
        for (path, is_dir) in listing.children {
            let Some(name) = path.file_name() else {
                continue;
            };
            if let Some((kind, base)) = self.markers.classify(name, is_dir) {
                groups.entry((kind, base)).or_default().push(Entry { path, kind });
            }
        }

        for ((kind, base_name), members) in groups {
            if members.len() < 2 {
                continue;
            }
            debug!(
                "duplicate {} '{}' x{} in {}",
                kind,
                base_name,
                members.len(),
                dir.display()
            );
            self.pending.push_back(DuplicateSet {
                parent: dir.to_path_buf(),
                base_name,
                kind,
                members,
            });
        }
    }
}

impl Iterator for DuplicateScanner {
    type Item = DuplicateSet;

    fn next(&mut self) -> Option<DuplicateSet> {
        loop {
            if let Some(set) = self.pending.pop_front() {
                return Some(set);
            }
            match self.dirs.next()? {
                Ok(entry) => {
                    self.dirs_visited += 1;
                    self.scan_dir(entry.path());
                }
                Err(e) => {
                    let path = e.path().unwrap_or(&self.root).to_path_buf();
                    self.skip_dir(path, e.into());
                }
            }
        }
    }
}

/// Start a duplicate scan of `root`
pub fn scan(root: &Path, options: ScanOptions) -> Result<DuplicateScanner, AuditError> {
    DuplicateScanner::new(root, options)
}
