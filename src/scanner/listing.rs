use std::io;
use std::path::{Path, PathBuf};

use crate::common::errors::AuditError;

/// Immediate children of one directory, sorted by path
#[derive(Debug, Default)]
pub struct Listing {
    /// `(path, is_dir)` of every child whose type could be read
    pub children: Vec<(PathBuf, bool)>,
    /// Children or listing steps that failed
    pub warnings: Vec<AuditError>,
}

/// List `dir`. Only failing to open the directory is an error; a child that
/// can not be read lands in `warnings` and the rest of the listing is kept.
pub fn list_dir(dir: &Path) -> io::Result<Listing> {
    let entries = std::fs::read_dir(dir)?.map(|entry| {
        entry.map(|e| {
            let is_dir = e.file_type().map(|t| t.is_dir());
            (e.path(), is_dir)
        })
    });
    Ok(sift(dir, entries))
}

fn sift<I>(dir: &Path, entries: I) -> Listing
where
    I: IntoIterator<Item = io::Result<(PathBuf, io::Result<bool>)>>,
{
    let mut listing = Listing::default();
    for entry in entries {
        match entry {
            Ok((path, Ok(is_dir))) => listing.children.push((path, is_dir)),
            Ok((path, Err(source))) => listing.warnings.push(AuditError::Stat { path, source }),
            Err(source) => listing.warnings.push(AuditError::UnreadableDirectory {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }
    listing.children.sort();
    listing
}
