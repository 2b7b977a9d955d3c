use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::entry::Markers;
use crate::common::errors::AuditError;
use crate::duplicates::suggestion::{self, RemediationSuggestion};

/// Options for the empty container pass
#[derive(Debug, Clone)]
pub struct DetectorOptions {
    /// Subtree of the profile to search, relative to its root
    pub scope: PathBuf,
    pub markers: Markers,
    /// Attach removal commands to findings
    pub emit_commands: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            scope: PathBuf::from("Mail/Local Folders"),
            markers: Markers::default(),
            emit_commands: false,
        }
    }
}

/// A container directory without any entries
#[derive(Debug, Clone, Serialize)]
pub struct EmptyContainer {
    pub path: PathBuf,
    pub suggestion: RemediationSuggestion,
}

/// Result of one empty container pass
#[derive(Debug, Default)]
pub struct EmptyContainers {
    pub containers: Vec<EmptyContainer>,
    pub warnings: Vec<AuditError>,
}

/// Finds leftover `*.sbd` directories with nothing in them.
///
/// Only the local mail scope is searched: synced IMAP stores legitimately
/// hold empty containers.
pub struct EmptyContainerDetector {
    options: DetectorOptions,
}

impl EmptyContainerDetector {
    pub fn new(options: DetectorOptions) -> Self {
        Self { options }
    }

    pub fn find(&self, profile_root: &Path) -> EmptyContainers {
        let mut result = EmptyContainers::default();
        let scope = profile_root.join(&self.options.scope);
        if !scope.is_dir() {
            warn!("mail scope {} does not exist", scope.display());
            result.warnings.push(AuditError::Io {
                path: scope,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
            return result;
        }

        let mut found = BTreeSet::new();
        for entry in WalkDir::new(&scope).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(&scope).to_path_buf();
                    result.warnings.push(AuditError::UnreadableDirectory {
                        path,
                        source: e.into(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_dir() || !self.options.markers.is_container(entry.path()) {
                continue;
            }
            match std::fs::read_dir(entry.path()) {
                Ok(mut listing) => {
                    if listing.next().is_none() {
                        found.insert(entry.path().to_path_buf());
                    }
                }
                Err(source) => {
                    result.warnings.push(AuditError::UnreadableDirectory {
                        path: entry.path().to_path_buf(),
                        source,
                    });
                }
            }
        }

        debug!("{} empty containers under {}", found.len(), scope.display());
        result.containers = found
            .into_iter()
            .map(|path| EmptyContainer {
                suggestion: suggestion::remove_empty_container(&path, self.options.emit_commands),
                path,
            })
            .collect();
        result
    }
}

/// Find empty containers under `profile_root/scope`
pub fn find_empty_containers(profile_root: &Path, scope: &Path) -> BTreeSet<PathBuf> {
    let detector = EmptyContainerDetector::new(DetectorOptions {
        scope: scope.to_path_buf(),
        ..Default::default()
    });
    detector
        .find(profile_root)
        .containers
        .into_iter()
        .map(|c| c.path)
        .collect()
}
