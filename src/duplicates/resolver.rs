use serde::Serialize;
use std::path::Path;

use tracing::warn;

use super::suggestion::{self, RemediationSuggestion, Severity};
use crate::common::format::{format_epoch, format_size};
use crate::scanner::entry::{DuplicateSet, Entry, EntryKind};
use crate::scanner::metadata::{EntryStat, MetadataSource};

/// Containers holding more residual entries than this need a review
const REVIEW_THRESHOLD: usize = 2;

/// Options for resolving duplicate sets
#[derive(Debug, Clone, Default)]
pub struct PolicyOptions {
    /// Attach shell commands to suggestions
    pub emit_commands: bool,
}

/// A duplicate set member with its stat record
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    #[serde(flatten)]
    pub stat: EntryStat,
}

/// Outcome of resolving one duplicate set
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub set: DuplicateSet,
    /// Members oldest first; equal times keep traversal order
    pub ranked: Vec<RankedEntry>,
    pub older: Option<RankedEntry>,
    pub newer: Option<RankedEntry>,
    pub suggestion: RemediationSuggestion,
    /// Members that could not be stat'ed
    pub skipped: Vec<String>,
}

/// Decides which copy of a duplicate is the leftover and what to do about it
pub struct ResolutionPolicy {
    options: PolicyOptions,
    metadata: Box<dyn MetadataSource>,
}

impl ResolutionPolicy {
    pub fn new(options: PolicyOptions, metadata: Box<dyn MetadataSource>) -> Self {
        Self { options, metadata }
    }

    pub fn resolve(&self, set: &DuplicateSet) -> Resolution {
        let mut ranked = Vec::with_capacity(set.members.len());
        let mut skipped = Vec::new();
        for entry in &set.members {
            match self.metadata.stat(&entry.path) {
                Ok(stat) => ranked.push(RankedEntry {
                    entry: entry.clone(),
                    stat,
                }),
                Err(e) => {
                    warn!("{}", e);
                    skipped.push(e.to_string());
                }
            }
        }

        // Stable sort: on equal times the later-encountered member ends up newer
        ranked.sort_by_key(|r| r.stat.modified);

        if ranked.len() < 2 {
            let suggestion = RemediationSuggestion::new(
                Severity::Review,
                format!(
                    "only {} of {} copies could be read; rescan once the profile is idle",
                    ranked.len(),
                    set.members.len()
                ),
            );
            return Resolution {
                set: set.clone(),
                older: ranked.first().cloned(),
                newer: None,
                ranked,
                suggestion,
                skipped,
            };
        }

        let older = ranked[0].clone();
        let newer = ranked[ranked.len() - 1].clone();
        let mut suggestion = match set.kind {
            EntryKind::Container => self.suggest_container(&older),
            _ => self.suggest_index(&older, &newer),
        };
        if ranked.len() > 2 {
            suggestion.rationale = format!(
                "{}; {} copies, only the oldest is considered",
                suggestion.rationale,
                ranked.len()
            );
        }

        Resolution {
            set: set.clone(),
            ranked,
            older: Some(older),
            newer: Some(newer),
            suggestion,
            skipped,
        }
    }

    fn suggest_container(&self, older: &RankedEntry) -> RemediationSuggestion {
        let path = older.entry.path.as_path();
        let emit = self.options.emit_commands;
        let residual = match count_entries(path) {
            Ok(n) => n,
            Err(e) => {
                return RemediationSuggestion::new(
                    Severity::Review,
                    format!("older container could not be listed ({}); check it by hand", e),
                )
                .with_commands(emit, vec![suggestion::list(path)]);
            }
        };

        match residual {
            0 => RemediationSuggestion::new(Severity::Safe, "older container is empty")
                .with_commands(emit, vec![suggestion::rmdir(path)]),
            n if n > REVIEW_THRESHOLD => RemediationSuggestion::new(
                Severity::Review,
                format!("older container still holds {} entries; review before removing", n),
            )
            .with_commands(
                emit,
                vec![suggestion::list(path), suggestion::rm_tree_interactive(path)],
            ),
            n => RemediationSuggestion::new(
                Severity::Safe,
                format!("older container holds only {} entries", n),
            )
            .with_commands(emit, vec![suggestion::rm_tree(path)]),
        }
    }

    fn suggest_index(&self, older: &RankedEntry, newer: &RankedEntry) -> RemediationSuggestion {
        let emit = self.options.emit_commands;
        let command = vec![suggestion::rm_file(&older.entry.path)];
        if older.stat.size_bytes > newer.stat.size_bytes {
            RemediationSuggestion::new(
                Severity::Warning,
                format!(
                    "older index ({}, {}) is larger than the newer one ({}, {}); check before removing",
                    format_size(older.stat.size_bytes),
                    format_epoch(older.stat.modified),
                    format_size(newer.stat.size_bytes),
                    format_epoch(newer.stat.modified),
                ),
            )
            .with_commands(emit, command)
        } else {
            RemediationSuggestion::new(
                Severity::Safe,
                format!(
                    "older index ({}) is not larger than the newer one ({})",
                    format_size(older.stat.size_bytes),
                    format_size(newer.stat.size_bytes),
                ),
            )
            .with_commands(emit, command)
        }
    }
}

fn count_entries(dir: &Path) -> std::io::Result<usize> {
    let mut n = 0;
    for child in std::fs::read_dir(dir)? {
        child?;
        n += 1;
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::AuditError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Metadata from a table, so tests need no real mtimes
    struct FixedMetadata(HashMap<PathBuf, EntryStat>);

    impl MetadataSource for FixedMetadata {
        fn stat(&self, path: &Path) -> Result<EntryStat, AuditError> {
            self.0.get(path).copied().ok_or_else(|| AuditError::Stat {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn index_set(names: &[&str]) -> DuplicateSet {
        DuplicateSet {
            parent: PathBuf::from("/p/A"),
            base_name: "Foo".to_string(),
            kind: EntryKind::Index,
            members: names
                .iter()
                .map(|n| Entry {
                    path: PathBuf::from("/p/A").join(n),
                    kind: EntryKind::Index,
                })
                .collect(),
        }
    }

    fn policy(stats: &[(&str, u64, i64)], emit: bool) -> ResolutionPolicy {
        let table = stats
            .iter()
            .map(|(n, size, modified)| {
                (
                    PathBuf::from("/p/A").join(n),
                    EntryStat {
                        size_bytes: *size,
                        modified: *modified,
                    },
                )
            })
            .collect();
        ResolutionPolicy::new(PolicyOptions { emit_commands: emit }, Box::new(FixedMetadata(table)))
    }

    #[test]
    fn test_older_is_smaller_mtime() {
        let p = policy(&[("Foo.msf", 80, 200), ("Foo.msf.bak", 100, 100)], true);
        let r = p.resolve(&index_set(&["Foo.msf", "Foo.msf.bak"]));
        assert_eq!(r.older.unwrap().entry.file_name(), "Foo.msf.bak");
        assert_eq!(r.newer.unwrap().entry.file_name(), "Foo.msf");
    }

    #[test]
    fn test_larger_older_index_warns() {
        let p = policy(&[("Foo.msf", 80, 200), ("Foo.msf.bak", 100, 100)], true);
        let r = p.resolve(&index_set(&["Foo.msf", "Foo.msf.bak"]));
        assert_eq!(r.suggestion.severity, Severity::Warning);
        assert_eq!(r.suggestion.commands, vec!["rm '/p/A/Foo.msf.bak'".to_string()]);
    }

    #[test]
    fn test_smaller_older_index_is_safe() {
        let p = policy(&[("Foo.msf", 100, 200), ("Foo.msf.bak", 80, 100)], true);
        let r = p.resolve(&index_set(&["Foo.msf", "Foo.msf.bak"]));
        assert_eq!(r.suggestion.severity, Severity::Safe);
        assert_eq!(r.suggestion.commands, vec!["rm '/p/A/Foo.msf.bak'".to_string()]);
    }

    #[test]
    fn test_tie_later_member_is_newer() {
        let p = policy(&[("Foo.msf", 10, 500), ("Foo.msf.bak", 10, 500)], false);
        let r = p.resolve(&index_set(&["Foo.msf", "Foo.msf.bak"]));
        assert_eq!(r.older.unwrap().entry.file_name(), "Foo.msf");
        assert_eq!(r.newer.unwrap().entry.file_name(), "Foo.msf.bak");
    }

    #[test]
    fn test_three_members_fully_ranked() {
        let p = policy(
            &[("Foo.msf", 10, 300), ("Foo.msf.1", 10, 100), ("Foo.msf.2", 10, 200)],
            false,
        );
        let r = p.resolve(&index_set(&["Foo.msf", "Foo.msf.1", "Foo.msf.2"]));
        let order: Vec<_> = r.ranked.iter().map(|m| m.entry.file_name()).collect();
        assert_eq!(order, vec!["Foo.msf.1", "Foo.msf.2", "Foo.msf"]);
        assert_eq!(r.newer.unwrap().entry.file_name(), "Foo.msf");
        assert!(r.suggestion.rationale.contains("3 copies"));
    }

    #[test]
    fn test_vanished_member_is_skipped() {
        let p = policy(&[("Foo.msf", 10, 300)], true);
        let r = p.resolve(&index_set(&["Foo.msf", "Foo.msf.bak"]));
        assert_eq!(r.skipped.len(), 1);
        assert_eq!(r.suggestion.severity, Severity::Review);
        assert!(r.suggestion.commands.is_empty());
    }

    #[test]
    fn test_no_commands_without_emit() {
        let p = policy(&[("Foo.msf", 100, 200), ("Foo.msf.bak", 80, 100)], false);
        let r = p.resolve(&index_set(&["Foo.msf", "Foo.msf.bak"]));
        assert!(r.suggestion.commands.is_empty());
        assert!(!r.suggestion.rationale.is_empty());
    }
}
