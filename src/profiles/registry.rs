use serde::Serialize;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::common::config::{expand_home, Config};
use crate::common::errors::AuditError;
use crate::scanner::list_dir;

/// Directory name endings of profiles created by the mail client
pub const PROFILE_SUFFIXES: &[&str] = &[".default", ".default-release"];

/// Name given to profiles found by directory discovery
pub const DISCOVERED_NAME: &str = "default";

/// A named mail profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub root: PathBuf,
    /// Global message index database, if configured
    pub index_db: Option<PathBuf>,
}

impl Profile {
    /// Directory name up to its first dot (`abcd1234.default` -> `abcd1234`)
    pub fn short_key(&self) -> String {
        let base = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match base.split_once('.') {
            Some((head, _)) => head.to_string(),
            None => base,
        }
    }

    /// Last update of the index database, when it exists and is not empty
    pub fn index_db_updated(&self) -> Option<i64> {
        let db = self.index_db.as_ref()?;
        let meta = std::fs::metadata(db).ok()?;
        if !meta.is_file() || meta.len() == 0 {
            return None;
        }
        let modified = meta.modified().ok()?;
        modified
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs() as i64)
    }
}

/// Where the registry got its profiles from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum ProfileSource {
    /// Profiles mapping file
    File(PathBuf),
    /// Default profile directory of the platform
    Discovered(PathBuf),
}

/// Ordered set of known profiles
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: Vec<Profile>,
    source: ProfileSource,
    /// Entries skipped while discovering profiles
    warnings: Vec<String>,
}

impl Registry {
    /// Load from the profiles file named by `config`, else from the platform
    /// default profile directory
    pub fn load(config: &Config) -> Result<Self, AuditError> {
        Self::load_from(&config.profiles_path(), default_profile_parent().as_deref())
    }

    pub fn load_from(profiles_file: &Path, default_parent: Option<&Path>) -> Result<Self, AuditError> {
        if profiles_file.is_file() {
            let contents =
                std::fs::read_to_string(profiles_file).map_err(|source| AuditError::Io {
                    path: profiles_file.to_path_buf(),
                    source,
                })?;
            let profiles = parse_profiles(profiles_file, &contents)?;
            debug!("{} profiles from {}", profiles.len(), profiles_file.display());
            return Ok(Self {
                profiles,
                source: ProfileSource::File(profiles_file.to_path_buf()),
                warnings: Vec::new(),
            });
        }

        if let Some(parent) = default_parent.filter(|p| p.is_dir()) {
            let (profiles, skipped) = discover_profiles(parent)?;
            debug!("{} profiles discovered in {}", profiles.len(), parent.display());
            for e in &skipped {
                warn!("{}", e);
            }
            return Ok(Self {
                profiles,
                source: ProfileSource::Discovered(parent.to_path_buf()),
                warnings: skipped.iter().map(|e| e.to_string()).collect(),
            });
        }

        let mut searched = vec![profiles_file.to_path_buf()];
        searched.extend(default_parent.map(Path::to_path_buf));
        Err(AuditError::ConfigurationMissing { searched })
    }

    /// All profiles in registry order
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn source(&self) -> &ProfileSource {
        &self.source
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Look up a profile by name; the first match wins
    pub fn resolve(&self, name: &str) -> Result<&Profile, AuditError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| AuditError::ProfileNotFound {
                name: name.to_string(),
            })
    }
}

/// Platform default parent directory of mail profiles
#[cfg(target_os = "macos")]
pub fn default_profile_parent() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join("Library/Thunderbird/Profiles"))
}

#[cfg(target_os = "windows")]
pub fn default_profile_parent() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("Thunderbird").join("Profiles"))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn default_profile_parent() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".thunderbird"))
}

/// Every immediate subdirectory of `parent` named like a profile, by name,
/// plus the entries of `parent` that could not be read
pub fn discover_profiles(parent: &Path) -> Result<(Vec<Profile>, Vec<AuditError>), AuditError> {
    let listing = list_dir(parent).map_err(|source| AuditError::UnreadableDirectory {
        path: parent.to_path_buf(),
        source,
    })?;

    let profiles: Vec<Profile> = listing
        .children
        .into_iter()
        .filter(|(path, is_dir)| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            *is_dir && PROFILE_SUFFIXES.iter().any(|s| name.ends_with(s))
        })
        .map(|(root, _)| Profile {
            name: DISCOVERED_NAME.to_string(),
            root,
            index_db: None,
        })
        .collect();

    Ok((profiles, listing.warnings))
}

/// Parse the line-oriented profiles file:
///
/// ```text
/// # comment
/// wf:
///   db: /home/wf/.thunderbird/abcd.default/global-messages-db.sqlite
///   profile: /home/wf/.thunderbird/abcd.default
/// ```
///
/// A record whose name repeats replaces the earlier one in place.
pub fn parse_profiles(path: &Path, contents: &str) -> Result<Vec<Profile>, AuditError> {
    let invalid = |line: usize, message: &str| AuditError::ConfigInvalid {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    };

    let mut profiles: Vec<Profile> = Vec::new();
    type Record = (String, usize, Option<PathBuf>, Option<PathBuf>);
    let close = |record: Option<Record>, profiles: &mut Vec<Profile>| -> Result<(), AuditError> {
        let Some((name, line, root, index_db)) = record else {
            return Ok(());
        };
        let root = root.ok_or_else(|| invalid(line, "record has no 'profile' entry"))?;
        let profile = Profile {
            name,
            root,
            index_db,
        };
        match profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => profiles.push(profile),
        }
        Ok(())
    };

    // name, line opened, profile root, index db
    let mut current: Option<Record> = None;
    for (idx, raw) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == "---" {
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            return Err(invalid(line_no, "expected 'key: value'"));
        };
        let key = unquote(key.trim());
        let value = unquote(value.trim());

        let indented = line.len() != trimmed.len();
        if !indented {
            if !value.is_empty() {
                return Err(invalid(line_no, "expected a profile name followed by ':'"));
            }
            if key.is_empty() {
                return Err(invalid(line_no, "empty profile name"));
            }
            close(current.take(), &mut profiles)?;
            current = Some((key.to_string(), line_no, None, None));
            continue;
        }

        let Some(record) = current.as_mut() else {
            return Err(invalid(line_no, "entry outside of a profile record"));
        };
        match key {
            "profile" => record.2 = Some(expand_home(value)),
            "db" => record.3 = Some(expand_home(value)),
            other => debug!("ignoring key '{}' on line {}", other, line_no),
        }
    }
    close(current.take(), &mut profiles)?;

    Ok(profiles)
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
