use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use super::errors::AuditError;

/// Makes a profile tree readable for the auditing group before it is scanned.
///
/// This is the only place that may write to a profile, and only to its
/// permission bits. Failures are reported to the caller, who logs them and
/// scans anyway.
pub trait PermissionNormalizer: Send + Sync {
    fn normalize(&self, dir: &Path) -> Result<usize, AuditError>;
}

/// Leaves permissions alone (default)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNormalizer;

impl PermissionNormalizer for NoopNormalizer {
    fn normalize(&self, _dir: &Path) -> Result<usize, AuditError> {
        Ok(0)
    }
}

/// Adds group read (and group search on directories) to every entry of a tree
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupReadable;

#[cfg(unix)]
impl PermissionNormalizer for GroupReadable {
    fn normalize(&self, dir: &Path) -> Result<usize, AuditError> {
        use std::os::unix::fs::PermissionsExt;

        if !dir.is_dir() {
            return Err(AuditError::Io {
                path: dir.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let mut changed = 0;
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|e| AuditError::Io {
                path: e.path().unwrap_or(dir).to_path_buf(),
                source: e.into(),
            })?;
            if entry.file_type().is_symlink() {
                continue;
            }
            let meta = entry.metadata().map_err(|e| AuditError::Io {
                path: entry.path().to_path_buf(),
                source: e.into(),
            })?;
            let mode = meta.permissions().mode();
            let wanted = if entry.file_type().is_dir() {
                mode | 0o050
            } else {
                mode | 0o040
            };
            if wanted != mode {
                std::fs::set_permissions(entry.path(), std::fs::Permissions::from_mode(wanted))
                    .map_err(|source| AuditError::Io {
                        path: entry.path().to_path_buf(),
                        source,
                    })?;
                changed += 1;
            }
        }
        debug!("normalized permissions on {} entries under {}", changed, dir.display());
        Ok(changed)
    }
}

#[cfg(not(unix))]
impl PermissionNormalizer for GroupReadable {
    fn normalize(&self, dir: &Path) -> Result<usize, AuditError> {
        // No group permission bits to adjust; only make sure the tree is there.
        if dir.is_dir() {
            debug!("group permissions not applicable on this platform: {}", dir.display());
            Ok(0)
        } else {
            Err(AuditError::Io {
                path: dir.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }
}

/// Check if we can read a path
pub fn can_read(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok() || std::fs::File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_changes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(NoopNormalizer.normalize(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(GroupReadable.normalize(&dir.path().join("missing")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_group_read_added() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("Inbox.msf");
        std::fs::write(&file, b"x").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o600)).unwrap();

        GroupReadable.normalize(dir.path()).unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o040, 0o040);
    }

    #[test]
    fn test_can_read() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(can_read(dir.path()));
        assert!(!can_read(&dir.path().join("missing")));
    }
}
