//! Size and modification time of profile entries.
//!
//! Native stat layouts differ per platform (seconds since 1970 on unix,
//! 100ns ticks since 1601 on Windows). Every implementation here returns
//! [`EntryStat`] with whole seconds since the Unix epoch so values gathered
//! in one run compare directly.

use serde::Serialize;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::common::errors::AuditError;

/// Stat record of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryStat {
    pub size_bytes: u64,
    /// Seconds since the Unix epoch, negative before 1970
    pub modified: i64,
}

/// Capability to stat an entry
pub trait MetadataSource: Send + Sync {
    fn stat(&self, path: &Path) -> Result<EntryStat, AuditError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

fn lstat(path: &Path) -> Result<std::fs::Metadata, AuditError> {
    std::fs::symlink_metadata(path).map_err(|source| AuditError::Stat {
        path: path.to_path_buf(),
        source,
    })
}

/// Unix `st_mtime` based implementation
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixMetadata;

#[cfg(unix)]
impl MetadataSource for UnixMetadata {
    fn stat(&self, path: &Path) -> Result<EntryStat, AuditError> {
        use std::os::unix::fs::MetadataExt;

        let meta = lstat(path)?;
        Ok(EntryStat {
            size_bytes: meta.size(),
            modified: meta.mtime(),
        })
    }

    fn name(&self) -> &'static str {
        "unix"
    }
}

/// Windows `ftLastWriteTime` based implementation
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsMetadata;

/// 100ns intervals between 1601-01-01 and 1970-01-01
#[cfg(any(windows, test))]
const FILETIME_UNIX_OFFSET: i64 = 116_444_736_000_000_000;

#[cfg(any(windows, test))]
fn filetime_to_epoch(ticks: u64) -> i64 {
    (ticks as i64 - FILETIME_UNIX_OFFSET).div_euclid(10_000_000)
}

#[cfg(windows)]
impl MetadataSource for WindowsMetadata {
    fn stat(&self, path: &Path) -> Result<EntryStat, AuditError> {
        use std::os::windows::fs::MetadataExt;

        let meta = lstat(path)?;
        Ok(EntryStat {
            size_bytes: meta.file_size(),
            modified: filetime_to_epoch(meta.last_write_time()),
        })
    }

    fn name(&self) -> &'static str {
        "windows"
    }
}

/// `SystemTime` based implementation, works everywhere std does
#[derive(Debug, Default, Clone, Copy)]
pub struct PortableMetadata;

impl MetadataSource for PortableMetadata {
    fn stat(&self, path: &Path) -> Result<EntryStat, AuditError> {
        let meta = lstat(path)?;
        let mtime = meta.modified().map_err(|source| AuditError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        let modified = match mtime.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs_f64().ceil() as i64),
        };
        Ok(EntryStat {
            size_bytes: meta.len(),
            modified,
        })
    }

    fn name(&self) -> &'static str {
        "portable"
    }
}

/// Metadata source for the running platform
#[cfg(unix)]
pub fn platform_default() -> Box<dyn MetadataSource> {
    Box::new(UnixMetadata)
}

#[cfg(windows)]
pub fn platform_default() -> Box<dyn MetadataSource> {
    Box::new(WindowsMetadata)
}

#[cfg(not(any(unix, windows)))]
pub fn platform_default() -> Box<dyn MetadataSource> {
    Box::new(PortableMetadata)
}
