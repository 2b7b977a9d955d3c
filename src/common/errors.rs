use std::path::PathBuf;

use thiserror::Error;

/// Typed errors for profile auditing.
/// `anyhow` is used at the top level for CLI error handling,
/// these let modules say exactly what failed and how far the failure reaches.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Neither a profiles file nor an OS default profile directory exists
    #[error("No profile configuration found (looked in: {})", join_paths(.searched))]
    ConfigurationMissing { searched: Vec<PathBuf> },

    /// The profiles file exists but can not be parsed
    #[error("Config error in '{}' line {line}: {message}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Profile name is not known to the registry
    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    /// Profile is registered but its root directory is gone
    #[error("Profile '{name}' not found at '{}'", .path.display())]
    ProfileRootMissing { name: String, path: PathBuf },

    /// Metadata lookup failed, usually because the entry vanished mid-scan
    #[error("Could not stat '{}': {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory inside the profile could not be listed
    #[error("Skipped unreadable directory '{}': {source}", .path.display())]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File system operation failed
    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuditError {
    /// Whether this error ends the whole run rather than a single profile or entry
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AuditError::ConfigurationMissing { .. } | AuditError::ConfigInvalid { .. }
        )
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "-".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
