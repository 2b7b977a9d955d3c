use serde::Serialize;
use std::path::Path;

/// How much care a suggestion needs before anyone acts on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Removal is safe
    Safe,
    /// Removal is suggested, but something looks off
    Warning,
    /// Look at the contents first
    Review,
}

/// A proposed corrective action. Nothing in this crate executes it.
#[derive(Debug, Clone, Serialize)]
pub struct RemediationSuggestion {
    pub severity: Severity,
    pub rationale: String,
    /// POSIX shell commands, empty unless commands were requested
    pub commands: Vec<String>,
}

impl RemediationSuggestion {
    pub fn new(severity: Severity, rationale: impl Into<String>) -> Self {
        Self {
            severity,
            rationale: rationale.into(),
            commands: Vec::new(),
        }
    }

    /// Attach `commands` when `emit` is set
    pub fn with_commands(mut self, emit: bool, commands: Vec<String>) -> Self {
        if emit {
            self.commands = commands;
        }
        self
    }
}

/// Quote a path for a POSIX shell
pub fn shell_quote(path: &Path) -> String {
    let s = path.to_string_lossy();
    format!("'{}'", s.replace('\'', r"'\''"))
}

pub fn rmdir(path: &Path) -> String {
    format!("rmdir {}", shell_quote(path))
}

pub fn rm_tree(path: &Path) -> String {
    format!("rm -r {}", shell_quote(path))
}

pub fn rm_tree_interactive(path: &Path) -> String {
    format!("rm -ri {}", shell_quote(path))
}

pub fn rm_file(path: &Path) -> String {
    format!("rm {}", shell_quote(path))
}

pub fn list(path: &Path) -> String {
    format!("ls -la {}", shell_quote(path))
}

/// Suggestion for a container found empty by the detector
pub fn remove_empty_container(path: &Path, emit_commands: bool) -> RemediationSuggestion {
    RemediationSuggestion::new(Severity::Safe, "empty container, nothing to lose")
        .with_commands(emit_commands, vec![rmdir(path)])
}
