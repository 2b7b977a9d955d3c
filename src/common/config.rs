use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global tbaudit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Profiles mapping file (name -> profile root)
    #[serde(default)]
    pub profiles_file: Option<PathBuf>,

    /// Subtree holding local mail, searched for empty containers
    #[serde(default = "default_mail_scope")]
    pub mail_scope: String,

    /// Name marker of folder containers
    #[serde(default = "default_container_suffix")]
    pub container_suffix: String,

    /// Name marker of folder index files
    #[serde(default = "default_index_suffix")]
    pub index_suffix: String,

    /// Paths to exclude from scanning
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Output format preference
    #[serde(default)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Quiet,
}

fn default_mail_scope() -> String {
    "Mail/Local Folders".to_string()
}
fn default_container_suffix() -> String {
    ".sbd".to_string()
}
fn default_index_suffix() -> String {
    ".msf".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profiles_file: None,
            mail_scope: default_mail_scope(),
            container_suffix: default_container_suffix(),
            index_suffix: default_index_suffix(),
            exclude_paths: Vec::new(),
            output_format: OutputFormat::Human,
        }
    }
}

impl Config {
    /// Get the tbaudit data directory (~/.tbaudit)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".tbaudit")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Load config from file, or fall back to defaults if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Profiles mapping file in effect: configured one, else ~/.thunderbird.yaml
    pub fn profiles_path(&self) -> PathBuf {
        match &self.profiles_file {
            Some(p) => expand_home(&p.to_string_lossy()),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".thunderbird.yaml"),
        }
    }
}

/// Expand a leading ~ to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
