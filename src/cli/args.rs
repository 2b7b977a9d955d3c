use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tbaudit: find duplicated and leftover folder files in Thunderbird profiles
#[derive(Parser, Debug)]
#[command(
    name = "tbaudit",
    version,
    about = "Audit Thunderbird profiles for duplicated and leftover folder files",
    long_about = "tbaudit looks for folder index (.msf) and folder container (.sbd) entries\n\
                   duplicated by manual moves or rsync, and for empty leftover containers.\n\
                   It only reports and suggests; it never removes anything.",
    after_help = "EXAMPLES:\n  \
        tbaudit profiles                       List known profiles\n  \
        tbaudit check wf                       Check the profile named wf\n  \
        tbaudit check wf --verbose             Also print suggested commands\n  \
        tbaudit check-all --format json        Check every profile, JSON output\n  \
        tbaudit version                        Show version information"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Profiles mapping file (default: ~/.thunderbird.yaml)
    #[arg(long, global = true, value_name = "PATH", env = "TBAUDIT_PROFILES")]
    pub profiles_file: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print remediation commands with each finding
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode, minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Check profiles in parallel
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Make each profile group-readable before scanning it
    #[arg(long, global = true)]
    pub normalize_permissions: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List known profiles
    Profiles,

    /// Check one profile
    Check {
        /// Profile name
        name: String,
    },

    /// Check every known profile
    CheckAll,

    /// Show version information
    Version,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the config file path
    Path,

    /// Write the default configuration file
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

impl From<&crate::common::config::OutputFormat> for OutputFormat {
    fn from(f: &crate::common::config::OutputFormat) -> Self {
        match f {
            crate::common::config::OutputFormat::Human => OutputFormat::Human,
            crate::common::config::OutputFormat::Json => OutputFormat::Json,
            crate::common::config::OutputFormat::Quiet => OutputFormat::Quiet,
        }
    }
}
