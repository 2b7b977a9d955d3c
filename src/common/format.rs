use chrono::{Local, TimeZone};
use colored::*;

use crate::duplicates::Severity;

/// Format bytes into human-readable size string
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a count with the right plural of `noun`
pub fn format_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Format a path for display, replacing home directory with ~
pub fn format_path(path: &std::path::Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

/// Render epoch seconds as a local timestamp
pub fn format_epoch(epoch: i64) -> String {
    match Local.timestamp_opt(epoch, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch.to_string(),
    }
}

/// Colorize a suggestion severity
pub fn format_severity(severity: Severity) -> ColoredString {
    match severity {
        Severity::Safe => "safe".green(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Review => "review".red().bold(),
    }
}

/// Print a section header
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().underline());
    println!();
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0, "duplicate set"), "0 duplicate sets");
        assert_eq!(format_count(1, "duplicate set"), "1 duplicate set");
        assert_eq!(format_count(3, "profile"), "3 profiles");
    }

    #[test]
    fn test_format_epoch_shape() {
        let s = format_epoch(1_700_000_000);
        assert_eq!(s.len(), "2023-11-14 22:13:20".len());
        assert!(s.starts_with("2023-11-1"));
    }

    #[test]
    fn test_format_path_without_home() {
        let path = std::path::Path::new("/tmp/x.default/Inbox.msf");
        assert_eq!(format_path(path), "/tmp/x.default/Inbox.msf");
    }
}
