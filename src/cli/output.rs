use colored::*;
use serde::Serialize;
use std::io::Write;

use crate::common::format::{self, format_epoch, format_path, format_size, format_severity};
use crate::common::permissions;
use crate::duplicates::Resolution;
use crate::profiles::{Profile, ProfileSource};
use crate::report::{ProfileFailure, ProfileOutcome, ProfileReport, RunSummary};

/// Print the profile list in human-readable format
pub fn print_profiles(profiles: &[Profile], source: &ProfileSource) {
    println!();
    let origin = match source {
        ProfileSource::File(p) => format!("from {}", format_path(p)),
        ProfileSource::Discovered(p) => format!("discovered in {}", format_path(p)),
    };
    println!("  {} Profiles {}", "📋", origin.dimmed());
    println!("{}", "─".repeat(60).dimmed());

    if profiles.is_empty() {
        println!("  No profiles found.");
        println!();
        return;
    }

    for (i, profile) in profiles.iter().enumerate() {
        let state = if !profile.root.is_dir() {
            "missing".red().bold()
        } else if !permissions::can_read(&profile.root) {
            "unreadable".yellow()
        } else {
            "ok".green()
        };
        println!(
            "  {:>2}. {:<16} {:<12} {}",
            i + 1,
            profile.name.bold(),
            profile.short_key().dimmed(),
            state
        );
        println!("      {} {}", "↳".dimmed(), format_path(&profile.root));
        if let Some(ref db) = profile.index_db {
            let updated = profile
                .index_db_updated()
                .map(format_epoch)
                .unwrap_or_else(|| "-".to_string());
            println!(
                "      {} index {} (updated {})",
                "↳".dimmed(),
                format_path(db).dimmed(),
                updated
            );
        }
    }
    println!();
}

/// Print one profile pass
pub fn print_outcome(outcome: &ProfileOutcome, verbose: bool) {
    match outcome {
        ProfileOutcome::Checked(report) => print_profile_report(report, verbose),
        ProfileOutcome::Failed(failure) => print_failure(failure),
    }
    std::io::stdout().flush().ok();
}

/// Print the findings of one profile
pub fn print_profile_report(report: &ProfileReport, verbose: bool) {
    println!();
    println!(
        "  {} Profile {}  {}",
        "🔍",
        report.profile.bold(),
        format_path(&report.root).dimmed()
    );

    if report.duplicates.is_empty() {
        println!("    {} no duplicates found", "✓".green());
    } else {
        println!(
            "    {} {}",
            "⚠".yellow(),
            format::format_count(report.duplicate_count(), "duplicate set").yellow()
        );
        for resolution in &report.duplicates {
            print_resolution(resolution, verbose);
        }
    }

    if report.empty_containers.is_empty() {
        println!("    {} no empty containers found", "✓".green());
    } else {
        println!(
            "    {} {}",
            "⚠".yellow(),
            format::format_count(report.empty_count(), "empty container").yellow()
        );
        for empty in &report.empty_containers {
            println!("      {} {}", "•".dimmed(), format_path(&empty.path));
            if verbose {
                for cmd in &empty.suggestion.commands {
                    println!("        {} {}", "$".dimmed(), cmd.cyan());
                }
            }
        }
    }

    print_warnings(&report.warnings);
}

/// Write skipped items to stderr, whatever the output format
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("    {} {}", "⚠".yellow(), warning.dimmed());
    }
}

fn print_resolution(resolution: &Resolution, verbose: bool) {
    let set = &resolution.set;
    println!(
        "      {} {} '{}' in {}",
        "•".dimmed(),
        set.kind,
        set.base_name.bold(),
        format_path(&set.parent).dimmed()
    );

    for member in &resolution.ranked {
        let label = match (&resolution.older, &resolution.newer) {
            (Some(o), _) if o.entry.path == member.entry.path => "older".red().to_string(),
            (_, Some(n)) if n.entry.path == member.entry.path => "newer".green().to_string(),
            _ => "     ".to_string(),
        };
        println!(
            "        {} {:<40} {:>10}  {}",
            label,
            member.entry.file_name(),
            format_size(member.stat.size_bytes),
            format_epoch(member.stat.modified).dimmed()
        );
    }

    if !verbose {
        return;
    }
    let suggestion = &resolution.suggestion;
    println!(
        "        {} [{}] {}",
        "↳".dimmed(),
        format_severity(suggestion.severity),
        suggestion.rationale
    );
    for cmd in &suggestion.commands {
        println!("        {} {}", "$".dimmed(), cmd.cyan());
    }
}

fn print_failure(failure: &ProfileFailure) {
    println!();
    println!("  {} Profile {}", "✗".red(), failure.profile.bold());
    eprintln!("    {} {}", "✗".red(), failure.error);
}

/// Print the run-level summary line
pub fn print_summary(summary: &RunSummary, verbose: bool) {
    println!();
    println!("{}", "─".repeat(60).dimmed());
    let line = format!(
        "{} in {}, {}",
        format::format_count(summary.total_duplicates, "duplicate set"),
        format::format_count(summary.profiles_checked, "profile"),
        format::format_count(summary.total_empty, "empty container"),
    );
    if summary.total_duplicates == 0 && summary.total_empty == 0 {
        println!("  {} {}", "✨", line.green());
    } else {
        println!("  {} {}", "💾", line.yellow());
        if !verbose {
            println!(
                "  {} Run with {} to see suggested remediation",
                "💡",
                "--verbose".cyan()
            );
        }
    }
    if summary.profiles_failed > 0 {
        println!(
            "  {} {} could not be checked",
            "✗".red(),
            format::format_count(summary.profiles_failed, "profile")
        );
    }
    println!();
}

/// Print a minimal summary; warnings and failures still go to stderr
pub fn print_summary_quiet(summary: &RunSummary) {
    for report in summary.reports() {
        print_warnings(&report.warnings);
    }
    for failure in summary.failures() {
        eprintln!("{}: {}", failure.profile, failure.error);
    }
    println!(
        "{}  {}  {}",
        summary.total_duplicates, summary.total_empty, summary.profiles_checked
    );
}

/// Print any serializable record as JSON
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}
