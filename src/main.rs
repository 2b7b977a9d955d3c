use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tbaudit::audit::{AuditOptions, Auditor};
use tbaudit::cli::args::{Cli, Commands, ConfigAction, OutputFormat};
use tbaudit::cli::output;
use tbaudit::common::config::Config;
use tbaudit::common::format;
use tbaudit::common::permissions::GroupReadable;
use tbaudit::profiles::Registry;
use tbaudit::report::{ProfileOutcome, RunSummary};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let default_filter = if cli.debug { "tbaudit=debug" } else { "tbaudit=error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;
    if let Some(ref path) = cli.profiles_file {
        config.profiles_file = Some(path.clone());
    }

    match cli.command {
        Commands::Profiles => cmd_profiles(&cli, &config),
        Commands::Check { ref name } => cmd_check(&cli, &config, name),
        Commands::CheckAll => cmd_check_all(&cli, &config),
        Commands::Version => cmd_version(),
        Commands::Config { ref action } => cmd_config(action, &config),
    }
}

fn output_format(cli: &Cli, config: &Config) -> OutputFormat {
    if cli.quiet {
        return OutputFormat::Quiet;
    }
    cli.format
        .unwrap_or_else(|| OutputFormat::from(&config.output_format))
}

fn auditor(cli: &Cli, config: &Config) -> Auditor {
    let mut options = AuditOptions::from_config(config, cli.verbose);
    options.parallel = cli.parallel;
    let auditor = Auditor::new(options);
    if cli.normalize_permissions {
        auditor.with_normalizer(Box::new(GroupReadable))
    } else {
        auditor
    }
}

fn load_registry(config: &Config) -> Result<Registry> {
    let registry = match Registry::load(config) {
        Ok(registry) => registry,
        Err(e) if e.is_fatal() => {
            return Err(anyhow::Error::new(e).context(
                "No usable profile list; pass --profiles-file or set TBAUDIT_PROFILES",
            ))
        }
        Err(e) => return Err(e.into()),
    };
    output::print_warnings(registry.warnings());
    Ok(registry)
}

// ─── Profiles ─────────────────────────────────────────────────────────────────

fn cmd_profiles(cli: &Cli, config: &Config) -> Result<()> {
    let registry = load_registry(config)?;

    match output_format(cli, config) {
        OutputFormat::Human => output::print_profiles(registry.profiles(), registry.source()),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "source": registry.source(),
                "profiles": registry.profiles().iter().map(|p| {
                    serde_json::json!({
                        "name": p.name,
                        "key": p.short_key(),
                        "root": p.root,
                        "exists": p.root.is_dir(),
                        "index_db": p.index_db,
                        "index_db_updated": p.index_db_updated(),
                    })
                }).collect::<Vec<_>>(),
            });
            output::print_json(&json);
        }
        OutputFormat::Quiet => {
            for profile in registry.profiles() {
                println!("{}  {}", profile.name, profile.root.display());
            }
        }
    }

    Ok(())
}

// ─── Check ────────────────────────────────────────────────────────────────────

fn cmd_check(cli: &Cli, config: &Config, name: &str) -> Result<()> {
    let registry = load_registry(config)?;
    let profile = registry.resolve(name)?;
    let out = output_format(cli, config);

    let report = auditor(cli, config).audit_profile(profile)?;
    let summary = RunSummary::combine(vec![ProfileOutcome::Checked(report)]);

    print_run(&summary, out, cli.verbose, true);
    Ok(())
}

fn cmd_check_all(cli: &Cli, config: &Config) -> Result<()> {
    let registry = load_registry(config)?;
    let out = output_format(cli, config);

    if out == OutputFormat::Human && !cli.parallel {
        println!(
            "  {} Checking {}",
            "🔍",
            format::format_count(registry.profiles().len(), "profile")
        );
    }

    let summary = auditor(cli, config).audit_all(registry.profiles(), |outcome| {
        if out == OutputFormat::Human {
            output::print_outcome(outcome, cli.verbose);
        }
    });

    print_run(&summary, out, cli.verbose, false);

    if !summary.is_success() {
        anyhow::bail!(
            "{} could not be checked",
            format::format_count(summary.profiles_failed, "profile")
        );
    }
    Ok(())
}

fn print_run(summary: &RunSummary, out: OutputFormat, verbose: bool, print_reports: bool) {
    match out {
        OutputFormat::Human => {
            if print_reports {
                for outcome in &summary.outcomes {
                    output::print_outcome(outcome, verbose);
                }
            }
            output::print_summary(summary, verbose);
        }
        OutputFormat::Json => output::print_json(summary),
        OutputFormat::Quiet => output::print_summary_quiet(summary),
    }
}

// ─── Version ──────────────────────────────────────────────────────────────────

fn cmd_version() -> Result<()> {
    println!("{} version {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    format::print_kv("license", env!("CARGO_PKG_LICENSE"));
    format::print_kv("config", &format::format_path(&Config::config_path()));
    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: &ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            format::print_header("tbaudit configuration");
            let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{}", contents);
            format::print_kv("profiles file", &format::format_path(&config.profiles_path()));
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }
        ConfigAction::Init => {
            let path = Config::config_path();
            if path.exists() {
                println!("  {} Config already exists: {}", "ℹ️", format::format_path(&path));
            } else {
                Config::default().save()?;
                println!("  {} Wrote {}", "✓".green(), format::format_path(&path));
            }
        }
    }
    Ok(())
}
