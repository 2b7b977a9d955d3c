use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from the real home directory
fn tbaudit(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tbaudit").unwrap();
    cmd.env("HOME", home)
        .env_remove("TBAUDIT_PROFILES")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"x").unwrap();
}

/// Three profiles, only `beta` has a duplicate index
fn three_profiles(home: &Path) -> std::path::PathBuf {
    let mut yaml = String::new();
    for name in ["alpha", "beta", "gamma"] {
        let root = home.join(format!("tb/{}.default", name));
        touch(&root.join("Mail/Local Folders/Inbox.msf"));
        yaml.push_str(&format!("{}:\n  profile: {}\n", name, root.display()));
    }
    touch(&home.join("tb/beta.default/Mail/Local Folders/Inbox.msf.bak"));

    let file = home.join("profiles.yaml");
    fs::write(&file, yaml).unwrap();
    file
}

// ─── Help & version ──────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    tbaudit(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("profiles"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("check-all"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    tbaudit(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tbaudit"));
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    tbaudit(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_option_is_usage_error() {
    let home = TempDir::new().unwrap();
    tbaudit(home.path())
        .args(["check-all", "--no-such-flag"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[test]
fn test_profiles_lists_file_order() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["profiles", "--quiet", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::is_match("(?s)alpha.*beta.*gamma").unwrap());
}

#[test]
fn test_profiles_json() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["profiles", "--format", "json"])
        .env("TBAUDIT_PROFILES", &file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"beta\""))
        .stdout(predicate::str::contains("\"exists\": true"));
}

#[cfg(unix)]
#[test]
fn test_missing_configuration_fails() {
    let home = TempDir::new().unwrap();
    tbaudit(home.path())
        .arg("profiles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No profile configuration found"))
        .stderr(predicate::str::contains("--profiles-file"));
}

// ─── Check ───────────────────────────────────────────────────────────────────

#[test]
fn test_check_clean_profile() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["check", "alpha", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("no duplicates found"));
}

#[test]
fn test_check_reports_duplicate_with_commands() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["check", "beta", "--verbose", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 duplicate set"))
        .stdout(predicate::str::contains("rm '"));
}

#[test]
fn test_check_without_verbose_has_no_commands() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["check", "beta", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("rm '").not())
        .stdout(predicate::str::contains("[safe]").not())
        .stdout(predicate::str::contains("Inbox.msf.bak"));
}

#[test]
fn test_check_verbose_shows_severity_and_rationale() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["check", "beta", "-v", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("older index"));
}

#[test]
fn test_check_unknown_profile_fails() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["check", "nobody", "--profiles-file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_check_missing_root_fails() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("profiles.yaml");
    fs::write(&file, "ghost:\n  profile: /definitely/not/here.default\n").unwrap();
    tbaudit(home.path())
        .args(["check", "ghost", "--profiles-file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ─── Check all ───────────────────────────────────────────────────────────────

#[test]
fn test_check_all_summary() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["check-all", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("no duplicates found"))
        .stdout(predicate::str::contains("1 duplicate set in 3 profiles"));
}

#[test]
fn test_check_all_quiet() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["check-all", "-q", "--parallel", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout("1  0  3\n");
}

#[test]
fn test_check_all_quiet_still_reports_skipped_items() {
    let home = TempDir::new().unwrap();
    let root = home.path().join("tb/bare.default");
    touch(&root.join("prefs.js"));
    let file = home.path().join("profiles.yaml");
    fs::write(&file, format!("bare:\n  profile: {}\n", root.display())).unwrap();

    tbaudit(home.path())
        .args(["check-all", "-q", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout("0  0  1\n")
        .stderr(predicate::str::contains("Local Folders"));
}

#[test]
fn test_check_all_json() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    tbaudit(home.path())
        .args(["check-all", "--format", "json", "--profiles-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_duplicates\": 1"))
        .stdout(predicate::str::contains("\"status\": \"checked\""));
}

#[test]
fn test_check_all_continues_past_missing_profile() {
    let home = TempDir::new().unwrap();
    let file = three_profiles(home.path());
    let mut yaml = fs::read_to_string(&file).unwrap();
    yaml.push_str("ghost:\n  profile: /definitely/not/here.default\n");
    fs::write(&file, yaml).unwrap();

    tbaudit(home.path())
        .args(["check-all", "--profiles-file"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 duplicate set in 3 profiles"))
        .stderr(predicate::str::contains("ghost"));
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[test]
fn test_config_show() {
    let home = TempDir::new().unwrap();
    tbaudit(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mail_scope"));
}

#[test]
fn test_config_init_writes_file() {
    let home = TempDir::new().unwrap();
    tbaudit(home.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(home.path().join(".tbaudit/config.toml").exists());
}
