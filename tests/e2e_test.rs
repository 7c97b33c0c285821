/// End-to-end tests for the CLI
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const COMPONENTS: &str = "tests/fixtures/components.json";
const FINDINGS: &str = "tests/fixtures/findings.json";
const VEX: &str = "tests/fixtures/vex.json";

/// Command isolated from the user's config, cache and credentials.
fn vulngate(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("vulngate");
    cmd.env("HOME", home)
        .env("VULNGATE_DB_PATH", home.join("cache").join("vulngate.db"))
        .env_remove("VULNGATE_CONFIG")
        .env_remove("VULNGATE_API_KEY")
        .env_remove("VULNGATE_OFFLINE")
        .env_remove("VULNGATE_ENABLE_AI_SCORE")
        .env_remove("VULNGATE_FAIL_ON")
        .env_remove("RUST_LOG");
    cmd
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("vulngate")
            .arg("--help")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("scan"))
            .stdout(predicate::str::contains("offline"));
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("vulngate").arg("--version").assert().code(0);
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("vulngate")
            .arg("--invalid-option")
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid severity threshold
    #[test]
    fn test_exit_code_invalid_fail_on() {
        cargo_bin_cmd!("vulngate")
            .args(["scan", "--components", COMPONENTS, "--fail-on", "urgent"])
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid collection name
    #[test]
    fn test_exit_code_invalid_collection() {
        cargo_bin_cmd!("vulngate")
            .args(["offline", "sync", "--collections", "cve,Bad Name"])
            .assert()
            .code(2);
    }

    /// Exit code 3: Online scan without an API key
    #[test]
    fn test_exit_code_missing_api_key() {
        let home = TempDir::new().unwrap();
        vulngate(home.path())
            .args(["scan", "--components", COMPONENTS])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("API key"));
    }

    /// Exit code 3: Offline scan before any sync
    #[test]
    fn test_exit_code_offline_without_sync() {
        let home = TempDir::new().unwrap();
        vulngate(home.path())
            .args(["--offline", "scan", "--components", COMPONENTS])
            .assert()
            .code(3)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("vulngate offline sync"));
    }

    /// Exit code 3: Inventory file does not exist
    #[test]
    fn test_exit_code_missing_components_file() {
        let home = TempDir::new().unwrap();
        vulngate(home.path())
            .args(["--offline", "scan", "--components", "/nonexistent/components.json"])
            .assert()
            .code(3);
    }

    /// Exit code 3: Sync without an API key
    #[test]
    fn test_exit_code_sync_without_api_key() {
        let home = TempDir::new().unwrap();
        vulngate(home.path())
            .args(["offline", "sync"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("VULNGATE_API_KEY"));
    }

    /// Exit code 3: Explicit config file that does not exist
    #[test]
    fn test_exit_code_missing_config_file() {
        let home = TempDir::new().unwrap();
        vulngate(home.path())
            .args(["--config", "/nonexistent/config.yaml", "offline", "status"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to read config file"));
    }

    /// Exit code 3: Invalid threshold from the environment
    #[test]
    fn test_exit_code_invalid_env_fail_on() {
        let home = TempDir::new().unwrap();
        vulngate(home.path())
            .env("VULNGATE_FAIL_ON", "urgent")
            .args(["offline", "status"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("VULNGATE_FAIL_ON"));
    }
}

#[test]
fn test_offline_status_on_fresh_cache() {
    let home = TempDir::new().unwrap();
    vulngate(home.path())
        .args(["offline", "status"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("[]"));

    assert!(home.path().join("cache").join("vulngate.db").exists());
}

#[test]
fn test_offline_purge_on_fresh_cache() {
    let home = TempDir::new().unwrap();
    vulngate(home.path())
        .args(["offline", "purge"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("purged"));
}

#[test]
fn test_offline_mode_from_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("vulngate.yaml");
    std::fs::write(&config, "offline: true\nlog_format: json\n").unwrap();

    vulngate(home.path())
        .env("VULNGATE_CONFIG", &config)
        .args(["scan", "--components", COMPONENTS, "--findings", FINDINGS, "--vex", VEX])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("vulngate offline sync"));
}

#[test]
fn test_default_config_file_is_discovered() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".vulngate");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.yaml"), "ignore:\n  - id: \"\"\n").unwrap();

    vulngate(home.path())
        .args(["offline", "status"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ignore[0].id must not be empty"));
}
