//! Integration tests for configuration discovery and `rebalance config`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TABLE: &str = "\
campaign_id,brand,channel,budget_assigned,current_cpa,target_cpa,conversion_rate
2024-B,north,search,1000,150,200,0.15
2024-B,north,display,1000,300,200,0.05
";

fn rebalance(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rebalance").unwrap();
    cmd.current_dir(temp_dir.path()).env_remove("REBALANCE_CONFIG");
    cmd
}

#[test]
fn test_config_show_defaults() {
    let temp_dir = TempDir::new().unwrap();
    rebalance(&temp_dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[cooldown]"))
        .stdout(predicate::str::contains("min_interval_days = 3"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    rebalance(&temp_dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));
    assert!(temp_dir.path().join("rebalance.toml").is_file());

    rebalance(&temp_dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    rebalance(&temp_dir).args(["config", "init", "--force"]).assert().success();
}

#[test]
fn test_local_config_is_picked_up() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("rebalance.toml"), "[cooldown]\nmin_interval_days = 9\n").unwrap();

    let output = rebalance(&temp_dir)
        .args(["config", "show", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let config: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(config["cooldown"]["min_interval_days"], 9);
}

#[test]
fn test_explicit_config_overrides_env() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("env.toml"), "[cooldown]\nmin_interval_days = 5\n").unwrap();
    std::fs::write(temp_dir.path().join("cli.toml"), "[cooldown]\nmin_interval_days = 7\n").unwrap();

    rebalance(&temp_dir)
        .env("REBALANCE_CONFIG", "env.toml")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("min_interval_days = 5"));

    rebalance(&temp_dir)
        .env("REBALANCE_CONFIG", "env.toml")
        .args(["--config", "cli.toml", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("min_interval_days = 7"));
}

#[test]
fn test_malformed_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("broken.toml"), "[cooldown\n").unwrap();
    rebalance(&temp_dir)
        .args(["--config", "broken.toml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_config_tightens_increase_bound() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("performance.csv"), TABLE).unwrap();
    std::fs::write(temp_dir.path().join("tight.toml"), "[adjustment]\nmax_increase = 0.1\n").unwrap();

    let output = rebalance(&temp_dir)
        .args(["--config", "tight.toml", "decide", "performance.csv", "--now", "2024-06-03", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!((rows[0]["new_budget"].as_f64().unwrap() - 1100.0).abs() < 1e-6);
}
