//! Integration tests for `rebalance decide` and `rebalance plan`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TABLE: &str = "\
campaign_id,brand,channel,budget_assigned,current_cpa,target_cpa,conversion_rate
2024-B,north,search,1000,150,200,0.15
2024-B,north,display,1000,300,200,0.05
";

fn workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("performance.csv"), TABLE).unwrap();
    temp_dir
}

fn rebalance(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rebalance").unwrap();
    cmd.current_dir(temp_dir.path()).env_remove("REBALANCE_CONFIG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_decide_table() {
    let temp_dir = workspace();
    rebalance(&temp_dir)
        .args(["decide", "performance.csv", "--now", "2024-06-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decision table"))
        .stdout(predicate::str::contains("2024-B/north/search"))
        .stdout(predicate::str::contains("2 channel(s), 0 in cooldown"));
}

#[test]
fn test_decide_json() {
    let temp_dir = workspace();
    let rows = json_stdout(rebalance(&temp_dir).args(["decide", "performance.csv", "--now", "2024-06-03", "--json"]));
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["channel"], "search");
    assert_eq!(rows[0]["efficiency_tier"], "high");
    assert_eq!(rows[0]["potential_tier"], "high");
    assert_eq!(rows[0]["action"], "increase");
    assert!((rows[0]["new_budget"].as_f64().unwrap() - 1300.0).abs() < 1e-6);

    assert_eq!(rows[1]["channel"], "display");
    assert_eq!(rows[1]["action"], "decrease");
    assert!((rows[1]["new_budget"].as_f64().unwrap() - 600.0).abs() < 1e-6);
}

#[test]
fn test_decide_reads_json_input() {
    let temp_dir = workspace();
    let json = r#"[{"campaign_id":"A","brand":"b","channel":"c","budget_assigned":100,"current_cpa":50,"target_cpa":60,"conversion_rate":0.1}]"#;
    std::fs::write(temp_dir.path().join("performance.json"), json).unwrap();

    let rows = json_stdout(rebalance(&temp_dir).args(["decide", "performance.json", "--now", "2024-06-03", "--json"]));
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["campaign_id"], "A");
}

#[test]
fn test_decide_rejects_invalid_table() {
    let temp_dir = workspace();
    std::fs::write(
        temp_dir.path().join("broken.csv"),
        "campaign_id,brand,channel,budget_assigned,current_cpa,target_cpa,conversion_rate\nA,b,c,100,50,0,0.1\n",
    )
    .unwrap();

    rebalance(&temp_dir)
        .args(["decide", "broken.csv", "--now", "2024-06-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("target_cpa"));
}

#[test]
fn test_decide_missing_input() {
    let temp_dir = workspace();
    rebalance(&temp_dir)
        .args(["decide", "nope.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}

#[test]
fn test_plan_equilibrates_to_target() {
    let temp_dir = workspace();
    let report = json_stdout(rebalance(&temp_dir).args([
        "plan",
        "performance.csv",
        "--now",
        "2024-06-03",
        "--target-total",
        "2000",
        "--json",
    ]));

    let rows = report["equilibration"]["rows"].as_array().unwrap();
    let total: f64 = rows.iter().map(|row| row["equilibrated_budget"].as_f64().unwrap()).sum();
    assert!((total - 2000.0).abs() < 1e-6);
    assert!((rows[0]["equilibrated_budget"].as_f64().unwrap() - 1368.42).abs() < 0.01);

    let plan = report["plan"].as_array().unwrap();
    assert_eq!(plan.len(), 2);
    for task in plan {
        assert!(task["implementation_date"].as_str().unwrap() > "2024-06-03");
    }
}

#[test]
fn test_plan_table_headings() {
    let temp_dir = workspace();
    rebalance(&temp_dir)
        .args(["plan", "performance.csv", "--now", "2024-06-03", "--start-date", "2024-06-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Equilibrated budgets"))
        .stdout(predicate::str::contains("Implementation plan"))
        .stdout(predicate::str::contains("2024-06-1"));
}

#[test]
fn test_plan_rejects_bad_start_date() {
    let temp_dir = workspace();
    rebalance(&temp_dir)
        .args(["plan", "performance.csv", "--start-date", "next week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected YYYY-MM-DD"));
}
