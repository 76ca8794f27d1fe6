use assert_cmd::Command;
use predicates::prelude::*;

fn adventure() -> Command {
    Command::cargo_bin("adventure").unwrap()
}

#[test]
fn simulate_prints_log_and_rewards() {
    adventure()
        .args(["simulate", "--scenario", "../demos/party.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[AUTO][Dorn] Attack (streak 1)"))
        .stdout(predicate::str::contains("outcome: BothWon"))
        .stdout(predicate::str::contains("reward Dorn (auto):"));
}

#[test]
fn simulate_json_report() {
    adventure()
        .args(["simulate", "--scenario", "../demos/party.yaml", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"auto_resolved\""))
        .stdout(predicate::str::contains("\"rewards\""));
}

#[test]
fn missing_scenario_fails_with_context() {
    adventure()
        .args(["simulate", "--scenario", "no-such-file.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read scenario"));
}

#[test]
fn monsters_lists_builtins() {
    adventure()
        .arg("monsters")
        .assert()
        .success()
        .stdout(predicate::str::contains("ogre"))
        .stdout(predicate::str::contains("dragon"))
        .stdout(predicate::str::contains("Boss"));
}

#[test]
fn reveal_hides_until_quality_allows() {
    adventure()
        .args(["reveal", "--monster", "ogre", "--quality", "0.3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": null"));

    adventure()
        .args(["reveal", "--monster", "ogre", "--quality", "0.6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Ogre\""));

    adventure()
        .args(["reveal", "--monster", "kraken"])
        .assert()
        .failure();
}

#[test]
fn config_reads_yaml() {
    adventure()
        .args(["config", "--file", "../demos/config.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hard_mode\": true"))
        .stdout(predicate::str::contains("\"rebirth_cost_pct\": 50.0"));

    adventure()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hard_mode\": false"));
}

#[test]
fn simulate_many_json_summary() {
    Command::cargo_bin("simulate-many")
        .unwrap()
        .args(["--scenario", "../demos/party.json", "--trials", "20", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"samples\": 20"));
}

#[test]
fn simulate_many_text_summary() {
    Command::cargo_bin("simulate-many")
        .unwrap()
        .args(["--scenario", "../demos/party.yaml", "--trials", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("simulate-many results"))
        .stdout(predicate::str::contains("trials:             10"));
}
