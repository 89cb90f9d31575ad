//! Smoke tests -- verify the binary runs and the validate path works.

use assert_cmd::Command;
use std::io::Write;

const GOOD_CONFIG: &str = r#"
history_len = 10

[[exams]]
name = "self-http"
interval = "30s"
notify = ["ops"]
check = { kind = "http", target = "http://127.0.0.1:8090/healthz" }

[[exams]]
name = "etcd-tcp"
interval = "1m"
depends = ["self-http"]
check = { kind = "tcp", target = "127.0.0.1:2379" }

[[notifiers]]
name = "ops"
config = { kind = "log" }
"#;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_cli_help() {
    Command::cargo_bin("proctor")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Continuous health-exam scheduler",
        ));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("proctor")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("proctor"));
}

#[test]
fn test_serve_subcommand_exists() {
    Command::cargo_bin("proctor")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success();
}

#[test]
fn test_validate_accepts_a_runnable_battery() {
    let config = config_file(GOOD_CONFIG);
    Command::cargo_bin("proctor")
        .unwrap()
        .args(["validate", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("2 exams, 1 notifiers"));
}

#[test]
fn test_validate_rejects_a_bad_interval() {
    let config = config_file(
        r#"
[[exams]]
name = "broken"
interval = "0s"
check = { kind = "tcp", target = "127.0.0.1:80" }
"#,
    );
    Command::cargo_bin("proctor")
        .unwrap()
        .args(["validate", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("broken"))
        .stderr(predicates::str::contains("0s"));
}

#[test]
fn test_validate_rejects_an_unknown_notifier() {
    let config = config_file(
        r#"
[[exams]]
name = "lonely"
interval = "10s"
notify = ["nobody"]
check = { kind = "tcp", target = "127.0.0.1:80" }
"#,
    );
    Command::cargo_bin("proctor")
        .unwrap()
        .args(["validate", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("notifier 'nobody' not found"));
}

#[test]
fn test_validate_rejects_an_exam_without_a_check() {
    let config = config_file(
        r#"
[[exams]]
name = "phantom"
interval = "10s"
"#,
    );
    Command::cargo_bin("proctor")
        .unwrap()
        .args(["validate", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("no exam named 'phantom' found"));
}
