//! CLI 端到端测试

use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("mcm-cli").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("servo"))
        .stdout(predicate::str::contains("shell"))
        .stdout(predicate::str::contains("position"));
}

#[test]
fn test_config_show_merges_file_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "device = \"5\"\n\n[settings.3]\nfrequency = 300\n").unwrap();

    cli()
        .args(["config", "show", "--server", "--format", "json", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"server\": true"))
        .stdout(predicate::str::contains("\"device\": \"5\""))
        .stdout(predicate::str::contains("\"frequency\": 300"));
}

#[test]
fn test_missing_executable_fails() {
    cli()
        .args(["--exe", "/definitely/not/a/cacli", "status", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_invalid_setting_rejected_before_invocation() {
    // 可执行文件检查先于设置校验，用测试二进制自身充当一个存在的文件
    let exe = std::env::current_exe().unwrap();
    cli()
        .arg("--exe")
        .arg(&exe)
        .args(["move", "1", "forward", "--frequency", "601"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("frequency out of range"));
}

#[cfg(unix)]
#[test]
fn test_fake_controller_roundtrip() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("cacli");
    std::fs::write(
        &script,
        r#"#!/bin/sh
case "$1" in
  POS) printf 'POS : 4\nRVL : 40\n' ;;
  RST) echo "Position reset" ;;
  STS) echo "ERROR: DEVICE NOT FOUND" ;;
  *) echo "RESULT : OK" ;;
esac
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    cli()
        .arg("--exe")
        .arg(&script)
        .args(["--format", "json", "position", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"POS\": 4"));

    cli()
        .arg("--exe")
        .arg(&script)
        .args(["position", "2", "--raw"])
        .assert()
        .success()
        .stdout("40\n");

    cli()
        .arg("--exe")
        .arg(&script)
        .args(["reset", "1"])
        .assert()
        .success()
        .stdout("Position reset\n");

    cli()
        .arg("--exe")
        .arg(&script)
        .args(["status", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("another program"));

    // One-shot 会话不保留使能状态
    cli()
        .arg("--exe")
        .arg(&script)
        .args(["servo", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed"));

    cli()
        .arg("--exe")
        .arg(&script)
        .args(["--force", "servo", "estop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RESULT : OK"));
}
