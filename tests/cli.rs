use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("scribeflow")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("queue"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_transcribe_requires_input() {
    Command::cargo_bin("scribeflow")
        .unwrap()
        .arg("transcribe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL_OR_FILE"));
}

fn isolated_command(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scribeflow").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"));
    cmd
}

#[test]
fn test_config_prints_file_location_by_default() {
    let dir = tempfile::tempdir().unwrap();
    isolated_command(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config file:"))
        .stdout(predicate::str::contains("config.yaml"));
}

#[test]
fn test_config_show_displays_values() {
    let dir = tempfile::tempdir().unwrap();
    isolated_command(&dir)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Configuration"))
        .stdout(predicate::str::contains("Poll Interval"));
}

#[test]
fn test_unknown_subcommand_fails() {
    Command::cargo_bin("scribeflow")
        .unwrap()
        .arg("definitely-not-a-command")
        .assert()
        .failure();
}
