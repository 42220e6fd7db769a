//! CLI integration tests for all implemented subcommands.
//!
//! Uses `assert_cmd` to spawn the `crucible` binary and verify
//! exit codes, stdout content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to fixtures resolve correctly.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `crucible` binary, rooted at workspace.
fn crucible() -> Command {
    let mut cmd = cargo_bin_cmd!("crucible");
    cmd.current_dir(workspace_root());
    cmd.env_remove("RUST_LOG");
    cmd
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    crucible()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Requirement sentence parser and constraint translator",
        ));
}

#[test]
fn version_exits_0() {
    crucible()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crucible"));
}

// ──────────────────────────────────────────────
// 2. Tokens and tree
// ──────────────────────────────────────────────

#[test]
fn tokens_lists_kinds_and_spans() {
    crucible()
        .args(["tokens", "fixtures/accounts.req"])
        .assert()
        .success()
        .stdout(predicate::str::contains("line 2:"))
        .stdout(predicate::str::contains("subject keyword"))
        .stdout(predicate::str::contains("0..4"))
        .stdout(predicate::str::contains("'withdraw'"));
}

#[test]
fn tokens_json_output() {
    let output = crucible()
        .args(["--output", "json", "tokens", "fixtures/accounts.req"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lines = json.as_array().unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["line"], 2);
    assert_eq!(lines[0]["tokens"][0]["kind"], "subject_keyword");
    assert_eq!(lines[0]["tokens"][0]["text"], "User");
    assert_eq!(lines[0]["tokens"][0]["category"], "keyword");
}

#[test]
fn tokens_lex_error_exits_1_with_caret() {
    crucible()
        .args(["tokens", "-"])
        .write_stdin("User can $pay\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error[lex]"))
        .stderr(predicate::str::contains("  |          ^"));
}

#[test]
fn tree_prints_outline() {
    crucible()
        .args(["tree", "-"])
        .write_stdin("User can read file if (a > 1 or b is_set) and c == 2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Requirement 0..52"))
        .stdout(predicate::str::contains("Group"))
        .stdout(predicate::str::contains("Condition"));
}

// ──────────────────────────────────────────────
// 3. Parse subcommand
// ──────────────────────────────────────────────

#[test]
fn parse_valid_file_exits_0() {
    crucible()
        .args(["parse", "fixtures/accounts.req"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "line 2: User can withdraw money from account",
        ))
        .stdout(predicate::str::contains("  if    balance >= amount"))
        .stdout(predicate::str::contains(
            "  where password_data contains \"uppercase\"",
        ));
}

#[test]
fn parse_json_output_is_document() {
    let output = crucible()
        .args(["--output", "json", "parse", "fixtures/accounts.req"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reqs = json["requirements"].as_array().unwrap();
    assert_eq!(reqs.len(), 3);
    assert_eq!(reqs[0]["record"]["modal"], "can");
    assert_eq!(reqs[1]["record"]["constraint"]["op"], "contains");
    assert_eq!(reqs[2]["line"], 5);
}

#[test]
fn parse_stops_at_first_bad_line() {
    crucible()
        .args(["parse", "fixtures/mixed.req"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("line 2:"))
        .stderr(predicate::str::contains("error[parse]"));
}

#[test]
fn parse_recover_reports_every_bad_line() {
    crucible()
        .args(["parse", "--recover", "fixtures/mixed.req"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("line 1: User can login"))
        .stdout(predicate::str::contains("line 3: User can logout"))
        .stderr(predicate::str::contains("line 2:"))
        .stderr(predicate::str::contains("line 4:"));
}

#[test]
fn parse_recover_respects_max_errors() {
    crucible()
        .args(["parse", "--recover", "--max-errors", "1", "fixtures/mixed.req"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("line 3").not())
        .stderr(predicate::str::contains("line 4:").not());
}

#[test]
fn parse_json_error_has_stage() {
    let output = crucible()
        .args(["--output", "json", "parse", "-"])
        .write_stdin("withdraw money if balance >= amount\n")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["stage"], "parse");
    assert_eq!(json["offset"], 0);
    assert_eq!(json["line"], 1);
}

#[test]
fn parse_nonexistent_file_exits_1() {
    crucible()
        .args(["parse", "nonexistent_file_xyz.req"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn quiet_suppresses_text_diagnostics() {
    crucible()
        .args(["--quiet", "parse", "fixtures/mixed.req"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::is_empty());
}

#[test]
fn quiet_suppresses_json_diagnostics() {
    crucible()
        .args(["--quiet", "--output", "json", "parse", "--recover", "fixtures/mixed.req"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// 4. Translate subcommand
// ──────────────────────────────────────────────

#[test]
fn translate_prints_declarations_and_assertions() {
    crucible()
        .args(["translate", "fixtures/accounts.req"])
        .assert()
        .success()
        .stdout(
            "(set-logic QF_SLIA)\n\
             (set-option :produce-models true)\n\
             (declare-const amount Int)\n\
             (declare-const balance Int)\n\
             (declare-const password_data String)\n\
             (assert (>= balance amount))\n\
             (assert (str.contains password_data \"uppercase\"))\n\
             (assert (and (> amount 0) (< amount 10000)))\n\
             (check-sat)\n\
             (get-model)\n",
        );
}

#[test]
fn translate_json_output() {
    let output = crucible()
        .args(["--output", "json", "translate", "fixtures/accounts.req"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["clauses"].as_array().unwrap().len(), 3);
    assert_eq!(json["variables"]["password_data"], "string");
    assert_eq!(json["clauses"][2]["constraint"]["kind"], "and");
}

#[test]
fn translate_conflict_points_at_line() {
    crucible()
        .args(["translate", "fixtures/conflict.req"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("line 2:"))
        .stderr(predicate::str::contains("error[translation]"))
        .stderr(predicate::str::contains("type conflict on 'score'"));
}

#[test]
fn translate_empty_input_is_empty_set() {
    crucible()
        .args(["translate", "-"])
        .write_stdin("// nothing here\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(assert").not())
        .stdout(predicate::str::ends_with("(check-sat)\n(get-model)\n"));
}

// ──────────────────────────────────────────────
// 5. Configuration
// ──────────────────────────────────────────────

#[test]
fn config_file_sets_output_format() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("crucible.toml");
    fs::write(&config, "[output]\nformat = \"json\"\n").unwrap();

    let output = crucible()
        .args(["--config", config.to_str().unwrap(), "translate", "fixtures/accounts.req"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["variables"]["amount"], "integer");
}

#[test]
fn flag_overrides_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("crucible.toml");
    fs::write(&config, "[output]\nformat = \"json\"\n").unwrap();

    crucible()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--output",
            "text",
            "translate",
            "fixtures/accounts.req",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("(set-logic QF_SLIA)"));
}

#[test]
fn config_can_enable_recovery() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("crucible.toml");
    fs::write(&config, "[document]\nrecover = true\n").unwrap();

    crucible()
        .args(["--config", config.to_str().unwrap(), "parse", "fixtures/mixed.req"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("line 3: User can logout"));
}

#[test]
fn working_directory_config_is_picked_up() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("crucible.toml"), "[output]\nformat = \"json\"\n").unwrap();
    fs::write(tmp.path().join("one.req"), "User can login if attempts < 3\n").unwrap();

    let output = cargo_bin_cmd!("crucible")
        .current_dir(tmp.path())
        .args(["translate", "one.req"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["variables"]["attempts"], "integer");
}

#[test]
fn invalid_config_exits_1() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("crucible.toml");
    fs::write(&config, "[output]\nformat = \"yaml\"\n").unwrap();

    crucible()
        .args(["--config", config.to_str().unwrap(), "parse", "fixtures/accounts.req"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not parse"));
}
