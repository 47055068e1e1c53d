//! Integration tests for CLI behavior
//!
//! Each test runs the binary inside a temporary directory holding a
//! `.lintmux.json` that defines shell-based fake linters.

#![cfg(unix)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a command for the lintmux CLI
fn lintmux_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lintmux"));
    cmd.current_dir(dir.path());
    cmd
}

fn workspace(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".lintmux.json"), config).unwrap();
    dir
}

const FAKE_CONFIG: &str = r#"{
    "linters": {
        "fake": {
            "command": "sh -c 'echo a.go:1:2: bad thing; echo noise' --",
            "pattern": "PATH:LINE:COL:MESSAGE"
        },
        "slow": {
            "command": "sh -c 'sleep 5' --",
            "pattern": "PATH:LINE:MESSAGE"
        }
    }
}"#;

mod help_command {
    use super::*;

    #[test]
    fn shows_help_with_flag() {
        let dir = TempDir::new().unwrap();
        lintmux_cmd(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"));
    }

    #[test]
    fn shows_version_with_flag() {
        let dir = TempDir::new().unwrap();
        lintmux_cmd(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}

mod linters_command {
    use super::*;

    #[test]
    fn lists_builtin_and_custom_linters() {
        let dir = workspace(FAKE_CONFIG);
        lintmux_cmd(&dir)
            .arg("linters")
            .assert()
            .success()
            .stdout(predicate::str::contains("golint"))
            .stdout(predicate::str::contains("vet"))
            .stdout(predicate::str::contains("(disabled, custom)"));
    }
}

mod lint_command {
    use super::*;

    #[test]
    fn reports_issues_with_exit_status_one() {
        let dir = workspace(FAKE_CONFIG);
        lintmux_cmd(&dir)
            .args(["--disable-all", "-E", "fake"])
            .assert()
            .code(1)
            .stdout("a.go:1:2:warning: bad thing (fake)\n");
    }

    #[test]
    fn defines_linter_from_flag() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lint.sh"), "echo \"b.go:7: from flag\"\n").unwrap();
        lintmux_cmd(&dir)
            .args([
                "--disable-all",
                "--linter",
                "flagged:sh lint.sh:PATH:LINE:MESSAGE",
                "-E",
                "flagged",
                "--format",
                "{path}:{line}:{col}: {message}",
            ])
            .assert()
            .code(1)
            .stdout("b.go:7:: from flag\n");
    }

    #[test]
    fn exclude_drops_matching_issues() {
        let dir = workspace(FAKE_CONFIG);
        lintmux_cmd(&dir)
            .args(["--disable-all", "-E", "fake", "-e", "bad", "-e", "other"])
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn clean_run_exits_zero() {
        let dir = workspace(
            r#"{ "linters": { "quiet": { "command": "true", "pattern": "PATH:LINE:MESSAGE" } } }"#,
        );
        lintmux_cmd(&dir)
            .args(["--disable-all", "-E", "quiet"])
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn applies_custom_format() {
        let dir = workspace(FAKE_CONFIG);
        lintmux_cmd(&dir)
            .args(["--disable-all", "-E", "fake", "--format", "{linter}|{path}|{line}"])
            .assert()
            .code(1)
            .stdout("fake|a.go|1\n");
    }

    #[test]
    fn writes_json_array() {
        let dir = workspace(FAKE_CONFIG);
        let output = lintmux_cmd(&dir)
            .args(["--disable-all", "-E", "fake", "--json"])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        let issues: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        pretty_assertions::assert_eq!(
            issues,
            serde_json::json!([{
                "linter": "fake",
                "severity": "warning",
                "path": "a.go",
                "line": 1,
                "col": 2,
                "message": "bad thing"
            }])
        );
    }

    #[test]
    fn writes_checkstyle_document() {
        let dir = workspace(FAKE_CONFIG);
        lintmux_cmd(&dir)
            .args(["--disable-all", "-E", "fake", "--checkstyle"])
            .assert()
            .code(1)
            .stdout(predicate::str::starts_with("<?xml"))
            .stdout(predicate::str::contains("<file name=\"a.go\">"))
            .stdout(predicate::str::contains("source=\"fake\""));
    }

    #[test]
    fn severity_flag_promotes_issues() {
        let dir = workspace(FAKE_CONFIG);
        lintmux_cmd(&dir)
            .args(["--disable-all", "-E", "fake", "--severity", "fake:error", "--errors"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(":error: bad thing"));
    }

    #[test]
    fn timeout_is_reported_as_diagnostic() {
        let dir = workspace(FAKE_CONFIG);
        lintmux_cmd(&dir)
            .args(["--disable-all", "-E", "fake", "-E", "slow", "--deadline", "200ms"])
            .assert()
            .code(3)
            .stdout(predicate::str::contains("bad thing"))
            .stderr(predicate::str::contains("WARNING"))
            .stderr(predicate::str::contains("slow"));
    }

    #[test]
    fn unknown_linter_is_fatal() {
        let dir = workspace(FAKE_CONFIG);
        lintmux_cmd(&dir)
            .args(["-E", "nosuchlinter"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unknown linters: nosuchlinter"));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let dir = workspace(r#"{ "concurrency": "many" }"#);
        lintmux_cmd(&dir).assert().code(2);
    }
}
