//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mathgrade() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("mathgrade").unwrap()
}

#[test]
fn grade_correct_answer() {
    mathgrade()
        .args(["grade", "--student", "2+2", "--expected", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct: yes"))
        .stdout(predicate::str::contains("Score: 1.00"));
}

#[test]
fn grade_sign_error_text() {
    mathgrade()
        .args(["grade", "--student", "-4", "--expected", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct: no"))
        .stdout(predicate::str::contains("Score: 0.70"))
        .stdout(predicate::str::contains("Classification: sign_error"))
        .stdout(predicate::str::contains("Check the sign"));
}

#[test]
fn grade_json_output() {
    let output = mathgrade()
        .args(["grade", "--student", "2x + 2", "--expected", "x + 1", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["is_correct"], false);
    assert_eq!(value["score"], 0.6);
    assert_eq!(value["classification"][0], "coefficient_error");
}

#[test]
fn grade_with_explanation() {
    mathgrade()
        .args(["grade", "--student", "-4", "--expected", "4", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hint: Check the sign"))
        .stdout(predicate::str::contains("Confidence: 0.70"));
}

#[test]
fn grade_invalid_expression_is_not_an_error() {
    mathgrade()
        .args(["grade", "--student", "%%%", "--expected", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0.00"))
        .stdout(predicate::str::contains("Invalid mathematical expression"));
}

#[test]
fn grade_rejects_unknown_format() {
    mathgrade()
        .args(["grade", "--student", "1", "--expected", "1", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'xml'"));
}

#[test]
fn grade_in_french() {
    mathgrade()
        .env("MATHGRADE_LOCALE", "fr")
        .args(["grade", "--student", "4", "--expected", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parfait"));
}

#[test]
fn bad_locale_in_env_fails() {
    mathgrade()
        .env("MATHGRADE_LOCALE", "de")
        .args(["grade", "--student", "4", "--expected", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown locale"));
}

#[test]
fn steps_table_and_score() {
    mathgrade()
        .args(["steps", "--step", "x=5", "--step", "10", "--expected", "x=10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Global score: 0.80"))
        .stdout(predicate::str::contains("Expected answer: x=10"));
}

#[test]
fn steps_json_with_reference_steps() {
    let output = mathgrade()
        .args([
            "steps",
            "--step",
            "x = 10/2",
            "--step",
            "x = 5",
            "--expected",
            "x = 5",
            "--expected-step",
            "10/2",
            "--expected-step",
            "5",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["global_score"], 1.0);
    assert_eq!(value["generated_solution"][0], "10/2");
    assert_eq!(value["step_results"].as_array().unwrap().len(), 2);
}

#[test]
fn steps_require_at_least_one_step() {
    mathgrade()
        .args(["steps", "--expected", "4"])
        .assert()
        .failure();
}

#[test]
fn inspect_expression() {
    mathgrade()
        .args(["inspect", "--expression", "(x+1)^2 - x^2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid:      yes"))
        .stdout(predicate::str::contains("Simplified: 2*x + 1"));
}

#[test]
fn inspect_reports_errors() {
    mathgrade()
        .args(["inspect", "--expression", "2 +"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid:      no"))
        .stdout(predicate::str::contains("Error:"));
}

#[test]
fn validate_grade_set() {
    mathgrade()
        .args(["validate", "--grade-set", "../../grade-sets/algebra-basics.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("14 cases, 2 step cases"))
        .stdout(predicate::str::contains("All grade sets valid"));
}

#[test]
fn validate_directory() {
    mathgrade()
        .args(["validate", "--grade-set", "../../grade-sets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Algebra Basics"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dup.toml");
    std::fs::write(
        &path,
        r#"
[grade_set]
id = "dup"
name = "Dup"

[[cases]]
id = "a"
student = "1"
expected = "1"

[[cases]]
id = "a"
student = "2"
expected = ""
"#,
    )
    .unwrap();

    mathgrade()
        .args(["validate", "--grade-set"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("duplicate case ID: a"))
        .stdout(predicate::str::contains("expected answer is empty"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    mathgrade()
        .args(["validate", "--grade-set", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    mathgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mathgrade.toml"))
        .stdout(predicate::str::contains("Created grade-sets/example.toml"));

    assert!(dir.path().join("mathgrade.toml").exists());
    assert!(dir.path().join("grade-sets/example.toml").exists());

    mathgrade()
        .current_dir(dir.path())
        .args(["validate", "--grade-set", "grade-sets/example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All grade sets valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    mathgrade().current_dir(dir.path()).arg("init").assert().success();

    mathgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn compare_nonexistent_report() {
    mathgrade()
        .args([
            "compare",
            "--baseline",
            "no_such_file.json",
            "--current",
            "also_no_file.json",
        ])
        .assert()
        .failure();
}

#[test]
fn help_output() {
    mathgrade()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Math answer evaluation engine"));
}

#[test]
fn version_output() {
    mathgrade()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mathgrade"));
}
