//! TOML grade-set parser.
//!
//! Loads grade sets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerCase, AnswerExpectation, ErrorKind, GradeSet, StepCase};

#[derive(Debug, Deserialize)]
struct TomlGradeFile {
    grade_set: TomlGradeSetHeader,
    #[serde(default)]
    cases: Vec<TomlAnswerCase>,
    #[serde(default)]
    step_cases: Vec<TomlStepCase>,
}

#[derive(Debug, Deserialize)]
struct TomlGradeSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlAnswerCase {
    id: String,
    student: String,
    expected: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    expect: Option<TomlExpectation>,
}

#[derive(Debug, Deserialize)]
struct TomlExpectation {
    #[serde(default)]
    is_correct: Option<bool>,
    #[serde(default)]
    min_score: Option<f64>,
    #[serde(default)]
    max_score: Option<f64>,
    #[serde(default)]
    classification: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlStepCase {
    id: String,
    steps: Vec<String>,
    expected: String,
    #[serde(default)]
    expected_steps: Option<Vec<String>>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    min_global_score: Option<f64>,
}

/// Parse a single TOML file into a `GradeSet`.
pub fn parse_grade_set(path: &Path) -> Result<GradeSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read grade set file: {}", path.display()))?;

    parse_grade_set_str(&content, path)
}

/// Parse a TOML string into a `GradeSet`. `source_path` is only used in
/// error messages.
pub fn parse_grade_set_str(content: &str, source_path: &Path) -> Result<GradeSet> {
    let parsed: TomlGradeFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let cases = parsed
        .cases
        .into_iter()
        .map(|c| {
            let expect = c
                .expect
                .map(|e| -> Result<AnswerExpectation> {
                    let classification = e
                        .classification
                        .iter()
                        .map(|k| k.parse::<ErrorKind>())
                        .collect::<std::result::Result<Vec<_>, String>>()
                        .map_err(|msg| anyhow::anyhow!("case {}: {msg}", c.id))?;
                    Ok(AnswerExpectation {
                        is_correct: e.is_correct,
                        min_score: e.min_score,
                        max_score: e.max_score,
                        classification,
                    })
                })
                .transpose()?;

            Ok(AnswerCase {
                id: c.id,
                student: c.student,
                expected: c.expected,
                tags: c.tags,
                expect,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let step_cases = parsed
        .step_cases
        .into_iter()
        .map(|c| StepCase {
            id: c.id,
            steps: c.steps,
            expected: c.expected,
            expected_steps: c.expected_steps,
            tags: c.tags,
            min_global_score: c.min_global_score,
        })
        .collect();

    Ok(GradeSet {
        id: parsed.grade_set.id,
        name: parsed.grade_set.name,
        description: parsed.grade_set.description,
        cases,
        step_cases,
    })
}

/// Recursively load all `.toml` grade set files from a directory.
/// Files that fail to parse are skipped with a warning.
pub fn load_grade_directory(dir: &Path) -> Result<Vec<GradeSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            sets.extend(load_grade_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_grade_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load one file, or every grade set under a directory.
pub fn load_grade_sets(path: &Path) -> Result<Vec<GradeSet>> {
    if path.is_dir() {
        load_grade_directory(path)
    } else {
        Ok(vec![parse_grade_set(path)?])
    }
}

/// A warning from grade set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The case ID (if applicable).
    pub case_id: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn case(id: &str, message: impl Into<String>) -> Self {
        Self {
            case_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a grade set for common issues.
pub fn validate_grade_set(set: &GradeSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.case_count() == 0 {
        warnings.push(ValidationWarning {
            case_id: None,
            message: "grade set has no cases".into(),
        });
    }

    // Answer and step cases share one id space.
    let mut seen_ids = HashSet::new();
    let ids = set
        .cases
        .iter()
        .map(|c| &c.id)
        .chain(set.step_cases.iter().map(|c| &c.id));
    for id in ids {
        if !seen_ids.insert(id) {
            warnings.push(ValidationWarning::case(id, format!("duplicate case ID: {id}")));
        }
    }

    for case in &set.cases {
        if case.student.trim().is_empty() {
            warnings.push(ValidationWarning::case(&case.id, "student answer is empty"));
        }
        if case.expected.trim().is_empty() {
            warnings.push(ValidationWarning::case(&case.id, "expected answer is empty"));
        }
        let Some(expect) = &case.expect else {
            continue;
        };
        for (name, bound) in [("min_score", expect.min_score), ("max_score", expect.max_score)] {
            if let Some(value) = bound.filter(|v| !(0.0..=1.0).contains(v)) {
                warnings.push(ValidationWarning::case(
                    &case.id,
                    format!("{name} {value} is outside [0, 1]"),
                ));
            }
        }
        if let (Some(min), Some(max)) = (expect.min_score, expect.max_score) {
            if min > max {
                warnings.push(ValidationWarning::case(
                    &case.id,
                    format!("min_score {min} is greater than max_score {max}"),
                ));
            }
        }
        if expect.is_correct == Some(true) && !expect.classification.is_empty() {
            warnings.push(ValidationWarning::case(
                &case.id,
                "a correct answer never carries a classification",
            ));
        }
    }

    for case in &set.step_cases {
        if case.steps.is_empty() {
            warnings.push(ValidationWarning::case(&case.id, "step list is empty"));
        }
        if case.expected.trim().is_empty() {
            warnings.push(ValidationWarning::case(&case.id, "expected answer is empty"));
        }
        if let Some(value) = case.min_global_score.filter(|v| !(0.0..=1.0).contains(v)) {
            warnings.push(ValidationWarning::case(
                &case.id,
                format!("min_global_score {value} is outside [0, 1]"),
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[grade_set]
id = "algebra"
name = "Algebra"
description = "Basic algebra answers"

[[cases]]
id = "sum"
student = "2+2"
expected = "4"
tags = ["arithmetic"]

[cases.expect]
is_correct = true

[[cases]]
id = "sign"
student = "-4"
expected = "4"

[cases.expect]
is_correct = false
min_score = 0.7
max_score = 0.7
classification = ["sign_error"]

[[step_cases]]
id = "linear"
steps = ["x=5", "10"]
expected = "x=10"
min_global_score = 0.5
"#;

    #[test]
    fn parse_valid_grade_set() {
        let set = parse_grade_set_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(set.id, "algebra");
        assert_eq!(set.cases.len(), 2);
        assert_eq!(set.step_cases.len(), 1);
        assert_eq!(set.cases[0].tags, vec!["arithmetic"]);

        let expect = set.cases[1].expect.as_ref().unwrap();
        assert_eq!(expect.classification, vec![ErrorKind::SignError]);
        assert_eq!(expect.min_score, Some(0.7));

        assert_eq!(set.step_cases[0].steps, vec!["x=5", "10"]);
        assert_eq!(set.step_cases[0].expected_steps, None);
        assert!(validate_grade_set(&set).is_empty());
    }

    #[test]
    fn unknown_error_kind_is_rejected() {
        let toml = r#"
[grade_set]
id = "bad"
name = "Bad"

[[cases]]
id = "c1"
student = "1"
expected = "2"

[cases.expect]
classification = ["rounding_error"]
"#;
        let err = parse_grade_set_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("rounding_error"));
    }

    #[test]
    fn missing_header_is_an_error() {
        let toml = "[[cases]]\nid = \"c\"\nstudent = \"1\"\nexpected = \"1\"\n";
        assert!(parse_grade_set_str(toml, &PathBuf::from("x.toml")).is_err());
    }

    #[test]
    fn validation_warnings() {
        let toml = r#"
[grade_set]
id = "w"
name = "Warnings"

[[cases]]
id = "dup"
student = " "
expected = "4"

[cases.expect]
min_score = 1.5

[[step_cases]]
id = "dup"
steps = []
expected = "4"
"#;
        let set = parse_grade_set_str(toml, &PathBuf::from("w.toml")).unwrap();
        let messages: Vec<String> = validate_grade_set(&set)
            .into_iter()
            .map(|w| w.message)
            .collect();
        assert!(messages.iter().any(|m| m.contains("duplicate case ID: dup")));
        assert!(messages.iter().any(|m| m == "student answer is empty"));
        assert!(messages.iter().any(|m| m.contains("min_score 1.5")));
        assert!(messages.iter().any(|m| m == "step list is empty"));
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("bad.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("more.toml"), VALID_TOML).unwrap();

        let sets = load_grade_directory(dir.path()).unwrap();
        assert_eq!(sets.len(), 2);
    }

    #[test]
    fn load_directory_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.toml");
        std::fs::write(&file, VALID_TOML).unwrap();
        assert!(load_grade_directory(&file).is_err());
        assert_eq!(load_grade_sets(&file).unwrap().len(), 1);
    }
}
