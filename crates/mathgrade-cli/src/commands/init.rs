//! The `mathgrade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("mathgrade.toml").exists() {
        println!("mathgrade.toml already exists, skipping.");
    } else {
        std::fs::write("mathgrade.toml", SAMPLE_CONFIG)?;
        println!("Created mathgrade.toml");
    }

    std::fs::create_dir_all("grade-sets")?;
    let example_path = Path::new("grade-sets/example.toml");
    if example_path.exists() {
        println!("grade-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_GRADE_SET)?;
        println!("Created grade-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: mathgrade validate --grade-set grade-sets/example.toml");
    println!("  2. Run: mathgrade run --grade-set grade-sets/example.toml");
    println!("  3. Compare two runs: mathgrade compare --baseline <old.json> --current <new.json>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mathgrade configuration

# Absolute tolerance for a numeric difference to count as correct.
tolerance = 0.001
# Looser tolerance for near-miss partial credit.
near_tolerance = 0.01
max_hints = 3
# Feedback language: "en" or "fr".
locale = "en"
parallelism = 4
"#;

const EXAMPLE_GRADE_SET: &str = r#"[grade_set]
id = "example"
name = "Example Grade Set"
description = "A few answers to get started"

[[cases]]
id = "arithmetic"
student = "2+2"
expected = "4"
tags = ["basics"]

[cases.expect]
is_correct = true

[[cases]]
id = "expansion"
student = "x^2 + 2x + 1"
expected = "(x+1)^2"
tags = ["algebra"]

[cases.expect]
is_correct = true

[[cases]]
id = "sign-flip"
student = "-4"
expected = "4"
tags = ["basics"]

[cases.expect]
is_correct = false
min_score = 0.7
max_score = 0.7
classification = ["sign_error"]

[[step_cases]]
id = "linear-equation"
steps = ["x = 10/2", "x = 5"]
expected = "x = 5"
expected_steps = ["10/2", "5"]
min_global_score = 1.0
"#;
