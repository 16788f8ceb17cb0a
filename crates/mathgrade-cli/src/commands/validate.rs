//! The `mathgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mathgrade_core::parser::{load_grade_sets, validate_grade_set};

pub fn execute(grade_set_path: PathBuf) -> Result<()> {
    let sets = load_grade_sets(&grade_set_path)?;

    let mut total_warnings = 0;

    for set in &sets {
        println!(
            "Grade set: {} ({} cases, {} step cases)",
            set.name,
            set.cases.len(),
            set.step_cases.len()
        );

        let warnings = validate_grade_set(set);
        for w in &warnings {
            let prefix = w
                .case_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All grade sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
