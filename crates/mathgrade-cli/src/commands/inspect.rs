//! The `mathgrade inspect` command.

use anyhow::Result;

use mathgrade_core::MathEvaluator;

use super::check_format;

pub fn execute(expression: String, format: String) -> Result<()> {
    check_format(&format, &["text", "json"])?;
    let inspection = MathEvaluator::default().inspect(&expression);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(());
    }

    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    println!("Input:      {}", inspection.source);
    println!("Normalized: {}", inspection.normalized);
    println!("Valid:      {}", if inspection.is_valid { "yes" } else { "no" });
    println!("Parsed:     {}", show(inspection.parsed));
    println!("Simplified: {}", show(inspection.simplified));
    println!("Value:      {}", show(inspection.numeric_value.map(|v| v.to_string())));
    if let Some(error) = inspection.error {
        println!("Error:      {error}");
    }

    Ok(())
}
