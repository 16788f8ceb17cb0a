pub mod compare;
pub mod grade;
pub mod init;
pub mod inspect;
pub mod run;
pub mod steps;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use mathgrade_core::config::load_config_from;
use mathgrade_core::MathEvaluator;

/// Build the default evaluator from the config search path.
pub(crate) fn evaluator(config_path: Option<&Path>) -> Result<MathEvaluator> {
    let config = load_config_from(config_path)?;
    Ok(MathEvaluator::new(config))
}

pub(crate) fn check_format(format: &str, allowed: &[&str]) -> Result<()> {
    anyhow::ensure!(
        allowed.contains(&format),
        "unknown format '{format}' (expected one of: {})",
        allowed.join(", ")
    );
    Ok(())
}
