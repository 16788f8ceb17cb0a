//! Engine configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mathgrade_symbolic::Limits;

use crate::equivalence::DEFAULT_TOLERANCE;
use crate::error::EngineError;
use crate::feedback::Locale;

/// Read-only settings shared by every evaluation.
///
/// Scoring tiers and their order are not configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Absolute tolerance for a constant difference to count as correct.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Looser tolerance for the near-equivalent scoring tier.
    #[serde(default = "default_near_tolerance")]
    pub near_tolerance: f64,
    #[serde(default = "default_max_hints")]
    pub max_hints: usize,
    #[serde(default)]
    pub locale: Locale,
    /// Largest integer exponent that is expanded during simplification.
    #[serde(default = "default_max_exponent")]
    pub max_exponent: u32,
    /// Simplification gives up past this many polynomial terms.
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,
    /// Max concurrent evaluations in batch runs.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_near_tolerance() -> f64 {
    0.01
}
fn default_max_hints() -> usize {
    3
}
fn default_max_exponent() -> u32 {
    Limits::default().max_exponent
}
fn default_max_terms() -> usize {
    Limits::default().max_terms
}
fn default_parallelism() -> usize {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            near_tolerance: default_near_tolerance(),
            max_hints: default_max_hints(),
            locale: Locale::default(),
            max_exponent: default_max_exponent(),
            max_terms: default_max_terms(),
            parallelism: default_parallelism(),
        }
    }
}

impl EngineConfig {
    pub fn limits(&self) -> Limits {
        Limits {
            max_exponent: self.max_exponent,
            max_terms: self.max_terms,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for value in [self.tolerance, self.near_tolerance] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidTolerance(value));
            }
        }
        if self.near_tolerance < self.tolerance {
            return Err(EngineError::NearToleranceTooSmall {
                near: self.near_tolerance,
                exact: self.tolerance,
            });
        }
        if self.max_hints == 0 {
            return Err(EngineError::NoHints);
        }
        Ok(())
    }

    /// Apply `MATHGRADE_LOCALE` and `MATHGRADE_TOLERANCE` as seen through
    /// `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MATHGRADE_LOCALE") {
            self.locale = value.parse()?;
        }
        if let Some(value) = lookup("MATHGRADE_TOLERANCE") {
            self.tolerance = value.trim().parse().map_err(|_| EngineError::InvalidEnv {
                var: "MATHGRADE_TOLERANCE".into(),
                value: value.clone(),
            })?;
        }
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mathgrade.toml` in the current directory
/// 2. `~/.config/mathgrade/config.toml`
///
/// Environment variable overrides: `MATHGRADE_LOCALE`, `MATHGRADE_TOLERANCE`.
pub fn load_config() -> Result<EngineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EngineConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("mathgrade.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<EngineConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    config.apply_env_overrides(|var| std::env::var(var).ok())?;
    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mathgrade"))
}
