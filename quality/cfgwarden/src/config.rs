//! Engine configuration
//!
//! The confidence thresholds below were chosen empirically; they are kept as
//! named constants and remain configurable rather than hard-coded at use
//! sites.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detection confidence below this terminates the run
pub const DEFAULT_AMBIGUOUS_THRESHOLD: f64 = 0.5;
/// Detection confidence below this (but above ambiguous) adds a warning
pub const DEFAULT_CONFIDENT_THRESHOLD: f64 = 0.8;
/// Source lines captured around an enriched error
pub const DEFAULT_CONTEXT_LINES: usize = 2;
/// Spaces per indent level in formatted output
pub const DEFAULT_INDENT: usize = 4;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Classification below this confidence is fatal
    pub ambiguous_threshold: f64,

    /// Classification below this confidence adds an "uncertain detection" warning
    pub confident_threshold: f64,

    /// Number of source lines captured around an enriched syntax error
    pub context_lines: usize,

    /// Spaces per indent level in formatted output
    pub indent: usize,

    /// Produce formatted content after a successful syntax check
    pub pretty_print: bool,

    /// Target schema version; selects version-dependent business-rule thresholds
    pub target_version: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ambiguous_threshold: DEFAULT_AMBIGUOUS_THRESHOLD,
            confident_threshold: DEFAULT_CONFIDENT_THRESHOLD,
            context_lines: DEFAULT_CONTEXT_LINES,
            indent: DEFAULT_INDENT,
            pretty_print: true,
            target_version: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn check(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.ambiguous_threshold)
            || !(0.0..=1.0).contains(&self.confident_threshold)
        {
            return Err(ConfigError::Invalid(
                "confidence thresholds must lie in [0, 1]".to_string(),
            ));
        }
        if self.ambiguous_threshold > self.confident_threshold {
            return Err(ConfigError::Invalid(
                "ambiguous threshold must not exceed confident threshold".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the target schema version
    pub fn with_target_version(mut self, version: &str) -> Self {
        self.target_version = Some(version.to_string());
        self
    }
}
