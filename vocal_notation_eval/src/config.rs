// Evaluation knobs.
//
// `#[serde(default)]` like the core `NotationConfig`, so a JSON file only
// carries what it overrides.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Timeline resolution in milliseconds.
    pub step_ms: i64,
    /// Fill freestyle lines with the `FREESTYLE` sentinel instead of
    /// leaving them out of the timeline.
    pub include_freestyle: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            step_ms: 10,
            include_freestyle: false,
        }
    }
}

impl EvaluationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| EvalError::io("reading evaluation config", e))?;
        let config: EvaluationConfig = serde_json::from_str(&json)
            .map_err(|e| EvalError::json("parsing evaluation config", e))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded evaluation config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_ms <= 0 {
            return Err(EvalError::InvalidConfig {
                message: format!("step_ms must be positive, got {}", self.step_ms),
            });
        }
        Ok(())
    }
}
